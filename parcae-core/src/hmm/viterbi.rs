//! Viterbi decoding.

use super::forward::symbol;
use crate::model::{TrainedModel, N_STATES};

/// Most likely hidden state path for `observations`.
///
/// Ties between predecessor states, and between final states, go to the
/// lower state index.
pub fn decode(model: &TrainedModel, observations: &[u8]) -> Vec<usize> {
    let Some((&first, rest)) = observations.split_first() else {
        return Vec::new();
    };

    let log_start = model.log_start();
    let log_trans = model.log_trans();
    let log_emit = model.log_emit();

    let mut delta = [0.0f64; N_STATES];
    let o = symbol(first);
    for j in 0..N_STATES {
        delta[j] = log_start[j] + log_emit[j][o];
    }

    let mut backptr: Vec<[usize; N_STATES]> = Vec::with_capacity(rest.len());
    for &obs in rest {
        let o = symbol(obs);
        let mut next = [f64::NEG_INFINITY; N_STATES];
        let mut from = [0usize; N_STATES];
        for j in 0..N_STATES {
            let (best_i, best) = argmax((0..N_STATES).map(|i| delta[i] + log_trans[i][j]));
            next[j] = best + log_emit[j][o];
            from[j] = best_i;
        }
        backptr.push(from);
        delta = next;
    }

    let (mut state, _) = argmax(delta.iter().copied());
    let mut path = vec![0usize; observations.len()];
    path[observations.len() - 1] = state;
    for (t, from) in backptr.iter().enumerate().rev() {
        state = from[state];
        path[t] = state;
    }
    path
}

/// First index holding the strict maximum.
fn argmax(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, v) in values.enumerate() {
        if i == 0 || v > best.1 {
            best = (i, v);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day_pattern, sample_model};

    #[test]
    fn test_empty_sequence() {
        assert!(decode(&sample_model(), &[]).is_empty());
    }

    #[test]
    fn test_path_length_matches_input() {
        let obs = day_pattern(32).repeat(3);
        assert_eq!(decode(&sample_model(), &obs).len(), obs.len());
    }

    #[test]
    fn test_recovers_daily_sleep_block() {
        let model = sample_model();
        let obs = day_pattern(32).repeat(14);
        let path = decode(&model, &obs);
        for (t, &state) in path.iter().enumerate() {
            let expected = if t % 96 < 32 {
                model.sleep_state()
            } else {
                model.awake_state()
            };
            assert_eq!(state, expected, "bin {t}");
        }
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax([1.0, 1.0].into_iter()).0, 0);
        assert_eq!(argmax([f64::NEG_INFINITY, f64::NEG_INFINITY].into_iter()).0, 0);
        assert_eq!(argmax([0.0, 2.0, 2.0].into_iter()).0, 1);
    }
}
