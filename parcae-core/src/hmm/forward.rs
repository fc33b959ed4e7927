//! Forward algorithm.

use super::{log_add, log_sum_exp};
use crate::model::{TrainedModel, N_STATES};

/// Total log probability of `observations`, marginalized over all hidden
/// state paths.
///
/// Any nonzero symbol is treated as "active". An empty sequence has
/// probability one.
pub fn log_likelihood(model: &TrainedModel, observations: &[u8]) -> f64 {
    let Some((&first, rest)) = observations.split_first() else {
        return 0.0;
    };

    let log_start = model.log_start();
    let log_trans = model.log_trans();
    let log_emit = model.log_emit();

    let mut alpha = [0.0f64; N_STATES];
    let o = symbol(first);
    for j in 0..N_STATES {
        alpha[j] = log_start[j] + log_emit[j][o];
    }

    for &obs in rest {
        let o = symbol(obs);
        let mut next = [0.0f64; N_STATES];
        for j in 0..N_STATES {
            let into_j = (0..N_STATES)
                .map(|i| alpha[i] + log_trans[i][j])
                .fold(f64::NEG_INFINITY, log_add);
            next[j] = log_emit[j][o] + into_j;
        }
        alpha = next;
    }

    log_sum_exp(&alpha)
}

#[inline]
pub(crate) fn symbol(obs: u8) -> usize {
    usize::from(obs != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelParams, TrainedModel};
    use crate::test_support::{day_pattern, sample_model};

    /// Brute-force sum over every hidden path, in linear space.
    fn enumerate_paths(params: &ModelParams, obs: &[u8]) -> f64 {
        let t = obs.len();
        let mut total = 0.0;
        for mask in 0..(1u32 << t) {
            let state = |k: usize| ((mask >> k) & 1) as usize;
            let mut p = params.startprob[state(0)] * params.emissionprob[state(0)][obs[0] as usize];
            for k in 1..t {
                p *= params.transmat[state(k - 1)][state(k)]
                    * params.emissionprob[state(k)][obs[k] as usize];
            }
            total += p;
        }
        total.ln()
    }

    #[test]
    fn test_matches_path_enumeration() {
        let model = sample_model();
        let obs = [1, 1, 0, 0, 0, 1, 0, 1];
        let expected = enumerate_paths(model.params(), &obs);
        assert!((log_likelihood(&model, &obs) - expected).abs() < 1e-10);
    }

    #[test]
    fn test_two_steps_by_hand() {
        let model = sample_model();
        let p = model.params();
        let a0 = [
            (p.startprob[0] * p.emissionprob[0][1]).ln(),
            (p.startprob[1] * p.emissionprob[1][1]).ln(),
        ];
        let a1: Vec<f64> = (0..2)
            .map(|j| {
                let into_j = log_add(a0[0] + p.transmat[0][j].ln(), a0[1] + p.transmat[1][j].ln());
                p.emissionprob[j][0].ln() + into_j
            })
            .collect();
        let expected = log_add(a1[0], a1[1]);
        assert!((log_likelihood(&model, &[1, 0]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_observation() {
        let model = sample_model();
        let expected = (0.3f64 * 0.95 + 0.7 * 0.02).ln();
        assert!((log_likelihood(&model, &[1]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sequence_scores_zero() {
        assert_eq!(log_likelihood(&sample_model(), &[]), 0.0);
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let model = sample_model();
        let obs = day_pattern(32).repeat(14);
        let a = log_likelihood(&model, &obs);
        let b = log_likelihood(&model, &obs);
        assert_eq!(a.to_bits(), b.to_bits());
        assert!(a.is_finite());
    }

    #[test]
    fn test_long_sequence_does_not_underflow() {
        let model = sample_model();
        let obs = day_pattern(32).repeat(60);
        let ll = log_likelihood(&model, &obs);
        assert!(ll.is_finite());
        assert!(ll < -100.0);
    }

    #[test]
    fn test_impossible_sequence_is_neg_infinity() {
        let params = ModelParams {
            startprob: [1.0, 0.0],
            transmat: [[1.0, 0.0], [0.0, 1.0]],
            emissionprob: [[0.0, 1.0], [1.0, 0.0]],
            bin_minutes: Some(15),
        };
        let model = TrainedModel::from_params(params, 15).unwrap();
        let ll = log_likelihood(&model, &[1, 1, 0]);
        assert_eq!(ll, f64::NEG_INFINITY);
        assert!(!ll.is_nan());
        assert_eq!(log_likelihood(&model, &[1, 1, 1]), 0.0);
    }

    #[test]
    fn test_nonzero_symbols_count_as_active() {
        let model = sample_model();
        assert_eq!(
            log_likelihood(&model, &[0, 7, 255]),
            log_likelihood(&model, &[0, 1, 1])
        );
    }
}
