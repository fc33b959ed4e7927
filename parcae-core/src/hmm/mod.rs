//! Log-space HMM inference over binary activity sequences.
//!
//! All probabilities are handled as natural logs. A zero probability is
//! `-inf`, and every helper here keeps `-inf` absorbing instead of
//! producing NaN.

pub mod forward;
pub mod viterbi;

use crate::model::TrainedModel;

pub use forward::log_likelihood;
pub use viterbi::decode;

/// `ln(exp(a) + exp(b))`.
pub fn log_add(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let max = a.max(b);
    max + ((a - max).exp() + (b - max).exp()).ln()
}

/// `ln(sum(exp(x)))` over a slice; `-inf` for an empty or all `-inf` slice.
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Anything that can score a binary observation sequence.
///
/// The timezone search is written against this trait so scoring can be
/// shared across worker threads.
pub trait SequenceScorer: Sync {
    fn score(&self, observations: &[u8]) -> f64;
}

impl SequenceScorer for TrainedModel {
    fn score(&self, observations: &[u8]) -> f64 {
        log_likelihood(self, observations)
    }
}
