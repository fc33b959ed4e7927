//! Timezone search by circular rotation.
//!
//! Each candidate UTC offset is tried by rolling the binned vector so that
//! its bins line up with the model's reference clock, then scoring the
//! rolled sequence. The highest log-likelihood wins.

use crate::binning::ActivityVector;
use crate::error::{ParcaeError, Result};
use crate::hmm::SequenceScorer;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Default candidate range, inclusive.
pub const DEFAULT_TZ_MIN: i32 = -12;
pub const DEFAULT_TZ_MAX: i32 = 12;

/// Score of one candidate offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetScore {
    pub offset_hours: i32,
    pub shift_bins: i64,
    pub log_likelihood: f64,
}

/// Outcome of a full search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneSearch {
    pub best: OffsetScore,
    /// Every candidate, in ascending offset order.
    pub scores: Vec<OffsetScore>,
}

/// Number of bins an hour offset moves the vector, rounded half away from zero.
pub fn shift_bins(offset_hours: i32, bins_per_day: usize) -> i64 {
    (f64::from(offset_hours) * bins_per_day as f64 / 24.0).round() as i64
}

/// Score every offset. The output order matches `offsets`.
pub fn score_offsets<S>(
    scorer: &S,
    vector: &ActivityVector,
    offsets: &[i32],
    parallel: bool,
) -> Vec<OffsetScore>
where
    S: SequenceScorer + ?Sized,
{
    let bins_per_day = vector.bins_per_day();
    let score_one = |&offset_hours: &i32| {
        let shift = shift_bins(offset_hours, bins_per_day);
        let log_likelihood = scorer.score(vector.rotated(shift).bins());
        log::debug!("offset {offset_hours:+} (shift {shift} bins): log-likelihood {log_likelihood:.4}");
        OffsetScore {
            offset_hours,
            shift_bins: shift,
            log_likelihood,
        }
    };

    if parallel {
        #[cfg(feature = "parallel")]
        {
            return offsets.par_iter().map(score_one).collect();
        }
        #[cfg(not(feature = "parallel"))]
        log::debug!("parallel scoring requested but the `parallel` feature is disabled");
    }

    offsets.iter().map(score_one).collect()
}

/// Ascending scan keeping the strictly highest score; ties keep the earlier
/// entry.
pub fn select_best(scores: &[OffsetScore]) -> Option<OffsetScore> {
    let mut best: Option<OffsetScore> = None;
    for score in scores {
        if best.map_or(true, |b| score.log_likelihood > b.log_likelihood) {
            best = Some(*score);
        }
    }
    best
}

/// Search `offsets` for the best alignment of `vector`.
///
/// Candidates are sorted ascending and deduplicated first, so selection does
/// not depend on the order the caller supplied them in.
pub fn search<S>(
    scorer: &S,
    vector: &ActivityVector,
    offsets: impl IntoIterator<Item = i32>,
    parallel: bool,
) -> Result<TimezoneSearch>
where
    S: SequenceScorer + ?Sized,
{
    let mut candidates: Vec<i32> = offsets.into_iter().collect();
    candidates.sort_unstable();
    candidates.dedup();

    let scores = score_offsets(scorer, vector, &candidates, parallel);
    let best = select_best(&scores).ok_or(ParcaeError::EmptyInput("candidate offsets"))?;
    log::info!(
        "selected offset UTC{:+} (log-likelihood {:.4}) out of {} candidates",
        best.offset_hours,
        best.log_likelihood,
        scores.len()
    );
    Ok(TimezoneSearch { best, scores })
}
