//! Discretization of a timestamp stream into a binary activity vector.
//!
//! The vector always covers whole calendar days: bin 0 starts at the
//! midnight at or before the first event, and the last bin ends at the
//! midnight strictly after the last event. Binning is occupancy, not count.

use crate::error::{ParcaeError, Result};
use crate::model::MINUTES_PER_DAY;
use chrono::{NaiveDateTime, NaiveTime};

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Shortest span inference accepts, whatever the configuration asks for.
pub const MIN_SPAN_DAYS: f64 = 2.0;

/// One 0/1 symbol per bin, anchored at a midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityVector {
    start: NaiveDateTime,
    bin_minutes: u32,
    bins: Vec<u8>,
}

impl ActivityVector {
    /// Wrap already-binned symbols. `start` is expected to be a midnight.
    pub fn from_bins(start: NaiveDateTime, bin_minutes: u32, bins: Vec<u8>) -> Self {
        Self {
            start,
            bin_minutes,
            bins,
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn bin_minutes(&self) -> u32 {
        self.bin_minutes
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.bin_minutes) as usize
    }

    /// Number of whole days covered.
    pub fn n_days(&self) -> usize {
        self.bins.len() / self.bins_per_day()
    }

    /// Circular roll: the symbol at index `i` moves to `(i + shift) mod n`.
    pub fn rotated(&self, shift: i64) -> ActivityVector {
        let mut bins = self.bins.clone();
        if !bins.is_empty() {
            let k = shift.rem_euclid(bins.len() as i64) as usize;
            bins.rotate_right(k);
        }
        ActivityVector {
            start: self.start,
            bin_minutes: self.bin_minutes,
            bins,
        }
    }

    /// Reject vectors shorter than `ceil(min_span_days)` whole days of bins,
    /// and never fewer than [`MIN_SPAN_DAYS`] days.
    pub fn ensure_min_bins(&self, min_span_days: f64) -> Result<()> {
        let days = min_span_days.max(MIN_SPAN_DAYS).ceil() as usize;
        let required = days * self.bins_per_day();
        if self.bins.len() < required {
            return Err(ParcaeError::InsufficientBins {
                bins: self.bins.len(),
                required,
            });
        }
        Ok(())
    }
}

fn floor_to_midnight(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

/// Elapsed time between the first and last timestamp, in days.
pub fn span_days(timestamps: &[NaiveDateTime]) -> f64 {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => (*last - *first).num_milliseconds() as f64 / MS_PER_DAY,
        _ => 0.0,
    }
}

/// Fail with `InsufficientSpan` when the data covers less than
/// `min_span_days`. Returns the measured span.
pub fn check_span(timestamps: &[NaiveDateTime], min_span_days: f64) -> Result<f64> {
    let days = span_days(timestamps);
    if days < min_span_days {
        return Err(ParcaeError::InsufficientSpan {
            days,
            required: min_span_days,
        });
    }
    Ok(days)
}

/// Bin a time-ascending, non-empty sequence of timestamps.
pub fn bin_timestamps(timestamps: &[NaiveDateTime], bin_minutes: u32) -> Result<ActivityVector> {
    let (first, last) = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(ParcaeError::EmptyInput("timestamps")),
    };

    let start = floor_to_midnight(first);
    let end = last
        .date()
        .succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or_else(|| ParcaeError::InvalidTimestamp(last.to_string()))?;

    let bin_ms = i64::from(bin_minutes) * MS_PER_MINUTE;
    let n_bins = ((end - start).num_milliseconds() / bin_ms).max(0) as usize;
    let mut bins = vec![0u8; n_bins];

    let mut dropped = 0usize;
    for ts in timestamps {
        let idx = (*ts - start).num_milliseconds().div_euclid(bin_ms);
        match usize::try_from(idx).ok().and_then(|i| bins.get_mut(i)) {
            Some(bin) => *bin = 1,
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("dropped {dropped} timestamps outside the binned range");
    }

    log::debug!(
        "binned {} timestamps into {} bins of {} min starting {}",
        timestamps.len(),
        n_bins,
        bin_minutes,
        start
    );

    Ok(ActivityVector {
        start,
        bin_minutes,
        bins,
    })
}
