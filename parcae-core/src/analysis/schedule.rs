//! Human-readable summary of an inference result.

use crate::engine::InferenceResult;
use crate::model::MINUTES_PER_DAY;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Typical sleep schedule, in local minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypicalSchedule {
    /// `None` when no sleep episode was found.
    pub sleep_onset: Option<u32>,
    pub sleep_offset: Option<u32>,
    pub median_duration_minutes: u32,
    pub variability_minutes: u32,
}

impl TypicalSchedule {
    pub fn from_features(sleep_phase: &[f64; 4], sleep_stats: &[f64; 3]) -> Self {
        let day = f64::from(MINUTES_PER_DAY);
        Self {
            sleep_onset: angle_to_minutes(sleep_phase[0], sleep_phase[1]),
            sleep_offset: angle_to_minutes(sleep_phase[2], sleep_phase[3]),
            median_duration_minutes: (sleep_stats[2] * day).round().max(0.0) as u32,
            variability_minutes: (sleep_stats[1] * day).round().max(0.0) as u32,
        }
    }

    pub fn from_result(result: &InferenceResult) -> Self {
        Self::from_features(&result.sleep_phase, &result.sleep_stats)
    }

    /// Minutes awake between waking and the next sleep onset.
    pub fn awake_minutes(&self) -> Option<u32> {
        let (on, off) = (self.sleep_onset?, self.sleep_offset?);
        Some((on + MINUTES_PER_DAY - off) % MINUTES_PER_DAY)
    }
}

/// Invert a `(sin, cos)` pair to minutes since midnight, in `[0, 1440)`.
pub fn angle_to_minutes(sin: f64, cos: f64) -> Option<u32> {
    if sin == 0.0 && cos == 0.0 {
        return None;
    }
    let day = f64::from(MINUTES_PER_DAY);
    let minutes = (sin.atan2(cos).rem_euclid(TAU) / TAU * day).round();
    Some(minutes as u32 % MINUTES_PER_DAY)
}

/// `HH:MM`, wrapping past midnight.
pub fn format_hm(minutes: u32) -> String {
    let m = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", m / 60, m % 60)
}
