//! Fixtures shared by unit tests.

use crate::binning::ActivityVector;
use crate::model::{ModelParams, TrainedModel};
use chrono::{NaiveDate, NaiveDateTime};

/// Awake state 0, sleep state 1; a 32-bin (8 h) sleep run and a 64-bin
/// awake run on average.
pub fn sample_params() -> ModelParams {
    ModelParams {
        startprob: [0.3, 0.7],
        transmat: [[63.0 / 64.0, 1.0 / 64.0], [1.0 / 32.0, 31.0 / 32.0]],
        emissionprob: [[0.05, 0.95], [0.98, 0.02]],
        bin_minutes: Some(15),
    }
}

pub fn sample_model() -> TrainedModel {
    TrainedModel::from_params(sample_params(), 15).unwrap()
}

pub fn midnight(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One day of 15-minute bins: inactive for the first `sleep_bins`, active after.
pub fn day_pattern(sleep_bins: usize) -> Vec<u8> {
    (0..96).map(|b| u8::from(b >= sleep_bins)).collect()
}

/// `days` repetitions of [`day_pattern`] starting at 2024-03-01 00:00.
pub fn periodic_vector(days: usize, sleep_bins: usize) -> ActivityVector {
    let bins = day_pattern(sleep_bins).repeat(days);
    ActivityVector::from_bins(midnight(1), 15, bins)
}
