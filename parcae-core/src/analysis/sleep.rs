//! Sleep episode extraction and aggregation.
//!
//! Episodes come from the Viterbi path of the aligned vector: every maximal
//! run of the sleep state is a candidate, runs cut off by either end of the
//! recording are dropped, and each remaining run is attributed to the
//! noon-to-noon day containing its midpoint. Only the longest run per day
//! is kept, so naps do not count as the night's sleep.

use crate::model::MINUTES_PER_DAY;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// One night of sleep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepEpisode {
    /// Noon-anchored day index the episode belongs to.
    pub day: usize,
    pub start_bin: usize,
    /// Exclusive.
    pub end_bin: usize,
    /// Time of day the episode starts, in minutes.
    pub onset_minutes: u32,
    /// Time of day the episode ends, in minutes.
    pub offset_minutes: u32,
    /// Length as a fraction of a day.
    pub duration: f64,
}

impl SleepEpisode {
    pub fn len_bins(&self) -> usize {
        self.end_bin - self.start_bin
    }
}

/// Maximal runs of `state` in `path`, as `[start, end)` pairs.
fn runs_of(path: &[usize], state: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (t, &s) in path.iter().enumerate() {
        match (s == state, start) {
            (true, None) => start = Some(t),
            (false, Some(st)) => {
                runs.push((st, t));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(st) = start {
        runs.push((st, path.len()));
    }
    runs
}

/// Pull the main sleep episode of each day out of a decoded state path.
pub fn extract_episodes(
    path: &[usize],
    sleep_state: usize,
    bins_per_day: usize,
    bin_minutes: u32,
) -> Vec<SleepEpisode> {
    if bins_per_day == 0 {
        return Vec::new();
    }

    let mut by_day: BTreeMap<usize, SleepEpisode> = BTreeMap::new();
    for (start, end) in runs_of(path, sleep_state) {
        // Censored by the recording window.
        if start == 0 || end == path.len() {
            continue;
        }
        let mid = (start + end) / 2;
        let day = (mid + bins_per_day / 2) / bins_per_day;
        let episode = SleepEpisode {
            day,
            start_bin: start,
            end_bin: end,
            onset_minutes: (start % bins_per_day) as u32 * bin_minutes,
            offset_minutes: (end % bins_per_day) as u32 * bin_minutes,
            duration: (end - start) as f64 / bins_per_day as f64,
        };
        match by_day.get(&day) {
            Some(kept) if kept.len_bins() >= episode.len_bins() => {}
            _ => {
                by_day.insert(day, episode);
            }
        }
    }

    let n_days = path.len() / bins_per_day;
    let missing = n_days.saturating_sub(by_day.len());
    if by_day.is_empty() {
        log::warn!("no sleep episodes detected in {n_days} days");
    } else if missing > 1 {
        log::warn!("{missing} of {n_days} days have no detectable sleep");
    }

    by_day.into_values().collect()
}

/// Minutes since midnight as an angle on the 24 h circle.
pub fn minutes_to_angle(minutes: f64) -> f64 {
    TAU * minutes / f64::from(MINUTES_PER_DAY)
}

/// `[sin, cos]` of the circular mean of times of day given in minutes.
///
/// The pair is a unit vector, or `[0, 0]` when the input is empty or the
/// angles cancel out.
pub fn circular_mean(minutes: &[f64]) -> [f64; 2] {
    let (s, c) = minutes.iter().fold((0.0, 0.0), |(s, c), &m| {
        let a = minutes_to_angle(m);
        (s + a.sin(), c + a.cos())
    });
    let r = s.hypot(c);
    if minutes.is_empty() || r < 1e-12 {
        return [0.0, 0.0];
    }
    [s / r, c / r]
}

/// `[mean, population std, median]` of episode durations; zeros when empty.
pub fn duration_stats(durations: &[f64]) -> [f64; 3] {
    if durations.is_empty() {
        return [0.0; 3];
    }
    let mean = durations.iter().mean();
    let std = durations.iter().population_std_dev();
    let median = Data::new(durations.to_vec()).median();
    [mean, std, median]
}

/// Aggregate features derived from the episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSummary {
    pub episodes: Vec<SleepEpisode>,
    /// sin/cos of mean onset, then sin/cos of mean offset.
    pub sleep_phase: [f64; 4],
    /// mean/std/median duration as a fraction of a day.
    pub sleep_stats: [f64; 3],
}

impl SleepSummary {
    pub fn from_episodes(episodes: Vec<SleepEpisode>) -> Self {
        let onsets: Vec<f64> = episodes.iter().map(|e| f64::from(e.onset_minutes)).collect();
        let offsets: Vec<f64> = episodes.iter().map(|e| f64::from(e.offset_minutes)).collect();
        let durations: Vec<f64> = episodes.iter().map(|e| e.duration).collect();

        let [on_sin, on_cos] = circular_mean(&onsets);
        let [off_sin, off_cos] = circular_mean(&offsets);

        Self {
            sleep_phase: [on_sin, on_cos, off_sin, off_cos],
            sleep_stats: duration_stats(&durations),
            episodes,
        }
    }
}
