//! Inference pipeline: bin, search offsets, align, then derive sleep
//! features from the aligned vector.

use crate::analysis::profile::daily_profile;
use crate::analysis::sleep::{extract_episodes, SleepEpisode, SleepSummary};
use crate::analysis::timezone;
use crate::binning::{bin_timestamps, check_span};
use crate::config::ParcaeConfig;
use crate::error::{ParcaeError, Result};
use crate::fingerprint::{FeatureVector, Fingerprint};
use crate::hmm::viterbi;
use crate::model::TrainedModel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything inferred from one timestamp stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub timezone_offset_hours: i32,
    /// Span between the first and last timestamp, in days.
    pub days: f64,
    /// sin/cos of mean sleep onset, then sin/cos of mean sleep offset.
    pub sleep_phase: [f64; 4],
    /// mean/std/median sleep duration as a fraction of a day.
    pub sleep_stats: [f64; 3],
    /// Mean activity per time-of-day bin, in local time.
    pub profile_24h: Vec<f64>,
    /// Score of the selected offset.
    pub log_likelihood: f64,
    pub bin_minutes: u32,
    pub sleep_episodes: Vec<SleepEpisode>,
}

impl InferenceResult {
    /// `profile_24h ++ sleep_phase ++ sleep_stats`.
    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector::from_parts(&self.profile_24h, &self.sleep_phase, &self.sleep_stats)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.feature_vector().to_fingerprint()
    }
}

/// Analyzer bound to one model and configuration.
#[derive(Debug, Clone)]
pub struct Parcae {
    model: Arc<TrainedModel>,
    config: ParcaeConfig,
}

impl Parcae {
    pub fn new(model: Arc<TrainedModel>, config: ParcaeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Load the model the configuration points at.
    pub fn from_config(config: &ParcaeConfig) -> Result<Self> {
        let model = TrainedModel::load(config.model_path(), config.default_bin_minutes)?;
        Self::new(Arc::new(model), config.clone())
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn config(&self) -> &ParcaeConfig {
        &self.config
    }

    /// Analyze time-ascending timestamps over the configured offset range.
    pub fn analyze(&self, timestamps: &[NaiveDateTime]) -> Result<InferenceResult> {
        self.analyze_with_offsets(timestamps, self.config.offsets())
    }

    /// Sort, then analyze.
    pub fn analyze_unsorted(&self, mut timestamps: Vec<NaiveDateTime>) -> Result<InferenceResult> {
        timestamps.sort_unstable();
        self.analyze(&timestamps)
    }

    /// Analyze time-ascending timestamps against an explicit set of
    /// candidate offsets.
    pub fn analyze_with_offsets(
        &self,
        timestamps: &[NaiveDateTime],
        offsets: impl IntoIterator<Item = i32>,
    ) -> Result<InferenceResult> {
        if timestamps.is_empty() {
            return Err(ParcaeError::EmptyInput("timestamps"));
        }
        let min_span = self.config.min_span_days;
        let days = check_span(timestamps, min_span)?;

        let model = self.model.as_ref();
        let vector = bin_timestamps(timestamps, model.bin_minutes())?;
        vector.ensure_min_bins(min_span)?;

        let search = timezone::search(model, &vector, offsets, self.config.parallel)?;
        let aligned = vector.rotated(search.best.shift_bins);

        let path = viterbi::decode(model, aligned.bins());
        let episodes = extract_episodes(
            &path,
            model.sleep_state(),
            aligned.bins_per_day(),
            model.bin_minutes(),
        );
        log::debug!(
            "{} sleep episodes at UTC{:+}",
            episodes.len(),
            search.best.offset_hours
        );
        let summary = SleepSummary::from_episodes(episodes);

        Ok(InferenceResult {
            timezone_offset_hours: search.best.offset_hours,
            days,
            sleep_phase: summary.sleep_phase,
            sleep_stats: summary.sleep_stats,
            profile_24h: daily_profile(&aligned),
            log_likelihood: search.best.log_likelihood,
            bin_minutes: model.bin_minutes(),
            sleep_episodes: summary.episodes,
        })
    }
}
