//! Pretrained two-state HMM of daily activity.
//!
//! The bundle is produced by an external training job and consumed here
//! read-only: three probability matrices plus the bin width the training
//! data was discretized with. Log-space copies of every matrix are computed
//! once at load time and shared by all scoring calls.

use crate::error::{ParcaeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of hidden states.
pub const N_STATES: usize = 2;
/// Number of observable symbols (0 = inactive, 1 = active).
pub const N_SYMBOLS: usize = 2;
/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

const PROB_TOLERANCE: f64 = 1e-6;

/// On-disk form of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub startprob: [f64; N_STATES],
    pub transmat: [[f64; N_STATES]; N_STATES],
    pub emissionprob: [[f64; N_SYMBOLS]; N_STATES],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_minutes: Option<u32>,
}

impl ModelParams {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Validated, immutable model with precomputed log probabilities.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    params: ModelParams,
    bin_minutes: u32,
    log_start: [f64; N_STATES],
    log_trans: [[f64; N_STATES]; N_STATES],
    log_emit: [[f64; N_SYMBOLS]; N_STATES],
    sleep_state: usize,
    awake_state: usize,
}

impl TrainedModel {
    /// Build a model from raw parameters.
    ///
    /// `default_bin_minutes` applies when the bundle does not carry its own
    /// bin width.
    pub fn from_params(params: ModelParams, default_bin_minutes: u32) -> Result<Self> {
        let bin_minutes = params.bin_minutes.unwrap_or(default_bin_minutes);
        validate_bin_minutes(bin_minutes).map_err(ParcaeError::InvalidModel)?;

        check_distribution("startprob", &params.startprob)?;
        for (i, row) in params.transmat.iter().enumerate() {
            check_distribution(&format!("transmat row {i}"), row)?;
        }
        for (i, row) in params.emissionprob.iter().enumerate() {
            check_distribution(&format!("emissionprob row {i}"), row)?;
        }

        let active_0 = params.emissionprob[0][1];
        let active_1 = params.emissionprob[1][1];
        if active_0 == active_1 {
            return Err(ParcaeError::DegenerateModel(active_0));
        }
        let sleep_state = if active_0 < active_1 { 0 } else { 1 };

        Ok(Self {
            bin_minutes,
            log_start: params.startprob.map(f64::ln),
            log_trans: params.transmat.map(|row| row.map(f64::ln)),
            log_emit: params.emissionprob.map(|row| row.map(f64::ln)),
            sleep_state,
            awake_state: 1 - sleep_state,
            params,
        })
    }

    /// Load a model bundle from a JSON file.
    pub fn load(path: impl AsRef<Path>, default_bin_minutes: u32) -> Result<Self> {
        let path = path.as_ref();
        let params = ModelParams::from_json_file(path)?;
        let model = Self::from_params(params, default_bin_minutes)?;
        log::info!(
            "loaded model from {} ({} min bins, sleep state {})",
            path.display(),
            model.bin_minutes,
            model.sleep_state
        );
        Ok(model)
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn bin_minutes(&self) -> u32 {
        self.bin_minutes
    }

    pub fn bins_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.bin_minutes) as usize
    }

    /// Hidden state with the lower probability of emitting "active".
    pub fn sleep_state(&self) -> usize {
        self.sleep_state
    }

    pub fn awake_state(&self) -> usize {
        self.awake_state
    }

    pub fn log_start(&self) -> &[f64; N_STATES] {
        &self.log_start
    }

    pub fn log_trans(&self) -> &[[f64; N_STATES]; N_STATES] {
        &self.log_trans
    }

    pub fn log_emit(&self) -> &[[f64; N_SYMBOLS]; N_STATES] {
        &self.log_emit
    }
}

/// A bin width must be positive and tile a day exactly.
pub fn validate_bin_minutes(bin_minutes: u32) -> std::result::Result<(), String> {
    if bin_minutes == 0 || MINUTES_PER_DAY % bin_minutes != 0 {
        return Err(format!(
            "bin_minutes must be positive and divide {MINUTES_PER_DAY}, got {bin_minutes}"
        ));
    }
    Ok(())
}

fn check_distribution(name: &str, row: &[f64]) -> Result<()> {
    if row.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
        return Err(ParcaeError::InvalidModel(format!(
            "{name} has entries outside [0, 1]: {row:?}"
        )));
    }
    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > PROB_TOLERANCE {
        return Err(ParcaeError::InvalidModel(format!(
            "{name} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}
