use crate::analysis::timezone::{DEFAULT_TZ_MAX, DEFAULT_TZ_MIN};
use crate::binning::MIN_SPAN_DAYS;
use crate::error::{ParcaeError, Result};
use crate::model::validate_bin_minutes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARCAE_DATA_DIR";

const CONFIG_FILE: &str = "parcae.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcaeConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Explicit model bundle; `<data_dir>/models/hmm.json` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_tz_min")]
    pub tz_min: i32,
    #[serde(default = "default_tz_max")]
    pub tz_max: i32,

    #[serde(default = "default_min_span_days")]
    pub min_span_days: f64,

    /// Bin width used when the model bundle does not specify one.
    #[serde(default = "default_bin_minutes")]
    pub default_bin_minutes: u32,

    /// Score candidate offsets on the rayon pool. Needs the `parallel` feature.
    #[serde(default = "default_false")]
    pub parallel: bool,

    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

// Defaults
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".parcae"))
        .unwrap_or_else(|| PathBuf::from(".parcae"))
}
fn default_tz_min() -> i32 {
    DEFAULT_TZ_MIN
}
fn default_tz_max() -> i32 {
    DEFAULT_TZ_MAX
}
fn default_min_span_days() -> f64 {
    MIN_SPAN_DAYS
}
fn default_bin_minutes() -> u32 {
    15
}
fn default_false() -> bool {
    false
}
fn default_match_threshold() -> f64 {
    0.90
}

/// `$PARCAE_DATA_DIR` if set and non-empty, else `~/.parcae`.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_data_dir(),
    }
}

impl Default for ParcaeConfig {
    fn default() -> Self {
        Self::default_with_dir(&default_data_dir())
    }
}

impl ParcaeConfig {
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)?;
            let mut config: ParcaeConfig = serde_json::from_str(&raw)?;
            config.data_dir = data_dir.to_path_buf();
            config.validate()?;
            log::debug!("loaded config from {}", config_path.display());
            return Ok(config);
        }

        let config = Self::default_with_dir(data_dir);
        config.persist()?;
        Ok(config)
    }

    pub fn default_with_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            model_path: None,
            tz_min: default_tz_min(),
            tz_max: default_tz_max(),
            min_span_days: default_min_span_days(),
            default_bin_minutes: default_bin_minutes(),
            parallel: default_false(),
            match_threshold: default_match_threshold(),
        }
    }

    pub fn persist(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let config_path = self.data_dir.join(CONFIG_FILE);
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(config_path, raw)?;
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("models").join("hmm.json"))
    }

    /// Candidate UTC offsets, in hours.
    pub fn offsets(&self) -> RangeInclusive<i32> {
        self.tz_min..=self.tz_max
    }

    pub fn validate(&self) -> Result<()> {
        if self.tz_min > self.tz_max {
            return Err(ParcaeError::InvalidConfig(format!(
                "tz_min ({}) is greater than tz_max ({})",
                self.tz_min, self.tz_max
            )));
        }
        if !self.min_span_days.is_finite() || self.min_span_days < MIN_SPAN_DAYS {
            return Err(ParcaeError::InvalidConfig(format!(
                "min_span_days must be at least {MIN_SPAN_DAYS}, got {}",
                self.min_span_days
            )));
        }
        validate_bin_minutes(self.default_bin_minutes).map_err(ParcaeError::InvalidConfig)?;
        Ok(())
    }
}
