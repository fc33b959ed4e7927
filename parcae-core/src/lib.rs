pub mod analysis;
pub mod binning;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hmm;
pub mod model;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export common types
pub use crate::analysis::{format_hm, SleepEpisode, TypicalSchedule};
pub use crate::binning::{bin_timestamps, ActivityVector};
pub use crate::config::{resolve_data_dir, ParcaeConfig};
pub use crate::engine::{InferenceResult, Parcae};
pub use crate::error::{FingerprintError, ParcaeError, Result};
pub use crate::fingerprint::{
    compare, compare_tokens, FeatureVector, Fingerprint, FingerprintComparison, MatchVerdict,
    ProfileMatcher,
};
pub use crate::model::{ModelParams, TrainedModel};
