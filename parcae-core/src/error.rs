use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParcaeError>;

#[derive(Debug, Error)]
pub enum ParcaeError {
    #[error("parcae: not enough time span to analyze ({days:.2} days, need at least {required})")]
    InsufficientSpan { days: f64, required: f64 },
    #[error("parcae: not enough data after binning ({bins} bins, need at least {required})")]
    InsufficientBins { bins: usize, required: usize },
    #[error("parcae: degenerate model, states emit activity with equal probability {0}")]
    DegenerateModel(f64),
    #[error("parcae: invalid model: {0}")]
    InvalidModel(String),
    #[error("parcae: invalid config: {0}")]
    InvalidConfig(String),
    #[error("parcae: malformed fingerprint: {0}")]
    MalformedFingerprint(#[from] FingerprintError),
    #[error("parcae: dimension mismatch ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
    #[error("parcae: invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("parcae: empty input: {0}")]
    EmptyInput(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a fingerprint token failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FingerprintError {
    #[error("expected <namespace>:<version>:<payload>")]
    MissingSeparator,
    #[error("unknown namespace {0:?}")]
    UnknownNamespace(String),
    #[error("unsupported version {0:?}")]
    UnsupportedVersion(String),
    #[error("invalid base64 payload")]
    InvalidBase64,
    #[error("payload length {0} is not a whole number of 16-bit values")]
    OddPayloadLength(usize),
}
