//! Behavioral Fingerprints
//!
//! A fingerprint is the feature vector of one inference result
//! (`profile_24h ++ sleep_phase ++ sleep_stats`), quantized to 16-bit fixed
//! point and carried as a short URL-safe token:
//!
//! ```text
//! parcae:v1:<base64url, no padding, little-endian i16 values>
//! ```
//!
//! Two fingerprints are compared by cosine similarity of their decoded
//! vectors.
//!
//! # Usage
//!
//! ```rust,ignore
//! use parcae_core::fingerprint::{compare, Fingerprint};
//!
//! let a: Fingerprint = token_a.parse()?;
//! let b: Fingerprint = token_b.parse()?;
//! let cmp = compare(&a, &b)?;
//! println!("{:.4} {}", cmp.similarity, cmp.verdict.description());
//! ```

pub mod codec;
pub mod comparison;

pub use comparison::{
    compare, compare_tokens, cosine_similarity, FingerprintComparison, MatchResult, MatchVerdict,
    ProfileMatcher, VerificationResult,
};

use crate::error::{ParcaeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token namespace.
pub const NAMESPACE: &str = "parcae";
/// Token format version. Bump on any change to quantization or layout.
pub const VERSION: &str = "v1";
/// Fixed-point scale: one unit of the real value is 4096 steps.
pub const SCALE: f64 = 4096.0;

/// Label attached to a stored fingerprint.
pub type ProfileId = String;

// =============================================================================
// Feature Vector
// =============================================================================

/// Real-valued features prior to quantization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Concatenate the three feature groups in their canonical order.
    pub fn from_parts(profile_24h: &[f64], sleep_phase: &[f64; 4], sleep_stats: &[f64; 3]) -> Self {
        let mut values = Vec::with_capacity(profile_24h.len() + 7);
        values.extend_from_slice(profile_24h);
        values.extend_from_slice(sleep_phase);
        values.extend_from_slice(sleep_stats);
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    pub fn to_fingerprint(&self) -> Fingerprint {
        Fingerprint::from_features(self)
    }
}

// =============================================================================
// Fingerprint
// =============================================================================

/// Quantized feature vector. Displays as, and parses from, its token form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint {
    values: Vec<i16>,
}

impl Fingerprint {
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            values: codec::quantize_all(features.as_slice()),
        }
    }

    pub fn from_quantized(values: Vec<i16>) -> Self {
        Self { values }
    }

    /// Parse a `parcae:v1:...` token.
    pub fn decode(token: &str) -> Result<Self> {
        Ok(Self {
            values: codec::decode_token(token)?,
        })
    }

    pub fn token(&self) -> String {
        codec::encode_token(&self.values)
    }

    /// Raw fixed-point values.
    pub fn quantized(&self) -> &[i16] {
        &self.values
    }

    /// Dequantized values.
    pub fn to_features(&self) -> FeatureVector {
        FeatureVector(self.values.iter().map(|&q| codec::dequantize(q)).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl FromStr for Fingerprint {
    type Err = ParcaeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParcaeError;

    fn try_from(s: String) -> Result<Self> {
        Self::decode(&s)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> String {
        fp.token()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FingerprintError;

    #[test]
    fn test_feature_order() {
        let fv = FeatureVector::from_parts(&[0.1, 0.2], &[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0]);
        assert_eq!(fv.as_slice(), &[0.1, 0.2, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(fv.len(), 9);
    }

    #[test]
    fn test_token_shape() {
        let fp = FeatureVector::new(vec![0.0, 1.0, -1.0]).to_fingerprint();
        let token = fp.to_string();
        assert!(token.starts_with("parcae:v1:"));
        assert!(!token.contains('='));
        assert_eq!(fp.quantized(), &[0, 4096, -4096]);
    }

    #[test]
    fn test_parse_roundtrip() {
        let fp = FeatureVector::new(vec![0.5, 0.25, -0.125]).to_fingerprint();
        let parsed: Fingerprint = fp.token().parse().unwrap();
        assert_eq!(parsed, fp);
        assert_eq!(parsed.to_features().as_slice(), &[0.5, 0.25, -0.125]);
    }

    #[test]
    fn test_parse_error_kind() {
        let err = "other:v1:AAAA".parse::<Fingerprint>().unwrap_err();
        assert!(matches!(
            err,
            ParcaeError::MalformedFingerprint(FingerprintError::UnknownNamespace(_))
        ));
    }

    #[test]
    fn test_serde_as_token() {
        let fp = FeatureVector::new(vec![0.75, 0.0]).to_fingerprint();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.token()));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fp);
        assert!(serde_json::from_str::<Fingerprint>("\"parcae:v2:AAAA\"").is_err());
    }

    #[test]
    fn test_empty_fingerprint_roundtrips() {
        let fp = FeatureVector::new(vec![]).to_fingerprint();
        assert!(fp.is_empty());
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(parsed, fp);
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(serde_json::from_str::<Fingerprint>(&json).unwrap(), fp);
    }
}
