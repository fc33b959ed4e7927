//! Fingerprint Comparison and Profile Matching
//!
//! Fingerprints are compared by cosine similarity of their decoded feature
//! vectors and classified into a three-way verdict.

use super::{Fingerprint, ProfileId};
use crate::config::ParcaeConfig;
use crate::error::{ParcaeError, Result};
use serde::{Deserialize, Serialize};

const NORM_EPSILON: f64 = 1e-12;

// =============================================================================
// Cosine Similarity
// =============================================================================

/// Cosine similarity of two equal-length vectors, clamped to `[-1, 1]`.
///
/// Returns 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(ParcaeError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a < NORM_EPSILON || norm_b < NORM_EPSILON {
        return Ok(0.0);
    }
    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

// =============================================================================
// Comparison Result
// =============================================================================

/// Verdict from fingerprint comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVerdict {
    /// similarity > 0.95
    VeryLikelySame,
    /// similarity > 0.90
    Probable,
    Unlikely,
}

impl MatchVerdict {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity > 0.95 {
            Self::VeryLikelySame
        } else if similarity > 0.90 {
            Self::Probable
        } else {
            Self::Unlikely
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::VeryLikelySame => "very likely same user",
            Self::Probable => "probable",
            Self::Unlikely => "unlikely",
        }
    }
}

/// Result of comparing two fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintComparison {
    pub similarity: f64,
    pub verdict: MatchVerdict,
    /// Length of each decoded vector.
    pub dimensions: usize,
}

/// Compare two decoded fingerprints.
pub fn compare(a: &Fingerprint, b: &Fingerprint) -> Result<FingerprintComparison> {
    let similarity = cosine_similarity(a.to_features().as_slice(), b.to_features().as_slice())?;
    Ok(FingerprintComparison {
        similarity,
        verdict: MatchVerdict::from_similarity(similarity),
        dimensions: a.len(),
    })
}

/// Parse and compare two tokens.
pub fn compare_tokens(a: &str, b: &str) -> Result<FingerprintComparison> {
    compare(&Fingerprint::decode(a)?, &Fingerprint::decode(b)?)
}

// =============================================================================
// Profile Matcher
// =============================================================================

/// Matcher for finding similar profiles in a collection.
pub struct ProfileMatcher {
    /// Minimum similarity threshold
    threshold: f64,
    /// Maximum results to return
    max_results: usize,
}

impl ProfileMatcher {
    pub fn new() -> Self {
        Self {
            threshold: 0.90,
            max_results: 10,
        }
    }

    /// Matcher using the configured `match_threshold`.
    pub fn from_config(config: &ParcaeConfig) -> Self {
        Self::new().with_threshold(config.match_threshold)
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(-1.0, 1.0);
        self
    }

    /// Set the maximum number of results.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Candidates at or above the threshold, most similar first.
    ///
    /// Candidates whose length differs from the target are skipped.
    pub fn find_matches(
        &self,
        target: &Fingerprint,
        candidates: &[(ProfileId, Fingerprint)],
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = candidates
            .iter()
            .filter_map(|(id, candidate)| match compare(target, candidate) {
                Ok(cmp) => Some(MatchResult {
                    profile_id: id.clone(),
                    similarity: cmp.similarity,
                    verdict: cmp.verdict,
                }),
                Err(e) => {
                    log::warn!("skipping candidate {id}: {e}");
                    None
                }
            })
            .filter(|r| r.similarity >= self.threshold)
            .collect();

        // Stable, so equal scores keep candidate order.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(self.max_results);
        results
    }

    pub fn find_best_match(
        &self,
        target: &Fingerprint,
        candidates: &[(ProfileId, Fingerprint)],
    ) -> Option<MatchResult> {
        self.find_matches(target, candidates).into_iter().next()
    }

    /// Check one candidate against the threshold.
    pub fn verify_match(
        &self,
        target: &Fingerprint,
        candidate: &Fingerprint,
    ) -> Result<VerificationResult> {
        let cmp = compare(target, candidate)?;
        Ok(VerificationResult {
            matches: cmp.similarity >= self.threshold,
            similarity: cmp.similarity,
            verdict: cmp.verdict,
        })
    }
}

impl Default for ProfileMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of finding a matching profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub profile_id: ProfileId,
    pub similarity: f64,
    pub verdict: MatchVerdict,
}

/// Result of verifying a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether the fingerprints match (at or above threshold)
    pub matches: bool,
    pub similarity: f64,
    pub verdict: MatchVerdict,
}

// =============================================================================
// Tests
// =============================================================================
