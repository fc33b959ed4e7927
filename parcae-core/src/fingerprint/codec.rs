//! Fixed-point quantization and token encoding.
//!
//! Quantization rounds half to even in single precision and saturates to the
//! `i16` range; NaN maps to 0. Payloads are packed little-endian and
//! base64url-encoded without padding. Decoding also accepts padded payloads.

use super::{NAMESPACE, SCALE, VERSION};
use crate::error::FingerprintError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Real value to fixed point.
pub fn quantize(x: f64) -> i16 {
    // `as` saturates and maps NaN to 0.
    ((x as f32) * SCALE as f32).round_ties_even() as i16
}

pub fn dequantize(q: i16) -> f64 {
    f64::from(q) / SCALE
}

pub fn quantize_all(values: &[f64]) -> Vec<i16> {
    values.iter().map(|&x| quantize(x)).collect()
}

/// Little-endian byte image of `values`.
pub fn pack(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// An empty payload is an empty vector.
pub fn unpack(bytes: &[u8]) -> Result<Vec<i16>, FingerprintError> {
    if bytes.len() % 2 != 0 {
        return Err(FingerprintError::OddPayloadLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// `parcae:v1:<payload>` for already-quantized values.
pub fn encode_token(values: &[i16]) -> String {
    format!(
        "{NAMESPACE}:{VERSION}:{}",
        URL_SAFE_NO_PAD.encode(pack(values))
    )
}

/// Parse a token back to its quantized values.
pub fn decode_token(token: &str) -> Result<Vec<i16>, FingerprintError> {
    let mut parts = token.trim().splitn(3, ':');
    let (namespace, version, payload) = match (parts.next(), parts.next(), parts.next()) {
        (Some(n), Some(v), Some(p)) => (n, v, p),
        _ => return Err(FingerprintError::MissingSeparator),
    };
    if namespace != NAMESPACE {
        return Err(FingerprintError::UnknownNamespace(namespace.to_string()));
    }
    if version != VERSION {
        return Err(FingerprintError::UnsupportedVersion(version.to_string()));
    }
    let bytes = LENIENT_URL_SAFE
        .decode(payload)
        .map_err(|_| FingerprintError::InvalidBase64)?;
    unpack(&bytes)
}

/// Quantize and encode real values in one step.
pub fn encode(values: &[f64]) -> String {
    encode_token(&quantize_all(values))
}

/// Decode a token to its (lossy) real values.
pub fn decode(token: &str) -> Result<Vec<f64>, FingerprintError> {
    Ok(decode_token(token)?.into_iter().map(dequantize).collect())
}
