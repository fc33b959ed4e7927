//! Timestamp ingestion from CSV exports.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use parcae_core::ParcaeError;
use std::fs;
use std::path::Path;

const TIMESTAMP_COLUMN: &str = "timestamp";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse one timestamp as naive wall-clock time.
///
/// Values carrying an offset (`Z`, `+02:00`) are converted to UTC first.
pub fn parse_timestamp(raw: &str) -> parcae_core::Result<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(ParcaeError::InvalidTimestamp(s.to_string()))
}

/// Split one CSV record, honoring double quotes and `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Timestamps from the `timestamp` column of CSV text, sorted ascending.
pub fn parse_csv(text: &str) -> Result<Vec<NaiveDateTime>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or_else(|| anyhow!("CSV is empty"))?;
    let column = split_record(header)
        .iter()
        .position(|h| h.trim().trim_start_matches('\u{feff}') == TIMESTAMP_COLUMN)
        .ok_or_else(|| anyhow!("CSV must have a '{TIMESTAMP_COLUMN}' column"))?;

    let mut timestamps = Vec::new();
    for (line_no, line) in lines {
        let fields = split_record(line);
        let raw = fields
            .get(column)
            .ok_or_else(|| anyhow!("line {line_no}: missing '{TIMESTAMP_COLUMN}' field"))?;
        let ts = parse_timestamp(raw).with_context(|| format!("line {line_no}"))?;
        timestamps.push(ts);
    }

    timestamps.sort_unstable();
    log::info!("read {} timestamps", timestamps.len());
    Ok(timestamps)
}

pub fn read_csv(path: &Path) -> Result<Vec<NaiveDateTime>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_csv(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
