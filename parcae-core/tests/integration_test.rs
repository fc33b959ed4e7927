use chrono::{Duration, NaiveDate, NaiveDateTime};
use parcae_core::fingerprint::{compare, MatchVerdict};
use parcae_core::{
    InferenceResult, ModelParams, Parcae, ParcaeConfig, ParcaeError, TrainedModel,
    TypicalSchedule,
};
use std::sync::Arc;
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

/// Sleep state 1 emits "active" 2% of the time; a night lasts 8 h on average.
fn model() -> TrainedModel {
    let params = ModelParams {
        startprob: [0.3, 0.7],
        transmat: [[63.0 / 64.0, 1.0 / 64.0], [1.0 / 32.0, 31.0 / 32.0]],
        emissionprob: [[0.05, 0.95], [0.98, 0.02]],
        bin_minutes: Some(15),
    };
    TrainedModel::from_params(params, 15).unwrap()
}

fn analyzer(dir: &TempDir) -> Parcae {
    Parcae::new(Arc::new(model()), ParcaeConfig::default_with_dir(dir.path())).unwrap()
}

fn day0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// One event per 15-minute bin for `days` days, for a user living at
/// `utc_offset` who sleeps 00:00-08:00 local time.
fn user_events(utc_offset: i64, days: i64) -> Vec<NaiveDateTime> {
    let mut events = Vec::new();
    for d in 0..days {
        for b in 0..96i64 {
            let local_bin = (b + 4 * utc_offset).rem_euclid(96);
            if local_bin >= 32 {
                events.push(day0() + Duration::days(d) + Duration::minutes(15 * b));
            }
        }
    }
    events
}

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < 1e-9, "{got} != {want}");
}

fn assert_regular_sleeper(result: &InferenceResult) {
    let phase = [0.0, 1.0, 3f64.sqrt() / 2.0, -0.5];
    for (got, want) in result.sleep_phase.iter().zip(phase) {
        assert_close(*got, want);
    }
    assert_close(result.sleep_stats[0], 1.0 / 3.0);
    assert_close(result.sleep_stats[1], 0.0);
    assert_close(result.sleep_stats[2], 1.0 / 3.0);

    assert_eq!(result.profile_24h.len(), 96);
    assert!(result.profile_24h[..32].iter().all(|&p| p == 0.0));
    assert!(result.profile_24h[32..].iter().all(|&p| p == 1.0));
}

// =============================================================================
// End-to-end inference
// =============================================================================

#[test]
fn test_utc_user_selects_zero_offset() {
    let dir = TempDir::new().unwrap();
    let result = analyzer(&dir).analyze(&user_events(0, 14)).unwrap();

    assert_eq!(result.timezone_offset_hours, 0);
    assert_close(result.days, 13.65625);
    assert_eq!(result.sleep_episodes.len(), 13);
    assert_regular_sleeper(&result);

    let schedule = TypicalSchedule::from_result(&result);
    assert_eq!(schedule.sleep_onset, Some(0));
    assert_eq!(schedule.sleep_offset, Some(480));
    assert_eq!(schedule.median_duration_minutes, 480);
    assert_eq!(schedule.variability_minutes, 0);
}

#[test]
fn test_eastern_user_selects_positive_offset() {
    let dir = TempDir::new().unwrap();
    let result = analyzer(&dir).analyze(&user_events(3, 14)).unwrap();
    assert_eq!(result.timezone_offset_hours, 3);
    assert_regular_sleeper(&result);
}

#[test]
fn test_western_user_selects_negative_offset() {
    let dir = TempDir::new().unwrap();
    let result = analyzer(&dir).analyze(&user_events(-5, 14)).unwrap();
    assert_eq!(result.timezone_offset_hours, -5);
    assert_regular_sleeper(&result);
}

#[test]
fn test_same_habits_in_different_zones_match() {
    let dir = TempDir::new().unwrap();
    let p = analyzer(&dir);
    let utc = p.analyze(&user_events(0, 14)).unwrap().fingerprint();
    let east = p.analyze(&user_events(3, 14)).unwrap().fingerprint();

    let cmp = compare(&utc, &east).unwrap();
    assert_close(cmp.similarity, 1.0);
    assert_eq!(cmp.verdict, MatchVerdict::VeryLikelySame);
    assert_eq!(cmp.dimensions, 96 + 7);
}

#[test]
fn test_fingerprint_token_survives_text_roundtrip() {
    let dir = TempDir::new().unwrap();
    let result = analyzer(&dir).analyze(&user_events(0, 14)).unwrap();
    let token = result.fingerprint().to_string();
    assert!(token.starts_with("parcae:v1:"));

    let parsed: parcae_core::Fingerprint = token.parse().unwrap();
    assert_eq!(parsed.token(), token);
    let values = parsed.to_features();
    assert_eq!(values.len(), 103);
    assert_eq!(values.as_slice()[96..100], [0.0, 1.0, 3547.0 / 4096.0, -0.5]);
}

#[test]
fn test_result_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let result = analyzer(&dir).analyze(&user_events(0, 3)).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["timezone_offset_hours"], 0);
    assert_eq!(json["bin_minutes"], 15);
    assert_eq!(json["profile_24h"].as_array().unwrap().len(), 96);
    assert_eq!(json["sleep_phase"].as_array().unwrap().len(), 4);
    assert_eq!(json["sleep_stats"].as_array().unwrap().len(), 3);

    let back: InferenceResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.sleep_episodes, result.sleep_episodes);
    assert_eq!(back.profile_24h, result.profile_24h);
}

// =============================================================================
// Preconditions
// =============================================================================

#[test]
fn test_36_hour_span_rejected() {
    let dir = TempDir::new().unwrap();
    let ts = [day0(), day0() + Duration::hours(36)];
    assert!(matches!(
        analyzer(&dir).analyze(&ts),
        Err(ParcaeError::InsufficientSpan { .. })
    ));
}

#[test]
fn test_exactly_48_hour_span_accepted() {
    let dir = TempDir::new().unwrap();
    let ts = [day0(), day0() + Duration::hours(48)];
    let result = analyzer(&dir).analyze(&ts).unwrap();
    assert_close(result.days, 2.0);
}

#[test]
fn test_47h59m_span_rejected() {
    let dir = TempDir::new().unwrap();
    let ts = [day0(), day0() + Duration::hours(47) + Duration::minutes(59)];
    assert!(matches!(
        analyzer(&dir).analyze(&ts),
        Err(ParcaeError::InsufficientSpan { .. })
    ));
}

#[test]
fn test_model_file_pipeline() {
    let dir = TempDir::new().unwrap();
    let config = ParcaeConfig::default_with_dir(dir.path());
    model().params().save_json(config.model_path()).unwrap();

    let p = Parcae::from_config(&config).unwrap();
    let result = p.analyze_unsorted(user_events(-5, 10)).unwrap();
    assert_eq!(result.timezone_offset_hours, -5);
}
