mod ingest;
mod render;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use parcae_core::{
    compare, format_hm, resolve_data_dir, Fingerprint, FingerprintComparison, InferenceResult,
    Parcae, ParcaeConfig, ProfileMatcher, TypicalSchedule,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(
    name = "parcae",
    author,
    version,
    about = "Infer sleep schedule and timezone from activity timestamps",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV of activity timestamps
    Analyze {
        /// CSV file with a 'timestamp' column
        csv: PathBuf,
        /// Model bundle (default: <data dir>/models/hmm.json)
        #[arg(short, long)]
        model: Option<PathBuf>,
        /// Lowest candidate UTC offset, in hours
        #[arg(long, allow_negative_numbers = true)]
        tz_min: Option<i32>,
        /// Highest candidate UTC offset, in hours
        #[arg(long, allow_negative_numbers = true)]
        tz_max: Option<i32>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two fingerprints
    Compare {
        /// First fingerprint (parcae:v1:...)
        fp1: String,
        /// Second fingerprint (parcae:v1:...)
        fp2: String,
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// Setup
// =============================================================================

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config() -> Result<ParcaeConfig> {
    let dir = resolve_data_dir();
    ParcaeConfig::load_or_default(&dir)
        .with_context(|| format!("Failed to load config from {}", dir.display()))
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(flatten)]
    result: &'a InferenceResult,
    schedule: TypicalSchedule,
    fingerprint: String,
}

fn cmd_analyze(
    csv: PathBuf,
    model: Option<PathBuf>,
    tz_min: Option<i32>,
    tz_max: Option<i32>,
    json: bool,
) -> Result<()> {
    let mut config = load_config()?;
    if model.is_some() {
        config.model_path = model;
    }
    if let Some(v) = tz_min {
        config.tz_min = v;
    }
    if let Some(v) = tz_max {
        config.tz_max = v;
    }

    let parcae = Parcae::from_config(&config).with_context(|| {
        format!(
            "Failed to load model from {}",
            config.model_path().display()
        )
    })?;
    let timestamps = ingest::read_csv(&csv)?;
    let result = parcae.analyze(&timestamps)?;
    let schedule = TypicalSchedule::from_result(&result);
    let fingerprint = result.fingerprint().to_string();

    if json {
        let out = AnalyzeOutput {
            result: &result,
            schedule,
            fingerprint,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("+ Parcae analysis");
    println!();
    println!("~ inferred timezone: UTC{:+}", result.timezone_offset_hours);
    println!();

    println!("+ typical schedule:");
    match (schedule.sleep_onset, schedule.sleep_offset) {
        (Some(onset), Some(offset)) => {
            println!(
                "\t- sleep: {} -> {}  (≈ {})",
                format_hm(onset),
                format_hm(offset),
                render::format_duration(schedule.median_duration_minutes)
            );
            println!("\t- awake: {} -> {}", format_hm(offset), format_hm(onset));
            println!("\t- variability: ±{}m", schedule.variability_minutes);
        }
        _ => println!("\t- sleep: not detected"),
    }
    println!();

    let width = result.profile_24h.len();
    println!("+ activity profile (24h):");
    println!("\t{}", render::sparkline(&result.profile_24h));
    println!("\t{}", render::hour_axis(width));
    println!("\t{}", render::hour_labels(width));
    println!();

    println!("+ fingerprint:");
    println!("\t{fingerprint}");
    println!();

    println!("~ based on {:.2} days of data", result.days);
    println!("~ bin size: {} minutes", result.bin_minutes);
    Ok(())
}

// =============================================================================
// Compare
// =============================================================================

#[derive(Serialize)]
struct CompareOutput {
    #[serde(flatten)]
    comparison: FingerprintComparison,
    threshold: f64,
    matches: bool,
}

fn cmd_compare(fp1: &str, fp2: &str, json: bool) -> Result<()> {
    let config = load_config()?;
    let a: Fingerprint = fp1.parse()?;
    let b: Fingerprint = fp2.parse()?;
    let comparison = compare(&a, &b)?;
    let matcher = ProfileMatcher::from_config(&config);
    let verification = matcher.verify_match(&a, &b)?;

    let out = CompareOutput {
        comparison,
        threshold: matcher.threshold(),
        matches: verification.matches,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("+ fingerprint comparison:");
    println!("\tcosine similarity: {:.4}", out.comparison.similarity);
    println!("\tmatch: {}", out.comparison.verdict.description());
    println!(
        "\tthreshold {:.2}: {}",
        out.threshold,
        if out.matches { "met" } else { "not met" }
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            csv,
            model,
            tz_min,
            tz_max,
            json,
        } => cmd_analyze(csv, model, tz_min, tz_max, json),
        Commands::Compare { fp1, fp2, json } => cmd_compare(&fp1, &fp2, json),
    }
}
