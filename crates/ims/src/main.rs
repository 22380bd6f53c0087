//! ims: compare a background and a raw particle image.
//!
//! Loads the Background, then the Raw image (as a user would, one after
//! the other), runs the difference / binarize / contour pipeline, writes
//! every stage preview as a PNG and prints a summary.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin ims -- [OPTIONS] <BACKGROUND> <RAW>
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use ims_io::settings::DEFAULT_SETTINGS_FILE;
use ims_io::{JsonSettings, PngPreviewShell, decode_file};
use ims_pipeline::{Pipeline, PipelineError, UserSlot};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::report::Summary;

/// Background-difference particle inspection.
///
/// Computes |Background - Raw|, thresholds it, traces contours in the
/// resulting mask and writes each stage as a PNG preview.
#[derive(Parser)]
#[command(name = "ims", version)]
struct Cli {
    /// Background image (TIFF, PNG, BMP, JPEG; 8-bit gray or RGB).
    background: PathBuf,

    /// Raw image to inspect (same size as the background).
    raw: PathBuf,

    /// Binarization threshold (0-255). Defaults to the saved value.
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<f64>,

    /// Directory for stage previews.
    #[arg(long, default_value = "previews")]
    out_dir: PathBuf,

    /// Scale previews to fit a square box of this many pixels.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    fit: Option<u32>,

    /// Seed for contour colours.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Settings file.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Print the summary as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

type CliError = Box<dyn std::error::Error>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one session. Returns `Ok(false)` if no result could be computed.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let mut settings = JsonSettings::load(&cli.settings)?;
    let shell = PngPreviewShell::new(cli.out_dir.clone(), cli.fit)?;
    let mut pipeline = Pipeline::new(Box::new(shell));
    pipeline.restore(&settings);
    if let Some(threshold) = cli.threshold {
        pipeline.set_threshold(threshold);
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut latest = None;
    for (slot, path) in [
        (UserSlot::Background, &cli.background),
        (UserSlot::Raw, &cli.raw),
    ] {
        latest = load(&mut pipeline, slot, path, &mut rng)?;
    }

    let outcome = match latest {
        Some(report) => Ok(report),
        // Nothing ran; ask again to learn why.
        None => pipeline.recompute(&mut rng),
    };

    // A load that never reached a recompute leaves --threshold unchecked.
    pipeline.correct_threshold();
    pipeline.save(&mut settings);
    settings.save()?;
    info!(path = %settings.path().display(), "settings saved");

    let summary = Summary::new(&pipeline, outcome.as_ref().ok(), &cli.out_dir);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }

    match outcome {
        Ok(_) => Ok(true),
        Err(e) => {
            eprintln!("no result: {e}");
            Ok(false)
        }
    }
}

/// Decode `path` and hand it to the pipeline.
///
/// Unsupported pixel formats are reported and skipped, leaving the slot
/// as it was.
fn load(
    pipeline: &mut Pipeline,
    slot: UserSlot,
    path: &Path,
    rng: &mut StdRng,
) -> Result<Option<ims_pipeline::RecomputeReport>, CliError> {
    info!(%slot, path = %path.display(), "loading");
    let image = decode_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let source = source_path(path);
    match pipeline.load_user_image(slot, image, Some(&source), rng) {
        Ok(report) => Ok(report),
        Err(e @ PipelineError::UnsupportedFormat(_)) => {
            eprintln!("{slot} ignored ({}): {e}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// `path` made absolute against the working directory.
fn source_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_sources_are_made_absolute() {
        let source = source_path(Path::new("raw.tif"));
        assert!(source.is_absolute());
        assert_eq!(source.file_name(), Some("raw.tif".as_ref()));
        assert!(source.parent().is_some_and(|dir| !dir.as_os_str().is_empty()));
    }

    #[test]
    fn absolute_sources_are_kept() {
        let path = std::env::temp_dir().join("bg.tif");
        assert_eq!(source_path(&path), path);
    }

    #[test]
    fn cli_accepts_a_negative_threshold() {
        let cli = Cli::try_parse_from(["ims", "--threshold", "-4", "bg.tif", "raw.tif"]);
        assert!(cli.is_ok_and(|c| c.threshold.is_some_and(|t| (t + 4.0).abs() < f64::EPSILON)));
    }
}
