//! fakespm: turn a photograph into a fake scanning-probe-microscopy image.
//!
//! Reads one image, runs it through the degradation pipeline and writes
//! `spm_out.png` (and optionally `spm_out.txt`) to the current directory.
//!
//! # Usage
//!
//! ```text
//! fakespm photo.jpg --noise=0.05 --blur=3 --contrast="(1,99)" --txt_out
//! ```
//!
//! Set `RUST_LOG=debug` to see the per-stage diagnostics report.

#![allow(clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use fakespm_export::{ExportError, RenderOptions};
use fakespm_pipeline::diagnostics::{Clock, process_with_diagnostics};
use fakespm_pipeline::{Contrast, SpmConfig, SpmError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

/// Rendered image, written to the current directory.
const PNG_OUT: &str = "spm_out.png";
/// Text dump of the final samples, written when `--txt_out` is set.
const TXT_OUT: &str = "spm_out.txt";

/// Make an ordinary photograph look like a scanning probe microscopy
/// image.
///
/// The image is converted to grayscale, noised, block-averaged, given
/// scan-line artifacts and contrast-stretched, then rendered with a warm
/// colormap and a scale bar.
#[derive(Parser, Debug)]
#[command(name = "fakespm", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, TIFF, WebP).
    image_path: PathBuf,

    /// Standard deviation of the additive Gaussian noise.
    #[arg(long, default_value_t = SpmConfig::DEFAULT_NOISE, allow_negative_numbers = true)]
    noise: f64,

    /// Block size for the block-average blur (1 disables it).
    #[arg(long, default_value_t = i64::from(SpmConfig::DEFAULT_BLUR), allow_negative_numbers = true)]
    blur: i64,

    /// Standard deviation of the per-row line distortion factor.
    #[arg(long, default_value_t = SpmConfig::DEFAULT_LINES, allow_negative_numbers = true)]
    lines: f64,

    /// Contrast percentile window, e.g. "(0.1,98)", "0.1,98" or "[0.1,98]".
    #[arg(
        long,
        default_value_t = SpmConfig::DEFAULT_CONTRAST,
        value_parser = parse_contrast,
        allow_hyphen_values = true,
    )]
    contrast: Contrast,

    /// Also write the final sample values to spm_out.txt.
    #[arg(
        long = "txt_out",
        visible_alias = "txt-out",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
    )]
    txt_out: bool,
}

impl Cli {
    /// Assemble and validate the pipeline parameters.
    fn config(&self) -> Result<SpmConfig, SpmError> {
        let blur = u32::try_from(self.blur).map_err(|_| {
            SpmError::InvalidParameter(format!(
                "blur block size must be a positive integer, got {}",
                self.blur,
            ))
        })?;
        let config = SpmConfig {
            noise: self.noise,
            blur,
            lines: self.lines,
            contrast: self.contrast,
            txt_out: self.txt_out,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse a percentile pair written as a tuple, a list or bare.
fn parse_contrast(s: &str) -> Result<Contrast, String> {
    let trimmed = s.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .or_else(|| {
            trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
        })
        .unwrap_or(trimmed);

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let &[low, high] = parts.as_slice() else {
        return Err(format!("expected two comma-separated percentiles, got {s:?}"));
    };
    let parse = |v: &str| {
        v.parse::<f64>()
            .map_err(|e| format!("invalid percentile {v:?}: {e}"))
    };
    Ok(Contrast::new(parse(low)?, parse(high)?))
}

/// Everything that can stop a run.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to load image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(#[from] SpmError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.config()?;
    if let Ok(json) = serde_json::to_string(&config) {
        tracing::debug!(config = %json, "configuration");
    }

    let image_bytes = std::fs::read(&cli.image_path).map_err(|source| CliError::Read {
        path: cli.image_path.clone(),
        source,
    })?;
    tracing::info!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "loaded input",
    );

    let mut rng = StdRng::from_entropy();
    let (staged, diagnostics) = process_with_diagnostics(&image_bytes, &config, &mut rng, &StdClock)?;
    tracing::debug!("\n{}", diagnostics.report());

    let image = staged.into_final_image();
    let png = fakespm_export::to_png(&image, &RenderOptions::default())?;
    write_output(Path::new(PNG_OUT), &png)?;

    if config.txt_out {
        write_output(Path::new(TXT_OUT), fakespm_export::to_text(&image).as_bytes())?;
    }

    Ok(())
}

fn write_output(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
