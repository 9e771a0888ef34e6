//! Pipeline diagnostics: timing, shapes and sample ranges for each stage.
//!
//! Time is read through the [`Clock`] trait so the pipeline crate stays
//! free of platform timing concerns and tests can use a fake clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::pipeline::{Pipeline, StagedResult};
use crate::types::{Heightmap, Shape, SpmConfig, SpmError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of monotonic time for stage measurements.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Current point in time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Input size in bytes.
    pub input_bytes: usize,
    /// Stage 0: decoding to luminance.
    pub decode: StageDiagnostics,
    /// Stage 1: additive noise.
    pub noise: StageDiagnostics,
    /// Stage 2: block-average blur.
    pub blur: StageDiagnostics,
    /// Stage 3: line distortion.
    pub lines: StageDiagnostics,
    /// Stage 4: contrast stretch.
    pub contrast: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Shape of the stage output.
    pub shape: Shape,
    /// Smallest output sample, or `None` for an empty image.
    pub min: Option<f64>,
    /// Largest output sample, or `None` for an empty image.
    pub max: Option<f64>,
}

impl StageDiagnostics {
    fn measure(duration: Duration, image: &Heightmap) -> Self {
        let (min, max) = image.iter().fold((None, None), |(lo, hi), &v| {
            (
                Some(lo.map_or(v, |m: f64| m.min(v))),
                Some(hi.map_or(v, |m: f64| m.max(v))),
            )
        });
        Self {
            duration,
            shape: Shape::of(image),
            min,
            max,
        }
    }
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Input: {} bytes -> {} ({} samples)",
            self.input_bytes,
            self.decode.shape,
            self.decode.shape.len(),
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Noise", &self.noise),
            ("Blur", &self.blur),
            ("Lines", &self.lines),
            ("Contrast", &self.contrast),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let range = match (diag.min, diag.max) {
                (Some(lo), Some(hi)) => format!("[{lo:.4}, {hi:.4}]"),
                _ => "empty".to_owned(),
            };
            lines.push(format!(
                "{name:<16} {ms:>8.3}ms {pct:>9.1}%  {} {range}",
                diag.shape,
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Run the full pipeline, timing every stage with `clock`.
///
/// # Errors
///
/// Same as [`crate::process_staged`].
pub fn process_with_diagnostics<R, C>(
    image_bytes: &[u8],
    config: &SpmConfig,
    rng: &mut R,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), SpmError>
where
    R: Rng + ?Sized,
    C: Clock,
{
    let pending = Pipeline::new(image_bytes.to_vec(), config.clone())?;
    let start = clock.now();

    let t = clock.now();
    let decoded = pending.decode()?;
    let decode = StageDiagnostics::measure(clock.elapsed(&t), decoded.original());

    let t = clock.now();
    let noised = decoded.add_noise(rng)?;
    let noise = StageDiagnostics::measure(clock.elapsed(&t), noised.noised());

    let t = clock.now();
    let blurred = noised.blur()?;
    let blur = StageDiagnostics::measure(clock.elapsed(&t), blurred.blurred());

    let t = clock.now();
    let distorted = blurred.distort_lines(rng)?;
    let lines = StageDiagnostics::measure(clock.elapsed(&t), distorted.distorted());

    let t = clock.now();
    let stretched = distorted.stretch_contrast()?;
    let contrast = StageDiagnostics::measure(clock.elapsed(&t), stretched.stretched());

    let diagnostics = PipelineDiagnostics {
        input_bytes: image_bytes.len(),
        decode,
        noise,
        blur,
        lines,
        contrast,
        total_duration: clock.elapsed(&start),
    };
    Ok((stretched.into_result(), diagnostics))
}
