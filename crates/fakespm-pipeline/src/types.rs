//! Shared types for the fakespm degradation pipeline.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A single-channel intensity image, indexed `[[row, col]]`.
///
/// Decoded images start out in `[0, 1]`; later stages may push samples
/// outside that range until the contrast stretch clips them back.
pub type Heightmap = Array2<f64>;

/// Shape of a [`Heightmap`] in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Number of rows (image height).
    pub rows: usize,
    /// Number of columns (image width).
    pub cols: usize,
}

impl Shape {
    /// Shape of an existing heightmap.
    #[must_use]
    pub fn of(image: &Heightmap) -> Self {
        let (rows, cols) = image.dim();
        Self { rows, cols }
    }

    /// Total number of samples.
    #[must_use]
    pub const fn len(self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Percentile pair for the contrast stretch, both in `[0, 100]`.
///
/// The sample at the `low` percentile maps to the bottom of the output
/// range and the sample at the `high` percentile maps to the top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contrast {
    /// Lower percentile.
    pub low: f64,
    /// Upper percentile. Must be strictly greater than `low`.
    pub high: f64,
}

impl Contrast {
    /// Create a percentile pair without validating it.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Check that both percentiles lie in `[0, 100]` and `low < high`.
    ///
    /// # Errors
    ///
    /// Returns [`SpmError::InvalidParameter`] describing the first
    /// violated constraint.
    pub fn validate(self) -> Result<(), SpmError> {
        let percent = 0.0..=100.0;
        if !percent.contains(&self.low) || !percent.contains(&self.high) {
            return Err(SpmError::InvalidParameter(format!(
                "contrast percentiles must lie in [0, 100], got ({}, {})",
                self.low, self.high,
            )));
        }
        if self.low >= self.high {
            return Err(SpmError::InvalidParameter(format!(
                "contrast low percentile must be below the high one, got ({}, {})",
                self.low, self.high,
            )));
        }
        Ok(())
    }
}

impl Default for Contrast {
    fn default() -> Self {
        SpmConfig::DEFAULT_CONTRAST
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

/// Parameters for one pipeline run.
///
/// Constructed once at startup and passed by reference into every stage.
/// Call [`validate`](Self::validate) before touching any input; the
/// pipeline entry points do so themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpmConfig {
    /// Standard deviation of the additive Gaussian noise.
    pub noise: f64,

    /// Side length of the square blocks averaged by the blur stage.
    /// A value of 1 keeps the image unchanged.
    pub blur: u32,

    /// Standard deviation of the per-row multiplicative factor.
    pub lines: f64,

    /// Percentile window for the contrast stretch.
    pub contrast: Contrast,

    /// Also write the final sample values as text.
    pub txt_out: bool,
}

impl SpmConfig {
    /// Default noise level.
    pub const DEFAULT_NOISE: f64 = 0.1;
    /// Default block size for the blur stage.
    pub const DEFAULT_BLUR: u32 = 5;
    /// Default line distortion intensity.
    pub const DEFAULT_LINES: f64 = 0.02;
    /// Default contrast percentile window.
    pub const DEFAULT_CONTRAST: Contrast = Contrast::new(0.1, 98.0);

    /// Check every parameter against its documented domain.
    ///
    /// # Errors
    ///
    /// Returns [`SpmError::InvalidParameter`] if the noise level or line
    /// intensity is negative or non-finite, if the blur block size is
    /// zero, or if the contrast window is invalid.
    pub fn validate(&self) -> Result<(), SpmError> {
        validate_std_dev("noise", self.noise)?;
        validate_block(self.blur)?;
        validate_std_dev("lines", self.lines)?;
        self.contrast.validate()
    }
}

impl Default for SpmConfig {
    fn default() -> Self {
        Self {
            noise: Self::DEFAULT_NOISE,
            blur: Self::DEFAULT_BLUR,
            lines: Self::DEFAULT_LINES,
            contrast: Self::DEFAULT_CONTRAST,
            txt_out: false,
        }
    }
}

pub(crate) fn validate_std_dev(name: &str, value: f64) -> Result<(), SpmError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SpmError::InvalidParameter(format!(
            "{name} must be a finite, non-negative number, got {value}"
        )))
    }
}

pub(crate) fn validate_block(block: u32) -> Result<(), SpmError> {
    if block == 0 {
        Err(SpmError::InvalidParameter(
            "blur block size must be a positive integer, got 0".to_owned(),
        ))
    } else {
        Ok(())
    }
}

/// Errors that can occur while producing a fake SPM image.
#[derive(Debug, thiserror::Error)]
pub enum SpmError {
    /// The input could not be decoded as an image.
    #[error("failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// The input contained no bytes.
    #[error("failed to load image: input is empty")]
    EmptyInput,

    /// A parameter lies outside its documented domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
