//! Per-row multiplicative scan-line distortion.
//!
//! Real scanning probes acquire one line at a time and drift between
//! lines. Each row is scaled by its own factor drawn from
//! `Normal(1, intensity)`, giving the characteristic horizontal streaks.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::types::{Heightmap, SpmError, validate_std_dev};

/// Multiply every row of `image` by an independent Gaussian factor with
/// mean 1 and standard deviation `intensity`, in place.
///
/// Exactly one sample is drawn from `rng` per row, top to bottom. With
/// `intensity == 0.0` every factor is exactly 1 and the image is left
/// unchanged.
///
/// # Errors
///
/// Returns [`SpmError::InvalidParameter`] if `intensity` is negative or
/// non-finite. The image is not modified in that case.
pub fn add_line_distortion<R: Rng + ?Sized>(
    image: &mut Heightmap,
    intensity: f64,
    rng: &mut R,
) -> Result<(), SpmError> {
    validate_std_dev("lines", intensity)?;
    let normal = Normal::new(1.0, intensity)
        .map_err(|e| SpmError::InvalidParameter(format!("lines: {e}")))?;

    for mut row in image.rows_mut() {
        let factor = normal.sample(rng);
        row.mapv_inplace(|v| v * factor);
    }
    Ok(())
}
