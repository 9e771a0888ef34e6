//! Additive Gaussian noise.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::types::{Heightmap, SpmError, validate_std_dev};

/// Add independent zero-mean Gaussian noise with standard deviation
/// `sigma` to every sample.
///
/// Returns a new heightmap; the input is left untouched. With
/// `sigma == 0.0` every perturbation is exactly zero, so the result
/// equals the input.
///
/// # Errors
///
/// Returns [`SpmError::InvalidParameter`] if `sigma` is negative or
/// non-finite.
pub fn add_noise<R: Rng + ?Sized>(
    image: &Heightmap,
    sigma: f64,
    rng: &mut R,
) -> Result<Heightmap, SpmError> {
    validate_std_dev("noise", sigma)?;
    let normal = Normal::new(0.0, sigma)
        .map_err(|e| SpmError::InvalidParameter(format!("noise: {e}")))?;

    Ok(image.mapv(|v| v + normal.sample(rng)))
}
