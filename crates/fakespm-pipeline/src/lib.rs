//! fakespm-pipeline: Pure image degradation pipeline (sans-IO).
//!
//! Turns a photograph into something that looks like a scanning probe
//! microscopy image through:
//! decode -> noise -> blur -> line distortion -> contrast stretch.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns heightmaps. Rendering lives in
//! `fakespm-export`, filesystem interaction in the `fakespm` binary.
//!
//! Randomness is never global: the noise and line stages take an
//! explicit [`rand::Rng`], so a seeded generator gives reproducible
//! output.

pub mod blur;
pub mod contrast;
pub mod diagnostics;
pub mod grayscale;
pub mod lines;
pub mod noise;
pub mod pipeline;
pub mod types;

use rand::Rng;

pub use pipeline::{Pipeline, StagedResult};
pub use types::{Contrast, Heightmap, Shape, SpmConfig, SpmError};

/// Run the full pipeline and keep every intermediate.
///
/// # Errors
///
/// Returns [`SpmError::InvalidParameter`] if `config` fails validation
/// (checked before decoding), [`SpmError::EmptyInput`] or
/// [`SpmError::ImageLoad`] if the bytes are not a decodable image, and
/// [`SpmError::InvalidParameter`] if the blur block does not fit inside
/// the image.
pub fn process_staged<R: Rng + ?Sized>(
    image_bytes: &[u8],
    config: &SpmConfig,
    rng: &mut R,
) -> Result<StagedResult, SpmError> {
    Ok(Pipeline::new(image_bytes.to_vec(), config.clone())?
        .decode()?
        .add_noise(rng)?
        .blur()?
        .distort_lines(rng)?
        .stretch_contrast()?
        .into_result())
}

/// Run the full pipeline and return only the final heightmap.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to luminance in `[0, 1]`
/// 2. Additive Gaussian noise (`config.noise`)
/// 3. Block-average downscale (`config.blur`)
/// 4. Per-row multiplicative line distortion (`config.lines`)
/// 5. Percentile contrast stretch (`config.contrast`)
///
/// # Errors
///
/// Same as [`process_staged`].
pub fn process<R: Rng + ?Sized>(
    image_bytes: &[u8],
    config: &SpmConfig,
    rng: &mut R,
) -> Result<Heightmap, SpmError> {
    process_staged(image_bytes, config, rng).map(StagedResult::into_final_image)
}
