//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, TIFF, WebP) and produces a
//! floating-point [`Heightmap`] with luminance in `[0, 1]`.
//!
//! This is the first step in the pipeline: raw bytes in, heightmap out.

use crate::types::{Heightmap, SpmError};

/// Rec. 709 luminance weights, the same ones the `image` crate uses.
const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Decode raw image bytes and convert to a luminance heightmap.
///
/// Color images are reduced with the Rec. 709 luminance weights used by
/// the `image` crate. Images with an alpha channel are first composited
/// over a white background, so fully transparent pixels read as 1.0.
/// Integer formats are scaled so that full white is exactly 1.0.
///
/// # Errors
///
/// Returns [`SpmError::EmptyInput`] if `bytes` is empty.
/// Returns [`SpmError::ImageLoad`] if the image format is unrecognized
/// or the data is corrupt.
pub fn decode_heightmap(bytes: &[u8]) -> Result<Heightmap, SpmError> {
    if bytes.is_empty() {
        return Err(SpmError::EmptyInput);
    }

    let decoded = image::load_from_memory(bytes)?;
    let cols = decoded.width() as usize;
    let rows = decoded.height() as usize;

    let raw: Vec<f32> = if decoded.color().has_alpha() {
        decoded
            .to_rgba32f()
            .pixels()
            .map(|p| luminance_over_white(p.0))
            .collect()
    } else {
        decoded.to_luma32f().into_raw()
    };

    Ok(Heightmap::from_shape_fn((rows, cols), |(r, c)| {
        f64::from(raw[r * cols + c])
    }))
}

/// Composite one RGBA pixel over white and take its luminance.
fn luminance_over_white([r, g, b, a]: [f32; 4]) -> f32 {
    let a = a.clamp(0.0, 1.0);
    let over_white = |c: f32| c.mul_add(a, 1.0 - a);
    LUMA_WEIGHTS[0].mul_add(
        over_white(r),
        LUMA_WEIGHTS[1].mul_add(over_white(g), LUMA_WEIGHTS[2] * over_white(b)),
    )
}
