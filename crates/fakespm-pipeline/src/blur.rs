//! Block-average downscaling.
//!
//! Lowers the effective resolution the way a coarse scan would: the
//! image is cut into non-overlapping `block × block` tiles and each tile
//! collapses to its mean. Trailing rows and columns that do not fill a
//! whole tile are discarded, so the output shape is
//! `floor(rows / block) × floor(cols / block)`.

use ndarray::s;

use crate::types::{Heightmap, SpmError, validate_block};

/// Replace every `block × block` tile with its mean.
///
/// A block size of 1 returns an unchanged copy.
///
/// # Errors
///
/// Returns [`SpmError::InvalidParameter`] if `block` is zero, or if it
/// exceeds either image dimension so that no whole tile fits.
#[allow(clippy::cast_precision_loss)]
pub fn block_average(image: &Heightmap, block: u32) -> Result<Heightmap, SpmError> {
    validate_block(block)?;
    let b = block as usize;
    let (rows, cols) = image.dim();
    let (out_rows, out_cols) = (rows / b, cols / b);

    if out_rows == 0 || out_cols == 0 {
        return Err(SpmError::InvalidParameter(format!(
            "blur block size {block} exceeds the {rows}x{cols} image",
        )));
    }
    if b == 1 {
        return Ok(image.clone());
    }

    let area = (b * b) as f64;
    Ok(Heightmap::from_shape_fn((out_rows, out_cols), |(r, c)| {
        image
            .slice(s![r * b..(r + 1) * b, c * b..(c + 1) * b])
            .sum()
            / area
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Heightmap {
        Heightmap::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64)
    }

    #[test]
    fn block_of_one_is_identity() {
        let img = ramp(7, 5);
        assert_eq!(block_average(&img, 1).unwrap(), img);
    }

    #[test]
    fn output_shape_floors() {
        for &(rows, cols, block) in &[(100, 100, 5), (103, 57, 5), (10, 31, 3), (9, 9, 9)] {
            let out = block_average(&Heightmap::zeros((rows, cols)), block).unwrap();
            let b = block as usize;
            assert_eq!(
                out.dim(),
                (rows / b, cols / b),
                "shape mismatch for {rows}x{cols} with block {block}",
            );
        }
    }

    #[test]
    fn tiles_collapse_to_mean() {
        // 2x4 image, block 2 -> 1x2.
        //  0  1  2  3
        //  4  5  6  7
        let img = ramp(2, 4);
        let out = block_average(&img, 2).unwrap();
        assert_eq!(out.dim(), (1, 2));
        assert!((out[[0, 0]] - 2.5).abs() < 1e-12);
        assert!((out[[0, 1]] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn trailing_partial_tiles_are_dropped() {
        // The last row and column do not fill a 2x2 tile.
        let img = ramp(3, 3);
        let out = block_average(&img, 2).unwrap();
        assert_eq!(out.dim(), (1, 1));
        // Mean of 0, 1, 3, 4.
        assert!((out[[0, 0]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let img = Heightmap::from_elem((20, 30), 0.25);
        let out = block_average(&img, 4).unwrap();
        assert!(out.iter().all(|&v| (v - 0.25).abs() < 1e-12));
    }

    #[test]
    fn zero_block_is_invalid() {
        let result = block_average(&ramp(4, 4), 0);
        assert!(matches!(result, Err(SpmError::InvalidParameter(_))));
    }

    #[test]
    fn block_larger_than_image_is_invalid() {
        let result = block_average(&ramp(4, 40), 5);
        assert!(matches!(result, Err(SpmError::InvalidParameter(_))));
    }
}
