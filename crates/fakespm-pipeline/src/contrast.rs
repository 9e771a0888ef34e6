//! Percentile-based contrast stretch.
//!
//! The samples at the `low` and `high` percentiles become the bottom and
//! top of the output range; everything in between is mapped linearly and
//! everything outside is clipped.
//!
//! The output range follows the usual float image convention: `[0, 1]`
//! when the lower cut is non-negative, `[-1, 1]` otherwise (noise can
//! push dark samples below zero).

use crate::types::{Contrast, Heightmap, SpmError};

/// Compute the `p`-th percentile (`0..=100`) of `values`, interpolating
/// linearly between the two closest ranks.
///
/// `values` must already be sorted ascending. Returns `None` for an
/// empty slice.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile_of_sorted(values: &[f64], p: f64) -> Option<f64> {
    let last = values.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let frac = rank - rank.floor();
    let lo = values[below];
    let hi = values[above.min(last)];
    Some((hi - lo).mul_add(frac, lo))
}

/// Output range for a stretch whose lower cut is `v_low`.
const fn output_range(v_low: f64) -> (f64, f64) {
    if v_low >= 0.0 { (0.0, 1.0) } else { (-1.0, 1.0) }
}

/// Stretch `image` so that its `contrast.low` and `contrast.high`
/// percentiles span the full output range.
///
/// If both percentiles land on the same value there is nothing to
/// stretch; samples are clipped to that value and then to the output
/// range. Percentiles are taken over finite samples only. An image
/// without finite samples is returned unchanged.
///
/// # Errors
///
/// Returns [`SpmError::InvalidParameter`] if the percentile pair is
/// invalid (see [`Contrast::validate`]).
pub fn set_contrast(image: &Heightmap, contrast: Contrast) -> Result<Heightmap, SpmError> {
    contrast.validate()?;

    // Non-finite samples would poison the window bounds.
    let mut sorted: Vec<f64> = image.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_unstable_by(f64::total_cmp);
    let (Some(v_low), Some(v_high)) = (
        percentile_of_sorted(&sorted, contrast.low),
        percentile_of_sorted(&sorted, contrast.high),
    ) else {
        return Ok(image.clone());
    };

    let (out_min, out_max) = output_range(v_low);
    tracing::debug!(v_low, v_high, out_min, out_max, "contrast window");

    if v_high > v_low {
        let gain = (out_max - out_min) / (v_high - v_low);
        Ok(image.mapv(|v| {
            let clipped = v.clamp(v_low, v_high);
            (clipped - v_low).mul_add(gain, out_min)
        }))
    } else {
        Ok(image.mapv(|v| v.clamp(v_low, v_high).clamp(out_min, out_max)))
    }
}
