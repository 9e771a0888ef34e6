//! Sequential pseudo-color mapping.
//!
//! SPM images are traditionally shown in warm "afmhot"-like palettes.
//! [`YL_OR_BR`] is the nine-step ColorBrewer Yellow-Orange-Brown ramp,
//! interpolated linearly between the anchors.

use image::Rgb;

/// A sequential colormap defined by evenly spaced RGB anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    anchors: &'static [[u8; 3]],
}

/// ColorBrewer `YlOrBr`: pale yellow at 0.0 through dark brown at 1.0.
pub const YL_OR_BR: Colormap = Colormap {
    anchors: &[
        [0xff, 0xff, 0xe5],
        [0xff, 0xf7, 0xbc],
        [0xfe, 0xe3, 0x91],
        [0xfe, 0xc4, 0x4f],
        [0xfe, 0x99, 0x29],
        [0xec, 0x70, 0x14],
        [0xcc, 0x4c, 0x02],
        [0x99, 0x34, 0x04],
        [0x66, 0x25, 0x06],
    ],
};

impl Colormap {
    /// Color at position `t`, clamped to `[0, 1]`. NaN maps to the
    /// bottom of the ramp.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn color_at(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.anchors.len() - 1;
        let pos = t * last as f64;
        let i = (pos.floor() as usize).min(last.saturating_sub(1));
        let frac = pos - i as f64;
        let a = self.anchors[i];
        let b = self.anchors[(i + 1).min(last)];

        let lerp = |lo: u8, hi: u8| -> u8 {
            (f64::from(hi) - f64::from(lo))
                .mul_add(frac, f64::from(lo))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb([lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])])
    }

    /// The color used for the lowest values.
    #[must_use]
    pub fn floor(&self) -> Rgb<u8> {
        self.color_at(0.0)
    }

    /// The color used for the highest values.
    #[must_use]
    pub fn ceiling(&self) -> Rgb<u8> {
        self.color_at(1.0)
    }
}

/// Linear normalization of samples onto `[0, 1]` using the data's own
/// extremes.
///
/// A flat range (`min == max`) maps every sample to 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    min: f64,
    max: f64,
}

impl Normalize {
    /// Normalization spanning the finite extremes of `values`.
    ///
    /// Non-finite samples are ignored; an input without finite samples
    /// yields the flat range `[0, 0]`.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            Self { min: 0.0, max: 0.0 }
        } else {
            Self { min, max }
        }
    }

    /// Map `v` onto `[0, 1]`.
    #[must_use]
    pub fn apply(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((v - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
