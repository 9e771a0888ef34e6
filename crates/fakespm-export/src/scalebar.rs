//! Scale bar overlay.
//!
//! Draws a horizontal bar in the lower-right corner with its length
//! written underneath, sized to the largest "nice" length that fits in
//! a fraction of the image width. The calibration is a fixed, purely
//! cosmetic metres-per-pixel ratio; it does not describe the input
//! photograph.

use std::fmt;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::font;

/// SI prefixes tried from largest to smallest.
const PREFIXES: [(&str, f64); 6] = [
    ("k", 1e3),
    ("", 1.0),
    ("c", 1e-2),
    ("m", 1e-3),
    ("µ", 1e-6),
    ("n", 1e-9),
];

/// Bar lengths considered "nice", in the chosen unit.
const PREFERRED_VALUES: [f64; 15] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 25.0, 50.0, 75.0, 100.0, 125.0, 150.0, 200.0, 500.0, 750.0,
];

/// A length expressed as a value and an SI prefix of metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    value: f64,
    prefix: &'static str,
    factor: f64,
}

impl Length {
    /// Numeric value in the prefixed unit.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// The length in metres.
    #[must_use]
    pub fn metres(self) -> f64 {
        self.value * self.factor
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}m", self.value, self.prefix)
    }
}

/// Largest nice length not exceeding `max_metres`.
///
/// Returns `None` for non-positive or non-finite input, or when even
/// one nanometre is too long.
#[must_use]
pub fn nice_length(max_metres: f64) -> Option<Length> {
    if !max_metres.is_finite() || max_metres <= 0.0 {
        return None;
    }
    let &(prefix, factor) = PREFIXES.iter().find(|(_, f)| max_metres / f >= 1.0)?;
    // Tolerate rounding in the unit conversion (0.25 / 0.01 != 25.0).
    let in_unit = max_metres / factor * (1.0 + 1e-9);
    let value = PREFERRED_VALUES.iter().rev().find(|&&v| v <= in_unit).copied()?;
    Some(Length {
        value,
        prefix,
        factor,
    })
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Returns `true` if (`x`, `y`) lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Where the bar and its label land on a given canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBarLayout {
    /// The physical length the bar represents.
    pub length: Length,
    /// The bar itself.
    pub bar: PixelRect,
    /// Label text and its box, omitted when the canvas is too small.
    pub label: Option<(String, PixelRect)>,
    /// Glyph scale used for the label.
    pub font_scale: u32,
}

impl ScaleBarLayout {
    /// Bounding box of bar and label together.
    #[must_use]
    pub fn bounds(&self) -> PixelRect {
        let Some((_, label)) = &self.label else {
            return self.bar;
        };
        let x = self.bar.x.min(label.x);
        let y = self.bar.y.min(label.y);
        let right = (self.bar.x + self.bar.width).max(label.x + label.width);
        let bottom = (self.bar.y + self.bar.height).max(label.y + label.height);
        PixelRect {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

/// Scale bar settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBar {
    /// Physical size of one image pixel.
    pub metres_per_pixel: f64,
    /// Maximum bar length as a fraction of the image width.
    pub length_fraction: f64,
    /// Bar and label color.
    pub color: Rgb<u8>,
}

impl ScaleBar {
    /// 1.2 cm per pixel.
    pub const DEFAULT_METRES_PER_PIXEL: f64 = 0.012;
    /// A quarter of the image width.
    pub const DEFAULT_LENGTH_FRACTION: f64 = 0.25;

    /// Compute the placement on a `width × height` canvas.
    ///
    /// Returns `None` if the calibration is unusable or the canvas is
    /// too small to hold the bar with its padding. The label is dropped
    /// first when space is short.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn layout(&self, width: u32, height: u32) -> Option<ScaleBarLayout> {
        if width == 0 || height == 0 || !self.metres_per_pixel.is_finite() {
            return None;
        }
        if self.metres_per_pixel <= 0.0 {
            return None;
        }

        let max_metres = f64::from(width) * self.metres_per_pixel * self.length_fraction;
        let length = nice_length(max_metres)?;
        let bar_px = (length.metres() / self.metres_per_pixel).round() as u32;
        if bar_px == 0 {
            return None;
        }

        let font_scale = (width.min(height) / 150).max(1);
        let pad = 3 * font_scale;
        let gap = 2 * font_scale;
        let thickness = (height / 100).max(1);

        if bar_px + 2 * pad > width || thickness + 2 * pad > height {
            return None;
        }

        let text = length.to_string();
        let label_w = font::text_width(&text, font_scale);
        let label_h = font::text_height(font_scale);
        let with_label = font::can_render(&text)
            && bar_px.max(label_w) + 2 * pad <= width
            && thickness + gap + label_h + 2 * pad <= height;

        let (block_w, block_h) = if with_label {
            (bar_px.max(label_w), thickness + gap + label_h)
        } else {
            (bar_px, thickness)
        };
        let left = width - pad - block_w;
        let top = height - pad - block_h;

        let bar = PixelRect {
            x: left + (block_w - bar_px) / 2,
            y: top,
            width: bar_px,
            height: thickness,
        };
        let label = with_label.then(|| {
            let rect = PixelRect {
                x: left + (block_w - label_w) / 2,
                y: top + thickness + gap,
                width: label_w,
                height: label_h,
            };
            (text, rect)
        });

        Some(ScaleBarLayout {
            length,
            bar,
            label,
            font_scale,
        })
    }

    /// Draw the bar (and label, if it fits) onto `canvas`.
    ///
    /// Returns the layout used, or `None` if nothing was drawn.
    pub fn draw(&self, canvas: &mut RgbImage) -> Option<ScaleBarLayout> {
        let layout = self.layout(canvas.width(), canvas.height())?;

        let (Ok(x), Ok(y)) = (i32::try_from(layout.bar.x), i32::try_from(layout.bar.y)) else {
            return None;
        };
        draw_filled_rect_mut(
            canvas,
            Rect::at(x, y).of_size(layout.bar.width, layout.bar.height),
            self.color,
        );

        if let Some((text, rect)) = &layout.label {
            font::draw_text(canvas, text, rect.x, rect.y, layout.font_scale, self.color);
        }
        tracing::debug!(length = %layout.length, bar_px = layout.bar.width, "scale bar drawn");
        Some(layout)
    }
}

impl Default for ScaleBar {
    fn default() -> Self {
        Self {
            metres_per_pixel: Self::DEFAULT_METRES_PER_PIXEL,
            length_fraction: Self::DEFAULT_LENGTH_FRACTION,
            color: Rgb([0, 0, 0]),
        }
    }
}
