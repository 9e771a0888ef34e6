//! Minimal stroke font for scale-bar labels.
//!
//! Only the characters a length label can contain are defined: digits,
//! the decimal point, a space, and the SI prefix and unit letters
//! `k c m µ n`. Each glyph is a list of segments between grid points
//! `0..=4` across and `0..=7` down (baseline at y = 6, descenders reach
//! y = 7) and is drawn by stamping `scale × scale` squares along every
//! segment, so a glyph covers 5×8 cells.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Glyph width in cells.
const GLYPH_WIDTH: u32 = 5;
/// Horizontal advance per character in cells.
const ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Line height in cells, including the descender.
const LINE_HEIGHT: u32 = 8;

type Segment = ((u8, u8), (u8, u8));

fn glyph(c: char) -> Option<&'static [Segment]> {
    let segments: &'static [Segment] = match c {
        '0' => &[((0, 0), (4, 0)), ((4, 0), (4, 6)), ((4, 6), (0, 6)), ((0, 6), (0, 0))],
        '1' => &[((2, 0), (2, 6)), ((1, 1), (2, 0)), ((1, 6), (3, 6))],
        '2' => &[
            ((0, 0), (4, 0)),
            ((4, 0), (4, 3)),
            ((4, 3), (0, 3)),
            ((0, 3), (0, 6)),
            ((0, 6), (4, 6)),
        ],
        '3' => &[((0, 0), (4, 0)), ((4, 0), (4, 6)), ((0, 3), (4, 3)), ((0, 6), (4, 6))],
        '4' => &[((0, 0), (0, 3)), ((0, 3), (4, 3)), ((4, 0), (4, 6))],
        '5' => &[
            ((4, 0), (0, 0)),
            ((0, 0), (0, 3)),
            ((0, 3), (4, 3)),
            ((4, 3), (4, 6)),
            ((4, 6), (0, 6)),
        ],
        '6' => &[
            ((4, 0), (0, 0)),
            ((0, 0), (0, 6)),
            ((0, 6), (4, 6)),
            ((4, 6), (4, 3)),
            ((4, 3), (0, 3)),
        ],
        '7' => &[((0, 0), (4, 0)), ((4, 0), (1, 6))],
        '8' => &[
            ((0, 0), (4, 0)),
            ((4, 0), (4, 6)),
            ((4, 6), (0, 6)),
            ((0, 6), (0, 0)),
            ((0, 3), (4, 3)),
        ],
        '9' => &[
            ((4, 3), (0, 3)),
            ((0, 3), (0, 0)),
            ((0, 0), (4, 0)),
            ((4, 0), (4, 6)),
            ((4, 6), (0, 6)),
        ],
        '.' => &[((2, 6), (2, 6))],
        ' ' => &[],
        'k' => &[((0, 0), (0, 6)), ((0, 4), (4, 2)), ((2, 3), (4, 6))],
        'c' => &[((4, 2), (0, 2)), ((0, 2), (0, 6)), ((0, 6), (4, 6))],
        'm' => &[((0, 2), (0, 6)), ((0, 2), (4, 2)), ((2, 2), (2, 6)), ((4, 2), (4, 6))],
        'n' => &[((0, 2), (0, 6)), ((0, 2), (4, 2)), ((4, 2), (4, 6))],
        'µ' => &[((0, 2), (0, 7)), ((0, 6), (4, 6)), ((4, 2), (4, 6))],
        _ => return None,
    };
    Some(segments)
}

/// Returns `true` if every character of `text` has a glyph.
pub fn can_render(text: &str) -> bool {
    text.chars().all(|c| glyph(c).is_some())
}

/// Rendered width of `text` in pixels.
#[allow(clippy::cast_possible_truncation)]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    (n * ADVANCE).saturating_sub(1) * scale
}

/// Rendered height of one line in pixels.
pub const fn text_height(scale: u32) -> u32 {
    LINE_HEIGHT * scale
}

/// Draw `text` with its top-left corner at (`x`, `y`).
///
/// Characters without a glyph are skipped but still advance the pen.
pub fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    for (i, c) in (0u32..).zip(text.chars()) {
        let Some(segments) = glyph(c) else {
            continue;
        };
        let origin_x = x + i * ADVANCE * scale;
        for &(from, to) in segments {
            draw_segment(canvas, (origin_x, y), from, to, scale, color);
        }
    }
}

fn draw_segment(
    canvas: &mut RgbImage,
    origin: (u32, u32),
    from: (u8, u8),
    to: (u8, u8),
    scale: u32,
    color: Rgb<u8>,
) {
    let (x0, y0) = (i64::from(from.0), i64::from(from.1));
    let (x1, y1) = (i64::from(to.0), i64::from(to.1));
    let s = i64::from(scale);
    let steps = (x1 - x0).abs().max((y1 - y0).abs()) * s;

    for k in 0..=steps {
        // Integer interpolation in pixel space, rounded to nearest.
        let (px, py) = if steps == 0 {
            (x0 * s, y0 * s)
        } else {
            (
                x0 * s + ((x1 - x0) * s * k * 2 + steps) / (steps * 2),
                y0 * s + ((y1 - y0) * s * k * 2 + steps) / (steps * 2),
            )
        };
        stamp(
            canvas,
            i64::from(origin.0) + px,
            i64::from(origin.1) + py,
            scale,
            color,
        );
    }
}

fn stamp(canvas: &mut RgbImage, x: i64, y: i64, size: u32, color: Rgb<u8>) {
    let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) else {
        return;
    };
    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(size, size), color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn inked(img: &RgbImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == BLACK)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn label_characters_are_supported() {
        for label in ["25 cm", "1 m", "2.5 mm", "750 µm", "10 nm", "5 km"] {
            assert!(can_render(label), "missing glyph in {label:?}");
        }
        assert!(!can_render("25 ft"));
    }

    #[test]
    fn width_and_height_scale() {
        assert_eq!(text_width("25 cm", 1), 29);
        assert_eq!(text_width("25 cm", 2), 58);
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_height(2), 16);
    }

    #[test]
    fn ink_stays_inside_text_box() {
        let mut img = RgbImage::from_pixel(60, 30, WHITE);
        draw_text(&mut img, "2.5 µm", 5, 5, 1, BLACK);
        let ink = inked(&img);
        assert!(!ink.is_empty());
        let right = 5 + text_width("2.5 µm", 1);
        let bottom = 5 + text_height(1);
        for (x, y) in ink {
            assert!((5..right).contains(&x), "x={x} outside text box");
            assert!((5..bottom).contains(&y), "y={y} outside text box");
        }
    }

    #[test]
    fn digits_look_different() {
        let render = |c: &str| {
            let mut img = RgbImage::from_pixel(6, 9, WHITE);
            draw_text(&mut img, c, 0, 0, 1, BLACK);
            inked(&img)
        };
        let glyphs: Vec<_> = (0..10).map(|d| render(&d.to_string())).collect();
        for a in 0..10 {
            for b in (a + 1)..10 {
                assert_ne!(glyphs[a], glyphs[b], "digits {a} and {b} render identically");
            }
        }
    }

    #[test]
    fn drawing_near_edge_is_clipped() {
        let mut img = RgbImage::from_pixel(3, 3, WHITE);
        draw_text(&mut img, "88", 1, 1, 2, BLACK);
        assert!(!inked(&img).is_empty());
    }
}
