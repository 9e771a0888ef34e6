//! Pseudo-color rendering of a heightmap to an RGB raster.
//!
//! One output pixel per sample, no axes or margins. The scale bar, if
//! any, is drawn on top in the lower-right corner.

use fakespm_pipeline::Heightmap;
use image::{ImageEncoder, RgbImage};

use crate::ExportError;
use crate::colormap::{Colormap, Normalize, YL_OR_BR};
use crate::scalebar::ScaleBar;

/// How a heightmap is turned into a picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Sequential colormap applied after normalizing to `[0, 1]`.
    pub colormap: Colormap,
    /// Overlay settings, or `None` for a bare image.
    pub scale_bar: Option<ScaleBar>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            colormap: YL_OR_BR,
            scale_bar: Some(ScaleBar::default()),
        }
    }
}

/// Map `image` through the colormap and overlay the scale bar.
///
/// Samples are normalized over the image's own finite min/max. A flat
/// image renders entirely in the colormap's floor color.
///
/// # Errors
///
/// Returns [`ExportError::Render`] if the image has no samples or a
/// dimension does not fit in `u32`.
pub fn render(image: &Heightmap, options: &RenderOptions) -> Result<RgbImage, ExportError> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Err(ExportError::Render(format!(
            "cannot render an empty {rows}x{cols} image"
        )));
    }
    let (Ok(height), Ok(width)) = (u32::try_from(rows), u32::try_from(cols)) else {
        return Err(ExportError::Render(format!(
            "image {rows}x{cols} is too large to render"
        )));
    };

    let norm = Normalize::from_values(image.iter());
    let mut canvas = RgbImage::from_fn(width, height, |x, y| {
        options
            .colormap
            .color_at(norm.apply(image[[y as usize, x as usize]]))
    });

    if let Some(bar) = &options.scale_bar
        && bar.draw(&mut canvas).is_none()
    {
        tracing::debug!(width, height, "image too small for a scale bar");
    }

    Ok(canvas)
}

/// Encode an RGB raster as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::PngEncode`] if the encoder fails.
pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder.write_image(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

/// Render `image` and encode it as PNG in one step.
///
/// # Errors
///
/// See [`render`] and [`encode_png`].
pub fn to_png(image: &Heightmap, options: &RenderOptions) -> Result<Vec<u8>, ExportError> {
    encode_png(&render(image, options)?)
}
