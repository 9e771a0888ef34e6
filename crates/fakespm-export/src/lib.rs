//! fakespm-export: Pure renderers and serializers (sans-IO)
//!
//! Turns a finished heightmap into output bytes: a pseudo-color PNG with
//! a scale bar, and a whitespace-delimited text dump. Nothing here
//! touches the filesystem.

pub mod colormap;
mod font;
pub mod render;
pub mod scalebar;
pub mod text;

pub use colormap::{Colormap, Normalize, YL_OR_BR};
pub use render::{RenderOptions, encode_png, render, to_png};
pub use scalebar::{ScaleBar, ScaleBarLayout};
pub use text::to_text;

/// Errors that can occur while producing output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The figure could not be produced.
    #[error("render failed: {0}")]
    Render(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),
}
