//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use fakespm_pipeline::{Pipeline, SpmConfig, SpmError};
//! # use rand::SeedableRng;
//! # fn run(png: Vec<u8>) -> Result<(), SpmError> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let staged = Pipeline::new(png, SpmConfig::default())?
//!     .decode()?
//!     .add_noise(&mut rng)?
//!     .blur()?
//!     .distort_lines(&mut rng)?
//!     .stretch_contrast()?
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state,
//! carrying all previously computed intermediates.

use rand::Rng;

use crate::types::{Heightmap, Shape, SpmConfig, SpmError};

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Validate `config` and wrap the source bytes in a [`Pending`]
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SpmError::InvalidParameter`] if any parameter is outside
    /// its domain. No decoding happens before this check.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(source: Vec<u8>, config: SpmConfig) -> Result<Pending, SpmError> {
        config.validate()?;
        Ok(Pending { config, source })
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    config: SpmConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`SpmError::EmptyInput`] or [`SpmError::ImageLoad`] if the
    /// bytes are not a decodable image.
    pub fn decode(self) -> Result<Decoded, SpmError> {
        let original = crate::grayscale::decode_heightmap(&self.source)?;
        tracing::debug!(shape = %Shape::of(&original), "decoded");
        Ok(Decoded {
            config: self.config,
            original,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding to a luminance heightmap.
#[must_use = "pipeline stages are consumed by advancing; call .add_noise() to continue"]
pub struct Decoded {
    config: SpmConfig,
    original: Heightmap,
}

impl Decoded {
    /// The decoded luminance image.
    #[must_use]
    pub const fn original(&self) -> &Heightmap {
        &self.original
    }

    /// Add Gaussian noise and advance to the [`Noised`] stage.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::noise::add_noise`] errors.
    pub fn add_noise<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Noised, SpmError> {
        let noised = crate::noise::add_noise(&self.original, self.config.noise, rng)?;
        tracing::debug!(sigma = self.config.noise, "noise added");
        Ok(Noised {
            config: self.config,
            original: self.original,
            noised,
        })
    }
}

// ───────────────────────── Stage 2: Noised ───────────────────────────

/// Pipeline state after additive noise.
#[must_use = "pipeline stages are consumed by advancing; call .blur() to continue"]
pub struct Noised {
    config: SpmConfig,
    original: Heightmap,
    noised: Heightmap,
}

impl Noised {
    /// The noisy image.
    #[must_use]
    pub const fn noised(&self) -> &Heightmap {
        &self.noised
    }

    /// Block-average downscale and advance to the [`Blurred`] stage.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::blur::block_average`] errors.
    pub fn blur(self) -> Result<Blurred, SpmError> {
        let blurred = crate::blur::block_average(&self.noised, self.config.blur)?;
        tracing::debug!(block = self.config.blur, shape = %Shape::of(&blurred), "blurred");
        Ok(Blurred {
            config: self.config,
            original: self.original,
            noised: self.noised,
            blurred,
        })
    }
}

// ───────────────────────── Stage 3: Blurred ──────────────────────────

/// Pipeline state after block-average downscaling.
#[must_use = "pipeline stages are consumed by advancing; call .distort_lines() to continue"]
pub struct Blurred {
    config: SpmConfig,
    original: Heightmap,
    noised: Heightmap,
    blurred: Heightmap,
}

impl Blurred {
    /// The downscaled image.
    #[must_use]
    pub const fn blurred(&self) -> &Heightmap {
        &self.blurred
    }

    /// Apply per-row line distortion and advance to the [`Distorted`]
    /// stage.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::lines::add_line_distortion`] errors.
    pub fn distort_lines<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Distorted, SpmError> {
        let mut distorted = self.blurred.clone();
        crate::lines::add_line_distortion(&mut distorted, self.config.lines, rng)?;
        tracing::debug!(intensity = self.config.lines, "line distortion applied");
        Ok(Distorted {
            config: self.config,
            original: self.original,
            noised: self.noised,
            blurred: self.blurred,
            distorted,
        })
    }
}

// ───────────────────────── Stage 4: Distorted ────────────────────────

/// Pipeline state after line distortion.
#[must_use = "pipeline stages are consumed by advancing; call .stretch_contrast() to continue"]
pub struct Distorted {
    config: SpmConfig,
    original: Heightmap,
    noised: Heightmap,
    blurred: Heightmap,
    distorted: Heightmap,
}

impl Distorted {
    /// The line-distorted image.
    #[must_use]
    pub const fn distorted(&self) -> &Heightmap {
        &self.distorted
    }

    /// Apply the percentile contrast stretch and advance to the
    /// [`Stretched`] stage.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::contrast::set_contrast`] errors.
    pub fn stretch_contrast(self) -> Result<Stretched, SpmError> {
        let stretched = crate::contrast::set_contrast(&self.distorted, self.config.contrast)?;
        tracing::debug!(contrast = %self.config.contrast, "contrast stretched");
        Ok(Stretched {
            result: StagedResult {
                config: self.config,
                original: self.original,
                noised: self.noised,
                blurred: self.blurred,
                distorted: self.distorted,
                stretched,
            },
        })
    }
}

// ───────────────────────── Stage 5: Stretched ────────────────────────

/// Final pipeline state.
#[must_use = "call .into_result() to take the staged result"]
pub struct Stretched {
    result: StagedResult,
}

impl Stretched {
    /// The final image.
    #[must_use]
    pub const fn stretched(&self) -> &Heightmap {
        &self.result.stretched
    }

    /// Consume the pipeline and return every intermediate.
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        self.result
    }
}

/// Every intermediate produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedResult {
    /// Parameters the run used.
    pub config: SpmConfig,
    /// Decoded luminance image.
    pub original: Heightmap,
    /// After additive noise.
    pub noised: Heightmap,
    /// After block-average downscaling.
    pub blurred: Heightmap,
    /// After line distortion.
    pub distorted: Heightmap,
    /// After the contrast stretch; this is what gets rendered.
    pub stretched: Heightmap,
}

impl StagedResult {
    /// The image to render and export.
    #[must_use]
    pub const fn final_image(&self) -> &Heightmap {
        &self.stretched
    }

    /// Consume the result, keeping only the final image.
    #[must_use]
    pub fn into_final_image(self) -> Heightmap {
        self.stretched
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::types::Contrast;

    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        #[allow(clippy::cast_possible_truncation)]
        let img = image::GrayImage::from_fn(width, height, |x, _| {
            image::Luma([(x * 255 / (width - 1)) as u8])
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn invalid_config_rejected_before_decode() {
        // The bytes are garbage, but validation must fail first.
        let config = SpmConfig {
            blur: 0,
            ..SpmConfig::default()
        };
        let result = Pipeline::new(vec![0xFF], config);
        assert!(matches!(result, Err(SpmError::InvalidParameter(_))));
    }

    #[test]
    fn stages_expose_intermediates() {
        let mut rng = StdRng::seed_from_u64(11);
        let decoded = Pipeline::new(gradient_png(40, 30), SpmConfig::default())
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(decoded.original().dim(), (30, 40));

        let noised = decoded.add_noise(&mut rng).unwrap();
        assert_eq!(noised.noised().dim(), (30, 40));

        let blurred = noised.blur().unwrap();
        assert_eq!(blurred.blurred().dim(), (6, 8));

        let distorted = blurred.distort_lines(&mut rng).unwrap();
        assert_eq!(distorted.distorted().dim(), (6, 8));

        let stretched = distorted.stretch_contrast().unwrap();
        assert!(stretched.stretched().iter().all(|v| (-1.0..=1.0).contains(v)));

        let result = stretched.into_result();
        assert_eq!(result.original.dim(), (30, 40));
        assert_eq!(result.final_image().dim(), (6, 8));
    }

    #[test]
    fn quiet_config_preserves_gradient() {
        let config = SpmConfig {
            noise: 0.0,
            blur: 1,
            lines: 0.0,
            contrast: Contrast::new(0.0, 100.0),
            txt_out: false,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let result = Pipeline::new(gradient_png(16, 4), config)
            .unwrap()
            .decode()
            .unwrap()
            .add_noise(&mut rng)
            .unwrap()
            .blur()
            .unwrap()
            .distort_lines(&mut rng)
            .unwrap()
            .stretch_contrast()
            .unwrap()
            .into_result();

        assert_eq!(result.noised, result.original);
        assert_eq!(result.blurred, result.original);
        assert_eq!(result.distorted, result.original);
        let out = result.final_image();
        assert!(out[[0, 0]].abs() < 1e-9);
        assert!((out[[3, 15]] - 1.0).abs() < 1e-9);
        assert!(out[[2, 5]] < out[[2, 6]]);
    }

    #[test]
    fn blur_larger_than_image_fails_at_blur_stage() {
        let config = SpmConfig {
            blur: 50,
            ..SpmConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let noised = Pipeline::new(gradient_png(10, 10), config)
            .unwrap()
            .decode()
            .unwrap()
            .add_noise(&mut rng)
            .unwrap();
        assert!(matches!(noised.blur(), Err(SpmError::InvalidParameter(_))));
    }
}
