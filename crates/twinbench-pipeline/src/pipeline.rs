//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate buffer before continuing.
//!
//! [`crate::process`] runs every stage in one call. [`Pipeline`] lets the
//! caller drive execution one step at a time:
//!
//! ```rust
//! # use twinbench_pipeline::{Dimensions, Pipeline, PipelineError};
//! # fn run(rgba: Vec<u8>) -> Result<(), PipelineError> {
//! let finished = Pipeline::new(Dimensions::new(64, 48), rgba)?
//!     .blur()
//!     .grayscale()
//!     .resample()
//!     .warp()
//!     .reinforce_edges()
//!     .modulate()
//!     .finish();
//!
//! let output: Vec<u8> = finished.into_raw();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state. The
//! order is fixed by the types; no stage can be skipped or reordered.
//! From [`Warped`] onward every state also carries the post-warp
//! snapshot, which is the blend base for the edge passes and for the
//! final blend.

use crate::types::{Dimensions, PipelineError, RgbaImage, image_from_raw};

/// Entry point of the incremental pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Validate a raw RGBA buffer and start a pipeline run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimension`] if either side is zero
    /// and [`PipelineError::BufferLength`] if `data.len()` is not
    /// `width * height * 4`.
    pub fn new(dimensions: Dimensions, data: Vec<u8>) -> Result<Pending, PipelineError> {
        let source = image_from_raw(dimensions, data)?;
        Ok(Pending { source })
    }

    /// Start a pipeline run from an existing image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimension`] for an empty image.
    pub fn from_image(source: RgbaImage) -> Result<Pending, PipelineError> {
        let dimensions = Dimensions::of(&source);
        dimensions.validate(source.as_raw().len())?;
        Ok(Pending { source })
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Validated input, nothing processed yet.
#[must_use = "pipeline stages are consumed by advancing; call .blur() to continue"]
pub struct Pending {
    source: RgbaImage,
}

impl Pending {
    /// The caller-supplied image.
    #[must_use]
    pub const fn source(&self) -> &RgbaImage {
        &self.source
    }

    /// Box blur then Gaussian blur.
    pub fn blur(self) -> Blurred {
        tracing::debug!(dimensions = %Dimensions::of(&self.source), "blur");
        Blurred {
            image: crate::blur::blur(&self.source),
        }
    }
}

// ───────────────────────── Stage 1: Blurred ──────────────────────────

/// After both blur passes.
#[must_use = "pipeline stages are consumed by advancing; call .grayscale() to continue"]
pub struct Blurred {
    image: RgbaImage,
}

impl Blurred {
    /// The blurred image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Luma conversion of R and G, in place.
    pub fn grayscale(mut self) -> Grayscaled {
        tracing::debug!("grayscale");
        crate::grayscale::grayscale_in_place(&mut self.image);
        Grayscaled { image: self.image }
    }
}

// ───────────────────────── Stage 2: Grayscaled ───────────────────────

/// After luma conversion.
#[must_use = "pipeline stages are consumed by advancing; call .resample() to continue"]
pub struct Grayscaled {
    image: RgbaImage,
}

impl Grayscaled {
    /// The converted image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Half-resolution round trip.
    pub fn resample(self) -> Resampled {
        let dimensions = Dimensions::of(&self.image);
        tracing::debug!(%dimensions, via = %dimensions.halved(), "resample");
        Resampled {
            image: crate::resample::round_trip(&self.image),
        }
    }
}

// ───────────────────────── Stage 3: Resampled ────────────────────────

/// Back at the original size after the lossy round trip.
#[must_use = "pipeline stages are consumed by advancing; call .warp() to continue"]
pub struct Resampled {
    image: RgbaImage,
}

impl Resampled {
    /// The resampled image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Horizontal wave warp. The result becomes the blend base for all
    /// later stages.
    pub fn warp(self) -> Warped {
        tracing::debug!("wave warp");
        Warped {
            base: crate::warp::wave_warp(&self.image),
        }
    }
}

// ───────────────────────── Stage 4: Warped ───────────────────────────

/// After the wave warp. The warped image is kept unchanged from here on.
#[must_use = "pipeline stages are consumed by advancing; call .reinforce_edges() to continue"]
pub struct Warped {
    base: RgbaImage,
}

impl Warped {
    /// The warped image (blend base).
    #[must_use]
    pub const fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Run every edge reinforcement pass.
    pub fn reinforce_edges(self) -> Reinforced {
        self.reinforce_edges_with(|_, _| {})
    }

    /// Run every edge reinforcement pass, calling `after_pass` with the
    /// zero-based pass index and that pass's output.
    pub fn reinforce_edges_with(self, after_pass: impl FnMut(usize, &RgbaImage)) -> Reinforced {
        tracing::debug!(passes = crate::edge::EDGE_PASSES, "edge reinforcement");
        let current = crate::edge::reinforce_edges_with(&self.base, after_pass);
        Reinforced {
            base: self.base,
            current,
        }
    }
}

// ───────────────────────── Stage 5: Reinforced ───────────────────────

/// After all edge passes.
#[must_use = "pipeline stages are consumed by advancing; call .modulate() to continue"]
pub struct Reinforced {
    base: RgbaImage,
    current: RgbaImage,
}

impl Reinforced {
    /// The warped blend base.
    #[must_use]
    pub const fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Output of the last edge pass.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.current
    }

    /// Hash-keyed intensity modulation, in place.
    pub fn modulate(mut self) -> Modulated {
        tracing::debug!("intensity hash pass");
        crate::hash::intensity_hash_pass(&mut self.current);
        Modulated {
            base: self.base,
            current: self.current,
        }
    }
}

// ───────────────────────── Stage 6: Modulated ────────────────────────

/// After intensity modulation.
#[must_use = "pipeline stages are consumed by advancing; call .finish() to continue"]
pub struct Modulated {
    base: RgbaImage,
    current: RgbaImage,
}

impl Modulated {
    /// The warped blend base.
    #[must_use]
    pub const fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// The modulated image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.current
    }

    /// Blend back over the post-warp snapshot.
    pub fn finish(mut self) -> Finished {
        tracing::debug!("final blend");
        crate::blend::final_blend_in_place(&mut self.current, &self.base);
        Finished {
            image: self.current,
        }
    }
}

// ───────────────────────── Stage 7: Finished ─────────────────────────

/// The pipeline output.
pub struct Finished {
    image: RgbaImage,
}

impl Finished {
    /// The output image.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume into the output image.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Consume into the flat RGBA buffer.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }
}
