//! Shared types for the twinbench image pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hold pipeline
/// buffers without depending on `image` directly.
///
/// Its raw storage is exactly the flat `R, G, B, A` row-major layout the
/// pipeline operates on: pixel `(x, y)` lives at `(y * width + x) * 4`.
pub use image::RgbaImage;

/// Number of `u8` samples per pixel.
pub const CHANNELS: usize = 4;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Half resolution used by the downsample step, never below 1x1.
    #[must_use]
    pub fn halved(self) -> Self {
        Self::new((self.width / 2).max(1), (self.height / 2).max(1))
    }

    /// Required RGBA buffer length, or `None` if it does not fit in
    /// `usize`.
    #[must_use]
    pub fn buffer_len(self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(CHANNELS)
    }

    /// Check the caller-facing preconditions: both sides positive and
    /// `len == width * height * 4`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimension`] if either side is zero,
    /// [`PipelineError::TooLarge`] if the buffer size overflows `usize`,
    /// and [`PipelineError::BufferLength`] on a length mismatch.
    pub fn validate(self, len: usize) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::ZeroDimension(self));
        }
        let expected = self.buffer_len().ok_or(PipelineError::TooLarge(self))?;
        if len != expected {
            return Err(PipelineError::BufferLength {
                dimensions: self,
                expected,
                actual: len,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Wrap a caller-supplied RGBA buffer after checking its preconditions.
///
/// # Errors
///
/// See [`Dimensions::validate`].
pub fn image_from_raw(dimensions: Dimensions, data: Vec<u8>) -> Result<RgbaImage, PipelineError> {
    dimensions.validate(data.len())?;
    RgbaImage::from_raw(dimensions.width, dimensions.height, data)
        .ok_or(PipelineError::TooLarge(dimensions))
}

/// Precondition violations reported by the pipeline entry points.
///
/// The stages themselves are total; these are the only ways a call can
/// fail, and no partial output is produced when they do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// Width or height was zero.
    #[error("image dimensions must be positive, got {0}")]
    ZeroDimension(Dimensions),

    /// The RGBA buffer size for these dimensions does not fit in memory.
    #[error("image dimensions {0} are too large to address")]
    TooLarge(Dimensions),

    /// The buffer length does not equal `width * height * 4`.
    #[error("expected {expected} bytes for a {dimensions} RGBA image, got {actual}")]
    BufferLength {
        /// Dimensions supplied by the caller.
        dimensions: Dimensions,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
}
