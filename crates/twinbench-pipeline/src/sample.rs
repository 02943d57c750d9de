//! Boundary-clamped pixel reads.
//!
//! Every neighbourhood access in the pipeline goes through
//! [`clamped_pixel`]: out-of-range coordinates are pulled back onto the
//! nearest edge, so border pixels are replicated rather than wrapped or
//! zero-padded.
//!
//! Also holds the two scalar helpers every stage shares: the luma
//! weighting and the clamp-and-truncate narrowing back to `u8`.

use crate::types::RgbaImage;

/// Read the RGBA sample at `(x, y)`, clamping each coordinate into the
/// image independently.
///
/// The image must be non-empty; the pipeline entry points reject
/// zero-sized buffers before any stage runs.
#[inline]
#[must_use]
pub fn clamped_pixel(image: &RgbaImage, x: i64, y: i64) -> [u8; 4] {
    let xx = clamp_coord(x, image.width());
    let yy = clamp_coord(y, image.height());
    image.get_pixel(xx, yy).0
}

/// Narrow a floating-point channel value to `u8`: clamp to `[0, 255]`,
/// then truncate toward zero.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn saturate(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Luma of an RGB triple, `0.299 R + 0.587 G + 0.114 B`, unclamped.
///
/// Evaluated left to right in `f32` without fused multiply-add; outputs
/// are compared bit-for-bit against the browser build.
#[inline]
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn luma(p: [u8; 4]) -> f32 {
    0.299 * f32::from(p[0]) + 0.587 * f32::from(p[1]) + 0.114 * f32::from(p[2])
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_coord(v: i64, extent: u32) -> u32 {
    // `v` is clamped into `0..extent`, which always fits in `u32`.
    v.clamp(0, i64::from(extent) - 1) as u32
}
