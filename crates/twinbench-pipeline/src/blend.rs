//! Final blend of the processed image back over the post-warp snapshot.

use crate::sample::saturate;
use crate::types::RgbaImage;

/// Weight of the snapshot taken right after the wave warp.
pub const FINAL_BASE_WEIGHT: f32 = 0.6;

/// Weight of the processed image, `1 - FINAL_BASE_WEIGHT` evaluated in
/// `f32`.
pub const FINAL_CURRENT_WEIGHT: f32 = 1.0 - FINAL_BASE_WEIGHT;

/// `clamp(0.6 * base + 0.4 * current)` per colour channel, written into
/// `current`. Alpha of `current` is untouched.
#[allow(clippy::suboptimal_flops)]
pub fn final_blend_in_place(current: &mut RgbaImage, base: &RgbaImage) {
    for (dst, b) in current.pixels_mut().zip(base.pixels()) {
        for c in 0..3 {
            dst.0[c] = saturate(
                FINAL_BASE_WEIGHT * f32::from(b.0[c]) + FINAL_CURRENT_WEIGHT * f32::from(dst.0[c]),
            );
        }
    }
}
