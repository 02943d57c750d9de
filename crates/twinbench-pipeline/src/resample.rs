//! Nearest-neighbour resampling.
//!
//! The pipeline halves the image and immediately scales it back up.
//! The round trip deliberately throws away high-frequency detail:
//! flat regions survive it unchanged, single-pixel patterns do not.

use crate::types::{Dimensions, RgbaImage};

/// Scale `src` to `target` by nearest-neighbour sampling.
///
/// Destination `(x, y)` copies source `(x * w_in / w_out, y * h_in /
/// h_out)` (floor division), all four channels verbatim. `target` must
/// be non-zero in both axes.
#[must_use = "returns the resampled image"]
#[allow(clippy::cast_possible_truncation)]
pub fn resize_nearest(src: &RgbaImage, target: Dimensions) -> RgbaImage {
    let (w_in, h_in) = (u64::from(src.width()), u64::from(src.height()));
    let (w_out, h_out) = (u64::from(target.width), u64::from(target.height));
    RgbaImage::from_fn(target.width, target.height, |x, y| {
        // Quotients are strictly below `w_in` / `h_in`, so they fit in u32.
        let sx = (u64::from(x) * w_in / w_out) as u32;
        let sy = (u64::from(y) * h_in / h_out) as u32;
        *src.get_pixel(sx, sy)
    })
}

/// The pipeline's lossy round trip: down to [`Dimensions::halved`],
/// then back up to the original size.
#[must_use = "returns the resampled image"]
pub fn round_trip(src: &RgbaImage) -> RgbaImage {
    let original = Dimensions::of(src);
    let down = resize_nearest(src, original.halved());
    resize_nearest(&down, original)
}
