//! Horizontal sinusoidal wave warp.

use crate::sample::clamped_pixel;
use crate::types::RgbaImage;

/// Peak horizontal displacement in pixels.
pub const AMPLITUDE: f32 = 10.0;

/// Rows per full sine period.
pub const PERIOD_ROWS: f32 = 80.0;

/// Horizontal source offset for row `y`: `AMPLITUDE * sin(y * 2pi /
/// PERIOD_ROWS)`, truncated toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn row_offset(y: u32) -> i64 {
    let frequency = 2.0 * std::f32::consts::PI / PERIOD_ROWS;
    (AMPLITUDE * (y as f32 * frequency).sin()) as i64
}

/// Shift every row horizontally by [`row_offset`], sampling the source
/// with border replication.
#[must_use = "returns the warped image"]
pub fn wave_warp(src: &RgbaImage) -> RgbaImage {
    let offsets: Vec<i64> = (0..src.height()).map(row_offset).collect();
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let sx = i64::from(x) + offsets[y as usize];
        image::Rgba(clamped_pixel(src, sx, i64::from(y)))
    })
}
