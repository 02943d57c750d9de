//! Iterative edge reinforcement: Sobel magnitude, a nonlinear
//! stabilizing recurrence, and an additive blend onto a fixed base.
//!
//! One [`edge_pass`] is `sobel -> stabilize -> blend`. The pipeline runs
//! [`EDGE_PASSES`] of them; every pass detects edges on the previous
//! pass's output but always blends onto the same base image (the wave
//! warp output), so edges accumulate without the base drifting.

use crate::sample::{clamped_pixel, luma, saturate};
use crate::types::RgbaImage;

/// Number of `sobel -> stabilize -> blend` passes.
pub const EDGE_PASSES: usize = 4;

/// Iterations of the stabilizing recurrence per pixel.
pub const STABILIZE_ITERATIONS: usize = 8;

/// Weight of the base image in [`blend_edges`].
pub const BASE_WEIGHT: f32 = 0.7;

/// Weight of the edge map in [`blend_edges`]. The two weights sum to
/// 1.5; the blend overexposes on purpose.
pub const EDGE_WEIGHT: f32 = 0.8;

const SOBEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
const SOBEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

/// Sobel gradient magnitude of the luma channel.
///
/// Luma is recomputed for each of the nine neighbours and truncated to
/// an integer before weighting. The magnitude is written to R, G and B;
/// alpha is forced to 255, so the result is an opaque gray edge map
/// whatever the input alpha.
#[must_use = "returns the edge map"]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn sobel_edges(src: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let (cx, cy) = (i64::from(x), i64::from(y));
        let (mut gx, mut gy) = (0i32, 0i32);
        let mut k = 0;
        for ky in -1..=1 {
            for kx in -1..=1 {
                let lum = luma(clamped_pixel(src, cx + kx, cy + ky)) as i32;
                gx += SOBEL_X[k] * lum;
                gy += SOBEL_Y[k] * lum;
                k += 1;
            }
        }
        let mag = saturate(((gx * gx + gy * gy) as f32).sqrt());
        image::Rgba([mag, mag, mag, 255])
    })
}

/// Run the stabilizing recurrence on one normalized edge strength.
///
/// `acc <- sqrt(acc * 0.85 + |sin(acc * 12)|)`, [`STABILIZE_ITERATIONS`]
/// times, capped at 1.0 after each step. A non-finite step resets the
/// value to 0 and ends the iteration.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn stabilize(v: f32) -> f32 {
    let mut acc = v;
    for _ in 0..STABILIZE_ITERATIONS {
        let s = (acc * 12.0).sin().abs();
        acc = (acc * 0.85 + s).sqrt();
        if !acc.is_finite() {
            return 0.0;
        }
        if acc > 1.0 {
            acc = 1.0;
        }
    }
    acc
}

/// Replace R, G and B of every pixel with the stabilized red channel.
/// Alpha is untouched.
pub fn stabilize_in_place(edges: &mut RgbaImage) {
    for pixel in edges.pixels_mut() {
        let out = saturate(stabilize(f32::from(pixel.0[0]) / 255.0) * 255.0);
        pixel.0[0] = out;
        pixel.0[1] = out;
        pixel.0[2] = out;
    }
}

/// `clamp(0.7 * base + 0.8 * edge)` per colour channel; alpha comes
/// from `base`.
#[must_use = "returns the blended image"]
#[allow(clippy::suboptimal_flops)]
pub fn blend_edges(base: &RgbaImage, edges: &RgbaImage) -> RgbaImage {
    let mut out = base.clone();
    for (dst, e) in out.pixels_mut().zip(edges.pixels()) {
        for c in 0..3 {
            let mixed = BASE_WEIGHT * f32::from(dst.0[c]) + EDGE_WEIGHT * f32::from(e.0[c]);
            dst.0[c] = saturate(mixed);
        }
    }
    out
}

/// One reinforcement pass: detect edges on `current`, stabilize them,
/// and blend them onto `base`.
#[must_use = "returns the next pass input"]
pub fn edge_pass(current: &RgbaImage, base: &RgbaImage) -> RgbaImage {
    let mut edges = sobel_edges(current);
    stabilize_in_place(&mut edges);
    blend_edges(base, &edges)
}

/// All [`EDGE_PASSES`] passes, starting from and blending onto `base`.
#[must_use = "returns the edge-reinforced image"]
pub fn reinforce_edges(base: &RgbaImage) -> RgbaImage {
    reinforce_edges_with(base, |_, _| {})
}

/// Like [`reinforce_edges`], calling `after_pass` with the zero-based
/// pass index and that pass's output.
#[must_use = "returns the edge-reinforced image"]
pub fn reinforce_edges_with(
    base: &RgbaImage,
    mut after_pass: impl FnMut(usize, &RgbaImage),
) -> RgbaImage {
    let mut current = base.clone();
    for pass in 0..EDGE_PASSES {
        current = edge_pass(&current, base);
        tracing::trace!(pass, "edge pass complete");
        after_pass(pass, &current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sharp_edge_image() -> RgbaImage {
        RgbaImage::from_fn(10, 6, |x, _y| {
            if x < 5 {
                image::Rgba([0, 0, 0, 40])
            } else {
                image::Rgba([255, 255, 255, 40])
            }
        })
    }

    #[test]
    fn sobel_output_is_opaque_gray() {
        let edges = sobel_edges(&sharp_edge_image());
        for p in edges.pixels() {
            assert_eq!(p.0[3], 255);
            assert_eq!(p.0[0], p.0[1]);
            assert_eq!(p.0[1], p.0[2]);
        }
    }

    #[test]
    fn sobel_finds_vertical_boundary() {
        let edges = sobel_edges(&sharp_edge_image());
        // Luma of white is 255: gx = (1 + 2 + 1) * 255 = 1020, clamped.
        assert_eq!(edges.get_pixel(4, 3).0[0], 255);
        assert_eq!(edges.get_pixel(5, 3).0[0], 255);
        assert_eq!(edges.get_pixel(0, 3).0[0], 0);
        assert_eq!(edges.get_pixel(9, 3).0[0], 0);
    }

    #[test]
    fn sobel_of_uniform_image_is_zero() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([90, 30, 200, 0]));
        assert!(sobel_edges(&img).pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn stabilize_fixes_zero() {
        assert!(stabilize(0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn stabilize_stays_in_unit_interval() {
        for i in 0..=255u8 {
            let v = stabilize(f32::from(i) / 255.0);
            assert!((0.0..=1.0).contains(&v), "input {i} gave {v}");
        }
    }

    #[test]
    fn stabilize_non_finite_collapses_to_zero() {
        assert!(stabilize(f32::NAN).abs() < f32::EPSILON);
        assert!(stabilize(f32::INFINITY).abs() < f32::EPSILON);
    }

    #[test]
    fn stabilize_in_place_keeps_alpha_and_writes_gray() {
        let mut img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgba([0, 9, 9, 255]),
            1 => image::Rgba([128, 0, 0, 17]),
            _ => image::Rgba([255, 1, 2, 200]),
        });
        stabilize_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        for (x, alpha) in [(1, 17), (2, 200)] {
            let p = img.get_pixel(x, 0).0;
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
            assert_eq!(p[3], alpha);
        }
    }

    #[test]
    fn blend_weights_are_not_convex() {
        let base = RgbaImage::from_pixel(1, 1, image::Rgba([100, 200, 0, 33]));
        let edges = RgbaImage::from_pixel(1, 1, image::Rgba([100, 100, 50, 255]));
        let out = blend_edges(&base, &edges);
        // 70 + 80 = 150; 140 + 80 = 220; 0 + 40 = 40; alpha from base.
        assert_eq!(out.get_pixel(0, 0).0, [150, 220, 40, 33]);
    }

    #[test]
    fn blend_saturates() {
        let base = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let edges = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        assert_eq!(blend_edges(&base, &edges).get_pixel(0, 0).0, [255; 4]);
    }

    #[test]
    fn passes_blend_onto_fixed_base() {
        let base = sharp_edge_image();
        let reinforced = reinforce_edges(&base);
        // Manually chain the passes against the same base.
        let mut expected = base.clone();
        for _ in 0..EDGE_PASSES {
            expected = edge_pass(&expected, &base);
        }
        assert_eq!(reinforced, expected);
        // Alpha threads through from the base.
        assert!(reinforced.pixels().all(|p| p.0[3] == 40));
    }

    #[test]
    fn flat_input_only_dims() {
        let base = RgbaImage::from_pixel(3, 3, image::Rgba([200, 200, 200, 255]));
        let out = reinforce_edges(&base);
        // No edges anywhere: every pass is 0.7 * base.
        assert!(out.pixels().all(|p| p.0 == [140, 140, 140, 255]));
    }
}
