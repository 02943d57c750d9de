//! Fixed 3x3 convolution kernels and the convolution primitive.

use crate::sample::{clamped_pixel, saturate};
use crate::types::RgbaImage;

/// A 3x3 convolution kernel: row-major weights plus a normalization
/// factor applied to the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    /// Weights for the neighbourhood `(-1,-1), (0,-1), (1,-1), (-1,0), ...`.
    pub weights: [f32; 9],
    /// Multiplier applied after accumulation.
    pub norm: f32,
}

/// Uniform box kernel, all weights 1, normalized by 1/9.
pub const BOX: Kernel = Kernel {
    weights: [1.0; 9],
    norm: 1.0 / 9.0,
};

/// Binomial approximation of a Gaussian, normalized by 1/16.
pub const GAUSSIAN: Kernel = Kernel {
    weights: [1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0],
    norm: 1.0 / 16.0,
};

/// Convolve every channel (alpha included) of `src` with `kernel`.
///
/// Neighbours outside the image are replicated from the border. Each
/// channel is accumulated in `f32` in row-major neighbourhood order,
/// multiplied by `kernel.norm`, then clamped to `[0, 255]` and
/// truncated. The result is always a new buffer.
#[must_use = "returns the convolved image"]
pub fn convolve_3x3(src: &RgbaImage, kernel: &Kernel) -> RgbaImage {
    RgbaImage::from_fn(src.width(), src.height(), |x, y| {
        let (cx, cy) = (i64::from(x), i64::from(y));
        let mut acc = [0.0f32; 4];
        let mut k = 0;
        for ky in -1..=1 {
            for kx in -1..=1 {
                let p = clamped_pixel(src, cx + kx, cy + ky);
                let weight = kernel.weights[k];
                for (sum, &sample) in acc.iter_mut().zip(&p) {
                    *sum += weight * f32::from(sample);
                }
                k += 1;
            }
        }
        image::Rgba(acc.map(|sum| saturate(sum * kernel.norm)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_weights_sum_to_inverse_norm() {
        for kernel in [BOX, GAUSSIAN] {
            let sum: f32 = kernel.weights.iter().sum();
            assert!((sum * kernel.norm - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn uniform_image_is_fixed_point() {
        let img = RgbaImage::from_pixel(5, 4, image::Rgba([10, 120, 200, 255]));
        assert_eq!(convolve_3x3(&img, &GAUSSIAN), img);
        assert_eq!(convolve_3x3(&img, &BOX), img);
    }

    #[test]
    fn single_bright_pixel_spreads_by_weight() {
        let mut img = RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 1, image::Rgba([160, 160, 160, 160]));
        let out = convolve_3x3(&img, &GAUSSIAN);
        // Centre weight 4/16, edge 2/16, corner 1/16.
        assert_eq!(out.get_pixel(1, 1).0, [40; 4]);
        assert_eq!(out.get_pixel(1, 0).0, [20; 4]);
        assert_eq!(out.get_pixel(0, 0).0, [10; 4]);
    }

    #[test]
    fn border_pixels_are_replicated() {
        // Left column 90, rest 0. The left edge sees the column three
        // times (x = -1 clamps to 0), so box blur yields 60 there.
        let img = RgbaImage::from_fn(3, 3, |x, _| {
            if x == 0 {
                image::Rgba([90, 90, 90, 90])
            } else {
                image::Rgba([0, 0, 0, 0])
            }
        });
        let out = convolve_3x3(&img, &BOX);
        assert_eq!(out.get_pixel(0, 1).0, [60; 4]);
        assert_eq!(out.get_pixel(1, 1).0, [30; 4]);
        assert_eq!(out.get_pixel(2, 1).0, [0; 4]);
    }

    #[test]
    fn negative_weights_clamp_to_zero() {
        let kernel = Kernel {
            weights: [0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0],
            norm: 1.0,
        };
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([50, 50, 50, 50]));
        let out = convolve_3x3(&img, &kernel);
        assert!(out.pixels().all(|p| p.0 == [0; 4]));
    }
}
