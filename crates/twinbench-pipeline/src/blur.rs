//! Blur stages: a box blur followed by a Gaussian blur.
//!
//! The two passes are separate convolutions applied in sequence (box
//! into a scratch buffer, Gaussian from the scratch buffer into the
//! working buffer), not one combined 5x5 kernel. The truncation after
//! each pass makes the two forms differ.

use crate::kernel::{BOX, GAUSSIAN, convolve_3x3};
use crate::types::RgbaImage;

/// Uniform 3x3 blur.
#[must_use = "returns the blurred image"]
pub fn box_blur(image: &RgbaImage) -> RgbaImage {
    convolve_3x3(image, &BOX)
}

/// Weighted 3x3 blur (`1 2 1 / 2 4 2 / 1 2 1`, normalized by 1/16).
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &RgbaImage) -> RgbaImage {
    convolve_3x3(image, &GAUSSIAN)
}

/// The pipeline's blur step: [`box_blur`] then [`gaussian_blur`].
#[must_use = "returns the blurred image"]
pub fn blur(image: &RgbaImage) -> RgbaImage {
    let scratch = box_blur(image);
    gaussian_blur(&scratch)
}
