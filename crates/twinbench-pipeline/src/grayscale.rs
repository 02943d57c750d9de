//! In-place luma conversion.
//!
//! Only the red and green channels receive the luma value; blue keeps
//! its pre-conversion sample and alpha is left alone. Downstream stages
//! (and the recorded golden outputs) depend on that asymmetry, so the
//! stage is not a true grayscale conversion.

use crate::sample::{luma, saturate};
use crate::types::RgbaImage;

/// Overwrite R and G of every pixel with `0.299 R + 0.587 G + 0.114 B`
/// (clamped, truncated). B and A are untouched.
pub fn grayscale_in_place(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let gray = saturate(luma(pixel.0));
        pixel.0[0] = gray;
        pixel.0[1] = gray;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_possible_truncation)]
    fn colourful(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            image::Rgba([
                ((x * 37) % 256) as u8,
                ((y * 53) % 256) as u8,
                (((x + y) * 19) % 256) as u8,
                ((x * y) % 256) as u8,
            ])
        })
    }

    #[test]
    fn red_equals_green_everywhere() {
        let mut img = colourful(9, 7);
        grayscale_in_place(&mut img);
        for p in img.pixels() {
            assert_eq!(p.0[0], p.0[1]);
        }
    }

    #[test]
    fn blue_and_alpha_are_untouched() {
        let original = colourful(9, 7);
        let mut img = original.clone();
        grayscale_in_place(&mut img);
        for (before, after) in original.pixels().zip(img.pixels()) {
            assert_eq!(before.0[2], after.0[2]);
            assert_eq!(before.0[3], after.0[3]);
        }
    }

    #[test]
    fn known_luma_values() {
        let mut img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgba([255, 0, 0, 255]),
            1 => image::Rgba([0, 255, 0, 255]),
            _ => image::Rgba([0, 0, 255, 255]),
        });
        grayscale_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [76, 76, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [149, 149, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [29, 29, 255, 255]);
    }

    #[test]
    fn white_stays_white() {
        let mut img = RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        grayscale_in_place(&mut img);
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
