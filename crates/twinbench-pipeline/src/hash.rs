//! Deterministic colour-keyed intensity modulation.
//!
//! Each pixel is brightened or darkened by a factor derived from a
//! 64-round modular mixing function of its own RGB value. Position plays
//! no part: identical colours always receive identical scaling.

use crate::types::RgbaImage;

/// Prime modulus of the mixing recurrence.
pub const MODULUS: u64 = 1_000_000_007;

/// Rounds of the mixing recurrence.
pub const ROUNDS: u64 = 64;

/// Seeds are reduced modulo this before mixing.
pub const SEED_SPACE: u32 = 1000;

/// Smallest scale factor applied by [`intensity_hash_pass`]; the mixer
/// adds `0..=255` on top.
pub const BASE_SCALE: u32 = 128;

/// Mix `seed` through [`ROUNDS`] rounds of `acc = acc * (i + seed) + 17 i
/// (mod MODULUS)` and keep the low byte.
///
/// Products stay below `MODULUS^2 < 2^60`, so `u64` never overflows.
#[must_use]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn pixel_hash_mix(seed: u32) -> u8 {
    let s = seed as u64 % MODULUS;
    let mut acc = (seed as u64 + 1) % MODULUS;
    let mut i = 1;
    while i <= ROUNDS {
        let factor = (i + s) % MODULUS;
        acc = (acc * factor + i * 17) % MODULUS;
        i += 1;
    }
    (acc & 0xFF) as u8
}

/// Seed derived from a pixel's colour: `(R + 256 G + 65536 B) mod 1000`.
#[must_use]
pub fn colour_seed(p: [u8; 4]) -> u32 {
    let (r, g, b) = (u32::from(p[0]), u32::from(p[1]), u32::from(p[2]));
    (r + (g << 8) + (b << 16)) % SEED_SPACE
}

/// Scale R, G and B of every pixel by `(128 + mix(seed)) / 255` using
/// integer arithmetic, saturating at 255. Alpha is untouched.
#[allow(clippy::cast_possible_truncation)]
pub fn intensity_hash_pass(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let scale = BASE_SCALE + u32::from(pixel_hash_mix(colour_seed(pixel.0)));
        for c in &mut pixel.0[..3] {
            // Clamped to 255 before narrowing.
            *c = (u32::from(*c) * scale / 255).min(255) as u8;
        }
    }
}
