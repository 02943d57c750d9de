//! twinbench-pipeline: deterministic RGBA image pipeline (sans-IO).
//!
//! The image kernel that twinbench times natively and in WebAssembly.
//! A raw RGBA buffer goes through a fixed sequence of stages:
//! box blur -> Gaussian blur -> grayscale -> half-resolution round trip
//! -> wave warp -> 4 x (Sobel -> stabilize -> blend) -> intensity hash
//! pass -> final blend with the post-warp snapshot.
//!
//! Stage order, kernel weights and constants are fixed. Floating-point
//! work is done in `f32` in a fixed evaluation order, so the native and
//! browser builds produce identical bytes.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! buffers. Decoding files and reporting timings lives in the bench and
//! wasm crates.

pub mod blend;
pub mod blur;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod hash;
pub mod kernel;
pub mod pipeline;
pub mod resample;
pub mod sample;
pub mod types;
pub mod warp;

pub use diagnostics::{Clock, PipelineDiagnostics, WebClock, process_with_diagnostics};
pub use pipeline::Pipeline;
use pipeline::{Finished, Pending};
pub use types::{Dimensions, PipelineError, RgbaImage};

/// Run the full image pipeline over a raw RGBA buffer.
///
/// `data` must hold `width * height * 4` bytes in row-major `R, G, B, A`
/// order. Returns a new buffer of the same length and layout.
///
/// # Pipeline steps
///
/// 1. Box blur, then Gaussian blur
/// 2. Luma into R and G (B and A untouched)
/// 3. Nearest-neighbour downsample to half size and back up
/// 4. Horizontal wave warp (snapshot kept as the blend base)
/// 5. Four passes of Sobel edges, nonlinear stabilization and an
///    additive blend onto the snapshot
/// 6. Colour-keyed intensity modulation
/// 7. Blend with the snapshot
///
/// # Errors
///
/// Returns [`PipelineError::ZeroDimension`] if `width` or `height` is
/// zero, and [`PipelineError::BufferLength`] if `data.len()` does not
/// match. No partial output is ever returned.
#[tracing::instrument(skip(data), fields(len = data.len()))]
pub fn process(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, PipelineError> {
    process_owned(width, height, data.to_vec())
}

/// Like [`process`], taking ownership of `data` so no copy is made.
///
/// # Errors
///
/// Same preconditions as [`process`].
pub fn process_owned(width: u32, height: u32, data: Vec<u8>) -> Result<Vec<u8>, PipelineError> {
    let pending = Pipeline::new(Dimensions::new(width, height), data)?;
    Ok(run_stages(pending).into_raw())
}

/// Run the full image pipeline over an image.
///
/// # Errors
///
/// Returns [`PipelineError::ZeroDimension`] for an empty image.
pub fn process_image(image: RgbaImage) -> Result<RgbaImage, PipelineError> {
    Ok(run_stages(Pipeline::from_image(image)?).into_image())
}

/// The fixed stage order, shared by every one-shot entry point.
fn run_stages(pending: Pending) -> Finished {
    pending
        .blur()
        .grayscale()
        .resample()
        .warp()
        .reinforce_edges()
        .modulate()
        .finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn process_rejects_zero_width() {
        let result = process(0, 4, &[]);
        assert!(matches!(result, Err(PipelineError::ZeroDimension(_))));
    }

    #[test]
    fn process_rejects_length_mismatch() {
        let result = process(2, 2, &[0; 12]);
        assert!(matches!(
            result,
            Err(PipelineError::BufferLength {
                expected: 16,
                actual: 12,
                ..
            })
        ));
    }

    #[test]
    fn process_preserves_length() {
        for (w, h) in [(1, 1), (2, 3), (17, 5), (40, 90)] {
            let data = vec![128; (w * h * 4) as usize];
            let out = process(w, h, &data).unwrap();
            assert_eq!(out.len(), data.len(), "{w}x{h}");
        }
    }

    #[test]
    fn process_image_matches_process() {
        #[allow(clippy::cast_possible_truncation)]
        let img = RgbaImage::from_fn(11, 6, |x, y| {
            image::Rgba([(x * 23) as u8, (y * 41) as u8, ((x * y) % 256) as u8, 200])
        });
        let raw = process(11, 6, img.as_raw()).unwrap();
        assert_eq!(process_image(img).unwrap().into_raw(), raw);
    }

    #[test]
    fn process_owned_matches_process() {
        #[allow(clippy::cast_possible_truncation)]
        let data: Vec<u8> = (0..(8 * 5 * 4)).map(|i| (i * 11 % 256) as u8).collect();
        let borrowed = process(8, 5, &data).unwrap();
        assert_eq!(process_owned(8, 5, data).unwrap(), borrowed);
        assert!(matches!(
            process_owned(8, 5, vec![0; 3]),
            Err(PipelineError::BufferLength { .. })
        ));
    }

    #[test]
    fn process_is_deterministic() {
        #[allow(clippy::cast_possible_truncation)]
        let data: Vec<u8> = (0..(16 * 16 * 4)).map(|i| (i * 7 % 256) as u8).collect();
        assert_eq!(process(16, 16, &data).unwrap(), process(16, 16, &data).unwrap());
    }
}
