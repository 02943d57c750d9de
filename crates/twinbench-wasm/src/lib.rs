//! WebAssembly entry points for the twinbench kernels.
//!
//! This crate compiles to the WASM module loaded by the browser half of
//! the benchmark. Every export is a thin shim over the same Rust code
//! the native bench runs, so the two sides time identical work.
//!
//! Pixel buffers cross the boundary as `Uint8ClampedArray` (the layout
//! of `ImageData.data`); particle state crosses as `Float32Array`.
//! Precondition violations become thrown JS `Error`s.

use twinbench_pipeline::{Dimensions, PipelineDiagnostics, WebClock};
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;

/// Module start hook: route Rust panics to `console.error`.
///
/// Called automatically when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Run the image pipeline over an RGBA buffer.
///
/// # Errors
///
/// Throws if either dimension is zero or `data` is not
/// `width * height * 4` bytes long.
#[wasm_bindgen]
pub fn process_image_wasm(
    width: u32,
    height: u32,
    data: Clamped<Vec<u8>>,
) -> Result<Clamped<Vec<u8>>, JsError> {
    Ok(Clamped(twinbench_pipeline::process_owned(width, height, data.0)?))
}

/// Run the image pipeline with per-stage timing from `performance.now()`.
///
/// Resolves to a JS object:
/// - `pixels`: `Uint8ClampedArray` with the output image
/// - `diagnosticsJson`: `String` with the JSON-serialized diagnostics
///
/// # Errors
///
/// Throws on invalid dimensions or buffer length, or if the diagnostics
/// cannot be serialized.
#[wasm_bindgen]
pub fn process_image_diagnostics(
    width: u32,
    height: u32,
    data: Clamped<Vec<u8>>,
) -> Result<js_sys::Object, JsError> {
    let (pixels, diagnostics) = twinbench_pipeline::process_with_diagnostics(
        Dimensions::new(width, height),
        data.0,
        &WebClock,
    )?;
    let diagnostics_json = diagnostics_json(&diagnostics)?;

    let response = js_sys::Object::new();
    set_field(
        &response,
        "pixels",
        &js_sys::Uint8ClampedArray::from(pixels.as_slice()),
    )?;
    set_field(
        &response,
        "diagnosticsJson",
        &JsValue::from_str(&diagnostics_json),
    )?;
    Ok(response)
}

/// `n! mod 1_000_000_007`.
#[wasm_bindgen]
#[must_use]
pub fn factorial_mod(n: u32) -> u32 {
    twinbench_numeric::factorial_mod(n)
}

/// Modular sum of the product terms of an `n x n` matrix multiplication.
#[wasm_bindgen]
#[must_use]
pub fn matmul_sum(n: u32) -> f64 {
    twinbench_numeric::matmul_sum(n)
}

/// Advance interleaved `(x, y)` particles; returns positions followed
/// by velocities.
///
/// # Errors
///
/// Throws on an odd position count or mismatched velocity length.
#[wasm_bindgen]
pub fn simulate_particles(
    steps: u32,
    dt: f32,
    width: f32,
    height: f32,
    positions: &[f32],
    velocities: &[f32],
) -> Result<Vec<f32>, JsError> {
    Ok(twinbench_numeric::simulate_particles(
        steps, dt, width, height, positions, velocities,
    )?)
}

/// Serialize diagnostics for the JS side.
fn diagnostics_json(diagnostics: &PipelineDiagnostics) -> Result<String, serde_json::Error> {
    serde_json::to_string(diagnostics)
}

fn set_field(target: &js_sys::Object, key: &str, value: &JsValue) -> Result<(), JsError> {
    js_sys::Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|_| JsError::new(&format!("failed to set response field {key}")))
}
