//! Deterministic inputs for each kernel and a uniform way to run them.

use std::fmt;

use serde::Serialize;
use twinbench_pipeline::RgbaImage;

use crate::config::BenchConfig;
use crate::error::BenchError;

/// The scalar kernels timed next to the image pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Factorial,
    Matmul,
    Particles,
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factorial => write!(f, "factorial_mod"),
            Self::Matmul => write!(f, "matmul_sum"),
            Self::Particles => write!(f, "simulate_particles"),
        }
    }
}

impl Kernel {
    /// Run the kernel once and reduce its output to a single number, so
    /// runs can be compared across environments.
    ///
    /// # Errors
    ///
    /// Only the particle kernel can fail, and only on malformed state.
    pub fn run(self, config: &BenchConfig) -> Result<f64, BenchError> {
        match self {
            Self::Factorial => Ok(f64::from(twinbench_numeric::factorial_mod(
                config.factorial_n,
            ))),
            Self::Matmul => Ok(twinbench_numeric::matmul_sum(config.matmul_n)),
            Self::Particles => {
                let (positions, velocities) =
                    initial_particles(config.particle_count, config.field_width, config.field_height);
                let state = twinbench_numeric::simulate_particles(
                    config.particle_steps,
                    config.particle_dt,
                    config.field_width,
                    config.field_height,
                    &positions,
                    &velocities,
                )?;
                Ok(state.iter().copied().map(f64::from).sum())
            }
        }
    }
}

/// Opaque RGB gradient: red follows x, green follows y, blue is `x ^ y`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn synthetic_gradient(width: u32, height: u32) -> RgbaImage {
    let span = |v: u32, extent: u32| (u64::from(v) * 255 / u64::from(extent.max(2) - 1)) as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([span(x, width), span(y, height), ((x ^ y) & 0xff) as u8, 255])
    })
}

/// Particles scattered over the box on low-discrepancy sequences, with
/// small velocities in `[-1, 1)`.
///
/// Returns interleaved `(x, y)` positions and velocities.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn initial_particles(count: usize, width: f32, height: f32) -> (Vec<f32>, Vec<f32>) {
    let frac = |i: usize, step: f64| (i as f64 * step).fract();
    let mut positions = Vec::with_capacity(count * 2);
    let mut velocities = Vec::with_capacity(count * 2);
    for i in 0..count {
        positions.push((frac(i, 0.618_034) * f64::from(width)) as f32);
        positions.push((frac(i, 0.414_213_56) * f64::from(height)) as f32);
        velocities.push((frac(i, 0.754_877_7).mul_add(2.0, -1.0)) as f32);
        velocities.push((frac(i, 0.569_840_3).mul_add(2.0, -1.0)) as f32);
    }
    (positions, velocities)
}
