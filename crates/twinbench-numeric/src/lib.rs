//! twinbench-numeric: scalar compute kernels.
//!
//! The secondary workloads timed next to the image pipeline. Each one is
//! a pure function of its arguments with a fixed amount of work per
//! input, so native and WebAssembly timings can be compared directly.

pub mod modular;
pub mod particles;

pub use modular::{MODULUS, factorial_mod, matmul_sum};
pub use particles::{ParticleError, SPRING_CONSTANT, WALL_DAMPING, simulate_particles};
