//! Workload parameters for every kernel.

use serde::{Deserialize, Serialize};

/// Size of each workload. Missing fields in `--config-json` fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Width of the synthetic image used when no image path is given.
    pub width: u32,
    /// Height of the synthetic image used when no image path is given.
    pub height: u32,
    /// Argument to `factorial_mod`.
    pub factorial_n: u32,
    /// Matrix side for `matmul_sum`.
    pub matmul_n: u32,
    /// Number of simulated particles.
    pub particle_count: usize,
    /// Simulation steps per run.
    pub particle_steps: u32,
    /// Time step.
    pub particle_dt: f32,
    /// Width of the particle box.
    pub field_width: f32,
    /// Height of the particle box.
    pub field_height: f32,
}

impl BenchConfig {
    pub const DEFAULT_WIDTH: u32 = 512;
    pub const DEFAULT_HEIGHT: u32 = 512;
    pub const DEFAULT_FACTORIAL_N: u32 = 5_000_000;
    pub const DEFAULT_MATMUL_N: u32 = 200;
    pub const DEFAULT_PARTICLE_COUNT: usize = 10_000;
    pub const DEFAULT_PARTICLE_STEPS: u32 = 500;
    pub const DEFAULT_PARTICLE_DT: f32 = 1.0;
    pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 600.0;
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            factorial_n: Self::DEFAULT_FACTORIAL_N,
            matmul_n: Self::DEFAULT_MATMUL_N,
            particle_count: Self::DEFAULT_PARTICLE_COUNT,
            particle_steps: Self::DEFAULT_PARTICLE_STEPS,
            particle_dt: Self::DEFAULT_PARTICLE_DT,
            field_width: Self::DEFAULT_FIELD_WIDTH,
            field_height: Self::DEFAULT_FIELD_HEIGHT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: BenchConfig = serde_json::from_str(r#"{"matmul_n": 64}"#).unwrap();
        assert_eq!(config.matmul_n, 64);
        assert_eq!(config.width, BenchConfig::DEFAULT_WIDTH);
        assert_eq!(config.particle_count, BenchConfig::DEFAULT_PARTICLE_COUNT);
    }

    #[test]
    fn json_round_trips() {
        let config = BenchConfig {
            width: 3,
            particle_dt: 0.25,
            ..BenchConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<BenchConfig>(&json).unwrap(), config);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<BenchConfig>(r#"{"width": "wide"}"#).is_err());
    }
}
