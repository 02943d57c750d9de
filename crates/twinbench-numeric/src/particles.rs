//! Damped particles on a spring toward the centre of a box.
//!
//! Positions and velocities are interleaved `(x, y)` pairs. Every step
//! applies a weak spring toward `(width / 2, height / 2)`, integrates
//! with explicit Euler, and bounces off the walls of `[0, width] x
//! [0, height]` with a damped reflection.

use serde::{Deserialize, Serialize};

/// Spring constant pulling every particle toward the centre.
pub const SPRING_CONSTANT: f32 = 0.0005;

/// Factor applied to a velocity component reflected by a wall.
pub const WALL_DAMPING: f32 = 0.8;

/// Malformed particle state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ParticleError {
    /// Positions are `(x, y)` pairs, so the slice length must be even.
    #[error("positions must hold (x, y) pairs, got {0} values")]
    OddPositionCount(usize),

    /// Every position needs a matching velocity.
    #[error("expected {positions} velocity values to match the positions, got {velocities}")]
    LengthMismatch {
        /// Length of the position slice.
        positions: usize,
        /// Length of the velocity slice.
        velocities: usize,
    },
}

/// Advance every particle `steps` times by `dt`.
///
/// Returns the final positions followed by the final velocities, in the
/// same interleaved layout as the inputs (so the output is twice as long
/// as `positions`).
///
/// # Errors
///
/// Returns [`ParticleError::OddPositionCount`] when `positions` does not
/// hold whole pairs and [`ParticleError::LengthMismatch`] when
/// `velocities` is not the same length as `positions`.
#[tracing::instrument(level = "trace", skip(positions, velocities), fields(particles = positions.len() / 2))]
pub fn simulate_particles(
    steps: u32,
    dt: f32,
    width: f32,
    height: f32,
    positions: &[f32],
    velocities: &[f32],
) -> Result<Vec<f32>, ParticleError> {
    if positions.len() % 2 != 0 {
        return Err(ParticleError::OddPositionCount(positions.len()));
    }
    if velocities.len() != positions.len() {
        return Err(ParticleError::LengthMismatch {
            positions: positions.len(),
            velocities: velocities.len(),
        });
    }

    let mut pos = positions.to_vec();
    let mut vel = velocities.to_vec();
    let centre = [width * 0.5, height * 0.5];
    let bounds = [width, height];

    for _ in 0..steps {
        for (p, v) in pos.chunks_exact_mut(2).zip(vel.chunks_exact_mut(2)) {
            step(p, v, centre, bounds, dt);
        }
    }

    let mut out = Vec::with_capacity(pos.len() * 2);
    out.extend_from_slice(&pos);
    out.extend_from_slice(&vel);
    Ok(out)
}

/// One Euler step of a single particle. Each axis is independent.
#[allow(clippy::suboptimal_flops)]
fn step(p: &mut [f32], v: &mut [f32], centre: [f32; 2], bounds: [f32; 2], dt: f32) {
    for axis in 0..2 {
        let delta = centre[axis] - p[axis];
        let mut vel = v[axis] + delta * SPRING_CONSTANT * dt;
        let mut next = p[axis] + vel * dt;
        if next < 0.0 || next > bounds[axis] {
            vel = -vel * WALL_DAMPING;
            // The bound may be negative, so no `clamp`.
            if next < 0.0 {
                next = 0.0;
            }
            if next > bounds[axis] {
                next = bounds[axis];
            }
        }
        p[axis] = next;
        v[axis] = vel;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_positions() {
        let err = simulate_particles(1, 1.0, 10.0, 10.0, &[1.0, 2.0, 3.0], &[0.0; 3]);
        assert_eq!(err, Err(ParticleError::OddPositionCount(3)));
    }

    #[test]
    fn rejects_mismatched_velocities() {
        let err = simulate_particles(1, 1.0, 10.0, 10.0, &[1.0, 2.0], &[0.0; 4]);
        assert_eq!(
            err,
            Err(ParticleError::LengthMismatch {
                positions: 2,
                velocities: 4
            })
        );
    }

    #[test]
    fn empty_state_is_empty_output() {
        assert!(simulate_particles(100, 0.5, 10.0, 10.0, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn zero_steps_echoes_inputs() {
        let out = simulate_particles(0, 1.0, 10.0, 10.0, &[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn particle_at_rest_in_centre_stays_put() {
        let out = simulate_particles(1000, 1.0, 80.0, 60.0, &[40.0, 30.0], &[0.0, 0.0]).unwrap();
        assert_eq!(out, vec![40.0, 30.0, 0.0, 0.0]);
    }

    #[test]
    fn spring_pulls_toward_centre() {
        let out = simulate_particles(1, 1.0, 100.0, 100.0, &[10.0, 90.0], &[0.0, 0.0]).unwrap();
        assert!(out[0] > 10.0);
        assert!(out[1] < 90.0);
        assert!(out[2] > 0.0);
        assert!(out[3] < 0.0);
    }

    #[test]
    fn wall_reflects_and_damps() {
        let out = simulate_particles(1, 1.0, 100.0, 100.0, &[1.0, 50.0], &[-10.0, 0.0]).unwrap();
        // vx = -10 + 49 * 0.0005 = -9.9755; x would be -8.9755.
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 50.0);
        assert!((out[2] - 9.9755 * 0.8).abs() < 1e-4, "vx = {}", out[2]);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn negative_box_pins_to_far_wall() {
        let out = simulate_particles(1, 1.0, -5.0, 10.0, &[1.0, 1.0], &[0.0, 0.0]).unwrap();
        // x overshoots the (negative) right wall, so it lands on it.
        assert_eq!(out[0], -5.0);
        assert!(out[2] > 0.0);
        assert!((0.0..=10.0).contains(&out[1]));
    }

    #[test]
    fn particles_never_leave_the_box() {
        let positions = [0.0, 0.0, 20.0, 5.0, 3.0, 19.0, 10.0, 10.0];
        let velocities = [5.0, -7.0, 30.0, 2.0, -1.0, 9.0, 0.0, -40.0];
        let out = simulate_particles(500, 0.25, 20.0, 20.0, &positions, &velocities).unwrap();
        assert_eq!(out.len(), 16);
        for xy in out[..8].chunks_exact(2) {
            assert!((0.0..=20.0).contains(&xy[0]));
            assert!((0.0..=20.0).contains(&xy[1]));
        }
    }
}
