//! Integer-heavy loops reduced modulo a large prime.

/// Prime modulus shared by both kernels.
pub const MODULUS: u64 = 1_000_000_007;

#[allow(clippy::cast_precision_loss)]
const MODULUS_F64: f64 = MODULUS as f64;

/// `n! mod 1_000_000_007`, accumulated in `u64`.
///
/// `factorial_mod(0)` is 1.
#[must_use]
#[tracing::instrument(level = "trace")]
#[allow(clippy::cast_possible_truncation)]
pub fn factorial_mod(n: u32) -> u32 {
    let mut acc: u64 = 1;
    for i in 1..=u64::from(n) {
        acc = (acc * i) % MODULUS;
    }
    // acc < MODULUS < 2^32
    acc as u32
}

/// Sum of every product term of an `n x n` matrix multiplication whose
/// entries are `(row + col) % 10`, reduced modulo [`MODULUS`].
///
/// The sum is held in `f64` and reduced whenever it reaches the modulus,
/// so the float never loses integer precision.
#[must_use]
#[tracing::instrument(level = "trace")]
pub fn matmul_sum(n: u32) -> f64 {
    let mut sum = 0.0_f64;
    for i in 0..n {
        for k in 0..n {
            let a = f64::from((i + k) % 10);
            for j in 0..n {
                sum += a * f64::from((k + j) % 10);
                if sum >= MODULUS_F64 {
                    sum %= MODULUS_F64;
                }
            }
        }
    }
    sum % MODULUS_F64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_small_values() {
        assert_eq!(factorial_mod(0), 1);
        assert_eq!(factorial_mod(1), 1);
        assert_eq!(factorial_mod(5), 120);
        assert_eq!(factorial_mod(10), 3_628_800);
    }

    #[test]
    fn factorial_wraps_modulus() {
        assert_eq!(factorial_mod(20), 146_326_063);
        assert_eq!(factorial_mod(100_000), 457_992_974);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn matmul_sum_small_values() {
        assert_eq!(matmul_sum(0), 0.0);
        assert_eq!(matmul_sum(1), 0.0);
        assert_eq!(matmul_sum(2), 10.0);
        assert_eq!(matmul_sum(3), 126.0);
        assert_eq!(matmul_sum(10), 20_250.0);
        assert_eq!(matmul_sum(50), 2_531_250.0);
    }

    #[test]
    fn matmul_sum_stays_below_modulus() {
        let s = matmul_sum(120);
        assert!(s >= 0.0 && s < MODULUS_F64);
        assert!((s - s.trunc()).abs() < f64::EPSILON);
    }
}
