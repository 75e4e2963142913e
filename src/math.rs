//! Single-precision special functions used by the laser profiles.

/// Error function in single precision.
///
/// Backed by `libm::erff`. Total over the
/// real line: odd, monotonic, bounded in (-1, 1) with `erf(0) = 0`.
#[inline]
pub fn erf(x: f32) -> f32 {
    libm::erff(x)
}

/// Smooth step from 0 to 1 centred at `t0` with Gaussian width `sigma`.
///
/// This is the cumulative normal distribution, `0.5 * (1 + erf((t - t0) / (sqrt(2) sigma)))`.
#[inline]
pub fn smooth_step(t: f32, t0: f32, sigma: f32) -> f32 {
    0.5 * (1.0 + erf((t - t0) / (std::f32::consts::SQRT_2 * sigma)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_erf_zero() {
        assert_eq!(erf(0.0), 0.0);
    }

    #[test]
    fn test_erf_odd() {
        for &x in &[0.1f32, 0.5, 1.0, 1.7, 2.5, 4.0] {
            assert_abs_diff_eq!(erf(-x), -erf(x), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_erf_known_values() {
        assert_abs_diff_eq!(erf(0.5), 0.520_499_9, epsilon = 1e-6);
        assert_abs_diff_eq!(erf(1.0), 0.842_700_8, epsilon = 1e-6);
        assert_abs_diff_eq!(erf(2.0), 0.995_322_3, epsilon = 1e-6);
    }

    #[test]
    fn test_erf_limits() {
        assert!(erf(5.0) > 0.999_999);
        assert!(erf(-5.0) < -0.999_999);
        assert!(erf(30.0) <= 1.0);
        assert!(erf(f32::NAN).is_nan());
    }

    #[test]
    fn test_erf_monotonic() {
        let mut prev = erf(-6.0);
        let mut x = -6.0f32;
        while x < 6.0 {
            x += 0.05;
            let v = erf(x);
            assert!(v >= prev, "erf not monotonic at {x}");
            prev = v;
        }
    }

    #[test]
    fn test_smooth_step() {
        assert_abs_diff_eq!(smooth_step(1.0, 1.0, 0.3), 0.5, epsilon = 1e-6);
        assert!(smooth_step(0.0, 1.0, 0.1) < 1e-6);
        assert!(smooth_step(2.0, 1.0, 0.1) > 1.0 - 1e-6);
    }
}
