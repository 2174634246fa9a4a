//! Standard normal distribution functions.
//!
//! Only what the Wald test on logistic-regression coefficients needs: the CDF
//! and the two-sided tail probability, both on top of `statrs`'s
//! complementary error function.

use std::f64::consts::SQRT_2;

use statrs::function::erf::erfc;

/// Cumulative distribution function of the standard normal distribution.
///
/// # Examples
///
/// ```
/// use fraudlens_stats::normal::cdf;
///
/// assert!((cdf(0.0) - 0.5).abs() < 1e-12);
/// assert!((cdf(1.959_964) - 0.975).abs() < 1e-6);
/// ```
#[must_use]
pub fn cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Two-sided tail probability `P(|Z| >= |z|)` for a standard normal `Z`.
///
/// Returns `NaN` for a `NaN` statistic so that undefined standard errors
/// propagate into undefined p-values instead of looking significant.
#[must_use]
pub fn two_sided_p_value(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    erfc(z.abs() / SQRT_2).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_symmetry() {
        for x in [0.1, 0.5, 1.0, 2.5, 4.0] {
            assert!((cdf(x) + cdf(-x) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_known_quantiles() {
        assert!((cdf(1.0) - 0.841_344_746_068_543).abs() < 1e-12);
        assert!((cdf(-2.326_347_874) - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_two_sided_p_value() {
        assert!((two_sided_p_value(0.0) - 1.0).abs() < 1e-12);
        assert!((two_sided_p_value(-1.959_963_985) - 0.05).abs() < 1e-9);
        assert!((two_sided_p_value(3.290_526_731) - 0.001).abs() < 1e-9);
        assert!(two_sided_p_value(f64::NAN).is_nan());
        assert!(two_sided_p_value(f64::INFINITY).abs() < 1e-300);
    }

    #[test]
    fn test_deep_tail_keeps_relative_precision() {
        // P(|Z| >= 8) = 1.2442e-15
        let p = two_sided_p_value(8.0);
        assert!((p / 1.244_192_114_854_357e-15 - 1.0).abs() < 1e-6);
    }
}
