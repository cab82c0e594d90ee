//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Mean of a slice, NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Standard normal quantile function.
pub fn quantile_normal(p: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Evaluate `c[0] + c[1] x + c[2] x^2 + ...` by Horner's rule.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_of_slice() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn normal_cdf_symmetry() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normal_cdf(1.96), 0.975, epsilon = 1e-3);
        assert_relative_eq!(normal_cdf(-1.0) + normal_cdf(1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn quantile_inverts_cdf() {
        assert_relative_eq!(quantile_normal(0.975), 1.96, epsilon = 1e-2);
    }

    #[test]
    fn polyval_horner() {
        // 1 + 2x + 3x^2 at x = 2
        assert_relative_eq!(polyval(&[1.0, 2.0, 3.0], 2.0), 17.0);
    }
}
