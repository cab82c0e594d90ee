//! Differencing utilities for ARIMA models.

/// Apply differencing `d` times. Each pass shortens the series by one.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Integrate a forecast made on the `d`-times differenced scale back to levels.
///
/// `original` is the observed series the differences continue from.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();

    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(anchor, |acc, step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }

    result
}

/// Coefficients of `(1 - B)^d` as an AR-form lag polynomial: `x_t = sum(c_i x_{t-i}) + ...`.
pub fn differencing_polynomial(d: usize) -> Vec<f64> {
    // expand (1 - B)^d, then flip signs of the lag terms
    let mut poly = vec![1.0];
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    poly[1..].iter().map(|c| -c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_orders() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 0), series);
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn difference_too_short() {
        assert!(difference(&[1.0], 1).is_empty());
        assert!(difference(&[], 2).is_empty());
    }

    #[test]
    fn integrate_continues_levels() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let integrated = integrate(&[6.0, 7.0], &original, 1);
        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_order_2_continues_quadratic() {
        // squares have constant second difference 2
        let original: Vec<f64> = (0..6).map(|i| (i * i) as f64).collect();
        let integrated = integrate(&[2.0, 2.0], &original, 2);
        assert_relative_eq!(integrated[0], 36.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 49.0, epsilon = 1e-10);
    }

    #[test]
    fn differencing_polynomial_expansion() {
        assert!(differencing_polynomial(0).is_empty());
        assert_eq!(differencing_polynomial(1), vec![1.0]);
        // (1 - B)^2 = 1 - 2B + B^2  ->  x_t = 2 x_{t-1} - x_{t-2}
        assert_eq!(differencing_polynomial(2), vec![2.0, -1.0]);
    }
}
