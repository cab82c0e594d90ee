//! Accuracy metrics for scoring fitted and forecast values.

use std::fmt;

/// Signature shared by every metric: `(actual, predicted) -> score`.
pub type MetricFn = fn(&[f64], &[f64]) -> f64;

/// A named scoring function.
///
/// The display name is supplied explicitly and becomes the column name in
/// search result tables.
#[derive(Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub func: MetricFn,
    /// Ranking direction; most error metrics are lower-is-better.
    pub higher_is_better: bool,
}

impl Metric {
    pub const MAE: Metric = Metric::new("mae", mae);
    pub const MSE: Metric = Metric::new("mse", mse);
    pub const RMSE: Metric = Metric::new("rmse", rmse);
    pub const MAPE: Metric = Metric::new("mape", mape);
    pub const SMAPE: Metric = Metric::new("smape", smape);
    pub const R2: Metric = Metric {
        name: "r2",
        func: r_squared,
        higher_is_better: true,
    };

    /// A lower-is-better metric.
    pub const fn new(name: &'static str, func: MetricFn) -> Self {
        Self {
            name,
            func,
            higher_is_better: false,
        }
    }

    pub const fn higher_is_better(mut self) -> Self {
        self.higher_is_better = true;
        self
    }

    pub fn score(&self, actual: &[f64], predicted: &[f64]) -> f64 {
        (self.func)(actual, predicted)
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("higher_is_better", &self.higher_is_better)
            .finish()
    }
}

fn paired(actual: &[f64], predicted: &[f64]) -> Option<usize> {
    if actual.len() != predicted.len() || actual.is_empty() {
        None
    } else {
        Some(actual.len())
    }
}

/// Mean absolute error.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(n) = paired(actual, predicted) else {
        return f64::NAN;
    };
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n as f64
}

/// Mean squared error.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(n) = paired(actual, predicted) else {
        return f64::NAN;
    };
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64
}

/// Root mean squared error.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Mean absolute percentage error in percent; NaN if any actual value is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(n) = paired(actual, predicted) else {
        return f64::NAN;
    };
    if actual.contains(&0.0) {
        return f64::NAN;
    }
    100.0
        * actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| ((a - p) / a).abs())
            .sum::<f64>()
        / n as f64
}

/// Symmetric mean absolute percentage error in percent.
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(n) = paired(actual, predicted) else {
        return f64::NAN;
    };
    100.0
        * actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| {
                let denom = a.abs() + p.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    2.0 * (a - p).abs() / denom
                }
            })
            .sum::<f64>()
        / n as f64
}

/// Coefficient of determination.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(n) = paired(actual, predicted) else {
        return f64::NAN;
    };
    let mean = actual.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basic_errors() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.5, 2.0, 2.0, 5.0];
        assert_relative_eq!(mae(&actual, &predicted), 2.5 / 4.0);
        assert_relative_eq!(mse(&actual, &predicted), 2.25 / 4.0);
        assert_relative_eq!(rmse(&actual, &predicted), (2.25f64 / 4.0).sqrt());
    }

    #[test]
    fn perfect_prediction() {
        let actual = [10.0, 20.0, 30.0];
        assert_eq!(mae(&actual, &actual), 0.0);
        assert_eq!(mape(&actual, &actual), 0.0);
        assert_eq!(smape(&actual, &actual), 0.0);
        assert_eq!(r_squared(&actual, &actual), 1.0);
    }

    #[test]
    fn mape_with_zero_actual_is_nan() {
        assert!(mape(&[0.0, 1.0], &[0.5, 1.0]).is_nan());
    }

    #[test]
    fn mismatched_lengths_are_nan() {
        assert!(mae(&[1.0], &[1.0, 2.0]).is_nan());
        assert!(rmse(&[], &[]).is_nan());
    }

    #[test]
    fn metric_constants() {
        assert_eq!(Metric::MAE.name, "mae");
        assert!(!Metric::RMSE.higher_is_better);
        assert!(Metric::R2.higher_is_better);
        assert_relative_eq!(Metric::MSE.score(&[1.0, 3.0], &[2.0, 3.0]), 0.5);

        fn max_error(a: &[f64], p: &[f64]) -> f64 {
            a.iter()
                .zip(p)
                .map(|(a, p)| (a - p).abs())
                .fold(0.0, f64::max)
        }
        let custom = Metric::new("max_error", max_error);
        assert_eq!(custom.score(&[1.0, 5.0], &[2.0, 1.0]), 4.0);
    }
}
