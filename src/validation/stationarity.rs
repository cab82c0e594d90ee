//! Augmented Dickey-Fuller unit root test.

use crate::utils::ols::ols_fit;
use crate::utils::stats::{normal_cdf, polyval};

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// Approximate p-value (MacKinnon 1994)
    pub p_value: f64,
    /// Number of lagged differences used
    pub lags: usize,
    /// Number of observations in the final regression
    pub n_obs: usize,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undefined(lags: usize) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            n_obs: 0,
            critical_values: CriticalValues::default(),
        }
    }

    /// Reject the unit-root null at `significance`.
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value <= significance
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default)]
pub struct CriticalValues {
    pub cv_1pct: f64,
    pub cv_5pct: f64,
    pub cv_10pct: f64,
}

/// MacKinnon (1994) response surface, regression with constant, one series.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Approximate p-value of an ADF statistic (constant, no trend).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    normal_cdf(polyval(coefficients, statistic))
}

/// MacKinnon (2010) finite-sample critical values, constant only.
fn critical_values(n_obs: usize) -> CriticalValues {
    let n = n_obs as f64;
    let cv = |b: [f64; 4]| b[0] + b[1] / n + b[2] / (n * n) + b[3] / (n * n * n);
    CriticalValues {
        cv_1pct: cv([-3.43035, -6.5393, -16.786, -79.433]),
        cv_5pct: cv([-2.86154, -2.8903, -4.234, -40.04]),
        cv_10pct: cv([-2.56677, -1.5384, -2.809, 0.0]),
    }
}

/// Regressors for `dy[j] = a + g*y[j] + sum(b_i * dy[j-i])`, observations `start..`.
fn design(series: &[f64], diff: &[f64], lag: usize, start: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let target = diff[start..].to_vec();
    let mut columns = vec![series[start..diff.len()].to_vec()];
    for i in 1..=lag {
        columns.push(diff[start - i..diff.len() - i].to_vec());
    }
    (target, columns)
}

/// Augmented Dickey-Fuller test for a unit root.
///
/// The null hypothesis is a unit root; a small p-value means the series looks
/// stationary. The lag order is chosen by AIC over `0..=max_lags` on a common
/// sample (default `max_lags`: `ceil(12 * (n/100)^(1/4))`).
///
/// Returns NaN statistic and p-value for series that are too short or whose
/// regression is degenerate (e.g. constant or exactly linear).
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> StationarityResult {
    let n = series.len();
    if n < 6 {
        return StationarityResult::undefined(0);
    }

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = max_lags
        .unwrap_or(default_lags)
        .min((n / 2).saturating_sub(3));

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // AIC lag selection over a sample shared by every candidate
    let mut best_lag = 0;
    let mut best_aic = f64::INFINITY;
    for lag in 0..=max_lags {
        let (target, columns) = design(series, &diff, lag, max_lags);
        let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
        let Ok(fit) = ols_fit(&target, &refs) else {
            continue;
        };
        let n_obs = target.len() as f64;
        let aic = n_obs * (fit.rss / n_obs).ln() + 2.0 * (lag + 2) as f64;
        if aic < best_aic {
            best_aic = aic;
            best_lag = lag;
        }
    }

    let (target, columns) = design(series, &diff, best_lag, best_lag);
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let Ok(fit) = ols_fit(&target, &refs) else {
        return StationarityResult::undefined(best_lag);
    };

    let scale: f64 = target.iter().map(|v| v * v).sum::<f64>().max(f64::MIN_POSITIVE);
    if fit.rss <= 1e-12 * scale {
        return StationarityResult::undefined(best_lag);
    }

    let statistic = fit.t_stat(0);
    if !statistic.is_finite() {
        return StationarityResult::undefined(best_lag);
    }

    StationarityResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        lags: best_lag,
        n_obs: target.len(),
        critical_values: critical_values(target.len()),
    }
}
