//! ARIMA with exogenous regressors (regression with ARIMA errors).

use std::fmt;

use crate::core::Forecast;
use crate::error::{AmaraError, Result};
use crate::models::arima::constraints::{constrain_invertible, constrain_stationary};
use crate::models::arima::diff::{difference, differencing_polynomial, integrate};
use crate::models::Forecaster;
use crate::utils::ols::{ols_fit, OLSResult};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

/// ARIMA order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ARIMASpec {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated parameters given `n_exog` regressors.
    pub fn num_params(&self, n_exog: usize) -> usize {
        self.p + self.q + 1 + n_exog
    }

    /// Observations needed to fit the order with `n_exog` regressors.
    pub fn min_observations(&self, n_exog: usize) -> usize {
        self.d + self.p.max(self.q) + n_exog + 2
    }
}

/// Shorthand used by search results.
pub type Order = ARIMASpec;

impl Default for ARIMASpec {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl From<(usize, usize, usize)> for ARIMASpec {
    fn from((p, d, q): (usize, usize, usize)) -> Self {
        Self::new(p, d, q)
    }
}

impl fmt::Display for ARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Estimated state kept after a successful fit.
#[derive(Debug, Clone)]
struct FittedState {
    regression: OLSResult,
    ar: Vec<f64>,
    ma: Vec<f64>,
    target: Vec<f64>,
    exog: Vec<Vec<f64>>,
    /// Regression errors on the differenced scale.
    errors: Vec<f64>,
    /// One-step innovations on the differenced scale.
    innovations: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    aic: f64,
    bic: f64,
    converged: bool,
}

/// ARIMA(p, d, q) with exogenous regressors.
///
/// The target and every regressor are differenced `d` times, the differenced
/// target is regressed on the differenced regressors with an intercept, and
/// an ARMA(p, q) is fitted to the regression errors by conditional sum of
/// squares. AR coefficients are kept stationary and MA coefficients invertible
/// through a partial autocorrelation reparameterisation.
///
/// # Example
///
/// ```
/// use amara::models::{Forecaster, ARIMAX};
///
/// let target: Vec<f64> = (0..60).map(|i| 5.0 + 0.3 * i as f64 + (i as f64 * 0.7).sin()).collect();
/// let promo: Vec<f64> = (0..60).map(|i| (i % 7 == 0) as u8 as f64).collect();
///
/// let mut model = ARIMAX::new(1, 1, 0);
/// model.fit(&target, &[promo]).unwrap();
///
/// let future = vec![vec![0.0, 1.0, 0.0]];
/// let forecast = model.predict(3, &future).unwrap();
/// assert_eq!(forecast.horizon(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ARIMAX {
    spec: ARIMASpec,
    optimizer: NelderMeadConfig,
    state: Option<FittedState>,
}

impl ARIMAX {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self {
            spec,
            optimizer: NelderMeadConfig::default().with_tolerance(1e-10),
            state: None,
        }
    }

    /// Override the optimizer settings used by [`Forecaster::fit`].
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        self.state.as_ref().map(|s| s.ar.as_slice()).unwrap_or(&[])
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        self.state.as_ref().map(|s| s.ma.as_slice()).unwrap_or(&[])
    }

    /// Regression intercept on the differenced scale.
    pub fn intercept(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.regression.intercept)
    }

    /// Regression coefficients, one per exogenous column.
    pub fn exog_coefficients(&self) -> &[f64] {
        self.state
            .as_ref()
            .map(|s| s.regression.coefficients.as_slice())
            .unwrap_or(&[])
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }

    /// Whether the optimizer met its tolerance.
    pub fn converged(&self) -> Option<bool> {
        self.state.as_ref().map(|s| s.converged)
    }

    fn state(&self) -> Result<&FittedState> {
        self.state.as_ref().ok_or(AmaraError::NotReady("fit"))
    }

    fn unpack(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (ar, ma) = params.split_at(self.spec.p);
        (constrain_stationary(ar), constrain_invertible(ma))
    }
}

impl Default for ARIMAX {
    fn default() -> Self {
        Self::from_spec(ARIMASpec::default())
    }
}

/// Intercept plus regression term for every row of `columns`.
fn regression_mean(regression: &OLSResult, columns: &[Vec<f64>], len: usize) -> Result<Vec<f64>> {
    if columns.is_empty() {
        return Ok(vec![regression.intercept; len]);
    }
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    regression.predict(&refs)
}

/// One-step ARMA innovations for `errors`. Lags before the sample start are zero.
fn innovations(errors: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut e = vec![0.0; errors.len()];
    for t in 0..errors.len() {
        let mut pred = 0.0;
        for (i, phi) in ar.iter().enumerate().take(t) {
            pred += phi * errors[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate().take(t) {
            pred += theta * e[t - 1 - j];
        }
        e[t] = errors[t] - pred;
    }
    e
}

/// Sum of squared innovations, conditional on the first `p` observations.
fn conditional_sum_of_squares(errors: &[f64], ar: &[f64], ma: &[f64]) -> f64 {
    innovations(errors, ar, ma)
        .iter()
        .skip(ar.len())
        .map(|e| e * e)
        .sum()
}

/// MA(infinity) weights of the integrated process, used for interval widths.
fn psi_weights(ar: &[f64], ma: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    // phi(B) (1 - B)^d expanded into a single AR-form polynomial
    let diff_poly = differencing_polynomial(d);
    let mut full = vec![0.0; ar.len() + diff_poly.len()];
    let mut lhs = vec![1.0];
    lhs.extend(ar.iter().map(|a| -a));
    let mut rhs = vec![1.0];
    rhs.extend(diff_poly.iter().map(|c| -c));
    for (i, a) in lhs.iter().enumerate() {
        for (j, b) in rhs.iter().enumerate() {
            if i + j > 0 {
                full[i + j - 1] -= a * b;
            }
        }
    }

    let mut psi = vec![1.0];
    for h in 1..horizon {
        let mut value = ma.get(h - 1).copied().unwrap_or(0.0);
        for (i, phi) in full.iter().enumerate().take(h) {
            value += phi * psi[h - 1 - i];
        }
        psi.push(value);
    }
    psi
}

impl Forecaster for ARIMAX {
    fn fit(&mut self, target: &[f64], exog: &[Vec<f64>]) -> Result<()> {
        let n = target.len();
        let needed = self.spec.min_observations(exog.len());
        if n < needed {
            return Err(AmaraError::InsufficientData { needed, got: n });
        }
        if let Some(bad) = exog.iter().find(|c| c.len() != n) {
            return Err(AmaraError::DimensionMismatch {
                expected: n,
                got: bad.len(),
            });
        }
        if target.iter().chain(exog.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(AmaraError::ComputationError(
                "ARIMAX input contains missing or infinite values".to_string(),
            ));
        }

        let d = self.spec.d;
        let diff_target = difference(target, d);
        let diff_exog: Vec<Vec<f64>> = exog.iter().map(|c| difference(c, d)).collect();
        let refs: Vec<&[f64]> = diff_exog.iter().map(Vec::as_slice).collect();

        let regression = ols_fit(&diff_target, &refs)?;
        let mean = regression_mean(&regression, &diff_exog, diff_target.len())?;
        let errors: Vec<f64> = diff_target.iter().zip(&mean).map(|(y, m)| y - m).collect();

        let k = self.spec.p + self.spec.q;
        let (ar, ma, converged) = if k == 0 {
            (Vec::new(), Vec::new(), true)
        } else {
            let result = nelder_mead(
                |params| {
                    let (ar, ma) = self.unpack(params);
                    conditional_sum_of_squares(&errors, &ar, &ma)
                },
                &vec![0.0; k],
                self.optimizer.clone(),
            );
            if !result.optimal_value.is_finite() {
                return Err(AmaraError::ComputationError(format!(
                    "ARIMA{} likelihood did not evaluate to a finite value",
                    self.spec
                )));
            }
            let (ar, ma) = self.unpack(&result.optimal_point);
            (ar, ma, result.converged)
        };

        let innovations = innovations(&errors, &ar, &ma);
        let conditional = &innovations[ar.len().min(innovations.len())..];
        if conditional.is_empty() {
            return Err(AmaraError::InsufficientData { needed, got: n });
        }
        let n_eff = conditional.len() as f64;
        let sigma2 = (conditional.iter().map(|e| e * e).sum::<f64>() / n_eff).max(f64::MIN_POSITIVE);

        // first d observations have no differenced counterpart
        let mut fitted = target[..d].to_vec();
        fitted.extend(
            target[d..]
                .iter()
                .zip(&innovations)
                .map(|(y, e)| y - e),
        );
        let residuals: Vec<f64> = target.iter().zip(&fitted).map(|(y, f)| y - f).collect();

        let params = self.spec.num_params(exog.len()) as f64;
        let ll = -0.5 * n_eff * (1.0 + sigma2.ln() + (2.0 * std::f64::consts::PI).ln());

        self.state = Some(FittedState {
            regression,
            ar,
            ma,
            target: target.to_vec(),
            exog: exog.to_vec(),
            errors,
            innovations,
            fitted,
            residuals,
            sigma2,
            aic: -2.0 * ll + 2.0 * params,
            bic: -2.0 * ll + params * n_eff.ln(),
            converged,
        });
        Ok(())
    }

    fn predict(&self, horizon: usize, exog: &[Vec<f64>]) -> Result<Forecast> {
        let state = self.state()?;
        if exog.len() != state.exog.len() {
            return Err(AmaraError::ArityMismatch {
                what: "future exogenous columns",
                expected: state.exog.len(),
                got: exog.len(),
            });
        }
        if let Some(bad) = exog.iter().find(|c| c.len() != horizon) {
            return Err(AmaraError::DimensionMismatch {
                expected: horizon,
                got: bad.len(),
            });
        }
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let d = self.spec.d;
        let future_diff: Vec<Vec<f64>> = state
            .exog
            .iter()
            .zip(exog)
            .map(|(past, future)| {
                let mut full = past.clone();
                full.extend_from_slice(future);
                let diffed = difference(&full, d);
                diffed[diffed.len() - horizon..].to_vec()
            })
            .collect();
        let mean = regression_mean(&state.regression, &future_diff, horizon)?;

        let mut errors = state.errors.clone();
        let mut shocks = state.innovations.clone();
        let mut forecast_diff = Vec::with_capacity(horizon);
        for m in mean {
            let t = errors.len();
            let mut pred = 0.0;
            for (i, phi) in state.ar.iter().enumerate().take(t) {
                pred += phi * errors[t - 1 - i];
            }
            for (j, theta) in state.ma.iter().enumerate().take(t) {
                pred += theta * shocks[t - 1 - j];
            }
            errors.push(pred);
            shocks.push(0.0);
            forecast_diff.push(m + pred);
        }

        let point = if d > 0 {
            integrate(&forecast_diff, &state.target, d)
        } else {
            forecast_diff
        };
        Ok(Forecast::from_values(point))
    }

    fn predict_with_intervals(
        &self,
        horizon: usize,
        exog: &[Vec<f64>],
        level: f64,
    ) -> Result<Forecast> {
        if !(0.0..1.0).contains(&level) {
            return Err(AmaraError::InvalidParameter(format!(
                "interval level must be in [0, 1), got {level}"
            )));
        }
        let forecast = self.predict(horizon, exog)?;
        if horizon == 0 {
            return Ok(forecast);
        }
        let state = self.state()?;

        let z = quantile_normal((1.0 + level) / 2.0);
        let psi = psi_weights(&state.ar, &state.ma, self.spec.d, horizon);
        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (point, weight) in forecast.values().iter().zip(&psi) {
            cumulative += weight * weight;
            let se = (state.sigma2 * cumulative).sqrt();
            lower.push(point - z * se);
            upper.push(point + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            forecast.into_values(),
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        "ARIMAX"
    }
}
