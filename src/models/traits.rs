//! Forecaster trait defining the common interface for models driven by exogenous data.

use crate::core::Forecast;
use crate::error::Result;

/// Common interface for forecasting models with exogenous regressors.
///
/// Exogenous data is passed column-wise: one `Vec<f64>` per regressor, each as
/// long as the target (when fitting) or the horizon (when predicting).
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the target and its regressors.
    fn fit(&mut self, target: &[f64], exog: &[Vec<f64>]) -> Result<()>;

    /// Predict `horizon` steps ahead given future regressor values.
    fn predict(&self, horizon: usize, exog: &[Vec<f64>]) -> Result<Forecast>;

    /// Predict with prediction intervals at `level` (e.g. 0.95).
    fn predict_with_intervals(
        &self,
        horizon: usize,
        exog: &[Vec<f64>],
        level: f64,
    ) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon, exog)
    }

    /// In-sample one-step predictions, aligned with the training target.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Training target minus fitted values.
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use amara::models::{BoxedForecaster, ARIMAX};
///
/// let model: BoxedForecaster = Box::new(ARIMAX::new(1, 0, 0));
/// assert_eq!(model.name(), "ARIMAX");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send + Sync>;
