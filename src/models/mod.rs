//! Forecasting models.

mod traits;

pub mod arima;

pub use arima::{ARIMASpec, Order, ARIMAX};
pub use traits::{BoxedForecaster, Forecaster};
