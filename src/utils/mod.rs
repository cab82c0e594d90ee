//! Numerical utilities shared by the models and the search.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{mae, mape, mse, r_squared, rmse, smape, Metric, MetricFn};
pub use ols::{ols_fit, OLSResult};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{mean, normal_cdf, quantile_normal};
