//! ARIMA models with exogenous regressors.
//!
//! This module provides:
//! - [`ARIMAX`], regression with ARIMA(p, d, q) errors
//! - Differencing and integration helpers
//! - Reparameterisations that keep AR parts stationary and MA parts invertible

mod constraints;
mod diff;
mod model;

pub use constraints::{constrain_invertible, constrain_stationary};
pub use diff::{difference, integrate};
pub use model::{ARIMASpec, Order, ARIMAX};
