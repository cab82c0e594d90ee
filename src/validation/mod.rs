//! Statistical tests used to prepare series for autoregressive models.
//!
//! # Example
//!
//! ```
//! use amara::validation::adf_test;
//!
//! let trend: Vec<f64> = (0..120).map(|i| 50.0 + 0.8 * i as f64 + (i as f64).sin()).collect();
//! let result = adf_test(&trend, None);
//! assert!(!result.is_stationary(0.05));
//! ```

pub mod stationarity;

pub use stationarity::{adf_test, mackinnon_p_value, CriticalValues, StationarityResult};
