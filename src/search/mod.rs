//! Hyperparameter search for ARIMAX models over a train/forecast split.
//!
//! Every `(p, d, q)` combination is fitted independently on a rayon pool.
//! Configurations that fail to fit or produce values outside the caller's
//! bounds are counted and left out of the ranked result.

mod config;
mod exhaustive;
mod result;

pub use config::{Bounds, SearchConfig};
pub use exhaustive::ForecastModelSearch;
pub use result::{ModelScore, SearchResult, SearchSummary};
