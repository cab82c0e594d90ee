//! Settings for the model sweep.

use std::time::Duration;

/// Closed interval every fitted and forecast value must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Non-negative values, e.g. room counts or revenue.
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// True for values in `[low, high]`. NaN is never inside.
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

/// Configuration for [`ForecastModelSearch`](super::ForecastModelSearch).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchConfig {
    /// Worker threads for the sweep; `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    /// Wall-clock budget; configurations not started before it runs out are skipped.
    pub deadline: Option<Duration>,
}

impl SearchConfig {
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
