//! Configuration for building a [`TimeSeriesDataset`](super::TimeSeriesDataset).

use crate::preprocessing::DateFormat;

/// Configuration for dataset construction and stationarity enforcement.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    /// Calendar years removed from every source table.
    pub excluded_years: Vec<i32>,
    /// How the nominated date columns are parsed.
    pub date_format: DateFormat,
    /// Remove the date column from the regular columns once it becomes the index.
    pub drop_date_column: bool,
    /// Maximum number of differences `auto_diff` applies to one column.
    pub max_diff_order: usize,
    /// p-value at or below which a column counts as stationary.
    pub significance: f64,
    /// Maximum lag order for the ADF test (`None` picks one from the series length).
    pub adf_max_lags: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            excluded_years: Vec::new(),
            date_format: DateFormat::Auto,
            drop_date_column: true,
            max_diff_order: 3,
            significance: 0.05,
            adf_max_lags: None,
        }
    }
}

impl DatasetConfig {
    /// Set the years removed from every table.
    pub fn with_excluded_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.excluded_years = years.into_iter().collect();
        self
    }

    /// Set the date parsing mode.
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = format;
        self
    }

    /// Keep the date column as a regular column as well as the index.
    pub fn keep_date_column(mut self) -> Self {
        self.drop_date_column = false;
        self
    }

    /// Set the differencing cap used by `auto_diff`.
    pub fn with_max_diff_order(mut self, order: usize) -> Self {
        self.max_diff_order = order;
        self
    }

    /// Set the stationarity significance level.
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_adf_max_lags(mut self, lags: usize) -> Self {
        self.adf_max_lags = Some(lags);
        self
    }
}
