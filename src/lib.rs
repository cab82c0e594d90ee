//! # amara
//!
//! Time series dataset assembly and ARIMAX model search for hotel analytics.
//!
//! Report tables with a date column are indexed on that column and restricted
//! to the dates every table covers. Selected columns are consolidated into one
//! working table, made stationary by differencing, split into training and
//! forecast partitions, and handed to an exhaustive ARIMAX order search.
//!
//! ```
//! use amara::prelude::*;
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let dates: Vec<String> = (0..120)
//!     .map(|i| (start + Duration::days(i)).format("%d/%m/%Y").to_string())
//!     .collect();
//! let rooms: Vec<f64> = (0..120).map(|i| 90.0 + 10.0 * (i as f64 * 0.45).sin()).collect();
//! let table = Table::from_columns(vec![
//!     ("Date", Column::text(dates)),
//!     ("Rooms Sold", Column::Float(rooms)),
//! ])
//! .unwrap();
//!
//! let mut dataset = TimeSeriesDataset::new(&[table], &["Date"], &[]).unwrap();
//! dataset.consolidate(&[0], &["Rooms Sold"], &[]).unwrap();
//! dataset.set_target("Rooms Sold").unwrap();
//! dataset.split(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(), 3, 1).unwrap();
//!
//! let search = ForecastModelSearch::from_dataset(&dataset).unwrap();
//! let result = search
//!     .exhaustive_search(&[0, 1, 2], &[0], &[0, 1], &[Metric::MAE], Some(Bounds::non_negative()))
//!     .unwrap();
//! assert_eq!(result.summary.attempted, 6);
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod dataset;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod search;
pub mod utils;
pub mod validation;

pub use error::{AmaraError, Result};

pub mod prelude {
    pub use crate::core::{Column, DateIndexedTable, DateRange, Forecast, Table};
    pub use crate::dataset::{DatasetConfig, EventCalendar, MasterCalendar, TimeSeriesDataset};
    pub use crate::error::{AmaraError, Result};
    pub use crate::models::{ARIMASpec, Forecaster, ARIMAX};
    pub use crate::preprocessing::{create_datetime_index, DateFormat};
    pub use crate::search::{Bounds, ForecastModelSearch, SearchConfig, SearchResult};
    pub use crate::utils::Metric;
}
