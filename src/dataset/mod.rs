//! Dataset assembly: unified multi-source time series, the master calendar
//! and the weighted event calendar.
//!
//! A [`TimeSeriesDataset`] moves through a fixed sequence of states:
//! indexed and unified at construction, then consolidated, optionally
//! differenced, and finally split into training and forecast partitions.

mod calendar;
mod config;
mod events;
mod time_series_dataset;

pub use calendar::MasterCalendar;
pub use config::DatasetConfig;
pub use events::{day_multiplier, EventCalendar};
pub use time_series_dataset::{Split, TimeSeriesDataset};
