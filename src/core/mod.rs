//! Core data structures: tables, date-indexed tables, date ranges and forecasts.

mod date_range;
mod forecast;
mod indexed;
mod table;

pub use date_range::DateRange;
pub use forecast::Forecast;
pub use indexed::DateIndexedTable;
pub use table::{Column, Table};
