//! Preprocessing applied to raw report tables before they enter a dataset.
//!
//! # Example
//!
//! ```
//! use amara::core::{Column, Table};
//! use amara::preprocessing::{create_datetime_index, DateFormat};
//!
//! let table = Table::from_columns(vec![
//!     ("Date", Column::text(["01/03/2023", "02/03/2023"])),
//!     ("Rooms Sold", Column::Float(vec![112.0, 98.0])),
//! ])
//! .unwrap();
//!
//! let indexed = create_datetime_index(&table, "Date", &DateFormat::Auto, true).unwrap();
//! assert_eq!(indexed.len(), 2);
//! assert_eq!(indexed.names(), &["Rooms Sold".to_string()]);
//! ```

mod datetime_index;
mod interpolate;

pub use datetime_index::{create_datetime_index, parse_dates, DateFormat};
pub use interpolate::{fill_mean, interpolate_time};
