//! Promote a date column to the row index of a table.

use crate::core::{Column, DateIndexedTable, Table};
use crate::error::{AmaraError, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// How the values of a date column are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// The column already holds dates.
    AsIs,
    /// Infer a single day-first format for the whole column.
    #[default]
    Auto,
    /// Parse every value with this chrono format string.
    Explicit(String),
}

impl DateFormat {
    pub fn explicit(format: impl Into<String>) -> Self {
        DateFormat::Explicit(format.into())
    }
}

/// Candidate formats tried by [`DateFormat::Auto`], day-first before year-first.
/// Two-digit years come first since `%Y` would also accept them.
const AUTO_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d-%m-%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d",
    "%d %b %Y", "%d %B %Y", "%d-%b-%Y", "%b %d %Y",
];

const AUTO_TIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M", "T%H:%M:%S", "T%H:%M:%S%.f"];

/// Parse one value with a chrono format, accepting date-time formats by truncation.
fn parse_with(value: &str, format: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.date())
        })
}

/// Find the first candidate format that parses every value.
fn infer_format(values: &[&str]) -> Option<String> {
    let date_only = AUTO_DATE_FORMATS.iter().map(|f| f.to_string());
    let with_time = AUTO_DATE_FORMATS
        .iter()
        .flat_map(|d| AUTO_TIME_SUFFIXES.iter().map(move |t| format!("{d}{t}")));

    date_only
        .chain(with_time)
        .find(|format| values.iter().all(|v| parse_with(v, format).is_some()))
}

fn parse_text_column(
    column_name: &str,
    values: &[Option<String>],
    format: &DateFormat,
) -> Result<Vec<NaiveDate>> {
    let missing = || AmaraError::ParseError {
        column: column_name.to_string(),
        value: "<missing>".to_string(),
    };
    let raw: Vec<&str> = values
        .iter()
        .map(|v| v.as_deref().ok_or_else(missing))
        .collect::<Result<_>>()?;

    let format = match format {
        DateFormat::AsIs => {
            return Err(AmaraError::ParseError {
                column: column_name.to_string(),
                value: "text column where dates were expected".to_string(),
            })
        }
        DateFormat::Explicit(f) => f.clone(),
        DateFormat::Auto => match infer_format(&raw) {
            Some(f) => f,
            None => {
                // report the first value no single candidate can read
                let culprit = raw
                    .iter()
                    .find(|v| {
                        !AUTO_DATE_FORMATS
                            .iter()
                            .any(|f| parse_with(v, f).is_some())
                    })
                    .or(raw.first())
                    .copied()
                    .unwrap_or_default();
                return Err(AmaraError::ParseError {
                    column: column_name.to_string(),
                    value: culprit.to_string(),
                });
            }
        },
    };

    raw.iter()
        .map(|v| {
            parse_with(v, &format).ok_or_else(|| AmaraError::ParseError {
                column: column_name.to_string(),
                value: v.to_string(),
            })
        })
        .collect()
}

/// Resolve a column into one date per row.
pub fn parse_dates(column_name: &str, column: &Column, format: &DateFormat) -> Result<Vec<NaiveDate>> {
    match column {
        Column::Date(values) => values
            .iter()
            .map(|d| {
                d.ok_or_else(|| AmaraError::ParseError {
                    column: column_name.to_string(),
                    value: "<missing>".to_string(),
                })
            })
            .collect(),
        Column::Text(values) => parse_text_column(column_name, values, format),
        Column::Float(_) => Err(AmaraError::ParseError {
            column: column_name.to_string(),
            value: "float column cannot hold dates".to_string(),
        }),
    }
}

/// Create a date index for `table` from `date_column`.
///
/// With `drop` the source column is removed from the regular columns; without it
/// the column stays and also serves as the index. The input is never modified.
pub fn create_datetime_index(
    table: &Table,
    date_column: &str,
    format: &DateFormat,
    drop: bool,
) -> Result<DateIndexedTable> {
    let index = parse_dates(date_column, table.column(date_column)?, format)?;

    let mut data = table.clone();
    if drop {
        data.remove(date_column)?;
    }

    DateIndexedTable::new(index, data)
}
