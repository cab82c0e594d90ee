//! Tables keyed by one calendar date per row.

use crate::core::date_range::DateRange;
use crate::core::table::{Column, Table};
use crate::error::{AmaraError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// A [`Table`] with a per-row date key.
///
/// Rows are treated as sorted ascending by date. Dates need not be unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateIndexedTable {
    index: Vec<NaiveDate>,
    table: Table,
}

impl DateIndexedTable {
    /// Pair a date index with a table of the same length.
    pub fn new(index: Vec<NaiveDate>, table: Table) -> Result<Self> {
        if table.width() > 0 && table.len() != index.len() {
            return Err(AmaraError::DimensionMismatch {
                expected: index.len(),
                got: table.len(),
            });
        }
        Ok(Self { index, table })
    }

    /// Build from dates and `(name, column)` pairs.
    pub fn from_columns<S: Into<String>>(
        index: Vec<NaiveDate>,
        columns: Vec<(S, Column)>,
    ) -> Result<Self> {
        Self::new(index, Table::from_columns(columns)?)
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn names(&self) -> &[String] {
        self.table.names()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.table.column(name)
    }

    pub fn float(&self, name: &str) -> Result<&[f64]> {
        self.table.float(name)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.index.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.index.last().copied()
    }

    /// Distinct calendar years present in the index.
    pub fn years(&self) -> BTreeSet<i32> {
        self.index.iter().map(|d| d.year()).collect()
    }

    /// True when no date appears twice.
    pub fn has_unique_dates(&self) -> bool {
        self.index.iter().collect::<BTreeSet<_>>().len() == self.index.len()
    }

    /// Insert or overwrite a column.
    pub fn set(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        if self.table.width() == 0 && column.len() != self.index.len() {
            return Err(AmaraError::DimensionMismatch {
                expected: self.index.len(),
                got: column.len(),
            });
        }
        self.table.set(name, column)
    }

    /// Keep only the named columns.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        Ok(Self {
            index: self.index.clone(),
            table: self.table.select(names)?,
        })
    }

    /// Keep rows whose date satisfies `keep`.
    pub fn filter<F>(&self, keep: F) -> Self
    where
        F: Fn(NaiveDate) -> bool,
    {
        let rows: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, d)| keep(**d))
            .map(|(i, _)| i)
            .collect();
        self.take(&rows)
    }

    /// Rows dated inside `[start, end]`, inclusive on both ends.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter(|d| start <= d && d <= end)
    }

    /// Rows dated inside `(start, end]`.
    pub fn slice_after(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter(|d| start < d && d <= end)
    }

    /// Rows inside a [`DateRange`].
    pub fn restrict(&self, range: &DateRange) -> Self {
        self.filter(|d| range.contains(d))
    }

    /// Drop rows whose year appears in `years`.
    pub fn exclude_years(&self, years: &[i32]) -> Self {
        if years.is_empty() {
            return self.clone();
        }
        self.filter(|d| !years.contains(&d.year()))
    }

    /// Pick rows by position.
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            index: rows.iter().map(|&i| self.index[i]).collect(),
            table: self.table.take(rows),
        }
    }

    /// Split into the index and the table.
    pub fn into_parts(self) -> (Vec<NaiveDate>, Table) {
        (self.index, self.table)
    }
}
