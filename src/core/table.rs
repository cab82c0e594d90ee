//! Column-oriented table with named, heterogeneously typed columns.

use crate::error::{AmaraError, Result};
use chrono::NaiveDate;

/// A single typed column.
///
/// Missing numeric values are stored as NaN; missing text and date values as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    /// Build a text column from anything string-like.
    pub fn text<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Column::Text(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// Build a date column without missing values.
    pub fn dates(values: impl IntoIterator<Item = NaiveDate>) -> Self {
        Column::Date(values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the column type, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Text(_) => "text",
            Column::Date(_) => "date",
        }
    }

    /// Numeric values, if this is a float column.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Pick rows by position, in the given order.
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
            Column::Date(v) => Column::Date(rows.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Pick rows by optional position; `None` produces a missing cell.
    pub(crate) fn take_optional(&self, rows: &[Option<usize>]) -> Column {
        match self {
            Column::Float(v) => Column::Float(
                rows.iter()
                    .map(|r| r.map(|i| v[i]).unwrap_or(f64::NAN))
                    .collect(),
            ),
            Column::Text(v) => {
                Column::Text(rows.iter().map(|r| r.and_then(|i| v[i].clone())).collect())
            }
            Column::Date(v) => Column::Date(rows.iter().map(|r| r.and_then(|i| v[i])).collect()),
        }
    }
}

/// An ordered collection of named columns sharing one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from `(name, column)` pairs.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let mut table = Self::new();
        for (name, column) in columns {
            table.push(name, column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.position(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| AmaraError::ColumnNotFound(name.to_string()))
    }

    /// Get a float column by name.
    pub fn float(&self, name: &str) -> Result<&[f64]> {
        let column = self.column(name)?;
        column.as_float().ok_or_else(|| {
            AmaraError::InvalidParameter(format!(
                "column '{}' is {}, expected float",
                name,
                column.kind()
            ))
        })
    }

    /// Append a new column. The first column fixes the row count.
    pub fn push(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(AmaraError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(AmaraError::DimensionMismatch {
                expected: self.rows,
                got: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Insert or overwrite a column by name.
    pub fn set(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => {
                if column.len() != self.rows {
                    return Err(AmaraError::DimensionMismatch {
                        expected: self.rows,
                        got: column.len(),
                    });
                }
                self.columns[i] = column;
                Ok(())
            }
            None => self.push(name, column),
        }
    }

    /// Remove a column by name and return it.
    pub fn remove(&mut self, name: &str) -> Result<Column> {
        let i = self
            .position(name)
            .ok_or_else(|| AmaraError::ColumnNotFound(name.to_string()))?;
        self.names.remove(i);
        let column = self.columns.remove(i);
        Ok(column)
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut table = Table::new();
        for &name in names {
            table.push(name, self.column(name)?.clone())?;
        }
        table.rows = self.rows;
        Ok(table)
    }

    /// Pick rows by position.
    pub fn take(&self, rows: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            rows: rows.len(),
        }
    }

    /// Iterate over `(name, column)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }
}
