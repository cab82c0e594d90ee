//! Ranked output of a model sweep.

use std::time::Duration;

use crate::core::{Column, Table};
use crate::error::Result;
use crate::models::Order;

/// Scores of one configuration that fitted and stayed within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub order: Order,
    /// One score per metric on the training target and in-sample predictions.
    pub train_scores: Vec<f64>,
    /// One score per metric on the forecast partition, when it holds the target.
    pub forecast_scores: Option<Vec<f64>>,
    pub aic: f64,
}

/// Bookkeeping for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    /// Configurations in the Cartesian product.
    pub attempted: usize,
    pub passes: usize,
    /// Configurations that failed to fit or left the bounds.
    pub failures: usize,
    /// Configurations never started because the deadline passed.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Passing configurations, best first.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub rows: Vec<ModelScore>,
    pub summary: SearchSummary,
    metric_names: Vec<&'static str>,
}

impl SearchResult {
    pub(crate) fn new(
        rows: Vec<ModelScore>,
        summary: SearchSummary,
        metric_names: Vec<&'static str>,
    ) -> Self {
        Self {
            rows,
            summary,
            metric_names,
        }
    }

    pub fn metric_names(&self) -> &[&'static str] {
        &self.metric_names
    }

    /// Top-ranked configuration.
    pub fn best(&self) -> Option<&ModelScore> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a table: an `order` column, one column per metric, an `aic`
    /// column, and for backtests one `<metric>_forecast` column per metric.
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new();
        table.push(
            "order",
            Column::text(self.rows.iter().map(|r| r.order.to_string())),
        )?;

        for (i, name) in self.metric_names.iter().enumerate() {
            let values = self.rows.iter().map(|r| r.train_scores[i]).collect();
            table.push(*name, Column::Float(values))?;
        }
        table.push(
            "aic",
            Column::Float(self.rows.iter().map(|r| r.aic).collect()),
        )?;

        if self.rows.iter().any(|r| r.forecast_scores.is_some()) {
            for (i, name) in self.metric_names.iter().enumerate() {
                let values = self
                    .rows
                    .iter()
                    .map(|r| {
                        r.forecast_scores
                            .as_ref()
                            .map_or(f64::NAN, |scores| scores[i])
                    })
                    .collect();
                table.push(format!("{name}_forecast"), Column::Float(values))?;
            }
        }

        Ok(table)
    }
}
