//! Exhaustive ARIMAX order search over a train/forecast split.

use std::fmt;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::DateIndexedTable;
use crate::dataset::TimeSeriesDataset;
use crate::error::{AmaraError, Result};
use crate::models::{ARIMASpec, Forecaster, ARIMAX};
use crate::search::config::{Bounds, SearchConfig};
use crate::search::result::{ModelScore, SearchResult, SearchSummary};
use crate::utils::metrics::Metric;

/// Why a configuration was dropped from the results.
#[derive(Debug)]
enum FitFailure {
    Fit(AmaraError),
    NonFinite,
    OutOfBounds(f64),
}

impl fmt::Display for FitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitFailure::Fit(e) => write!(f, "{e}"),
            FitFailure::NonFinite => write!(f, "non-finite prediction"),
            FitFailure::OutOfBounds(v) => write!(f, "prediction {v} outside bounds"),
        }
    }
}

enum Outcome {
    Pass(ModelScore),
    Failed,
    Skipped,
}

/// A modelling session over fixed training and forecast partitions.
///
/// The training partition supplies the target and, from every other column, the
/// exogenous regressors. The forecast partition supplies future regressor
/// values; when it also carries the target, forecasts are scored against it.
///
/// # Example
///
/// ```
/// use amara::core::{Column, DateIndexedTable};
/// use amara::search::ForecastModelSearch;
/// use amara::utils::Metric;
/// use chrono::{Duration, NaiveDate};
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
/// let dates: Vec<NaiveDate> = (0..70).map(|i| start + Duration::days(i)).collect();
/// let demand: Vec<f64> = (0..70).map(|i| 100.0 + (i as f64 * 0.9).sin() * 8.0).collect();
/// let events: Vec<f64> = (0..70).map(|i| (i % 5 == 0) as u8 as f64).collect();
///
/// let table = DateIndexedTable::from_columns(
///     dates,
///     vec![("Demand", Column::Float(demand)), ("Events", Column::Float(events))],
/// )
/// .unwrap();
/// let train = table.take(&(0..60).collect::<Vec<_>>());
/// let forecast = table.take(&(60..70).collect::<Vec<_>>());
///
/// let search = ForecastModelSearch::new(&train, &forecast, "Demand").unwrap();
/// let result = search
///     .exhaustive_search(&[0, 1], &[0], &[0, 1], &[Metric::MAE, Metric::RMSE], None)
///     .unwrap();
/// assert_eq!(result.summary.passes + result.summary.failures, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ForecastModelSearch {
    target_column: String,
    exog_names: Vec<String>,
    train_target: Vec<f64>,
    train_exog: Vec<Vec<f64>>,
    forecast_target: Option<Vec<f64>>,
    forecast_exog: Vec<Vec<f64>>,
    horizon: usize,
    config: SearchConfig,
}

impl ForecastModelSearch {
    /// Split both partitions into target and exogenous columns.
    ///
    /// Every non-target training column must be numeric and present in the
    /// forecast partition.
    pub fn new(
        train: &DateIndexedTable,
        forecast: &DateIndexedTable,
        target_column: &str,
    ) -> Result<Self> {
        let train_target = train.float(target_column)?.to_vec();
        let exog_names: Vec<String> = train
            .names()
            .iter()
            .filter(|n| n.as_str() != target_column)
            .cloned()
            .collect();

        let train_exog = exog_names
            .iter()
            .map(|n| train.float(n).map(<[f64]>::to_vec))
            .collect::<Result<Vec<_>>>()?;
        let forecast_exog = exog_names
            .iter()
            .map(|n| forecast.float(n).map(<[f64]>::to_vec))
            .collect::<Result<Vec<_>>>()?;

        let forecast_target = if forecast.is_empty() {
            None
        } else {
            match forecast.float(target_column) {
                Ok(values) => Some(values.to_vec()),
                Err(AmaraError::ColumnNotFound(_)) => None,
                Err(e) => return Err(e),
            }
        };

        debug!(
            target = target_column,
            exog = exog_names.len(),
            train = train_target.len(),
            horizon = forecast.len(),
            backtest = forecast_target.is_some(),
            "search session"
        );

        Ok(Self {
            target_column: target_column.to_string(),
            exog_names,
            train_target,
            train_exog,
            forecast_target,
            forecast_exog,
            horizon: forecast.len(),
            config: SearchConfig::default(),
        })
    }

    /// Session over a dataset that has been split and has a target.
    pub fn from_dataset(dataset: &TimeSeriesDataset) -> Result<Self> {
        let target = dataset.target()?;
        let split = dataset.split_data()?;
        Self::new(&split.train, &split.forecast, target)
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn exog_names(&self) -> &[String] {
        &self.exog_names
    }

    pub fn train_target(&self) -> &[f64] {
        &self.train_target
    }

    /// Exogenous columns of the forecast partition, ready for [`Forecaster::predict`].
    pub fn forecast_exog(&self) -> &[Vec<f64>] {
        &self.forecast_exog
    }

    /// Rows in the forecast partition.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// True when the forecast partition carries the target.
    pub fn is_backtest(&self) -> bool {
        self.forecast_target.is_some()
    }

    /// Fit every `(p, d, q)` in the Cartesian product of the three lists and score
    /// the passing ones with `metrics`, ranked by the first metric.
    ///
    /// A configuration fails when fitting errors, when any prediction is not
    /// finite, or when any in-sample or forecast value leaves `bounds`. Failures
    /// are counted and never abort the sweep.
    pub fn exhaustive_search(
        &self,
        p_values: &[usize],
        d_values: &[usize],
        q_values: &[usize],
        metrics: &[Metric],
        bounds: Option<Bounds>,
    ) -> Result<SearchResult> {
        if metrics.is_empty() {
            return Err(AmaraError::InvalidParameter(
                "at least one metric is required to rank models".to_string(),
            ));
        }

        let orders: Vec<ARIMASpec> = p_values
            .iter()
            .flat_map(|&p| {
                d_values
                    .iter()
                    .flat_map(move |&d| q_values.iter().map(move |&q| ARIMASpec::new(p, d, q)))
            })
            .collect();

        let start = Instant::now();
        let deadline = self.config.deadline.map(|budget| start + budget);
        let sweep = || {
            orders
                .par_iter()
                .map(|&order| self.evaluate(order, metrics, bounds, deadline))
                .collect::<Vec<_>>()
        };
        let outcomes = match self.config.num_threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| AmaraError::ComputationError(e.to_string()))?
                .install(sweep),
            None => sweep(),
        };

        let mut rows = Vec::new();
        let (mut failures, mut skipped) = (0, 0);
        for outcome in outcomes {
            match outcome {
                Outcome::Pass(score) => rows.push(score),
                Outcome::Failed => failures += 1,
                Outcome::Skipped => skipped += 1,
            }
        }

        let ranking = metrics[0];
        rows.sort_by(|a, b| rank(&ranking, a).total_cmp(&rank(&ranking, b)));

        let summary = SearchSummary {
            attempted: orders.len(),
            passes: rows.len(),
            failures,
            skipped,
            elapsed: start.elapsed(),
        };
        info!(
            attempted = summary.attempted,
            passes = summary.passes,
            failures = summary.failures,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "exhaustive search finished"
        );

        Ok(SearchResult::new(
            rows,
            summary,
            metrics.iter().map(|m| m.name).collect(),
        ))
    }

    fn evaluate(
        &self,
        order: ARIMASpec,
        metrics: &[Metric],
        bounds: Option<Bounds>,
        deadline: Option<Instant>,
    ) -> Outcome {
        if deadline.is_some_and(|at| Instant::now() >= at) {
            return Outcome::Skipped;
        }

        match self.score(order, metrics, bounds) {
            Ok(score) => Outcome::Pass(score),
            Err(failure) => {
                debug!(%order, %failure, "configuration failed");
                Outcome::Failed
            }
        }
    }

    fn score(
        &self,
        order: ARIMASpec,
        metrics: &[Metric],
        bounds: Option<Bounds>,
    ) -> std::result::Result<ModelScore, FitFailure> {
        let mut model = ARIMAX::from_spec(order);
        model
            .fit(&self.train_target, &self.train_exog)
            .map_err(FitFailure::Fit)?;
        let forecast = model
            .predict(self.horizon, &self.forecast_exog)
            .map_err(FitFailure::Fit)?;
        let fitted = model
            .fitted_values()
            .ok_or(FitFailure::Fit(AmaraError::NotReady("fit")))?;

        let mut predictions = fitted.iter().chain(forecast.values());
        if predictions.clone().any(|v| !v.is_finite()) {
            return Err(FitFailure::NonFinite);
        }
        if let Some(bounds) = bounds {
            if let Some(&outside) = predictions.find(|v| !bounds.contains(**v)) {
                return Err(FitFailure::OutOfBounds(outside));
            }
        }

        let train_scores = metrics
            .iter()
            .map(|m| m.score(&self.train_target, fitted))
            .collect();
        let forecast_scores = self.forecast_target.as_ref().map(|actual| {
            metrics
                .iter()
                .map(|m| m.score(actual, forecast.values()))
                .collect()
        });

        Ok(ModelScore {
            order,
            train_scores,
            forecast_scores,
            aic: model.aic().unwrap_or(f64::NAN),
        })
    }

    /// Rebuild the model for `order`, fitted on the training partition when `fit` is set.
    pub fn reconstruct(&self, order: impl Into<ARIMASpec>, fit: bool) -> Result<ARIMAX> {
        let mut model = ARIMAX::from_spec(order.into());
        if fit {
            model.fit(&self.train_target, &self.train_exog)?;
        }
        Ok(model)
    }
}

/// Sort key for the ranking metric: ascending, NaN last.
fn rank(metric: &Metric, score: &ModelScore) -> f64 {
    let value = score.train_scores[0];
    match (value.is_nan(), metric.higher_is_better) {
        (true, _) => f64::INFINITY,
        (false, true) => -value,
        (false, false) => value,
    }
}
