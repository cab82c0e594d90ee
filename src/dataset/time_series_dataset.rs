//! Multi-source time series dataset with a unified date range.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, info, warn};

use crate::core::{Column, DateIndexedTable, DateRange, Table};
use crate::dataset::config::DatasetConfig;
use crate::error::{AmaraError, Result};
use crate::preprocessing::{create_datetime_index, fill_mean, interpolate_time};
use crate::validation::adf_test;

/// Train/forecast partition of the consolidated table.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub split_date: NaiveDate,
    /// Rows dated in `[split_date - train_months, split_date]`.
    pub train: DateIndexedTable,
    /// Rows dated in `(split_date, split_date + forecast_months]`.
    pub forecast: DateIndexedTable,
    /// The data starts after the requested training window start.
    pub history_short: bool,
    /// The data ends before the requested forecast window end.
    pub horizon_short: bool,
}

/// A set of date-indexed source tables restricted to the dates they all cover.
///
/// Construction indexes every table on its date column, removes excluded
/// years, and intersects the date spans of all tables. The working copies are
/// restricted to that range; the initial copies keep their full history for
/// year-over-year lookups.
///
/// # Example
///
/// ```
/// use amara::core::{Column, Table};
/// use amara::dataset::TimeSeriesDataset;
///
/// let occupancy = Table::from_columns(vec![
///     ("Date", Column::text(["01/01/2023", "02/01/2023", "03/01/2023"])),
///     ("Occupancy", Column::Float(vec![0.61, 0.64, 0.70])),
/// ]).unwrap();
/// let revenue = Table::from_columns(vec![
///     ("Day", Column::text(["02/01/2023", "03/01/2023", "04/01/2023"])),
///     ("Revenue", Column::Float(vec![9100.0, 9800.0, 8700.0])),
/// ]).unwrap();
///
/// let mut dataset = TimeSeriesDataset::new(&[occupancy, revenue], &["Date", "Day"], &[]).unwrap();
/// assert_eq!(dataset.working(0).unwrap().len(), 2);
///
/// dataset.consolidate(&[0, 1], &["Occupancy", "Revenue"], &[]).unwrap();
/// dataset.set_target("Revenue").unwrap();
/// assert_eq!(dataset.consolidated().unwrap().names(), ["Occupancy", "Revenue"]);
/// ```
#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    config: DatasetConfig,
    initial: Vec<DateIndexedTable>,
    working: Vec<DateIndexedTable>,
    valid_years: Vec<BTreeSet<i32>>,
    date_range: DateRange,
    consolidated: Option<DateIndexedTable>,
    target: Option<String>,
    split: Option<Split>,
}

impl TimeSeriesDataset {
    /// Build a dataset with the default configuration, dropping `excluded_years`
    /// from every table.
    ///
    /// Every table is copied; the caller's tables are never modified.
    pub fn new(
        tables: &[Table],
        date_columns: &[&str],
        excluded_years: &[i32],
    ) -> Result<Self> {
        let config = DatasetConfig::default().with_excluded_years(excluded_years.iter().copied());
        Self::with_config(tables, date_columns, config)
    }

    /// Build a dataset with an explicit configuration.
    pub fn with_config(
        tables: &[Table],
        date_columns: &[&str],
        config: DatasetConfig,
    ) -> Result<Self> {
        if tables.is_empty() {
            return Err(AmaraError::EmptyData);
        }
        if tables.len() != date_columns.len() {
            return Err(AmaraError::ArityMismatch {
                what: "date_columns",
                expected: tables.len(),
                got: date_columns.len(),
            });
        }

        let mut initial = Vec::with_capacity(tables.len());
        let mut valid_years = Vec::with_capacity(tables.len());
        let mut date_range = DateRange::unbounded();

        for (table, date_column) in tables.iter().zip(date_columns) {
            let indexed = create_datetime_index(
                table,
                date_column,
                &config.date_format,
                config.drop_date_column,
            )?
            .exclude_years(&config.excluded_years);

            if let (Some(first), Some(last)) = (indexed.first_date(), indexed.last_date()) {
                date_range.narrow(first, last);
            }
            valid_years.push(indexed.years());
            initial.push(indexed);
        }

        if date_range.is_empty() {
            warn!(range = %date_range, "source tables share no common dates");
        } else {
            info!(range = %date_range, tables = tables.len(), "unified date range");
        }

        let working = initial.iter().map(|t| t.restrict(&date_range)).collect();

        Ok(Self {
            config,
            initial,
            working,
            valid_years,
            date_range,
            consolidated: None,
            target: None,
            split: None,
        })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The date range common to every source table.
    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// Number of source tables.
    pub fn num_tables(&self) -> usize {
        self.initial.len()
    }

    fn lookup(tables: &[DateIndexedTable], id: usize) -> Result<&DateIndexedTable> {
        tables.get(id).ok_or(AmaraError::IndexOutOfBounds {
            index: id,
            size: tables.len(),
        })
    }

    /// Source table `id` with its full history.
    pub fn initial(&self, id: usize) -> Result<&DateIndexedTable> {
        Self::lookup(&self.initial, id)
    }

    /// Source table `id` restricted to the unified date range.
    pub fn working(&self, id: usize) -> Result<&DateIndexedTable> {
        Self::lookup(&self.working, id)
    }

    /// Years present in source table `id` after year exclusion.
    pub fn valid_years(&self, id: usize) -> Result<&BTreeSet<i32>> {
        self.valid_years.get(id).ok_or(AmaraError::IndexOutOfBounds {
            index: id,
            size: self.valid_years.len(),
        })
    }

    pub fn consolidated(&self) -> Result<&DateIndexedTable> {
        self.consolidated
            .as_ref()
            .ok_or(AmaraError::NotReady("consolidate"))
    }

    pub fn target(&self) -> Result<&str> {
        self.target.as_deref().ok_or(AmaraError::NotReady("set_target"))
    }

    pub fn split_data(&self) -> Result<&Split> {
        self.split.as_ref().ok_or(AmaraError::NotReady("split"))
    }

    pub fn train_data(&self) -> Result<&DateIndexedTable> {
        self.split_data().map(|s| &s.train)
    }

    pub fn forecast_data(&self) -> Result<&DateIndexedTable> {
        self.split_data().map(|s| &s.forecast)
    }

    pub fn split_date(&self) -> Result<NaiveDate> {
        self.split_data().map(|s| s.split_date)
    }

    /// Rows of the full-history table `id` covering the unified range shifted back
    /// to the most recent earlier pair of years both present in that table.
    ///
    /// An empty `columns` keeps every column. A 29 February bound maps to the
    /// 28th in non-leap years.
    pub fn last_valid_year(&self, id: usize, columns: &[&str]) -> Result<DateIndexedTable> {
        let table = self.initial(id)?;
        let years = self.valid_years(id)?;
        if let Some(missing) = columns.iter().find(|c| !table.names().iter().any(|n| n.as_str() == **c)) {
            return Err(AmaraError::ColumnNotFound(missing.to_string()));
        }

        let not_found = AmaraError::NoValidPriorYear { dataset: id };
        if self.date_range.is_empty() {
            return Err(not_found);
        }
        let Some(&earliest) = years.first() else {
            return Err(not_found);
        };

        let (start, end) = (self.date_range.start(), self.date_range.end());
        for k in 1u32.. {
            let start_year = start.year() - k as i32;
            let end_year = end.year() - k as i32;
            if start_year < earliest {
                break;
            }
            if !(years.contains(&start_year) && years.contains(&end_year)) {
                continue;
            }

            let shift = Months::new(12 * k);
            let (Some(from), Some(to)) = (start.checked_sub_months(shift), end.checked_sub_months(shift))
            else {
                break;
            };
            debug!(dataset = id, from = %from, to = %to, "last valid year window");
            let rows = table.slice_dates(from, to);
            return if columns.is_empty() {
                Ok(rows)
            } else {
                rows.select(columns)
            };
        }

        Err(not_found)
    }

    /// Run `callback` over the selected tables.
    ///
    /// With `use_initial` the full-history tables are passed, otherwise the working
    /// tables. With `unify` the output is restricted to the unified date range.
    pub fn apply<F>(
        &self,
        callback: F,
        input_ids: &[usize],
        use_initial: bool,
        unify: bool,
    ) -> Result<DateIndexedTable>
    where
        F: FnOnce(&[&DateIndexedTable]) -> Result<DateIndexedTable>,
    {
        let source = if use_initial { &self.initial } else { &self.working };
        let inputs = input_ids
            .iter()
            .map(|&id| Self::lookup(source, id))
            .collect::<Result<Vec<_>>>()?;

        let output = callback(&inputs)?;
        Ok(if unify {
            output.restrict(&self.date_range)
        } else {
            output
        })
    }

    /// Build the consolidated table from `columns[i]` of working table `dataset_ids[i]`.
    ///
    /// `as_names` renames the output columns; an empty slice keeps the source
    /// names. Replaces any previous consolidated table and clears the target and split.
    /// Tables sharing one date index are stacked row for row; otherwise rows are
    /// outer-joined on date and missing cells are left empty.
    pub fn consolidate(
        &mut self,
        dataset_ids: &[usize],
        columns: &[&str],
        as_names: &[&str],
    ) -> Result<()> {
        if dataset_ids.len() != columns.len() {
            return Err(AmaraError::ArityMismatch {
                what: "columns",
                expected: dataset_ids.len(),
                got: columns.len(),
            });
        }
        let names = if as_names.is_empty() { columns } else { as_names };
        if names.len() != columns.len() {
            return Err(AmaraError::ArityMismatch {
                what: "as_names",
                expected: columns.len(),
                got: names.len(),
            });
        }
        if dataset_ids.is_empty() {
            return Err(AmaraError::EmptyData);
        }

        let sources = dataset_ids
            .iter()
            .map(|&id| self.working(id))
            .collect::<Result<Vec<_>>>()?;

        let shared_index = sources.windows(2).all(|w| w[0].index() == w[1].index());
        let consolidated = if shared_index {
            let mut table = Table::new();
            for ((source, column), name) in sources.iter().zip(columns).zip(names) {
                table.push(*name, source.column(column)?.clone())?;
            }
            DateIndexedTable::new(sources[0].index().to_vec(), table)?
        } else {
            Self::outer_join(dataset_ids, &sources, columns, names)?
        };

        info!(
            columns = consolidated.names().len(),
            rows = consolidated.len(),
            aligned = !shared_index,
            "consolidated dataset"
        );
        self.consolidated = Some(consolidated);
        self.target = None;
        self.split = None;
        Ok(())
    }

    fn outer_join(
        ids: &[usize],
        sources: &[&DateIndexedTable],
        columns: &[&str],
        names: &[&str],
    ) -> Result<DateIndexedTable> {
        if let Some((id, _)) = ids.iter().zip(sources).find(|(_, s)| !s.has_unique_dates()) {
            return Err(AmaraError::InvalidParameter(format!(
                "dataset {id} has repeated dates and cannot be aligned by date"
            )));
        }

        let index: Vec<NaiveDate> = sources
            .iter()
            .flat_map(|s| s.index().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut table = Table::new();
        for ((source, column), name) in sources.iter().zip(columns).zip(names) {
            let positions: HashMap<NaiveDate, usize> = source
                .index()
                .iter()
                .enumerate()
                .map(|(i, d)| (*d, i))
                .collect();
            let rows: Vec<Option<usize>> = index.iter().map(|d| positions.get(d).copied()).collect();
            table.push(*name, source.column(column)?.take_optional(&rows))?;
        }
        DateIndexedTable::new(index, table)
    }

    /// Mark a consolidated column as the forecasting target.
    pub fn set_target(&mut self, name: &str) -> Result<()> {
        let consolidated = self.consolidated()?;
        if !consolidated.names().iter().any(|n| n == name) {
            return Err(AmaraError::ColumnNotFound(name.to_string()));
        }
        self.target = Some(name.to_string());
        Ok(())
    }

    /// Add a column to the consolidated table, replacing one of the same name.
    ///
    /// Any existing split no longer matches the consolidated table and is cleared.
    pub fn append(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let consolidated = self
            .consolidated
            .as_mut()
            .ok_or(AmaraError::NotReady("consolidate"))?;
        if column.len() != consolidated.len() {
            return Err(AmaraError::DimensionMismatch {
                expected: consolidated.len(),
                got: column.len(),
            });
        }
        consolidated.set(name, column)?;
        self.split = None;
        Ok(())
    }

    /// Partition the consolidated table around `split_date`.
    ///
    /// Training rows fall in `[split_date - train_months, split_date]` and forecast
    /// rows in `(split_date, split_date + forecast_months]`. Missing history or
    /// future data is logged and flagged, not treated as an error.
    pub fn split(
        &mut self,
        split_date: NaiveDate,
        train_months: u32,
        forecast_months: u32,
    ) -> Result<&Split> {
        let data = self.consolidated()?;
        let out_of_range = || {
            AmaraError::InvalidParameter(format!(
                "window of {train_months}/{forecast_months} months around {split_date} leaves the calendar"
            ))
        };
        let train_start = split_date
            .checked_sub_months(Months::new(train_months))
            .ok_or_else(out_of_range)?;
        let forecast_end = split_date
            .checked_add_months(Months::new(forecast_months))
            .ok_or_else(out_of_range)?;

        let train = data.slice_dates(train_start, split_date);
        let forecast = data.slice_after(split_date, forecast_end);

        let history_short = train.first_date().map_or(true, |d| d > train_start);
        let horizon_short = forecast.last_date().map_or(true, |d| d < forecast_end);
        if history_short {
            warn!(
                requested = %train_start,
                available = ?train.first_date(),
                "training window starts before the available data"
            );
        }
        if horizon_short {
            warn!(
                requested = %forecast_end,
                available = ?forecast.last_date(),
                "forecast window ends after the available data"
            );
        }
        debug!(%split_date, train = train.len(), forecast = forecast.len(), "split dataset");

        Ok(self.split.insert(Split {
            split_date,
            train,
            forecast,
            history_short,
            horizon_short,
        }))
    }

    /// Difference the masked consolidated columns until each passes the ADF test.
    ///
    /// `mask` has one flag per consolidated column. With `force` the first
    /// difference is applied without testing. Each difference leaves a gap at the
    /// first row, which is filled by time interpolation and then the column mean.
    /// Masked columns that are already stationary get the same gap filling, so
    /// no masked column comes back with missing values.
    pub fn auto_diff(&self, mask: &[bool], force: bool) -> Result<DateIndexedTable> {
        let data = self.consolidated()?;
        let names = data.names();
        if mask.len() != names.len() {
            return Err(AmaraError::ArityMismatch {
                what: "auto_diff mask",
                expected: names.len(),
                got: mask.len(),
            });
        }

        let mut output = data.clone();
        for (name, _) in names.iter().zip(mask).filter(|(_, selected)| **selected) {
            let values = data.float(name)?;
            let (series, order) = self.make_stationary(data.index(), values, force);
            debug!(column = %name, order, "differenced column");
            output.set(name.clone(), Column::Float(series))?;
        }
        Ok(output)
    }

    /// [`auto_diff`](Self::auto_diff) that replaces the consolidated table and clears the split.
    pub fn auto_diff_inplace(&mut self, mask: &[bool], force: bool) -> Result<()> {
        let differenced = self.auto_diff(mask, force)?;
        self.consolidated = Some(differenced);
        self.split = None;
        Ok(())
    }

    fn make_stationary(&self, dates: &[NaiveDate], values: &[f64], force: bool) -> (Vec<f64>, usize) {
        let mut series = values.to_vec();
        let mut order = 0;
        while order < self.config.max_diff_order {
            let forced = force && order == 0;
            if !forced && self.is_stationary(&series) {
                break;
            }
            series = difference_filled(dates, &series);
            order += 1;
        }
        if order == 0 {
            series = fill_gaps(dates, &series);
        }
        (series, order)
    }

    fn is_stationary(&self, series: &[f64]) -> bool {
        let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
        let result = adf_test(&finite, self.config.adf_max_lags);
        if result.p_value.is_nan() {
            // undefined test: nothing left to remove from short or flat series
            return finite.len() < 6 || is_constant(&finite);
        }
        result.is_stationary(self.config.significance)
    }
}

/// First difference with the leading gap filled by interpolation and the mean.
fn difference_filled(dates: &[NaiveDate], values: &[f64]) -> Vec<f64> {
    let mut diffed = Vec::with_capacity(values.len());
    if !values.is_empty() {
        diffed.push(f64::NAN);
    }
    diffed.extend(values.windows(2).map(|w| w[1] - w[0]));
    fill_gaps(dates, &diffed)
}

/// Time interpolation, then the mean for whatever interpolation cannot reach.
fn fill_gaps(dates: &[NaiveDate], values: &[f64]) -> Vec<f64> {
    let mut filled = interpolate_time(dates, values);
    fill_mean(&mut filled);
    filled
}

fn is_constant(values: &[f64]) -> bool {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    max - min <= 1e-12 * max.abs().max(min.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::DateFormat;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Daily table with a day-first text date column.
    fn daily(start: NaiveDate, days: i64, column: &str, f: impl Fn(i64) -> f64) -> Table {
        let dates: Vec<String> = (0..days)
            .map(|i| (start + Duration::days(i)).format("%d/%m/%Y").to_string())
            .collect();
        Table::from_columns(vec![
            ("Date", Column::text(dates)),
            (column, Column::Float((0..days).map(f).collect())),
        ])
        .unwrap()
    }

    fn noise(i: i64) -> f64 {
        let mut x = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(3);
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^= x >> 31;
        (x >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }

    fn two_sources() -> TimeSeriesDataset {
        let a = daily(d(2023, 1, 1), 181, "Occupancy", |i| 0.5 + noise(i) * 0.1);
        let b = daily(d(2023, 3, 1), 306, "Revenue", |i| 1000.0 + i as f64);
        TimeSeriesDataset::new(&[a, b], &["Date", "Date"], &[]).unwrap()
    }

    #[test]
    fn unified_range_is_intersection() {
        let dataset = two_sources();
        let range = dataset.date_range();
        assert_eq!(range.start(), d(2023, 3, 1));
        assert_eq!(range.end(), d(2023, 6, 30));

        for id in 0..2 {
            let working = dataset.working(id).unwrap();
            assert!(working.index().iter().all(|&date| range.contains(date)));
            assert_eq!(working.len(), 122);
        }
        assert_eq!(dataset.initial(0).unwrap().len(), 181);
    }

    #[test]
    fn date_column_is_dropped_by_default() {
        let dataset = two_sources();
        assert_eq!(dataset.working(0).unwrap().names(), ["Occupancy"]);

        let a = daily(d(2023, 1, 1), 10, "Occupancy", |_| 1.0);
        let config = DatasetConfig::default().keep_date_column();
        let kept = TimeSeriesDataset::with_config(&[a], &["Date"], config).unwrap();
        assert_eq!(kept.working(0).unwrap().names(), ["Date", "Occupancy"]);
    }

    #[test]
    fn disjoint_sources_give_empty_working_tables() {
        let a = daily(d(2022, 1, 1), 30, "A", |_| 1.0);
        let b = daily(d(2023, 1, 1), 30, "B", |_| 2.0);
        let dataset = TimeSeriesDataset::new(&[a, b], &["Date", "Date"], &[]).unwrap();

        assert!(dataset.date_range().is_empty());
        assert!(dataset.working(0).unwrap().is_empty());
        assert!(dataset.working(1).unwrap().is_empty());
        assert!(matches!(
            dataset.last_valid_year(0, &[]),
            Err(AmaraError::NoValidPriorYear { dataset: 0 })
        ));
    }

    #[test]
    fn construction_errors() {
        let a = daily(d(2023, 1, 1), 5, "A", |_| 1.0);
        assert!(matches!(
            TimeSeriesDataset::new(&[a.clone()], &["Date", "Date"], &[]),
            Err(AmaraError::ArityMismatch { expected: 1, got: 2, .. })
        ));
        assert!(matches!(
            TimeSeriesDataset::new(&[], &[], &[]),
            Err(AmaraError::EmptyData)
        ));
        let config = DatasetConfig::default().with_date_format(DateFormat::AsIs);
        assert!(matches!(
            TimeSeriesDataset::with_config(&[a], &["Date"], config),
            Err(AmaraError::ParseError { .. })
        ));
    }

    #[test]
    fn excluded_years_are_removed_everywhere() {
        let a = daily(d(2019, 1, 1), 365 * 4, "A", |i| i as f64);
        let dataset = TimeSeriesDataset::new(&[a], &["Date"], &[2020]).unwrap();

        let years: Vec<i32> = dataset.valid_years(0).unwrap().iter().copied().collect();
        assert_eq!(years, vec![2019, 2021, 2022]);
        assert!(dataset.initial(0).unwrap().years().iter().all(|&y| y != 2020));
        assert!(dataset.working(0).unwrap().years().iter().all(|&y| y != 2020));
    }

    #[test]
    fn last_valid_year_steps_over_missing_years() {
        let history = daily(d(2019, 1, 1), 365 * 5, "Rooms", |i| i as f64);
        let recent = daily(d(2023, 3, 1), 31, "Rate", |_| 100.0);
        let dataset =
            TimeSeriesDataset::new(&[history, recent], &["Date", "Date"], &[2022]).unwrap();

        let prior = dataset.last_valid_year(0, &[]).unwrap();
        assert_eq!(prior.first_date(), Some(d(2021, 3, 1)));
        assert_eq!(prior.last_date(), Some(d(2021, 3, 31)));

        let again = dataset.last_valid_year(0, &["Rooms"]).unwrap();
        assert_eq!(prior, again);
    }

    #[test]
    fn last_valid_year_errors() {
        let a = daily(d(2023, 1, 1), 40, "A", |_| 1.0);
        let dataset = TimeSeriesDataset::new(&[a], &["Date"], &[]).unwrap();

        assert!(matches!(
            dataset.last_valid_year(0, &[]),
            Err(AmaraError::NoValidPriorYear { dataset: 0 })
        ));
        assert!(matches!(
            dataset.last_valid_year(3, &[]),
            Err(AmaraError::IndexOutOfBounds { index: 3, size: 1 })
        ));
        assert!(matches!(
            dataset.last_valid_year(0, &["Nope"]),
            Err(AmaraError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn apply_restricts_output_when_unifying() {
        let dataset = two_sources();
        let doubled = |inputs: &[&DateIndexedTable]| {
            let source = inputs[0];
            let values: Vec<f64> = source.float("Occupancy")?.iter().map(|v| v * 2.0).collect();
            DateIndexedTable::from_columns(
                source.index().to_vec(),
                vec![("Doubled", Column::Float(values))],
            )
        };

        let unified = dataset.apply(doubled, &[0], true, true).unwrap();
        assert_eq!(unified.len(), 122);

        let full = dataset.apply(doubled, &[0], true, false).unwrap();
        assert_eq!(full.len(), 181);

        assert!(matches!(
            dataset.apply(doubled, &[7], false, true),
            Err(AmaraError::IndexOutOfBounds { index: 7, .. })
        ));
    }

    #[test]
    fn consolidate_replaces_previous_table() {
        let mut dataset = two_sources();
        dataset
            .consolidate(&[0, 1], &["Occupancy", "Revenue"], &["occ", "rev"])
            .unwrap();
        dataset.set_target("rev").unwrap();
        assert_eq!(dataset.consolidated().unwrap().names(), ["occ", "rev"]);

        dataset.consolidate(&[1], &["Revenue"], &[]).unwrap();
        assert_eq!(dataset.consolidated().unwrap().names(), ["Revenue"]);
        assert!(matches!(dataset.target(), Err(AmaraError::NotReady("set_target"))));
    }

    #[test]
    fn consolidate_aligns_mismatched_indexes() {
        let a = daily(d(2023, 1, 1), 10, "A", |i| i as f64);
        let mut b = daily(d(2023, 1, 1), 10, "B", |i| 10.0 * i as f64);
        // drop the third day from b
        let keep: Vec<usize> = (0..10).filter(|&i| i != 2).collect();
        b = b.take(&keep);

        let mut dataset = TimeSeriesDataset::new(&[a, b], &["Date", "Date"], &[]).unwrap();
        dataset.consolidate(&[0, 1], &["A", "B"], &[]).unwrap();

        let consolidated = dataset.consolidated().unwrap();
        assert_eq!(consolidated.len(), 10);
        let b = consolidated.float("B").unwrap();
        assert!(b[2].is_nan());
        assert_eq!(b[3], 30.0);
    }

    #[test]
    fn consolidate_errors() {
        let mut dataset = two_sources();
        assert!(matches!(
            dataset.consolidate(&[0, 1], &["Occupancy"], &[]),
            Err(AmaraError::ArityMismatch { what: "columns", .. })
        ));
        assert!(matches!(
            dataset.consolidate(&[0], &["Occupancy"], &["a", "b"]),
            Err(AmaraError::ArityMismatch { what: "as_names", .. })
        ));
        assert!(matches!(
            dataset.consolidate(&[0], &["Missing"], &[]),
            Err(AmaraError::ColumnNotFound(_))
        ));
        assert!(matches!(
            dataset.consolidate(&[0, 0], &["Occupancy", "Occupancy"], &[]),
            Err(AmaraError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn steps_before_consolidation_are_not_ready() {
        let mut dataset = two_sources();
        assert!(matches!(dataset.set_target("x"), Err(AmaraError::NotReady("consolidate"))));
        assert!(matches!(
            dataset.append("x", Column::Float(vec![])),
            Err(AmaraError::NotReady("consolidate"))
        ));
        assert!(matches!(
            dataset.split(d(2023, 4, 1), 1, 1),
            Err(AmaraError::NotReady("consolidate"))
        ));
        assert!(matches!(dataset.auto_diff(&[], false), Err(AmaraError::NotReady("consolidate"))));
        assert!(matches!(dataset.train_data(), Err(AmaraError::NotReady("split"))));
    }

    #[test]
    fn append_checks_length_and_replaces() {
        let mut dataset = two_sources();
        dataset.consolidate(&[1], &["Revenue"], &[]).unwrap();
        dataset.set_target("Revenue").unwrap();

        assert!(matches!(
            dataset.append("Event", Column::Float(vec![0.0; 3])),
            Err(AmaraError::DimensionMismatch { expected: 122, got: 3 })
        ));

        dataset.append("Event", Column::Float(vec![0.0; 122])).unwrap();
        dataset.append("Event", Column::Float(vec![1.0; 122])).unwrap();
        let consolidated = dataset.consolidated().unwrap();
        assert_eq!(consolidated.names(), ["Revenue", "Event"]);
        assert_eq!(consolidated.float("Event").unwrap()[0], 1.0);
        assert_eq!(dataset.target().unwrap(), "Revenue");
    }

    #[test]
    fn set_target_rejects_unknown_column() {
        let mut dataset = two_sources();
        dataset.consolidate(&[1], &["Revenue"], &[]).unwrap();
        assert!(matches!(
            dataset.set_target("Occupancy"),
            Err(AmaraError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn split_boundaries() {
        let mut dataset = two_sources();
        dataset.consolidate(&[1], &["Revenue"], &[]).unwrap();
        let split = dataset.split(d(2023, 5, 15), 1, 1).unwrap();

        assert_eq!(split.train.first_date(), Some(d(2023, 4, 15)));
        assert_eq!(split.train.last_date(), Some(d(2023, 5, 15)));
        assert_eq!(split.forecast.first_date(), Some(d(2023, 5, 16)));
        assert_eq!(split.forecast.last_date(), Some(d(2023, 6, 15)));
        assert!(!split.history_short);
        assert!(!split.horizon_short);
    }

    #[test]
    fn split_flags_shortfalls() {
        let mut dataset = two_sources();
        dataset.consolidate(&[1], &["Revenue"], &[]).unwrap();
        let split = dataset.split(d(2023, 6, 1), 12, 3).unwrap();

        assert!(split.history_short);
        assert!(split.horizon_short);
        assert_eq!(split.train.first_date(), Some(d(2023, 3, 1)));
        assert_eq!(split.forecast.last_date(), Some(d(2023, 6, 30)));
        assert_eq!(dataset.split_date().unwrap(), d(2023, 6, 1));
    }

    #[test]
    fn auto_diff_removes_trend() {
        let trend = daily(d(2023, 1, 1), 200, "Demand", |i| 50.0 + 2.0 * i as f64 + noise(i));
        let mut dataset = TimeSeriesDataset::new(&[trend], &["Date"], &[]).unwrap();
        dataset.consolidate(&[0], &["Demand"], &[]).unwrap();

        let differenced = dataset.auto_diff(&[true], false).unwrap();
        let values = differenced.float("Demand").unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(adf_test(values, None).p_value <= 0.05);
        // consolidated table untouched
        assert_eq!(dataset.consolidated().unwrap().float("Demand").unwrap()[0], 50.0 + noise(0));
    }

    #[test]
    fn auto_diff_exact_line_stops_after_one_difference() {
        let line = daily(d(2023, 1, 1), 60, "Rooms", |i| 3.0 * i as f64);
        let mut dataset = TimeSeriesDataset::new(&[line], &["Date"], &[]).unwrap();
        dataset.consolidate(&[0], &["Rooms"], &[]).unwrap();

        let differenced = dataset.auto_diff(&[true], false).unwrap();
        assert!(differenced.float("Rooms").unwrap().iter().all(|&v| v == 3.0));
    }

    #[test]
    fn auto_diff_respects_mask_and_force() {
        let stationary = daily(d(2023, 1, 1), 120, "Noise", noise);
        let mut dataset = TimeSeriesDataset::new(&[stationary], &["Date"], &[]).unwrap();
        dataset.consolidate(&[0, 0], &["Noise", "Noise"], &["kept", "forced"]).unwrap();

        let output = dataset.auto_diff(&[false, true], true).unwrap();
        let kept = output.float("kept").unwrap();
        let forced = output.float("forced").unwrap();
        assert_eq!(kept[5], noise(5));
        assert!((forced[5] - (noise(5) - noise(4))).abs() < 1e-12);

        assert!(matches!(
            dataset.auto_diff(&[true], false),
            Err(AmaraError::ArityMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn auto_diff_is_capped() {
        // a cubic needs three differences to flatten; cap at one
        let cubic = daily(d(2023, 1, 1), 80, "Y", |i| (i * i * i) as f64);
        let config = DatasetConfig::default().with_max_diff_order(1);
        let mut dataset = TimeSeriesDataset::with_config(&[cubic], &["Date"], config).unwrap();
        dataset.consolidate(&[0], &["Y"], &[]).unwrap();

        let output = dataset.auto_diff(&[true], false).unwrap();
        let values = output.float("Y").unwrap();
        assert_eq!(values[10], (1000 - 729) as f64);
    }

    #[test]
    fn auto_diff_rejects_text_columns() {
        let table = Table::from_columns(vec![
            ("Date", Column::text(["01/01/2023", "02/01/2023"])),
            ("Label", Column::text(["a", "b"])),
        ])
        .unwrap();
        let mut dataset = TimeSeriesDataset::new(&[table], &["Date"], &[]).unwrap();
        dataset.consolidate(&[0], &["Label"], &[]).unwrap();
        assert!(matches!(
            dataset.auto_diff(&[true], false),
            Err(AmaraError::InvalidParameter(_))
        ));
    }

    #[test]
    fn auto_diff_inplace_clears_split() {
        let trend = daily(d(2023, 1, 1), 120, "Demand", |i| i as f64 + noise(i));
        let mut dataset = TimeSeriesDataset::new(&[trend], &["Date"], &[]).unwrap();
        dataset.consolidate(&[0], &["Demand"], &[]).unwrap();
        dataset.set_target("Demand").unwrap();
        dataset.split(d(2023, 3, 1), 1, 1).unwrap();

        dataset.auto_diff_inplace(&[true], false).unwrap();
        assert!(dataset.split_data().is_err());
        assert_eq!(dataset.target().unwrap(), "Demand");
        assert!(dataset.consolidated().unwrap().float("Demand").unwrap()[0].is_finite());
    }

    #[test]
    fn difference_filled_interpolates_gaps() {
        let dates: Vec<NaiveDate> = (0..5).map(|i| d(2023, 1, 1) + Duration::days(i)).collect();
        let values = vec![1.0, 2.0, f64::NAN, 4.0, 5.0];
        let diffed = difference_filled(&dates, &values);
        assert!(diffed.iter().all(|v| v.is_finite()));
        assert_eq!(diffed[4], 1.0);
    }

    #[test]
    fn auto_diff_fills_stationary_columns_left_gappy() {
        let a = daily(d(2023, 1, 1), 120, "Rooms", |i| 80.0 + 5.0 * noise(i));
        let b = daily(d(2023, 1, 1), 120, "Noise", |i| match i % 9 {
            0 => f64::NAN,
            _ => noise(i + 500),
        });
        let mut dataset = TimeSeriesDataset::new(&[a, b], &["Date", "Date"], &[]).unwrap();
        dataset.consolidate(&[0, 1], &["Rooms", "Noise"], &[]).unwrap();
        assert!(dataset.consolidated().unwrap().float("Noise").unwrap()[0].is_nan());

        let output = dataset.auto_diff(&[false, true], false).unwrap();
        let filled = output.float("Noise").unwrap();
        assert!(filled.iter().all(|v| v.is_finite()));
        // observed values pass through undifferenced
        assert_eq!(filled[1], noise(501));
        assert!((filled[9] - (noise(508) + noise(510)) / 2.0).abs() < 1e-12);
    }
}
