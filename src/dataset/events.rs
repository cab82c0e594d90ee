//! Weighted event calendar used as an exogenous demand signal.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use std::collections::HashMap;
use tracing::debug;

use crate::core::{Column, DateIndexedTable};
use crate::error::{AmaraError, Result};

/// Half-width of the sampled normal curve, in standard deviations.
const NORMAL_BOUND: f64 = 10.0;
const NORMAL_STEP: f64 = 0.1;
const NORMAL_POINTS: usize = 201;
/// Weight applied to the echo of a repeating event a year later.
const SHADOW_MULTIPLIER: f64 = 0.5;

/// Daily event names and weights across whole calendar years.
///
/// Each event spreads a weight distribution over its dates plus `dampening`
/// days either side. Events landing on the same day join their names with
/// `" | "` and sum their weights. A repeating event leaves a half-weight
/// "Shadow" copy on its previous dates moved forward one year.
///
/// # Example
///
/// ```
/// use amara::dataset::EventCalendar;
/// use chrono::NaiveDate;
///
/// let mut calendar = EventCalendar::new(2023, 2023).unwrap();
/// let bank_holiday = NaiveDate::from_ymd_opt(2023, 5, 29).unwrap();
/// let weights = calendar.normal(0.0, 1.0);
/// calendar
///     .add_weighted_event("Bank Holiday", bank_holiday, bank_holiday, &weights, false)
///     .unwrap();
///
/// let data = calendar.data().unwrap();
/// assert_eq!(data.len(), 365);
/// assert_eq!(data.names(), ["Events/Holidays", "Weight"]);
/// ```
#[derive(Debug, Clone)]
pub struct EventCalendar {
    start: NaiveDate,
    weight_min: f64,
    weight_max: f64,
    dampening: u32,
    names: Vec<Option<String>>,
    weights: Vec<f64>,
    repeating: HashMap<String, (NaiveDate, NaiveDate)>,
}

impl EventCalendar {
    /// Calendar from 1 January `start_year` to 31 December `end_year`, with
    /// weights in 0..=100 and three days of dampening.
    pub fn new(start_year: i32, end_year: i32) -> Result<Self> {
        if end_year < start_year {
            return Err(AmaraError::InvalidParameter(format!(
                "end year {end_year} precedes start year {start_year}"
            )));
        }
        let (start, end) = NaiveDate::from_ymd_opt(start_year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(end_year, 12, 31))
            .ok_or_else(|| {
                AmaraError::InvalidParameter(format!("years {start_year}..={end_year} out of range"))
            })?;
        let days = (end - start).num_days() as usize + 1;

        Ok(Self {
            start,
            weight_min: 0.0,
            weight_max: 100.0,
            dampening: 3,
            names: vec![None; days],
            weights: vec![0.0; days],
            repeating: HashMap::new(),
        })
    }

    pub fn with_weight_range(mut self, min: f64, max: f64) -> Self {
        self.weight_min = min;
        self.weight_max = max;
        self
    }

    /// Days either side of each event that also receive weight.
    pub fn with_dampening(mut self, days: u32) -> Self {
        self.dampening = days;
        self
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.date_at(self.weights.len() - 1)
    }

    /// 201 samples of an unnormalised bell curve peaking at
    /// `multiplier * (weight_max + weight_min)`.
    ///
    /// `offset_ratio` moves the peak right by that fraction of the half-width,
    /// so 0.5 peaks three quarters of the way along.
    pub fn normal(&self, offset_ratio: f64, multiplier: f64) -> Vec<f64> {
        let base = std::f64::consts::E / (2.0 * std::f64::consts::PI).sqrt();
        let scale = multiplier * (self.weight_max + self.weight_min);
        (0..NORMAL_POINTS)
            .map(|k| {
                let x = k as f64 * NORMAL_STEP - NORMAL_BOUND * (1.0 + offset_ratio);
                base.powf(-0.5 * x * x) * scale
            })
            .collect()
    }

    /// Spread `weight_dist` over `start..=end` widened by the dampening.
    ///
    /// With `repeating`, a name seen before first adds `"Shadow {name}"` at half
    /// weight on the previous occurrence's dates one year on, then remembers
    /// this occurrence. Dates outside the calendar are ignored.
    pub fn add_weighted_event(
        &mut self,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        weight_dist: &[f64],
        repeating: bool,
    ) -> Result<()> {
        if start > end {
            return Err(AmaraError::InvalidParameter(format!(
                "event '{name}' ends {end} before it starts {start}"
            )));
        }
        if weight_dist.is_empty() {
            return Err(AmaraError::InvalidParameter(format!(
                "event '{name}' has no weights"
            )));
        }

        if repeating {
            if let Some(&(previous_start, previous_end)) = self.repeating.get(name) {
                let year = Months::new(12);
                if let Some((shadow_start, shadow_end)) = previous_start
                    .checked_add_months(year)
                    .zip(previous_end.checked_add_months(year))
                {
                    let shadow: Vec<f64> = weight_dist.iter().map(|w| w * SHADOW_MULTIPLIER).collect();
                    self.add_weights(&format!("Shadow {name}"), shadow_start, shadow_end, &shadow);
                }
            }
            self.repeating.insert(name.to_string(), (start, end));
        }

        self.add_weights(name, start, end, weight_dist);
        Ok(())
    }

    fn add_weights(&mut self, name: &str, start: NaiveDate, end: NaiveDate, weight_dist: &[f64]) {
        let pad = chrono::Duration::days(i64::from(self.dampening));
        let (first, last) = (start - pad, end + pad);
        let span = (last - first).num_days() as usize + 1;
        let positions = (span + 1) as f64;
        let top = weight_dist.len() - 1;

        let mut applied = 0;
        for (i, date) in first.iter_days().take(span).enumerate() {
            let Some(row) = self.row_of(date) else {
                continue;
            };
            let position = ((i + 1) as f64 / positions * weight_dist.len() as f64).round_ties_even();
            let weight = weight_dist[(position as usize).min(top)];

            self.weights[row] += weight;
            let slot = &mut self.names[row];
            match slot {
                Some(existing) => {
                    existing.push_str(" | ");
                    existing.push_str(name);
                }
                None => *slot = Some(name.to_string()),
            }
            applied += 1;
        }
        debug!(event = name, %first, %last, days = applied, "weighted event");
    }

    fn row_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start).num_days();
        usize::try_from(offset).ok().filter(|&row| row < self.weights.len())
    }

    fn date_at(&self, row: usize) -> NaiveDate {
        self.start + chrono::Duration::days(row as i64)
    }

    /// One row per calendar day with `Events/Holidays` (text, empty on quiet
    /// days) and `Weight` columns.
    pub fn data(&self) -> Result<DateIndexedTable> {
        let days: Vec<NaiveDate> = (0..self.weights.len()).map(|row| self.date_at(row)).collect();
        DateIndexedTable::from_columns(
            days,
            vec![
                ("Events/Holidays", Column::Text(self.names.clone())),
                ("Weight", Column::Float(self.weights.clone())),
            ],
        )
    }
}

/// Multiplier for a single-day event's weight curve by weekday: weekend
/// nights lift demand, Monday and Thursday depress it.
pub fn day_multiplier(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Fri | Weekday::Sat | Weekday::Sun => 1.0,
        Weekday::Mon | Weekday::Thu => -1.0,
        Weekday::Tue | Weekday::Wed => 0.0,
    }
}
