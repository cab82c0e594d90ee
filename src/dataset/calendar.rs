//! Common dates table that report tables relate to.

use chrono::{Datelike, NaiveDate};

use crate::core::{Column, DateIndexedTable, DateRange};
use crate::error::{AmaraError, Result};
use crate::preprocessing::{parse_dates, DateFormat};

/// A daily calendar whose span grows to cover every range it is shown.
///
/// # Example
///
/// ```
/// use amara::dataset::MasterCalendar;
///
/// let mut calendar = MasterCalendar::new();
/// calendar.update_date_range("30/12/2022", "02/01/2023").unwrap();
///
/// let data = calendar.data().unwrap();
/// assert_eq!(data.len(), 4);
/// assert_eq!(data.names()[0], "Date");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MasterCalendar {
    range: DateRange,
}

impl MasterCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current span, or `None` before the first update.
    pub fn date_range(&self) -> Option<DateRange> {
        (!self.range.is_empty()).then_some(self.range)
    }

    /// Widen the span to include day-first date strings `new_min` and `new_max`.
    pub fn update_date_range(&mut self, new_min: &str, new_max: &str) -> Result<()> {
        let min = parse_one("new_min", new_min)?;
        let max = parse_one("new_max", new_max)?;
        self.range.widen(min, max);
        Ok(())
    }

    /// Widen the span to include `range`. Empty ranges are ignored.
    pub fn include(&mut self, range: DateRange) {
        if !range.is_empty() {
            self.range.widen(range.start(), range.end());
        }
    }

    /// One row per day with `Date` (dd-mm-yyyy), `Year`, `Quarter`, `Month`,
    /// `Month Name`, `Day` and `Day Name` columns.
    pub fn data(&self) -> Result<DateIndexedTable> {
        let days: Vec<NaiveDate> = match self.date_range() {
            Some(range) => range
                .start()
                .iter_days()
                .take_while(|d| *d <= range.end())
                .collect(),
            None => Vec::new(),
        };

        let numeric = |f: fn(&NaiveDate) -> f64| Column::Float(days.iter().map(f).collect());
        let text = |format: &str| Column::text(days.iter().map(|d| d.format(format).to_string()));

        DateIndexedTable::from_columns(
            days.clone(),
            vec![
                ("Date", text("%d-%m-%Y")),
                ("Year", numeric(|d| d.year() as f64)),
                ("Quarter", numeric(|d| ((d.month() + 2) / 3) as f64)),
                ("Month", numeric(|d| d.month() as f64)),
                ("Month Name", text("%b")),
                ("Day", numeric(|d| d.day() as f64)),
                ("Day Name", text("%a")),
            ],
        )
    }
}

fn parse_one(label: &str, value: &str) -> Result<NaiveDate> {
    parse_dates(label, &Column::text([value]), &DateFormat::Auto)?
        .into_iter()
        .next()
        .ok_or_else(|| AmaraError::ParseError {
            column: label.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_before_update() {
        let calendar = MasterCalendar::new();
        assert!(calendar.date_range().is_none());

        let data = calendar.data().unwrap();
        assert!(data.is_empty());
        assert_eq!(data.names().len(), 7);
    }

    #[test]
    fn updates_only_widen() {
        let mut calendar = MasterCalendar::new();
        calendar.update_date_range("01/03/2023", "31/03/2023").unwrap();
        calendar.update_date_range("10/03/2023", "15/04/2023").unwrap();
        calendar.update_date_range("15/02/2023", "20/03/2023").unwrap();

        let range = calendar.date_range().unwrap();
        assert_eq!(range.start(), d(2023, 2, 15));
        assert_eq!(range.end(), d(2023, 4, 15));
    }

    #[test]
    fn include_range() {
        let mut calendar = MasterCalendar::new();
        calendar.include(DateRange::new(d(2024, 1, 1), d(2024, 1, 31)));
        calendar.include(DateRange::unbounded());
        assert_eq!(calendar.data().unwrap().len(), 31);
    }

    #[test]
    fn calendar_columns() {
        let mut calendar = MasterCalendar::new();
        calendar.update_date_range("28/02/2024", "01/03/2024").unwrap();
        let data = calendar.data().unwrap();

        assert_eq!(
            data.names(),
            ["Date", "Year", "Quarter", "Month", "Month Name", "Day", "Day Name"]
        );
        assert_eq!(data.len(), 3);
        assert_eq!(data.index()[1], d(2024, 2, 29));
        assert_eq!(data.column("Date").unwrap(), &Column::text(["28-02-2024", "29-02-2024", "01-03-2024"]));
        assert_eq!(data.float("Quarter").unwrap(), &[1.0, 1.0, 1.0]);
        assert_eq!(data.float("Month").unwrap(), &[2.0, 2.0, 3.0]);
        assert_eq!(data.float("Day").unwrap(), &[28.0, 29.0, 1.0]);
        assert_eq!(data.column("Month Name").unwrap(), &Column::text(["Feb", "Feb", "Mar"]));
        assert_eq!(data.column("Day Name").unwrap(), &Column::text(["Wed", "Thu", "Fri"]));
    }

    #[test]
    fn quarter_boundaries() {
        let mut calendar = MasterCalendar::new();
        calendar.update_date_range("30/09/2023", "01/10/2023").unwrap();
        let data = calendar.data().unwrap();
        assert_eq!(data.float("Quarter").unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn rejects_unparseable_dates() {
        let mut calendar = MasterCalendar::new();
        assert!(matches!(
            calendar.update_date_range("yesterday", "01/01/2023"),
            Err(AmaraError::ParseError { .. })
        ));
        assert!(calendar.date_range().is_none());
    }
}
