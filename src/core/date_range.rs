//! Inclusive calendar date ranges.

use chrono::NaiveDate;
use std::fmt;

/// An inclusive `[start, end]` pair of calendar dates.
///
/// A fresh range from [`DateRange::unbounded`] holds sentinel bounds (`start` at the
/// latest representable date, `end` at the earliest) so that the first call to
/// [`DateRange::narrow`] or [`DateRange::widen`] always replaces both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Sentinel range that any real span will replace.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MAX,
            end: NaiveDate::MIN,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True while the range still holds its sentinel bounds.
    pub fn is_unbounded(&self) -> bool {
        self.start == NaiveDate::MAX && self.end == NaiveDate::MIN
    }

    /// True when `start > end`, i.e. no date lies inside.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Intersect with `[min, max]`: keep the latest start and the earliest end.
    pub fn narrow(&mut self, min: NaiveDate, max: NaiveDate) {
        if self.is_unbounded() {
            self.start = min;
            self.end = max;
            return;
        }
        if min > self.start {
            self.start = min;
        }
        if max < self.end {
            self.end = max;
        }
    }

    /// Union with `[min, max]`: keep the earliest start and the latest end.
    pub fn widen(&mut self, min: NaiveDate, max: NaiveDate) {
        if min < self.start {
            self.start = min;
        }
        if max > self.end {
            self.end = max;
        }
    }

    /// Number of days inside the range, zero when empty.
    pub fn num_days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
