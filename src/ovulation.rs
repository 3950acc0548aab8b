use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Dates the user explicitly confirmed as ovulation (e.g. a strong positive
/// test strip), kept as a sorted ascending set of unique days. Independent
/// of the projected model; a mark inside the current cycle overrides the
/// projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OvulationMarks {
    dates: Vec<NaiveDate>,
}

impl OvulationMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the set from imported dates, sorted and deduplicated.
    pub fn from_dates(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort();
        dates.dedup();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Insert the date if absent, remove it if present.
    pub fn toggle(&mut self, date: NaiveDate) {
        match self.dates.binary_search(&date) {
            Ok(idx) => {
                self.dates.remove(idx);
            }
            Err(idx) => self.dates.insert(idx, date),
        }
    }

    pub fn is_marked(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    /// Smallest stored date `>= date`. A BBT reading on a day with no such
    /// mark counts as post-ovulation for display purposes.
    pub fn first_on_or_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.dates.binary_search(&date) {
            Ok(idx) => Some(self.dates[idx]),
            Err(idx) => self.dates.get(idx).copied(),
        }
    }

    /// First stored mark with `from <= mark < to`. Used to prefer an actual
    /// recorded ovulation date over the projected one within a cycle.
    pub fn mark_in_window(&self, from: NaiveDate, to: NaiveDate) -> Option<NaiveDate> {
        self.dates
            .iter()
            .copied()
            .find(|m| *m >= from && *m < to)
    }

    /// First stored mark strictly between `after` and `before`, exclusive
    /// on both ends. The statistics estimator pairs this with consecutive
    /// interval starts.
    pub fn mark_strictly_between(&self, after: NaiveDate, before: NaiveDate) -> Option<NaiveDate> {
        self.dates
            .iter()
            .copied()
            .find(|m| *m > after && *m < before)
    }

    pub fn has_mark_in_month(&self, year: i32, month: u32) -> bool {
        self.dates
            .iter()
            .any(|d| d.year() == year && d.month() == month)
    }
}
