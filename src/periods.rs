use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::add_days;
use crate::models::PeriodInterval;

/// Confirmed menstruation history as a set of disjoint, non-adjacent
/// intervals, sorted descending by start (newest first). All mutation goes
/// through [`PeriodStore::toggle`], which keeps the invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PeriodStore {
    intervals: Vec<PeriodInterval>,
}

impl PeriodStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from imported intervals. Inverted entries are
    /// dropped rather than rejected wholesale; the rest are re-sorted.
    pub fn from_intervals(intervals: Vec<PeriodInterval>) -> Self {
        let mut intervals: Vec<PeriodInterval> =
            intervals.into_iter().filter(|p| p.start <= p.end).collect();
        intervals.sort_by(|a, b| b.start.cmp(&a.start));
        Self { intervals }
    }

    pub fn intervals(&self) -> &[PeriodInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Flip whether `date` is a recorded period day.
    ///
    /// Inside an interval: a single-day interval is deleted, a boundary day
    /// shrinks the interval, an interior day splits it in two. Outside:
    /// the day extends an adjacent interval when one touches it, bridging
    /// two intervals into one when it fills the single-day gap between
    /// them; otherwise a new single-day interval is inserted.
    pub fn toggle(&mut self, date: NaiveDate) {
        if let Some(idx) = self.intervals.iter().position(|p| p.contains(date)) {
            let p = self.intervals[idx];
            if p.start == p.end {
                self.intervals.remove(idx);
            } else if p.start == date {
                self.intervals[idx].start = add_days(date, 1);
            } else if p.end == date {
                self.intervals[idx].end = add_days(date, -1);
            } else {
                self.intervals[idx].end = add_days(date, -1);
                self.intervals.push(PeriodInterval {
                    start: add_days(date, 1),
                    end: p.end,
                });
            }
        } else {
            let before = self.intervals.iter().position(|p| p.end == add_days(date, -1));
            let after = self.intervals.iter().position(|p| p.start == add_days(date, 1));
            match (before, after) {
                (Some(b), Some(a)) => {
                    self.intervals[b].end = self.intervals[a].end;
                    self.intervals.remove(a);
                }
                (Some(b), None) => self.intervals[b].end = date,
                (None, Some(a)) => self.intervals[a].start = date,
                (None, None) => self.intervals.push(PeriodInterval::single(date)),
            }
        }
        self.intervals.sort_by(|a, b| b.start.cmp(&a.start));
    }

    pub fn is_in_period(&self, date: NaiveDate) -> bool {
        self.intervals.iter().any(|p| p.contains(date))
    }

    /// Most recent interval start on or before `date`, the preferred
    /// projection anchor.
    pub fn latest_start_on_or_before(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.intervals
            .iter()
            .map(|p| p.start)
            .filter(|s| *s <= date)
            .max()
    }

    /// Start of the newest stored interval, regardless of `date`. Last
    /// anchor fallback when every recorded interval lies in the future.
    pub fn newest_start(&self) -> Option<NaiveDate> {
        self.intervals.first().map(|p| p.start)
    }

    /// Whether any interval starts or ends inside the given month
    /// (1-based). The calendar layer suppresses projected coloring for
    /// months that carry confirmed records.
    pub fn has_record_in_month(&self, year: i32, month: u32) -> bool {
        self.intervals.iter().any(|p| {
            (p.start.year() == year && p.start.month() == month)
                || (p.end.year() == year && p.end.month() == month)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn spans(store: &PeriodStore) -> Vec<(NaiveDate, NaiveDate)> {
        store.intervals().iter().map(|p| (p.start, p.end)).collect()
    }

    fn assert_disjoint_and_sorted(store: &PeriodStore) {
        let iv = store.intervals();
        for p in iv {
            assert!(p.start <= p.end, "inverted interval {p:?}");
        }
        for w in iv.windows(2) {
            // descending by start, and strictly more than one day apart
            assert!(w[0].start > w[1].start, "not sorted descending: {w:?}");
            assert!(
                add_days(w[1].end, 1) < w[0].start,
                "adjacent or overlapping: {w:?}"
            );
        }
    }

    #[test]
    fn toggle_inserts_merges_and_shrinks() {
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-01"));
        assert_eq!(spans(&store), vec![(d("2024-01-01"), d("2024-01-01"))]);

        store.toggle(d("2024-01-02"));
        assert_eq!(spans(&store), vec![(d("2024-01-01"), d("2024-01-02"))]);

        store.toggle(d("2024-01-01"));
        assert_eq!(spans(&store), vec![(d("2024-01-02"), d("2024-01-02"))]);
    }

    #[test]
    fn toggle_extends_backwards_onto_interval_start() {
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-05"));
        store.toggle(d("2024-01-04"));
        assert_eq!(spans(&store), vec![(d("2024-01-04"), d("2024-01-05"))]);
    }

    #[test]
    fn interior_toggle_splits() {
        let mut store = PeriodStore::new();
        for day in 1..=5 {
            store.toggle(NaiveDate::from_ymd_opt(2024, 2, day).unwrap());
        }
        assert_eq!(spans(&store), vec![(d("2024-02-01"), d("2024-02-05"))]);

        store.toggle(d("2024-02-03"));
        assert_eq!(
            spans(&store),
            vec![
                (d("2024-02-04"), d("2024-02-05")),
                (d("2024-02-01"), d("2024-02-02")),
            ]
        );
        assert_disjoint_and_sorted(&store);
    }

    #[test]
    fn gap_fill_bridges_two_intervals() {
        let mut store = PeriodStore::new();
        for s in ["2024-02-01", "2024-02-02", "2024-02-04", "2024-02-05"] {
            store.toggle(d(s));
        }
        assert_eq!(store.len(), 2);

        store.toggle(d("2024-02-03"));
        assert_eq!(spans(&store), vec![(d("2024-02-01"), d("2024-02-05"))]);
        assert_disjoint_and_sorted(&store);
    }

    #[test]
    fn toggle_is_self_inverse() {
        let mut store = PeriodStore::new();
        for s in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10"] {
            store.toggle(d(s));
        }
        let snapshot = spans(&store);
        for s in ["2024-01-02", "2024-01-01", "2024-01-03", "2024-01-15"] {
            store.toggle(d(s));
            store.toggle(d(s));
            assert_eq!(spans(&store), snapshot, "toggling {s} twice changed state");
            assert_disjoint_and_sorted(&store);
        }
    }

    #[test]
    fn invariant_holds_under_arbitrary_sequences() {
        let mut store = PeriodStore::new();
        let base = d("2024-03-01");
        // deterministic pseudo-random walk over a 20-day window
        let mut x: u64 = 42;
        for _ in 0..200 {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let offset = (x >> 33) % 20;
            store.toggle(add_days(base, offset as i64));
            assert_disjoint_and_sorted(&store);
        }
    }

    #[test]
    fn is_in_period_inclusive_bounds() {
        let mut store = PeriodStore::new();
        for day in 10..=12 {
            store.toggle(NaiveDate::from_ymd_opt(2024, 4, day).unwrap());
        }
        assert!(store.is_in_period(d("2024-04-10")));
        assert!(store.is_in_period(d("2024-04-12")));
        assert!(!store.is_in_period(d("2024-04-09")));
        assert!(!store.is_in_period(d("2024-04-13")));
    }

    #[test]
    fn anchor_queries() {
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-05"));
        store.toggle(d("2024-02-02"));
        store.toggle(d("2024-03-01"));
        assert_eq!(
            store.latest_start_on_or_before(d("2024-02-15")),
            Some(d("2024-02-02"))
        );
        assert_eq!(store.latest_start_on_or_before(d("2023-12-31")), None);
        assert_eq!(store.newest_start(), Some(d("2024-03-01")));
    }

    #[test]
    fn month_membership() {
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-31"));
        store.toggle(d("2024-02-01"));
        assert!(store.has_record_in_month(2024, 1));
        assert!(store.has_record_in_month(2024, 2));
        assert!(!store.has_record_in_month(2024, 3));
    }
}
