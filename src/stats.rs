use crate::dates::day_diff;
use crate::models::{
    CycleAverages, CYCLE_LENGTH_RANGE, FOLLICULAR_DAYS_RANGE, LUTEAL_DAYS_RANGE,
};
use crate::ovulation::OvulationMarks;
use crate::periods::PeriodStore;

/// Observed averages from recorded history, for tuning the settings.
///
/// Each consecutive pair of recorded intervals contributes a cycle-length
/// sample; an ovulation mark strictly between the two starts splits that
/// span into follicular and luteal samples. A sample outside its plausible
/// physiological range is discarded rather than skewing the mean, so a
/// single mistyped record cannot produce a 300-day "average".
pub fn cycle_averages(periods: &PeriodStore, marks: &OvulationMarks) -> CycleAverages {
    let intervals = periods.intervals();
    if intervals.len() < 2 {
        return CycleAverages::default();
    }

    let mut cycle_samples = Vec::new();
    let mut follicular_samples = Vec::new();
    let mut luteal_samples = Vec::new();

    // intervals are sorted descending: w[0] is the newer of the pair
    for w in intervals.windows(2) {
        let (newer, older) = (&w[0], &w[1]);

        if let Some(days) = in_range(day_diff(older.start, newer.start), &CYCLE_LENGTH_RANGE) {
            cycle_samples.push(days);
        }

        if let Some(ovulation) = marks.mark_strictly_between(older.start, newer.start) {
            if let Some(days) = in_range(day_diff(older.start, ovulation), &FOLLICULAR_DAYS_RANGE) {
                follicular_samples.push(days);
            }
            if let Some(days) = in_range(day_diff(ovulation, newer.start), &LUTEAL_DAYS_RANGE) {
                luteal_samples.push(days);
            }
        }
    }

    CycleAverages {
        cycle_length: rounded_mean(&cycle_samples),
        follicular_days: rounded_mean(&follicular_samples),
        luteal_days: rounded_mean(&luteal_samples),
    }
}

fn in_range(days: i64, range: &std::ops::RangeInclusive<u32>) -> Option<u32> {
    u32::try_from(days).ok().filter(|d| range.contains(d))
}

fn rounded_mean(samples: &[u32]) -> Option<u32> {
    if samples.is_empty() {
        return None;
    }
    let sum: u32 = samples.iter().sum();
    Some((f64::from(sum) / samples.len() as f64).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        crate::dates::parse_date(s).unwrap()
    }

    fn store_with_starts(starts: &[&str]) -> PeriodStore {
        let mut store = PeriodStore::new();
        for s in starts {
            store.toggle(d(s));
        }
        store
    }

    #[test]
    fn averages_two_regular_cycles() {
        let store = store_with_starts(&["2024-01-05", "2024-02-02", "2024-03-01"]);
        let avg = cycle_averages(&store, &OvulationMarks::new());
        assert_eq!(avg.cycle_length, Some(28));
        assert_eq!(avg.follicular_days, None);
        assert_eq!(avg.luteal_days, None);
    }

    #[test]
    fn mean_rounds_to_nearest() {
        // 27-day and 28-day cycles -> 27.5 -> 28
        let store = store_with_starts(&["2024-01-01", "2024-01-28", "2024-02-25"]);
        let avg = cycle_averages(&store, &OvulationMarks::new());
        assert_eq!(avg.cycle_length, Some(28));
    }

    #[test]
    fn implausible_sample_is_dropped_not_averaged() {
        // 15-day gap: physiologically implausible, and the only sample
        let store = store_with_starts(&["2024-01-01", "2024-01-16"]);
        let avg = cycle_averages(&store, &OvulationMarks::new());
        assert_eq!(avg.cycle_length, None);
    }

    #[test]
    fn needs_at_least_two_intervals() {
        let store = store_with_starts(&["2024-01-01"]);
        assert_eq!(cycle_averages(&store, &OvulationMarks::new()), CycleAverages::default());
        assert_eq!(
            cycle_averages(&PeriodStore::new(), &OvulationMarks::new()),
            CycleAverages::default()
        );
    }

    #[test]
    fn marks_split_cycles_into_follicular_and_luteal() {
        let store = store_with_starts(&["2024-01-01", "2024-01-29", "2024-02-26"]);
        let mut marks = OvulationMarks::new();
        marks.toggle(d("2024-01-15")); // day 15 of the January cycle
        marks.toggle(d("2024-02-12")); // day 15 of the February cycle
        let avg = cycle_averages(&store, &marks);
        assert_eq!(avg.cycle_length, Some(28));
        assert_eq!(avg.follicular_days, Some(14));
        assert_eq!(avg.luteal_days, Some(14));
    }

    #[test]
    fn mark_on_interval_start_is_not_between() {
        let store = store_with_starts(&["2024-01-01", "2024-01-29"]);
        let mut marks = OvulationMarks::new();
        marks.toggle(d("2024-01-01"));
        marks.toggle(d("2024-01-29"));
        let avg = cycle_averages(&store, &marks);
        assert_eq!(avg.follicular_days, None);
        assert_eq!(avg.luteal_days, None);
    }

    #[test]
    fn out_of_range_phase_samples_are_dropped() {
        let store = store_with_starts(&["2024-01-01", "2024-01-29"]);
        let mut marks = OvulationMarks::new();
        // 5 days after period start: follicular 5 (<10), luteal 23 (>18)
        marks.toggle(d("2024-01-06"));
        let avg = cycle_averages(&store, &marks);
        assert_eq!(avg.cycle_length, Some(28));
        assert_eq!(avg.follicular_days, None);
        assert_eq!(avg.luteal_days, None);
    }
}
