use chrono::NaiveDate;

use crate::dates::{add_days, day_diff};
use crate::models::{CyclePhase, DayKind};
use crate::ovulation::OvulationMarks;

/// Recorded ovulation mark inside the projected cycle, if any. Such a mark
/// overrides the projected ovulation day wherever both exist.
pub fn actual_ovulation_in(phase: &CyclePhase, marks: &OvulationMarks) -> Option<NaiveDate> {
    marks.mark_in_window(phase.period_start, phase.next_period_start)
}

/// Classify a date against the projected cycle.
///
/// Priority: period window, then the ovulation day itself, then the fertile
/// window (ovulation −5 ..= +1, recomputed around whichever ovulation date
/// is in effect). A period day stays `Period` even when the windows overlap.
pub fn classify(
    date: NaiveDate,
    phase: &CyclePhase,
    actual_ovulation: Option<NaiveDate>,
) -> Option<DayKind> {
    let ovulation = actual_ovulation.unwrap_or(phase.ovulation_day);

    if phase.period_start <= date && date <= phase.period_end {
        Some(DayKind::Period)
    } else if date == ovulation {
        Some(DayKind::Ovulation)
    } else if add_days(ovulation, -5) <= date && date <= add_days(ovulation, 1) {
        Some(DayKind::Fertile)
    } else {
        None
    }
}

/// Days elapsed since ovulation, floored at zero for pre-ovulation dates.
pub fn days_after_ovulation(date: NaiveDate, ovulation: NaiveDate) -> i64 {
    day_diff(ovulation, date).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use crate::models::CycleSettings;
    use crate::periods::PeriodStore;
    use crate::projection::project;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn reference_phase() -> CyclePhase {
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-01"));
        project(&CycleSettings::default(), &store, d("2024-01-20")).unwrap()
    }

    #[test]
    fn date_past_fertile_window_is_none() {
        let phase = reference_phase();
        assert_eq!(classify(d("2024-01-20"), &phase, None), None);
    }

    #[test]
    fn window_memberships() {
        let phase = reference_phase();
        assert_eq!(classify(d("2024-01-03"), &phase, None), Some(DayKind::Period));
        assert_eq!(classify(d("2024-01-05"), &phase, None), Some(DayKind::Period));
        assert_eq!(classify(d("2024-01-09"), &phase, None), Some(DayKind::Fertile));
        assert_eq!(classify(d("2024-01-14"), &phase, None), Some(DayKind::Ovulation));
        assert_eq!(classify(d("2024-01-15"), &phase, None), Some(DayKind::Fertile));
        assert_eq!(classify(d("2024-01-16"), &phase, None), None);
        assert_eq!(classify(d("2023-12-31"), &phase, None), None);
    }

    #[test]
    fn period_wins_over_overlapping_fertile_window() {
        // short cycle with long luteal phase pushes ovulation into the period
        let settings = CycleSettings {
            cycle_length: 21,
            period_length: 5,
            luteal_phase_days: 18,
            ..Default::default()
        };
        let mut store = PeriodStore::new();
        store.toggle(d("2024-01-01"));
        let phase = project(&settings, &store, d("2024-01-02")).unwrap();
        assert_eq!(phase.ovulation_day, d("2024-01-03"));
        for day in ["2024-01-01", "2024-01-03", "2024-01-04", "2024-01-05"] {
            assert_eq!(
                classify(d(day), &phase, None),
                Some(DayKind::Period),
                "{day} should stay period"
            );
        }
    }

    #[test]
    fn actual_mark_shifts_ovulation_and_fertile_window() {
        let phase = reference_phase();
        let mut marks = OvulationMarks::new();
        marks.toggle(d("2024-01-17"));
        let actual = actual_ovulation_in(&phase, &marks);
        assert_eq!(actual, Some(d("2024-01-17")));

        assert_eq!(classify(d("2024-01-17"), &phase, actual), Some(DayKind::Ovulation));
        // window now 12th..=18th
        assert_eq!(classify(d("2024-01-12"), &phase, actual), Some(DayKind::Fertile));
        assert_eq!(classify(d("2024-01-18"), &phase, actual), Some(DayKind::Fertile));
        // the projected ovulation day is just another fertile day now
        assert_eq!(classify(d("2024-01-14"), &phase, actual), Some(DayKind::Fertile));
        assert_eq!(classify(d("2024-01-11"), &phase, actual), None);
    }

    #[test]
    fn mark_outside_cycle_window_is_ignored() {
        let phase = reference_phase();
        let mut marks = OvulationMarks::new();
        marks.toggle(d("2024-01-29")); // next cycle's territory
        assert_eq!(actual_ovulation_in(&phase, &marks), None);

        marks.toggle(d("2023-12-20"));
        assert_eq!(actual_ovulation_in(&phase, &marks), None);
    }

    #[test]
    fn days_after_ovulation_floors_at_zero() {
        assert_eq!(days_after_ovulation(d("2024-01-13"), d("2024-01-14")), 0);
        assert_eq!(days_after_ovulation(d("2024-01-14"), d("2024-01-14")), 0);
        assert_eq!(days_after_ovulation(d("2024-01-20"), d("2024-01-14")), 6);
    }
}
