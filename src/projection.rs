use chrono::NaiveDate;

use crate::dates::{add_days, day_diff};
use crate::models::{CyclePhase, CycleSettings};
use crate::periods::PeriodStore;

/// Upper bound on forward rolling. A sane anchor is at most a few hundred
/// cycles stale; hitting this cap means the settings are corrupt and the
/// projection reports "no phase" instead of spinning.
const MAX_ROLL_CYCLES: u32 = 10_000;

/// Resolve the period start used as day 1 of the projection.
///
/// Precedence: most recent recorded interval start on or before `today`,
/// then the settings anchor, then the newest recorded interval (all
/// recorded history in the future), then nothing.
pub fn resolve_anchor(
    settings: &CycleSettings,
    periods: &PeriodStore,
    today: NaiveDate,
) -> Option<NaiveDate> {
    periods
        .latest_start_on_or_before(today)
        .or(settings.last_period_start)
        .or_else(|| periods.newest_start())
}

/// Project the cycle containing `today`.
///
/// The anchor is rolled forward in whole-cycle increments until the cycle
/// it starts covers `today`, so an arbitrarily stale anchor still lands in
/// the right cycle without any per-cycle bookkeeping.
pub fn project(
    settings: &CycleSettings,
    periods: &PeriodStore,
    today: NaiveDate,
) -> Option<CyclePhase> {
    let anchor = resolve_anchor(settings, periods, today)?;

    let cycle_length = settings.cycle_length;
    if cycle_length == 0 {
        return None;
    }
    let period_length = settings.period_length.min(cycle_length - 1);
    let luteal = settings.luteal_phase_days;

    let step = i64::from(cycle_length);
    let mut period_start = anchor;
    let mut rolled = 0u32;
    while add_days(period_start, step) <= today {
        period_start = add_days(period_start, step);
        rolled += 1;
        if rolled >= MAX_ROLL_CYCLES {
            return None;
        }
    }

    let ovulation_day = add_days(period_start, i64::from(cycle_length) - i64::from(luteal) - 1);

    Some(CyclePhase {
        period_start,
        period_end: add_days(period_start, i64::from(period_length) - 1),
        fertile_start: add_days(ovulation_day, -5),
        fertile_end: add_days(ovulation_day, 1),
        ovulation_day,
        next_period_start: add_days(period_start, step),
        cycle_length,
        period_length,
    })
}

/// 1-based day number of `date` within the projected cycle.
pub fn cycle_day(date: NaiveDate, phase: &CyclePhase) -> i64 {
    day_diff(phase.period_start, date) + 1
}
