use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::day_diff;
use crate::models::{CyclePhase, DayKind};

// Sentences shared between the day description and the status blocks.
const PERIOD_WINDOW: &str = "These days fall within your expected period.";
const FERTILE_WINDOW: &str = "These are your most fertile days.";
const EARLY_FOLLICULAR: &str =
    "Early follicular phase; a good time to settle back into your rhythm.";
const MID_FOLLICULAR: &str =
    "Follicular phase. Estrogen is rising, and mood and energy tend to pick up.";
const PRE_OVULATION: &str = "Ovulation is approaching. Keep an eye on how your body feels.";
const NOT_IMPLANTED_YET: &str =
    "Implantation has not happened yet (most often 6-10 days after ovulation).";

/// Three short explanatory paragraphs for the dashboard: current situation,
/// the effect of rising progesterone, the effect of falling estrogen.
/// Bucket boundaries are fixed; the sentences are a lookup, not an
/// inference.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusBlocks {
    pub situation: Vec<&'static str>,
    pub progesterone: Vec<&'static str>,
    pub estrogen: Vec<&'static str>,
}

pub fn status_blocks(
    cycle_day: i64,
    day_kind: Option<DayKind>,
    phase: &CyclePhase,
    days_after_ovulation: i64,
    luteal_phase_days: u32,
) -> StatusBlocks {
    let luteal = i64::from(luteal_phase_days);
    let follicular = i64::from(phase.cycle_length) - luteal;
    let period_len = i64::from(phase.period_length);

    let mut situation = Vec::new();
    match day_kind {
        Some(DayKind::Period) => situation.push(PERIOD_WINDOW),
        Some(DayKind::Fertile) | Some(DayKind::Ovulation) => situation.push(FERTILE_WINDOW),
        None => {
            if days_after_ovulation >= 1 {
                if days_after_ovulation <= 2 {
                    situation
                        .push("Just after ovulation; the window for conception is still open.");
                } else if days_after_ovulation <= 5 {
                    situation.push(
                        "If fertilization occurred, the egg is traveling down the fallopian tube.",
                    );
                    situation.push(NOT_IMPLANTED_YET);
                } else if days_after_ovulation <= 10 {
                    situation.push(NOT_IMPLANTED_YET);
                } else {
                    situation.push(
                        "If implantation occurred, the body is preparing to sustain a pregnancy.",
                    );
                }
            } else if cycle_day <= period_len + 2 {
                situation.push(EARLY_FOLLICULAR);
            } else if cycle_day < follicular - 2 {
                situation.push(MID_FOLLICULAR);
            } else {
                situation.push(PRE_OVULATION);
            }
        }
    }

    let mut progesterone = Vec::new();
    if days_after_ovulation >= 1 {
        if days_after_ovulation <= 2 {
            progesterone
                .push("Progesterone is starting to rise, lifting your basal body temperature.");
        } else if days_after_ovulation <= 8 {
            progesterone.push(
                "Sleepiness, fatigue, breast tenderness, heaviness in the lower abdomen, constipation.",
            );
        } else if days_after_ovulation <= luteal - 2 {
            progesterone.push(
                "Progesterone secretion is near its peak; breast tenderness and irritability can show up.",
            );
        } else {
            progesterone
                .push("As the period approaches, progesterone drops and temperature starts to fall.");
        }
    } else {
        progesterone.push("Progesterone rises only after ovulation.");
    }

    let mut estrogen = Vec::new();
    if days_after_ovulation >= 1 {
        estrogen.push(
            "After ovulation estrogen dips for a while; low mood and thicker, scantier discharge can follow.",
        );
    } else if cycle_day <= period_len {
        estrogen.push("Estrogen stays low during the period.");
    } else {
        estrogen.push("Estrogen rises through the follicular phase; skin and mood often improve.");
    }

    StatusBlocks {
        situation,
        progesterone,
        estrogen,
    }
}

/// One-sentence description of a cycle day, used for per-date summaries.
pub fn describe_day(
    cycle_day: i64,
    day_kind: Option<DayKind>,
    phase: &CyclePhase,
    luteal_phase_days: u32,
) -> &'static str {
    match day_kind {
        Some(DayKind::Period) => return PERIOD_WINDOW,
        Some(DayKind::Fertile) => return FERTILE_WINDOW,
        Some(DayKind::Ovulation) => return "Around the predicted ovulation day.",
        None => {}
    }

    let luteal = i64::from(luteal_phase_days);
    let follicular = i64::from(phase.cycle_length) - luteal;
    let period_len = i64::from(phase.period_length);

    if cycle_day <= follicular {
        let after_period = cycle_day - period_len;
        if after_period <= 3 {
            EARLY_FOLLICULAR
        } else if cycle_day < follicular - 2 {
            MID_FOLLICULAR
        } else {
            PRE_OVULATION
        }
    } else {
        let high_day = cycle_day - follicular;
        if high_day <= 2 {
            "The high-temperature phase has just begun; progesterone is lifting your temperature."
        } else if high_day <= 6 {
            "Progesterone is near its peak; sleepiness and heaviness are common."
        } else if high_day <= luteal - 2 {
            "Late high-temperature phase; breast tenderness and irritability can appear as the period nears."
        } else {
            "Your period is due any day now. Take it easy."
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhaseName {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PhaseSegment {
    pub name: PhaseName,
    pub days: u32,
}

/// The four-segment cycle bar with the position of the current day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PhaseTimeline {
    pub segments: [PhaseSegment; 4],
    pub current: PhaseName,
    pub day_in_phase: i64,
    pub days_in_phase: u32,
}

/// Segment the cycle into menstrual / follicular / ovulatory / luteal spans
/// and locate `cycle_day` inside them. The ovulatory segment is a fixed
/// three days centered on the projected ovulation index.
pub fn phase_timeline(cycle_day: i64, phase: &CyclePhase, luteal_phase_days: u32) -> PhaseTimeline {
    let cycle_len = i64::from(phase.cycle_length);
    let period_len = i64::from(phase.period_length);
    let ovulation_index = cycle_len - i64::from(luteal_phase_days);

    let menstrual_days = period_len;
    let follicular_days = (ovulation_index - period_len - 2).max(0);
    let ovulatory_days = 3i64;
    let luteal_days = (cycle_len - ovulation_index - 1).max(0);

    let (current, day_in_phase, days_in_phase) = if cycle_day <= period_len {
        (PhaseName::Menstrual, cycle_day, menstrual_days)
    } else if cycle_day < ovulation_index - 1 {
        (PhaseName::Follicular, cycle_day - period_len, follicular_days)
    } else if cycle_day <= ovulation_index + 1 {
        (PhaseName::Ovulatory, cycle_day - ovulation_index + 2, ovulatory_days)
    } else {
        (PhaseName::Luteal, cycle_day - (ovulation_index + 1), luteal_days)
    };

    PhaseTimeline {
        segments: [
            PhaseSegment {
                name: PhaseName::Menstrual,
                days: menstrual_days as u32,
            },
            PhaseSegment {
                name: PhaseName::Follicular,
                days: follicular_days as u32,
            },
            PhaseSegment {
                name: PhaseName::Ovulatory,
                days: ovulatory_days as u32,
            },
            PhaseSegment {
                name: PhaseName::Luteal,
                days: luteal_days as u32,
            },
        ],
        current,
        day_in_phase,
        days_in_phase: days_in_phase as u32,
    }
}

/// One row of the hormone reference table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HormoneRow {
    pub phase: &'static str,
    pub day_from: i64,
    pub day_to: i64,
    pub estrogen: &'static str,
    pub progesterone: &'static str,
    pub lh: &'static str,
}

pub const HORMONE_REFERENCE: [HormoneRow; 6] = [
    HormoneRow {
        phase: "Menstrual (days 1-5)",
        day_from: 1,
        day_to: 5,
        estrogen: "low",
        progesterone: "low",
        lh: "low",
    },
    HormoneRow {
        phase: "Early follicular (days 6-9)",
        day_from: 6,
        day_to: 9,
        estrogen: "rising",
        progesterone: "low",
        lh: "low",
    },
    HormoneRow {
        phase: "Late follicular (days 10-13)",
        day_from: 10,
        day_to: 13,
        estrogen: "rising toward peak",
        progesterone: "low",
        lh: "rising",
    },
    HormoneRow {
        phase: "Ovulatory (around day 14)",
        day_from: 14,
        day_to: 14,
        estrogen: "falling after peak",
        progesterone: "beginning to rise",
        lh: "surge / peak",
    },
    HormoneRow {
        phase: "Early luteal (days 15-21)",
        day_from: 15,
        day_to: 21,
        estrogen: "slight rise, then plateau",
        progesterone: "rising to peak",
        lh: "low",
    },
    HormoneRow {
        phase: "Late luteal (days 22-28)",
        day_from: 22,
        day_to: 99,
        estrogen: "falling",
        progesterone: "falling after peak",
        lh: "low",
    },
];

/// Index of the reference row covering `cycle_day`, if any.
pub fn current_hormone_row(cycle_day: i64) -> Option<usize> {
    HORMONE_REFERENCE
        .iter()
        .position(|r| cycle_day >= r.day_from && cycle_day <= r.day_to)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NextEvent {
    Ovulation,
    NextPeriod,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Countdown {
    pub event: NextEvent,
    pub days: i64,
}

/// What the dashboard counts down to: the next period once ovulation has
/// passed, otherwise ovulation itself.
pub fn next_event(today: NaiveDate, phase: &CyclePhase, ovulation: NaiveDate) -> Countdown {
    if today >= ovulation {
        Countdown {
            event: NextEvent::NextPeriod,
            days: day_diff(today, phase.next_period_start).max(0),
        }
    } else {
        Countdown {
            event: NextEvent::Ovulation,
            days: day_diff(today, ovulation).max(0),
        }
    }
}
