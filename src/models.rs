use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ovulation::OvulationMarks;
use crate::periods::PeriodStore;

pub const CYCLE_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 21..=45;
pub const PERIOD_LENGTH_RANGE: std::ops::RangeInclusive<u32> = 3..=10;
pub const LUTEAL_DAYS_RANGE: std::ops::RangeInclusive<u32> = 10..=18;
pub const FOLLICULAR_DAYS_RANGE: std::ops::RangeInclusive<u32> = 10..=30;

/// Projection parameters and the fallback anchor. The sole source of truth
/// for the cycle *model*; recorded period intervals always take precedence
/// as the anchor when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CycleSettings {
    pub cycle_length: u32,
    pub period_length: u32,
    pub luteal_phase_days: u32,
    pub last_period_start: Option<NaiveDate>,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            cycle_length: 28,
            period_length: 5,
            luteal_phase_days: 14,
            last_period_start: None,
        }
    }
}

/// A partial settings edit. Fields outside their valid range are ignored
/// rather than clamped; `last_period_start` replaces the stored value
/// unconditionally (clearing it is a legitimate edit).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub cycle_length: Option<u32>,
    pub period_length: Option<u32>,
    pub luteal_phase_days: Option<u32>,
    pub last_period_start: Option<Option<NaiveDate>>,
}

impl CycleSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(v) = update.cycle_length {
            if CYCLE_LENGTH_RANGE.contains(&v) {
                self.cycle_length = v;
            }
        }
        if let Some(v) = update.period_length {
            if PERIOD_LENGTH_RANGE.contains(&v) {
                self.period_length = v;
            }
        }
        if let Some(v) = update.luteal_phase_days {
            if LUTEAL_DAYS_RANGE.contains(&v) {
                self.luteal_phase_days = v;
            }
        }
        if let Some(v) = update.last_period_start {
            self.last_period_start = v;
        }
    }

    /// Phase-length tuning: luteal and total are taken when in range, and a
    /// valid follicular length wins over the explicit total by rewriting the
    /// cycle length as `follicular + luteal`.
    pub fn apply_phase_lengths(
        &mut self,
        follicular: Option<u32>,
        luteal: Option<u32>,
        total: Option<u32>,
    ) {
        if let Some(v) = luteal {
            if LUTEAL_DAYS_RANGE.contains(&v) {
                self.luteal_phase_days = v;
            }
        }
        if let Some(v) = total {
            if CYCLE_LENGTH_RANGE.contains(&v) {
                self.cycle_length = v;
            }
        }
        if let Some(v) = follicular {
            if FOLLICULAR_DAYS_RANGE.contains(&v) {
                self.cycle_length = v + self.luteal_phase_days;
            }
        }
    }

    pub fn follicular_days(&self) -> u32 {
        self.cycle_length.saturating_sub(self.luteal_phase_days)
    }
}

/// One confirmed menstruation span, inclusive on both ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodInterval {
    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The current cycle as projected from settings and the effective anchor.
/// Derived on every query, never persisted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CyclePhase {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub ovulation_day: NaiveDate,
    pub next_period_start: NaiveDate,
    pub cycle_length: u32,
    pub period_length: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Period,
    Fertile,
    Ovulation,
}

/// Observed averages from recorded history; `None` when no sample passed
/// the plausibility filter.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CycleAverages {
    pub cycle_length: Option<u32>,
    pub follicular_days: Option<u32>,
    pub luteal_days: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BbtRecord {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OvulationTestResult {
    Negative,
    Weak,
    Positive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OvulationTest {
    pub date: NaiveDate,
    pub result: OvulationTestResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimingRecord {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymptomType {
    Cramps,
    CrampsPrickling,
    CrampsLeft,
    CrampsRight,
    CrampsLowerAbdomen,
    CrampsHeavy,
    CrampsThrobbing,
    Headache,
    Bloating,
    Mood,
    Nausea,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomRecord {
    pub date: NaiveDate,
    pub symptoms: Vec<SymptomType>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DischargeAmount {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DischargeTexture {
    Stretchy,
    Watery,
    Thick,
    EggWhite,
    Spotting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DischargeRecord {
    pub date: NaiveDate,
    pub amount: Option<DischargeAmount>,
    pub texture: Option<DischargeTexture>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicationRecord {
    pub date: NaiveDate,
    pub name: String,
}

pub const MEDICATION_PRESETS: &[&str] = &["Letrozole", "Femara", "Metformin", "Clomid"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub content: String,
    pub results: String,
}

/// The complete owned state, serialized as one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub settings: CycleSettings,
    #[serde(default)]
    pub periods: PeriodStore,
    #[serde(default)]
    pub ovulation_marks: OvulationMarks,
    #[serde(default)]
    pub bbt: Vec<BbtRecord>,
    #[serde(default)]
    pub ovulation_tests: Vec<OvulationTest>,
    #[serde(default)]
    pub timing: Vec<TimingRecord>,
    #[serde(default)]
    pub symptoms: Vec<SymptomRecord>,
    #[serde(default)]
    pub discharge: Vec<DischargeRecord>,
    #[serde(default)]
    pub medications: Vec<MedicationRecord>,
    #[serde(default)]
    pub visits: Vec<VisitRecord>,
}
