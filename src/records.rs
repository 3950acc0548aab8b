use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    AppData, BbtRecord, DischargeAmount, DischargeRecord, DischargeTexture, MedicationRecord,
    OvulationTest, OvulationTestResult, SymptomRecord, SymptomType, TimingRecord, VisitRecord,
};
use crate::ovulation::OvulationMarks;

pub const BBT_MIN: f64 = 35.0;
pub const BBT_MAX: f64 = 40.0;

/// Round a basal body temperature to two decimals and validate it against
/// the recordable range. Out-of-range and non-finite input is `None`.
pub fn sanitize_bbt(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = (value * 100.0).round() / 100.0;
    (BBT_MIN..=BBT_MAX).contains(&rounded).then_some(rounded)
}

/// Insert or replace the reading for `date`, keeping the list sorted
/// ascending by date.
pub fn upsert_bbt(records: &mut Vec<BbtRecord>, date: NaiveDate, value: f64) {
    if let Some(existing) = records.iter_mut().find(|r| r.date == date) {
        existing.value = value;
    } else {
        records.push(BbtRecord { date, value });
    }
    records.sort_by_key(|r| r.date);
}

pub fn remove_bbt(records: &mut Vec<BbtRecord>, date: NaiveDate) {
    records.retain(|r| r.date != date);
}

/// Whether a BBT reading on `date` falls before or after the (recorded)
/// ovulation of its cycle, for chart coloring. With no mark on or after the
/// date, the reading counts as post-ovulation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BbtPhase {
    PreOvulation,
    PostOvulation,
}

pub fn bbt_phase(date: NaiveDate, marks: &OvulationMarks) -> BbtPhase {
    match marks.first_on_or_after(date) {
        Some(mark) if date < mark => BbtPhase::PreOvulation,
        _ => BbtPhase::PostOvulation,
    }
}

pub fn set_ovulation_test(
    tests: &mut Vec<OvulationTest>,
    date: NaiveDate,
    result: OvulationTestResult,
) {
    if let Some(existing) = tests.iter_mut().find(|t| t.date == date) {
        existing.result = result;
    } else {
        tests.push(OvulationTest { date, result });
    }
}

/// Flip the intercourse-timing record for `date`.
pub fn toggle_timing(timing: &mut Vec<TimingRecord>, date: NaiveDate) {
    if let Some(idx) = timing.iter().position(|t| t.date == date) {
        timing.remove(idx);
    } else {
        timing.push(TimingRecord { date });
    }
}

/// Flip one symptom within the date's record; a record with no symptoms
/// left is removed entirely.
pub fn toggle_symptom(symptoms: &mut Vec<SymptomRecord>, date: NaiveDate, symptom: SymptomType) {
    let idx = match symptoms.iter().position(|r| r.date == date) {
        Some(i) => i,
        None => {
            symptoms.push(SymptomRecord {
                date,
                symptoms: Vec::new(),
            });
            symptoms.len() - 1
        }
    };
    let record = &mut symptoms[idx];
    if let Some(idx) = record.symptoms.iter().position(|s| *s == symptom) {
        record.symptoms.remove(idx);
    } else {
        record.symptoms.push(symptom);
    }
    symptoms.retain(|r| !r.symptoms.is_empty());
}

/// Update the discharge observation for `date`; each axis is overwritten
/// only when given, so amount and texture can be set independently.
pub fn set_discharge(
    discharge: &mut Vec<DischargeRecord>,
    date: NaiveDate,
    amount: Option<DischargeAmount>,
    texture: Option<DischargeTexture>,
) {
    if let Some(existing) = discharge.iter_mut().find(|r| r.date == date) {
        if amount.is_some() {
            existing.amount = amount;
        }
        if texture.is_some() {
            existing.texture = texture;
        }
    } else {
        discharge.push(DischargeRecord {
            date,
            amount,
            texture,
        });
    }
}

/// Preset-chip behavior: adding an already-recorded (date, name) pair
/// removes it instead.
pub fn toggle_medication(medications: &mut Vec<MedicationRecord>, date: NaiveDate, name: &str) {
    if let Some(idx) = medications
        .iter()
        .position(|m| m.date == date && m.name == name)
    {
        medications.remove(idx);
    } else {
        medications.push(MedicationRecord {
            date,
            name: name.to_string(),
        });
    }
}

pub fn remove_medication(medications: &mut Vec<MedicationRecord>, date: NaiveDate, name: &str) {
    if let Some(idx) = medications
        .iter()
        .position(|m| m.date == date && m.name == name)
    {
        medications.remove(idx);
    }
}

/// Add a clinic visit, newest first. An entry with nothing in it is
/// rejected.
pub fn add_visit(
    visits: &mut Vec<VisitRecord>,
    date: NaiveDate,
    content: &str,
    results: &str,
) -> Option<Uuid> {
    let content = content.trim();
    let results = results.trim();
    if content.is_empty() && results.is_empty() {
        return None;
    }
    let id = Uuid::new_v4();
    visits.push(VisitRecord {
        id,
        date,
        content: content.to_string(),
        results: results.to_string(),
    });
    visits.sort_by(|a, b| b.date.cmp(&a.date));
    Some(id)
}

pub fn remove_visit(visits: &mut Vec<VisitRecord>, id: Uuid) {
    visits.retain(|v| v.id != id);
}

/// Everything recorded on a single date, for the day-detail view.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DayRecords {
    pub bbt: Option<f64>,
    pub ovulation_test: Option<OvulationTestResult>,
    pub timing: bool,
    pub symptoms: Vec<SymptomType>,
    pub discharge: Option<DischargeRecord>,
    pub medications: Vec<String>,
}

pub fn records_for_date(data: &AppData, date: NaiveDate) -> DayRecords {
    DayRecords {
        bbt: data.bbt.iter().find(|r| r.date == date).map(|r| r.value),
        ovulation_test: data
            .ovulation_tests
            .iter()
            .find(|t| t.date == date)
            .map(|t| t.result),
        timing: data.timing.iter().any(|t| t.date == date),
        symptoms: data
            .symptoms
            .iter()
            .find(|r| r.date == date)
            .map(|r| r.symptoms.clone())
            .unwrap_or_default(),
        discharge: data.discharge.iter().find(|r| r.date == date).cloned(),
        medications: data
            .medications
            .iter()
            .filter(|m| m.date == date)
            .map(|m| m.name.clone())
            .collect(),
    }
}
