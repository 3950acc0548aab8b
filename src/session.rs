use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::classify::{actual_ovulation_in, classify, days_after_ovulation};
use crate::dates::add_days;
use crate::models::{
    AppData, CycleAverages, CyclePhase, CycleSettings, DayKind, DischargeAmount, DischargeTexture,
    OvulationTestResult, SettingsUpdate, SymptomType,
};
use crate::narrative::{
    current_hormone_row, describe_day, next_event, phase_timeline, status_blocks, Countdown,
    PhaseTimeline, StatusBlocks,
};
use crate::ovulation::OvulationMarks;
use crate::periods::PeriodStore;
use crate::projection::{cycle_day, project};
use crate::records::{self, BbtPhase, DayRecords};
use crate::stats::cycle_averages;
use crate::storage::{self, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session is locked")]
    Locked,
    #[error("session state poisoned")]
    Poisoned,
    #[error("invalid calendar date")]
    InvalidDate,
    #[error("temperature outside the recordable range")]
    InvalidBbt,
    #[error("import failed: {0}")]
    Import(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Holds the decrypted data and passphrase while unlocked. Every mutator
/// re-persists the snapshot before returning, so a single call is the unit
/// of durability. A UI shell owns one of these for the whole app lifetime.
pub struct Session {
    passphrase: Mutex<Option<String>>,
    data: Mutex<Option<AppData>>,
    /// Override of the data file location; `None` means the platform dir.
    data_file: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            passphrase: Mutex::new(None),
            data: Mutex::new(None),
            data_file: None,
        }
    }

    /// Keep the snapshot at an explicit path instead of the platform data
    /// dir.
    pub fn with_data_file(path: PathBuf) -> Self {
        Self {
            passphrase: Mutex::new(None),
            data: Mutex::new(None),
            data_file: Some(path),
        }
    }

    pub fn is_setup(&self) -> Result<bool, SessionError> {
        match &self.data_file {
            Some(path) => Ok(path.exists()),
            None => Ok(storage::data_exists()?),
        }
    }

    /// First-run initialization: persist an empty snapshot under the
    /// passphrase and leave the session unlocked.
    pub fn setup(&self, passphrase: String) -> Result<(), SessionError> {
        let data = AppData::default();
        self.write_snapshot(&passphrase, &data)?;

        *self.lock_passphrase()? = Some(passphrase);
        *self.lock_data()? = Some(data);
        info!("session initialized");
        Ok(())
    }

    /// Try to unlock with a passphrase. A failed decrypt reports `false`
    /// rather than an error so the caller can simply re-prompt.
    pub fn unlock(&self, passphrase: String) -> Result<bool, SessionError> {
        let loaded = match &self.data_file {
            Some(path) => storage::load_from(path, &passphrase),
            None => storage::load(&passphrase),
        };
        match loaded {
            Ok(data) => {
                *self.lock_passphrase()? = Some(passphrase);
                *self.lock_data()? = Some(data);
                info!("session unlocked");
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Lock the session: zeroize the passphrase and drop the data.
    pub fn lock(&self) {
        if let Ok(mut pass) = self.passphrase.lock() {
            if let Some(ref mut p) = *pass {
                p.zeroize();
            }
            *pass = None;
        }
        if let Ok(mut data) = self.data.lock() {
            *data = None;
        }
        info!("session locked");
    }

    /// Lock and delete the data file permanently.
    pub fn wipe_all(&self) -> Result<(), SessionError> {
        self.lock();
        match &self.data_file {
            Some(path) => {
                if path.exists() {
                    std::fs::remove_file(path).map_err(StorageError::Io)?;
                }
                Ok(())
            }
            None => Ok(storage::wipe()?),
        }
    }

    // ----- mutators -----

    pub fn toggle_period(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.mutate(|data| data.periods.toggle(date))
    }

    pub fn toggle_ovulation_mark(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.mutate(|data| data.ovulation_marks.toggle(date))
    }

    /// Record a temperature for the date. The value is rounded to two
    /// decimals and must fall in the recordable range.
    pub fn record_bbt(&self, date: NaiveDate, value: f64) -> Result<(), SessionError> {
        let value = records::sanitize_bbt(value).ok_or(SessionError::InvalidBbt)?;
        self.mutate(|data| records::upsert_bbt(&mut data.bbt, date, value))
    }

    pub fn remove_bbt(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.mutate(|data| records::remove_bbt(&mut data.bbt, date))
    }

    pub fn set_ovulation_test(
        &self,
        date: NaiveDate,
        result: OvulationTestResult,
    ) -> Result<(), SessionError> {
        self.mutate(|data| records::set_ovulation_test(&mut data.ovulation_tests, date, result))
    }

    pub fn toggle_timing(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.mutate(|data| records::toggle_timing(&mut data.timing, date))
    }

    pub fn toggle_symptom(&self, date: NaiveDate, symptom: SymptomType) -> Result<(), SessionError> {
        self.mutate(|data| records::toggle_symptom(&mut data.symptoms, date, symptom))
    }

    pub fn set_discharge(
        &self,
        date: NaiveDate,
        amount: Option<DischargeAmount>,
        texture: Option<DischargeTexture>,
    ) -> Result<(), SessionError> {
        self.mutate(|data| records::set_discharge(&mut data.discharge, date, amount, texture))
    }

    pub fn toggle_medication(&self, date: NaiveDate, name: &str) -> Result<(), SessionError> {
        self.mutate(|data| records::toggle_medication(&mut data.medications, date, name))
    }

    pub fn remove_medication(&self, date: NaiveDate, name: &str) -> Result<(), SessionError> {
        self.mutate(|data| records::remove_medication(&mut data.medications, date, name))
    }

    pub fn add_visit(
        &self,
        date: NaiveDate,
        content: &str,
        results: &str,
    ) -> Result<Option<Uuid>, SessionError> {
        self.mutate(|data| records::add_visit(&mut data.visits, date, content, results))
    }

    pub fn remove_visit(&self, id: Uuid) -> Result<(), SessionError> {
        self.mutate(|data| records::remove_visit(&mut data.visits, id))
    }

    pub fn update_settings(&self, update: SettingsUpdate) -> Result<(), SessionError> {
        self.mutate(|data| data.settings.apply(update))
    }

    pub fn apply_phase_lengths(
        &self,
        follicular: Option<u32>,
        luteal: Option<u32>,
        total: Option<u32>,
    ) -> Result<(), SessionError> {
        self.mutate(|data| data.settings.apply_phase_lengths(follicular, luteal, total))
    }

    // ----- queries -----

    pub fn settings(&self) -> Result<CycleSettings, SessionError> {
        self.read(|data| data.settings.clone())
    }

    pub fn phase_for(&self, today: NaiveDate) -> Result<Option<CyclePhase>, SessionError> {
        self.read(|data| project(&data.settings, &data.periods, today))
    }

    pub fn averages(&self) -> Result<CycleAverages, SessionError> {
        self.read(|data| cycle_averages(&data.periods, &data.ovulation_marks))
    }

    pub fn records_for_date(&self, date: NaiveDate) -> Result<DayRecords, SessionError> {
        self.read(|data| records::records_for_date(data, date))
    }

    pub fn day_view(&self, date: NaiveDate) -> Result<DayView, SessionError> {
        self.read(|data| build_day_view(data, date))
    }

    /// Everything the calendar needs for one month: a classified view per
    /// day, whether the month carries confirmed records, and the observed
    /// averages for the tuning panel.
    pub fn month_data(&self, year: i32, month: u32) -> Result<MonthData, SessionError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(SessionError::InvalidDate)?;
        self.read(|data| {
            let mut days = Vec::new();
            let mut date = first;
            while date.month() == month {
                days.push(build_day_view(data, date));
                date = add_days(date, 1);
            }
            MonthData {
                year,
                month,
                phase: project(&data.settings, &data.periods, first),
                has_confirmed_records: data.periods.has_record_in_month(year, month)
                    || data.ovulation_marks.has_mark_in_month(year, month),
                averages: cycle_averages(&data.periods, &data.ovulation_marks),
                days,
            }
        })
    }

    /// The dashboard payload for a given "today". `None` when no anchor is
    /// resolvable yet (nothing recorded, no settings anchor).
    pub fn today_summary(&self, today: NaiveDate) -> Result<Option<TodaySummary>, SessionError> {
        self.read(|data| {
            let phase = project(&data.settings, &data.periods, today)?;
            let day = cycle_day(today, &phase);
            let actual = actual_ovulation_in(&phase, &data.ovulation_marks);
            let ovulation = actual.unwrap_or(phase.ovulation_day);
            let after_ovulation = days_after_ovulation(today, ovulation);
            let kind = classify(today, &phase, actual);
            let luteal = data.settings.luteal_phase_days;

            Some(TodaySummary {
                date: today,
                cycle_day: day,
                days_after_ovulation: after_ovulation,
                ovulation_day: ovulation,
                ovulation_is_actual: actual.is_some(),
                kind,
                countdown: next_event(today, &phase, ovulation),
                status: status_blocks(day, kind, &phase, after_ovulation, luteal),
                timeline: phase_timeline(day, &phase, luteal),
                hormone_row: current_hormone_row(day),
                phase,
            })
        })
    }

    // ----- snapshot exchange -----

    /// The full snapshot as pretty-printed JSON, for backup files.
    pub fn export_json(&self) -> Result<String, SessionError> {
        self.read(|data| serde_json::to_string_pretty(data))?
            .map_err(|e| SessionError::Storage(e.into()))
    }

    /// Replace sections of the snapshot from a backup. Each collection is
    /// decoded entry by entry: a malformed entry is skipped, never fatal,
    /// and sections absent from the file are left untouched.
    pub fn import_json(&self, json: &str) -> Result<(), SessionError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SessionError::Import(e.to_string()))?;
        let obj = match value.as_object() {
            Some(o) => o.clone(),
            None => return Err(SessionError::Import("not a JSON object".into())),
        };

        self.mutate(move |data| {
            if let Some(v) = obj.get("settings") {
                if let Ok(settings) = serde_json::from_value::<CycleSettings>(v.clone()) {
                    data.settings = settings;
                }
            }
            if let Some(v) = obj.get("periods") {
                data.periods = PeriodStore::from_intervals(lenient_vec(v));
            }
            if let Some(v) = obj.get("ovulation_marks") {
                data.ovulation_marks = OvulationMarks::from_dates(lenient_vec(v));
            }
            if let Some(v) = obj.get("bbt") {
                data.bbt = lenient_vec(v);
                data.bbt.sort_by_key(|r| r.date);
            }
            if let Some(v) = obj.get("ovulation_tests") {
                data.ovulation_tests = lenient_vec(v);
            }
            if let Some(v) = obj.get("timing") {
                data.timing = lenient_vec(v);
            }
            if let Some(v) = obj.get("symptoms") {
                data.symptoms = lenient_vec(v);
            }
            if let Some(v) = obj.get("discharge") {
                data.discharge = lenient_vec(v);
            }
            if let Some(v) = obj.get("medications") {
                data.medications = lenient_vec(v);
            }
            if let Some(v) = obj.get("visits") {
                data.visits = lenient_vec(v);
                data.visits.sort_by(|a, b| b.date.cmp(&a.date));
            }
            info!("snapshot imported");
        })
    }

    // ----- internals -----

    fn lock_passphrase(&self) -> Result<MutexGuard<'_, Option<String>>, SessionError> {
        self.passphrase.lock().map_err(|_| SessionError::Poisoned)
    }

    fn lock_data(&self) -> Result<MutexGuard<'_, Option<AppData>>, SessionError> {
        self.data.lock().map_err(|_| SessionError::Poisoned)
    }

    fn read<T>(&self, f: impl FnOnce(&AppData) -> T) -> Result<T, SessionError> {
        let guard = self.lock_data()?;
        let data = guard.as_ref().ok_or(SessionError::Locked)?;
        Ok(f(data))
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut AppData) -> T) -> Result<T, SessionError> {
        let mut guard = self.lock_data()?;
        let data = guard.as_mut().ok_or(SessionError::Locked)?;
        let out = f(data);
        let snapshot = data.clone();
        drop(guard);

        let pass_guard = self.lock_passphrase()?;
        let passphrase = pass_guard.as_ref().ok_or(SessionError::Locked)?;
        self.write_snapshot(passphrase, &snapshot)?;
        Ok(out)
    }

    fn write_snapshot(&self, passphrase: &str, data: &AppData) -> Result<(), SessionError> {
        match &self.data_file {
            Some(path) => storage::save_to(path, passphrase, data)?,
            None => storage::save(passphrase, data)?,
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn lenient_vec<T: DeserializeOwned>(value: &serde_json::Value) -> Vec<T> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// A BBT reading positioned relative to recorded ovulation, for chart
/// coloring.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct BbtDisplay {
    pub value: f64,
    pub phase: BbtPhase,
}

/// One calendar cell: projection-derived classification plus everything
/// recorded on that date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayView {
    pub date: NaiveDate,
    pub cycle_day: Option<i64>,
    pub kind: Option<DayKind>,
    pub description: Option<&'static str>,
    pub period_recorded: bool,
    pub ovulation_recorded: bool,
    pub bbt: Option<BbtDisplay>,
    pub records: DayRecords,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub phase: Option<CyclePhase>,
    pub has_confirmed_records: bool,
    pub averages: CycleAverages,
    pub days: Vec<DayView>,
}

/// The dashboard payload: where today sits in the cycle and the narrative
/// around it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub cycle_day: i64,
    pub days_after_ovulation: i64,
    pub ovulation_day: NaiveDate,
    pub ovulation_is_actual: bool,
    pub kind: Option<DayKind>,
    pub countdown: Countdown,
    pub status: StatusBlocks,
    pub timeline: PhaseTimeline,
    pub hormone_row: Option<usize>,
    pub phase: CyclePhase,
}

fn build_day_view(data: &AppData, date: NaiveDate) -> DayView {
    let phase = project(&data.settings, &data.periods, date);
    let (day, kind, description) = match phase {
        Some(phase) => {
            let actual = actual_ovulation_in(&phase, &data.ovulation_marks);
            let day = cycle_day(date, &phase);
            let kind = classify(date, &phase, actual);
            let description = describe_day(day, kind, &phase, data.settings.luteal_phase_days);
            (Some(day), kind, Some(description))
        }
        None => (None, None, None),
    };

    DayView {
        date,
        cycle_day: day,
        kind,
        description,
        period_recorded: data.periods.is_in_period(date),
        ovulation_recorded: data.ovulation_marks.is_marked(date),
        bbt: data
            .bbt
            .iter()
            .find(|r| r.date == date)
            .map(|r| BbtDisplay {
                value: r.value,
                phase: records::bbt_phase(date, &data.ovulation_marks),
            }),
        records: records::records_for_date(data, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use crate::narrative::NextEvent;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn open_session(dir: &tempfile::TempDir) -> Session {
        let session = Session::with_data_file(dir.path().join("data.lunara"));
        session.setup("passphrase".into()).unwrap();
        session
    }

    #[test]
    fn setup_unlock_lock_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        assert!(session.is_setup().unwrap());

        session.toggle_period(d("2024-01-01")).unwrap();
        session.lock();
        assert!(matches!(
            session.toggle_period(d("2024-01-02")),
            Err(SessionError::Locked)
        ));

        assert!(!session.unlock("wrong".into()).unwrap());
        assert!(session.unlock("passphrase".into()).unwrap());
        // the toggle from before the lock survived the round-trip
        assert!(session.day_view(d("2024-01-01")).unwrap().period_recorded);
    }

    #[test]
    fn mutations_persist_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        session.toggle_period(d("2024-01-01")).unwrap();
        session.record_bbt(d("2024-01-02"), 36.61).unwrap();

        // a second session sees the data without an explicit save
        let other = Session::with_data_file(dir.path().join("data.lunara"));
        assert!(other.unlock("passphrase".into()).unwrap());
        assert_eq!(
            other.records_for_date(d("2024-01-02")).unwrap().bbt,
            Some(36.61)
        );
    }

    #[test]
    fn invalid_bbt_is_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        assert!(matches!(
            session.record_bbt(d("2024-01-02"), 34.2),
            Err(SessionError::InvalidBbt)
        ));
        assert_eq!(session.records_for_date(d("2024-01-02")).unwrap().bbt, None);
    }

    #[test]
    fn today_summary_none_without_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        assert!(session.today_summary(d("2024-01-20")).unwrap().is_none());
    }

    #[test]
    fn today_summary_reflects_actual_ovulation() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        session.toggle_period(d("2024-01-01")).unwrap();
        session.toggle_ovulation_mark(d("2024-01-16")).unwrap();

        let summary = session.today_summary(d("2024-01-20")).unwrap().unwrap();
        assert_eq!(summary.cycle_day, 20);
        assert_eq!(summary.ovulation_day, d("2024-01-16"));
        assert!(summary.ovulation_is_actual);
        assert_eq!(summary.days_after_ovulation, 4);
        assert_eq!(summary.countdown.event, NextEvent::NextPeriod);
        assert_eq!(summary.countdown.days, 9);
        assert_eq!(summary.status.situation.len(), 2);
    }

    #[test]
    fn month_view_classifies_each_day() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        session.toggle_period(d("2024-01-01")).unwrap();

        let month = session.month_data(2024, 1).unwrap();
        assert_eq!(month.days.len(), 31);
        assert!(month.has_confirmed_records);
        assert_eq!(month.days[0].kind, Some(DayKind::Period));
        assert_eq!(month.days[13].kind, Some(DayKind::Ovulation));
        assert_eq!(month.days[19].kind, None);
        // Jan 29 starts the projected next cycle
        assert_eq!(month.days[28].cycle_day, Some(1));
        assert_eq!(month.days[28].kind, Some(DayKind::Period));

        assert!(matches!(
            session.month_data(2024, 13),
            Err(SessionError::InvalidDate)
        ));
    }

    #[test]
    fn export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        session.toggle_period(d("2024-01-01")).unwrap();
        session.toggle_ovulation_mark(d("2024-01-14")).unwrap();
        let json = session.export_json().unwrap();

        let dir2 = tempfile::tempdir().unwrap();
        let other = open_session(&dir2);
        other.import_json(&json).unwrap();
        assert!(other.day_view(d("2024-01-01")).unwrap().period_recorded);
        assert!(other.day_view(d("2024-01-14")).unwrap().ovulation_recorded);
    }

    #[test]
    fn import_skips_malformed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir);
        let json = r#"{
            "periods": [
                {"start": "2024-01-01", "end": "2024-01-05"},
                {"start": "not a date", "end": "2024-01-10"},
                {"start": "2024-02-07", "end": "2024-02-01"}
            ],
            "bbt": [
                {"date": "2024-01-02", "value": 36.5},
                {"date": "2024-01-03"}
            ],
            "settings": {"cycle_length": 30}
        }"#;
        session.import_json(json).unwrap();

        assert!(session.day_view(d("2024-01-01")).unwrap().period_recorded);
        // malformed interval skipped, inverted interval dropped
        assert!(!session.day_view(d("2024-01-10")).unwrap().period_recorded);
        assert!(!session.day_view(d("2024-02-07")).unwrap().period_recorded);
        assert_eq!(session.records_for_date(d("2024-01-02")).unwrap().bbt, Some(36.5));
        assert_eq!(session.records_for_date(d("2024-01-03")).unwrap().bbt, None);
        // partial settings merge over defaults
        let settings = session.settings().unwrap();
        assert_eq!(settings.cycle_length, 30);
        assert_eq!(settings.period_length, 5);

        assert!(matches!(
            session.import_json("not json"),
            Err(SessionError::Import(_))
        ));
    }
}
