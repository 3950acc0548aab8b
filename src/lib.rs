//! lunara — a privacy-first cycle phase engine.
//!
//! Tracks a menstrual/fertility cycle from self-reported events (period day
//! toggles, basal body temperature, ovulation tests, timing, symptoms) and
//! derives, for any queried date, the cycle phase it falls in, the day
//! number within the cycle, and a short description of hormonal state.
//!
//! The core is pure: the [`periods`] interval store and [`ovulation`] mark
//! set hold the recorded history, [`projection`] rolls the configured cycle
//! model forward from the most recent applicable anchor, [`classify`] and
//! [`narrative`] turn a date plus that projection into a classification and
//! fixed-bucket narrative, and [`stats`] derives observed averages for
//! tuning the settings. [`session`] wraps all of it behind a lock/unlock
//! facade with encrypted at-rest persistence ([`crypto`], [`storage`]).
//!
//! Outputs are descriptive estimates for display, not diagnoses.

pub mod classify;
pub mod crypto;
pub mod dates;
pub mod models;
pub mod narrative;
pub mod ovulation;
pub mod periods;
pub mod projection;
pub mod records;
pub mod session;
pub mod stats;
pub mod storage;

pub use models::{
    AppData, BbtRecord, CycleAverages, CyclePhase, CycleSettings, DayKind, PeriodInterval,
    SettingsUpdate,
};
pub use ovulation::OvulationMarks;
pub use periods::PeriodStore;
pub use session::{Session, SessionError};
