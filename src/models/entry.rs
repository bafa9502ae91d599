//! Work entry model.
//!
//! A [`WorkEntry`] is one logged block of work: a flight lesson, ground
//! instruction, a simulator session, admin time or anything else. The
//! engine reads entries in date ranges and keeps their `owning_period_id`
//! pointing at the pay period that contains their date.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calculation::check_calendar_range;
use crate::error::{EngineError, EngineResult};

/// The category of a work entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Dual instruction in the aircraft.
    Flight,
    /// Ground instruction.
    Ground,
    /// Administrative work, optionally counted in rides.
    Admin,
    /// Simulator instruction.
    Sim,
    /// Anything else; no fields are cleared.
    Misc,
}

impl EntryKind {
    /// Returns the string stored in the database for this kind.
    pub fn to_db_str(self) -> &'static str {
        match self {
            EntryKind::Flight => "flight",
            EntryKind::Ground => "ground",
            EntryKind::Admin => "admin",
            EntryKind::Sim => "sim",
            EntryKind::Misc => "misc",
        }
    }

    /// Parses the database representation of a kind.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "flight" => Some(EntryKind::Flight),
            "ground" => Some(EntryKind::Ground),
            "admin" => Some(EntryKind::Admin),
            "sim" => Some(EntryKind::Sim),
            "misc" => Some(EntryKind::Misc),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// A single logged block of work.
///
/// Optional hour fields are nullable: absence is not the same as zero when
/// stored, but aggregation treats a missing value as zero.
///
/// # Example
///
/// ```
/// use paylog_engine::models::{EntryKind, WorkEntry};
/// use chrono::NaiveDate;
///
/// let entry = WorkEntry {
///     flight_hours: Some(1.5),
///     ..WorkEntry::new(EntryKind::Flight, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(), "09:30")
/// };
/// assert_eq!(entry.flight_hours, Some(1.5));
/// assert!(entry.owning_period_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    /// Store-assigned identifier; zero for an entry that has not been saved.
    #[serde(default)]
    pub id: i64,
    /// The category of work.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// The calendar date the work happened on.
    pub date: NaiveDate,
    /// Local wall-clock time, `HH:MM` or `HH:MM:SS`.
    pub time: String,
    /// Hours flown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_hours: Option<f64>,
    /// Hours of ground instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_hours: Option<f64>,
    /// Hours in the simulator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_hours: Option<f64>,
    /// Hours of admin work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_hours: Option<f64>,
    /// The customer or student served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Number of rides logged instead of admin hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ride_count: Option<u32>,
    /// Whether the entry was a meeting.
    #[serde(default)]
    pub meeting: bool,
    /// The pay period whose range contains `date`, once one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owning_period_id: Option<i64>,
}

impl WorkEntry {
    /// Creates an unsaved entry with every optional field empty.
    pub fn new(kind: EntryKind, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind,
            date,
            time: time.into(),
            flight_hours: None,
            ground_hours: None,
            sim_hours: None,
            admin_hours: None,
            customer: None,
            notes: None,
            ride_count: None,
            meeting: false,
            owning_period_id: None,
        }
    }

    /// Returns true for an admin entry whose hours come from a ride count.
    pub fn counts_rides(&self) -> bool {
        self.kind == EntryKind::Admin && self.ride_count.is_some_and(|rides| rides > 0)
    }

    /// Clears the fields that do not apply to this entry's kind.
    ///
    /// Flight and ground entries drop simulator, admin and ride data; sim
    /// entries drop flight, admin and ride data; an admin entry counted in
    /// rides drops its admin hours and customer. Misc entries are untouched.
    pub fn normalized(mut self) -> Self {
        match self.kind {
            EntryKind::Flight | EntryKind::Ground => {
                self.sim_hours = None;
                self.admin_hours = None;
                self.ride_count = None;
            }
            EntryKind::Sim => {
                self.flight_hours = None;
                self.admin_hours = None;
                self.ride_count = None;
            }
            EntryKind::Admin => {
                if self.counts_rides() {
                    self.admin_hours = None;
                    self.customer = None;
                }
            }
            EntryKind::Misc => {}
        }
        self
    }

    /// Rejects entries with negative or non-finite hours, a bad time, or a
    /// date outside the four-digit year range.
    pub fn validate(&self) -> EngineResult<()> {
        check_calendar_range(self.date)?;

        let hours = [
            ("flight_hours", self.flight_hours),
            ("ground_hours", self.ground_hours),
            ("sim_hours", self.sim_hours),
            ("admin_hours", self.admin_hours),
        ];
        for (field, value) in hours {
            if let Some(v) = value.filter(|v| !v.is_finite() || *v < 0.0) {
                return Err(EngineError::InvalidEntry {
                    message: format!("{} must be a non-negative number, got {}", field, v),
                });
            }
        }

        let time_ok = NaiveTime::parse_from_str(&self.time, "%H:%M").is_ok()
            || NaiveTime::parse_from_str(&self.time, "%H:%M:%S").is_ok();
        if !time_ok {
            return Err(EngineError::InvalidEntry {
                message: format!("time '{}' is not HH:MM", self.time),
            });
        }

        Ok(())
    }
}
