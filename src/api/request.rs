//! Request types for the pay log API.
//!
//! This module defines the query strings and JSON bodies accepted by the
//! endpoints, and their conversions into domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EntryKind, PayRate, WorkEntry};

/// Query string carrying an optional `date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    /// `YYYY-MM-DD`; local today when absent.
    #[serde(default)]
    pub date: Option<String>,
}

/// Query string for the view endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewQuery {
    /// `day`, `week`, `period` or `all`; `period` when absent.
    #[serde(default)]
    pub view: Option<String>,
    /// `YYYY-MM-DD`; local today when absent.
    #[serde(default)]
    pub date: Option<String>,
}

/// Query string identifying an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdQuery {
    /// The entry id.
    pub id: i64,
}

/// Body of `POST /entries` and `PUT /entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    /// Required for updates, ignored on create.
    #[serde(default)]
    pub id: Option<i64>,
    /// The category of work.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// The calendar date the work happened on.
    pub date: NaiveDate,
    /// Local wall-clock time.
    pub time: String,
    /// Hours flown.
    #[serde(default)]
    pub flight_hours: Option<f64>,
    /// Hours of ground instruction.
    #[serde(default)]
    pub ground_hours: Option<f64>,
    /// Hours in the simulator.
    #[serde(default)]
    pub sim_hours: Option<f64>,
    /// Hours of admin work.
    #[serde(default)]
    pub admin_hours: Option<f64>,
    /// The customer or student served.
    #[serde(default)]
    pub customer: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Number of rides.
    #[serde(default)]
    pub ride_count: Option<u32>,
    /// Whether the entry was a meeting.
    #[serde(default)]
    pub meeting: bool,
}

impl From<EntryRequest> for WorkEntry {
    fn from(req: EntryRequest) -> Self {
        WorkEntry {
            id: req.id.unwrap_or_default(),
            flight_hours: req.flight_hours,
            ground_hours: req.ground_hours,
            sim_hours: req.sim_hours,
            admin_hours: req.admin_hours,
            customer: req.customer,
            notes: req.notes,
            ride_count: req.ride_count,
            meeting: req.meeting,
            ..WorkEntry::new(req.kind, req.date, req.time)
        }
    }
}

/// Body of `POST /rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRequest {
    /// First date the rates apply.
    pub effective_date: NaiveDate,
    /// Hourly rate for flight, ground and simulator hours.
    pub cfi_rate: f64,
    /// Hourly rate for admin hours.
    pub admin_rate: f64,
}

impl From<RateRequest> for PayRate {
    fn from(req: RateRequest) -> Self {
        PayRate::new(req.effective_date, req.cfi_rate, req.admin_rate)
    }
}

/// Body of `POST /periods/{id}/actual-pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualPayRequest {
    /// Gross pay on the paycheck.
    pub gross_actual: f64,
    /// Net pay on the paycheck.
    pub net_actual: f64,
}
