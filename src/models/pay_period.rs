//! Pay period models.
//!
//! This module contains the computed [`PeriodBounds`] of a bi-weekly window
//! and the persisted [`PayPeriod`] row built from them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether a persisted period is the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// The single period flagged active.
    Current,
    /// Every other period.
    Past,
}

impl PeriodStatus {
    /// Returns the string stored in the database for this status.
    pub fn to_db_str(self) -> &'static str {
        match self {
            PeriodStatus::Current => "current",
            PeriodStatus::Past => "past",
        }
    }

    /// Parses the database representation of a status.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "current" => Some(PeriodStatus::Current),
            "past" => Some(PeriodStatus::Past),
            _ => None,
        }
    }
}

/// The canonical window a date belongs to, before anything is persisted.
///
/// `index` counts 14-day periods from the anchor Monday and is negative for
/// windows before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodBounds {
    /// Number of whole periods between the anchor and `start`.
    pub index: i64,
    /// First day of the period (a Monday when the anchor is one).
    pub start: NaiveDate,
    /// Last day of the period, `start + 13 days`.
    pub end: NaiveDate,
    /// The day the period is paid, `end + 3 days`.
    pub pay_date: NaiveDate,
}

impl PeriodBounds {
    /// Checks if a date falls within the bounds, inclusive on both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// A persisted pay period.
///
/// # Example
///
/// ```
/// use paylog_engine::models::{PayPeriod, PeriodStatus};
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     id: 1,
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 1, 19).unwrap(),
///     pay_date: NaiveDate::from_ymd_opt(2025, 1, 22).unwrap(),
///     status: PeriodStatus::Current,
///     gross_earned: 0.0,
///     gross_actual: 0.0,
///     net_actual: 0.0,
///     last_updated: None,
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Store-assigned identifier.
    pub id: i64,
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// The date the period is paid.
    pub pay_date: NaiveDate,
    /// Whether this is the current period.
    pub status: PeriodStatus,
    /// Gross pay computed from logged entries at the last refresh.
    pub gross_earned: f64,
    /// Gross pay actually received.
    pub gross_actual: f64,
    /// Net pay actually received.
    pub net_actual: f64,
    /// When the row was last written.
    pub last_updated: Option<NaiveDateTime>,
}

impl PayPeriod {
    /// Checks if a given date falls within this pay period, inclusive.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true when this period is flagged current.
    pub fn is_current(&self) -> bool {
        self.status == PeriodStatus::Current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn create_period() -> PayPeriod {
        PayPeriod {
            id: 3,
            start_date: make_date("2025-01-20"),
            end_date: make_date("2025-02-02"),
            pay_date: make_date("2025-02-05"),
            status: PeriodStatus::Past,
            gross_earned: 0.0,
            gross_actual: 0.0,
            net_actual: 0.0,
            last_updated: None,
        }
    }

    #[test]
    fn test_contains_date_on_edges() {
        let period = create_period();
        assert!(period.contains_date(period.start_date));
        assert!(period.contains_date(period.end_date));
        assert!(!period.contains_date(make_date("2025-01-19")));
        assert!(!period.contains_date(make_date("2025-02-03")));
    }

    #[test]
    fn test_is_current() {
        let mut period = create_period();
        assert!(!period.is_current());
        period.status = PeriodStatus::Current;
        assert!(period.is_current());
    }

    #[test]
    fn test_bounds_contains_date() {
        let bounds = PeriodBounds {
            index: 0,
            start: make_date("2025-01-06"),
            end: make_date("2025-01-19"),
            pay_date: make_date("2025-01-22"),
        };
        assert!(bounds.contains_date(make_date("2025-01-12")));
        assert!(!bounds.contains_date(make_date("2025-01-22")));
    }

    #[test]
    fn test_status_db_strings() {
        assert_eq!(PeriodStatus::from_db_str("current"), Some(PeriodStatus::Current));
        assert_eq!(PeriodStatus::from_db_str("past"), Some(PeriodStatus::Past));
        assert_eq!(PeriodStatus::from_db_str("future"), None);
        assert_eq!(PeriodStatus::Past.to_db_str(), "past");
    }

    #[test]
    fn test_serialize_pay_period() {
        let period = create_period();
        let json = serde_json::to_string(&period).unwrap();
        assert!(json.contains("\"start_date\":\"2025-01-20\""));
        assert!(json.contains("\"pay_date\":\"2025-02-05\""));
        assert!(json.contains("\"status\":\"past\""));
    }
}
