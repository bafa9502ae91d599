//! Effective-dated pay rates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Rate served when no row is in force for a date.
///
/// Far above any real wage so that a missing rate table shows up as an
/// obviously wrong gross figure instead of a silent zero.
pub const UNCONFIGURED_RATE: f64 = 9999.99;

/// Hourly rates in force from `effective_date` until a later row supersedes them.
///
/// # Example
///
/// ```
/// use paylog_engine::models::{PayRate, UNCONFIGURED_RATE};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let rate = PayRate::unconfigured(date);
/// assert!(rate.is_unconfigured());
/// assert_eq!(rate.cfi_rate, UNCONFIGURED_RATE);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRate {
    /// First date the rate applies to.
    pub effective_date: NaiveDate,
    /// Hourly rate for flight, ground and simulator instruction.
    pub cfi_rate: f64,
    /// Hourly rate for admin work, including ride hours.
    pub admin_rate: f64,
    /// When the row was written; `None` for the unconfigured sentinel.
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

impl PayRate {
    /// Creates a rate row effective from `effective_date`.
    pub fn new(effective_date: NaiveDate, cfi_rate: f64, admin_rate: f64) -> Self {
        Self {
            effective_date,
            cfi_rate,
            admin_rate,
            last_updated: None,
        }
    }

    /// The sentinel rate returned when the table has nothing in force on `date`.
    pub fn unconfigured(date: NaiveDate) -> Self {
        Self::new(date, UNCONFIGURED_RATE, UNCONFIGURED_RATE)
    }

    /// Returns true for the sentinel produced by [`PayRate::unconfigured`].
    pub fn is_unconfigured(&self) -> bool {
        self.cfi_rate == UNCONFIGURED_RATE && self.admin_rate == UNCONFIGURED_RATE
    }
}
