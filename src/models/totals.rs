//! Earnings totals produced by the aggregator.
//!
//! [`Totals`] carries every intermediate of the pay computation so callers
//! can render a full breakdown without recomputing anything.

use serde::{Deserialize, Serialize};

/// Raw column sums over a date window, as a SQL `SUM(...)` would return them.
///
/// `admin_hours` here excludes ride hours; `rides` is the summed ride count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourSums {
    /// Sum of flight hours.
    pub flight_hours: f64,
    /// Sum of ground hours.
    pub ground_hours: f64,
    /// Sum of simulator hours.
    pub sim_hours: f64,
    /// Sum of recorded admin hours.
    pub admin_hours: f64,
    /// Sum of ride counts.
    pub rides: i64,
}

/// The full earnings breakdown for a set of entries.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::aggregate;
/// use paylog_engine::models::{EntryKind, PayRate, WorkEntry};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
/// let entries = vec![WorkEntry {
///     flight_hours: Some(2.0),
///     ..WorkEntry::new(EntryKind::Flight, date, "09:00")
/// }];
/// let totals = aggregate(&entries, &PayRate::new(date, 26.50, 13.75));
/// assert_eq!(totals.cfi_pay, 53.0);
/// assert_eq!(totals.total_gross, 53.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// The persisted period these totals belong to, when computed for one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_id: Option<i64>,
    /// Flight hours.
    pub flight_hours: f64,
    /// Ground hours.
    pub ground_hours: f64,
    /// Simulator hours.
    pub sim_hours: f64,
    /// Admin hours, ride hours included.
    pub admin_hours: f64,
    /// Admin hours derived from rides.
    pub ride_hours: f64,
    /// Number of rides counted.
    pub total_rides: i64,
    /// Flight + ground + simulator hours.
    pub cfi_hours: f64,
    /// CFI hours + admin hours.
    pub total_hours: f64,
    /// The CFI rate used.
    pub cfi_rate: f64,
    /// The admin rate used.
    pub admin_rate: f64,
    /// CFI hours at the CFI rate.
    pub cfi_pay: f64,
    /// Admin hours at the admin rate.
    pub admin_pay: f64,
    /// CFI pay + admin pay.
    pub total_gross: f64,
}
