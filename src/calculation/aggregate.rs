//! Earnings aggregation.
//!
//! Two ride-hour policies live here and are kept apart on purpose:
//!
//! - [`aggregate`] walks entries one by one. An admin entry with a positive
//!   ride count contributes `rides * 0.2` hours *instead of* its recorded
//!   admin hours.
//! - [`aggregate_sums`] works from column sums over a period. Ride hours
//!   from the summed ride count are *added* to the summed admin hours.

use crate::models::{HourSums, PayRate, Totals, WorkEntry};

/// Admin hours credited per ride.
pub const RIDE_HOURS_PER_RIDE: f64 = 0.2;

/// Converts a ride count into admin hours.
pub fn ride_hours(rides: i64) -> f64 {
    rides as f64 * RIDE_HOURS_PER_RIDE
}

/// Aggregates entries one at a time, substituting ride hours for admin hours.
///
/// Rides recorded on non-admin entries are ignored, as are the admin hours of
/// an admin entry that carries rides. A sentinel rate flows through
/// unchanged, producing a large but numeric gross.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::aggregate;
/// use paylog_engine::models::{EntryKind, PayRate, WorkEntry};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
/// let rides = WorkEntry {
///     admin_hours: Some(3.0),
///     ride_count: Some(5),
///     ..WorkEntry::new(EntryKind::Admin, date, "13:00")
/// };
/// let totals = aggregate(&[rides], &PayRate::new(date, 26.50, 13.75));
/// assert_eq!(totals.admin_hours, 1.0);
/// assert_eq!(totals.total_rides, 5);
/// ```
pub fn aggregate(entries: &[WorkEntry], rate: &PayRate) -> Totals {
    let mut flight = 0.0;
    let mut ground = 0.0;
    let mut sim = 0.0;
    let mut admin = 0.0;
    let mut rides: i64 = 0;

    for entry in entries {
        flight += entry.flight_hours.unwrap_or(0.0);
        ground += entry.ground_hours.unwrap_or(0.0);
        sim += entry.sim_hours.unwrap_or(0.0);

        if entry.counts_rides() {
            let count = i64::from(entry.ride_count.unwrap_or(0));
            rides += count;
            admin += ride_hours(count);
        } else {
            admin += entry.admin_hours.unwrap_or(0.0);
        }
    }

    build_totals(flight, ground, sim, admin, rides, rate)
}

/// Aggregates period-level column sums, adding ride hours to admin hours.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::aggregate_sums;
/// use paylog_engine::models::{HourSums, PayRate};
/// use chrono::NaiveDate;
///
/// let sums = HourSums { admin_hours: 2.0, rides: 5, ..HourSums::default() };
/// let rate = PayRate::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), 26.50, 10.0);
/// let totals = aggregate_sums(&sums, &rate);
/// assert_eq!(totals.admin_hours, 3.0);
/// assert_eq!(totals.admin_pay, 30.0);
/// ```
pub fn aggregate_sums(sums: &HourSums, rate: &PayRate) -> Totals {
    let admin = sums.admin_hours + ride_hours(sums.rides);
    build_totals(
        sums.flight_hours,
        sums.ground_hours,
        sums.sim_hours,
        admin,
        sums.rides,
        rate,
    )
}

fn build_totals(
    flight: f64,
    ground: f64,
    sim: f64,
    admin_with_rides: f64,
    rides: i64,
    rate: &PayRate,
) -> Totals {
    let cfi_hours = flight + ground + sim;
    let cfi_pay = cfi_hours * rate.cfi_rate;
    let admin_pay = admin_with_rides * rate.admin_rate;

    Totals {
        period_id: None,
        flight_hours: flight,
        ground_hours: ground,
        sim_hours: sim,
        admin_hours: admin_with_rides,
        ride_hours: ride_hours(rides),
        total_rides: rides,
        cfi_hours,
        total_hours: cfi_hours + admin_with_rides,
        cfi_rate: rate.cfi_rate,
        admin_rate: rate.admin_rate,
        cfi_pay,
        admin_pay,
        total_gross: cfi_pay + admin_pay,
    }
}
