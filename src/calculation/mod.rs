//! Calculation logic for the pay log engine.
//!
//! This module contains the pure period boundary calculation, rate
//! resolution against the rate table, the two earnings aggregation paths,
//! and the date windows used for entry views.

mod aggregate;
mod boundaries;
mod rates;
mod views;

pub use aggregate::{RIDE_HOURS_PER_RIDE, aggregate, aggregate_sums, ride_hours};
pub use boundaries::{
    MAX_CALENDAR_YEAR, PAY_DATE_OFFSET_DAYS, PERIOD_LENGTH_DAYS, boundaries_for,
    check_calendar_range, default_anchor, parse_calendar_date, week_start,
};
pub use rates::rates_for;
pub use views::{DateWindow, ViewKind, view_window};
