//! Core data models for the pay log engine.
//!
//! This module contains all the domain models used throughout the engine.

mod entry;
mod pay_period;
mod pay_rate;
mod totals;

pub use entry::{EntryKind, WorkEntry};
pub use pay_period::{PayPeriod, PeriodBounds, PeriodStatus};
pub use pay_rate::{PayRate, UNCONFIGURED_RATE};
pub use totals::{HourSums, Totals};
