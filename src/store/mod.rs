//! Persistence seams for the pay log engine.
//!
//! The engine talks to storage only through the three traits here, split by
//! table so that period resolution can be exercised against a store that
//! misbehaves on purpose. [`SqliteStore`] is the embedded implementation.

mod sqlite;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{HourSums, PayPeriod, PayRate, PeriodBounds, WorkEntry};

pub use sqlite::SqliteStore;

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A period with the same start and end dates already exists.
    #[error("Pay period {start}..{end} already exists")]
    UniqueViolation {
        /// Start date of the rejected period.
        start: NaiveDate,
        /// End date of the rejected period.
        end: NaiveDate,
    },

    /// A period referenced by id does not exist.
    #[error("Pay period {id} not found")]
    PeriodNotFound {
        /// The missing period id.
        id: i64,
    },

    /// A stored value could not be decoded.
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow {
        /// The table the row came from.
        table: &'static str,
        /// What failed to decode.
        message: String,
    },

    /// The database driver failed.
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the pay period table.
///
/// Implementations must apply [`promote_period`](PeriodStore::promote_period)
/// and [`insert_current_period`](PeriodStore::insert_current_period) as single
/// atomic units so no reader sees zero or several current periods, and must
/// report a duplicate `(start_date, end_date)` as
/// [`StoreError::UniqueViolation`].
pub trait PeriodStore {
    /// The period flagged current whose range contains `date`.
    fn current_period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayPeriod>>;

    /// Any period whose range contains `date`, newest start first.
    fn period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayPeriod>>;

    /// The period with exactly these bounds.
    fn period_with_bounds(&self, start: NaiveDate, end: NaiveDate)
    -> StoreResult<Option<PayPeriod>>;

    /// The period with the given id.
    fn period_by_id(&self, id: i64) -> StoreResult<Option<PayPeriod>>;

    /// Every period, oldest first.
    fn periods(&self) -> StoreResult<Vec<PayPeriod>>;

    /// Demotes every other period to past and marks `id` current.
    fn promote_period(&mut self, id: i64) -> StoreResult<PayPeriod>;

    /// Demotes every period to past and inserts `bounds` as the current one.
    ///
    /// Entries already stored within the new range are attached to it.
    fn insert_current_period(&mut self, bounds: &PeriodBounds) -> StoreResult<PayPeriod>;

    /// Stores the computed gross for a period.
    fn set_gross_earned(&mut self, id: i64, gross_earned: f64) -> StoreResult<PayPeriod>;

    /// Stores the gross and net pay actually received for a period.
    fn set_actual_pay(&mut self, id: i64, gross_actual: f64, net_actual: f64)
    -> StoreResult<PayPeriod>;
}

/// Access to the effective-dated rate table.
pub trait RateStore {
    /// The row with the greatest effective date on or before `date`.
    fn rate_in_force(&self, date: NaiveDate) -> StoreResult<Option<PayRate>>;

    /// The row with the greatest effective date overall.
    fn latest_rate(&self) -> StoreResult<Option<PayRate>>;

    /// Appends a rate row.
    fn insert_rate(&mut self, rate: &PayRate) -> StoreResult<PayRate>;
}

/// Access to logged work entries.
pub trait EntryStore {
    /// Entries dated `start..=end`, newest first.
    fn entries_between(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<WorkEntry>>;

    /// Every entry, newest first.
    fn all_entries(&self) -> StoreResult<Vec<WorkEntry>>;

    /// Column sums over entries dated `start..=end`.
    fn hour_sums_between(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<HourSums>;

    /// The entry with the given id.
    fn entry_by_id(&self, id: i64) -> StoreResult<Option<WorkEntry>>;

    /// Inserts an entry and returns it with its new id.
    fn insert_entry(&mut self, entry: &WorkEntry) -> StoreResult<WorkEntry>;

    /// Overwrites an entry by id. Returns false when no row matched.
    fn update_entry(&mut self, entry: &WorkEntry) -> StoreResult<bool>;

    /// Deletes an entry by id. Returns false when no row matched.
    fn delete_entry(&mut self, id: i64) -> StoreResult<bool>;
}

/// Everything the ledger needs from a store.
pub trait PayStore: PeriodStore + RateStore + EntryStore {}

impl<T: PeriodStore + RateStore + EntryStore> PayStore for T {}
