//! Effective-dated rate resolution.
//!
//! The rate in force on a date is the stored row with the greatest
//! `effective_date` on or before it. When nothing qualifies, the resolver
//! returns [`PayRate::unconfigured`] rather than an error so that every
//! downstream total is computed and visibly wrong.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::EngineResult;
use crate::models::PayRate;
use crate::store::RateStore;

/// Resolves the pay rate in force on `date`.
///
/// Errors only when the store itself fails; an empty or too-new rate table
/// yields the sentinel rate.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::rates_for;
/// use paylog_engine::store::SqliteStore;
/// use chrono::NaiveDate;
///
/// let store = SqliteStore::open_in_memory()?;
/// let rate = rates_for(&store, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())?;
/// assert!(rate.is_unconfigured());
/// # Ok::<(), paylog_engine::error::EngineError>(())
/// ```
pub fn rates_for<S: RateStore + ?Sized>(store: &S, date: NaiveDate) -> EngineResult<PayRate> {
    match store.rate_in_force(date)? {
        Some(rate) => Ok(rate),
        None => {
            warn!(date = %date, "No pay rate in force, using unconfigured sentinel rate");
            Ok(PayRate::unconfigured(date))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNCONFIGURED_RATE;
    use crate::store::SqliteStore;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn store_with_rates(rates: &[(&str, f64, f64)]) -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for (date, cfi, admin) in rates {
            store
                .insert_rate(&PayRate::new(make_date(date), *cfi, *admin))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_empty_table_returns_sentinel() {
        let store = store_with_rates(&[]);
        let rate = rates_for(&store, make_date("2025-03-01")).unwrap();
        assert_eq!(rate.cfi_rate, UNCONFIGURED_RATE);
        assert_eq!(rate.admin_rate, UNCONFIGURED_RATE);
        assert_eq!(rate.effective_date, make_date("2025-03-01"));
    }

    #[test]
    fn test_all_rates_in_future_returns_sentinel() {
        let store = store_with_rates(&[("2025-06-01", 26.50, 13.75)]);
        let rate = rates_for(&store, make_date("2025-05-31")).unwrap();
        assert!(rate.is_unconfigured());
    }

    #[test]
    fn test_rate_applies_from_effective_date() {
        let store = store_with_rates(&[("2025-01-01", 26.50, 13.75)]);
        let rate = rates_for(&store, make_date("2025-01-01")).unwrap();
        assert_eq!(rate.cfi_rate, 26.50);
        assert_eq!(rate.admin_rate, 13.75);
    }

    #[test]
    fn test_newer_rate_supersedes_going_forward_only() {
        let store = store_with_rates(&[
            ("2025-01-01", 26.50, 13.75),
            ("2025-07-01", 28.00, 14.50),
        ]);

        let before = rates_for(&store, make_date("2025-06-30")).unwrap();
        let on = rates_for(&store, make_date("2025-07-01")).unwrap();
        let after = rates_for(&store, make_date("2025-12-31")).unwrap();

        assert_eq!(before.cfi_rate, 26.50);
        assert_eq!(on.cfi_rate, 28.00);
        assert_eq!(after.admin_rate, 14.50);
    }

    #[test]
    fn test_same_row_gives_identical_results() {
        let store = store_with_rates(&[("2025-01-01", 26.50, 13.75)]);
        let first = rates_for(&store, make_date("2025-02-01")).unwrap();
        let second = rates_for(&store, make_date("2025-03-01")).unwrap();
        assert_eq!(first, second);
    }
}
