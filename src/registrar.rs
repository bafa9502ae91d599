//! Period registration and the single-current invariant.
//!
//! Periods are created lazily the first time a date outside every stored
//! period is resolved. Creation races are expected: when a concurrent writer
//! inserts the same window first, the store reports a uniqueness violation
//! and the registrar adopts the row that won.

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::calculation::{boundaries_for, check_calendar_range};
use crate::error::{EngineError, EngineResult};
use crate::models::PayPeriod;
use crate::store::{PeriodStore, StoreError};

/// Returns the persisted period owning `date`, creating it if needed.
///
/// 1. A current period containing `date` is returned unchanged.
/// 2. Any other period containing `date` is promoted to current.
/// 3. Otherwise the canonical window is inserted as the new current period.
/// 4. If that insert loses a race, the winning row is read back and promoted.
///
/// After a successful call exactly one stored period is current. A window
/// whose pay date leaves the four-digit year range is rejected before
/// anything is written.
pub fn resolve_period<S: PeriodStore + ?Sized>(
    store: &mut S,
    anchor: NaiveDate,
    date: NaiveDate,
) -> EngineResult<PayPeriod> {
    if let Some(period) = store.current_period_containing(date)? {
        return Ok(period);
    }

    if let Some(period) = store.period_containing(date)? {
        debug!(period_id = period.id, date = %date, "Promoting existing period to current");
        return Ok(store.promote_period(period.id)?);
    }

    let bounds = boundaries_for(anchor, date)?;
    check_calendar_range(bounds.start)?;
    check_calendar_range(bounds.pay_date)?;
    match store.insert_current_period(&bounds) {
        Ok(period) => {
            info!(
                period_id = period.id,
                start = %period.start_date,
                end = %period.end_date,
                index = bounds.index,
                "Created pay period"
            );
            Ok(period)
        }
        Err(StoreError::UniqueViolation { start, end }) => {
            warn!(start = %start, end = %end, "Pay period created concurrently, adopting existing row");
            let existing = match store.period_with_bounds(start, end) {
                Ok(Some(period)) => period,
                Ok(None) => {
                    error!(start = %start, end = %end, "Uniqueness conflict but no matching period");
                    return Err(EngineError::Consistency {
                        message: format!(
                            "insert of {}..{} conflicted but no such period exists",
                            start, end
                        ),
                    });
                }
                Err(e) => {
                    error!(start = %start, end = %end, error = %e, "Re-read after uniqueness conflict failed");
                    return Err(EngineError::Consistency {
                        message: format!("re-read of {}..{} failed: {}", start, end, e),
                    });
                }
            };
            Ok(store.promote_period(existing.id)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Makes the period containing `today` the current one, if it exists.
///
/// Never creates a period. Returns the promoted period, or `None` when no
/// stored period contains `today`.
pub fn reconcile_current<S: PeriodStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> EngineResult<Option<PayPeriod>> {
    match store.period_containing(today)? {
        Some(period) => {
            // Promote even when already current; another row may still carry the flag.
            if !period.is_current() {
                info!(period_id = period.id, today = %today, "Reconciled current pay period");
            }
            Ok(Some(store.promote_period(period.id)?))
        }
        None => {
            debug!(today = %today, "No pay period contains today, nothing to reconcile");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::default_anchor;
    use crate::models::PeriodBounds;
    use crate::store::{SqliteStore, StoreResult};

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn current_ids(store: &SqliteStore) -> Vec<i64> {
        store
            .periods()
            .unwrap()
            .into_iter()
            .filter(|p| p.is_current())
            .map(|p| p.id)
            .collect()
    }

    /// Hides existing periods from containment lookups, the way a competing
    /// writer's row is invisible to a read that happened just before it.
    struct StaleReads<S> {
        inner: S,
        hide_bounds_lookup: bool,
    }

    impl<S: PeriodStore> PeriodStore for StaleReads<S> {
        fn current_period_containing(&self, _date: NaiveDate) -> StoreResult<Option<PayPeriod>> {
            Ok(None)
        }

        fn period_containing(&self, _date: NaiveDate) -> StoreResult<Option<PayPeriod>> {
            Ok(None)
        }

        fn period_with_bounds(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> StoreResult<Option<PayPeriod>> {
            if self.hide_bounds_lookup {
                return Ok(None);
            }
            self.inner.period_with_bounds(start, end)
        }

        fn period_by_id(&self, id: i64) -> StoreResult<Option<PayPeriod>> {
            self.inner.period_by_id(id)
        }

        fn periods(&self) -> StoreResult<Vec<PayPeriod>> {
            self.inner.periods()
        }

        fn promote_period(&mut self, id: i64) -> StoreResult<PayPeriod> {
            self.inner.promote_period(id)
        }

        fn insert_current_period(&mut self, bounds: &PeriodBounds) -> StoreResult<PayPeriod> {
            self.inner.insert_current_period(bounds)
        }

        fn set_gross_earned(&mut self, id: i64, gross_earned: f64) -> StoreResult<PayPeriod> {
            self.inner.set_gross_earned(id, gross_earned)
        }

        fn set_actual_pay(
            &mut self,
            id: i64,
            gross_actual: f64,
            net_actual: f64,
        ) -> StoreResult<PayPeriod> {
            self.inner.set_actual_pay(id, gross_actual, net_actual)
        }
    }

    #[test]
    fn test_first_reference_creates_current_period() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let period = resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap();

        assert_eq!(period.start_date, make_date("2025-01-06"));
        assert_eq!(period.end_date, make_date("2025-01-19"));
        assert_eq!(period.pay_date, make_date("2025-01-22"));
        assert!(period.is_current());
        assert_eq!(current_ids(&store), vec![period.id]);
    }

    #[test]
    fn test_current_period_returned_unchanged() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap();
        let again = resolve_period(&mut store, default_anchor(), make_date("2025-01-19")).unwrap();

        assert_eq!(first, again);
        assert_eq!(store.periods().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_past_period_is_promoted() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let old = resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap();
        let new = resolve_period(&mut store, default_anchor(), make_date("2025-01-21")).unwrap();
        assert_ne!(old.id, new.id);
        assert_eq!(current_ids(&store), vec![new.id]);

        let back = resolve_period(&mut store, default_anchor(), make_date("2025-01-10")).unwrap();
        assert_eq!(back.id, old.id);
        assert!(back.is_current());
        assert_eq!(current_ids(&store), vec![old.id]);
        assert_eq!(store.periods().unwrap().len(), 2);
    }

    #[test]
    fn test_date_before_anchor_creates_negative_index_period() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let period = resolve_period(&mut store, default_anchor(), make_date("2024-12-25")).unwrap();
        assert_eq!(period.start_date, make_date("2024-12-23"));
        assert_eq!(period.end_date, make_date("2025-01-05"));
    }

    #[test]
    fn test_exactly_one_current_after_each_call() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for date in [
            "2025-03-04",
            "2025-01-08",
            "2025-03-05",
            "2024-11-30",
            "2025-01-19",
            "2025-06-01",
        ] {
            let period = resolve_period(&mut store, default_anchor(), make_date(date)).unwrap();
            assert_eq!(current_ids(&store), vec![period.id], "after resolving {}", date);
        }
    }

    #[test]
    fn test_uniqueness_conflict_adopts_existing_period() {
        let mut seeded = SqliteStore::open_in_memory().unwrap();
        let existing = resolve_period(&mut seeded, default_anchor(), make_date("2025-01-08")).unwrap();
        resolve_period(&mut seeded, default_anchor(), make_date("2025-02-10")).unwrap();

        let mut store = StaleReads {
            inner: seeded,
            hide_bounds_lookup: false,
        };
        let adopted = resolve_period(&mut store, default_anchor(), make_date("2025-01-12")).unwrap();

        assert_eq!(adopted.id, existing.id);
        assert!(adopted.is_current());
        assert_eq!(current_ids(&store.inner), vec![existing.id]);
        assert_eq!(store.inner.periods().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_fallback_read_is_consistency_error() {
        let mut seeded = SqliteStore::open_in_memory().unwrap();
        let current = resolve_period(&mut seeded, default_anchor(), make_date("2025-01-08")).unwrap();

        let mut store = StaleReads {
            inner: seeded,
            hide_bounds_lookup: true,
        };
        let err = resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap_err();

        assert!(matches!(err, EngineError::Consistency { .. }));
        // The failed insert rolled back, so the old current period survives.
        assert_eq!(current_ids(&store.inner), vec![current.id]);
    }

    #[test]
    fn test_reconcile_promotes_period_containing_today() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let today_period =
            resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap();
        resolve_period(&mut store, default_anchor(), make_date("2025-03-03")).unwrap();

        let reconciled = reconcile_current(&mut store, make_date("2025-01-09")).unwrap();
        assert_eq!(reconciled.map(|p| p.id), Some(today_period.id));
        assert_eq!(current_ids(&store), vec![today_period.id]);
    }

    #[test]
    fn test_reconcile_without_matching_period_is_noop() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let current = resolve_period(&mut store, default_anchor(), make_date("2025-01-08")).unwrap();

        let reconciled = reconcile_current(&mut store, make_date("2025-05-05")).unwrap();
        assert!(reconciled.is_none());
        assert_eq!(store.periods().unwrap().len(), 1);
        assert_eq!(current_ids(&store), vec![current.id]);
    }

    #[test]
    fn test_reconcile_on_empty_store_creates_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(reconcile_current(&mut store, make_date("2025-01-08")).unwrap().is_none());
        assert!(store.periods().unwrap().is_empty());
    }

    #[test]
    fn test_window_past_year_9999_is_rejected_without_writing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = resolve_period(&mut store, default_anchor(), make_date("9999-12-31")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDate { .. }));
        assert!(store.periods().unwrap().is_empty());
    }
}
