//! The pay ledger: one handle over a store and the period anchor.
//!
//! [`PayLedger`] ties the pure calculations to persistence. It resolves
//! periods, looks up rates, computes totals for any view, and keeps entries
//! attached to the period that owns their date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculation::{
    self, DateWindow, ViewKind, aggregate, aggregate_sums, check_calendar_range, view_window,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, PayRate, PeriodBounds, Totals, WorkEntry};
use crate::registrar;
use crate::store::PayStore;

/// A resolved period together with its computed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// The persisted period.
    pub period: PayPeriod,
    /// Totals over the period's entries.
    pub totals: Totals,
}

/// Period, rate and entry bookkeeping over a [`PayStore`].
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::default_anchor;
/// use paylog_engine::ledger::PayLedger;
/// use paylog_engine::store::SqliteStore;
/// use chrono::NaiveDate;
///
/// let mut ledger = PayLedger::new(SqliteStore::open_in_memory()?, default_anchor());
/// let period = ledger.resolve_period(NaiveDate::from_ymd_opt(2025, 1, 8).unwrap())?;
/// assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
/// # Ok::<(), paylog_engine::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct PayLedger<S> {
    store: S,
    anchor: NaiveDate,
}

impl<S: PayStore> PayLedger<S> {
    /// Creates a ledger whose periods are laid out from `anchor`.
    pub fn new(store: S, anchor: NaiveDate) -> Self {
        Self { store, anchor }
    }

    /// Creates a ledger using the anchor from `config`.
    pub fn from_config(store: S, config: &EngineConfig) -> Self {
        Self::new(store, config.anchor_date)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the period anchor.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Computes the canonical window containing `date` without touching the store.
    pub fn boundaries_for(&self, date: NaiveDate) -> EngineResult<PeriodBounds> {
        calculation::boundaries_for(self.anchor, date)
    }

    /// Returns the persisted period owning `date`, creating it if needed.
    pub fn resolve_period(&mut self, date: NaiveDate) -> EngineResult<PayPeriod> {
        registrar::resolve_period(&mut self.store, self.anchor, date)
    }

    /// Every stored period, oldest first.
    pub fn periods(&self) -> EngineResult<Vec<PayPeriod>> {
        Ok(self.store.periods()?)
    }

    /// Promotes the stored period containing `today`, if any, to current.
    pub fn reconcile_current(&mut self, today: NaiveDate) -> EngineResult<()> {
        registrar::reconcile_current(&mut self.store, today)?;
        Ok(())
    }

    /// Resolves the pay rate in force on `date`.
    pub fn rates_for(&self, date: NaiveDate) -> EngineResult<PayRate> {
        calculation::rates_for(&self.store, date)
    }

    /// Appends a rate row that takes effect after every existing one.
    ///
    /// Rates already in the table are never rewritten, so an effective date
    /// on or before the newest stored row is rejected.
    pub fn add_rate(&mut self, rate: PayRate) -> EngineResult<PayRate> {
        for (field, value) in [("cfi_rate", rate.cfi_rate), ("admin_rate", rate.admin_rate)] {
            check_amount(field, value)?;
        }
        check_calendar_range(rate.effective_date)?;

        if let Some(latest) = self.store.latest_rate()? {
            if rate.effective_date <= latest.effective_date {
                return Err(EngineError::RetroactiveRate {
                    effective_date: rate.effective_date,
                    latest: latest.effective_date,
                });
            }
        }

        let stored = self.store.insert_rate(&rate)?;
        info!(
            effective_date = %stored.effective_date,
            cfi_rate = stored.cfi_rate,
            admin_rate = stored.admin_rate,
            "Added pay rate"
        );
        Ok(stored)
    }

    /// Totals for the entries dated `start..=end` of a period.
    ///
    /// Works from column sums, so ride hours are added to recorded admin
    /// hours. The rate is the one in force on `start`.
    pub fn period_totals(
        &self,
        period_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Totals> {
        let sums = self.store.hour_sums_between(start, end)?;
        let rate = self.rates_for(start)?;
        let mut totals = aggregate_sums(&sums, &rate);
        totals.period_id = Some(period_id);
        Ok(totals)
    }

    /// Resolves the period owning `date` and computes its totals.
    pub fn period_summary(&mut self, date: NaiveDate) -> EngineResult<PeriodSummary> {
        let period = self.resolve_period(date)?;
        let totals = self.period_totals(period.id, period.start_date, period.end_date)?;
        Ok(PeriodSummary { period, totals })
    }

    /// Stores the computed gross for a period and returns the updated period.
    pub fn refresh_earnings(&mut self, period_id: i64) -> EngineResult<PayPeriod> {
        let period = self.period(period_id)?;
        let totals = self.period_totals(period.id, period.start_date, period.end_date)?;
        let updated = self.store.set_gross_earned(period.id, totals.total_gross)?;
        debug!(period_id, gross_earned = updated.gross_earned, "Refreshed period earnings");
        Ok(updated)
    }

    /// Records the gross and net pay actually received for a period.
    pub fn record_actual_pay(
        &mut self,
        period_id: i64,
        gross_actual: f64,
        net_actual: f64,
    ) -> EngineResult<PayPeriod> {
        check_amount("gross_actual", gross_actual)?;
        check_amount("net_actual", net_actual)?;

        let period = self.period(period_id)?;
        let updated = self
            .store
            .set_actual_pay(period.id, gross_actual, net_actual)?;
        info!(period_id, gross_actual, net_actual, "Recorded actual pay");
        Ok(updated)
    }

    /// Lists the entries in `view` around `date`, newest first.
    ///
    /// The period view resolves, and if needed creates, the owning period.
    pub fn entries_for_view(
        &mut self,
        view: ViewKind,
        date: NaiveDate,
    ) -> EngineResult<Vec<WorkEntry>> {
        let window = self.window_for(view, date)?.0;
        self.entries_in(window)
    }

    /// Totals for `view` around `date`.
    ///
    /// The period view uses [`period_totals`](Self::period_totals). Other
    /// views aggregate entry by entry, with ride hours replacing admin hours,
    /// at the rate in force on the window start (or on `date` for `all`).
    pub fn view_totals(&mut self, view: ViewKind, date: NaiveDate) -> EngineResult<Totals> {
        let (window, period) = self.window_for(view, date)?;
        if let Some(period) = period {
            return self.period_totals(period.id, period.start_date, period.end_date);
        }

        let entries = self.entries_in(window)?;
        let rate = self.rates_for(window.start().unwrap_or(date))?;
        Ok(aggregate(&entries, &rate))
    }

    /// Normalizes, validates and stores a new entry.
    ///
    /// The entry is attached to the stored period containing its date, if
    /// one exists; recording an entry never creates a period.
    pub fn record_entry(&mut self, entry: WorkEntry) -> EngineResult<WorkEntry> {
        let mut entry = entry.normalized();
        entry.validate()?;
        entry.owning_period_id = self.owning_period_id(entry.date)?;

        let stored = self.store.insert_entry(&entry)?;
        debug!(
            entry_id = stored.id,
            kind = %stored.kind,
            date = %stored.date,
            period_id = ?stored.owning_period_id,
            "Recorded entry"
        );
        Ok(stored)
    }

    /// Replaces a stored entry, reassigning its period if the date moved.
    pub fn update_entry(&mut self, entry: WorkEntry) -> EngineResult<WorkEntry> {
        let existing = self
            .store
            .entry_by_id(entry.id)?
            .ok_or(EngineError::EntryNotFound { id: entry.id })?;

        let mut entry = entry.normalized();
        entry.validate()?;
        entry.owning_period_id = if entry.date == existing.date {
            existing.owning_period_id
        } else {
            self.owning_period_id(entry.date)?
        };

        if !self.store.update_entry(&entry)? {
            return Err(EngineError::EntryNotFound { id: entry.id });
        }
        debug!(entry_id = entry.id, period_id = ?entry.owning_period_id, "Updated entry");
        Ok(entry)
    }

    /// Deletes an entry by id.
    pub fn delete_entry(&mut self, id: i64) -> EngineResult<()> {
        if !self.store.delete_entry(id)? {
            return Err(EngineError::EntryNotFound { id });
        }
        debug!(entry_id = id, "Deleted entry");
        Ok(())
    }

    fn period(&self, id: i64) -> EngineResult<PayPeriod> {
        self.store
            .period_by_id(id)?
            .ok_or(EngineError::PeriodNotFound { id })
    }

    fn owning_period_id(&self, date: NaiveDate) -> EngineResult<Option<i64>> {
        Ok(self.store.period_containing(date)?.map(|p| p.id))
    }

    fn window_for(
        &mut self,
        view: ViewKind,
        date: NaiveDate,
    ) -> EngineResult<(DateWindow, Option<PayPeriod>)> {
        if view == ViewKind::Period {
            let period = self.resolve_period(date)?;
            let window = DateWindow::Range {
                start: period.start_date,
                end: period.end_date,
            };
            return Ok((window, Some(period)));
        }
        Ok((view_window(view, date, self.anchor)?, None))
    }

    fn entries_in(&self, window: DateWindow) -> EngineResult<Vec<WorkEntry>> {
        let entries = match window {
            DateWindow::Range { start, end } => self.store.entries_between(start, end)?,
            DateWindow::All => self.store.all_entries()?,
        };
        Ok(entries)
    }
}

fn check_amount(field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidAmount {
            message: format!("{} must be a non-negative number, got {}", field, value),
        });
    }
    Ok(())
}
