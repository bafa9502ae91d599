//! SQLite-backed store.
//!
//! Dates are stored as `YYYY-MM-DD` text so that `BETWEEN` and `ORDER BY`
//! compare them chronologically. The single-current rule is enforced twice:
//! by the transactional demote/promote below and by a partial unique index.

use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior, params};
use tracing::debug;

use crate::models::{
    EntryKind, HourSums, PayPeriod, PayRate, PeriodBounds, PeriodStatus, WorkEntry,
};

use super::{EntryStore, PeriodStore, RateStore, StoreError, StoreResult};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS pay_periods (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    start_date   TEXT NOT NULL,
    end_date     TEXT NOT NULL,
    pay_date     TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'past' CHECK(status IN ('current','past')),
    gross_earned REAL NOT NULL DEFAULT 0,
    gross_actual REAL NOT NULL DEFAULT 0,
    net_actual   REAL NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL,
    UNIQUE(start_date, end_date)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_pay_periods_single_current
    ON pay_periods(status) WHERE status = 'current';

CREATE TABLE IF NOT EXISTS pay_rates (
    effective_date TEXT PRIMARY KEY,
    cfi_rate       REAL NOT NULL,
    admin_rate     REAL NOT NULL,
    last_updated   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pay_entries (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    type         TEXT NOT NULL CHECK(type IN ('flight','ground','admin','sim','misc')),
    date         TEXT NOT NULL,
    time         TEXT NOT NULL,
    flight_hours REAL,
    ground_hours REAL,
    sim_hours    REAL,
    admin_hours  REAL,
    customer     TEXT,
    notes        TEXT,
    ride_count   INTEGER,
    meeting      INTEGER NOT NULL DEFAULT 0,
    period_id    INTEGER REFERENCES pay_periods(id)
);

CREATE INDEX IF NOT EXISTS idx_pay_entries_date ON pay_entries(date, time);
"#;

const PERIOD_COLUMNS: &str = "id, start_date, end_date, pay_date, status, \
     gross_earned, gross_actual, net_actual, last_updated";

const ENTRY_COLUMNS: &str = "id, type, date, time, flight_hours, ground_hours, sim_hours, \
     admin_hours, customer, notes, ride_count, meeting, period_id";

/// Writers wait this long for a competing transaction before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A single-file SQLite store.
///
/// # Example
///
/// ```
/// use paylog_engine::store::{PeriodStore, SqliteStore};
///
/// let store = SqliteStore::open_in_memory()?;
/// assert!(store.periods()?.is_empty());
/// # Ok::<(), paylog_engine::store::StoreError>(())
/// ```
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        debug!("Pay log schema ready");
        Ok(Self { conn })
    }

    /// Checks that the database answers a trivial query.
    pub fn ping(&self) -> StoreResult<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(StoreError::CorruptRow {
            table: "pay_periods",
            message,
        }),
    )
}

fn map_period_row(row: &Row) -> rusqlite::Result<PayPeriod> {
    let status_str: String = row.get("status")?;
    let status = PeriodStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(4, format!("invalid status: {}", status_str)))?;

    Ok(PayPeriod {
        id: row.get("id")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        pay_date: row.get("pay_date")?,
        status,
        gross_earned: row.get("gross_earned")?,
        gross_actual: row.get("gross_actual")?,
        net_actual: row.get("net_actual")?,
        last_updated: row.get("last_updated")?,
    })
}

fn map_rate_row(row: &Row) -> rusqlite::Result<PayRate> {
    Ok(PayRate {
        effective_date: row.get("effective_date")?,
        cfi_rate: row.get("cfi_rate")?,
        admin_rate: row.get("admin_rate")?,
        last_updated: row.get("last_updated")?,
    })
}

fn map_entry_row(row: &Row) -> rusqlite::Result<WorkEntry> {
    let kind_str: String = row.get("type")?;
    let kind = EntryKind::from_db_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(StoreError::CorruptRow {
                table: "pay_entries",
                message: format!("invalid type: {}", kind_str),
            }),
        )
    })?;

    Ok(WorkEntry {
        id: row.get("id")?,
        kind,
        date: row.get("date")?,
        time: row.get("time")?,
        flight_hours: row.get("flight_hours")?,
        ground_hours: row.get("ground_hours")?,
        sim_hours: row.get("sim_hours")?,
        admin_hours: row.get("admin_hours")?,
        customer: row.get("customer")?,
        notes: row.get("notes")?,
        ride_count: row.get("ride_count")?,
        meeting: row.get("meeting")?,
        owning_period_id: row.get("period_id")?,
    })
}

fn select_period_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<PayPeriod>> {
    conn.query_row(
        &format!("SELECT {} FROM pay_periods WHERE id = ?1", PERIOD_COLUMNS),
        params![id],
        map_period_row,
    )
    .optional()
}

impl PeriodStore for SqliteStore {
    fn current_period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayPeriod>> {
        let period = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pay_periods
                     WHERE status = 'current' AND ?1 BETWEEN start_date AND end_date
                     LIMIT 1",
                    PERIOD_COLUMNS
                ),
                params![date],
                map_period_row,
            )
            .optional()?;
        Ok(period)
    }

    fn period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayPeriod>> {
        let period = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pay_periods
                     WHERE ?1 BETWEEN start_date AND end_date
                     ORDER BY start_date DESC
                     LIMIT 1",
                    PERIOD_COLUMNS
                ),
                params![date],
                map_period_row,
            )
            .optional()?;
        Ok(period)
    }

    fn period_with_bounds(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Option<PayPeriod>> {
        let period = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pay_periods WHERE start_date = ?1 AND end_date = ?2",
                    PERIOD_COLUMNS
                ),
                params![start, end],
                map_period_row,
            )
            .optional()?;
        Ok(period)
    }

    fn period_by_id(&self, id: i64) -> StoreResult<Option<PayPeriod>> {
        Ok(select_period_by_id(&self.conn, id)?)
    }

    fn periods(&self) -> StoreResult<Vec<PayPeriod>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pay_periods ORDER BY start_date ASC",
            PERIOD_COLUMNS
        ))?;
        let rows = stmt.query_map([], map_period_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn promote_period(&mut self, id: i64) -> StoreResult<PayPeriod> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "UPDATE pay_periods SET status = 'past' WHERE status = 'current' AND id != ?1",
            params![id],
        )?;
        let changed = tx.execute(
            "UPDATE pay_periods SET status = 'current', last_updated = ?2 WHERE id = ?1",
            params![id, now()],
        )?;
        if changed == 0 {
            // Dropping the transaction rolls back the demotion.
            return Err(StoreError::PeriodNotFound { id });
        }

        let period = select_period_by_id(&tx, id)?.ok_or(StoreError::PeriodNotFound { id })?;
        tx.commit()?;
        Ok(period)
    }

    fn insert_current_period(&mut self, bounds: &PeriodBounds) -> StoreResult<PayPeriod> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "UPDATE pay_periods SET status = 'past' WHERE status = 'current'",
            [],
        )?;

        let inserted = tx.execute(
            "INSERT INTO pay_periods (start_date, end_date, pay_date, status, last_updated)
             VALUES (?1, ?2, ?3, 'current', ?4)",
            params![bounds.start, bounds.end, bounds.pay_date, now()],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::UniqueViolation {
                    start: bounds.start,
                    end: bounds.end,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = tx.last_insert_rowid();
        let attached = tx.execute(
            "UPDATE pay_entries SET period_id = ?1 WHERE date BETWEEN ?2 AND ?3",
            params![id, bounds.start, bounds.end],
        )?;
        debug!(period_id = id, attached, "Attached existing entries to new period");

        let period = select_period_by_id(&tx, id)?.ok_or(StoreError::PeriodNotFound { id })?;
        tx.commit()?;
        Ok(period)
    }

    fn set_gross_earned(&mut self, id: i64, gross_earned: f64) -> StoreResult<PayPeriod> {
        let changed = self.conn.execute(
            "UPDATE pay_periods SET gross_earned = ?2, last_updated = ?3 WHERE id = ?1",
            params![id, gross_earned, now()],
        )?;
        if changed == 0 {
            return Err(StoreError::PeriodNotFound { id });
        }
        select_period_by_id(&self.conn, id)?.ok_or(StoreError::PeriodNotFound { id })
    }

    fn set_actual_pay(
        &mut self,
        id: i64,
        gross_actual: f64,
        net_actual: f64,
    ) -> StoreResult<PayPeriod> {
        let changed = self.conn.execute(
            "UPDATE pay_periods
             SET gross_actual = ?2, net_actual = ?3, last_updated = ?4
             WHERE id = ?1",
            params![id, gross_actual, net_actual, now()],
        )?;
        if changed == 0 {
            return Err(StoreError::PeriodNotFound { id });
        }
        select_period_by_id(&self.conn, id)?.ok_or(StoreError::PeriodNotFound { id })
    }
}

impl RateStore for SqliteStore {
    fn rate_in_force(&self, date: NaiveDate) -> StoreResult<Option<PayRate>> {
        let rate = self
            .conn
            .query_row(
                "SELECT effective_date, cfi_rate, admin_rate, last_updated
                 FROM pay_rates
                 WHERE effective_date <= ?1
                 ORDER BY effective_date DESC
                 LIMIT 1",
                params![date],
                map_rate_row,
            )
            .optional()?;
        Ok(rate)
    }

    fn latest_rate(&self) -> StoreResult<Option<PayRate>> {
        let rate = self
            .conn
            .query_row(
                "SELECT effective_date, cfi_rate, admin_rate, last_updated
                 FROM pay_rates
                 ORDER BY effective_date DESC
                 LIMIT 1",
                [],
                map_rate_row,
            )
            .optional()?;
        Ok(rate)
    }

    fn insert_rate(&mut self, rate: &PayRate) -> StoreResult<PayRate> {
        let stored = PayRate {
            last_updated: Some(rate.last_updated.unwrap_or_else(now)),
            ..rate.clone()
        };
        self.conn.execute(
            "INSERT INTO pay_rates (effective_date, cfi_rate, admin_rate, last_updated)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                stored.effective_date,
                stored.cfi_rate,
                stored.admin_rate,
                stored.last_updated
            ],
        )?;
        Ok(stored)
    }
}

impl SqliteStore {
    fn query_entries(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> StoreResult<Vec<WorkEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pay_entries {} ORDER BY date DESC, time DESC, id DESC",
            ENTRY_COLUMNS, filter
        ))?;
        let rows = stmt.query_map(args, map_entry_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl EntryStore for SqliteStore {
    fn entries_between(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<WorkEntry>> {
        self.query_entries("WHERE date BETWEEN ?1 AND ?2", &[&start, &end])
    }

    fn all_entries(&self) -> StoreResult<Vec<WorkEntry>> {
        self.query_entries("", &[])
    }

    fn hour_sums_between(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<HourSums> {
        let sums = self.conn.query_row(
            "SELECT
                 COALESCE(SUM(flight_hours), 0.0) AS flight_hours,
                 COALESCE(SUM(ground_hours), 0.0) AS ground_hours,
                 COALESCE(SUM(sim_hours), 0.0)    AS sim_hours,
                 COALESCE(SUM(admin_hours), 0.0)  AS admin_hours,
                 COALESCE(SUM(ride_count), 0)     AS total_rides
             FROM pay_entries
             WHERE date BETWEEN ?1 AND ?2",
            params![start, end],
            |row| {
                Ok(HourSums {
                    flight_hours: row.get("flight_hours")?,
                    ground_hours: row.get("ground_hours")?,
                    sim_hours: row.get("sim_hours")?,
                    admin_hours: row.get("admin_hours")?,
                    rides: row.get("total_rides")?,
                })
            },
        )?;
        Ok(sums)
    }

    fn entry_by_id(&self, id: i64) -> StoreResult<Option<WorkEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {} FROM pay_entries WHERE id = ?1", ENTRY_COLUMNS),
                params![id],
                map_entry_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn insert_entry(&mut self, entry: &WorkEntry) -> StoreResult<WorkEntry> {
        self.conn.execute(
            "INSERT INTO pay_entries (
                 type, date, time,
                 flight_hours, ground_hours, sim_hours, admin_hours,
                 customer, notes, ride_count, meeting, period_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                entry.kind.to_db_str(),
                entry.date,
                entry.time,
                entry.flight_hours,
                entry.ground_hours,
                entry.sim_hours,
                entry.admin_hours,
                entry.customer,
                entry.notes,
                entry.ride_count,
                entry.meeting,
                entry.owning_period_id,
            ],
        )?;

        Ok(WorkEntry {
            id: self.conn.last_insert_rowid(),
            ..entry.clone()
        })
    }

    fn update_entry(&mut self, entry: &WorkEntry) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE pay_entries SET
                 type = ?2, date = ?3, time = ?4,
                 flight_hours = ?5, ground_hours = ?6, sim_hours = ?7, admin_hours = ?8,
                 customer = ?9, notes = ?10, ride_count = ?11, meeting = ?12, period_id = ?13
             WHERE id = ?1",
            params![
                entry.id,
                entry.kind.to_db_str(),
                entry.date,
                entry.time,
                entry.flight_hours,
                entry.ground_hours,
                entry.sim_hours,
                entry.admin_hours,
                entry.customer,
                entry.notes,
                entry.ride_count,
                entry.meeting,
                entry.owning_period_id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_entry(&mut self, id: i64) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM pay_entries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
