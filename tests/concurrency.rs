//! Concurrent period creation against one database file.
//!
//! Each thread owns its own connection, as separate processes would. Every
//! thread resolving the same new date must end up holding the same row.

use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use tempfile::TempDir;

use paylog_engine::calculation::default_anchor;
use paylog_engine::registrar::resolve_period;
use paylog_engine::store::{PeriodStore, SqliteStore};

const THREADS: usize = 4;

fn make_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

fn resolve_concurrently(path: &PathBuf, date: NaiveDate) -> Vec<i64> {
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let mut store = SqliteStore::open(&path).unwrap();
                barrier.wait();
                resolve_period(&mut store, default_anchor(), date)
                    .unwrap()
                    .id
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_concurrent_resolution_converges_on_one_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pay_log.db");
    // Create the schema up front so threads only race on period rows.
    let observer = SqliteStore::open(&path).unwrap();

    for date in ["2025-01-08", "2025-01-22", "2024-12-30", "2025-01-10"] {
        let ids = resolve_concurrently(&path, make_date(date));
        assert!(
            ids.windows(2).all(|pair| pair[0] == pair[1]),
            "threads disagreed on the period for {}: {:?}",
            date,
            ids
        );

        let periods = observer.periods().unwrap();
        let current: Vec<_> = periods.iter().filter(|p| p.is_current()).collect();
        assert_eq!(current.len(), 1, "after resolving {}", date);
        assert_eq!(current[0].id, ids[0]);
    }

    // 2025-01-10 reused the first window rather than inserting a duplicate.
    assert_eq!(observer.periods().unwrap().len(), 3);
}
