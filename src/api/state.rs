//! Application state for the pay log API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::error::{EngineError, EngineResult};
use crate::ledger::PayLedger;
use crate::store::SqliteStore;

/// Shared application state.
///
/// The ledger owns a single SQLite connection, so handlers take turns
/// through a mutex. Ledger calls block on disk I/O and run on tokio's
/// blocking pool rather than on the async workers.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Mutex<PayLedger<SqliteStore>>>,
}

impl AppState {
    /// Creates a new application state around `ledger`.
    pub fn new(ledger: PayLedger<SqliteStore>) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Runs `f` with exclusive access to the ledger on the blocking pool.
    ///
    /// A panic inside `f` fails only the request that raised it. The lock it
    /// poisons is recovered by the next caller: any open SQLite transaction
    /// was rolled back when the panic unwound, so the ledger is still sound.
    pub async fn with_ledger<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut PayLedger<SqliteStore>) -> EngineResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        tokio::task::spawn_blocking(move || {
            let mut guard = ledger.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Ledger task did not complete");
            EngineError::Consistency {
                message: format!("ledger task failed: {}", e),
            }
        })?
    }
}
