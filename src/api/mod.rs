//! HTTP API for the pay log service.
//!
//! This module exposes the ledger over a small REST surface: the current
//! period with its totals, entry CRUD, view totals, and rate maintenance.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ActualPayRequest, DateQuery, EntryRequest, IdQuery, RateRequest, ViewQuery};
pub use response::{ApiError, ApiErrorResponse, EntriesResponse, HealthResponse};
pub use state::AppState;
