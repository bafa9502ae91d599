//! Configuration types for the pay log service.
//!
//! These structures are deserialized from a YAML file. Every field has a
//! default, so an empty document is a valid configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::default_anchor;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "pay_log.db";

/// Default HTTP listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// Settings for the engine and the service around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The Monday that starts pay period index 0.
    #[serde(default = "default_anchor")]
    pub anchor_date: NaiveDate,
    /// Path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor(),
            database_path: default_database_path(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}
