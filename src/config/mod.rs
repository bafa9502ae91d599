//! Configuration loading for the pay log service.
//!
//! This module provides functionality to load the period anchor, database
//! location and listen address from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use paylog_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./paylog.yaml").unwrap();
//! println!("Database: {}", config.config().database_path);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{DEFAULT_BIND_ADDRESS, DEFAULT_DATABASE_PATH, EngineConfig};
