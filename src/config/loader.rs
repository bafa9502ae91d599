//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use chrono::{Datelike, Weekday};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineConfig;

/// Loads and validates the engine configuration.
///
/// # File Format
///
/// ```text
/// anchor_date: 2025-01-06     # must be a Monday
/// database_path: pay_log.db
/// bind_address: 127.0.0.1:8080
/// ```
///
/// # Example
///
/// ```no_run
/// use paylog_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./paylog.yaml").unwrap();
/// println!("Periods anchored at {}", loader.config().anchor_date);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing or unreadable
    /// - The file contains invalid YAML
    /// - The anchor date is not a Monday
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses configuration from YAML text.
    ///
    /// # Example
    ///
    /// ```
    /// use paylog_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_yaml_str("bind_address: 0.0.0.0:9000")?;
    /// assert_eq!(loader.config().bind_address, "0.0.0.0:9000");
    /// assert_eq!(loader.config().database_path, "pay_log.db");
    /// # Ok::<(), paylog_engine::error::EngineError>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        Self::parse(yaml, "<inline>")
    }

    fn parse(yaml: &str, path: &str) -> EngineResult<Self> {
        // An empty document deserializes to unit, not to a mapping.
        let config: EngineConfig = if yaml.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?
        };

        if config.anchor_date.weekday() != Weekday::Mon {
            return Err(EngineError::ConfigParseError {
                path: path.to_string(),
                message: format!(
                    "anchor_date {} is a {:?}, expected a Monday",
                    config.anchor_date,
                    config.anchor_date.weekday()
                ),
            });
        }

        Ok(Self { config })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config_path() -> String {
        format!("{}/paylog.yaml", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn test_load_valid_configuration() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let config = loader.config();
        assert_eq!(
            config.anchor_date,
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
        assert_eq!(config.database_path, "pay_log.db");
        assert_eq!(config.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_file_returns_not_found() {
        let result = ConfigLoader::load("/nonexistent/paylog.yaml");
        assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let loader = ConfigLoader::from_yaml_str("").unwrap();
        assert_eq!(loader.into_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let loader = ConfigLoader::from_yaml_str("anchor_date: 2025-01-13\n").unwrap();
        assert_eq!(
            loader.config().anchor_date,
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap()
        );
        assert_eq!(loader.config().bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_non_monday_anchor_is_rejected() {
        // 2025-01-08 is a Wednesday.
        let result = ConfigLoader::from_yaml_str("anchor_date: 2025-01-08\n");
        match result {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("Monday"));
            }
            other => panic!("expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let result = ConfigLoader::from_yaml_str("anchor_date: [not, a, date]");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }
}
