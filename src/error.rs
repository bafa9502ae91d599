//! Error types for the pay log engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine surfaces to its callers. A missing pay rate
//! is deliberately absent here: it is represented as sentinel data by
//! [`crate::models::PayRate::unconfigured`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

/// The main error type for the pay log engine.
///
/// # Example
///
/// ```
/// use paylog_engine::error::EngineError;
///
/// let error = EngineError::InvalidDate {
///     input: "2025-13-01".to_string(),
///     message: "input is out of range".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid date '2025-13-01': input is out of range");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A calendar date could not be parsed from caller input.
    #[error("Invalid date '{input}': {message}")]
    InvalidDate {
        /// The raw input that failed to parse.
        input: String,
        /// A description of the parse failure.
        message: String,
    },

    /// A work entry failed validation before being stored.
    #[error("Invalid entry: {message}")]
    InvalidEntry {
        /// A description of what made the entry invalid.
        message: String,
    },

    /// A view name was not one of day, week, period or all.
    #[error("Unknown view '{view}': use day, week, period or all")]
    InvalidView {
        /// The rejected view name.
        view: String,
    },

    /// A rate or pay amount was negative or not a finite number.
    #[error("Invalid amount: {message}")]
    InvalidAmount {
        /// A description of the rejected amount.
        message: String,
    },

    /// No work entry exists with the given id.
    #[error("Entry not found: {id}")]
    EntryNotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// No pay period exists with the given id.
    #[error("Pay period not found: {id}")]
    PeriodNotFound {
        /// The id that was looked up.
        id: i64,
    },

    /// A new pay rate would rewrite history instead of superseding forward.
    #[error("Rate effective {effective_date} does not follow the latest rate effective {latest}")]
    RetroactiveRate {
        /// The effective date of the rejected rate.
        effective_date: NaiveDate,
        /// The effective date of the newest stored rate.
        latest: NaiveDate,
    },

    /// The underlying store failed to read or write.
    #[error("Store access failed: {0}")]
    StoreAccess(#[from] StoreError),

    /// The single-current or non-overlap invariant appears broken.
    #[error("Pay period consistency violated: {message}")]
    Consistency {
        /// A description of the violated invariant.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Returns true when a referenced entry or period does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::EntryNotFound { .. } | EngineError::PeriodNotFound { .. }
        )
    }

    /// Returns true for errors caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidDate { .. }
                | EngineError::InvalidEntry { .. }
                | EngineError::InvalidView { .. }
                | EngineError::InvalidAmount { .. }
                | EngineError::RetroactiveRate { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_displays_input_and_message() {
        let error = EngineError::InvalidDate {
            input: "yesterday".to_string(),
            message: "expected YYYY-MM-DD".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid date 'yesterday': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_retroactive_rate_displays_both_dates() {
        let error = EngineError::RetroactiveRate {
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            latest: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Rate effective 2025-01-01 does not follow the latest rate effective 2025-06-01"
        );
    }

    #[test]
    fn test_store_error_converts_with_question_mark() {
        fn fails() -> Result<(), StoreError> {
            Err(StoreError::PeriodNotFound { id: 7 })
        }

        fn propagates() -> EngineResult<()> {
            fails()?;
            Ok(())
        }

        let err = propagates().unwrap_err();
        assert!(matches!(err, EngineError::StoreAccess(_)));
        assert_eq!(err.to_string(), "Store access failed: Pay period 7 not found");
    }

    #[test]
    fn test_consistency_displays_message() {
        let error = EngineError::Consistency {
            message: "no period for 2025-01-06..2025-01-19".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Pay period consistency violated: no period for 2025-01-06..2025-01-19"
        );
    }

    #[test]
    fn test_is_validation() {
        assert!(
            EngineError::InvalidEntry {
                message: "negative hours".to_string()
            }
            .is_validation()
        );
        assert!(
            !EngineError::Consistency {
                message: "x".to_string()
            }
            .is_validation()
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(EngineError::EntryNotFound { id: 3 }.is_not_found());
        assert!(EngineError::PeriodNotFound { id: 3 }.is_not_found());
        assert!(!EngineError::StoreAccess(StoreError::PeriodNotFound { id: 3 }).is_not_found());
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }
}
