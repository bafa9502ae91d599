//! Date windows for listing entries and totals.

use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::boundaries::{boundaries_for, week_start};

/// The span of entries a caller wants to see around a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Just the given date.
    Day,
    /// The Monday-to-Sunday week containing the date.
    Week,
    /// The pay period containing the date.
    #[default]
    Period,
    /// Every entry ever logged.
    All,
}

impl FromStr for ViewKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewKind::Day),
            "week" => Ok(ViewKind::Week),
            "period" => Ok(ViewKind::Period),
            "all" => Ok(ViewKind::All),
            _ => Err(EngineError::InvalidView {
                view: s.to_string(),
            }),
        }
    }
}

/// An inclusive date range, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// `start..=end`.
    Range {
        /// First date included.
        start: NaiveDate,
        /// Last date included.
        end: NaiveDate,
    },
    /// No date restriction.
    All,
}

impl DateWindow {
    /// Returns the first date of a bounded window.
    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            DateWindow::Range { start, .. } => Some(*start),
            DateWindow::All => None,
        }
    }
}

/// Computes the window for `view` around `date`.
///
/// The period window is the canonical computed one; the ledger substitutes
/// the persisted period when it resolves the period view. Fails with
/// [`EngineError::InvalidDate`] when the window leaves chrono's range.
pub fn view_window(
    view: ViewKind,
    date: NaiveDate,
    anchor: NaiveDate,
) -> EngineResult<DateWindow> {
    let window = match view {
        ViewKind::Day => DateWindow::Range {
            start: date,
            end: date,
        },
        ViewKind::Week => {
            let start = week_start(date)?;
            let end = start
                .checked_add_signed(Duration::days(6))
                .ok_or_else(|| EngineError::InvalidDate {
                    input: date.to_string(),
                    message: "week falls outside the supported date range".to_string(),
                })?;
            DateWindow::Range { start, end }
        }
        ViewKind::Period => {
            let bounds = boundaries_for(anchor, date)?;
            DateWindow::Range {
                start: bounds.start,
                end: bounds.end,
            }
        }
        ViewKind::All => DateWindow::All,
    };
    Ok(window)
}
