//! Bi-weekly period boundary calculation.
//!
//! Every calendar date maps to exactly one 14-day window counted from a
//! fixed anchor Monday. The mapping is pure, so the same date always yields
//! the same window no matter what has been persisted.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::PeriodBounds;

/// Length of a pay period in days.
pub const PERIOD_LENGTH_DAYS: i64 = 14;

/// Days between the last day of a period and its pay date.
pub const PAY_DATE_OFFSET_DAYS: i64 = 3;

/// Largest year accepted as a calendar date.
///
/// Dates are stored as `YYYY-MM-DD` text and compared as strings, which only
/// orders correctly for four-digit years.
pub const MAX_CALENDAR_YEAR: i32 = 9999;

/// The Monday that period index zero starts on unless configured otherwise.
pub fn default_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or(NaiveDate::MIN)
}

/// Parses a `YYYY-MM-DD` calendar date from caller input.
///
/// The year must be exactly four digits; signed or extended years are
/// rejected even though chrono can represent them.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::parse_calendar_date;
///
/// assert!(parse_calendar_date("2025-01-06").is_ok());
/// assert!(parse_calendar_date("01/06/2025").is_err());
/// assert!(parse_calendar_date("+262142-12-31").is_err());
/// ```
pub fn parse_calendar_date(input: &str) -> EngineResult<NaiveDate> {
    let trimmed = input.trim();
    let invalid = |message: String| EngineError::InvalidDate {
        input: input.to_string(),
        message,
    };

    let bytes = trimmed.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(invalid("expected YYYY-MM-DD with a four-digit year".to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| invalid(e.to_string()))
}

/// Rejects dates whose year falls outside `0000..=9999`.
pub fn check_calendar_range(date: NaiveDate) -> EngineResult<()> {
    if (0..=MAX_CALENDAR_YEAR).contains(&date.year()) {
        return Ok(());
    }
    Err(EngineError::InvalidDate {
        input: date.to_string(),
        message: format!("year must be between 0000 and {}", MAX_CALENDAR_YEAR),
    })
}

fn out_of_range(date: NaiveDate) -> EngineError {
    EngineError::InvalidDate {
        input: date.to_string(),
        message: "pay period falls outside the supported date range".to_string(),
    }
}

/// Returns the Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> EngineResult<NaiveDate> {
    // number_from_monday is 1 for Monday through 7 for Sunday.
    let days_to_monday = i64::from(date.weekday().number_from_monday()) - 1;
    date.checked_sub_signed(Duration::days(days_to_monday))
        .ok_or_else(|| out_of_range(date))
}

/// Computes the pay period window that contains `date`.
///
/// The date is first moved back to the Monday of its week, then the number
/// of whole 14-day periods between the anchor and that Monday is taken with
/// floor division, so dates before the anchor get negative indices instead
/// of rounding toward the anchor.
///
/// Returns [`EngineError::InvalidDate`] when the window or its pay date
/// would fall outside chrono's representable range.
///
/// # Example
///
/// ```
/// use paylog_engine::calculation::{boundaries_for, default_anchor};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
/// let bounds = boundaries_for(default_anchor(), date)?;
/// assert_eq!(bounds.index, -1);
/// assert_eq!(bounds.end, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
/// # Ok::<(), paylog_engine::error::EngineError>(())
/// ```
pub fn boundaries_for(anchor: NaiveDate, date: NaiveDate) -> EngineResult<PeriodBounds> {
    let monday = week_start(date)?;
    let days_diff = (monday - anchor).num_days();
    let index = days_diff.div_euclid(PERIOD_LENGTH_DAYS);

    let start = index
        .checked_mul(PERIOD_LENGTH_DAYS)
        .and_then(Duration::try_days)
        .and_then(|offset| anchor.checked_add_signed(offset))
        .ok_or_else(|| out_of_range(date))?;
    let end = start
        .checked_add_signed(Duration::days(PERIOD_LENGTH_DAYS - 1))
        .ok_or_else(|| out_of_range(date))?;
    let pay_date = end
        .checked_add_signed(Duration::days(PAY_DATE_OFFSET_DAYS))
        .ok_or_else(|| out_of_range(date))?;

    Ok(PeriodBounds {
        index,
        start,
        end,
        pay_date,
    })
}
