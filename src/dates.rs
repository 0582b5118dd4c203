//! Date handling for the query routes.
//!
//! Stored dates are `YYYY-MM-DD` strings and the database compares them
//! as text, so every date that reaches a query must be in exactly that
//! form. `parse_iso_date` is stricter than chrono's `%Y-%m-%d` (which
//! accepts unpadded months and days) for that reason.

use chrono::{NaiveDate, TimeDelta};
use thiserror::Error;

/// Format used for stored dates and query parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input validation failures for date path parameters.
///
/// The messages are part of the public JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Date must be in YYYY-MM-DD format.")]
    InvalidFormat,
    #[error("End date must be later than start date.")]
    EndNotAfterStart,
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateError> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 {
        return Err(DateError::InvalidFormat);
    }

    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return Err(DateError::InvalidFormat);
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| DateError::InvalidFormat)
}

/// Formats a date the way the dataset stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// First day of the trailing window that ends at `latest`.
///
/// With the default of 365 days the window spans one year back from
/// the most recent observation, inclusive on both ends. Spans beyond the
/// representable calendar clamp to `NaiveDate::MIN`.
pub fn window_start(latest: NaiveDate, window_days: i64) -> NaiveDate {
    TimeDelta::try_days(window_days)
        .and_then(|span| latest.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

// ---------------------------------------------------------------------------
// Date ranges
// ---------------------------------------------------------------------------

/// A validated date filter for the temperature statistics routes.
///
/// `start` is inclusive; `end`, when present, is inclusive too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

impl DateRange {
    /// Open-ended range: every date on or after `start`.
    pub fn from_start(start: &str) -> Result<Self, DateError> {
        parse_iso_date(start)?;
        Ok(DateRange {
            start: start.to_string(),
            end: None,
        })
    }

    /// Closed range. Both dates must be well formed (start is checked
    /// first) and `start` must sort strictly before `end`.
    pub fn between(start: &str, end: &str) -> Result<Self, DateError> {
        parse_iso_date(start)?;
        parse_iso_date(end)?;

        // Plain string ordering; both inputs are fixed-width at this point.
        if start >= end {
            return Err(DateError::EndNotAfterStart);
        }

        Ok(DateRange {
            start: start.to_string(),
            end: Some(end.to_string()),
        })
    }

    /// Whether a stored date falls inside the range.
    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && self.end.as_deref().is_none_or(|end| date <= end)
    }
}
