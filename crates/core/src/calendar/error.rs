//! Calendar error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while interpreting dates and timezones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// The input could not be read as a calendar date.
    #[error("Unparseable date: '{0}'")]
    UnparseableDate(String),

    /// The configured timezone is not a known IANA zone.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Local midnight does not exist on this date (DST gap).
    #[error("Local midnight does not exist on {0}")]
    NonexistentMidnight(NaiveDate),
}

impl CalendarError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnparseableDate(_) => "UNPARSEABLE_DATE",
            Self::UnknownTimezone(_) => "UNKNOWN_TIMEZONE",
            Self::NonexistentMidnight(_) => "NONEXISTENT_MIDNIGHT",
        }
    }
}
