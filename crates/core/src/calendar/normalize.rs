//! Date normalization.
//!
//! Callers send dates as `yyyy-MM-dd`, as ISO timestamps, or as
//! `yyyy-MM-dd HH:MM` strings. Only the calendar-day part is meaningful to
//! the booking engine, and it is always read as a day in the club's
//! timezone, never shifted through UTC.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use super::error::CalendarError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts date-like inputs into calendar days in the club timezone.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    tz: Tz,
}

impl DateNormalizer {
    /// Creates a normalizer for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The timezone days are anchored in.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Normalizes a date-like string to a calendar day.
    ///
    /// Anything after a `T` or a space is a time component and is dropped
    /// before parsing. Malformed input is rejected.
    pub fn normalize(&self, input: &str) -> Result<NaiveDate, CalendarError> {
        let trimmed = input.trim();
        let date_part = trimmed
            .split(['T', 't', ' '])
            .next()
            .unwrap_or_default();

        NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|_| CalendarError::UnparseableDate(input.to_string()))
    }

    /// Normalizes an optional input, returning `None` when it is absent or blank.
    pub fn normalize_opt(&self, input: Option<&str>) -> Result<Option<NaiveDate>, CalendarError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => self.normalize(value).map(Some),
        }
    }

    /// Local midnight at the start of `date`.
    pub fn midnight(&self, date: NaiveDate) -> Result<DateTime<Tz>, CalendarError> {
        self.tz
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or(CalendarError::NonexistentMidnight(date))
    }
}
