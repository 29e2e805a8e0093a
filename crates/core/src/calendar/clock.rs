//! Injectable clock.
//!
//! Comparisons against "today" go through a `Clock` so that tests can pin
//! the current instant and the engine never reads the system time directly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::error::CalendarError;

/// Source of the current instant in the club's timezone.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// The club's operating timezone.
    fn timezone(&self) -> Tz;

    /// The current instant in the club's timezone.
    fn now(&self) -> DateTime<Tz> {
        self.now_utc().with_timezone(&self.timezone())
    }

    /// The current calendar day in the club's timezone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Parses an IANA timezone name such as `Asia/Karachi`.
pub fn parse_timezone(name: &str) -> Result<Tz, CalendarError> {
    name.parse::<Tz>()
        .map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    /// Creates a system clock for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Creates a system clock from an IANA timezone name.
    pub fn from_name(name: &str) -> Result<Self, CalendarError> {
        Ok(Self::new(parse_timezone(name)?))
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self { instant, tz }
    }

    /// Creates a clock pinned to a wall-clock time in `tz`.
    ///
    /// Ambiguous local times resolve to the earlier instant.
    pub fn at_local(local: NaiveDateTime, tz: Tz) -> Result<Self, CalendarError> {
        let instant = tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or(CalendarError::NonexistentMidnight(local.date()))?;
        Ok(Self::new(instant.with_timezone(&Utc), tz))
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.instant
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}
