//! Inclusive ranges of calendar days.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar days `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    /// First day covered.
    pub first: NaiveDate,
    /// Last day covered.
    pub last: NaiveDate,
}

impl DateSpan {
    /// Creates a span, returning `None` when `last` precedes `first`.
    #[must_use]
    pub fn new(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    /// A span covering a single day.
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            first: day,
            last: day,
        }
    }

    /// The nights of a stay `[check_in, check_out)`.
    ///
    /// Returns `None` for a zero-night stay.
    #[must_use]
    pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> Option<Self> {
        Self::new(check_in, check_out - Duration::days(1))
    }

    /// Returns true if `day` falls within the span.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }

    /// Returns true if the two spans share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.first <= other.last && other.first <= self.last
    }

    /// Number of days covered.
    #[must_use]
    pub fn len_days(&self) -> u32 {
        u32::try_from((self.last - self.first).num_days() + 1).unwrap_or(u32::MAX)
    }

    /// Iterates every day in the span.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first.iter_days().take_while(move |day| *day <= self.last)
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

impl std::fmt::Display for DateSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}..={}", self.first, self.last)
        }
    }
}
