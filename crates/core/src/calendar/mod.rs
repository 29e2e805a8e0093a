//! Calendar handling for the club.
//!
//! Every booking decision is made in terms of calendar days local to the
//! club's operating timezone. This module owns the three pieces that make
//! that safe:
//! - `Clock` - injectable source of "now"
//! - `DateNormalizer` - turns caller-supplied date strings into calendar days
//! - `DateSpan` - inclusive ranges of calendar days

pub mod clock;
pub mod error;
pub mod normalize;
pub mod span;

pub use clock::{Clock, FixedClock, SystemClock, parse_timezone};
pub use error::CalendarError;
pub use normalize::DateNormalizer;
pub use span::DateSpan;
