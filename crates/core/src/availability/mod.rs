//! Availability checking.
//!
//! Four sources can block a (unit, day, slot) cell:
//! - out-of-order periods (maintenance)
//! - non-cancelled bookings
//! - administrative reservations
//! - active holds of other members
//!
//! All four block equally; the first one found, in that order, is reported.

pub mod checker;
pub mod types;

#[cfg(test)]
mod checker_props;

pub use checker::AvailabilityChecker;
pub use types::{
    ActiveBooking, AvailabilityConflict, AvailabilityRequest, AvailabilitySnapshot, ConflictKind,
    Coverage, Hold, OutOfOrderPeriod, Reservation,
};
