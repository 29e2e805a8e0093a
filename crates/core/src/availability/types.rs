//! Availability domain types.

use chrono::{DateTime, NaiveDate, Utc};
use clubdesk_shared::types::{BookingId, HoldId, MemberId, OutOfOrderId, ReservationId, UnitId};
use serde::{Deserialize, Serialize};

use crate::calendar::DateSpan;
use crate::facility::{Slot, SlotClaim};

/// What blocks a cell, in reporting precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// Maintenance window.
    OutOfOrder,
    /// Another booking.
    Booked,
    /// Staff reservation.
    Reserved,
    /// Another member's checkout hold.
    Held,
}

impl ConflictKind {
    /// Stable code, also used as the API error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfOrder => "OUT_OF_ORDER",
            Self::Booked => "BOOKED",
            Self::Reserved => "RESERVED",
            Self::Held => "HELD",
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::OutOfOrder => "out of order",
            Self::Booked => "already booked",
            Self::Reserved => "reserved",
            Self::Held => "held by another member",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The exact cell that blocked a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct AvailabilityConflict {
    /// What blocks the cell.
    pub kind: ConflictKind,
    /// The blocked unit.
    pub unit_id: UnitId,
    /// The blocked day.
    pub date: NaiveDate,
    /// The blocked slot.
    pub slot: Slot,
    /// Human-readable reason.
    pub message: String,
}

impl AvailabilityConflict {
    /// Builds a conflict with a message naming the unit, day and slot.
    #[must_use]
    pub fn new(kind: ConflictKind, unit_id: UnitId, date: NaiveDate, slot: Slot) -> Self {
        let message = match slot {
            Slot::FullDay => format!("{kind}: unit {unit_id} is {} on {date}", kind.describe()),
            _ => format!(
                "{kind}: unit {unit_id} is {} on {date} ({slot})",
                kind.describe()
            ),
        };
        Self {
            kind,
            unit_id,
            date,
            slot,
            message,
        }
    }
}

/// The (day, slot) cells a booking, reservation or hold occupies.
///
/// Records may carry a granular detail list; when present it takes
/// precedence over the single range and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// Legacy single range.
    pub span: DateSpan,
    /// Legacy single slot; `None` covers whole days.
    pub slot: Option<Slot>,
    /// Granular cells.
    pub details: Vec<SlotClaim>,
}

impl Coverage {
    /// Whole days over a span.
    #[must_use]
    pub const fn full_days(span: DateSpan) -> Self {
        Self {
            span,
            slot: None,
            details: Vec::new(),
        }
    }

    /// One slot on every day of a span.
    #[must_use]
    pub const fn range(span: DateSpan, slot: Slot) -> Self {
        Self {
            span,
            slot: Some(slot),
            details: Vec::new(),
        }
    }

    /// Explicit cells. Returns `None` when empty.
    #[must_use]
    pub fn from_claims(claims: &[SlotClaim]) -> Option<Self> {
        let first = claims.iter().map(|c| c.date).min()?;
        let last = claims.iter().map(|c| c.date).max()?;
        let mut details = claims.to_vec();
        details.sort();
        details.dedup();
        Some(Self {
            span: DateSpan::new(first, last)?,
            slot: None,
            details,
        })
    }

    /// Returns true if the claimed cell collides with this coverage.
    #[must_use]
    pub fn covers(&self, claim: &SlotClaim) -> bool {
        if !self.details.is_empty() {
            return self.details.iter().any(|cell| cell.overlaps(claim));
        }
        self.span.contains(claim.date)
            && self.slot.is_none_or(|slot| slot.overlaps(&claim.slot))
    }

    /// Returns true if any cell of this coverage falls on a day of `span`.
    #[must_use]
    pub fn touches(&self, span: &DateSpan) -> bool {
        if self.details.is_empty() {
            self.span.overlaps(span)
        } else {
            self.details.iter().any(|cell| span.contains(cell.date))
        }
    }

    /// Returns true if the coverage includes any slot of `day`.
    #[must_use]
    pub fn includes_day(&self, day: NaiveDate) -> bool {
        self.touches(&DateSpan::single(day))
    }
}

/// Maintenance window on a unit; blocks whole days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfOrderPeriod {
    /// Period ID.
    pub id: OutOfOrderId,
    /// Affected unit.
    pub unit_id: UnitId,
    /// Days out of order, inclusive.
    pub span: DateSpan,
    /// Why the unit is unavailable.
    pub reason: String,
}

/// A non-cancelled booking's claim on one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBooking {
    /// Booking ID.
    pub booking_id: BookingId,
    /// Claimed unit.
    pub unit_id: UnitId,
    /// Claimed cells.
    pub coverage: Coverage,
}

/// Staff block on a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation ID.
    pub id: ReservationId,
    /// Blocked unit.
    pub unit_id: UnitId,
    /// Blocked cells.
    pub coverage: Coverage,
}

/// A member's temporary checkout claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Hold ID.
    pub id: HoldId,
    /// Held unit.
    pub unit_id: UnitId,
    /// Member mid-checkout.
    pub member_id: MemberId,
    /// Held cells.
    pub coverage: Coverage,
    /// After this instant the hold is ignored.
    pub expires_at: DateTime<Utc>,
}

impl Hold {
    /// Returns true while the hold has not expired.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Everything that may block the requested units, loaded in one pass.
#[derive(Debug, Clone, Default)]
pub struct AvailabilitySnapshot {
    /// Maintenance windows.
    pub out_of_order: Vec<OutOfOrderPeriod>,
    /// Non-cancelled bookings.
    pub bookings: Vec<ActiveBooking>,
    /// Staff reservations.
    pub reservations: Vec<Reservation>,
    /// Holds, expired or not.
    pub holds: Vec<Hold>,
}

/// A candidate claim to check.
#[derive(Debug, Clone)]
pub struct AvailabilityRequest<'a> {
    /// Every unit the request targets.
    pub unit_ids: &'a [UnitId],
    /// Cells claimed on each unit.
    pub claims: &'a [SlotClaim],
    /// Booking being updated; its own claims never conflict.
    pub exclude_booking: Option<BookingId>,
    /// Member whose own holds never conflict.
    pub requester: Option<MemberId>,
    /// Staff reservations skip holds entirely.
    pub consider_holds: bool,
}

impl<'a> AvailabilityRequest<'a> {
    /// A request that considers every source.
    #[must_use]
    pub const fn new(unit_ids: &'a [UnitId], claims: &'a [SlotClaim]) -> Self {
        Self {
            unit_ids,
            claims,
            exclude_booking: None,
            requester: None,
            consider_holds: true,
        }
    }

    /// Ignores the given booking (self, on update).
    #[must_use]
    pub const fn excluding(mut self, booking: Option<BookingId>) -> Self {
        self.exclude_booking = booking;
        self
    }

    /// Ignores the given member's holds.
    #[must_use]
    pub const fn for_member(mut self, member: Option<MemberId>) -> Self {
        self.requester = member;
        self
    }

    /// Skips holds.
    #[must_use]
    pub const fn ignoring_holds(mut self) -> Self {
        self.consider_holds = false;
        self
    }
}
