//! Availability checker.

use chrono::{DateTime, Utc};
use clubdesk_shared::types::{BookingId, UnitId};

use super::types::{
    ActiveBooking, AvailabilityConflict, AvailabilityRequest, AvailabilitySnapshot, ConflictKind,
    OutOfOrderPeriod,
};
use crate::facility::SlotClaim;

/// Decides whether requested cells are free.
///
/// Stateless: callers load an `AvailabilitySnapshot` for the requested
/// units (inside the same transaction that will write the booking) and
/// pass it in.
pub struct AvailabilityChecker;

impl AvailabilityChecker {
    /// Checks every claimed cell on every requested unit.
    ///
    /// Days are visited in order and, per day, units in request order; the
    /// first blocked cell aborts the whole request.
    ///
    /// # Errors
    ///
    /// Returns the first `AvailabilityConflict` found.
    pub fn check(
        request: &AvailabilityRequest<'_>,
        snapshot: &AvailabilitySnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), AvailabilityConflict> {
        let mut claims = request.claims.to_vec();
        claims.sort();

        for claim in &claims {
            for unit_id in request.unit_ids {
                if let Some(kind) = Self::blocker(request, snapshot, *unit_id, claim, now) {
                    return Err(AvailabilityConflict::new(
                        kind,
                        *unit_id,
                        claim.date,
                        claim.slot,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Every blocked cell, for calendar displays.
    #[must_use]
    pub fn conflicts(
        request: &AvailabilityRequest<'_>,
        snapshot: &AvailabilitySnapshot,
        now: DateTime<Utc>,
    ) -> Vec<AvailabilityConflict> {
        let mut claims = request.claims.to_vec();
        claims.sort();

        let mut found = Vec::new();
        for claim in &claims {
            for unit_id in request.unit_ids {
                if let Some(kind) = Self::blocker(request, snapshot, *unit_id, claim, now) {
                    found.push(AvailabilityConflict::new(kind, *unit_id, claim.date, claim.slot));
                }
            }
        }
        found
    }

    fn blocker(
        request: &AvailabilityRequest<'_>,
        snapshot: &AvailabilitySnapshot,
        unit_id: UnitId,
        claim: &SlotClaim,
        now: DateTime<Utc>,
    ) -> Option<ConflictKind> {
        if snapshot
            .out_of_order
            .iter()
            .any(|period| period.unit_id == unit_id && period.span.contains(claim.date))
        {
            return Some(ConflictKind::OutOfOrder);
        }

        if snapshot.bookings.iter().any(|booking| {
            booking.unit_id == unit_id
                && Some(booking.booking_id) != request.exclude_booking
                && booking.coverage.covers(claim)
        }) {
            return Some(ConflictKind::Booked);
        }

        if snapshot
            .reservations
            .iter()
            .any(|reservation| reservation.unit_id == unit_id && reservation.coverage.covers(claim))
        {
            return Some(ConflictKind::Reserved);
        }

        if request.consider_holds
            && snapshot.holds.iter().any(|hold| {
                hold.unit_id == unit_id
                    && hold.is_active(now)
                    && Some(hold.member_id) != request.requester
                    && hold.coverage.covers(claim)
            })
        {
            return Some(ConflictKind::Held);
        }

        None
    }

    /// Bookings a maintenance window collides with.
    ///
    /// Maintenance always wins for new requests, but existing bookings are
    /// only reported, never cancelled.
    #[must_use]
    pub fn maintenance_overlaps(
        period: &OutOfOrderPeriod,
        bookings: &[ActiveBooking],
    ) -> Vec<BookingId> {
        let mut hits: Vec<BookingId> = bookings
            .iter()
            .filter(|booking| booking.unit_id == period.unit_id && booking.coverage.touches(&period.span))
            .map(|booking| booking.booking_id)
            .collect();
        hits.sort();
        hits.dedup();
        hits
    }
}
