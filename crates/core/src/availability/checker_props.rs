//! Property-based tests for AvailabilityChecker.
//!
//! - No double-booking: bookings accepted one after another never share a cell
//! - Exclusion: a booking never conflicts with itself on update

use chrono::{NaiveDate, NaiveTime, Utc};
use clubdesk_shared::types::{BookingId, UnitId};
use proptest::prelude::*;

use super::checker::AvailabilityChecker;
use super::types::{ActiveBooking, AvailabilityRequest, AvailabilitySnapshot, Coverage};
use crate::facility::{Slot, SlotClaim, TimeSlot};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

/// Strategy for a slot of any granularity.
fn slot_strategy() -> impl Strategy<Value = Slot> {
    prop_oneof![
        Just(Slot::FullDay),
        Just(Slot::Session(TimeSlot::Morning)),
        Just(Slot::Session(TimeSlot::Evening)),
        Just(Slot::Session(TimeSlot::Night)),
        (0u32..6).prop_map(|i| Slot::Block(NaiveTime::from_hms_opt(9 + 2 * i, 0, 0).unwrap())),
    ]
}

/// Strategy for one request: unit index plus a few cells within two weeks.
fn request_strategy() -> impl Strategy<Value = (usize, Vec<SlotClaim>)> {
    (
        0usize..3,
        prop::collection::vec(
            (0i64..14, slot_strategy()).prop_map(|(offset, slot)| {
                SlotClaim::new(base_date() + chrono::Duration::days(offset), slot)
            }),
            1..4,
        ),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_accepted_bookings_never_overlap(requests in prop::collection::vec(request_strategy(), 1..20)) {
        let units = [UnitId::new(), UnitId::new(), UnitId::new()];
        let mut snapshot = AvailabilitySnapshot::default();
        let now = Utc::now();

        for (unit_index, claims) in &requests {
            let unit = [units[*unit_index]];
            let request = AvailabilityRequest::new(&unit, claims);
            if AvailabilityChecker::check(&request, &snapshot, now).is_ok() {
                snapshot.bookings.push(ActiveBooking {
                    booking_id: BookingId::new(),
                    unit_id: unit[0],
                    coverage: Coverage::from_claims(claims).unwrap(),
                });
            }
        }

        for (i, a) in snapshot.bookings.iter().enumerate() {
            for b in snapshot.bookings.iter().skip(i + 1) {
                if a.unit_id != b.unit_id {
                    continue;
                }
                for cell in &a.coverage.details {
                    prop_assert!(!b.coverage.covers(cell));
                }
            }
        }
    }

    #[test]
    fn prop_booking_never_conflicts_with_itself((unit_index, claims) in request_strategy()) {
        let units = [UnitId::new(), UnitId::new(), UnitId::new()];
        let existing = ActiveBooking {
            booking_id: BookingId::new(),
            unit_id: units[unit_index],
            coverage: Coverage::from_claims(&claims).unwrap(),
        };
        let own_id = existing.booking_id;
        let snapshot = AvailabilitySnapshot {
            bookings: vec![existing],
            ..Default::default()
        };
        let unit = [units[unit_index]];

        let blocked = AvailabilityRequest::new(&unit, &claims);
        prop_assert!(AvailabilityChecker::check(&blocked, &snapshot, Utc::now()).is_err());

        let update = AvailabilityRequest::new(&unit, &claims).excluding(Some(own_id));
        prop_assert!(AvailabilityChecker::check(&update, &snapshot, Utc::now()).is_ok());
    }
}
