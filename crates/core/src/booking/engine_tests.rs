//! Scenario tests for the booking engine.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use clubdesk_shared::types::{BookingId, MemberId, UnitId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::availability::{
    ActiveBooking, AvailabilitySnapshot, ConflictKind, Coverage, Hold, OutOfOrderPeriod,
};
use crate::calendar::{DateSpan, FixedClock};
use crate::facility::{BookingRules, FacilityType, FacilityUnit, PricingType, Rates, Slot, SlotClaim, TimeSlot};
use crate::payment::{
    NewVoucher, PaymentStatus, VoucherLine, VoucherOp, VoucherStatus, VoucherType, apply_ops,
    confirmed_net,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engines_on(today: NaiveDate) -> BookingEngines {
    let noon = NaiveDateTime::new(today, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    let clock = FixedClock::at_local(noon, chrono_tz::Asia::Karachi).unwrap();
    BookingEngines::new(&BookingRules::default(), Arc::new(clock))
}

fn unit(facility_type: FacilityType, member_rate: Decimal) -> FacilityUnit {
    FacilityUnit {
        id: UnitId::new(),
        facility_type,
        name: "Unit".to_string(),
        rates: Rates {
            member: member_rate,
            guest: member_rate * dec!(2),
            forces: None,
            corporate: None,
        },
        capacity: None,
        is_active: true,
        is_booked: false,
    }
}

fn member() -> MemberInfo {
    MemberInfo {
        id: MemberId::new(),
        name: "M1".to_string(),
        is_active: true,
    }
}

fn actor() -> Actor {
    Actor::new("admin")
}

fn room_payload(member: &MemberInfo, room: &FacilityUnit, check_in: &str, check_out: &str) -> BookingPayload {
    BookingPayload {
        member_id: Some(member.id),
        unit_ids: vec![room.id],
        start_date: Some(check_in.to_string()),
        end_date: Some(check_out.to_string()),
        pricing_type: Some(PricingType::Member),
        ..Default::default()
    }
}

fn create(
    engines: &BookingEngines,
    facility: FacilityType,
    payload: &BookingPayload,
    member: &MemberInfo,
    units: &[FacilityUnit],
    snapshot: &AvailabilitySnapshot,
) -> Result<BookingPlan, BookingError> {
    let planner = engines.planner(facility);
    let request = planner.resolve_create(payload)?;
    planner.plan_create(
        request,
        &actor(),
        &PlanContext {
            member,
            units,
            snapshot,
        },
    )
}

fn update(
    engines: &BookingEngines,
    payload: &BookingPayload,
    existing: &BookingRecord,
    member: &MemberInfo,
    units: &[FacilityUnit],
) -> Result<BookingPlan, BookingError> {
    let planner = engines.planner(existing.facility_type);
    let request = planner.resolve_update(payload, existing)?;
    planner.plan_update(
        request,
        &actor(),
        &PlanContext {
            member,
            units,
            snapshot: &AvailabilitySnapshot::default(),
        },
        existing,
    )
}

fn as_active(plan: &BookingPlan) -> Vec<ActiveBooking> {
    plan.booking
        .unit_ids
        .iter()
        .map(|unit_id| ActiveBooking {
            booking_id: plan.booking.id,
            unit_id: *unit_id,
            coverage: Coverage::from_claims(&plan.booking.claims).unwrap(),
        })
        .collect()
}

#[test]
fn test_room_create_paid_two_nights() {
    let engines = engines_on(ymd(2025, 5, 20));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let mut payload = room_payload(&m1, &r1, "2025-06-01", "2025-06-03");
    payload.payment_status = Some(PaymentStatus::Paid);

    let plan = create(
        &engines,
        FacilityType::Room,
        &payload,
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    assert_eq!(plan.booking.total_price, dec!(10000));
    assert_eq!(plan.booking.paid_amount, dec!(10000));
    assert_eq!(plan.booking.pending_amount, dec!(0));
    assert_eq!(plan.booking.payment_status, PaymentStatus::Paid);
    assert_eq!(
        plan.payment.voucher_ops,
        vec![VoucherOp::Issue(NewVoucher {
            voucher_type: VoucherType::FullPayment,
            status: VoucherStatus::Confirmed,
            amount: dec!(10000),
            remarks: "Booking Payment".to_string(),
        })]
    );
    assert_eq!(plan.payment.ledger.paid, dec!(10000));
    // Today is before the stay: occupancy untouched.
    assert!(plan.occupancy.is_empty());
    assert_eq!(plan.holds.member_id, m1.id);
    assert_eq!(plan.holds.span, DateSpan::new(ymd(2025, 6, 1), ymd(2025, 6, 2)).unwrap());
    assert_eq!(plan.booking.created_by, "admin");
}

#[test]
fn test_room_marked_booked_when_stay_includes_today() {
    let engines = engines_on(ymd(2025, 6, 1));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let plan = create(
        &engines,
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-01", "2025-06-03"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();
    assert_eq!(plan.occupancy, vec![OccupancyChange::Occupy(r1.id)]);
}

#[test]
fn test_hall_session_conflict_and_free_session() {
    let engines = engines_on(ymd(2025, 7, 1));
    let m1 = member();
    let m2 = member();
    let h1 = unit(FacilityType::Hall, dec!(20000));
    let mut payload = BookingPayload {
        member_id: Some(m1.id),
        unit_id: Some(h1.id),
        start_date: Some("2025-07-10".to_string()),
        time_slot: Some(TimeSlot::Morning),
        ..Default::default()
    };
    let first = create(
        &engines,
        FacilityType::Hall,
        &payload,
        &m1,
        &[h1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();
    let snapshot = AvailabilitySnapshot {
        bookings: as_active(&first),
        ..Default::default()
    };

    payload.member_id = Some(m2.id);
    let err = create(&engines, FacilityType::Hall, &payload, &m2, &[h1.clone()], &snapshot).unwrap_err();
    match err {
        BookingError::Unavailable(conflict) => {
            assert_eq!(conflict.kind, ConflictKind::Booked);
            assert_eq!(conflict.unit_id, h1.id);
            assert_eq!(conflict.date, ymd(2025, 7, 10));
            assert_eq!(conflict.slot, Slot::Session(TimeSlot::Morning));
        }
        other => panic!("expected BOOKED conflict, got {other:?}"),
    }

    payload.time_slot = Some(TimeSlot::Evening);
    assert!(create(&engines, FacilityType::Hall, &payload, &m2, &[h1], &snapshot).is_ok());
}

#[test]
fn test_cancel_releases_units_and_is_terminal() {
    let engines = engines_on(ymd(2025, 6, 1));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let r2 = unit(FacilityType::Room, dec!(5000));
    let mut payload = room_payload(&m1, &r1, "2025-06-01", "2025-06-03");
    payload.unit_ids.push(r2.id);
    payload.payment_status = Some(PaymentStatus::Paid);
    let plan = create(
        &engines,
        FacilityType::Room,
        &payload,
        &m1,
        &[r1.clone(), r2.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let planner = engines.planner(FacilityType::Room);
    let cancel = planner.plan_cancel(&plan.booking, &actor()).unwrap();
    assert!(cancel.booking.is_cancelled);
    assert_eq!(
        cancel.occupancy,
        vec![OccupancyChange::Release(r1.id), OccupancyChange::Release(r2.id)]
    );
    // Money fields are untouched.
    assert_eq!(cancel.booking.paid_amount, plan.booking.paid_amount);

    assert!(matches!(
        planner.plan_cancel(&cancel.booking, &actor()),
        Err(BookingError::BookingCancelled(_))
    ));
    assert!(matches!(
        engines.planner(FacilityType::Hall).plan_cancel(&plan.booking, &actor()),
        Err(BookingError::FacilityMismatch { .. })
    ));
}

#[test]
fn test_update_extending_paid_stay_downgrades() {
    let engines = engines_on(ymd(2025, 5, 20));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let mut payload = room_payload(&m1, &r1, "2025-06-01", "2025-06-03");
    payload.payment_status = Some(PaymentStatus::Paid);
    let created = create(
        &engines,
        FacilityType::Room,
        &payload,
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let change = BookingPayload {
        end_date: Some("2025-06-04".to_string()),
        ..Default::default()
    };
    let plan = update(&engines, &change, &created.booking, &m1, &[r1]).unwrap();

    assert_eq!(plan.booking.total_price, dec!(15000));
    assert_eq!(plan.booking.payment_status, PaymentStatus::HalfPaid);
    assert_eq!(plan.booking.paid_amount, dec!(10000));
    assert_eq!(plan.booking.pending_amount, dec!(5000));
    assert_eq!(plan.payment.voucher_ops, vec![VoucherOp::RetagFullToHalf]);
    assert_eq!(plan.booking.id, created.booking.id);
    assert!(plan.previous.is_some());

    let mut trail = Vec::<VoucherLine>::new();
    apply_ops(&mut trail, &created.payment.voucher_ops);
    apply_ops(&mut trail, &plan.payment.voucher_ops);
    assert_eq!(confirmed_net(&trail), plan.booking.paid_amount);
}

#[test]
fn test_update_without_changes_keeps_price() {
    let engines = engines_on(ymd(2025, 5, 20));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let created = create(
        &engines,
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-01", "2025-06-03"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let mut repriced = r1.clone();
    repriced.rates.member = dec!(7000);
    let plan = update(
        &engines,
        &BookingPayload {
            remarks: Some("late arrival".to_string()),
            ..Default::default()
        },
        &created.booking,
        &m1,
        &[repriced],
    )
    .unwrap();
    assert_eq!(plan.booking.total_price, dec!(10000));
    assert_eq!(plan.booking.remarks.as_deref(), Some("late arrival"));
    assert!(plan.payment.ledger.is_zero());
}

#[test]
fn test_update_moving_room_releases_old_one() {
    let engines = engines_on(ymd(2025, 6, 1));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let r2 = unit(FacilityType::Room, dec!(5000));
    let created = create(
        &engines,
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-01", "2025-06-03"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let plan = update(
        &engines,
        &BookingPayload {
            unit_ids: vec![r2.id],
            ..Default::default()
        },
        &created.booking,
        &m1,
        &[r1.clone(), r2.clone()],
    )
    .unwrap();
    assert_eq!(
        plan.occupancy,
        vec![OccupancyChange::Occupy(r2.id), OccupancyChange::Release(r1.id)]
    );
}

#[test]
fn test_update_past_start_allowed_when_unchanged() {
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let created = create(
        &engines_on(ymd(2025, 6, 1)),
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-01", "2025-06-05"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let later = engines_on(ymd(2025, 6, 3));
    let pay = BookingPayload {
        payment_status: Some(PaymentStatus::Paid),
        ..Default::default()
    };
    assert!(update(&later, &pay, &created.booking, &m1, &[r1.clone()]).is_ok());

    let move_start = BookingPayload {
        start_date: Some("2025-06-02".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        update(&later, &move_start, &created.booking, &m1, &[r1]),
        Err(BookingError::StartInPast { .. })
    ));
}

#[test]
fn test_update_rejects_member_change() {
    let engines = engines_on(ymd(2025, 6, 1));
    let m1 = member();
    let m2 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let created = create(
        &engines,
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-10", "2025-06-12"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let same = BookingPayload {
        member_id: Some(m1.id),
        remarks: Some("same member".to_string()),
        ..Default::default()
    };
    assert!(update(&engines, &same, &created.booking, &m1, &[r1.clone()]).is_ok());

    let other = BookingPayload {
        member_id: Some(m2.id),
        ..Default::default()
    };
    let err = update(&engines, &other, &created.booking, &m1, &[r1]).unwrap_err();
    assert_eq!(err.error_code(), "MEMBER_CHANGE_NOT_ALLOWED");
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        BookingError::MemberChangeNotAllowed {
            booking,
            current,
            requested,
        } => {
            assert_eq!(booking, created.booking.id);
            assert_eq!(current, m1.id);
            assert_eq!(requested, m2.id);
        }
        other => panic!("expected member change error, got {other:?}"),
    }
}

#[test]
fn test_range_longer_than_limit_rejected() {
    let engines = engines_on(ymd(2025, 6, 1));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let units = [r1.clone()];
    let empty = AvailabilitySnapshot::default();

    let longest = room_payload(&m1, &r1, "2025-06-20", "2025-09-18");
    let plan = create(&engines, FacilityType::Room, &longest, &m1, &units, &empty).unwrap();
    assert_eq!(plan.booking.claims.len(), 90);

    let one_more = room_payload(&m1, &r1, "2025-06-20", "2025-09-19");
    assert!(matches!(
        create(&engines, FacilityType::Room, &one_more, &m1, &units, &empty),
        Err(BookingError::RangeTooLong { days: 91, max: 90 })
    ));

    let h1 = unit(FacilityType::Hall, dec!(20000));
    let endless = BookingPayload {
        member_id: Some(m1.id),
        unit_id: Some(h1.id),
        start_date: Some("2025-07-10".to_string()),
        end_date: Some("9999-12-31".to_string()),
        time_slot: Some(TimeSlot::Morning),
        ..Default::default()
    };
    let err = create(&engines, FacilityType::Hall, &endless, &m1, &[h1], &empty).unwrap_err();
    assert_eq!(err.error_code(), "RANGE_TOO_LONG");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_update_cannot_stretch_past_limit() {
    let noon = NaiveDateTime::new(ymd(2025, 6, 1), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    let clock = FixedClock::at_local(noon, chrono_tz::Asia::Karachi).unwrap();
    let rules = BookingRules {
        max_booking_days: 3,
        ..BookingRules::default()
    };
    let engines = BookingEngines::new(&rules, Arc::new(clock));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let created = create(
        &engines,
        FacilityType::Room,
        &room_payload(&m1, &r1, "2025-06-10", "2025-06-13"),
        &m1,
        &[r1.clone()],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();

    let stretch = BookingPayload {
        end_date: Some("2025-06-14".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        update(&engines, &stretch, &created.booking, &m1, &[r1]),
        Err(BookingError::RangeTooLong { days: 4, max: 3 })
    ));
}

#[test]
fn test_create_validation_errors() {
    let engines = engines_on(ymd(2025, 6, 10));
    let m1 = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let units = [r1.clone()];
    let empty = AvailabilitySnapshot::default();

    let past = room_payload(&m1, &r1, "2025-06-01", "2025-06-03");
    assert!(matches!(
        create(&engines, FacilityType::Room, &past, &m1, &units, &empty),
        Err(BookingError::StartInPast { .. })
    ));

    let reversed = room_payload(&m1, &r1, "2025-06-20", "2025-06-18");
    assert!(matches!(
        create(&engines, FacilityType::Room, &reversed, &m1, &units, &empty),
        Err(BookingError::InvalidDateRange { .. })
    ));

    let mut garbled = room_payload(&m1, &r1, "2025-06-20", "2025-06-22");
    garbled.start_date = Some("20/06/2025".to_string());
    let err = create(&engines, FacilityType::Room, &garbled, &m1, &units, &empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut guest = room_payload(&m1, &r1, "2025-06-20", "2025-06-22");
    guest.pricing_type = Some(PricingType::Guest);
    guest.guest_name = Some("  ".to_string());
    assert!(matches!(
        create(&engines, FacilityType::Room, &guest, &m1, &units, &empty),
        Err(BookingError::GuestDetailsRequired)
    ));

    let mut crowded = room_payload(&m1, &r1, "2025-06-20", "2025-06-22");
    crowded.occupants = Some(7);
    assert!(matches!(
        create(&engines, FacilityType::Room, &crowded, &m1, &units, &empty),
        Err(BookingError::CapacityExceeded { .. })
    ));

    let missing = room_payload(&m1, &unit(FacilityType::Room, dec!(1)), "2025-06-20", "2025-06-22");
    assert!(matches!(
        create(&engines, FacilityType::Room, &missing, &m1, &units, &empty),
        Err(BookingError::UnitNotFound(_))
    ));

    let hall = unit(FacilityType::Hall, dec!(1));
    let wrong_type = room_payload(&m1, &hall, "2025-06-20", "2025-06-22");
    assert!(matches!(
        create(&engines, FacilityType::Room, &wrong_type, &m1, &[hall], &empty),
        Err(BookingError::UnitTypeMismatch { .. })
    ));

    let mut inactive = m1.clone();
    inactive.is_active = false;
    let ok_payload = room_payload(&m1, &r1, "2025-06-20", "2025-06-22");
    assert!(matches!(
        create(&engines, FacilityType::Room, &ok_payload, &inactive, &units, &empty),
        Err(BookingError::MemberInactive(_))
    ));

    let mut half = room_payload(&m1, &r1, "2025-06-20", "2025-06-22");
    half.payment_status = Some(PaymentStatus::HalfPaid);
    half.paid_amount = Some(dec!(10000));
    let err = create(&engines, FacilityType::Room, &half, &m1, &units, &empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_only_rooms_take_several_units() {
    let engines = engines_on(ymd(2025, 7, 1));
    let payload = BookingPayload {
        member_id: Some(MemberId::new()),
        unit_ids: vec![UnitId::new(), UnitId::new()],
        start_date: Some("2025-07-10".to_string()),
        time_slot: Some(TimeSlot::Night),
        ..Default::default()
    };
    assert!(matches!(
        engines.planner(FacilityType::Lawn).resolve_create(&payload),
        Err(BookingError::MultipleUnitsNotAllowed(FacilityType::Lawn))
    ));
}

#[test]
fn test_photoshoot_blocks_from_payload() {
    let engines = engines_on(ymd(2025, 7, 1));
    let m1 = member();
    let studio = unit(FacilityType::Photoshoot, dec!(3500));
    let payload = BookingPayload {
        member_id: Some(m1.id),
        unit_id: Some(studio.id),
        start_date: Some("2025-08-01T00:00:00.000Z".to_string()),
        start_time: Some("11:00".to_string()),
        ..Default::default()
    };
    let plan = create(
        &engines,
        FacilityType::Photoshoot,
        &payload,
        &m1,
        &[studio],
        &AvailabilitySnapshot::default(),
    )
    .unwrap();
    assert_eq!(
        plan.booking.claims,
        vec![SlotClaim::new(
            ymd(2025, 8, 1),
            Slot::Block(NaiveTime::from_hms_opt(11, 0, 0).unwrap())
        )]
    );
    assert_eq!(plan.booking.total_price, dec!(3500));
}

#[test]
fn test_holds_block_others_not_their_owner() {
    let engines = engines_on(ymd(2025, 5, 20));
    let planner = engines.planner(FacilityType::Room);
    let owner = member();
    let other = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let units = [r1.clone()];

    let target = planner
        .resolve_target(&room_payload(&owner, &r1, "2025-06-01", "2025-06-03"), None)
        .unwrap();
    let holds = planner
        .plan_hold(
            &target,
            &PlanContext {
                member: &owner,
                units: &units,
                snapshot: &AvailabilitySnapshot::default(),
            },
        )
        .unwrap();
    assert_eq!(holds.len(), 1);
    assert_eq!(holds[0].expires_at, planner.now() + Duration::minutes(15));

    let snapshot = AvailabilitySnapshot {
        holds: holds.clone(),
        ..Default::default()
    };
    let err = create(
        &engines,
        FacilityType::Room,
        &room_payload(&other, &r1, "2025-06-02", "2025-06-04"),
        &other,
        &units,
        &snapshot,
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "HELD");

    assert!(create(
        &engines,
        FacilityType::Room,
        &room_payload(&owner, &r1, "2025-06-01", "2025-06-03"),
        &owner,
        &units,
        &snapshot,
    )
    .is_ok());

    let reservations = planner.plan_reservation(&target, &units, &snapshot).unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].unit_id, r1.id);
}

#[test]
fn test_expired_hold_is_ignored() {
    let engines = engines_on(ymd(2025, 5, 20));
    let other = member();
    let r1 = unit(FacilityType::Room, dec!(5000));
    let stale = Hold {
        id: clubdesk_shared::types::HoldId::new(),
        unit_id: r1.id,
        member_id: MemberId::new(),
        coverage: Coverage::full_days(DateSpan::new(ymd(2025, 6, 1), ymd(2025, 6, 5)).unwrap()),
        expires_at: engines.planner(FacilityType::Room).now() - Duration::minutes(1),
    };
    let snapshot = AvailabilitySnapshot {
        holds: vec![stale],
        ..Default::default()
    };
    assert!(create(
        &engines,
        FacilityType::Room,
        &room_payload(&other, &r1, "2025-06-01", "2025-06-03"),
        &other,
        &[r1],
        &snapshot,
    )
    .is_ok());
}

#[test]
fn test_out_of_order_flags_existing_bookings() {
    let engines = engines_on(ymd(2025, 5, 20));
    let planner = engines.planner(FacilityType::Room);
    let r1 = unit(FacilityType::Room, dec!(5000));
    let booked = ActiveBooking {
        booking_id: BookingId::new(),
        unit_id: r1.id,
        coverage: Coverage::full_days(DateSpan::new(ymd(2025, 6, 1), ymd(2025, 6, 2)).unwrap()),
    };

    let (period, overlaps) = planner
        .plan_out_of_order(&r1, "2025-06-02", Some("2025-06-04"), "Leaking roof", &[booked.clone()])
        .unwrap();
    assert_eq!(overlaps, vec![booked.booking_id]);
    assert_eq!(period.span, DateSpan::new(ymd(2025, 6, 2), ymd(2025, 6, 4)).unwrap());
    assert!(planner.ensure_out_of_order_mutable(&period).is_ok());

    assert!(matches!(
        planner.plan_out_of_order(&r1, "2025-05-01", Some("2025-05-02"), "Old", &[]),
        Err(BookingError::PeriodEnded { .. })
    ));
    assert!(matches!(
        planner.plan_out_of_order(&r1, "2025-06-02", None, " ", &[]),
        Err(BookingError::MissingField("reason"))
    ));

    let ended = OutOfOrderPeriod {
        span: DateSpan::single(ymd(2025, 5, 1)),
        ..period
    };
    assert!(matches!(
        planner.ensure_out_of_order_mutable(&ended),
        Err(BookingError::OutOfOrderLocked(_))
    ));
}

#[test]
fn test_payload_accepts_facility_field_names() {
    let room_id = UnitId::new();
    let json = format!(
        r#"{{"memberId":"{}","roomIds":["{room_id}"],"checkIn":"2025-06-01","checkOut":"2025-06-03","pricingType":"forces-guest","paymentStatus":"HALF_PAID","paidAmount":"2500"}}"#,
        MemberId::new()
    );
    let payload: BookingPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(payload.unit_ids, vec![room_id]);
    assert_eq!(payload.start_date.as_deref(), Some("2025-06-01"));
    assert_eq!(payload.end_date.as_deref(), Some("2025-06-03"));
    assert_eq!(payload.pricing_type, Some(PricingType::ForcesGuest));
    assert_eq!(payload.paid_amount, Some(dec!(2500)));

    let hall_id = UnitId::new();
    let json = format!(
        r#"{{"hallId":"{hall_id}","bookingDate":"2025-07-10","endDate":"2025-07-11","timeSlot":"EVENING","bookingDetails":[{{"date":"2025-07-10","timeSlot":"NIGHT"}}]}}"#
    );
    let payload: BookingPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(payload.unit_id, Some(hall_id));
    assert_eq!(payload.time_slot, Some(TimeSlot::Evening));
    assert_eq!(payload.booking_details.len(), 1);
}
