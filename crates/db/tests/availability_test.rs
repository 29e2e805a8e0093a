//! Integration tests for holds, reservations and out-of-order periods.

mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

use clubdesk_core::availability::ConflictKind;
use clubdesk_core::booking::BookingError;
use clubdesk_core::facility::FacilityType;
use clubdesk_db::entities::{holds, out_of_order_periods};
use clubdesk_db::{
    BookingRepository, HoldRepository, OutOfOrderRepository, RepositoryError,
    ReservationRepository,
};
use clubdesk_shared::types::OutOfOrderId;

use common::{actor, connect, create_member, create_unit, date, engines_on, payload};

fn conflict_kind(err: &RepositoryError) -> Option<ConflictKind> {
    match err {
        RepositoryError::Booking(BookingError::Unavailable(conflict)) => Some(conflict.kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_hold_blocks_other_members_only() {
    let Some(db) = connect().await else { return };
    // Later than the purge test's clock, so its purge never sees this hold.
    let engines = engines_on(date(2031, 1, 1));
    let bookings = BookingRepository::new(db.clone(), engines.clone());
    let holds_repo = HoldRepository::new(db.clone(), engines);
    let owner = create_member(&db, true).await;
    let other = create_member(&db, true).await;
    let room = create_unit(&db, FacilityType::Room, dec!(2500), None).await;

    let stay = |member: String| {
        payload(json!({
            "memberId": member,
            "roomIds": [room.to_string()],
            "checkIn": "2031-06-01",
            "checkOut": "2031-06-04",
        }))
    };

    let created = holds_repo
        .create_hold(FacilityType::Room, &stay(owner.to_string()))
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].member_id, owner);

    let err = bookings
        .create_booking(FacilityType::Room, &stay(other.to_string()), &actor())
        .await
        .unwrap_err();
    assert_eq!(conflict_kind(&err), Some(ConflictKind::Held));

    bookings
        .create_booking(FacilityType::Room, &stay(owner.to_string()), &actor())
        .await
        .expect("owner books through their own hold");

    let remaining = holds::Entity::find()
        .filter(holds::Column::UnitId.eq(room.into_inner()))
        .all(&db)
        .await
        .unwrap();
    assert!(remaining.is_empty(), "booking releases the owner's holds");
}

#[tokio::test]
async fn test_release_and_purge_holds() {
    let Some(db) = connect().await else { return };
    let member = create_member(&db, true).await;
    let first = create_unit(&db, FacilityType::Room, dec!(2500), None).await;
    let second = create_unit(&db, FacilityType::Room, dec!(2500), None).await;
    let repo = HoldRepository::new(db.clone(), engines_on(date(2030, 5, 1)));

    repo.create_hold(
        FacilityType::Room,
        &payload(json!({
            "memberId": member.to_string(),
            "roomIds": [first.to_string(), second.to_string()],
            "checkIn": "2030-07-01",
            "checkOut": "2030-07-02",
        })),
    )
    .await
    .unwrap();

    let released = repo.release_holds(member, &[first]).await.unwrap();
    assert_eq!(released, 1);

    // A day later the remaining hold has long expired.
    let later = HoldRepository::new(db.clone(), engines_on(date(2030, 5, 2)));
    let purged = later.purge_expired_holds().await.unwrap();
    assert!(purged >= 1);

    let remaining = holds::Entity::find()
        .filter(holds::Column::MemberId.eq(member.into_inner()))
        .all(&db)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_reservation_blocks_until_deleted() {
    let Some(db) = connect().await else { return };
    let engines = engines_on(date(2030, 5, 1));
    let bookings = BookingRepository::new(db.clone(), engines.clone());
    let reservations = ReservationRepository::new(db.clone(), engines);
    let member = create_member(&db, true).await;
    let hall = create_unit(&db, FacilityType::Hall, dec!(15000), None).await;

    let request = payload(json!({
        "memberId": member.to_string(),
        "hallId": hall.to_string(),
        "bookingDate": "2030-08-15",
        "timeSlot": "MORNING",
    }));

    let reserved = reservations
        .create_reservation(FacilityType::Hall, &request, &actor())
        .await
        .unwrap();
    assert_eq!(reserved.len(), 1);

    let err = bookings
        .create_booking(FacilityType::Hall, &request, &actor())
        .await
        .unwrap_err();
    assert_eq!(conflict_kind(&err), Some(ConflictKind::Reserved));

    reservations.delete_reservation(reserved[0].id).await.unwrap();
    bookings
        .create_booking(FacilityType::Hall, &request, &actor())
        .await
        .expect("slot is free once the reservation is gone");

    let err = reservations
        .delete_reservation(reserved[0].id)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "RESERVATION_NOT_FOUND");
}

#[tokio::test]
async fn test_out_of_order_flags_overlapping_bookings() {
    let Some(db) = connect().await else { return };
    let engines = engines_on(date(2030, 5, 1));
    let bookings = BookingRepository::new(db.clone(), engines.clone());
    let maintenance = OutOfOrderRepository::new(db.clone(), engines);
    let member = create_member(&db, true).await;
    let room = create_unit(&db, FacilityType::Room, dec!(2000), None).await;

    let booking = bookings
        .create_booking(
            FacilityType::Room,
            &payload(json!({
                "memberId": member.to_string(),
                "roomIds": [room.to_string()],
                "checkIn": "2030-06-10",
                "checkOut": "2030-06-12",
            })),
            &actor(),
        )
        .await
        .unwrap();

    let report = maintenance
        .create_out_of_order(
            FacilityType::Room,
            room,
            "2030-06-11",
            Some("2030-06-15"),
            "Plumbing",
            &actor(),
        )
        .await
        .unwrap();
    assert_eq!(report.overlapping_bookings, vec![booking.id]);
    assert_eq!(report.period.span.first, date(2030, 6, 11));

    let err = bookings
        .create_booking(
            FacilityType::Room,
            &payload(json!({
                "memberId": member.to_string(),
                "roomIds": [room.to_string()],
                "checkIn": "2030-06-13",
                "checkOut": "2030-06-14",
            })),
            &actor(),
        )
        .await
        .unwrap_err();
    assert_eq!(conflict_kind(&err), Some(ConflictKind::OutOfOrder));

    let periods = maintenance.list_for_unit(room).await.unwrap();
    assert_eq!(periods.len(), 1);
    maintenance
        .delete_out_of_order(FacilityType::Room, report.period.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_past_out_of_order_is_locked() {
    let Some(db) = connect().await else { return };
    let maintenance = OutOfOrderRepository::new(db.clone(), engines_on(date(2030, 5, 1)));
    let room = create_unit(&db, FacilityType::Room, dec!(2000), None).await;

    let err = maintenance
        .create_out_of_order(
            FacilityType::Room,
            room,
            "2030-04-01",
            Some("2030-04-10"),
            "Painting",
            &actor(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "PERIOD_ENDED");

    let id = Uuid::new_v4();
    out_of_order_periods::ActiveModel {
        id: Set(id),
        unit_id: Set(room.into_inner()),
        start_date: Set(date(2030, 4, 1)),
        end_date: Set(date(2030, 4, 10)),
        reason: Set("Painting".to_string()),
        created_by: Set("front-desk".to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&db)
    .await
    .unwrap();

    let err = maintenance
        .delete_out_of_order(FacilityType::Room, OutOfOrderId::from_uuid(id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "OUT_OF_ORDER_LOCKED");
}
