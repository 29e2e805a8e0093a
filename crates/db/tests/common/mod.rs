//! Shared fixtures for the database integration tests.
//!
//! Tests run against the Postgres instance named by `DATABASE_URL` and are
//! skipped when it is not set. Every test creates its own members and units,
//! so tests never contend for the same cells.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tokio::sync::OnceCell;
use uuid::Uuid;

use clubdesk_core::booking::{Actor, BookingEngines, BookingPayload};
use clubdesk_core::calendar::FixedClock;
use clubdesk_core::facility::{BookingRules, FacilityType};
use clubdesk_db::Migrator;
use clubdesk_db::entities::{facility_units, members};
use clubdesk_shared::types::{MemberId, UnitId};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.expect("Failed to run migrations");
        })
        .await;
    Some(db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engines whose "now" is 10:00 on `today` in the club timezone.
pub fn engines_on(today: NaiveDate) -> Arc<BookingEngines> {
    let local: NaiveDateTime = today.and_hms_opt(10, 0, 0).unwrap();
    let clock = FixedClock::at_local(local, chrono_tz::Asia::Karachi).unwrap();
    Arc::new(BookingEngines::new(&BookingRules::default(), Arc::new(clock)))
}

pub fn actor() -> Actor {
    Actor::new("front-desk")
}

pub async fn create_member(db: &DatabaseConnection, is_active: bool) -> MemberId {
    let id = Uuid::new_v4();
    members::ActiveModel {
        id: Set(id),
        membership_no: Set(format!("T-{}", &id.simple().to_string()[..12])),
        name: Set("Test Member".to_string()),
        is_active: Set(is_active),
        booking_amount_paid: Set(Decimal::ZERO),
        booking_amount_due: Set(Decimal::ZERO),
        booking_balance: Set(Decimal::ZERO),
        account_balance: Set(Decimal::ZERO),
        dr_amount: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test member");
    MemberId::from_uuid(id)
}

pub async fn create_unit(
    db: &DatabaseConnection,
    facility: FacilityType,
    member_rate: Decimal,
    capacity: Option<i32>,
) -> UnitId {
    let id = Uuid::new_v4();
    facility_units::ActiveModel {
        id: Set(id),
        facility_type: Set(facility.into()),
        name: Set(format!("{facility}-{}", &id.simple().to_string()[..12])),
        member_rate: Set(member_rate),
        guest_rate: Set(member_rate * Decimal::TWO),
        forces_rate: Set(None),
        corporate_rate: Set(Some(member_rate * Decimal::from(3))),
        capacity: Set(capacity),
        is_active: Set(true),
        is_booked: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test unit");
    UnitId::from_uuid(id)
}

pub fn payload(value: Value) -> BookingPayload {
    serde_json::from_value(value).expect("valid payload")
}
