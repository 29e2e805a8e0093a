//! Development seed data for Clubdesk.
//!
//! Seeds a handful of members plus the club's rooms, halls, lawns and
//! photoshoot studio. Rows use fixed IDs, so running the seeder twice
//! leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use clubdesk_core::facility::FacilityType;
use clubdesk_db::entities::{facility_units, members};
use clubdesk_shared::AppConfig;

/// Seed members: (membership number, name, email, active).
const MEMBERS: [(&str, &str, &str, bool); 4] = [
    ("M-1001", "Ayesha Khan", "ayesha@clubdesk.dev", true),
    ("M-1002", "Bilal Ahmed", "bilal@clubdesk.dev", true),
    ("M-1003", "Sara Malik", "sara@clubdesk.dev", true),
    ("M-1004", "Omar Siddiqui", "omar@clubdesk.dev", false),
];

/// A seeded unit with rates in whole rupees.
struct UnitSeed {
    facility: FacilityType,
    name: &'static str,
    member_rate: i64,
    guest_rate: i64,
    forces_rate: Option<i64>,
    corporate_rate: Option<i64>,
    capacity: Option<i32>,
}

const UNITS: [UnitSeed; 9] = [
    room("Room 101", 6_000, 9_000, Some(4_500)),
    room("Room 102", 6_000, 9_000, Some(4_500)),
    room("Room 201 (Suite)", 12_000, 18_000, Some(9_000)),
    room("Room 202", 6_000, 9_000, None),
    UnitSeed {
        facility: FacilityType::Hall,
        name: "Banquet Hall",
        member_rate: 60_000,
        guest_rate: 90_000,
        forces_rate: None,
        corporate_rate: Some(120_000),
        capacity: Some(400),
    },
    UnitSeed {
        facility: FacilityType::Hall,
        name: "Conference Hall",
        member_rate: 25_000,
        guest_rate: 40_000,
        forces_rate: None,
        corporate_rate: Some(50_000),
        capacity: Some(80),
    },
    UnitSeed {
        facility: FacilityType::Lawn,
        name: "Main Lawn",
        member_rate: 80_000,
        guest_rate: 120_000,
        forces_rate: None,
        corporate_rate: None,
        capacity: Some(800),
    },
    UnitSeed {
        facility: FacilityType::Lawn,
        name: "Poolside Lawn",
        member_rate: 35_000,
        guest_rate: 55_000,
        forces_rate: None,
        corporate_rate: None,
        capacity: None,
    },
    UnitSeed {
        facility: FacilityType::Photoshoot,
        name: "Studio",
        member_rate: 5_000,
        guest_rate: 8_000,
        forces_rate: None,
        corporate_rate: None,
        capacity: None,
    },
];

const fn room(name: &'static str, member: i64, guest: i64, forces: Option<i64>) -> UnitSeed {
    UnitSeed {
        facility: FacilityType::Room,
        name,
        member_rate: member,
        guest_rate: guest,
        forces_rate: forces,
        corporate_rate: None,
        capacity: None,
    }
}

/// Stable seed IDs: `0000...0001xxxx` for members, `0000...0002xxxx` for units.
fn seed_id(kind: u128, index: usize) -> Uuid {
    Uuid::from_u128((kind << 16) | index as u128)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubdesk=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = clubdesk_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    seed_members(&db).await?;
    seed_units(&db).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_members(db: &DatabaseConnection) -> anyhow::Result<()> {
    let mut inserted = 0;
    for (index, (membership_no, name, email, is_active)) in MEMBERS.iter().enumerate() {
        let id = seed_id(1, index);
        if members::Entity::find_by_id(id).one(db).await?.is_some() {
            continue;
        }
        members::ActiveModel {
            id: Set(id),
            membership_no: Set((*membership_no).to_string()),
            name: Set((*name).to_string()),
            email: Set(Some((*email).to_string())),
            phone: Set(None),
            is_active: Set(*is_active),
            booking_amount_paid: Set(Decimal::ZERO),
            booking_amount_due: Set(Decimal::ZERO),
            booking_balance: Set(Decimal::ZERO),
            account_balance: Set(Decimal::ZERO),
            dr_amount: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert member {membership_no}"))?;
        inserted += 1;
    }
    info!(inserted, total = MEMBERS.len(), "Members seeded");
    Ok(())
}

async fn seed_units(db: &DatabaseConnection) -> anyhow::Result<()> {
    let mut inserted = 0;
    for (index, unit) in UNITS.iter().enumerate() {
        let id = seed_id(2, index);
        if facility_units::Entity::find_by_id(id).one(db).await?.is_some() {
            continue;
        }
        facility_units::ActiveModel {
            id: Set(id),
            facility_type: Set(unit.facility.into()),
            name: Set(unit.name.to_string()),
            member_rate: Set(Decimal::from(unit.member_rate)),
            guest_rate: Set(Decimal::from(unit.guest_rate)),
            forces_rate: Set(unit.forces_rate.map(Decimal::from)),
            corporate_rate: Set(unit.corporate_rate.map(Decimal::from)),
            capacity: Set(unit.capacity),
            is_active: Set(true),
            is_booked: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert unit {}", unit.name))?;
        info!(facility = %unit.facility, name = unit.name, "Unit created");
        inserted += 1;
    }
    info!(inserted, total = UNITS.len(), "Facility units seeded");
    Ok(())
}
