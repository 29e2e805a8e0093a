//! `SeaORM` Entity for booking_claims table.
//!
//! One row per (unit, day, slot) a booking occupies. A partial unique index
//! over active rows is the last line of defence against double booking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub unit_id: Uuid,
    pub claim_date: Date,
    /// `FULL_DAY`, a session name, or a block start such as `09:00`.
    pub slot: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_delete = "Cascade"
    )]
    Bookings,
    #[sea_orm(
        belongs_to = "super::facility_units::Entity",
        from = "Column::UnitId",
        to = "super::facility_units::Column::Id"
    )]
    FacilityUnits,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::facility_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacilityUnits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
