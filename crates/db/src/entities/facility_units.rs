//! `SeaORM` Entity for facility_units table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FacilityType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "facility_units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub facility_type: FacilityType,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub member_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub guest_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub forces_rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub corporate_rate: Option<Decimal>,
    pub capacity: Option<i32>,
    pub is_active: bool,
    pub is_booked: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_units::Entity")]
    BookingUnits,
    #[sea_orm(has_many = "super::booking_claims::Entity")]
    BookingClaims,
    #[sea_orm(has_many = "super::out_of_order_periods::Entity")]
    OutOfOrderPeriods,
}

impl Related<super::booking_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingUnits.def()
    }
}

impl Related<super::booking_claims::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingClaims.def()
    }
}

impl Related<super::out_of_order_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OutOfOrderPeriods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
