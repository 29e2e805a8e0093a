//! `SeaORM` Entity for bookings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{
    FacilityType, PayerRole, PaymentMode, PaymentStatus, PricingType,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub facility_type: FacilityType,
    pub member_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub time_slot: Option<String>,
    pub start_time: Option<Time>,
    /// Granular per-day slot list as submitted, `[]` when the range applies.
    #[sea_orm(column_type = "JsonBinary")]
    pub slot_details: Json,
    pub pricing_type: PricingType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub total_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub paid_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub pending_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_mode: PaymentMode,
    pub payer_role: PayerRole,
    pub guest_name: Option<String>,
    pub guest_contact: Option<String>,
    pub occupants: i32,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub refund_amount: Decimal,
    pub remarks: Option<String>,
    pub is_cancelled: bool,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(has_many = "super::booking_units::Entity")]
    BookingUnits,
    #[sea_orm(has_many = "super::booking_claims::Entity")]
    BookingClaims,
    #[sea_orm(has_many = "super::payment_vouchers::Entity")]
    PaymentVouchers,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
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

impl Related<super::payment_vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentVouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
