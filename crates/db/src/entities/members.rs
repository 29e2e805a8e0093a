//! `SeaORM` Entity for members table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub membership_no: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub booking_amount_paid: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub booking_amount_due: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub booking_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub account_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub dr_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::holds::Entity")]
    Holds,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::holds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Holds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
