//! `SeaORM` Entity for out_of_order_periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "out_of_order_periods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub reason: String,
    pub created_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::facility_units::Entity",
        from = "Column::UnitId",
        to = "super::facility_units::Column::Id"
    )]
    FacilityUnits,
}

impl Related<super::facility_units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FacilityUnits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
