//! `SeaORM` active enums, mapped to the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use clubdesk_core::facility as core_facility;
use clubdesk_core::payment as core_payment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "facility_type")]
pub enum FacilityType {
    #[sea_orm(string_value = "room")]
    Room,
    #[sea_orm(string_value = "hall")]
    Hall,
    #[sea_orm(string_value = "lawn")]
    Lawn,
    #[sea_orm(string_value = "photoshoot")]
    Photoshoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "pricing_type")]
pub enum PricingType {
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "guest")]
    Guest,
    #[sea_orm(string_value = "forces")]
    Forces,
    #[sea_orm(string_value = "forces-self")]
    ForcesSelf,
    #[sea_orm(string_value = "forces-guest")]
    ForcesGuest,
    #[sea_orm(string_value = "corporate")]
    Corporate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
    #[sea_orm(string_value = "HALF_PAID")]
    HalfPaid,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "TO_BILL")]
    ToBill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_type")]
pub enum VoucherType {
    #[sea_orm(string_value = "FULL_PAYMENT")]
    FullPayment,
    #[sea_orm(string_value = "HALF_PAYMENT")]
    HalfPayment,
    #[sea_orm(string_value = "ADVANCE_PAYMENT")]
    AdvancePayment,
    #[sea_orm(string_value = "REFUND")]
    Refund,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "TO_BILL")]
    ToBill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "voucher_status")]
pub enum VoucherStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_mode")]
pub enum PaymentMode {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "CARD")]
    Card,
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    #[sea_orm(string_value = "ONLINE")]
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payer_role")]
pub enum PayerRole {
    #[sea_orm(string_value = "MEMBER")]
    Member,
    #[sea_orm(string_value = "GUEST")]
    Guest,
}

/// Generates lossless conversions between a stored enum and its core twin.
macro_rules! mirror_enum {
    ($db:ident, $core:path, [$($variant:ident),+ $(,)?]) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                use $core as Core;
                match value {
                    $(Core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                use $core as Core;
                match value {
                    $($db::$variant => Core::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(FacilityType, core_facility::FacilityType, [Room, Hall, Lawn, Photoshoot]);
mirror_enum!(
    PricingType,
    core_facility::PricingType,
    [Member, Guest, Forces, ForcesSelf, ForcesGuest, Corporate]
);
mirror_enum!(PaymentStatus, core_payment::PaymentStatus, [Unpaid, HalfPaid, Paid, ToBill]);
mirror_enum!(
    VoucherType,
    core_payment::VoucherType,
    [FullPayment, HalfPayment, AdvancePayment, Refund, Adjustment, ToBill]
);
mirror_enum!(VoucherStatus, core_payment::VoucherStatus, [Pending, Confirmed, Cancelled]);
mirror_enum!(PaymentMode, core_payment::PaymentMode, [Cash, Card, Cheque, Online]);
mirror_enum!(PayerRole, core_payment::PayerRole, [Member, Guest]);
