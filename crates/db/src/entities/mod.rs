//! `SeaORM` entity definitions.

pub mod booking_claims;
pub mod booking_units;
pub mod bookings;
pub mod facility_units;
pub mod holds;
pub mod members;
pub mod out_of_order_periods;
pub mod payment_vouchers;
pub mod reservations;
pub mod sea_orm_active_enums;
