//! Facility types, slots, rates and the per-facility booking policies.

pub mod policy;
pub mod types;

pub use policy::{BookingRules, FacilityPolicy, HallPolicy, LawnPolicy, PhotoshootPolicy, RoomPolicy};
pub use types::{
    FacilityType, FacilityUnit, PricingType, Rates, Schedule, ScheduleDetail, Slot, SlotClaim,
    TimeSlot,
};
