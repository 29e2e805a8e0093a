//! Booking lifecycle.
//!
//! `BookingEngine<P>` plans creates, updates and cancellations for one
//! facility type; `BookingEngines` dispatches by `FacilityType`. A plan is
//! everything the persistence layer must write, computed up front so that
//! every validation and conflict is raised before the first write.
//!
//! ```text
//! CREATED ──► UPDATED* ──► CANCELLED (terminal)
//! ```

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_tests;

pub use engine::{BookingEngine, BookingEngines, BookingPlanner, PlanContext};
pub use error::{BookingError, ErrorKind};
pub use types::{
    Actor, BookingDetailInput, BookingPayload, BookingPlan, BookingRecord, BookingTarget,
    CancelPlan, HoldRelease, MemberInfo, OccupancyChange, ResolvedRequest,
};
