//! Booking domain types.

use chrono::{DateTime, Utc};
use clubdesk_shared::types::{BookingId, MemberId, UnitId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::availability::Coverage;
use crate::calendar::DateSpan;
use crate::facility::{FacilityType, PricingType, Schedule, SlotClaim, TimeSlot};
use crate::payment::{FinancialState, PayerRole, PaymentMode, PaymentOutcome, PaymentStatus};
use crate::pricing::PriceQuote;

/// Booking request as received from callers, shape-validated only.
///
/// Field names accept the per-facility spellings (`checkIn`/`checkOut` for
/// rooms, `bookingDate`/`endDate` for venues).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPayload {
    /// Booking to update; ignored on create.
    #[serde(alias = "id")]
    pub booking_id: Option<BookingId>,
    /// Booking member.
    pub member_id: Option<MemberId>,
    /// Target units.
    #[serde(alias = "roomIds")]
    pub unit_ids: Vec<UnitId>,
    /// Single target unit, merged into `unit_ids`.
    #[serde(alias = "roomId", alias = "hallId", alias = "lawnId", alias = "photoshootId")]
    pub unit_id: Option<UnitId>,
    /// First day.
    #[serde(alias = "checkIn", alias = "bookingDate")]
    pub start_date: Option<String>,
    /// Last day (venues) or check-out day (rooms).
    #[serde(alias = "checkOut")]
    pub end_date: Option<String>,
    /// Session for every day of the range.
    pub time_slot: Option<TimeSlot>,
    /// Photoshoot block start, `HH:MM`.
    pub start_time: Option<String>,
    /// Granular per-day slots.
    pub booking_details: Vec<BookingDetailInput>,
    /// Rate tier.
    pub pricing_type: Option<PricingType>,
    /// Explicit total, replacing the computed one.
    pub total_price: Option<Decimal>,
    /// Explicit payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Explicit paid amount.
    pub paid_amount: Option<Decimal>,
    /// How the money moved.
    pub payment_mode: Option<PaymentMode>,
    /// Who pays.
    pub payer_role: Option<PayerRole>,
    /// Guest name, for guest bookings.
    pub guest_name: Option<String>,
    /// Guest phone or email, for guest bookings.
    pub guest_contact: Option<String>,
    /// Number of guests.
    #[serde(alias = "numberOfGuests")]
    pub occupants: Option<u32>,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

/// One entry of a granular slot list as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingDetailInput {
    /// Day.
    pub date: String,
    /// Session, halls and lawns.
    pub time_slot: Option<TimeSlot>,
    /// Block start, photoshoots.
    pub start_time: Option<String>,
}

/// The authenticated user acting on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Name recorded in audit fields and on vouchers.
    pub name: String,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// What the engine needs to know about the booking member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Member ID.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Inactive members cannot book.
    pub is_active: bool,
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Booking ID.
    pub id: BookingId,
    /// Facility type.
    pub facility_type: FacilityType,
    /// Booking member.
    pub member_id: MemberId,
    /// Booked units.
    pub unit_ids: Vec<UnitId>,
    /// Requested dates and slots.
    pub schedule: Schedule,
    /// Claimed cells on each unit.
    pub claims: Vec<SlotClaim>,
    /// Rate tier.
    pub pricing_type: PricingType,
    /// Total price.
    pub total_price: Decimal,
    /// Amount received.
    pub paid_amount: Decimal,
    /// Amount still owed on the booking.
    pub pending_amount: Decimal,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// How the money moved.
    pub payment_mode: PaymentMode,
    /// Who pays.
    pub payer_role: PayerRole,
    /// Guest name.
    pub guest_name: Option<String>,
    /// Guest contact.
    pub guest_contact: Option<String>,
    /// Number of guests.
    pub occupants: u32,
    /// Refund awaiting return; zero once returned.
    pub refund_amount: Decimal,
    /// Remarks.
    pub remarks: Option<String>,
    /// Soft-delete flag.
    pub is_cancelled: bool,
    /// Creator.
    pub created_by: String,
    /// Last editor.
    pub updated_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    /// The booking's money state.
    #[must_use]
    pub const fn financial(&self) -> FinancialState {
        FinancialState {
            total: self.total_price,
            paid: self.paid_amount,
            status: self.payment_status,
        }
    }

    /// Days the booking touches.
    #[must_use]
    pub fn span(&self) -> Option<DateSpan> {
        Coverage::from_claims(&self.claims).map(|coverage| coverage.span)
    }

    /// Returns true if the booking occupies its units on `day`.
    #[must_use]
    pub fn occupies(&self, day: chrono::NaiveDate) -> bool {
        self.claims.iter().any(|claim| claim.date == day)
    }
}

/// Units and cells a request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTarget {
    /// Member named in the request, if any.
    pub member_id: Option<MemberId>,
    /// Target units, deduplicated, in request order.
    pub unit_ids: Vec<UnitId>,
    /// Normalized schedule.
    pub schedule: Schedule,
    /// Expanded cells.
    pub claims: Vec<SlotClaim>,
    /// Days touched.
    pub span: DateSpan,
}

/// A validated request with dates normalized and claims expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// Booking member.
    pub member_id: MemberId,
    /// Target units, deduplicated, in request order.
    pub unit_ids: Vec<UnitId>,
    /// Normalized schedule.
    pub schedule: Schedule,
    /// Expanded cells.
    pub claims: Vec<SlotClaim>,
    /// Days touched.
    pub span: DateSpan,
    /// Rate tier.
    pub pricing_type: PricingType,
    /// Explicit total.
    pub total_override: Option<Decimal>,
    /// Explicit payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Explicit paid amount.
    pub paid_amount: Option<Decimal>,
    /// How the money moved.
    pub payment_mode: PaymentMode,
    /// Who pays.
    pub payer_role: PayerRole,
    /// Guest name.
    pub guest_name: Option<String>,
    /// Guest contact.
    pub guest_contact: Option<String>,
    /// Number of guests.
    pub occupants: u32,
    /// Remarks.
    pub remarks: Option<String>,
}

/// Occupancy flag change for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyChange {
    /// The booking covers today: mark the unit booked.
    Occupy(UnitId),
    /// The booking no longer covers today on this unit: clear the flag
    /// unless another booking still does.
    Release(UnitId),
}

/// Holds to delete once a booking commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRelease {
    /// Holds of this member.
    pub member_id: MemberId,
    /// On these units.
    pub unit_ids: Vec<UnitId>,
    /// Touching these days.
    pub span: DateSpan,
}

/// Everything a create or update writes, computed before the write starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPlan {
    /// The booking as it will be stored.
    pub booking: BookingRecord,
    /// The booking as it was, on update.
    pub previous: Option<BookingRecord>,
    /// Price breakdown.
    pub quote: PriceQuote,
    /// Money state, voucher mutations, ledger delta.
    pub payment: PaymentOutcome,
    /// Occupancy flag changes.
    pub occupancy: Vec<OccupancyChange>,
    /// Holds consumed by the booking.
    pub holds: HoldRelease,
}

/// What a cancellation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelPlan {
    /// The booking, flagged cancelled.
    pub booking: BookingRecord,
    /// Units to release.
    pub occupancy: Vec<OccupancyChange>,
}
