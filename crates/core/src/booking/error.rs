//! Booking error types.
//!
//! Every failure of a booking operation falls into one of four categories
//! (see `ErrorKind`). Validation and conflict errors are raised before any
//! write happens.

use chrono::NaiveDate;
use clubdesk_shared::AppError;
use clubdesk_shared::types::{
    BookingId, HoldId, MemberId, OutOfOrderId, ReservationId, UnitId, VoucherId,
};
use thiserror::Error;

use crate::availability::AvailabilityConflict;
use crate::calendar::CalendarError;
use crate::facility::{FacilityType, PricingType};
use crate::payment::{PaymentError, VoucherStatus, VoucherType};

/// Error categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape, missing field, ordering, capacity.
    Validation,
    /// Availability, hold collision, payment bounds, state conflicts.
    Conflict,
    /// Unknown booking, member, unit, voucher.
    NotFound,
    /// Persistence or unexpected failures.
    Internal,
}

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    // ========== Validation Errors ==========
    /// A required field is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Date could not be interpreted.
    #[error(transparent)]
    InvalidDate(#[from] CalendarError),

    /// Start and end are in the wrong order.
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Bookings cannot start in the past.
    #[error("Start date {start} is before today ({today})")]
    StartInPast {
        /// Requested start.
        start: NaiveDate,
        /// Today in the club timezone.
        today: NaiveDate,
    },

    /// Periods cannot end before today.
    #[error("Period ending {end} is already over (today is {today})")]
    PeriodEnded {
        /// Requested end.
        end: NaiveDate,
        /// Today in the club timezone.
        today: NaiveDate,
    },

    /// Date range longer than the club allows in one booking.
    #[error("Date range of {days} days exceeds the maximum of {max} days")]
    RangeTooLong {
        /// Requested length in days.
        days: u32,
        /// Allowed maximum.
        max: u32,
    },

    /// A slot detail lies outside the booked range.
    #[error("Slot date {date} is outside the booking range {start} to {end}")]
    SlotOutsideRange {
        /// Offending date.
        date: NaiveDate,
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    /// Slot is not valid for this facility.
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    /// Only rooms can be booked several at a time.
    #[error("A {0} booking must target exactly one unit")]
    MultipleUnitsNotAllowed(FacilityType),

    /// Guest bookings need a name and contact.
    #[error("Guest name and contact are required for guest bookings")]
    GuestDetailsRequired,

    /// Too many occupants.
    #[error("Capacity exceeded: {occupants} occupants, maximum {capacity}")]
    CapacityExceeded {
        /// Requested occupants.
        occupants: u32,
        /// Allowed maximum.
        capacity: u32,
    },

    /// Pricing type not offered by this facility type.
    #[error("Pricing type {pricing} is not available for {facility} bookings")]
    UnsupportedPricingType {
        /// Facility type.
        facility: FacilityType,
        /// Requested pricing type.
        pricing: PricingType,
    },

    /// Unit has no rate for the pricing type.
    #[error("Unit {unit} has no {pricing} rate")]
    RateUnavailable {
        /// Unit without the rate.
        unit: UnitId,
        /// Requested pricing type.
        pricing: PricingType,
    },

    /// Unit is not of the requested facility type.
    #[error("Unit {unit} is not a {expected}")]
    UnitTypeMismatch {
        /// The unit.
        unit: UnitId,
        /// The facility type of the operation.
        expected: FacilityType,
    },

    /// Unit is inactive.
    #[error("Unit {0} is inactive")]
    UnitInactive(UnitId),

    /// Member is not allowed to book.
    #[error("Member {0} is not active")]
    MemberInactive(MemberId),

    /// Bookings cannot move to another member.
    #[error("Booking {booking} belongs to member {current}, not {requested}")]
    MemberChangeNotAllowed {
        /// The booking.
        booking: BookingId,
        /// Stored member.
        current: MemberId,
        /// Member named in the update.
        requested: MemberId,
    },

    /// Booking belongs to another facility type.
    #[error("Booking {booking} is not a {expected} booking")]
    FacilityMismatch {
        /// The booking.
        booking: BookingId,
        /// The facility type of the operation.
        expected: FacilityType,
    },

    // ========== Conflict Errors ==========
    /// Requested slot is unavailable.
    #[error(transparent)]
    Unavailable(#[from] AvailabilityConflict),

    /// Payment state is invalid.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Cancelled bookings are terminal.
    #[error("Booking {0} is cancelled")]
    BookingCancelled(BookingId),

    /// Voucher cannot move to the requested status.
    #[error("Voucher {voucher} cannot move from {from} to {to}")]
    InvalidVoucherTransition {
        /// The voucher.
        voucher: VoucherId,
        /// Current status.
        from: VoucherStatus,
        /// Requested status.
        to: VoucherStatus,
    },

    /// Confirming or voiding this voucher would change the paid amount
    /// without touching the booking; payment changes go through an update.
    #[error("Voucher {voucher} is a {voucher_type} voucher; change the booking's payment instead")]
    PaidVoucherLocked {
        /// The voucher.
        voucher: VoucherId,
        /// Its type.
        voucher_type: VoucherType,
    },

    /// Maintenance periods in the past are immutable.
    #[error("Out-of-order period {0} has ended and can no longer be changed")]
    OutOfOrderLocked(OutOfOrderId),

    /// The unique (unit, date, slot) backstop rejected the write.
    #[error("Unit {unit} was booked concurrently for the requested dates")]
    DoubleBooked {
        /// The contested unit, when known.
        unit: String,
    },

    /// Serialization failure, retry the request.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Not Found Errors ==========
    /// Booking not found.
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// Member not found.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Facility unit not found.
    #[error("Facility unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Hold not found.
    #[error("Hold not found: {0}")]
    HoldNotFound(HoldId),

    /// Reservation not found.
    #[error("Reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// Out-of-order period not found.
    #[error("Out-of-order period not found: {0}")]
    OutOfOrderNotFound(OutOfOrderId),

    // ========== Internal Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidDate(_)
            | Self::InvalidDateRange { .. }
            | Self::StartInPast { .. }
            | Self::PeriodEnded { .. }
            | Self::RangeTooLong { .. }
            | Self::SlotOutsideRange { .. }
            | Self::InvalidSlot(_)
            | Self::MultipleUnitsNotAllowed(_)
            | Self::GuestDetailsRequired
            | Self::CapacityExceeded { .. }
            | Self::UnsupportedPricingType { .. }
            | Self::RateUnavailable { .. }
            | Self::UnitTypeMismatch { .. }
            | Self::UnitInactive(_)
            | Self::MemberInactive(_)
            | Self::MemberChangeNotAllowed { .. }
            | Self::FacilityMismatch { .. } => ErrorKind::Validation,

            Self::Payment(err) if !err.is_conflict() => ErrorKind::Validation,

            Self::Unavailable(_)
            | Self::Payment(_)
            | Self::BookingCancelled(_)
            | Self::InvalidVoucherTransition { .. }
            | Self::PaidVoucherLocked { .. }
            | Self::OutOfOrderLocked(_)
            | Self::DoubleBooked { .. }
            | Self::ConcurrentModification => ErrorKind::Conflict,

            Self::BookingNotFound(_)
            | Self::MemberNotFound(_)
            | Self::UnitNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::HoldNotFound(_)
            | Self::ReservationNotFound(_)
            | Self::OutOfOrderNotFound(_) => ErrorKind::NotFound,

            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidDate(err) => err.error_code(),
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::StartInPast { .. } => "START_IN_PAST",
            Self::PeriodEnded { .. } => "PERIOD_ENDED",
            Self::RangeTooLong { .. } => "RANGE_TOO_LONG",
            Self::SlotOutsideRange { .. } => "SLOT_OUTSIDE_RANGE",
            Self::InvalidSlot(_) => "INVALID_SLOT",
            Self::MultipleUnitsNotAllowed(_) => "MULTIPLE_UNITS_NOT_ALLOWED",
            Self::GuestDetailsRequired => "GUEST_DETAILS_REQUIRED",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::UnsupportedPricingType { .. } => "UNSUPPORTED_PRICING_TYPE",
            Self::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            Self::UnitTypeMismatch { .. } => "UNIT_TYPE_MISMATCH",
            Self::UnitInactive(_) => "UNIT_INACTIVE",
            Self::MemberInactive(_) => "MEMBER_INACTIVE",
            Self::MemberChangeNotAllowed { .. } => "MEMBER_CHANGE_NOT_ALLOWED",
            Self::FacilityMismatch { .. } => "FACILITY_MISMATCH",
            Self::Unavailable(conflict) => conflict.kind.as_str(),
            Self::Payment(err) => err.error_code(),
            Self::BookingCancelled(_) => "BOOKING_CANCELLED",
            Self::InvalidVoucherTransition { .. } => "INVALID_VOUCHER_TRANSITION",
            Self::PaidVoucherLocked { .. } => "PAID_VOUCHER_LOCKED",
            Self::OutOfOrderLocked(_) => "OUT_OF_ORDER_LOCKED",
            Self::DoubleBooked { .. } => "DOUBLE_BOOKED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::UnitNotFound(_) => "UNIT_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::HoldNotFound(_) => "HOLD_NOT_FOUND",
            Self::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Self::OutOfOrderNotFound(_) => "OUT_OF_ORDER_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Internal => match err {
                BookingError::Database(_) => Self::Database(message),
                _ => Self::Internal(message),
            },
        }
    }
}
