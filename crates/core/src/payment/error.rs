//! Payment error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while reconciling a booking's payment state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Half-paid bookings need `0 < paid < total`.
    #[error("Half-paid amount {paid} must be greater than 0 and less than the total {total}")]
    HalfPaidOutOfBounds {
        /// Requested paid amount.
        paid: Decimal,
        /// Booking total.
        total: Decimal,
    },

    /// Paid amount larger than the booking total.
    #[error("Paid amount {paid} exceeds the total {total}")]
    PaidExceedsTotal {
        /// Requested paid amount.
        paid: Decimal,
        /// Booking total.
        total: Decimal,
    },

    /// Amounts cannot be negative.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::HalfPaidOutOfBounds { .. } => "HALF_PAID_OUT_OF_BOUNDS",
            Self::PaidExceedsTotal { .. } => "PAID_EXCEEDS_TOTAL",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
        }
    }

    /// Half-paid bounds are a conflict with the booking's state; the rest
    /// are malformed input.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::HalfPaidOutOfBounds { .. })
    }
}
