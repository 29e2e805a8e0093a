//! Payment domain types.

use chrono::{DateTime, Utc};
use clubdesk_shared::types::{BookingId, VoucherId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::facility::FacilityType;

/// Settlement state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Nothing paid.
    #[default]
    Unpaid,
    /// Partially paid, `0 < paid < total`.
    HalfPaid,
    /// Fully paid.
    Paid,
    /// Outstanding amount deferred to the member's club account.
    ToBill,
}

impl PaymentStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::HalfPaid => "HALF_PAID",
            Self::Paid => "PAID",
            Self::ToBill => "TO_BILL",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNPAID" => Ok(Self::Unpaid),
            "HALF_PAID" => Ok(Self::HalfPaid),
            "PAID" => Ok(Self::Paid),
            "TO_BILL" => Ok(Self::ToBill),
            _ => Err(format!("Unknown payment status: {s}")),
        }
    }
}

/// What a voucher records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    /// Payment settling the whole booking.
    FullPayment,
    /// Partial payment.
    HalfPayment,
    /// Advance against a future booking.
    AdvancePayment,
    /// Money to be returned to the member.
    Refund,
    /// Manual correction.
    Adjustment,
    /// Amount billed to the member's club account.
    ToBill,
}

impl VoucherType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullPayment => "FULL_PAYMENT",
            Self::HalfPayment => "HALF_PAYMENT",
            Self::AdvancePayment => "ADVANCE_PAYMENT",
            Self::Refund => "REFUND",
            Self::Adjustment => "ADJUSTMENT",
            Self::ToBill => "TO_BILL",
        }
    }

    /// Vouchers a payment decrease cancels.
    #[must_use]
    pub const fn is_settlement(self) -> bool {
        matches!(self, Self::FullPayment | Self::HalfPayment)
    }

    /// Vouchers counted towards the paid amount once confirmed.
    ///
    /// Refunds count negatively; TO_BILL vouchers are account postings and
    /// never count.
    #[must_use]
    pub const fn counts_as_payment(self) -> bool {
        !matches!(self, Self::Refund | Self::ToBill)
    }

    /// Vouchers whose confirmation changes the paid amount, either way.
    #[must_use]
    pub const fn moves_paid_amount(self) -> bool {
        !matches!(self, Self::ToBill)
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoucherType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FULL_PAYMENT" => Ok(Self::FullPayment),
            "HALF_PAYMENT" => Ok(Self::HalfPayment),
            "ADVANCE_PAYMENT" => Ok(Self::AdvancePayment),
            "REFUND" => Ok(Self::Refund),
            "ADJUSTMENT" => Ok(Self::Adjustment),
            "TO_BILL" => Ok(Self::ToBill),
            _ => Err(format!("Unknown voucher type: {s}")),
        }
    }
}

/// Voucher lifecycle.
///
/// ```text
/// PENDING ──► CONFIRMED ──► CANCELLED
///    │                          ▲
///    └──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherStatus {
    /// Awaiting manual confirmation.
    Pending,
    /// Money moved.
    Confirmed,
    /// Void. Terminal.
    Cancelled,
}

impl VoucherStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true if the voucher may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled) | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VoucherStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown voucher status: {s}")),
        }
    }
}

/// How the money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    /// Cash at the counter.
    #[default]
    Cash,
    /// Card terminal.
    Card,
    /// Cheque.
    Cheque,
    /// Online transfer.
    Online,
}

impl PaymentMode {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::Cheque => "CHEQUE",
            Self::Online => "ONLINE",
        }
    }
}

/// Who pays for the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayerRole {
    /// The member.
    #[default]
    Member,
    /// The member's guest.
    Guest,
}

impl PayerRole {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "MEMBER",
            Self::Guest => "GUEST",
        }
    }
}

/// A booking's money state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialState {
    /// Booking total.
    pub total: Decimal,
    /// Amount received.
    pub paid: Decimal,
    /// Settlement state.
    pub status: PaymentStatus,
}

impl FinancialState {
    /// State of a booking that does not exist yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total: Decimal::ZERO,
            paid: Decimal::ZERO,
            status: PaymentStatus::Unpaid,
        }
    }

    /// Amount still owed on the booking itself; zero for TO_BILL.
    #[must_use]
    pub fn pending(&self) -> Decimal {
        match self.status {
            PaymentStatus::ToBill => Decimal::ZERO,
            _ => self.total - self.paid,
        }
    }

    /// Amount deferred to the member's account; zero unless TO_BILL.
    #[must_use]
    pub fn deferred(&self) -> Decimal {
        match self.status {
            PaymentStatus::ToBill => self.total - self.paid,
            _ => Decimal::ZERO,
        }
    }
}

/// Requested new money state. `None` means the caller did not set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// New total (computed or overridden).
    pub total: Decimal,
    /// Explicit new status.
    pub status: Option<PaymentStatus>,
    /// Explicit new paid amount.
    pub paid: Option<Decimal>,
}

/// Resolved new money state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// New total.
    pub total: Decimal,
    /// New settlement state.
    pub status: PaymentStatus,
    /// New paid amount.
    pub paid: Decimal,
    /// New pending amount on the booking.
    pub owed: Decimal,
    /// Amount posted to the member's account instead of pending.
    pub to_balance: Decimal,
}

impl Settlement {
    /// The settlement as a state, for the next reconciliation.
    #[must_use]
    pub const fn state(&self) -> FinancialState {
        FinancialState {
            total: self.total,
            paid: self.paid,
            status: self.status,
        }
    }
}

/// A voucher to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoucher {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Initial status.
    pub status: VoucherStatus,
    /// Amount.
    pub amount: Decimal,
    /// Remarks shown on the voucher.
    pub remarks: String,
}

/// One mutation of a booking's voucher trail, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherOp {
    /// Retag CONFIRMED FULL_PAYMENT vouchers as HALF_PAYMENT. No money moves.
    RetagFullToHalf,
    /// Cancel every CONFIRMED FULL/HALF_PAYMENT voucher.
    CancelConfirmedPayments,
    /// Cancel every PENDING TO_BILL voucher.
    CancelPendingToBill,
    /// Insert a voucher.
    Issue(NewVoucher),
}

/// Increments to apply to the member's running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerDelta {
    /// Change in amount paid across bookings.
    pub paid: Decimal,
    /// Change in amount due across bookings.
    pub owed: Decimal,
    /// Change in the club account balance (TO_BILL postings).
    pub balance: Decimal,
}

impl LedgerDelta {
    /// Returns true when nothing changes.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.paid.is_zero() && self.owed.is_zero() && self.balance.is_zero()
    }

    /// Change in `booking_balance` (paid minus due).
    #[must_use]
    pub fn booking_balance(&self) -> Decimal {
        self.paid - self.owed
    }
}

/// Everything a booking write needs to persist its money state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// New money state.
    pub settlement: Settlement,
    /// Voucher mutations, in order.
    pub voucher_ops: Vec<VoucherOp>,
    /// Member ledger increments.
    pub ledger: LedgerDelta,
    /// Refund issued by this change; zero if none.
    pub refund: Decimal,
}

/// A persisted voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher ID.
    pub id: VoucherId,
    /// Owning booking.
    pub booking_id: BookingId,
    /// Facility type of the booking.
    pub facility_type: FacilityType,
    /// Human-facing number, e.g. `RB-20250601-1A2B3C4D`.
    pub number: String,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Status.
    pub status: VoucherStatus,
    /// Amount.
    pub amount: Decimal,
    /// Payment mode.
    pub payment_mode: PaymentMode,
    /// Remarks.
    pub remarks: String,
    /// Staff member or member who issued it.
    pub issued_by: String,
    /// When it was issued.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(VoucherStatus::Pending, VoucherStatus::Confirmed, true)]
    #[case(VoucherStatus::Pending, VoucherStatus::Cancelled, true)]
    #[case(VoucherStatus::Confirmed, VoucherStatus::Cancelled, true)]
    #[case(VoucherStatus::Confirmed, VoucherStatus::Pending, false)]
    #[case(VoucherStatus::Cancelled, VoucherStatus::Confirmed, false)]
    #[case(VoucherStatus::Cancelled, VoucherStatus::Pending, false)]
    #[case(VoucherStatus::Pending, VoucherStatus::Pending, false)]
    fn test_voucher_transitions(
        #[case] from: VoucherStatus,
        #[case] to: VoucherStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_pending_and_deferred() {
        let half = FinancialState {
            total: dec!(1000),
            paid: dec!(400),
            status: PaymentStatus::HalfPaid,
        };
        assert_eq!(half.pending(), dec!(600));
        assert_eq!(half.deferred(), dec!(0));

        let billed = FinancialState {
            status: PaymentStatus::ToBill,
            ..half
        };
        assert_eq!(billed.pending(), dec!(0));
        assert_eq!(billed.deferred(), dec!(600));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(PaymentStatus::HalfPaid.to_string(), "HALF_PAID");
        assert_eq!("to_bill".parse::<PaymentStatus>().unwrap(), PaymentStatus::ToBill);
        assert_eq!(
            serde_json::to_string(&VoucherType::FullPayment).unwrap(),
            "\"FULL_PAYMENT\""
        );
        assert!(!VoucherType::ToBill.counts_as_payment());
        assert!(VoucherType::HalfPayment.is_settlement());
    }
}
