//! Payment reconciliation.
//!
//! Given a booking's current money state and a requested new one, decides
//! the new status and paid/owed split, the voucher mutations that keep the
//! voucher trail equal to the paid amount, and the member ledger increments.

use rust_decimal::Decimal;

use super::error::PaymentError;
use super::types::{
    FinancialState, LedgerDelta, NewVoucher, PaymentOutcome, PaymentRequest, PaymentStatus,
    Settlement, VoucherOp, VoucherStatus, VoucherType,
};

/// Remark on the voucher issued with a new booking.
pub const REMARK_BOOKING_PAYMENT: &str = "Booking Payment";
/// Remark on the voucher issued when the paid amount goes up.
pub const REMARK_INCREASE: &str = "Payment Update (Increase)";
/// Remark on the voucher replacing cancelled ones when the paid amount goes down.
pub const REMARK_DECREASE: &str = "Payment Correction (Decrease)";
/// Remark on refund vouchers.
pub const REMARK_REFUND: &str = "Refund Due (Payment Decrease)";
/// Remark on TO_BILL vouchers.
pub const REMARK_TO_BILL: &str = "Billed to Member Account";

/// Whether the booking is being created or changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// No prior state.
    Create,
    /// Existing booking.
    Update,
}

/// Payment reconciliation engine.
pub struct PaymentReconciler;

impl PaymentReconciler {
    /// Resolves, validates and diffs a payment change in one go.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the requested state is invalid. Nothing is
    /// produced in that case, so callers can abort before writing.
    pub fn reconcile(
        current: &FinancialState,
        request: &PaymentRequest,
        mode: ReconcileMode,
    ) -> Result<PaymentOutcome, PaymentError> {
        let current = match mode {
            ReconcileMode::Create => FinancialState::empty(),
            ReconcileMode::Update => *current,
        };
        let settlement = Self::settle(&current, request)?;
        let voucher_ops = Self::voucher_ops(&current, &settlement, mode);
        let refund = voucher_ops
            .iter()
            .filter_map(|op| match op {
                VoucherOp::Issue(voucher) if voucher.voucher_type == VoucherType::Refund => {
                    Some(voucher.amount)
                }
                _ => None,
            })
            .sum();

        Ok(PaymentOutcome {
            ledger: Self::ledger_delta(&current, &settlement),
            settlement,
            voucher_ops,
            refund,
        })
    }

    /// Computes the new status and paid/owed split.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` for negative amounts, a paid amount above the
    /// total, or a half-paid amount outside `(0, total)`.
    pub fn settle(
        current: &FinancialState,
        request: &PaymentRequest,
    ) -> Result<Settlement, PaymentError> {
        let total = request.total;
        if total < Decimal::ZERO {
            return Err(PaymentError::NegativeAmount(total));
        }
        if let Some(paid) = request.paid
            && paid < Decimal::ZERO
        {
            return Err(PaymentError::NegativeAmount(paid));
        }

        let untouched = request.status.is_none() && request.paid.is_none();
        let (status, paid) = if untouched
            && current.status == PaymentStatus::Paid
            && total > current.paid
        {
            // Price went up on a settled booking: keep what was paid.
            if current.paid.is_zero() {
                (PaymentStatus::Unpaid, Decimal::ZERO)
            } else {
                (PaymentStatus::HalfPaid, current.paid)
            }
        } else {
            let status = request
                .status
                .unwrap_or_else(|| Self::infer_status(current, total, request.paid));
            let paid = match status {
                PaymentStatus::Paid => total,
                PaymentStatus::Unpaid => Decimal::ZERO,
                PaymentStatus::HalfPaid | PaymentStatus::ToBill => {
                    request.paid.unwrap_or(current.paid)
                }
            };
            (status, paid)
        };

        match status {
            PaymentStatus::HalfPaid if paid <= Decimal::ZERO || paid >= total => {
                return Err(PaymentError::HalfPaidOutOfBounds { paid, total });
            }
            _ if paid > total => return Err(PaymentError::PaidExceedsTotal { paid, total }),
            _ => {}
        }

        let outstanding = total - paid;
        let (owed, to_balance) = match status {
            PaymentStatus::ToBill => (Decimal::ZERO, outstanding),
            _ => (outstanding, Decimal::ZERO),
        };

        Ok(Settlement {
            total,
            status,
            paid,
            owed,
            to_balance,
        })
    }

    /// Status implied by an explicit paid amount when no status was given.
    fn infer_status(current: &FinancialState, total: Decimal, paid: Option<Decimal>) -> PaymentStatus {
        match paid {
            None => current.status,
            Some(_) if current.status == PaymentStatus::ToBill => PaymentStatus::ToBill,
            Some(amount) if amount.is_zero() => PaymentStatus::Unpaid,
            Some(amount) if amount == total => PaymentStatus::Paid,
            // Anything above the total then fails the half-paid bound.
            Some(_) => PaymentStatus::HalfPaid,
        }
    }

    /// Voucher mutations turning the current trail into one matching `next`.
    #[must_use]
    pub fn voucher_ops(
        current: &FinancialState,
        next: &Settlement,
        mode: ReconcileMode,
    ) -> Vec<VoucherOp> {
        let mut ops = Vec::new();
        let paid_diff = next.paid - current.paid;

        if current.status == PaymentStatus::Paid && next.status == PaymentStatus::HalfPaid {
            ops.push(VoucherOp::RetagFullToHalf);
        }

        let settlement_type = if next.status == PaymentStatus::Paid {
            VoucherType::FullPayment
        } else {
            VoucherType::HalfPayment
        };

        if paid_diff < Decimal::ZERO {
            ops.push(VoucherOp::CancelConfirmedPayments);
            if next.paid > Decimal::ZERO {
                ops.push(VoucherOp::Issue(NewVoucher {
                    voucher_type: settlement_type,
                    status: VoucherStatus::Confirmed,
                    amount: next.paid,
                    remarks: REMARK_DECREASE.to_string(),
                }));
            }
            if current.status == PaymentStatus::Paid && next.paid < current.total {
                ops.push(VoucherOp::Issue(NewVoucher {
                    voucher_type: VoucherType::Refund,
                    status: VoucherStatus::Pending,
                    amount: current.total - next.paid,
                    remarks: REMARK_REFUND.to_string(),
                }));
            }
        } else if paid_diff > Decimal::ZERO {
            let remarks = match mode {
                ReconcileMode::Create => REMARK_BOOKING_PAYMENT,
                ReconcileMode::Update => REMARK_INCREASE,
            };
            ops.push(VoucherOp::Issue(NewVoucher {
                voucher_type: settlement_type,
                status: VoucherStatus::Confirmed,
                amount: paid_diff,
                remarks: remarks.to_string(),
            }));
        }

        let deferred = current.deferred();
        if next.to_balance != deferred {
            if deferred > Decimal::ZERO {
                ops.push(VoucherOp::CancelPendingToBill);
            }
            if next.to_balance > Decimal::ZERO {
                ops.push(VoucherOp::Issue(NewVoucher {
                    voucher_type: VoucherType::ToBill,
                    status: VoucherStatus::Pending,
                    amount: next.to_balance,
                    remarks: REMARK_TO_BILL.to_string(),
                }));
            }
        }

        ops
    }

    /// Member ledger increments between two states.
    #[must_use]
    pub fn ledger_delta(current: &FinancialState, next: &Settlement) -> LedgerDelta {
        LedgerDelta {
            paid: next.paid - current.paid,
            owed: next.owed - current.pending(),
            balance: next.to_balance - current.deferred(),
        }
    }
}
