//! Payment reconciliation.
//!
//! This module owns the money side of a booking:
//! - `PaymentReconciler` - new status and paid/owed split, voucher diff, ledger delta
//! - voucher trail helpers used to check the paid-amount invariant
//! - payment and voucher domain types

pub mod error;
pub mod reconcile;
pub mod types;
pub mod voucher;

#[cfg(test)]
mod reconcile_props;

pub use error::PaymentError;
pub use reconcile::{PaymentReconciler, ReconcileMode};
pub use types::{
    FinancialState, LedgerDelta, NewVoucher, PayerRole, PaymentMode, PaymentOutcome,
    PaymentRequest, PaymentStatus, Settlement, Voucher, VoucherOp, VoucherStatus, VoucherType,
};
pub use voucher::{
    VoucherLine, apply_ops, confirmed_net, status_change_keeps_net, voucher_number,
};
