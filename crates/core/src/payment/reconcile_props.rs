//! Property-based tests for PaymentReconciler.
//!
//! - Voucher trail: confirmed payments minus confirmed refunds equal the paid amount
//! - Split: paid + pending == total, except TO_BILL where pending is zero
//! - Ledger: summed deltas equal the final state
//! - Auto-downgrade and half-paid bounds

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::PaymentError;
use super::reconcile::{PaymentReconciler, ReconcileMode};
use super::types::{FinancialState, PaymentRequest, PaymentStatus, VoucherOp};
use super::voucher::{VoucherLine, apply_ops, confirmed_net};

/// Strategy to generate amounts (0.00 to 20,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..2_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn status_strategy() -> impl Strategy<Value = Option<PaymentStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(PaymentStatus::Unpaid)),
        Just(Some(PaymentStatus::HalfPaid)),
        Just(Some(PaymentStatus::Paid)),
        Just(Some(PaymentStatus::ToBill)),
    ]
}

/// A request whose optional paid amount is a fraction of the total.
fn request_strategy() -> impl Strategy<Value = PaymentRequest> {
    (amount(), status_strategy(), prop::option::of(0u32..=100)).prop_map(|(total, status, pct)| {
        PaymentRequest {
            total,
            status,
            paid: pct.map(|p| (total * Decimal::from(p) / Decimal::from(100)).round_dp(2)),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_trail_and_ledger_track_state(requests in prop::collection::vec(request_strategy(), 1..12)) {
        let mut state = FinancialState::empty();
        let mut trail: Vec<VoucherLine> = Vec::new();
        let (mut paid_total, mut owed_total, mut balance_total) =
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let mut created = false;

        for request in &requests {
            let mode = if created { ReconcileMode::Update } else { ReconcileMode::Create };
            let Ok(outcome) = PaymentReconciler::reconcile(&state, request, mode) else {
                continue;
            };
            created = true;

            apply_ops(&mut trail, &outcome.voucher_ops);
            paid_total += outcome.ledger.paid;
            owed_total += outcome.ledger.owed;
            balance_total += outcome.ledger.balance;

            let s = outcome.settlement;
            prop_assert_eq!(confirmed_net(&trail), s.paid);
            if s.status == PaymentStatus::ToBill {
                prop_assert_eq!(s.owed, Decimal::ZERO);
                prop_assert_eq!(s.paid + s.to_balance, s.total);
            } else {
                prop_assert_eq!(s.paid + s.owed, s.total);
                prop_assert_eq!(s.to_balance, Decimal::ZERO);
            }
            if s.status == PaymentStatus::HalfPaid {
                prop_assert!(s.paid > Decimal::ZERO && s.paid < s.total);
            }

            state = s.state();
            prop_assert_eq!(paid_total, state.paid);
            prop_assert_eq!(owed_total, state.pending());
            prop_assert_eq!(balance_total, state.deferred());
        }
    }

    #[test]
    fn prop_price_increase_on_paid_downgrades(paid in 1i64..1_000_000, extra in 1i64..1_000_000) {
        let paid = Decimal::from(paid);
        let current = FinancialState { total: paid, paid, status: PaymentStatus::Paid };
        let request = PaymentRequest { total: paid + Decimal::from(extra), status: None, paid: None };

        let outcome = PaymentReconciler::reconcile(&current, &request, ReconcileMode::Update).unwrap();
        prop_assert_eq!(outcome.settlement.status, PaymentStatus::HalfPaid);
        prop_assert_eq!(outcome.settlement.paid, paid);
        prop_assert_eq!(outcome.settlement.owed, Decimal::from(extra));
        prop_assert_eq!(outcome.voucher_ops, vec![VoucherOp::RetagFullToHalf]);
    }

    #[test]
    fn prop_half_paid_out_of_bounds_always_rejected(total in amount(), over in 0i64..1_000_000, use_zero in any::<bool>()) {
        let paid = if use_zero { Decimal::ZERO } else { total + Decimal::new(over, 2) };
        let request = PaymentRequest { total, status: Some(PaymentStatus::HalfPaid), paid: Some(paid) };

        let result = PaymentReconciler::reconcile(&FinancialState::empty(), &request, ReconcileMode::Create);
        let is_bounds_error = matches!(result, Err(PaymentError::HalfPaidOutOfBounds { .. }));
        prop_assert!(is_bounds_error);
    }

    #[test]
    fn prop_payment_increase_issues_exactly_the_difference(
        total in 1000i64..1_000_000,
        first_pct in 1i64..50,
        second_pct in 50i64..100,
    ) {
        let total = Decimal::from(total);
        let first = (total * Decimal::from(first_pct) / Decimal::from(100)).round_dp(2);
        let second = (total * Decimal::from(second_pct) / Decimal::from(100)).round_dp(2);
        prop_assume!(first > Decimal::ZERO && first < second && second < total);

        let current = FinancialState { total, paid: first, status: PaymentStatus::HalfPaid };
        let request = PaymentRequest { total, status: Some(PaymentStatus::HalfPaid), paid: Some(second) };
        let outcome = PaymentReconciler::reconcile(&current, &request, ReconcileMode::Update).unwrap();

        prop_assert_eq!(outcome.voucher_ops.len(), 1);
        let is_exact_diff = matches!(&outcome.voucher_ops[0], VoucherOp::Issue(v) if v.amount == second - first);
        prop_assert!(is_exact_diff);
    }
}
