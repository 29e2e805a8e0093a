//! Voucher trail bookkeeping.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{VoucherOp, VoucherStatus, VoucherType};
use crate::facility::FacilityType;

/// The parts of a voucher that matter for the paid-amount invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Status.
    pub status: VoucherStatus,
    /// Amount.
    pub amount: Decimal,
}

/// Applies voucher mutations to an in-memory trail, in order.
///
/// Mirrors what the repository does with SQL so the invariant can be
/// checked without a database.
pub fn apply_ops(trail: &mut Vec<VoucherLine>, ops: &[VoucherOp]) {
    for op in ops {
        match op {
            VoucherOp::RetagFullToHalf => {
                for line in trail.iter_mut().filter(|line| {
                    line.status == VoucherStatus::Confirmed
                        && line.voucher_type == VoucherType::FullPayment
                }) {
                    line.voucher_type = VoucherType::HalfPayment;
                }
            }
            VoucherOp::CancelConfirmedPayments => {
                for line in trail.iter_mut().filter(|line| {
                    line.status == VoucherStatus::Confirmed && line.voucher_type.is_settlement()
                }) {
                    line.status = VoucherStatus::Cancelled;
                }
            }
            VoucherOp::CancelPendingToBill => {
                for line in trail.iter_mut().filter(|line| {
                    line.status == VoucherStatus::Pending && line.voucher_type == VoucherType::ToBill
                }) {
                    line.status = VoucherStatus::Cancelled;
                }
            }
            VoucherOp::Issue(voucher) => trail.push(VoucherLine {
                voucher_type: voucher.voucher_type,
                status: voucher.status,
                amount: voucher.amount,
            }),
        }
    }
}

/// Confirmed payments minus confirmed refunds.
///
/// For every booking this equals the booking's paid amount.
#[must_use]
pub fn confirmed_net<'a>(trail: impl IntoIterator<Item = &'a VoucherLine>) -> Decimal {
    trail
        .into_iter()
        .filter(|line| line.status == VoucherStatus::Confirmed)
        .map(|line| match line.voucher_type {
            VoucherType::Refund => -line.amount,
            kind if kind.counts_as_payment() => line.amount,
            _ => Decimal::ZERO,
        })
        .sum()
}

/// Returns true if moving a voucher from `from` to `to` by hand leaves
/// `confirmed_net` unchanged.
///
/// Only TO_BILL postings may enter or leave CONFIRMED outside a booking
/// update; every other type feeds the paid amount.
#[must_use]
pub fn status_change_keeps_net(
    voucher_type: VoucherType,
    from: VoucherStatus,
    to: VoucherStatus,
) -> bool {
    !voucher_type.moves_paid_amount()
        || (from != VoucherStatus::Confirmed && to != VoucherStatus::Confirmed)
}

/// Voucher number `{PREFIX}-{yyyymmdd}-{8 hex}`.
#[must_use]
pub fn voucher_number(facility: FacilityType, issued_on: NaiveDate, id: Uuid) -> String {
    let hex = id.simple().to_string().to_uppercase();
    let suffix = &hex[hex.len() - 8..];
    format!(
        "{}-{}-{suffix}",
        facility.voucher_prefix(),
        issued_on.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::NewVoucher;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(voucher_type: VoucherType, status: VoucherStatus, amount: Decimal) -> VoucherLine {
        VoucherLine {
            voucher_type,
            status,
            amount,
        }
    }

    #[test]
    fn test_confirmed_net() {
        let trail = vec![
            line(VoucherType::FullPayment, VoucherStatus::Confirmed, dec!(1000)),
            line(VoucherType::HalfPayment, VoucherStatus::Cancelled, dec!(400)),
            line(VoucherType::Refund, VoucherStatus::Confirmed, dec!(300)),
            line(VoucherType::Refund, VoucherStatus::Pending, dec!(100)),
            line(VoucherType::ToBill, VoucherStatus::Confirmed, dec!(900)),
        ];
        assert_eq!(confirmed_net(&trail), dec!(700));
    }

    #[test]
    fn test_apply_ops_in_order() {
        let mut trail = vec![
            line(VoucherType::FullPayment, VoucherStatus::Confirmed, dec!(1000)),
            line(VoucherType::ToBill, VoucherStatus::Pending, dec!(50)),
        ];
        apply_ops(
            &mut trail,
            &[
                VoucherOp::RetagFullToHalf,
                VoucherOp::CancelPendingToBill,
                VoucherOp::Issue(NewVoucher {
                    voucher_type: VoucherType::HalfPayment,
                    status: VoucherStatus::Confirmed,
                    amount: dec!(200),
                    remarks: String::new(),
                }),
            ],
        );
        assert_eq!(trail[0].voucher_type, VoucherType::HalfPayment);
        assert_eq!(trail[1].status, VoucherStatus::Cancelled);
        assert_eq!(confirmed_net(&trail), dec!(1200));

        apply_ops(&mut trail, &[VoucherOp::CancelConfirmedPayments]);
        assert_eq!(confirmed_net(&trail), dec!(0));
    }

    #[rstest]
    #[case(VoucherType::FullPayment, VoucherStatus::Confirmed, VoucherStatus::Cancelled, false)]
    #[case(VoucherType::HalfPayment, VoucherStatus::Confirmed, VoucherStatus::Cancelled, false)]
    #[case(VoucherType::AdvancePayment, VoucherStatus::Confirmed, VoucherStatus::Cancelled, false)]
    #[case(VoucherType::Refund, VoucherStatus::Pending, VoucherStatus::Confirmed, false)]
    #[case(VoucherType::Adjustment, VoucherStatus::Pending, VoucherStatus::Confirmed, false)]
    #[case(VoucherType::Refund, VoucherStatus::Pending, VoucherStatus::Cancelled, true)]
    #[case(VoucherType::ToBill, VoucherStatus::Pending, VoucherStatus::Confirmed, true)]
    #[case(VoucherType::ToBill, VoucherStatus::Confirmed, VoucherStatus::Cancelled, true)]
    fn test_status_change_keeps_net(
        #[case] voucher_type: VoucherType,
        #[case] from: VoucherStatus,
        #[case] to: VoucherStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(status_change_keeps_net(voucher_type, from, to), expected);

        let mut trail = vec![line(voucher_type, from, dec!(500))];
        let before = confirmed_net(&trail);
        trail[0].status = to;
        assert_eq!(confirmed_net(&trail) == before, expected);
    }

    #[test]
    fn test_voucher_number_format() {
        let id = Uuid::parse_str("0190a3b4-5c6d-7e8f-9a0b-1c2d3e4f5a6b").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(voucher_number(FacilityType::Room, date, id), "RB-20250601-3E4F5A6B");
        assert_eq!(voucher_number(FacilityType::Photoshoot, date, id), "PB-20250601-3E4F5A6B");
    }
}
