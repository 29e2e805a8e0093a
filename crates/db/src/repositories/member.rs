//! Member repository: ledger reads.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use clubdesk_core::booking::BookingError;
use clubdesk_shared::types::MemberId;

use super::error::RepositoryError;
use crate::entities::members;

/// Running booking totals and club account balance of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLedger {
    /// Member ID.
    pub member_id: MemberId,
    /// Total paid across all bookings.
    pub booking_amount_paid: Decimal,
    /// Total still owed across all bookings.
    pub booking_amount_due: Decimal,
    /// Paid minus due.
    pub booking_balance: Decimal,
    /// Club account balance; TO_BILL amounts land here.
    pub balance: Decimal,
    /// Debit recorded against the club account.
    pub dr_amount: Decimal,
}

impl From<members::Model> for MemberLedger {
    fn from(model: members::Model) -> Self {
        Self {
            member_id: MemberId::from_uuid(model.id),
            booking_amount_paid: model.booking_amount_paid,
            booking_amount_due: model.booking_amount_due,
            booking_balance: model.booking_balance,
            balance: model.account_balance,
            dr_amount: model.dr_amount,
        }
    }
}

/// Member repository.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads a member's ledger fields.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if the member does not exist.
    pub async fn member_ledger(&self, member_id: MemberId) -> Result<MemberLedger, RepositoryError> {
        let model = members::Entity::find_by_id(member_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BookingError::MemberNotFound(member_id))?;
        Ok(model.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_ledger_from_model() {
        let now = Utc::now().fixed_offset();
        let model = members::Model {
            id: Uuid::new_v4(),
            membership_no: "M-001".into(),
            name: "A. Member".into(),
            email: None,
            phone: None,
            is_active: true,
            booking_amount_paid: dec!(10000),
            booking_amount_due: dec!(2500),
            booking_balance: dec!(7500),
            account_balance: dec!(1200),
            dr_amount: dec!(1200),
            created_at: now,
            updated_at: now,
        };
        let ledger = MemberLedger::from(model.clone());
        assert_eq!(ledger.member_id.into_inner(), model.id);
        assert_eq!(ledger.booking_balance, dec!(7500));
        assert_eq!(ledger.balance, dec!(1200));

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["bookingAmountDue"], "2500");
    }
}
