//! Payment voucher repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use clubdesk_core::booking::{Actor, BookingError};
use clubdesk_core::facility::FacilityType;
use clubdesk_core::payment::{Voucher, VoucherStatus, VoucherType, status_change_keeps_net};
use clubdesk_shared::types::{BookingId, VoucherId};

use super::error::RepositoryError;
use super::mapping;
use crate::entities::{bookings, payment_vouchers};

/// Voucher repository for reading and confirming payment vouchers.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the vouchers of a booking in issue order.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or `FacilityMismatch`.
    pub async fn get_vouchers(
        &self,
        facility: FacilityType,
        booking_id: BookingId,
    ) -> Result<Vec<Voucher>, RepositoryError> {
        let booking = bookings::Entity::find_by_id(booking_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        if FacilityType::from(booking.facility_type) != facility {
            return Err(BookingError::FacilityMismatch {
                booking: booking_id,
                expected: facility,
            }
            .into());
        }

        let rows = payment_vouchers::Entity::find()
            .filter(payment_vouchers::Column::BookingId.eq(booking_id.into_inner()))
            .order_by_asc(payment_vouchers::Column::CreatedAt)
            .order_by_asc(payment_vouchers::Column::VoucherNumber)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(mapping::voucher).collect())
    }

    /// Moves a voucher to a new status.
    ///
    /// Allowed: PENDING to CONFIRMED or CANCELLED, CONFIRMED to CANCELLED.
    /// Setting the current status again is a no-op. Only TO_BILL vouchers
    /// may enter or leave CONFIRMED here; payment, adjustment and refund
    /// vouchers move with the booking's paid amount instead.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound`, `InvalidVoucherTransition` or
    /// `PaidVoucherLocked`.
    pub async fn update_voucher_status(
        &self,
        voucher_id: VoucherId,
        status: VoucherStatus,
        actor: &Actor,
    ) -> Result<Voucher, RepositoryError> {
        let txn = self.db.begin().await?;
        let row = payment_vouchers::Entity::find_by_id(voucher_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(BookingError::VoucherNotFound(voucher_id))?;

        let current = VoucherStatus::from(row.status);
        if current == status {
            return Ok(mapping::voucher(row));
        }
        if !current.can_transition_to(status) {
            return Err(BookingError::InvalidVoucherTransition {
                voucher: voucher_id,
                from: current,
                to: status,
            }
            .into());
        }
        let voucher_type = VoucherType::from(row.voucher_type);
        if !status_change_keeps_net(voucher_type, current, status) {
            return Err(BookingError::PaidVoucherLocked {
                voucher: voucher_id,
                voucher_type,
            }
            .into());
        }

        let mut active = row.into_active_model();
        active.status = Set(status.into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(
            voucher_id = %voucher_id,
            number = %updated.voucher_number,
            from = %current,
            to = %status,
            actor = %actor.name,
            "Voucher status updated"
        );
        Ok(mapping::voucher(updated))
    }
}
