//! Staff reservation repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IsolationLevel, Set, TransactionTrait,
};
use tracing::{info, warn};

use clubdesk_core::availability::Reservation;
use clubdesk_core::booking::{Actor, BookingEngines, BookingError, BookingPayload};
use clubdesk_core::facility::FacilityType;
use clubdesk_shared::types::ReservationId;

use super::error::RepositoryError;
use super::{mapping, queries};
use crate::entities::reservations;

/// Reservation repository for administrative blocks.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    db: DatabaseConnection,
    engines: Arc<BookingEngines>,
}

impl ReservationRepository {
    /// Creates a new reservation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engines: Arc<BookingEngines>) -> Self {
        Self { db, engines }
    }

    /// Blocks the payload's units and schedule. Holds do not block staff.
    ///
    /// # Errors
    ///
    /// Returns validation errors or an availability conflict against
    /// maintenance, bookings or other reservations.
    pub async fn create_reservation(
        &self,
        facility: FacilityType,
        payload: &BookingPayload,
        actor: &Actor,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let planner = self.engines.planner(facility);
        let target = planner.resolve_target(payload, None)?;

        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;
        let units = queries::units(&txn, &target.unit_ids).await?;
        let snapshot = queries::snapshot(&txn, &target.unit_ids, &target.span).await?;
        let planned = planner
            .plan_reservation(&target, &units, &snapshot)
            .inspect_err(|err| warn!(error = %err, "Reservation rejected"))?;

        let now = mapping::to_stored(planner.now());
        let remarks = payload
            .remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        for reservation in &planned {
            reservations::ActiveModel {
                id: Set(reservation.id.into_inner()),
                unit_id: Set(reservation.unit_id.into_inner()),
                start_date: Set(reservation.coverage.span.first),
                end_date: Set(reservation.coverage.span.last),
                claims: Set(mapping::coverage_claims(&reservation.coverage)?),
                remarks: Set(remarks.clone()),
                created_by: Set(actor.name.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        info!(
            facility = %facility,
            reservations = planned.len(),
            actor = %actor.name,
            "Reservation created"
        );
        Ok(planned)
    }

    /// Deletes a reservation.
    ///
    /// # Errors
    ///
    /// Returns `ReservationNotFound` if it does not exist.
    pub async fn delete_reservation(&self, id: ReservationId) -> Result<(), RepositoryError> {
        let result = reservations::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(BookingError::ReservationNotFound(id).into());
        }
        info!(reservation_id = %id, "Reservation deleted");
        Ok(())
    }
}
