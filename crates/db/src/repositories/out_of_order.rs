//! Maintenance (out-of-order) repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};

use clubdesk_core::availability::OutOfOrderPeriod;
use clubdesk_core::booking::{Actor, BookingEngines, BookingError};
use clubdesk_core::facility::FacilityType;
use clubdesk_shared::types::{BookingId, OutOfOrderId, UnitId};

use super::error::RepositoryError;
use super::{mapping, queries};
use crate::entities::out_of_order_periods;

/// A stored maintenance window and the bookings it collides with.
#[derive(Debug, Clone)]
pub struct OutOfOrderReport {
    /// The stored period.
    pub period: OutOfOrderPeriod,
    /// Non-cancelled bookings overlapping the period. Flagged, not resolved.
    pub overlapping_bookings: Vec<BookingId>,
}

/// Repository for maintenance windows.
#[derive(Debug, Clone)]
pub struct OutOfOrderRepository {
    db: DatabaseConnection,
    engines: Arc<BookingEngines>,
}

impl OutOfOrderRepository {
    /// Creates a new out-of-order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engines: Arc<BookingEngines>) -> Self {
        Self { db, engines }
    }

    /// Stores a maintenance window. Existing bookings are never moved; the
    /// ones it overlaps are returned and logged.
    ///
    /// # Errors
    ///
    /// Returns `UnitNotFound`, `UnitTypeMismatch`, a date error, a missing
    /// reason, or `PeriodEnded` for windows entirely in the past.
    pub async fn create_out_of_order(
        &self,
        facility: FacilityType,
        unit_id: UnitId,
        start: &str,
        end: Option<&str>,
        reason: &str,
        actor: &Actor,
    ) -> Result<OutOfOrderReport, RepositoryError> {
        let planner = self.engines.planner(facility);

        let txn = self.db.begin().await?;
        let unit = queries::unit(&txn, unit_id).await?;
        let bookings = queries::unit_bookings(&txn, unit_id).await?;
        let (period, overlapping) =
            planner.plan_out_of_order(&unit, start, end, reason, &bookings)?;

        out_of_order_periods::ActiveModel {
            id: Set(period.id.into_inner()),
            unit_id: Set(unit_id.into_inner()),
            start_date: Set(period.span.first),
            end_date: Set(period.span.last),
            reason: Set(period.reason.clone()),
            created_by: Set(actor.name.clone()),
            created_at: Set(mapping::to_stored(planner.now())),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        if overlapping.is_empty() {
            info!(unit_id = %unit_id, period_id = %period.id, "Out-of-order period created");
        } else {
            warn!(
                unit_id = %unit_id,
                period_id = %period.id,
                overlapping = overlapping.len(),
                "Out-of-order period overlaps existing bookings"
            );
        }
        Ok(OutOfOrderReport {
            period,
            overlapping_bookings: overlapping,
        })
    }

    /// Lists a unit's maintenance windows by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list_for_unit(
        &self,
        unit_id: UnitId,
    ) -> Result<Vec<OutOfOrderPeriod>, RepositoryError> {
        let rows = out_of_order_periods::Entity::find()
            .filter(out_of_order_periods::Column::UnitId.eq(unit_id.into_inner()))
            .order_by_asc(out_of_order_periods::Column::StartDate)
            .all(&self.db)
            .await?;
        Ok(rows
            .iter()
            .map(mapping::out_of_order)
            .collect::<Result<_, _>>()?)
    }

    /// Deletes a maintenance window that has not ended yet.
    ///
    /// # Errors
    ///
    /// Returns `OutOfOrderNotFound`, or `OutOfOrderLocked` for past windows.
    pub async fn delete_out_of_order(
        &self,
        facility: FacilityType,
        id: OutOfOrderId,
    ) -> Result<(), RepositoryError> {
        let planner = self.engines.planner(facility);
        let txn = self.db.begin().await?;
        let row = out_of_order_periods::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(BookingError::OutOfOrderNotFound(id))?;
        planner.ensure_out_of_order_mutable(&mapping::out_of_order(&row)?)?;

        out_of_order_periods::Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(period_id = %id, "Out-of-order period deleted");
        Ok(())
    }
}

