//! Checkout hold repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{info, warn};

use clubdesk_core::availability::Hold;
use clubdesk_core::booking::{BookingEngines, BookingError, BookingPayload, PlanContext};
use clubdesk_core::facility::FacilityType;
use clubdesk_shared::types::{MemberId, UnitId};

use super::error::RepositoryError;
use super::{mapping, queries};
use crate::entities::holds;

/// Hold repository for advisory checkout locks.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    db: DatabaseConnection,
    engines: Arc<BookingEngines>,
}

impl HoldRepository {
    /// Creates a new hold repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engines: Arc<BookingEngines>) -> Self {
        Self { db, engines }
    }

    /// Places holds for a member on the payload's units and schedule.
    ///
    /// The member's own holds never block; everyone else's active ones do.
    ///
    /// # Errors
    ///
    /// Returns validation errors, `MemberNotFound`, or an availability
    /// conflict.
    pub async fn create_hold(
        &self,
        facility: FacilityType,
        payload: &BookingPayload,
    ) -> Result<Vec<Hold>, RepositoryError> {
        let planner = self.engines.planner(facility);
        let target = planner.resolve_target(payload, None)?;
        let member_id = target
            .member_id
            .ok_or(BookingError::MissingField("member_id"))?;

        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;
        let member = queries::member(&txn, member_id).await?;
        let units = queries::units(&txn, &target.unit_ids).await?;
        let snapshot = queries::snapshot(&txn, &target.unit_ids, &target.span).await?;
        let ctx = PlanContext {
            member: &member,
            units: &units,
            snapshot: &snapshot,
        };
        let planned = planner.plan_hold(&target, &ctx).inspect_err(|err| {
            warn!(member_id = %member_id, error = %err, "Hold rejected");
        })?;

        let now = planner.now();
        for hold in &planned {
            holds::ActiveModel {
                id: Set(hold.id.into_inner()),
                unit_id: Set(hold.unit_id.into_inner()),
                member_id: Set(hold.member_id.into_inner()),
                start_date: Set(hold.coverage.span.first),
                end_date: Set(hold.coverage.span.last),
                claims: Set(mapping::coverage_claims(&hold.coverage)?),
                expires_at: Set(mapping::to_stored(hold.expires_at)),
                created_at: Set(mapping::to_stored(now)),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        info!(
            facility = %facility,
            member_id = %member_id,
            holds = planned.len(),
            "Holds placed"
        );
        Ok(planned)
    }

    /// Releases a member's holds on the given units, or on every unit when
    /// `unit_ids` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn release_holds(
        &self,
        member_id: MemberId,
        unit_ids: &[UnitId],
    ) -> Result<u64, RepositoryError> {
        let mut query =
            holds::Entity::delete_many().filter(holds::Column::MemberId.eq(member_id.into_inner()));
        if !unit_ids.is_empty() {
            query = query
                .filter(holds::Column::UnitId.is_in(unit_ids.iter().map(|id| id.into_inner())));
        }
        let result = query.exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Deletes holds that expired before `now`, in a transaction of its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn purge_expired_holds(&self) -> Result<u64, RepositoryError> {
        let now = self.engines.clock().now_utc();
        self.purge_expired_before(now).await
    }

    async fn purge_expired_before(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let txn = self.db.begin().await?;
        let result = holds::Entity::delete_many()
            .filter(holds::Column::ExpiresAt.lte(mapping::to_stored(now)))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        if result.rows_affected > 0 {
            warn!(purged = result.rows_affected, "Expired holds purged");
        }
        Ok(result.rows_affected)
    }
}
