//! Booking repository.
//!
//! Every create, update and cancel runs inside one serializable transaction:
//! the availability snapshot is read, the engine plans the change, and the
//! plan is written (booking row, unit and claim rows, voucher mutations,
//! ledger increments, occupancy flags, hold release) before a single commit.
//! Any failure drops the transaction, which rolls everything back.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use clubdesk_core::booking::{
    Actor, BookingEngines, BookingError, BookingPayload, BookingPlan, BookingPlanner,
    BookingRecord, HoldRelease, OccupancyChange, PlanContext, ResolvedRequest,
};
use clubdesk_core::facility::FacilityType;
use clubdesk_core::payment::{
    LedgerDelta, NewVoucher, VoucherLine, VoucherOp, confirmed_net, voucher_number,
};
use clubdesk_shared::types::{BookingId, MemberId, PageRequest, PageResponse, UnitId};

use super::error::RepositoryError;
use super::{mapping, queries};
use crate::entities::sea_orm_active_enums as db_enums;
use crate::entities::{
    booking_claims, booking_units, bookings, facility_units, holds, members, payment_vouchers,
};

const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Booking repository for the booking lifecycle operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
    engines: Arc<BookingEngines>,
    max_page_size: u32,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engines: Arc<BookingEngines>) -> Self {
        Self {
            db,
            engines,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Caps the page size of `list_bookings`.
    #[must_use]
    pub const fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        self.db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await
    }

    /// Creates a booking.
    ///
    /// # Errors
    ///
    /// Returns a validation, not-found or conflict error from the engine,
    /// `DoubleBooked` when a concurrent booking won the same cells, or
    /// `ConcurrentModification` when the transaction must be retried.
    pub async fn create_booking(
        &self,
        facility: FacilityType,
        payload: &BookingPayload,
        actor: &Actor,
    ) -> Result<BookingRecord, RepositoryError> {
        let planner = self.engines.planner(facility);
        let request = planner.resolve_create(payload)?;
        let unit_ids = request.unit_ids.clone();

        let txn = self.begin().await?;
        let result = plan_and_write(&txn, planner, request, actor, None).await;
        let plan = finish(txn, result, &unit_ids).await?;

        info!(
            facility = %facility,
            booking_id = %plan.booking.id,
            member_id = %plan.booking.member_id,
            total = %plan.booking.total_price,
            paid = %plan.booking.paid_amount,
            status = %plan.booking.payment_status,
            "Booking created"
        );
        Ok(plan.booking)
    }

    /// Updates a booking identified by the payload's `booking_id`.
    ///
    /// # Errors
    ///
    /// Same as `create_booking`, plus `BookingNotFound`, `FacilityMismatch`
    /// and `BookingCancelled`.
    pub async fn update_booking(
        &self,
        facility: FacilityType,
        payload: &BookingPayload,
        actor: &Actor,
    ) -> Result<BookingRecord, RepositoryError> {
        let planner = self.engines.planner(facility);
        let booking_id = payload
            .booking_id
            .ok_or(BookingError::MissingField("booking_id"))?;

        let txn = self.begin().await?;
        let existing = queries::booking(&txn, booking_id, true).await?;
        let request = planner.resolve_update(payload, &existing)?;
        let unit_ids = request.unit_ids.clone();
        let result = plan_and_write(&txn, planner, request, actor, Some(&existing)).await;
        let plan = finish(txn, result, &unit_ids).await?;

        info!(
            facility = %facility,
            booking_id = %plan.booking.id,
            member_id = %plan.booking.member_id,
            total = %plan.booking.total_price,
            paid = %plan.booking.paid_amount,
            status = %plan.booking.payment_status,
            refund = %plan.payment.refund,
            "Booking updated"
        );
        Ok(plan.booking)
    }

    /// Cancels a booking. Vouchers and the member ledger are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound`, `FacilityMismatch` or `BookingCancelled`.
    pub async fn cancel_booking(
        &self,
        facility: FacilityType,
        booking_id: BookingId,
        actor: &Actor,
    ) -> Result<BookingRecord, RepositoryError> {
        let planner = self.engines.planner(facility);
        let today = planner.today();

        let txn = self.begin().await?;
        let existing = queries::booking(&txn, booking_id, true).await?;
        let plan = planner.plan_cancel(&existing, actor)?;

        mapping::booking_active_model(&plan.booking)?
            .update(&txn)
            .await?;
        booking_claims::Entity::update_many()
            .col_expr(booking_claims::Column::IsActive, Expr::value(false))
            .filter(booking_claims::Column::BookingId.eq(booking_id.into_inner()))
            .exec(&txn)
            .await?;
        apply_occupancy(&txn, booking_id, &plan.occupancy, today).await?;
        txn.commit().await?;

        info!(facility = %facility, booking_id = %booking_id, "Booking cancelled");
        Ok(plan.booking)
    }

    /// Lists bookings of one facility type, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_bookings(
        &self,
        facility: FacilityType,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PageResponse<BookingRecord>, RepositoryError> {
        let request = PageRequest::from_parts(page, limit, self.max_page_size);
        let query = bookings::Entity::find()
            .filter(bookings::Column::FacilityType.eq(db_enums::FacilityType::from(facility)));

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .offset(request.offset())
            .limit(request.limit())
            .all(&self.db)
            .await?;
        let data = queries::records(&self.db, rows).await?;

        Ok(PageResponse::new(data, request.page, request.per_page, total))
    }

    /// Fetches one booking of the given facility type.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or `FacilityMismatch`.
    pub async fn get_booking(
        &self,
        facility: FacilityType,
        booking_id: BookingId,
    ) -> Result<BookingRecord, RepositoryError> {
        let booking = queries::booking(&self.db, booking_id, false).await?;
        ensure_facility(&booking, facility)?;
        Ok(booking)
    }

    /// Clears the tracked refund once the money has been handed back.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or `FacilityMismatch`.
    pub async fn mark_refund_returned(
        &self,
        facility: FacilityType,
        booking_id: BookingId,
        actor: &Actor,
    ) -> Result<BookingRecord, RepositoryError> {
        let txn = self.begin().await?;
        let mut booking = queries::booking(&txn, booking_id, true).await?;
        ensure_facility(&booking, facility)?;
        if booking.refund_amount.is_zero() {
            return Ok(booking);
        }

        let returned = booking.refund_amount;
        bookings::Entity::update_many()
            .col_expr(bookings::Column::RefundAmount, Expr::value(Decimal::ZERO))
            .col_expr(bookings::Column::UpdatedBy, Expr::value(actor.name.clone()))
            .filter(bookings::Column::Id.eq(booking_id.into_inner()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(booking_id = %booking_id, refund = %returned, "Refund marked returned");
        booking.refund_amount = Decimal::ZERO;
        booking.updated_by.clone_from(&actor.name);
        Ok(booking)
    }
}

fn ensure_facility(booking: &BookingRecord, facility: FacilityType) -> Result<(), BookingError> {
    if booking.facility_type == facility {
        Ok(())
    } else {
        Err(BookingError::FacilityMismatch {
            booking: booking.id,
            expected: facility,
        })
    }
}

/// Commits on success; on failure classifies the error and lets the
/// dropped transaction roll back.
async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, RepositoryError>,
    unit_ids: &[UnitId],
) -> Result<T, RepositoryError> {
    match result {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|err| RepositoryError::from(err).classify(unit_ids))?;
            Ok(value)
        }
        Err(err) => {
            let err = err.classify(unit_ids);
            if err.is_conflict() {
                warn!(code = err.error_code(), error = %err, "Booking rejected");
            }
            Err(err)
        }
    }
}

async fn plan_and_write(
    txn: &DatabaseTransaction,
    planner: &dyn BookingPlanner,
    request: ResolvedRequest,
    actor: &Actor,
    existing: Option<&BookingRecord>,
) -> Result<BookingPlan, RepositoryError> {
    let member = queries::member(txn, request.member_id).await?;
    let units = queries::units(txn, &request.unit_ids).await?;
    let snapshot = queries::snapshot(txn, &request.unit_ids, &request.span).await?;
    let ctx = PlanContext {
        member: &member,
        units: &units,
        snapshot: &snapshot,
    };

    let plan = match existing {
        Some(existing) => planner.plan_update(request, actor, &ctx, existing)?,
        None => planner.plan_create(request, actor, &ctx)?,
    };
    debug!(
        booking_id = %plan.booking.id,
        computed = %plan.quote.computed,
        total = %plan.quote.total,
        voucher_ops = plan.payment.voucher_ops.len(),
        occupancy = plan.occupancy.len(),
        "Booking planned"
    );

    write_plan(txn, &plan, actor, planner.today()).await?;
    Ok(plan)
}

async fn write_plan(
    txn: &DatabaseTransaction,
    plan: &BookingPlan,
    actor: &Actor,
    today: NaiveDate,
) -> Result<(), RepositoryError> {
    let booking = &plan.booking;
    let model = mapping::booking_active_model(booking)?;
    if plan.previous.is_some() {
        model.update(txn).await?;
    } else {
        model.insert(txn).await?;
    }

    replace_units(txn, booking).await?;
    replace_claims(txn, booking).await?;
    apply_voucher_ops(txn, booking, &plan.payment.voucher_ops, actor, today).await?;
    apply_ledger(txn, booking.member_id, &plan.payment.ledger).await?;
    apply_occupancy(txn, booking.id, &plan.occupancy, today).await?;
    release_holds(txn, &plan.holds).await?;
    verify_trail(txn, booking).await?;
    Ok(())
}

async fn replace_units(txn: &DatabaseTransaction, booking: &BookingRecord) -> Result<(), DbErr> {
    booking_units::Entity::delete_many()
        .filter(booking_units::Column::BookingId.eq(booking.id.into_inner()))
        .exec(txn)
        .await?;

    let rows = booking
        .unit_ids
        .iter()
        .zip(0_i32..)
        .map(|(unit, position)| booking_units::ActiveModel {
            booking_id: Set(booking.id.into_inner()),
            unit_id: Set(unit.into_inner()),
            position: Set(position),
        })
        .collect::<Vec<_>>();
    if !rows.is_empty() {
        booking_units::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}

/// Rewrites the claim rows; the partial unique index rejects any cell that
/// another active booking already holds.
async fn replace_claims(txn: &DatabaseTransaction, booking: &BookingRecord) -> Result<(), DbErr> {
    booking_claims::Entity::delete_many()
        .filter(booking_claims::Column::BookingId.eq(booking.id.into_inner()))
        .exec(txn)
        .await?;

    let now = mapping::to_stored(booking.updated_at);
    let rows = booking
        .unit_ids
        .iter()
        .flat_map(|unit| {
            booking.claims.iter().map(move |claim| booking_claims::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking.id.into_inner()),
                unit_id: Set(unit.into_inner()),
                claim_date: Set(claim.date),
                slot: Set(claim.slot.key()),
                is_active: Set(!booking.is_cancelled),
                created_at: Set(now),
            })
        })
        .collect::<Vec<_>>();
    if !rows.is_empty() {
        booking_claims::Entity::insert_many(rows).exec(txn).await?;
    }
    Ok(())
}

async fn apply_voucher_ops(
    txn: &DatabaseTransaction,
    booking: &BookingRecord,
    ops: &[VoucherOp],
    actor: &Actor,
    today: NaiveDate,
) -> Result<(), DbErr> {
    let booking_id = booking.id.into_inner();
    for op in ops {
        match op {
            VoucherOp::RetagFullToHalf => {
                payment_vouchers::Entity::update_many()
                    .set(payment_vouchers::ActiveModel {
                        voucher_type: Set(db_enums::VoucherType::HalfPayment),
                        ..Default::default()
                    })
                    .filter(payment_vouchers::Column::BookingId.eq(booking_id))
                    .filter(payment_vouchers::Column::Status.eq(db_enums::VoucherStatus::Confirmed))
                    .filter(
                        payment_vouchers::Column::VoucherType.eq(db_enums::VoucherType::FullPayment),
                    )
                    .exec(txn)
                    .await?;
            }
            VoucherOp::CancelConfirmedPayments => {
                payment_vouchers::Entity::update_many()
                    .set(cancelled())
                    .filter(payment_vouchers::Column::BookingId.eq(booking_id))
                    .filter(payment_vouchers::Column::Status.eq(db_enums::VoucherStatus::Confirmed))
                    .filter(payment_vouchers::Column::VoucherType.is_in([
                        db_enums::VoucherType::FullPayment,
                        db_enums::VoucherType::HalfPayment,
                    ]))
                    .exec(txn)
                    .await?;
            }
            VoucherOp::CancelPendingToBill => {
                payment_vouchers::Entity::update_many()
                    .set(cancelled())
                    .filter(payment_vouchers::Column::BookingId.eq(booking_id))
                    .filter(payment_vouchers::Column::Status.eq(db_enums::VoucherStatus::Pending))
                    .filter(payment_vouchers::Column::VoucherType.eq(db_enums::VoucherType::ToBill))
                    .exec(txn)
                    .await?;
            }
            VoucherOp::Issue(voucher) => {
                issue_voucher(txn, booking, voucher, actor, today).await?;
            }
        }
    }
    Ok(())
}

fn cancelled() -> payment_vouchers::ActiveModel {
    payment_vouchers::ActiveModel {
        status: Set(db_enums::VoucherStatus::Cancelled),
        ..Default::default()
    }
}

async fn issue_voucher(
    txn: &DatabaseTransaction,
    booking: &BookingRecord,
    voucher: &NewVoucher,
    actor: &Actor,
    today: NaiveDate,
) -> Result<(), DbErr> {
    let id = Uuid::new_v4();
    let now = mapping::to_stored(booking.updated_at);
    payment_vouchers::ActiveModel {
        id: Set(id),
        booking_id: Set(booking.id.into_inner()),
        facility_type: Set(booking.facility_type.into()),
        voucher_number: Set(voucher_number(booking.facility_type, today, id)),
        voucher_type: Set(voucher.voucher_type.into()),
        status: Set(voucher.status.into()),
        amount: Set(voucher.amount),
        payment_mode: Set(booking.payment_mode.into()),
        remarks: Set(voucher.remarks.clone()),
        issued_by: Set(actor.name.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(())
}

/// Applies the ledger delta as in-place increments, never read-modify-write.
async fn apply_ledger(
    txn: &DatabaseTransaction,
    member_id: MemberId,
    delta: &LedgerDelta,
) -> Result<(), DbErr> {
    if delta.is_zero() {
        return Ok(());
    }
    members::Entity::update_many()
        .col_expr(
            members::Column::BookingAmountPaid,
            Expr::col(members::Column::BookingAmountPaid).add(delta.paid),
        )
        .col_expr(
            members::Column::BookingAmountDue,
            Expr::col(members::Column::BookingAmountDue).add(delta.owed),
        )
        .col_expr(
            members::Column::BookingBalance,
            Expr::col(members::Column::BookingBalance).add(delta.booking_balance()),
        )
        .col_expr(
            members::Column::AccountBalance,
            Expr::col(members::Column::AccountBalance).add(delta.balance),
        )
        .col_expr(
            members::Column::DrAmount,
            Expr::col(members::Column::DrAmount).add(delta.balance),
        )
        .filter(members::Column::Id.eq(member_id.into_inner()))
        .exec(txn)
        .await?;
    Ok(())
}

/// Sets or clears `is_booked`. A unit is only released when no other
/// active booking covers it today.
async fn apply_occupancy(
    txn: &DatabaseTransaction,
    booking_id: BookingId,
    changes: &[OccupancyChange],
    today: NaiveDate,
) -> Result<(), DbErr> {
    for change in changes {
        let (unit, booked) = match *change {
            OccupancyChange::Occupy(unit) => (unit, true),
            OccupancyChange::Release(unit) => {
                let others = booking_claims::Entity::find()
                    .filter(booking_claims::Column::UnitId.eq(unit.into_inner()))
                    .filter(booking_claims::Column::ClaimDate.eq(today))
                    .filter(booking_claims::Column::IsActive.eq(true))
                    .filter(booking_claims::Column::BookingId.ne(booking_id.into_inner()))
                    .count(txn)
                    .await?;
                if others > 0 {
                    continue;
                }
                (unit, false)
            }
        };
        facility_units::Entity::update_many()
            .col_expr(facility_units::Column::IsBooked, Expr::value(booked))
            .filter(facility_units::Column::Id.eq(unit.into_inner()))
            .exec(txn)
            .await?;
    }
    Ok(())
}

/// Deletes the booking member's holds on the booked units and days.
async fn release_holds(txn: &DatabaseTransaction, release: &HoldRelease) -> Result<u64, DbErr> {
    let result = holds::Entity::delete_many()
        .filter(holds::Column::MemberId.eq(release.member_id.into_inner()))
        .filter(
            holds::Column::UnitId.is_in(release.unit_ids.iter().map(|unit| unit.into_inner())),
        )
        .filter(holds::Column::StartDate.lte(release.span.last))
        .filter(holds::Column::EndDate.gte(release.span.first))
        .exec(txn)
        .await?;
    if result.rows_affected > 0 {
        debug!(
            member_id = %release.member_id,
            released = result.rows_affected,
            "Holds released on commit"
        );
    }
    Ok(result.rows_affected)
}

/// Confirmed vouchers must add up to the paid amount after every write.
async fn verify_trail(txn: &DatabaseTransaction, booking: &BookingRecord) -> Result<(), DbErr> {
    let trail: Vec<VoucherLine> = payment_vouchers::Entity::find()
        .filter(payment_vouchers::Column::BookingId.eq(booking.id.into_inner()))
        .all(txn)
        .await?
        .into_iter()
        .map(|row| VoucherLine {
            voucher_type: row.voucher_type.into(),
            status: row.status.into(),
            amount: row.amount,
        })
        .collect();

    let net = confirmed_net(&trail);
    if net != booking.paid_amount {
        warn!(
            booking_id = %booking.id,
            confirmed = %net,
            paid = %booking.paid_amount,
            "Voucher trail does not match paid amount"
        );
    }
    Ok(())
}
