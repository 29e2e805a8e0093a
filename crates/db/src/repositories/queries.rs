//! Reads shared by the repositories, generic over connection or transaction.

use std::collections::{BTreeMap, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use clubdesk_core::availability::{ActiveBooking, AvailabilitySnapshot, Coverage};
use clubdesk_core::booking::{BookingError, BookingRecord, MemberInfo};
use clubdesk_core::calendar::DateSpan;
use clubdesk_core::facility::{FacilityUnit, SlotClaim};
use clubdesk_shared::types::{BookingId, MemberId, UnitId};

use super::error::RepositoryError;
use super::mapping;
use crate::entities::{
    booking_claims, booking_units, bookings, facility_units, holds, members,
    out_of_order_periods, reservations,
};

fn uuids<T: Copy>(ids: &[T], inner: impl Fn(T) -> Uuid) -> Vec<Uuid> {
    ids.iter().copied().map(inner).collect()
}

pub(crate) async fn member<C: ConnectionTrait>(
    conn: &C,
    id: MemberId,
) -> Result<MemberInfo, RepositoryError> {
    let model = members::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(BookingError::MemberNotFound(id))?;
    Ok(mapping::member_info(&model))
}

/// Loads the units that exist among `ids`; missing ones are reported by the
/// engine when it resolves the request.
pub(crate) async fn units<C: ConnectionTrait>(
    conn: &C,
    ids: &[UnitId],
) -> Result<Vec<FacilityUnit>, RepositoryError> {
    let rows = facility_units::Entity::find()
        .filter(facility_units::Column::Id.is_in(uuids(ids, UnitId::into_inner)))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(mapping::facility_unit).collect())
}

pub(crate) async fn unit<C: ConnectionTrait>(
    conn: &C,
    id: UnitId,
) -> Result<FacilityUnit, RepositoryError> {
    let row = facility_units::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(BookingError::UnitNotFound(id))?;
    Ok(mapping::facility_unit(row))
}

/// Groups active claim rows into one coverage per (booking, unit).
pub(crate) fn active_bookings(
    rows: &[booking_claims::Model],
) -> Result<Vec<ActiveBooking>, BookingError> {
    let mut grouped: BTreeMap<(Uuid, Uuid), Vec<SlotClaim>> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.is_active) {
        grouped
            .entry((row.booking_id, row.unit_id))
            .or_default()
            .push(mapping::slot_claim(row)?);
    }
    Ok(grouped
        .into_iter()
        .filter_map(|((booking, unit), claims)| {
            Coverage::from_claims(&claims).map(|coverage| ActiveBooking {
                booking_id: BookingId::from_uuid(booking),
                unit_id: UnitId::from_uuid(unit),
                coverage,
            })
        })
        .collect())
}

/// Active claims of the given units within `span`.
pub(crate) async fn booked<C: ConnectionTrait>(
    conn: &C,
    unit_ids: &[UnitId],
    span: &DateSpan,
) -> Result<Vec<ActiveBooking>, RepositoryError> {
    let rows = booking_claims::Entity::find()
        .filter(booking_claims::Column::UnitId.is_in(uuids(unit_ids, UnitId::into_inner)))
        .filter(booking_claims::Column::IsActive.eq(true))
        .filter(booking_claims::Column::ClaimDate.between(span.first, span.last))
        .all(conn)
        .await?;
    Ok(active_bookings(&rows)?)
}

/// Every active claim of one unit.
pub(crate) async fn unit_bookings<C: ConnectionTrait>(
    conn: &C,
    unit_id: UnitId,
) -> Result<Vec<ActiveBooking>, RepositoryError> {
    let rows = booking_claims::Entity::find()
        .filter(booking_claims::Column::UnitId.eq(unit_id.into_inner()))
        .filter(booking_claims::Column::IsActive.eq(true))
        .all(conn)
        .await?;
    Ok(active_bookings(&rows)?)
}

/// Everything that may block `unit_ids` on the days of `span`.
pub(crate) async fn snapshot<C: ConnectionTrait>(
    conn: &C,
    unit_ids: &[UnitId],
    span: &DateSpan,
) -> Result<AvailabilitySnapshot, RepositoryError> {
    let ids = uuids(unit_ids, UnitId::into_inner);

    let out_of_order = out_of_order_periods::Entity::find()
        .filter(out_of_order_periods::Column::UnitId.is_in(ids.clone()))
        .filter(out_of_order_periods::Column::StartDate.lte(span.last))
        .filter(out_of_order_periods::Column::EndDate.gte(span.first))
        .all(conn)
        .await?
        .iter()
        .map(mapping::out_of_order)
        .collect::<Result<Vec<_>, _>>()?;

    let reservations = reservations::Entity::find()
        .filter(reservations::Column::UnitId.is_in(ids.clone()))
        .filter(reservations::Column::StartDate.lte(span.last))
        .filter(reservations::Column::EndDate.gte(span.first))
        .all(conn)
        .await?
        .iter()
        .map(mapping::reservation)
        .collect::<Result<Vec<_>, _>>()?;

    let holds = holds::Entity::find()
        .filter(holds::Column::UnitId.is_in(ids))
        .filter(holds::Column::StartDate.lte(span.last))
        .filter(holds::Column::EndDate.gte(span.first))
        .all(conn)
        .await?
        .iter()
        .map(mapping::hold)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AvailabilitySnapshot {
        out_of_order,
        bookings: booked(conn, unit_ids, span).await?,
        reservations,
        holds,
    })
}

/// Loads full booking records for the given rows, preserving their order.
pub(crate) async fn records<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<bookings::Model>,
) -> Result<Vec<BookingRecord>, RepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut units: HashMap<Uuid, Vec<booking_units::Model>> = HashMap::new();
    for row in booking_units::Entity::find()
        .filter(booking_units::Column::BookingId.is_in(ids.clone()))
        .all(conn)
        .await?
    {
        units.entry(row.booking_id).or_default().push(row);
    }

    let mut claims: HashMap<Uuid, Vec<booking_claims::Model>> = HashMap::new();
    for row in booking_claims::Entity::find()
        .filter(booking_claims::Column::BookingId.is_in(ids))
        .order_by_asc(booking_claims::Column::ClaimDate)
        .all(conn)
        .await?
    {
        claims.entry(row.booking_id).or_default().push(row);
    }

    rows.into_iter()
        .map(|row| {
            let id = row.id;
            mapping::booking_record(
                row,
                units.remove(&id).unwrap_or_default(),
                claims.get(&id).map_or(&[][..], Vec::as_slice),
            )
            .map_err(RepositoryError::from)
        })
        .collect()
}

/// Loads one booking, optionally locking its row for the rest of the
/// transaction.
pub(crate) async fn booking<C: ConnectionTrait>(
    conn: &C,
    id: BookingId,
    lock: bool,
) -> Result<BookingRecord, RepositoryError> {
    let mut query = bookings::Entity::find_by_id(id.into_inner());
    if lock {
        query = query.lock_exclusive();
    }
    let row = query
        .one(conn)
        .await?
        .ok_or(BookingError::BookingNotFound(id))?;
    records(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| BookingError::BookingNotFound(id).into())
}
