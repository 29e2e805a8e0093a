//! Conversions between stored rows and core domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::Set;
use sea_orm::prelude::{DateTimeWithTimeZone, Json};

use clubdesk_core::availability::{Coverage, Hold, OutOfOrderPeriod, Reservation};
use clubdesk_core::booking::{BookingError, BookingRecord, MemberInfo};
use clubdesk_core::calendar::DateSpan;
use clubdesk_core::facility::{
    FacilityUnit, Rates, Schedule, ScheduleDetail, Slot, SlotClaim, TimeSlot,
};
use clubdesk_core::payment::Voucher;
use clubdesk_shared::types::{
    BookingId, HoldId, MemberId, OutOfOrderId, ReservationId, UnitId, VoucherId,
};

use crate::entities::{
    booking_claims, booking_units, bookings, facility_units, holds, members,
    out_of_order_periods, payment_vouchers, reservations,
};

pub(crate) fn to_utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn to_stored(at: DateTime<Utc>) -> DateTimeWithTimeZone {
    at.fixed_offset()
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> BookingError {
    BookingError::Internal(format!("corrupt {what}: {detail}"))
}

fn span(first: NaiveDate, last: NaiveDate) -> Result<DateSpan, BookingError> {
    DateSpan::new(first, last).ok_or_else(|| corrupt("date range", format!("{first}..{last}")))
}

pub(crate) fn member_info(model: &members::Model) -> MemberInfo {
    MemberInfo {
        id: MemberId::from_uuid(model.id),
        name: model.name.clone(),
        is_active: model.is_active,
    }
}

pub(crate) fn facility_unit(model: facility_units::Model) -> FacilityUnit {
    FacilityUnit {
        id: UnitId::from_uuid(model.id),
        facility_type: model.facility_type.into(),
        name: model.name,
        rates: Rates {
            member: model.member_rate,
            guest: model.guest_rate,
            forces: model.forces_rate,
            corporate: model.corporate_rate,
        },
        capacity: model.capacity.and_then(|c| u32::try_from(c).ok()),
        is_active: model.is_active,
        is_booked: model.is_booked,
    }
}

pub(crate) fn slot_claim(row: &booking_claims::Model) -> Result<SlotClaim, BookingError> {
    let slot = Slot::from_key(&row.slot).ok_or_else(|| corrupt("slot key", &row.slot))?;
    Ok(SlotClaim::new(row.claim_date, slot))
}

/// Rebuilds a booking from its row, unit rows and claim rows.
pub(crate) fn booking_record(
    model: bookings::Model,
    mut units: Vec<booking_units::Model>,
    claims: &[booking_claims::Model],
) -> Result<BookingRecord, BookingError> {
    units.sort_by_key(|row| row.position);
    let claims: BTreeSet<SlotClaim> = claims.iter().map(slot_claim).collect::<Result<_, _>>()?;

    let time_slot = model
        .time_slot
        .as_deref()
        .map(str::parse::<TimeSlot>)
        .transpose()
        .map_err(|err| corrupt("time slot", err))?;
    let details: Vec<ScheduleDetail> =
        serde_json::from_value(model.slot_details).map_err(|err| corrupt("slot details", err))?;

    Ok(BookingRecord {
        id: BookingId::from_uuid(model.id),
        facility_type: model.facility_type.into(),
        member_id: MemberId::from_uuid(model.member_id),
        unit_ids: units
            .iter()
            .map(|row| UnitId::from_uuid(row.unit_id))
            .collect(),
        schedule: Schedule {
            start: model.start_date,
            end: model.end_date,
            time_slot,
            start_time: model.start_time,
            details,
        },
        claims: claims.into_iter().collect(),
        pricing_type: model.pricing_type.into(),
        total_price: model.total_price,
        paid_amount: model.paid_amount,
        pending_amount: model.pending_amount,
        payment_status: model.payment_status.into(),
        payment_mode: model.payment_mode.into(),
        payer_role: model.payer_role.into(),
        guest_name: model.guest_name,
        guest_contact: model.guest_contact,
        occupants: u32::try_from(model.occupants).map_err(|err| corrupt("occupants", err))?,
        refund_amount: model.refund_amount,
        remarks: model.remarks,
        is_cancelled: model.is_cancelled,
        created_by: model.created_by,
        updated_by: model.updated_by,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
    })
}

/// Full active model for a booking row, every column set.
pub(crate) fn booking_active_model(
    booking: &BookingRecord,
) -> Result<bookings::ActiveModel, BookingError> {
    let details = serde_json::to_value(&booking.schedule.details)
        .map_err(|err| BookingError::Internal(err.to_string()))?;
    let occupants = i32::try_from(booking.occupants)
        .map_err(|_| BookingError::Internal(format!("occupants out of range: {}", booking.occupants)))?;

    Ok(bookings::ActiveModel {
        id: Set(booking.id.into_inner()),
        facility_type: Set(booking.facility_type.into()),
        member_id: Set(booking.member_id.into_inner()),
        start_date: Set(booking.schedule.start),
        end_date: Set(booking.schedule.end),
        time_slot: Set(booking.schedule.time_slot.map(|slot| slot.as_str().to_string())),
        start_time: Set(booking.schedule.start_time),
        slot_details: Set(details),
        pricing_type: Set(booking.pricing_type.into()),
        total_price: Set(booking.total_price),
        paid_amount: Set(booking.paid_amount),
        pending_amount: Set(booking.pending_amount),
        payment_status: Set(booking.payment_status.into()),
        payment_mode: Set(booking.payment_mode.into()),
        payer_role: Set(booking.payer_role.into()),
        guest_name: Set(booking.guest_name.clone()),
        guest_contact: Set(booking.guest_contact.clone()),
        occupants: Set(occupants),
        refund_amount: Set(booking.refund_amount),
        remarks: Set(booking.remarks.clone()),
        is_cancelled: Set(booking.is_cancelled),
        created_by: Set(booking.created_by.clone()),
        updated_by: Set(booking.updated_by.clone()),
        created_at: Set(to_stored(booking.created_at)),
        updated_at: Set(to_stored(booking.updated_at)),
    })
}

pub(crate) fn voucher(model: payment_vouchers::Model) -> Voucher {
    Voucher {
        id: VoucherId::from_uuid(model.id),
        booking_id: BookingId::from_uuid(model.booking_id),
        facility_type: model.facility_type.into(),
        number: model.voucher_number,
        voucher_type: model.voucher_type.into(),
        status: model.status.into(),
        amount: model.amount,
        payment_mode: model.payment_mode.into(),
        remarks: model.remarks,
        issued_by: model.issued_by,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
    }
}

/// Coverage stored as a date range plus an explicit cell list.
pub(crate) fn coverage(
    first: NaiveDate,
    last: NaiveDate,
    claims: &Json,
) -> Result<Coverage, BookingError> {
    let span = span(first, last)?;
    let details: Vec<SlotClaim> =
        serde_json::from_value(claims.clone()).map_err(|err| corrupt("claims", err))?;
    if details.is_empty() {
        return Ok(Coverage::full_days(span));
    }
    Ok(Coverage {
        span,
        slot: None,
        details,
    })
}

/// The cell list of a coverage; a slotted range is expanded day by day.
pub(crate) fn coverage_claims(coverage: &Coverage) -> Result<Json, BookingError> {
    let cells: Vec<SlotClaim> = match (&coverage.details[..], coverage.slot) {
        ([], None) => Vec::new(),
        ([], Some(slot)) => coverage
            .span
            .days()
            .map(|day| SlotClaim::new(day, slot))
            .collect(),
        (details, _) => details.to_vec(),
    };
    serde_json::to_value(cells).map_err(|err| BookingError::Internal(err.to_string()))
}

pub(crate) fn hold(model: &holds::Model) -> Result<Hold, BookingError> {
    Ok(Hold {
        id: HoldId::from_uuid(model.id),
        unit_id: UnitId::from_uuid(model.unit_id),
        member_id: MemberId::from_uuid(model.member_id),
        coverage: coverage(model.start_date, model.end_date, &model.claims)?,
        expires_at: to_utc(model.expires_at),
    })
}

pub(crate) fn reservation(model: &reservations::Model) -> Result<Reservation, BookingError> {
    Ok(Reservation {
        id: ReservationId::from_uuid(model.id),
        unit_id: UnitId::from_uuid(model.unit_id),
        coverage: coverage(model.start_date, model.end_date, &model.claims)?,
    })
}

pub(crate) fn out_of_order(
    model: &out_of_order_periods::Model,
) -> Result<OutOfOrderPeriod, BookingError> {
    Ok(OutOfOrderPeriod {
        id: OutOfOrderId::from_uuid(model.id),
        unit_id: UnitId::from_uuid(model.unit_id),
        span: span(model.start_date, model.end_date)?,
        reason: model.reason.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn claim_row(booking: Uuid, unit: Uuid, date: NaiveDate, slot: &str) -> booking_claims::Model {
        booking_claims::Model {
            id: Uuid::new_v4(),
            booking_id: booking,
            unit_id: unit,
            claim_date: date,
            slot: slot.to_string(),
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_coverage_round_trip_keeps_cells() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let cells = vec![
            SlotClaim::new(d(2025, 7, 10), Slot::Block(nine)),
            SlotClaim::new(d(2025, 7, 12), Slot::Session(TimeSlot::Evening)),
        ];
        let original = Coverage::from_claims(&cells).unwrap();
        let json = coverage_claims(&original).unwrap();
        let restored = coverage(d(2025, 7, 10), d(2025, 7, 12), &json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_empty_claims_block_whole_days() {
        let restored = coverage(d(2025, 7, 10), d(2025, 7, 11), &serde_json::json!([])).unwrap();
        assert_eq!(restored, Coverage::full_days(DateSpan::new(d(2025, 7, 10), d(2025, 7, 11)).unwrap()));
    }

    #[test]
    fn test_slotted_range_is_expanded() {
        let span = DateSpan::new(d(2025, 7, 10), d(2025, 7, 11)).unwrap();
        let json = coverage_claims(&Coverage::range(span, Slot::Session(TimeSlot::Morning))).unwrap();
        let cells: Vec<SlotClaim> = serde_json::from_value(json).unwrap();
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| c.slot == Slot::Session(TimeSlot::Morning)));
    }

    #[test]
    fn test_reversed_range_is_corrupt() {
        let err = coverage(d(2025, 7, 11), d(2025, 7, 10), &serde_json::json!([])).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_claims_are_deduplicated_across_units() {
        let booking = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            claim_row(booking, a, d(2025, 6, 1), "FULL_DAY"),
            claim_row(booking, b, d(2025, 6, 1), "FULL_DAY"),
            claim_row(booking, a, d(2025, 6, 2), "FULL_DAY"),
            claim_row(booking, b, d(2025, 6, 2), "FULL_DAY"),
        ];
        let claims: BTreeSet<SlotClaim> = rows.iter().map(|r| slot_claim(r).unwrap()).collect();
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn test_unknown_slot_key_is_corrupt() {
        let row = claim_row(Uuid::new_v4(), Uuid::new_v4(), d(2025, 6, 1), "BRUNCH");
        assert!(slot_claim(&row).is_err());
    }
}
