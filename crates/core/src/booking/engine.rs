//! The booking engine.
//!
//! One engine, parameterised by a `FacilityPolicy`, plans every create,
//! update, cancel, hold and reservation. Planning is pure: callers load the
//! member, units and an availability snapshot, ask for a plan, then persist
//! it in a single transaction. Every validation and conflict error is raised
//! here, before anything is written.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clubdesk_shared::ClubConfig;
use clubdesk_shared::types::{BookingId, UnitId};

use super::error::BookingError;
use super::types::{
    Actor, BookingPayload, BookingPlan, BookingRecord, BookingTarget, CancelPlan, HoldRelease,
    MemberInfo, OccupancyChange, ResolvedRequest,
};
use crate::availability::{
    ActiveBooking, AvailabilityChecker, AvailabilityRequest, AvailabilitySnapshot, Coverage, Hold,
    OutOfOrderPeriod, Reservation,
};
use crate::calendar::{CalendarError, Clock, DateNormalizer, DateSpan, SystemClock};
use crate::facility::{
    BookingRules, FacilityPolicy, FacilityType, FacilityUnit, HallPolicy, LawnPolicy,
    PhotoshootPolicy, PricingType, RoomPolicy, Schedule, ScheduleDetail,
};
use crate::payment::{FinancialState, PayerRole, PaymentReconciler, PaymentRequest, ReconcileMode};
use crate::pricing::PricingCalculator;

/// Records loaded by the caller for one plan.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// The booking member.
    pub member: &'a MemberInfo,
    /// The requested units (missing ones are reported as not found).
    pub units: &'a [FacilityUnit],
    /// Everything that may block the requested units.
    pub snapshot: &'a AvailabilitySnapshot,
}

/// Object-safe view of a `BookingEngine`, for dispatch by facility type.
pub trait BookingPlanner: Send + Sync + std::fmt::Debug {
    /// Facility type this planner serves.
    fn facility_type(&self) -> FacilityType;

    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in the club timezone.
    fn today(&self) -> NaiveDate;

    /// Units and cells a payload targets. `previous` is the booking being
    /// updated, whose values fill in missing fields.
    fn resolve_target(
        &self,
        payload: &BookingPayload,
        previous: Option<&BookingRecord>,
    ) -> Result<BookingTarget, BookingError>;

    /// Validates a create payload.
    fn resolve_create(&self, payload: &BookingPayload) -> Result<ResolvedRequest, BookingError>;

    /// Validates an update payload against the stored booking.
    fn resolve_update(
        &self,
        payload: &BookingPayload,
        existing: &BookingRecord,
    ) -> Result<ResolvedRequest, BookingError>;

    /// Plans a new booking.
    fn plan_create(
        &self,
        request: ResolvedRequest,
        actor: &Actor,
        ctx: &PlanContext<'_>,
    ) -> Result<BookingPlan, BookingError>;

    /// Plans a change to an existing booking.
    fn plan_update(
        &self,
        request: ResolvedRequest,
        actor: &Actor,
        ctx: &PlanContext<'_>,
        existing: &BookingRecord,
    ) -> Result<BookingPlan, BookingError>;

    /// Plans a cancellation.
    fn plan_cancel(&self, existing: &BookingRecord, actor: &Actor)
    -> Result<CancelPlan, BookingError>;

    /// Plans checkout holds, one per unit.
    fn plan_hold(
        &self,
        target: &BookingTarget,
        ctx: &PlanContext<'_>,
    ) -> Result<Vec<Hold>, BookingError>;

    /// Plans staff reservations, one per unit. Holds never block them.
    fn plan_reservation(
        &self,
        target: &BookingTarget,
        units: &[FacilityUnit],
        snapshot: &AvailabilitySnapshot,
    ) -> Result<Vec<Reservation>, BookingError>;

    /// Plans a maintenance window and reports the bookings it overlaps.
    fn plan_out_of_order(
        &self,
        unit: &FacilityUnit,
        start: &str,
        end: Option<&str>,
        reason: &str,
        bookings: &[ActiveBooking],
    ) -> Result<(OutOfOrderPeriod, Vec<BookingId>), BookingError>;

    /// Rejects changes to maintenance windows that have already ended.
    fn ensure_out_of_order_mutable(&self, period: &OutOfOrderPeriod) -> Result<(), BookingError>;
}

/// Booking engine for one facility type.
#[derive(Debug)]
pub struct BookingEngine<P: FacilityPolicy> {
    policy: P,
    rules: BookingRules,
    clock: Arc<dyn Clock>,
    normalizer: DateNormalizer,
}

impl<P: FacilityPolicy> BookingEngine<P> {
    /// Creates an engine.
    pub fn new(policy: P, rules: BookingRules, clock: Arc<dyn Clock>) -> Self {
        let normalizer = DateNormalizer::new(clock.timezone());
        Self {
            policy,
            rules,
            clock,
            normalizer,
        }
    }

    /// The facility policy.
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    fn parse_time(input: &str) -> Result<NaiveTime, BookingError> {
        let trimmed = input.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| BookingError::InvalidSlot(format!("unreadable start time: {input}")))
    }

    fn parse_time_opt(input: Option<&str>) -> Result<Option<NaiveTime>, BookingError> {
        input.map(Self::parse_time).transpose()
    }

    fn schedule(
        &self,
        payload: &BookingPayload,
        previous: Option<&Schedule>,
    ) -> Result<Schedule, BookingError> {
        let start_in = self.normalizer.normalize_opt(payload.start_date.as_deref())?;
        let end_in = self.normalizer.normalize_opt(payload.end_date.as_deref())?;
        let dates_changed = start_in.is_some() || end_in.is_some();

        let start = start_in
            .or(previous.map(|s| s.start))
            .ok_or(BookingError::MissingField("start_date"))?;
        let end = match (end_in, previous) {
            (Some(end), _) => end,
            (None, Some(prev)) => prev.end,
            (None, None) if self.policy.facility_type() == FacilityType::Room => {
                return Err(BookingError::MissingField("end_date"));
            }
            (None, None) => start,
        };

        let details = if payload.booking_details.is_empty() {
            match previous {
                Some(prev) if !dates_changed => prev.details.clone(),
                _ => Vec::new(),
            }
        } else {
            payload
                .booking_details
                .iter()
                .map(|detail| -> Result<ScheduleDetail, BookingError> {
                    Ok(ScheduleDetail {
                        date: self.normalizer.normalize(&detail.date)?,
                        time_slot: detail.time_slot,
                        start_time: Self::parse_time_opt(detail.start_time.as_deref())?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Schedule {
            start,
            end,
            time_slot: payload.time_slot.or(previous.and_then(|s| s.time_slot)),
            start_time: Self::parse_time_opt(payload.start_time.as_deref())?
                .or(previous.and_then(|s| s.start_time)),
            details,
        })
    }

    fn requested_units(payload: &BookingPayload) -> Vec<UnitId> {
        let mut seen = HashSet::new();
        payload
            .unit_ids
            .iter()
            .copied()
            .chain(payload.unit_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn ensure_not_past(&self, start: NaiveDate) -> Result<(), BookingError> {
        let today = self.clock.today();
        if start < today {
            return Err(BookingError::StartInPast { start, today });
        }
        Ok(())
    }

    fn ensure_facility(&self, booking: &BookingRecord) -> Result<(), BookingError> {
        let expected = self.policy.facility_type();
        if booking.facility_type != expected {
            return Err(BookingError::FacilityMismatch {
                booking: booking.id,
                expected,
            });
        }
        if booking.is_cancelled {
            return Err(BookingError::BookingCancelled(booking.id));
        }
        Ok(())
    }

    /// Looks up every requested unit and checks it can be booked here.
    fn bookable_units(
        &self,
        unit_ids: &[UnitId],
        units: &[FacilityUnit],
    ) -> Result<Vec<FacilityUnit>, BookingError> {
        let expected = self.policy.facility_type();
        unit_ids
            .iter()
            .map(|id| {
                let unit = units
                    .iter()
                    .find(|unit| unit.id == *id)
                    .ok_or(BookingError::UnitNotFound(*id))?;
                if unit.facility_type != expected {
                    return Err(BookingError::UnitTypeMismatch {
                        unit: *id,
                        expected,
                    });
                }
                if !unit.is_active {
                    return Err(BookingError::UnitInactive(*id));
                }
                Ok(unit.clone())
            })
            .collect()
    }

    fn resolve(
        &self,
        payload: &BookingPayload,
        existing: Option<&BookingRecord>,
    ) -> Result<ResolvedRequest, BookingError> {
        if let (Some(booking), Some(requested)) = (existing, payload.member_id)
            && requested != booking.member_id
        {
            return Err(BookingError::MemberChangeNotAllowed {
                booking: booking.id,
                current: booking.member_id,
                requested,
            });
        }
        let target = self.resolve_target(payload, existing)?;
        let member_id = existing
            .map(|booking| booking.member_id)
            .or(target.member_id)
            .ok_or(BookingError::MissingField("member_id"))?;

        let pricing_type = payload
            .pricing_type
            .or(existing.map(|b| b.pricing_type))
            .unwrap_or(PricingType::Member);
        let payer_role = payload
            .payer_role
            .or(existing.map(|b| b.payer_role))
            .unwrap_or(if pricing_type.is_guest() {
                PayerRole::Guest
            } else {
                PayerRole::Member
            });

        let guest_name = non_blank(payload.guest_name.as_deref())
            .or_else(|| existing.and_then(|b| b.guest_name.clone()));
        let guest_contact = non_blank(payload.guest_contact.as_deref())
            .or_else(|| existing.and_then(|b| b.guest_contact.clone()));
        if (pricing_type.is_guest() || payer_role == PayerRole::Guest)
            && (guest_name.is_none() || guest_contact.is_none())
        {
            return Err(BookingError::GuestDetailsRequired);
        }

        Ok(ResolvedRequest {
            member_id,
            unit_ids: target.unit_ids,
            schedule: target.schedule,
            claims: target.claims,
            span: target.span,
            pricing_type,
            total_override: payload.total_price,
            payment_status: payload.payment_status,
            paid_amount: payload.paid_amount,
            payment_mode: payload
                .payment_mode
                .or(existing.map(|b| b.payment_mode))
                .unwrap_or_default(),
            payer_role,
            guest_name,
            guest_contact,
            occupants: payload
                .occupants
                .or(existing.map(|b| b.occupants))
                .unwrap_or(1),
            remarks: non_blank(payload.remarks.as_deref())
                .or_else(|| existing.and_then(|b| b.remarks.clone())),
        })
    }

    fn plan(
        &self,
        request: ResolvedRequest,
        actor: &Actor,
        ctx: &PlanContext<'_>,
        existing: Option<&BookingRecord>,
    ) -> Result<BookingPlan, BookingError> {
        if ctx.member.id != request.member_id {
            return Err(BookingError::MemberNotFound(request.member_id));
        }
        if !ctx.member.is_active {
            return Err(BookingError::MemberInactive(ctx.member.id));
        }

        let units = self.bookable_units(&request.unit_ids, ctx.units)?;
        self.policy.validate_capacity(request.occupants, &units)?;

        let now = self.clock.now_utc();
        let availability = AvailabilityRequest::new(&request.unit_ids, &request.claims)
            .excluding(existing.map(|b| b.id))
            .for_member(Some(request.member_id));
        AvailabilityChecker::check(&availability, ctx.snapshot, now)?;

        // Untouched bookings keep their stored price.
        let unchanged = existing.filter(|b| {
            request.total_override.is_none()
                && b.pricing_type == request.pricing_type
                && b.claims == request.claims
                && same_units(&b.unit_ids, &request.unit_ids)
        });
        let quote = PricingCalculator::quote(
            &self.policy,
            &units,
            request.pricing_type,
            &request.claims,
            request.total_override.or(unchanged.map(|b| b.total_price)),
        )?;

        let (current, mode) = match existing {
            Some(booking) => (booking.financial(), ReconcileMode::Update),
            None => (FinancialState::empty(), ReconcileMode::Create),
        };
        let payment = PaymentReconciler::reconcile(
            &current,
            &PaymentRequest {
                total: quote.total,
                status: request.payment_status,
                paid: request.paid_amount,
            },
            mode,
        )?;

        let today = self.clock.today();
        let occupancy = occupancy_changes(today, existing, &request);
        let holds = HoldRelease {
            member_id: request.member_id,
            unit_ids: request.unit_ids.clone(),
            span: request.span,
        };

        let settlement = payment.settlement;
        let booking = BookingRecord {
            id: existing.map_or_else(BookingId::new, |b| b.id),
            facility_type: self.policy.facility_type(),
            member_id: request.member_id,
            unit_ids: request.unit_ids,
            schedule: request.schedule,
            claims: request.claims,
            pricing_type: request.pricing_type,
            total_price: settlement.total,
            paid_amount: settlement.paid,
            pending_amount: settlement.owed,
            payment_status: settlement.status,
            payment_mode: request.payment_mode,
            payer_role: request.payer_role,
            guest_name: request.guest_name,
            guest_contact: request.guest_contact,
            occupants: request.occupants,
            refund_amount: existing.map_or(payment.refund, |b| b.refund_amount + payment.refund),
            remarks: request.remarks,
            is_cancelled: false,
            created_by: existing.map_or_else(|| actor.name.clone(), |b| b.created_by.clone()),
            updated_by: actor.name.clone(),
            created_at: existing.map_or(now, |b| b.created_at),
            updated_at: now,
        };

        Ok(BookingPlan {
            booking,
            previous: existing.cloned(),
            quote,
            payment,
            occupancy,
            holds,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn same_units(a: &[UnitId], b: &[UnitId]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

fn occupancy_changes(
    today: NaiveDate,
    previous: Option<&BookingRecord>,
    request: &ResolvedRequest,
) -> Vec<OccupancyChange> {
    let unit_ids = &request.unit_ids;
    let covers_today = request.claims.iter().any(|claim| claim.date == today);
    let mut changes: Vec<OccupancyChange> = if covers_today {
        unit_ids.iter().copied().map(OccupancyChange::Occupy).collect()
    } else {
        Vec::new()
    };

    if let Some(prev) = previous {
        let covered_today = prev.occupies(today);
        for unit in &prev.unit_ids {
            let kept = unit_ids.contains(unit);
            if !(covers_today && kept) && (covered_today || !kept) {
                changes.push(OccupancyChange::Release(*unit));
            }
        }
    }
    changes
}

impl<P: FacilityPolicy> BookingPlanner for BookingEngine<P> {
    fn facility_type(&self) -> FacilityType {
        self.policy.facility_type()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now_utc()
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn resolve_target(
        &self,
        payload: &BookingPayload,
        previous: Option<&BookingRecord>,
    ) -> Result<BookingTarget, BookingError> {
        let mut unit_ids = Self::requested_units(payload);
        if unit_ids.is_empty() {
            unit_ids = previous.map(|b| b.unit_ids.clone()).unwrap_or_default();
        }
        if unit_ids.is_empty() {
            return Err(BookingError::MissingField("unit_ids"));
        }
        if unit_ids.len() > 1 && !self.policy.allows_multiple_units() {
            return Err(BookingError::MultipleUnitsNotAllowed(self.policy.facility_type()));
        }

        let schedule = self.schedule(payload, previous.map(|b| &b.schedule))?;
        if previous.is_none_or(|b| b.schedule.start != schedule.start) {
            self.ensure_not_past(schedule.start)?;
        }
        let span = self.policy.span(&schedule)?;
        if span.len_days() > self.rules.max_booking_days {
            return Err(BookingError::RangeTooLong {
                days: span.len_days(),
                max: self.rules.max_booking_days,
            });
        }
        let claims = self.policy.claims(&schedule)?;

        Ok(BookingTarget {
            member_id: payload.member_id,
            unit_ids,
            schedule,
            claims,
            span,
        })
    }

    fn resolve_create(&self, payload: &BookingPayload) -> Result<ResolvedRequest, BookingError> {
        self.resolve(payload, None)
    }

    fn resolve_update(
        &self,
        payload: &BookingPayload,
        existing: &BookingRecord,
    ) -> Result<ResolvedRequest, BookingError> {
        self.ensure_facility(existing)?;
        self.resolve(payload, Some(existing))
    }

    fn plan_create(
        &self,
        request: ResolvedRequest,
        actor: &Actor,
        ctx: &PlanContext<'_>,
    ) -> Result<BookingPlan, BookingError> {
        self.plan(request, actor, ctx, None)
    }

    fn plan_update(
        &self,
        request: ResolvedRequest,
        actor: &Actor,
        ctx: &PlanContext<'_>,
        existing: &BookingRecord,
    ) -> Result<BookingPlan, BookingError> {
        self.ensure_facility(existing)?;
        self.plan(request, actor, ctx, Some(existing))
    }

    fn plan_cancel(
        &self,
        existing: &BookingRecord,
        actor: &Actor,
    ) -> Result<CancelPlan, BookingError> {
        self.ensure_facility(existing)?;
        let mut booking = existing.clone();
        booking.is_cancelled = true;
        booking.updated_by.clone_from(&actor.name);
        booking.updated_at = self.clock.now_utc();

        let occupancy = booking
            .unit_ids
            .iter()
            .copied()
            .map(OccupancyChange::Release)
            .collect();
        Ok(CancelPlan { booking, occupancy })
    }

    fn plan_hold(
        &self,
        target: &BookingTarget,
        ctx: &PlanContext<'_>,
    ) -> Result<Vec<Hold>, BookingError> {
        if !ctx.member.is_active {
            return Err(BookingError::MemberInactive(ctx.member.id));
        }
        let units = self.bookable_units(&target.unit_ids, ctx.units)?;

        let now = self.clock.now_utc();
        let request = AvailabilityRequest::new(&target.unit_ids, &target.claims)
            .for_member(Some(ctx.member.id));
        AvailabilityChecker::check(&request, ctx.snapshot, now)?;

        let coverage = Coverage::from_claims(&target.claims)
            .ok_or(BookingError::MissingField("start_date"))?;
        Ok(units
            .iter()
            .map(|unit| Hold {
                id: clubdesk_shared::types::HoldId::new(),
                unit_id: unit.id,
                member_id: ctx.member.id,
                coverage: coverage.clone(),
                expires_at: now + self.rules.hold_ttl,
            })
            .collect())
    }

    fn plan_reservation(
        &self,
        target: &BookingTarget,
        units: &[FacilityUnit],
        snapshot: &AvailabilitySnapshot,
    ) -> Result<Vec<Reservation>, BookingError> {
        let units = self.bookable_units(&target.unit_ids, units)?;
        let request = AvailabilityRequest::new(&target.unit_ids, &target.claims).ignoring_holds();
        AvailabilityChecker::check(&request, snapshot, self.clock.now_utc())?;

        let coverage = Coverage::from_claims(&target.claims)
            .ok_or(BookingError::MissingField("start_date"))?;
        Ok(units
            .iter()
            .map(|unit| Reservation {
                id: clubdesk_shared::types::ReservationId::new(),
                unit_id: unit.id,
                coverage: coverage.clone(),
            })
            .collect())
    }

    fn plan_out_of_order(
        &self,
        unit: &FacilityUnit,
        start: &str,
        end: Option<&str>,
        reason: &str,
        bookings: &[ActiveBooking],
    ) -> Result<(OutOfOrderPeriod, Vec<BookingId>), BookingError> {
        let expected = self.policy.facility_type();
        if unit.facility_type != expected {
            return Err(BookingError::UnitTypeMismatch {
                unit: unit.id,
                expected,
            });
        }
        let reason = non_blank(Some(reason)).ok_or(BookingError::MissingField("reason"))?;

        let first = self.normalizer.normalize(start)?;
        let last = self.normalizer.normalize_opt(end)?.unwrap_or(first);
        let span = DateSpan::new(first, last)
            .ok_or(BookingError::InvalidDateRange { start: first, end: last })?;
        let today = self.clock.today();
        if last < today {
            return Err(BookingError::PeriodEnded { end: last, today });
        }

        let period = OutOfOrderPeriod {
            id: clubdesk_shared::types::OutOfOrderId::new(),
            unit_id: unit.id,
            span,
            reason,
        };
        let overlaps = AvailabilityChecker::maintenance_overlaps(&period, bookings);
        Ok((period, overlaps))
    }

    fn ensure_out_of_order_mutable(&self, period: &OutOfOrderPeriod) -> Result<(), BookingError> {
        if period.span.last < self.clock.today() {
            return Err(BookingError::OutOfOrderLocked(period.id));
        }
        Ok(())
    }
}

/// One engine per facility type.
#[derive(Debug)]
pub struct BookingEngines {
    room: BookingEngine<RoomPolicy>,
    hall: BookingEngine<HallPolicy>,
    lawn: BookingEngine<LawnPolicy>,
    photoshoot: BookingEngine<PhotoshootPolicy>,
    clock: Arc<dyn Clock>,
}

impl BookingEngines {
    /// Creates the four engines sharing one clock.
    pub fn new(rules: &BookingRules, clock: Arc<dyn Clock>) -> Self {
        Self {
            room: BookingEngine::new(RoomPolicy::new(rules), rules.clone(), Arc::clone(&clock)),
            hall: BookingEngine::new(HallPolicy, rules.clone(), Arc::clone(&clock)),
            lawn: BookingEngine::new(LawnPolicy, rules.clone(), Arc::clone(&clock)),
            photoshoot: BookingEngine::new(
                PhotoshootPolicy::new(rules),
                rules.clone(),
                Arc::clone(&clock),
            ),
            clock,
        }
    }

    /// Engines on the system clock in the configured timezone.
    pub fn from_config(config: &ClubConfig) -> Result<Self, CalendarError> {
        let clock = SystemClock::from_name(&config.timezone)?;
        Ok(Self::new(&BookingRules::from(config), Arc::new(clock)))
    }

    /// The planner for a facility type.
    pub fn planner(&self, facility: FacilityType) -> &dyn BookingPlanner {
        match facility {
            FacilityType::Room => &self.room,
            FacilityType::Hall => &self.hall,
            FacilityType::Lawn => &self.lawn,
            FacilityType::Photoshoot => &self.photoshoot,
        }
    }

    /// The shared clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
