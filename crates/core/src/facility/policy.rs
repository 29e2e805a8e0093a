//! Per-facility booking policies.
//!
//! The booking engine is the same for every facility type; what differs is
//! captured here: how a schedule expands into slot claims, which rate column
//! a pricing type selects, and how occupancy is capped.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use clubdesk_shared::ClubConfig;
use rust_decimal::Decimal;

use super::types::{FacilityType, FacilityUnit, PricingType, Rates, Schedule, Slot, SlotClaim};
use crate::booking::BookingError;
use crate::calendar::DateSpan;

/// Length of one photoshoot block, in hours.
pub const PHOTOSHOOT_BLOCK_HOURS: u32 = 2;

/// Club-wide rules the policies are configured with.
#[derive(Debug, Clone)]
pub struct BookingRules {
    /// Maximum occupants per booked room.
    pub max_room_occupants: u32,
    /// First photoshoot block starts at this hour.
    pub photoshoot_opening_hour: u32,
    /// Last photoshoot block ends by this hour.
    pub photoshoot_closing_hour: u32,
    /// Lifetime of a checkout hold.
    pub hold_ttl: Duration,
    /// Longest range, in days, one booking may cover.
    pub max_booking_days: u32,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self::from(&ClubConfig::default())
    }
}

impl From<&ClubConfig> for BookingRules {
    fn from(config: &ClubConfig) -> Self {
        Self {
            max_room_occupants: config.max_room_occupants,
            photoshoot_opening_hour: config.photoshoot_opening_hour,
            photoshoot_closing_hour: config.photoshoot_closing_hour,
            hold_ttl: Duration::minutes(config.hold_ttl_minutes),
            max_booking_days: config.max_booking_days,
        }
    }
}

/// Facility-specific rules plugged into the booking engine.
pub trait FacilityPolicy: Send + Sync + std::fmt::Debug {
    /// The facility type this policy governs.
    fn facility_type(&self) -> FacilityType;

    /// Whether one booking may span several units.
    fn allows_multiple_units(&self) -> bool {
        false
    }

    /// Expands a schedule into the (day, slot) cells it occupies on each unit.
    ///
    /// The result is sorted and free of duplicates.
    fn claims(&self, schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError>;

    /// Legacy single-range coverage of a schedule, stored alongside claims.
    fn span(&self, schedule: &Schedule) -> Result<DateSpan, BookingError>;

    /// Rate per billable unit for a pricing type.
    fn rate(&self, unit: &FacilityUnit, pricing: PricingType) -> Result<Decimal, BookingError>;

    /// Number of billable units (nights, sessions, blocks) per facility unit.
    fn billable_units(&self, claims: &[SlotClaim]) -> u32 {
        u32::try_from(claims.len()).unwrap_or(u32::MAX)
    }

    /// Rejects bookings with more occupants than the units allow.
    fn validate_capacity(&self, occupants: u32, units: &[FacilityUnit]) -> Result<(), BookingError>;
}

fn member_or_guest(
    facility: FacilityType,
    rates: &Rates,
    pricing: PricingType,
) -> Result<Decimal, BookingError> {
    match pricing {
        PricingType::Member => Ok(rates.member),
        PricingType::Guest => Ok(rates.guest),
        _ => Err(BookingError::UnsupportedPricingType { facility, pricing }),
    }
}

fn inclusive_span(schedule: &Schedule) -> Result<DateSpan, BookingError> {
    DateSpan::new(schedule.start, schedule.end).ok_or(BookingError::InvalidDateRange {
        start: schedule.start,
        end: schedule.end,
    })
}

fn ensure_within(schedule: &Schedule, span: &DateSpan, date: NaiveDate) -> Result<(), BookingError> {
    if span.contains(date) {
        Ok(())
    } else {
        Err(BookingError::SlotOutsideRange {
            date,
            start: schedule.start,
            end: schedule.end,
        })
    }
}

fn sorted(mut claims: Vec<SlotClaim>) -> Vec<SlotClaim> {
    claims.sort();
    claims.dedup();
    claims
}

fn capped_by_unit(occupants: u32, units: &[FacilityUnit]) -> Result<(), BookingError> {
    for unit in units {
        if let Some(capacity) = unit.capacity
            && occupants > capacity
        {
            return Err(BookingError::CapacityExceeded {
                occupants,
                capacity,
            });
        }
    }
    Ok(())
}

/// Guest rooms: nightly, several rooms per booking.
#[derive(Debug, Clone)]
pub struct RoomPolicy {
    max_occupants_per_room: u32,
}

impl RoomPolicy {
    /// Creates the room policy.
    #[must_use]
    pub fn new(rules: &BookingRules) -> Self {
        Self {
            max_occupants_per_room: rules.max_room_occupants,
        }
    }
}

impl FacilityPolicy for RoomPolicy {
    fn facility_type(&self) -> FacilityType {
        FacilityType::Room
    }

    fn allows_multiple_units(&self) -> bool {
        true
    }

    fn claims(&self, schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError> {
        let nights = self.span(schedule)?;
        Ok(nights
            .days()
            .map(|day| SlotClaim::new(day, Slot::FullDay))
            .collect())
    }

    fn span(&self, schedule: &Schedule) -> Result<DateSpan, BookingError> {
        DateSpan::nights(schedule.start, schedule.end).ok_or(BookingError::InvalidDateRange {
            start: schedule.start,
            end: schedule.end,
        })
    }

    fn rate(&self, unit: &FacilityUnit, pricing: PricingType) -> Result<Decimal, BookingError> {
        match pricing {
            PricingType::Forces | PricingType::ForcesSelf | PricingType::ForcesGuest => {
                Ok(unit.rates.forces.unwrap_or(Decimal::ZERO))
            }
            _ => member_or_guest(FacilityType::Room, &unit.rates, pricing),
        }
    }

    fn validate_capacity(&self, occupants: u32, units: &[FacilityUnit]) -> Result<(), BookingError> {
        let rooms = u32::try_from(units.len()).unwrap_or(u32::MAX).max(1);
        let capacity = self.max_occupants_per_room.saturating_mul(rooms);
        if occupants > capacity {
            return Err(BookingError::CapacityExceeded {
                occupants,
                capacity,
            });
        }
        Ok(())
    }
}

/// Session-based venues (halls and lawns) share their slot expansion.
fn session_claims(schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError> {
    let span = inclusive_span(schedule)?;

    if !schedule.details.is_empty() {
        let mut claims = Vec::with_capacity(schedule.details.len());
        for detail in &schedule.details {
            ensure_within(schedule, &span, detail.date)?;
            let session = detail
                .time_slot
                .or(schedule.time_slot)
                .ok_or(BookingError::MissingField("time_slot"))?;
            claims.push(SlotClaim::new(detail.date, Slot::Session(session)));
        }
        return Ok(sorted(claims));
    }

    let session = schedule
        .time_slot
        .ok_or(BookingError::MissingField("time_slot"))?;
    Ok(span
        .days()
        .map(|day| SlotClaim::new(day, Slot::Session(session)))
        .collect())
}

/// Banquet halls: one hall per booking, per day and session.
#[derive(Debug, Clone, Default)]
pub struct HallPolicy;

impl FacilityPolicy for HallPolicy {
    fn facility_type(&self) -> FacilityType {
        FacilityType::Hall
    }

    fn claims(&self, schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError> {
        session_claims(schedule)
    }

    fn span(&self, schedule: &Schedule) -> Result<DateSpan, BookingError> {
        inclusive_span(schedule)
    }

    fn rate(&self, unit: &FacilityUnit, pricing: PricingType) -> Result<Decimal, BookingError> {
        match pricing {
            PricingType::Corporate => unit.rates.corporate.ok_or(BookingError::RateUnavailable {
                unit: unit.id,
                pricing,
            }),
            _ => member_or_guest(FacilityType::Hall, &unit.rates, pricing),
        }
    }

    fn validate_capacity(&self, occupants: u32, units: &[FacilityUnit]) -> Result<(), BookingError> {
        capped_by_unit(occupants, units)
    }
}

/// Lawns: like halls, without a corporate tier.
#[derive(Debug, Clone, Default)]
pub struct LawnPolicy;

impl FacilityPolicy for LawnPolicy {
    fn facility_type(&self) -> FacilityType {
        FacilityType::Lawn
    }

    fn claims(&self, schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError> {
        session_claims(schedule)
    }

    fn span(&self, schedule: &Schedule) -> Result<DateSpan, BookingError> {
        inclusive_span(schedule)
    }

    fn rate(&self, unit: &FacilityUnit, pricing: PricingType) -> Result<Decimal, BookingError> {
        member_or_guest(FacilityType::Lawn, &unit.rates, pricing)
    }

    fn validate_capacity(&self, occupants: u32, units: &[FacilityUnit]) -> Result<(), BookingError> {
        capped_by_unit(occupants, units)
    }
}

/// Photoshoot studio: fixed two-hour blocks between opening and closing.
#[derive(Debug, Clone)]
pub struct PhotoshootPolicy {
    opening_hour: u32,
    closing_hour: u32,
}

impl PhotoshootPolicy {
    /// Creates the photoshoot policy.
    #[must_use]
    pub fn new(rules: &BookingRules) -> Self {
        Self {
            opening_hour: rules.photoshoot_opening_hour,
            closing_hour: rules.photoshoot_closing_hour,
        }
    }

    /// Block start times offered each day.
    #[must_use]
    pub fn block_starts(&self) -> Vec<NaiveTime> {
        (self.opening_hour..self.closing_hour)
            .step_by(PHOTOSHOOT_BLOCK_HOURS as usize)
            .filter(|hour| hour + PHOTOSHOOT_BLOCK_HOURS <= self.closing_hour)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .collect()
    }

    fn block(&self, start: NaiveTime) -> Result<Slot, BookingError> {
        let on_grid = start.minute() == 0
            && start.second() == 0
            && start.nanosecond() == 0
            && start.hour() >= self.opening_hour
            && start.hour() + PHOTOSHOOT_BLOCK_HOURS <= self.closing_hour
            && (start.hour() - self.opening_hour) % PHOTOSHOOT_BLOCK_HOURS == 0;

        if on_grid {
            Ok(Slot::Block(start))
        } else {
            Err(BookingError::InvalidSlot(format!(
                "photoshoot blocks start every {PHOTOSHOOT_BLOCK_HOURS} hours from {:02}:00 and end by {:02}:00, got {}",
                self.opening_hour,
                self.closing_hour,
                start.format("%H:%M")
            )))
        }
    }
}

impl FacilityPolicy for PhotoshootPolicy {
    fn facility_type(&self) -> FacilityType {
        FacilityType::Photoshoot
    }

    fn claims(&self, schedule: &Schedule) -> Result<Vec<SlotClaim>, BookingError> {
        let span = inclusive_span(schedule)?;

        if !schedule.details.is_empty() {
            let mut claims = Vec::with_capacity(schedule.details.len());
            for detail in &schedule.details {
                ensure_within(schedule, &span, detail.date)?;
                let start = detail
                    .start_time
                    .or(schedule.start_time)
                    .ok_or(BookingError::MissingField("start_time"))?;
                claims.push(SlotClaim::new(detail.date, self.block(start)?));
            }
            return Ok(sorted(claims));
        }

        let start = schedule
            .start_time
            .ok_or(BookingError::MissingField("start_time"))?;
        let block = self.block(start)?;
        Ok(span.days().map(|day| SlotClaim::new(day, block)).collect())
    }

    fn span(&self, schedule: &Schedule) -> Result<DateSpan, BookingError> {
        inclusive_span(schedule)
    }

    fn rate(&self, unit: &FacilityUnit, pricing: PricingType) -> Result<Decimal, BookingError> {
        member_or_guest(FacilityType::Photoshoot, &unit.rates, pricing)
    }

    fn validate_capacity(&self, _occupants: u32, _units: &[FacilityUnit]) -> Result<(), BookingError> {
        Ok(())
    }
}
