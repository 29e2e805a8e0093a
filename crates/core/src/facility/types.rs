//! Facility domain types.

use chrono::{NaiveDate, NaiveTime};
use clubdesk_shared::types::UnitId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four kinds of bookable facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityType {
    /// Guest room, booked per night.
    Room,
    /// Banquet hall, booked per day and session.
    Hall,
    /// Lawn, booked per day and session.
    Lawn,
    /// Photoshoot studio, booked in fixed two-hour blocks.
    Photoshoot,
}

impl FacilityType {
    /// All facility types.
    pub const ALL: [Self; 4] = [Self::Room, Self::Hall, Self::Lawn, Self::Photoshoot];

    /// Prefix used in voucher numbers.
    #[must_use]
    pub const fn voucher_prefix(self) -> &'static str {
        match self {
            Self::Room => "RB",
            Self::Hall => "HB",
            Self::Lawn => "LB",
            Self::Photoshoot => "PB",
        }
    }

    /// Lowercase name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::Hall => "hall",
            Self::Lawn => "lawn",
            Self::Photoshoot => "photoshoot",
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacilityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "room" => Ok(Self::Room),
            "hall" => Ok(Self::Hall),
            "lawn" => Ok(Self::Lawn),
            "photoshoot" => Ok(Self::Photoshoot),
            _ => Err(format!("Unknown facility type: {s}")),
        }
    }
}

/// Named session of the day for halls and lawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeSlot {
    /// Morning session.
    Morning,
    /// Evening session.
    Evening,
    /// Night session.
    Night,
}

impl TimeSlot {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Evening => "EVENING",
            Self::Night => "NIGHT",
        }
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MORNING" => Ok(Self::Morning),
            "EVENING" => Ok(Self::Evening),
            "NIGHT" => Ok(Self::Night),
            _ => Err(format!("Unknown time slot: {s}")),
        }
    }
}

/// The part of a day a claim occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// The whole day (room nights, maintenance).
    FullDay,
    /// A named hall/lawn session.
    Session(TimeSlot),
    /// A photoshoot block starting at the given time.
    Block(NaiveTime),
}

impl Slot {
    /// Returns true if two slots on the same day collide.
    ///
    /// A full day collides with everything; sessions and blocks are laid out
    /// on a fixed grid, so they collide only when equal.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        matches!(self, Self::FullDay) || matches!(other, Self::FullDay) || self == other
    }

    /// Stored key, unique per slot: `FULL_DAY`, `MORNING`, `09:00`.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::FullDay => "FULL_DAY".to_string(),
            Self::Session(slot) => slot.as_str().to_string(),
            Self::Block(start) => start.format("%H:%M").to_string(),
        }
    }

    /// Parses a stored key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        if key == "FULL_DAY" {
            return Some(Self::FullDay);
        }
        if let Ok(session) = key.parse::<TimeSlot>() {
            return Some(Self::Session(session));
        }
        NaiveTime::parse_from_str(key, "%H:%M").ok().map(Self::Block)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// One (day, slot) cell a booking occupies on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotClaim {
    /// Calendar day.
    pub date: NaiveDate,
    /// Part of the day.
    pub slot: Slot,
}

impl SlotClaim {
    /// Creates a claim.
    #[must_use]
    pub const fn new(date: NaiveDate, slot: Slot) -> Self {
        Self { date, slot }
    }

    /// Returns true if the two claims collide.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date && self.slot.overlaps(&other.slot)
    }
}

/// Rate tier selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricingType {
    /// Member rate.
    Member,
    /// Guest rate.
    Guest,
    /// Forces rate.
    Forces,
    /// Forces rate, serving officer staying themself.
    ForcesSelf,
    /// Forces rate, guest of a serving officer.
    ForcesGuest,
    /// Corporate rate (halls).
    Corporate,
}

impl PricingType {
    /// Returns true when the booking is for a guest and guest details are required.
    #[must_use]
    pub const fn is_guest(self) -> bool {
        matches!(self, Self::Guest | Self::ForcesGuest)
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Guest => "guest",
            Self::Forces => "forces",
            Self::ForcesSelf => "forces-self",
            Self::ForcesGuest => "forces-guest",
            Self::Corporate => "corporate",
        }
    }
}

impl std::fmt::Display for PricingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PricingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "guest" => Ok(Self::Guest),
            "forces" => Ok(Self::Forces),
            "forces-self" => Ok(Self::ForcesSelf),
            "forces-guest" => Ok(Self::ForcesGuest),
            "corporate" => Ok(Self::Corporate),
            _ => Err(format!("Unknown pricing type: {s}")),
        }
    }
}

/// Rate table of a facility unit, per billable unit (night, session, block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    /// Member rate.
    pub member: Decimal,
    /// Guest rate.
    pub guest: Decimal,
    /// Forces rate, when the unit offers one.
    pub forces: Option<Decimal>,
    /// Corporate rate, when the unit offers one.
    pub corporate: Option<Decimal>,
}

/// A bookable facility unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityUnit {
    /// Unit ID.
    pub id: UnitId,
    /// Which kind of facility this is.
    pub facility_type: FacilityType,
    /// Display name (room number, hall name).
    pub name: String,
    /// Rate table.
    pub rates: Rates,
    /// Maximum guests, when limited.
    pub capacity: Option<u32>,
    /// Inactive units cannot be booked.
    pub is_active: bool,
    /// Occupancy flag: a current booking covers today.
    pub is_booked: bool,
}

/// Requested dates and slots, already normalized to calendar days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Check-in / booking date.
    pub start: NaiveDate,
    /// Check-out / end date.
    pub end: NaiveDate,
    /// Session for every day of the range (halls, lawns).
    pub time_slot: Option<TimeSlot>,
    /// Block start for every day of the range (photoshoots).
    pub start_time: Option<NaiveTime>,
    /// Granular per-day slot list; takes precedence over the range.
    pub details: Vec<ScheduleDetail>,
}

/// One entry of a granular slot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDetail {
    /// Calendar day.
    pub date: NaiveDate,
    /// Session, for halls and lawns.
    pub time_slot: Option<TimeSlot>,
    /// Block start, for photoshoots.
    pub start_time: Option<NaiveTime>,
}
