//! Price calculation.
//!
//! Total = rate × billable units, summed over every booked unit. Billable
//! units are nights for rooms, sessions for halls and lawns, blocks for the
//! studio. An explicit total supplied by the caller replaces the computed one.

use clubdesk_shared::types::UnitId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::BookingError;
use crate::facility::{FacilityPolicy, FacilityUnit, PricingType, SlotClaim};
use crate::payment::PaymentError;

/// Price of one unit within a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLine {
    /// The unit.
    pub unit_id: UnitId,
    /// Rate per billable unit.
    pub rate: Decimal,
    /// Billable units.
    pub quantity: u32,
    /// `rate × quantity`.
    pub amount: Decimal,
}

/// Result of pricing a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Sum of the lines.
    pub computed: Decimal,
    /// Final total; equals `computed` unless overridden.
    pub total: Decimal,
    /// Billable units per facility unit.
    pub billable_units: u32,
    /// Per-unit breakdown.
    pub lines: Vec<PriceLine>,
}

impl PriceQuote {
    /// Returns true when the caller replaced the computed total.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.total != self.computed
    }
}

/// Computes booking totals from unit rate tables.
pub struct PricingCalculator;

impl PricingCalculator {
    /// Prices `claims` on each of `units`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pricing type is not offered for the facility,
    /// a required rate is missing, or the override is negative.
    pub fn quote(
        policy: &dyn FacilityPolicy,
        units: &[FacilityUnit],
        pricing: PricingType,
        claims: &[SlotClaim],
        override_total: Option<Decimal>,
    ) -> Result<PriceQuote, BookingError> {
        let quantity = policy.billable_units(claims);

        let mut lines = Vec::with_capacity(units.len());
        for unit in units {
            let rate = policy.rate(unit, pricing)?;
            lines.push(PriceLine {
                unit_id: unit.id,
                rate,
                quantity,
                amount: rate * Decimal::from(quantity),
            });
        }
        let computed: Decimal = lines.iter().map(|line| line.amount).sum();

        let total = match override_total {
            Some(amount) if amount < Decimal::ZERO => {
                return Err(PaymentError::NegativeAmount(amount).into());
            }
            Some(amount) => amount,
            None => computed,
        };

        Ok(PriceQuote {
            computed,
            total,
            billable_units: quantity,
            lines,
        })
    }
}
