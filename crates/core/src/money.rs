//! Money arithmetic helpers.
//!
//! Billing amounts are `rust_decimal::Decimal` values. Every intermediate
//! invoice figure is rounded with [`round2`] (half away from zero) at the step
//! that produces it, so totals never depend on where a caller chose to round.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount in the shop's single currency.
pub type Money = Decimal;

/// Line quantity (counted in the line's packaging unit).
pub type Quantity = Decimal;

/// Decimal places kept for every stored money figure.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round to 2 decimal places, half away from zero (2.345 → 2.35, -2.345 → -2.35).
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Floor negative values at zero.
#[inline]
pub fn clamp_non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Result of clamping a user input into an allowed range.
///
/// Keeps the requested value next to the applied one so callers can report
/// the correction instead of silently dropping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub requested: Decimal,
    pub value: Decimal,
}

impl Clamped {
    /// Clamp `requested` into `[lower, upper]`.
    ///
    /// An inverted range (upper below lower) collapses to `lower`.
    pub fn within(requested: Decimal, lower: Decimal, upper: Decimal) -> Self {
        let upper = upper.max(lower);
        Self {
            requested,
            value: requested.max(lower).min(upper),
        }
    }

    pub fn was_adjusted(&self) -> bool {
        self.value != self.requested
    }
}
