//! Line item pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billdesk_core::{DomainError, DomainResult, Money, ProductId, Quantity, round2};
use billdesk_products::{PackUnit, PriceSide, Product, unit_rate};

use crate::totals::LineFigures;

/// Invoice line as stored with the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product the line was priced from; `None` for manual entries.
    pub product_id: Option<ProductId>,
    /// Product name at save time, or the manual description.
    pub description: String,
    pub unit: PackUnit,
    pub quantity: Quantity,
    pub rate: Money,
    pub amount: Money,
}

impl LineFigures for LineItem {
    fn quantity(&self) -> Quantity {
        self.quantity
    }

    fn amount(&self) -> Money {
        self.amount
    }
}

/// Rate and amount computed for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePricing {
    pub rate: Money,
    pub amount: Money,
}

/// Price a single line.
///
/// With a bound product the rate comes from the packaging table and
/// `free_rate` is ignored; without one, `free_rate` is the rate. The amount is
/// always `round2(quantity × rate)`.
pub fn price_line(
    product: Option<&Product>,
    unit: PackUnit,
    quantity: Quantity,
    free_rate: Money,
    side: PriceSide,
) -> DomainResult<LinePricing> {
    if quantity < Decimal::ZERO {
        return Err(DomainError::validation("quantity cannot be negative"));
    }

    let rate = match product {
        Some(product) => unit_rate(product, unit, side),
        None => {
            if free_rate < Decimal::ZERO {
                return Err(DomainError::validation("rate cannot be negative"));
            }
            free_rate
        }
    };

    Ok(LinePricing {
        rate,
        amount: round2(quantity * rate),
    })
}
