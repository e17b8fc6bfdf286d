//! Packaging units and the unit → rate pricing table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billdesk_core::{Money, round2};

use crate::product::Product;

/// Packaging tier a line item is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackUnit {
    #[default]
    Master,
    Box,
    /// Priced at half a master; shown as "Dozen" on screens and reports.
    Half,
}

impl PackUnit {
    pub const ALL: [PackUnit; 3] = [PackUnit::Master, PackUnit::Box, PackUnit::Half];

    /// Display label used on invoices and reports.
    pub fn label(self) -> &'static str {
        match self {
            PackUnit::Master => "Master",
            PackUnit::Box => "Box",
            PackUnit::Half => "Dozen",
        }
    }
}

impl core::fmt::Display for PackUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the trade a line is priced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSide {
    #[default]
    Sale,
    Purchase,
}

/// Where a unit's rate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceSource {
    Master,
    Box,
    HalfMaster,
    /// Purchase per-dozen price, else half of the purchase (or sale) master.
    DozenOrHalfMaster,
}

// Adding a packaging unit means one new row per side here.
const SALE_PRICING: [(PackUnit, PriceSource); 3] = [
    (PackUnit::Master, PriceSource::Master),
    (PackUnit::Box, PriceSource::Box),
    (PackUnit::Half, PriceSource::HalfMaster),
];

const PURCHASE_PRICING: [(PackUnit, PriceSource); 3] = [
    (PackUnit::Master, PriceSource::Master),
    (PackUnit::Box, PriceSource::Box),
    (PackUnit::Half, PriceSource::DozenOrHalfMaster),
];

fn source_for(unit: PackUnit, side: PriceSide) -> PriceSource {
    let table = match side {
        PriceSide::Sale => &SALE_PRICING,
        PriceSide::Purchase => &PURCHASE_PRICING,
    };
    table
        .iter()
        .find(|(u, _)| *u == unit)
        .map(|(_, source)| *source)
        .unwrap_or(PriceSource::Master)
}

fn master_price(product: &Product, side: PriceSide) -> Money {
    let sale = product.price_per_master().effective();
    match side {
        PriceSide::Sale => sale,
        PriceSide::Purchase => product.purchase().price_per_master.unwrap_or(sale),
    }
}

fn box_price(product: &Product, side: PriceSide) -> Money {
    let sale = product.price_per_box().effective();
    match side {
        PriceSide::Sale => sale,
        PriceSide::Purchase => product.purchase().price_per_box.unwrap_or(sale),
    }
}

fn half_of(value: Money) -> Money {
    round2(value / Decimal::TWO)
}

/// Rate for one `unit` of `product` on the given side of the trade.
pub fn unit_rate(product: &Product, unit: PackUnit, side: PriceSide) -> Money {
    match source_for(unit, side) {
        PriceSource::Master => master_price(product, side),
        PriceSource::Box => box_price(product, side),
        PriceSource::HalfMaster => half_of(master_price(product, side)),
        PriceSource::DozenOrHalfMaster => product
            .purchase()
            .price_per_dozen
            .unwrap_or_else(|| half_of(master_price(product, side))),
    }
}
