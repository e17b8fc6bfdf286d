//! Product catalog domain module.
//!
//! Products carry a per-piece price and two packaging tiers (box, master)
//! whose prices are derived from it unless overridden by hand. The pricing
//! table that maps a packaging unit to a rate lives in [`pricing`].
//! Pure domain logic only: no IO, no persistence.

pub mod pricing;
pub mod product;

pub use pricing::{PackUnit, PriceSide, unit_rate};
pub use product::{NewProduct, PackPrice, Product, PurchasePrices};
