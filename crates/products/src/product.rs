use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billdesk_core::{DomainError, DomainResult, Entity, Money, ProductId, round2};

/// Price of one packaging tier.
///
/// Both the auto-derived value and an optional manual override are kept, so a
/// hand-set price can be told apart from (and reverted to) the computed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackPrice {
    derived: Money,
    manual: Option<Money>,
}

impl PackPrice {
    pub fn derived(value: Money) -> Self {
        Self {
            derived: value,
            manual: None,
        }
    }

    /// Price used for billing: the override when present, else the derived value.
    pub fn effective(&self) -> Money {
        self.manual.unwrap_or(self.derived)
    }

    pub fn derived_value(&self) -> Money {
        self.derived
    }

    pub fn manual_value(&self) -> Option<Money> {
        self.manual
    }

    pub fn is_overridden(&self) -> bool {
        self.manual.is_some()
    }
}

/// Optional purchase-side prices (what the distributor pays its supplier).
///
/// Missing fields fall back to the sale-side price of the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchasePrices {
    pub price_per_box: Option<Money>,
    pub price_per_master: Option<Money>,
    /// Dedicated price for the HALF ("Dozen") unit.
    pub price_per_dozen: Option<Money>,
}

/// Input for registering a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: Money,
    pub pieces_per_box: u32,
    pub boxes_per_master: u32,
    pub box_price_override: Option<Money>,
    pub master_price_override: Option<Money>,
    #[serde(default)]
    pub purchase: PurchasePrices,
}

/// Catalog product with multi-tier packaging prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Money,
    pieces_per_box: u32,
    boxes_per_master: u32,
    price_per_box: PackPrice,
    price_per_master: PackPrice,
    #[serde(default)]
    purchase: PurchasePrices,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        ensure_packaging(input.pieces_per_box, input.boxes_per_master)?;
        ensure_price("unit_price", input.unit_price)?;
        ensure_optional_price("box_price_override", input.box_price_override)?;
        ensure_optional_price("master_price_override", input.master_price_override)?;
        ensure_purchase_prices(&input.purchase)?;

        let mut product = Self {
            id,
            name: input.name.trim().to_string(),
            unit_price: input.unit_price,
            pieces_per_box: input.pieces_per_box,
            boxes_per_master: input.boxes_per_master,
            price_per_box: PackPrice::derived(Decimal::ZERO),
            price_per_master: PackPrice::derived(Decimal::ZERO),
            purchase: input.purchase,
        };
        product.price_per_box.manual = input.box_price_override;
        product.price_per_master.manual = input.master_price_override;
        product.rederive();
        Ok(product)
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn pieces_per_box(&self) -> u32 {
        self.pieces_per_box
    }

    pub fn boxes_per_master(&self) -> u32 {
        self.boxes_per_master
    }

    pub fn price_per_box(&self) -> &PackPrice {
        &self.price_per_box
    }

    pub fn price_per_master(&self) -> &PackPrice {
        &self.price_per_master
    }

    pub fn purchase(&self) -> &PurchasePrices {
        &self.purchase
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.name = name.trim().to_string();
        Ok(())
    }

    /// Change the per-piece price; derived tier prices follow, overrides stay.
    pub fn set_unit_price(&mut self, unit_price: Money) -> DomainResult<()> {
        ensure_price("unit_price", unit_price)?;
        self.unit_price = unit_price;
        self.rederive();
        Ok(())
    }

    pub fn set_packaging(&mut self, pieces_per_box: u32, boxes_per_master: u32) -> DomainResult<()> {
        ensure_packaging(pieces_per_box, boxes_per_master)?;
        self.pieces_per_box = pieces_per_box;
        self.boxes_per_master = boxes_per_master;
        self.rederive();
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) a manual box price.
    pub fn override_box_price(&mut self, price: Option<Money>) -> DomainResult<()> {
        ensure_optional_price("box_price_override", price)?;
        self.price_per_box.manual = price;
        self.rederive();
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) a manual master price.
    pub fn override_master_price(&mut self, price: Option<Money>) -> DomainResult<()> {
        ensure_optional_price("master_price_override", price)?;
        self.price_per_master.manual = price;
        Ok(())
    }

    pub fn set_purchase_prices(&mut self, purchase: PurchasePrices) -> DomainResult<()> {
        ensure_purchase_prices(&purchase)?;
        self.purchase = purchase;
        Ok(())
    }

    // Master is derived from the effective box price so a manual box price
    // carries through to the master tier.
    fn rederive(&mut self) {
        self.price_per_box.derived =
            round2(self.unit_price * Decimal::from(self.pieces_per_box));
        self.price_per_master.derived =
            round2(self.price_per_box.effective() * Decimal::from(self.boxes_per_master));
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn ensure_packaging(pieces_per_box: u32, boxes_per_master: u32) -> DomainResult<()> {
    if pieces_per_box == 0 {
        return Err(DomainError::validation("pieces_per_box must be at least 1"));
    }
    if boxes_per_master == 0 {
        return Err(DomainError::validation("boxes_per_master must be at least 1"));
    }
    Ok(())
}

fn ensure_price(field: &str, price: Money) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

fn ensure_optional_price(field: &str, price: Option<Money>) -> DomainResult<()> {
    match price {
        Some(p) => ensure_price(field, p),
        None => Ok(()),
    }
}

fn ensure_purchase_prices(purchase: &PurchasePrices) -> DomainResult<()> {
    ensure_optional_price("purchase.price_per_box", purchase.price_per_box)?;
    ensure_optional_price("purchase.price_per_master", purchase.price_per_master)?;
    ensure_optional_price("purchase.price_per_dozen", purchase.price_per_dozen)
}
