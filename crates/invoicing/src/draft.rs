//! Invoice draft: the editable invoice behind the billing form.
//!
//! Every mutator recomputes the touched line before returning, so `totals()`
//! always reads settled line amounts. There is no deferred recalculation.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use billdesk_core::{DomainError, DomainResult, InvoiceId, Money, ProductId, Quantity};
use billdesk_parties::Customer;
use billdesk_products::{PackUnit, PriceSide, Product};

use crate::invoice::Invoice;
use crate::line_item::{LineItem, price_line};
use crate::status::InvoiceStatus;
use crate::totals::{AdjustmentInputs, InvoiceTotals, LineFigures, aggregate};

/// One editable line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    product: Option<Product>,
    description: String,
    unit: PackUnit,
    quantity: Quantity,
    rate: Money,
    amount: Money,
}

impl DraftLine {
    fn manual(description: impl Into<String>) -> Self {
        Self {
            product: None,
            description: description.into(),
            unit: PackUnit::default(),
            quantity: Decimal::ONE,
            rate: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.product.is_some()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> PackUnit {
        self.unit
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn rate(&self) -> Money {
        self.rate
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    fn recalculate(&mut self, side: PriceSide) -> DomainResult<()> {
        let priced = price_line(self.product.as_ref(), self.unit, self.quantity, self.rate, side)?;
        self.rate = priced.rate;
        self.amount = priced.amount;
        Ok(())
    }

    fn to_line_item(&self) -> LineItem {
        LineItem {
            product_id: self.product.as_ref().map(Product::id_typed),
            description: self.description.clone(),
            unit: self.unit,
            quantity: self.quantity,
            rate: self.rate,
            amount: self.amount,
        }
    }
}

impl LineFigures for DraftLine {
    fn quantity(&self) -> Quantity {
        self.quantity
    }

    fn amount(&self) -> Money {
        self.amount
    }
}

/// Identity carried over when an existing invoice is reopened for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reopened {
    id: InvoiceId,
    invoice_number: String,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvoiceDraft {
    side: PriceSide,
    customer: Option<Customer>,
    lines: Vec<DraftLine>,
    discount_input: Money,
    previous_balance_input: Money,
    reopened: Option<Reopened>,
}

impl InvoiceDraft {
    pub fn new(side: PriceSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    /// Reopen a stored invoice for full-replacement editing.
    ///
    /// Lines whose product still resolves are re-bound and re-priced from the
    /// current catalog; the rest become manual lines at their stored rate.
    pub fn from_invoice(
        invoice: &Invoice,
        customer: Customer,
        mut resolve: impl FnMut(ProductId) -> Option<Product>,
    ) -> DomainResult<Self> {
        let mut draft = Self::new(PriceSide::Sale);
        draft.customer = Some(customer);
        draft.discount_input = invoice.discount_amount();
        draft.previous_balance_input = invoice.previous_balance();
        draft.reopened = Some(Reopened {
            id: invoice.id_typed(),
            invoice_number: invoice.invoice_number().to_string(),
            status: invoice.status(),
            created_at: invoice.created_at(),
        });

        for item in invoice.items() {
            let product = item.product_id.and_then(&mut resolve);
            draft.lines.push(DraftLine {
                product,
                description: item.description.clone(),
                unit: item.unit,
                quantity: item.quantity,
                rate: item.rate,
                amount: item.amount,
            });
        }
        draft.recalculate_all()?;
        Ok(draft)
    }

    pub fn side(&self) -> PriceSide {
        self.side
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Id of the invoice being edited, if this draft was reopened.
    pub fn editing(&self) -> Option<InvoiceId> {
        self.reopened.as_ref().map(|r| r.id)
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.reopened.as_ref().map(|r| r.invoice_number.as_str())
    }

    /// Select the billed customer; their ledger balance becomes the default carry-forward.
    pub fn select_customer(&mut self, customer: Customer) {
        self.previous_balance_input = customer.previous_balance();
        self.customer = Some(customer);
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> DomainResult<&DraftLine> {
        self.lines
            .get(index)
            .ok_or_else(|| DomainError::validation(format!("line {index} does not exist")))
    }

    pub fn add_line(&mut self, description: impl Into<String>) -> usize {
        self.lines.push(DraftLine::manual(description));
        self.lines.len() - 1
    }

    pub fn add_product_line(&mut self, product: Product, unit: PackUnit) -> DomainResult<usize> {
        let mut line = DraftLine::manual(product.name());
        line.product = Some(product);
        line.unit = unit;
        line.recalculate(self.side)?;
        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    pub fn remove_line(&mut self, index: usize) -> DomainResult<DraftLine> {
        self.line(index)?;
        Ok(self.lines.remove(index))
    }

    /// Bind (`Some`) or unbind (`None`) a catalog product. Quantity is kept.
    pub fn set_product(&mut self, index: usize, product: Option<Product>) -> DomainResult<()> {
        self.mutate_line(index, |line| {
            if let Some(product) = &product {
                line.description = product.name().to_string();
            }
            line.product = product;
            Ok(())
        })
    }

    /// Change the packaging unit. Quantity resets to 1 and the rate is re-derived.
    pub fn set_unit(&mut self, index: usize, unit: PackUnit) -> DomainResult<()> {
        self.mutate_line(index, |line| {
            line.unit = unit;
            line.quantity = Decimal::ONE;
            Ok(())
        })
    }

    pub fn set_quantity(&mut self, index: usize, quantity: Quantity) -> DomainResult<()> {
        self.mutate_line(index, |line| {
            line.quantity = quantity;
            Ok(())
        })
    }

    /// Set the rate of a manual line. Bound lines take their rate from the product.
    pub fn set_rate(&mut self, index: usize, rate: Money) -> DomainResult<()> {
        self.mutate_line(index, |line| {
            if line.is_bound() {
                return Err(DomainError::invariant(
                    "rate of a product line is set by its product and unit",
                ));
            }
            line.rate = rate;
            Ok(())
        })
    }

    pub fn set_description(&mut self, index: usize, description: impl Into<String>) -> DomainResult<()> {
        let description = description.into();
        self.mutate_line(index, |line| {
            line.description = description;
            Ok(())
        })
    }

    /// Raw discount input; clamped when totals are computed.
    pub fn set_discount(&mut self, discount: Money) {
        self.discount_input = discount;
    }

    /// Raw carry-forward input; clamped to the customer's ledger balance.
    pub fn set_previous_balance(&mut self, previous_balance: Money) {
        self.previous_balance_input = previous_balance;
    }

    pub fn recalculate_line(&mut self, index: usize) -> DomainResult<()> {
        self.mutate_line(index, |_| Ok(()))
    }

    pub fn recalculate_all(&mut self) -> DomainResult<()> {
        for index in 0..self.lines.len() {
            self.recalculate_line(index)?;
        }
        Ok(())
    }

    pub fn totals(&self) -> InvoiceTotals {
        aggregate(
            &self.lines,
            AdjustmentInputs {
                discount: self.discount_input,
                previous_balance: self.previous_balance_input,
                ledger_balance: self
                    .customer
                    .as_ref()
                    .map(Customer::previous_balance)
                    .unwrap_or(Decimal::ZERO),
            },
        )
    }

    /// Build the invoice record to save.
    ///
    /// The customer is snapshotted now; a reopened draft keeps its id, number,
    /// status and creation time, so the result is a full replacement record.
    pub fn finalize(
        &self,
        invoice_number: impl Into<String>,
        date: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> DomainResult<Invoice> {
        let customer = self
            .customer
            .as_ref()
            .ok_or_else(|| DomainError::validation("invoice requires a customer"))?;
        if self.lines.is_empty() {
            return Err(DomainError::validation("cannot save invoice without lines"));
        }

        let (id, number, status, created_at) = match &self.reopened {
            Some(r) => (r.id, r.invoice_number.clone(), r.status, r.created_at),
            None => {
                let number = invoice_number.into();
                if number.trim().is_empty() {
                    return Err(DomainError::validation("invoice number cannot be empty"));
                }
                (InvoiceId::new(), number, InvoiceStatus::Pending, now)
            }
        };

        Ok(Invoice::from_parts(
            id,
            number,
            date,
            customer.snapshot(),
            self.lines.iter().map(DraftLine::to_line_item).collect(),
            self.totals(),
            status,
            created_at,
        ))
    }

    // Apply a change to a copy of the line, re-price it, then commit. A failed
    // change leaves the draft untouched.
    fn mutate_line(
        &mut self,
        index: usize,
        change: impl FnOnce(&mut DraftLine) -> DomainResult<()>,
    ) -> DomainResult<()> {
        let mut line = self.line(index)?.clone();
        change(&mut line)?;
        line.recalculate(self.side)?;
        self.lines[index] = line;
        Ok(())
    }
}
