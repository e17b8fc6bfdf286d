//! Invoice totals.
//!
//! Every figure is rounded with `round2` at the step that produces it, in this
//! order: sub total, discount, invoice total, previous balance, grand total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billdesk_core::{Clamped, Money, Quantity, ValueObject, clamp_non_negative, round2};

use crate::words::amount_in_words;

/// Figures the aggregator needs from a line.
pub trait LineFigures {
    fn quantity(&self) -> Quantity;
    fn amount(&self) -> Money;
}

/// Raw user inputs that adjust an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjustmentInputs {
    pub discount: Money,
    pub previous_balance: Money,
    /// Live ledger balance of the selected customer; caps `previous_balance`.
    pub ledger_balance: Money,
}

/// A user input that had to be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillingWarning {
    DiscountClamped { requested: Money, applied: Money },
    PreviousBalanceClamped { requested: Money, applied: Money },
}

impl core::fmt::Display for BillingWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BillingWarning::DiscountClamped { requested, applied } => write!(
                f,
                "discount {requested} is outside 0..sub total; {applied} applied"
            ),
            BillingWarning::PreviousBalanceClamped { requested, applied } => write!(
                f,
                "previous balance {requested} is outside 0..customer balance; {applied} applied"
            ),
        }
    }
}

/// Computed invoice money fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub sub_total: Money,
    pub discount: Money,
    /// Sub total less discount, before the carried balance.
    pub invoice_total: Money,
    pub previous_balance: Money,
    pub total: Money,
    pub total_quantity: Quantity,
    pub amount_in_words: String,
    pub warnings: Vec<BillingWarning>,
}

impl ValueObject for InvoiceTotals {}

/// Fold lines and adjustments into invoice totals.
///
/// Out-of-range discount and previous-balance inputs are clamped and reported
/// in `warnings`; they never fail the calculation.
pub fn aggregate<L: LineFigures>(lines: &[L], inputs: AdjustmentInputs) -> InvoiceTotals {
    let mut warnings = Vec::new();

    let sub_total = round2(lines.iter().map(LineFigures::amount).sum::<Decimal>());

    let discount = Clamped::within(inputs.discount, Decimal::ZERO, sub_total);
    if discount.was_adjusted() {
        warnings.push(BillingWarning::DiscountClamped {
            requested: discount.requested,
            applied: round2(discount.value),
        });
    }
    let discount = round2(discount.value);

    let invoice_total = round2(sub_total - discount);

    // A customer in credit (negative ledger) has nothing to carry forward.
    let previous_balance = Clamped::within(
        inputs.previous_balance,
        Decimal::ZERO,
        clamp_non_negative(inputs.ledger_balance),
    );
    if previous_balance.was_adjusted() {
        warnings.push(BillingWarning::PreviousBalanceClamped {
            requested: previous_balance.requested,
            applied: round2(previous_balance.value),
        });
    }
    let previous_balance = round2(previous_balance.value);

    let total = round2(invoice_total + previous_balance);
    let total_quantity = lines.iter().map(LineFigures::quantity).sum::<Decimal>();

    InvoiceTotals {
        sub_total,
        discount,
        invoice_total,
        previous_balance,
        total,
        total_quantity,
        amount_in_words: amount_in_words(total),
        warnings,
    }
}
