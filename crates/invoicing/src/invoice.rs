use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use billdesk_core::{CustomerId, DomainResult, Entity, InvoiceId, Money, Quantity, round2};
use billdesk_parties::CustomerSnapshot;

use crate::line_item::LineItem;
use crate::status::{InvoiceStatus, StatusTransition, plan_transition};
use crate::totals::InvoiceTotals;

/// Stored invoice record.
///
/// Built once from a finalized draft and afterwards only replaced as a whole
/// (edit) or re-issued with a new status. Money fields are the rounded figures
/// computed at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    date: NaiveDateTime,
    customer: CustomerSnapshot,
    items: Vec<LineItem>,
    discount_amount: Money,
    sub_total: Money,
    total: Money,
    total_quantity: Quantity,
    amount_in_words: String,
    previous_balance: Money,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
}

impl Invoice {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: InvoiceId,
        invoice_number: String,
        date: NaiveDateTime,
        customer: CustomerSnapshot,
        items: Vec<LineItem>,
        totals: InvoiceTotals,
        status: InvoiceStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_number,
            date,
            customer,
            items,
            discount_amount: totals.discount,
            sub_total: totals.sub_total,
            total: totals.total,
            total_quantity: totals.total_quantity,
            amount_in_words: totals.amount_in_words,
            previous_balance: totals.previous_balance,
            status,
            created_at,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer.customer_id
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
    }

    pub fn sub_total(&self) -> Money {
        self.sub_total
    }

    /// Sub total less discount (the part of `total` billed on this invoice).
    pub fn invoice_total(&self) -> Money {
        round2(self.sub_total - self.discount_amount)
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn amount_in_words(&self) -> &str {
        &self.amount_in_words
    }

    /// Carried-forward balance applied on this invoice.
    pub fn previous_balance(&self) -> Money {
        self.previous_balance
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Plan a status change and build the full replacement record for it.
    ///
    /// Returns `None` as the record when the invoice is already in `status`.
    pub fn with_status(&self, status: InvoiceStatus) -> DomainResult<(StatusTransition, Option<Invoice>)> {
        let transition = plan_transition(self.status, status)?;
        let record = match transition {
            StatusTransition::Unchanged(_) => None,
            StatusTransition::Change { to, .. } => Some(Invoice {
                status: to,
                ..self.clone()
            }),
        };
        Ok((transition, record))
    }

    /// Take status and creation time from the stored copy of this invoice.
    ///
    /// Saving an edit replaces content only; the lifecycle stays whatever
    /// storage holds, however long ago the edit was opened.
    pub fn with_lifecycle_of(self, stored: &Invoice) -> Invoice {
        Invoice {
            status: stored.status,
            created_at: stored.created_at,
            ..self
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Generates human-facing invoice numbers (`INV-00001`, `INV-00002`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumberSequence {
    prefix: String,
    width: usize,
}

impl InvoiceNumberSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            width: 5,
        }
    }

    pub fn format(&self, n: u64) -> String {
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }

    /// Next number after the highest one already issued with this prefix.
    ///
    /// Numbers with a different prefix or a non-numeric suffix are ignored.
    pub fn next_after<'a>(&self, existing: impl IntoIterator<Item = &'a str>) -> String {
        let highest = existing
            .into_iter()
            .filter_map(|number| number.strip_prefix(self.prefix.as_str()))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.format(highest + 1)
    }
}

impl Default for InvoiceNumberSequence {
    fn default() -> Self {
        Self::new("INV-")
    }
}
