//! Report input records.
//!
//! Reports read a flattened view of each invoice. Stored records that come
//! back malformed (missing or unreadable items) still produce an entry, with
//! zero items and a zero amount, so one bad record never blocks a report.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use billdesk_core::{Money, Quantity};
use billdesk_invoicing::{Invoice, InvoiceStatus, LineItem};
use billdesk_products::PackUnit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub description: String,
    pub unit: PackUnit,
    pub quantity: Quantity,
    pub rate: Money,
    pub amount: Money,
}

impl From<&LineItem> for ReportItem {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            unit: item.unit,
            quantity: item.quantity,
            rate: item.rate,
            amount: item.amount,
        }
    }
}

/// One invoice as seen by reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub invoice_number: String,
    pub date: NaiveDateTime,
    pub customer_code: String,
    pub customer_name: String,
    pub items: Vec<ReportItem>,
    pub discount: Money,
    /// Grand total of the invoice (carried balance included).
    pub total: Money,
    pub status: InvoiceStatus,
}

impl ReportEntry {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            invoice_number: invoice.invoice_number().to_string(),
            date: invoice.date(),
            customer_code: invoice.customer().code.clone(),
            customer_name: invoice.customer().name.clone(),
            items: invoice.items().iter().map(ReportItem::from).collect(),
            discount: invoice.discount_amount(),
            total: invoice.total(),
            status: invoice.status(),
        }
    }

    /// Read a stored invoice record leniently.
    ///
    /// Returns `None` only when the record has no readable date, since such a
    /// record cannot be placed in any date window.
    pub fn from_record(record: &Value) -> Option<Self> {
        if let Ok(invoice) = serde_json::from_value::<Invoice>(record.clone()) {
            return Some(Self::from_invoice(&invoice));
        }

        let invoice_number = text(record, "invoice_number").unwrap_or_default();
        let Some(date) = text(record, "date").and_then(|d| d.parse::<NaiveDateTime>().ok()) else {
            tracing::warn!(invoice_number = %invoice_number, "skipping invoice record without a readable date");
            return None;
        };

        let customer = record.get("customer").unwrap_or(&Value::Null);
        let items = record
            .get("items")
            .cloned()
            .map(serde_json::from_value::<Vec<LineItem>>);

        let (items, total) = match items {
            Some(Ok(items)) => {
                let total = money(record, "total").unwrap_or_else(|| items.iter().map(|i| i.amount).sum());
                (items.iter().map(ReportItem::from).collect(), total)
            }
            Some(Err(err)) => {
                tracing::warn!(invoice_number = %invoice_number, error = %err, "invoice items unreadable; reporting as empty");
                (Vec::new(), Decimal::ZERO)
            }
            None => {
                tracing::warn!(invoice_number = %invoice_number, "invoice record has no items; reporting as empty");
                (Vec::new(), Decimal::ZERO)
            }
        };

        Some(Self {
            invoice_number,
            date,
            customer_code: text(customer, "code").unwrap_or_default(),
            customer_name: text(customer, "name").unwrap_or_default(),
            items,
            discount: money(record, "discount_amount").unwrap_or_default(),
            total,
            status: record
                .get("status")
                .cloned()
                .and_then(|s| serde_json::from_value(s).ok())
                .unwrap_or_default(),
        })
    }

    /// Sum of item quantities, whatever their unit.
    pub fn quantity(&self) -> Quantity {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Quantity booked in one packaging unit.
    pub fn quantity_in(&self, unit: PackUnit) -> Quantity {
        self.items
            .iter()
            .filter(|i| i.unit == unit)
            .map(|i| i.quantity)
            .sum()
    }
}

/// Entries for a batch of raw records, dropping only undatable ones.
pub fn entries_from_records(records: &[Value]) -> Vec<ReportEntry> {
    records.iter().filter_map(ReportEntry::from_record).collect()
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

fn money(value: &Value, key: &str) -> Option<Money> {
    serde_json::from_value(value.get(key)?.clone()).ok()
}
