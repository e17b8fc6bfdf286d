//! Table layouts for report pages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use billdesk_core::{Money, Quantity};
use billdesk_products::PackUnit;

use crate::source::{ReportEntry, ReportItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// One row per line item, grouped by invoice.
    #[default]
    Normal,
    /// One row per invoice with quantities bucketed by packaging unit.
    Short,
}

impl core::str::FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ReportMode::Normal),
            "short" => Ok(ReportMode::Short),
            other => Err(format!("unknown report mode: {other}")),
        }
    }
}

/// Invoice-level columns shared by both layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceColumns {
    pub invoice_number: String,
    pub date: NaiveDateTime,
    pub customer_name: String,
    pub discount: Money,
    pub total: Money,
}

impl From<&ReportEntry> for InvoiceColumns {
    fn from(entry: &ReportEntry) -> Self {
        Self {
            invoice_number: entry.invoice_number.clone(),
            date: entry.date,
            customer_name: entry.customer_name.clone(),
            discount: entry.discount,
            total: entry.total,
        }
    }
}

/// Normal mode: the invoice columns span `row_span` item rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    pub invoice: InvoiceColumns,
    pub row_span: usize,
    /// Empty for an invoice without readable items; it still takes one row.
    pub items: Vec<ReportItem>,
}

/// Short mode row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortRow {
    pub invoice: InvoiceColumns,
    pub master: Quantity,
    pub half: Quantity,
    pub boxes: Quantity,
}

impl ShortRow {
    /// Displayed quantity: the sum of the three buckets.
    pub fn total_quantity(&self) -> Quantity {
        self.master + self.half + self.boxes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLayout {
    Normal(Vec<RowGroup>),
    Short(Vec<ShortRow>),
}

pub fn layout_page(entries: &[ReportEntry], mode: ReportMode) -> PageLayout {
    match mode {
        ReportMode::Normal => PageLayout::Normal(
            entries
                .iter()
                .map(|entry| RowGroup {
                    invoice: entry.into(),
                    row_span: entry.items.len().max(1),
                    items: entry.items.clone(),
                })
                .collect(),
        ),
        ReportMode::Short => PageLayout::Short(
            entries
                .iter()
                .map(|entry| ShortRow {
                    invoice: entry.into(),
                    master: entry.quantity_in(PackUnit::Master),
                    half: entry.quantity_in(PackUnit::Half),
                    boxes: entry.quantity_in(PackUnit::Box),
                })
                .collect(),
        ),
    }
}
