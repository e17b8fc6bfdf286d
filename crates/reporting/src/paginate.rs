//! Report pagination.
//!
//! The filtered set is split into fixed-size pages in its incoming order.
//! Grand totals are computed once over the whole filtered set and attached
//! to the last page only.

use chrono::NaiveDate;
use serde::Serialize;

use billdesk_core::{Money, Quantity};

use crate::filter::DateFilter;
use crate::layout::{PageLayout, ReportMode, layout_page};
use crate::source::ReportEntry;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Grand totals over the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportSummary {
    pub total_invoices: usize,
    pub total_amount: Money,
    pub total_quantity: Quantity,
    pub total_discount: Money,
}

/// Per-page sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageSubtotal {
    pub amount: Money,
    pub quantity: Quantity,
    pub discount: Money,
}

impl PageSubtotal {
    fn of(entries: &[ReportEntry]) -> Self {
        entries.iter().fold(Self::default(), |acc, e| Self {
            amount: acc.amount + e.total,
            quantity: acc.quantity + e.quantity(),
            discount: acc.discount + e.discount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    /// 1-based.
    pub number: usize,
    pub entries: Vec<ReportEntry>,
    pub layout: PageLayout,
    pub subtotal: PageSubtotal,
    /// Present on the last page only.
    pub summary: Option<ReportSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedReport {
    pub filter: DateFilter,
    pub as_of: NaiveDate,
    pub mode: ReportMode,
    pub pages: Vec<ReportPage>,
    pub summary: ReportSummary,
}

impl PaginatedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn record_count(&self) -> usize {
        self.summary.total_invoices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPaginator {
    page_size: usize,
}

impl Default for ReportPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ReportPaginator {
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn paginate(
        &self,
        entries: impl IntoIterator<Item = ReportEntry>,
        filter: DateFilter,
        as_of: NaiveDate,
        mode: ReportMode,
    ) -> PaginatedReport {
        let filtered = filter.apply(as_of, entries, |e| e.date);

        let summary = ReportSummary {
            total_invoices: filtered.len(),
            total_amount: filtered.iter().map(|e| e.total).sum(),
            total_quantity: filtered.iter().map(ReportEntry::quantity).sum(),
            total_discount: filtered.iter().map(|e| e.discount).sum(),
        };

        let mut pages: Vec<ReportPage> = filtered
            .chunks(self.page_size)
            .enumerate()
            .map(|(i, chunk)| ReportPage {
                number: i + 1,
                entries: chunk.to_vec(),
                layout: layout_page(chunk, mode),
                subtotal: PageSubtotal::of(chunk),
                summary: None,
            })
            .collect();

        if pages.is_empty() {
            pages.push(ReportPage {
                number: 1,
                entries: Vec::new(),
                layout: layout_page(&[], mode),
                subtotal: PageSubtotal::default(),
                summary: None,
            });
        }
        if let Some(last) = pages.last_mut() {
            last.summary = Some(summary);
        }

        tracing::debug!(
            records = summary.total_invoices,
            pages = pages.len(),
            mode = ?mode,
            "report paginated"
        );

        PaginatedReport {
            filter,
            as_of,
            mode,
            pages,
            summary,
        }
    }
}
