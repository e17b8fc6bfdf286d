//! HTML report document.
//!
//! The output is a single self-contained document. Each page carries its own
//! header block and table; pages are separated by page-break markers so the
//! print engine starts each one on a new sheet. Markup lives in
//! `templates/report.html`; askama escapes every interpolated value.

use askama::Template;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billdesk_core::{Money, Quantity};

use crate::error::ReportResult;
use crate::layout::{InvoiceColumns, PageLayout, RowGroup, ShortRow};
use crate::paginate::{PaginatedReport, ReportPage, ReportSummary};
use crate::source::ReportItem;

pub const PAGE_BREAK: &str = r#"<div class="page-break"></div>"#;

/// Visual settings for printed reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportTheme {
    pub font_family: String,
    pub font_size_px: u32,
    pub accent_color: String,
    pub border_color: String,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size_px: 12,
            accent_color: "#1f2937".to_string(),
            border_color: "#d1d5db".to_string(),
        }
    }
}

/// Everything the renderer needs besides the report itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub organization_name: String,
    pub label: String,
    pub generated_on: NaiveDate,
    pub theme: ReportTheme,
}

/// A rendered report ready to print or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub html: String,
    pub page_count: usize,
    pub record_count: usize,
    pub summary: ReportSummary,
}

pub fn render_document(report: &PaginatedReport, ctx: &ReportContext) -> ReportResult<ReportDocument> {
    Ok(ReportDocument {
        title: title(ctx),
        html: render_html(report, ctx)?,
        page_count: report.page_count(),
        record_count: report.record_count(),
        summary: report.summary,
    })
}

/// Render the report through the `report.html` template. All text is escaped.
pub fn render_html(report: &PaginatedReport, ctx: &ReportContext) -> ReportResult<String> {
    let template = ReportTemplate {
        title: title(ctx),
        organization_name: &ctx.organization_name,
        label: &ctx.label,
        generated_on: ctx.generated_on.format("%d %b %Y").to_string(),
        theme: &ctx.theme,
        heading_size_px: ctx.theme.font_size_px + 6,
        total_pages: report.page_count(),
        record_count: report.record_count(),
        page_break: PAGE_BREAK,
        pages: report.pages.iter().map(PageView::from).collect(),
    };
    Ok(template.render()?)
}

fn title(ctx: &ReportContext) -> String {
    format!("{} - {}", ctx.organization_name, ctx.label)
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: String,
    organization_name: &'a str,
    label: &'a str,
    generated_on: String,
    theme: &'a ReportTheme,
    heading_size_px: u32,
    total_pages: usize,
    record_count: usize,
    page_break: &'static str,
    pages: Vec<PageView>,
}

struct PageView {
    number: usize,
    short: bool,
    groups: Vec<GroupView>,
    short_rows: Vec<ShortRowView>,
    subtotal: SubtotalView,
    summary: Option<SummaryView>,
}

impl From<&ReportPage> for PageView {
    fn from(page: &ReportPage) -> Self {
        let (short, groups, short_rows) = match &page.layout {
            PageLayout::Normal(groups) => (false, groups.iter().map(GroupView::from).collect(), Vec::new()),
            PageLayout::Short(rows) => (true, Vec::new(), rows.iter().map(ShortRowView::from).collect()),
        };
        Self {
            number: page.number,
            short,
            groups,
            short_rows,
            subtotal: SubtotalView {
                amount: money(page.subtotal.amount),
                quantity: quantity(page.subtotal.quantity),
                discount: money(page.subtotal.discount),
            },
            summary: page.summary.as_ref().map(SummaryView::from),
        }
    }
}

/// Invoice cells, formatted for display.
struct InvoiceView {
    number: String,
    date: String,
    customer: String,
    discount: String,
    total: String,
}

impl From<&InvoiceColumns> for InvoiceView {
    fn from(columns: &InvoiceColumns) -> Self {
        Self {
            number: columns.invoice_number.clone(),
            date: columns.date.format("%d/%m/%Y").to_string(),
            customer: columns.customer_name.clone(),
            discount: money(columns.discount),
            total: money(columns.total),
        }
    }
}

struct GroupView {
    invoice: InvoiceView,
    span: usize,
    items: Vec<ItemView>,
}

impl From<&RowGroup> for GroupView {
    fn from(group: &RowGroup) -> Self {
        Self {
            invoice: (&group.invoice).into(),
            span: group.row_span,
            items: group.items.iter().map(ItemView::from).collect(),
        }
    }
}

struct ItemView {
    description: String,
    unit: &'static str,
    quantity: String,
    rate: String,
    amount: String,
}

impl From<&ReportItem> for ItemView {
    fn from(item: &ReportItem) -> Self {
        Self {
            description: item.description.clone(),
            unit: item.unit.label(),
            quantity: quantity(item.quantity),
            rate: money(item.rate),
            amount: money(item.amount),
        }
    }
}

struct ShortRowView {
    invoice: InvoiceView,
    master: String,
    half: String,
    boxes: String,
    quantity: String,
}

impl From<&ShortRow> for ShortRowView {
    fn from(row: &ShortRow) -> Self {
        Self {
            invoice: (&row.invoice).into(),
            master: quantity(row.master),
            half: quantity(row.half),
            boxes: quantity(row.boxes),
            quantity: quantity(row.total_quantity()),
        }
    }
}

struct SubtotalView {
    amount: String,
    quantity: String,
    discount: String,
}

struct SummaryView {
    invoices: usize,
    amount: String,
    quantity: String,
    discount: String,
}

impl From<&ReportSummary> for SummaryView {
    fn from(summary: &ReportSummary) -> Self {
        Self {
            invoices: summary.total_invoices,
            amount: money(summary.total_amount),
            quantity: quantity(summary.total_quantity),
            discount: money(summary.total_discount),
        }
    }
}

fn money(value: Money) -> String {
    format!("{:.2}", value)
}

fn quantity(value: Quantity) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateFilter;
    use crate::layout::ReportMode;
    use crate::paginate::ReportPaginator;
    use crate::source::{ReportEntry, ReportItem};
    use billdesk_invoicing::InvoiceStatus;
    use billdesk_products::PackUnit;
    use rust_decimal_macros::dec;

    fn ctx() -> ReportContext {
        ReportContext {
            organization_name: "Sweet & Co".to_string(),
            label: "All Invoices".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            theme: ReportTheme::default(),
        }
    }

    fn entries(n: usize) -> Vec<ReportEntry> {
        (0..n)
            .map(|i| ReportEntry {
                invoice_number: format!("INV-{:05}", i + 1),
                date: NaiveDate::from_ymd_opt(2024, 2, 10)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                customer_code: "C-1".to_string(),
                customer_name: "<Corner> Shop".to_string(),
                items: vec![
                    ReportItem {
                        description: "Eclairs".to_string(),
                        unit: PackUnit::Master,
                        quantity: dec!(2),
                        rate: dec!(1200),
                        amount: dec!(2400),
                    },
                    ReportItem {
                        description: "Eclairs".to_string(),
                        unit: PackUnit::Half,
                        quantity: dec!(1),
                        rate: dec!(600),
                        amount: dec!(600),
                    },
                ],
                discount: dec!(0),
                total: dec!(3000),
                status: InvoiceStatus::Pending,
            })
            .collect()
    }

    fn report(n: usize, mode: ReportMode) -> PaginatedReport {
        ReportPaginator::default().paginate(
            entries(n),
            DateFilter::All,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            mode,
        )
    }

    #[test]
    fn every_page_has_header_and_breaks_sit_between_pages() {
        let html = render_html(&report(23, ReportMode::Normal), &ctx()).unwrap();

        assert_eq!(html.matches(PAGE_BREAK).count(), 2);
        assert!(html.contains("Page 1 of 3"));
        assert!(html.contains("Page 3 of 3"));
        assert_eq!(html.matches("23 records").count(), 3);
        assert_eq!(html.matches("<h1>Sweet &amp; Co</h1>").count(), 3);
        assert_eq!(html.matches(r#"class="summary""#).count(), 1);
    }

    #[test]
    fn summary_follows_the_last_page_table() {
        let html = render_html(&report(12, ReportMode::Short), &ctx()).unwrap();

        let last_break = html.rfind(PAGE_BREAK).unwrap();
        let summary_at = html.find(r#"<div class="summary">"#).unwrap();
        assert!(summary_at > last_break);
        assert!(html.contains("36000.00"));
    }

    #[test]
    fn normal_mode_spans_invoice_cells() {
        let html = render_html(&report(1, ReportMode::Normal), &ctx()).unwrap();
        assert!(html.contains(r#"<td rowspan="2">INV-00001</td>"#));
    }

    #[test]
    fn customer_text_is_escaped() {
        let html = render_html(&report(1, ReportMode::Short), &ctx()).unwrap();
        assert!(html.contains("&lt;Corner&gt; Shop"));
        assert!(!html.contains("<Corner>"));
    }

    #[test]
    fn empty_report_still_renders_one_page() {
        let doc = render_document(&report(0, ReportMode::Normal), &ctx()).unwrap();
        assert_eq!(doc.page_count, 1);
        assert!(doc.html.contains("Page 1 of 1"));
        assert!(!doc.html.contains(PAGE_BREAK));
    }

    #[test]
    fn markup_in_context_and_items_is_escaped() {
        let mut ctx = ctx();
        ctx.label = r#"<script>alert("x")</script>"#.to_string();
        let mut entries = entries(1);
        entries[0].items[0].description = "Mint & <b>Lime</b>".to_string();
        let report = ReportPaginator::default().paginate(
            entries,
            DateFilter::All,
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            ReportMode::Normal,
        );

        let html = render_html(&report, &ctx).unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>Lime</b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Mint &amp; &lt;b&gt;Lime&lt;/b&gt;"));
    }

    #[test]
    fn document_title_is_not_escaped_twice() {
        let doc = render_document(&report(1, ReportMode::Normal), &ctx()).unwrap();
        assert_eq!(doc.title, "Sweet & Co - All Invoices");
        assert!(doc.html.contains("<title>Sweet &amp; Co - All Invoices</title>"));
        assert!(!doc.html.contains("&amp;amp;"));
    }
}
