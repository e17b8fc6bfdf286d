//! Invoice reports.
//!
//! Filters a set of invoices by date, pages it, lays each page out in one of
//! two table modes and renders the whole thing into a printable HTML document.
//! Printing and PDF export go through a gateway supplied by the host shell.

pub mod dispatch;
pub mod error;
pub mod filter;
pub mod layout;
pub mod paginate;
pub mod render;
pub mod source;

pub use dispatch::{Delivery, DispatchOutcome, ExportMetadata, PrintExportGateway, PrinterDiscovery, ReportDispatcher};
pub use error::{ReportError, ReportResult};
pub use filter::{DateFilter, DateWindow};
pub use layout::{InvoiceColumns, PageLayout, ReportMode, RowGroup, ShortRow, layout_page};
pub use paginate::{DEFAULT_PAGE_SIZE, PageSubtotal, PaginatedReport, ReportPage, ReportPaginator, ReportSummary};
pub use render::{PAGE_BREAK, ReportContext, ReportDocument, ReportTheme, render_document, render_html};
pub use source::{ReportEntry, ReportItem, entries_from_records};
