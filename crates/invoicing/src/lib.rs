//! Invoicing domain module.
//!
//! This crate contains the billing rules: per-line pricing, invoice totals,
//! the amount-in-words rendering, the stored invoice record and its status
//! lifecycle. It is deterministic domain logic (no IO, no storage); the
//! repository round-trips and side effects live in `billdesk-infra`.

pub mod draft;
pub mod invoice;
pub mod line_item;
pub mod status;
pub mod totals;
pub mod words;

pub use draft::{DraftLine, InvoiceDraft};
pub use invoice::{Invoice, InvoiceNumberSequence};
pub use line_item::{LineItem, LinePricing, price_line};
pub use status::{InvoiceStatus, StatusTransition, plan_transition};
pub use totals::{AdjustmentInputs, BillingWarning, InvoiceTotals, LineFigures, aggregate};
pub use words::{amount_in_words, number_to_words};
