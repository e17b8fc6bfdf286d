//! Billing services: the loaded invoice set, status changes and ledger settlement.

pub mod book;
pub mod reconcile;
pub mod status;

pub use book::InvoiceBook;
pub use reconcile::CustomerBalanceReconciler;
pub use status::InvoiceStatusMachine;
