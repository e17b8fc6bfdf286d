use thiserror::Error;

use billdesk_core::DomainError;

use crate::repository::RepositoryError;

pub type BillingResult<T> = Result<T, BillingError>;

/// Error surfaced by the billing services.
#[derive(Debug, Error)]
pub enum BillingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The status change was stored but the customer ledger was not adjusted.
    #[error("invoice {invoice_number} is paid but the customer balance was not settled: {source}")]
    Reconciliation {
        invoice_number: String,
        #[source]
        source: RepositoryError,
    },
}
