//! Storage ports for invoices, customers and products.
//!
//! Every operation returns `Result<T, RepositoryError>`; callers never see a
//! half-applied write. The in-memory adapters back tests and embedding shells.

use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

pub mod customers;
pub mod invoices;
pub mod products;

pub use customers::{CustomerRepository, InMemoryCustomerRepository};
pub use invoices::{InMemoryInvoiceRepository, InvoiceRepository};
pub use products::{InMemoryProductRepository, ProductRepository};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository operation error.
///
/// These are **infrastructure errors** (missing rows, constraint clashes,
/// storage failures) as opposed to domain errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("conflicting record: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn storage(what: impl Into<String>) -> Self {
        Self::Storage(what.into())
    }
}

impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for RepositoryError {
    fn from(_: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        Self::storage("in-memory store lock poisoned")
    }
}

impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for RepositoryError {
    fn from(_: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        Self::storage("in-memory store lock poisoned")
    }
}
