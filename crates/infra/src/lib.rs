//! Infrastructure layer: storage ports, configuration and the billing services
//! that tie domain rules to storage.

pub mod config;
pub mod error;
pub mod repository;
pub mod services;

pub use config::BillingConfig;
pub use error::{BillingError, BillingResult};
pub use repository::{
    CustomerRepository, InMemoryCustomerRepository, InMemoryInvoiceRepository, InMemoryProductRepository,
    InvoiceRepository, ProductRepository, RepositoryError, RepositoryResult,
};
pub use services::{CustomerBalanceReconciler, InvoiceBook, InvoiceStatusMachine};
