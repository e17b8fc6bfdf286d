//! Parties domain module (customers and their running ledger balance).
//!
//! The live `Customer` record owns the authoritative balance; invoices only
//! ever hold a frozen [`CustomerSnapshot`] taken at save time.

pub mod customer;

pub use customer::{ContactInfo, Customer, CustomerSnapshot, NewCustomer};
