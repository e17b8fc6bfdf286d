//! `billdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, strongly-typed identifiers and money arithmetic helpers.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, InvoiceId, ProductId};
pub use money::{Clamped, Money, Quantity, clamp_non_negative, round2};
pub use value_object::ValueObject;
