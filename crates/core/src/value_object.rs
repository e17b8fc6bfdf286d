//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. In billing the
/// customer snapshot frozen into an invoice and the computed invoice totals
/// are value objects: once built they never change, and a later edit of the
/// live customer record produces nothing but a new snapshot on the next save.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct CustomerSnapshot {
///     name: String,
///     previous_balance: Money,
/// }
///
/// impl ValueObject for CustomerSnapshot {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
