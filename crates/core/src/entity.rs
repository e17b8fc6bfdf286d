//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products, customers and invoices are entities: two records with the same
/// id are the same thing even when their fields differ (e.g. a customer whose
/// ledger balance moved).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
