//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every stored domain object (orders, loans, items, leftovers) implements
/// this so that a single repository abstraction can hold any of them.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
