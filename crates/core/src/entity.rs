//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Position of the entity with the given id inside an owned collection.
pub fn position_by_id<E>(entries: &[E], id: &E::Id) -> Option<usize>
where
    E: Entity,
{
    entries.iter().position(|e| e.id() == id)
}
