//! Aggregate roots and the outcome of a read-modify-write mutation.

use crate::entity::Entity;

/// Aggregate root marker.
///
/// An aggregate root owns its child entities by value and is the unit that is
/// loaded, mutated and persisted as a whole. There is no version tracking:
/// concurrent writers replace the full document (last writer wins).
pub trait AggregateRoot: Entity {}

/// Result of applying a mutation to a loaded aggregate.
///
/// `updated` carries the new aggregate state when something changed and must be
/// persisted; `None` means the mutation was read-only and no write happens.
/// `reply` is handed back to the caller once persistence (if any) succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<A, R> {
    pub updated: Option<A>,
    pub reply: R,
}

impl<A, R> Mutation<A, R> {
    /// The aggregate changed and must be written back.
    pub fn changed(aggregate: A, reply: R) -> Self {
        Self {
            updated: Some(aggregate),
            reply,
        }
    }

    /// Nothing to persist.
    pub fn read_only(reply: R) -> Self {
        Self {
            updated: None,
            reply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_mutation_carries_no_aggregate() {
        let m: Mutation<String, u8> = Mutation::read_only(7);
        assert!(m.updated.is_none());
        assert_eq!(m.reply, 7);
    }

    #[test]
    fn changed_mutation_is_a_write() {
        let m = Mutation::changed("amb".to_string(), ());
        assert_eq!(m.updated.as_deref(), Some("amb"));
    }
}
