//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// status snapshot embedded in an order is one: it is copied at transition
/// time and never follows later edits of the catalog entry it came from.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
