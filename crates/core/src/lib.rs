//! `ambumed-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{AggregateRoot, Mutation};
pub use entity::{Entity, position_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, generate_entry_id};
pub use value_object::ValueObject;
