//! Generic per-collection document storage.
//!
//! One trait, implemented once per backend and reused for every document type,
//! so CRUD logic is never duplicated per entity.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::{PgConnector, PostgresDocumentStore};
pub use r#trait::DocumentStore;
