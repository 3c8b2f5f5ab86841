//! Infrastructure layer: configuration, backend connectivity, document storage
//! and the application services built on top of them.

pub mod ambulance_updater;
pub mod config;
pub mod connection;
pub mod document_store;
pub mod error;
pub mod medicine_service;
pub mod seed;
pub mod status_catalog;

pub use ambulance_updater::{AggregateUpdater, UpdateError};
pub use config::{AMBULANCE_COLLECTION, DocumentStoreConfig, STATUS_COLLECTION};
pub use connection::{ConnectionManager, Connector};
pub use document_store::{DocumentStore, InMemoryDocumentStore, PgConnector, PostgresDocumentStore};
pub use error::StoreError;
pub use medicine_service::MedicineService;
pub use status_catalog::StatusCatalog;
