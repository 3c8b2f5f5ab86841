//! Read-only access to the order status catalog.

use ambumed_core::DocumentId;
use ambumed_medicine::{INITIAL_STATUS_ID, Status};

use crate::document_store::DocumentStore;
use crate::error::StoreError;

/// Facade over the `status` collection. The catalog is seeded elsewhere; this
/// type never writes.
#[derive(Debug, Clone)]
pub struct StatusCatalog<S> {
    store: S,
}

impl<S> StatusCatalog<S>
where
    S: DocumentStore<Status>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Entry point of every new order.
    pub async fn initial_status(&self) -> Result<Status, StoreError> {
        self.status_by_id(INITIAL_STATUS_ID).await
    }

    pub async fn status_by_id(&self, id: u32) -> Result<Status, StoreError> {
        self.store.find(&DocumentId::from(id)).await
    }

    pub async fn all_statuses(&self) -> Result<Vec<Status>, StoreError> {
        self.store.find_all().await
    }
}
