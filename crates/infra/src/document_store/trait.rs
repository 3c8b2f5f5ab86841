use std::sync::Arc;

use async_trait::async_trait;

use ambumed_core::DocumentId;

use crate::error::StoreError;

/// CRUD access to one logical collection of documents of type `T`.
///
/// ## Contract
///
/// | operation | fails with |
/// |-----------|------------|
/// | `create`  | `Conflict` when the id is taken |
/// | `find`    | `NotFound` when absent |
/// | `find_all`| never for an empty collection (returns `vec![]`) |
/// | `update`  | `NotFound` when absent; otherwise a full replace |
/// | `delete`  | `NotFound` when absent |
///
/// Each call is a single backend round trip bounded by the configured timeout;
/// an elapsed timeout surfaces as `Connectivity`. No call retries.
#[async_trait]
pub trait DocumentStore<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Name of the collection this store is bound to.
    fn collection(&self) -> &str;

    async fn create(&self, id: &DocumentId, document: &T) -> Result<(), StoreError>;

    async fn find(&self, id: &DocumentId) -> Result<T, StoreError>;

    /// Every document, in the backend's natural (insertion) order.
    async fn find_all(&self) -> Result<Vec<T>, StoreError>;

    async fn update(&self, id: &DocumentId, document: &T) -> Result<(), StoreError>;

    async fn delete(&self, id: &DocumentId) -> Result<(), StoreError>;

    /// Release the backend connection shared by this store.
    async fn disconnect(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<T, S> DocumentStore<T> for Arc<S>
where
    T: Send + Sync,
    S: DocumentStore<T> + ?Sized,
{
    fn collection(&self) -> &str {
        (**self).collection()
    }

    async fn create(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        (**self).create(id, document).await
    }

    async fn find(&self, id: &DocumentId) -> Result<T, StoreError> {
        (**self).find(id).await
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        (**self).find_all().await
    }

    async fn update(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        (**self).update(id, document).await
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        (**self).disconnect().await
    }
}
