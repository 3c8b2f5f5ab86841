use std::marker::PhantomData;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use ambumed_core::DocumentId;

use super::r#trait::DocumentStore;
use crate::error::StoreError;

/// In-memory document collection.
///
/// Intended for tests/dev. Documents are kept as JSON so a shape mismatch
/// surfaces as a decode error, as it would against a real backend.
#[derive(Debug)]
pub struct InMemoryDocumentStore<T> {
    collection: String,
    documents: RwLock<Vec<(DocumentId, JsonValue)>>,
    _document: PhantomData<fn() -> T>,
}

impl<T> InMemoryDocumentStore<T> {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: RwLock::new(Vec::new()),
            _document: PhantomData,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> StoreError {
        StoreError::Internal("lock poisoned".to_string())
    }

    fn not_found(&self, id: &DocumentId) -> StoreError {
        StoreError::not_found(&self.collection, id.clone())
    }
}

fn encode<T: Serialize>(document: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(document)
        .map_err(|e| StoreError::Internal(format!("document encoding failed: {e}")))
}

fn decode<T: DeserializeOwned>(value: &JsonValue) -> Result<T, StoreError> {
    T::deserialize(value).map_err(|e| StoreError::Internal(format!("document decoding failed: {e}")))
}

#[async_trait]
impl<T> DocumentStore<T> for InMemoryDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        let value = encode(document)?;
        let mut documents = self.documents.write().map_err(|_| Self::poisoned())?;

        if documents.iter().any(|(existing, _)| existing == id) {
            return Err(StoreError::conflict(&self.collection, id.clone()));
        }
        documents.push((id.clone(), value));
        Ok(())
    }

    async fn find(&self, id: &DocumentId) -> Result<T, StoreError> {
        let documents = self.documents.read().map_err(|_| Self::poisoned())?;
        let (_, value) = documents
            .iter()
            .find(|(existing, _)| existing == id)
            .ok_or_else(|| self.not_found(id))?;
        decode(value)
    }

    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let documents = self.documents.read().map_err(|_| Self::poisoned())?;
        documents.iter().map(|(_, value)| decode(value)).collect()
    }

    async fn update(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        let value = encode(document)?;
        let mut documents = self.documents.write().map_err(|_| Self::poisoned())?;

        let slot = documents
            .iter_mut()
            .find(|(existing, _)| existing == id)
            .ok_or_else(|| self.not_found(id))?;
        slot.1 = value;
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(|_| Self::poisoned())?;

        let idx = documents
            .iter()
            .position(|(existing, _)| existing == id)
            .ok_or_else(|| self.not_found(id))?;
        documents.remove(idx);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
