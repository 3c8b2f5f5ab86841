use thiserror::Error;

use ambumed_core::DocumentId;

/// Document store operation error.
///
/// `NotFound` and `Conflict` are the sentinels callers branch on; every other
/// backend failure is reported once, unmodified, through the remaining variants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: DocumentId },

    #[error("document already exists: {collection}/{id}")]
    Conflict { collection: String, id: DocumentId },

    /// Backend unreachable, or the operation did not finish within its timeout.
    #[error("backend unreachable: {0}")]
    Connectivity(String),

    /// Unexpected encode/decode or type failure.
    #[error("internal storage error: {0}")]
    Internal(String),

    /// Any other failure reported by the database.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: DocumentId) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id,
        }
    }

    pub fn conflict(collection: impl Into<String>, id: DocumentId) -> Self {
        Self::Conflict {
            collection: collection.into(),
            id,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
