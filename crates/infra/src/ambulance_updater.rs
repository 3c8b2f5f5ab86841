//! Read-modify-write pipeline for the ambulance aggregate.
//!
//! ```text
//! ambulance id + mutation
//!   ↓
//! 1. Load the ambulance document (NotFound stops here, mutation never runs)
//!   ↓
//! 2. Run the mutation on the owned, loaded value
//!   ↓
//! 3. Persist the returned aggregate with a full replace (skipped when None)
//!   ↓
//! 4. Hand the mutation's reply back to the caller
//! ```
//!
//! The cycle is **not** transactional: two concurrent updates of one ambulance
//! both succeed and the later full replace wins. A delete racing between load
//! and write is reported as NotFound and replaces whatever the mutation meant
//! to answer.

use thiserror::Error;
use tracing::{debug, instrument};

use ambumed_core::{DocumentId, DomainError, Mutation};
use ambumed_medicine::Ambulance;

use crate::document_store::DocumentStore;
use crate::error::StoreError;

/// Failure of an ambulance operation, across domain and storage layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("backend unreachable: {0}")]
    Connectivity(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl UpdateError {
    pub fn deleted_concurrently() -> Self {
        Self::NotFound("ambulance was deleted while processing the request".to_string())
    }
}

impl From<StoreError> for UpdateError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { collection, id } => {
                UpdateError::NotFound(format!("{collection} '{id}'"))
            }
            StoreError::Conflict { collection, id } => {
                UpdateError::Conflict(format!("{collection} '{id}' already exists"))
            }
            StoreError::Connectivity(msg) => UpdateError::Connectivity(msg),
            StoreError::Internal(msg) => UpdateError::Internal(msg),
            StoreError::Backend(msg) => UpdateError::Backend(msg),
        }
    }
}

impl From<DomainError> for UpdateError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => UpdateError::Validation(msg),
            DomainError::NotFound(msg) => UpdateError::NotFound(msg),
            DomainError::Conflict(msg) => UpdateError::Conflict(msg),
        }
    }
}

/// Loads an ambulance, applies a mutation and persists the result if it changed.
#[derive(Debug, Clone)]
pub struct AggregateUpdater<S> {
    store: S,
}

impl<S> AggregateUpdater<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> AggregateUpdater<S>
where
    S: DocumentStore<Ambulance>,
{
    #[instrument(skip(self, mutation), err)]
    pub async fn apply<R, E, F>(&self, ambulance_id: &str, mutation: F) -> Result<R, UpdateError>
    where
        F: FnOnce(Ambulance) -> Result<Mutation<Ambulance, R>, E>,
        UpdateError: From<E>,
    {
        let id = DocumentId::from(ambulance_id);

        // 1) Load
        let ambulance = self.store.find(&id).await?;

        // 2) Mutate (owned value; the stored copy is untouched)
        let Mutation { updated, reply } = mutation(ambulance)?;

        // 3) Persist only when something changed
        match updated {
            Some(updated) => match self.store.update(&id, &updated).await {
                Ok(()) => debug!("ambulance persisted"),
                Err(e) if e.is_not_found() => return Err(UpdateError::deleted_concurrently()),
                Err(e) => return Err(e.into()),
            },
            None => debug!("read-only mutation; nothing to persist"),
        }

        Ok(reply)
    }
}
