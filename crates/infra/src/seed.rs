//! Bootstrap seeding of the order status catalog.

use tracing::{debug, info};

use ambumed_core::DocumentId;
use ambumed_medicine::{Status, default_catalog};

use crate::document_store::DocumentStore;
use crate::error::StoreError;

/// Create every default status that is missing. Existing entries are left as
/// they are, so an edited catalog survives restarts.
///
/// Returns how many statuses were created.
pub async fn ensure_default_catalog<S>(store: &S) -> Result<usize, StoreError>
where
    S: DocumentStore<Status>,
{
    let mut created = 0;
    for status in default_catalog() {
        match store.create(&DocumentId::from(status.id), &status).await {
            Ok(()) => created += 1,
            Err(e) if e.is_conflict() => {
                debug!(status_id = status.id, "status already present");
            }
            Err(e) => return Err(e),
        }
    }
    info!(created, collection = store.collection(), "status catalog ready");
    Ok(created)
}
