//! Document identifiers used across the domain and the storage boundary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key of a document inside a collection.
///
/// Ambulances are keyed by their string id, catalog statuses by their numeric
/// id rendered as decimal text, so both collections share one key type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for DocumentId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<u32> for DocumentId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

/// Placeholder clients send when they want the server to assign an entry id.
pub const NEW_ENTRY_PLACEHOLDER: &str = "@new";

/// Resolve a client supplied entry id, generating one when it is absent,
/// blank or the `@new` placeholder.
///
/// Uses UUIDv7 (time-ordered).
pub fn generate_entry_id(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(id) if !id.is_empty() && id != NEW_ENTRY_PLACEHOLDER => id.to_string(),
        _ => Uuid::now_v7().to_string(),
    }
}
