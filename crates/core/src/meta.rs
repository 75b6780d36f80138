//! Blob metadata attributes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Descriptive attributes of a stored blob, produced by the storage backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    /// Hex-encoded MD5 digest of the blob content.
    pub md5: String,
    /// Blob size in bytes.
    pub size: u64,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
}

impl BlobMeta {
    /// The creation timestamp rendered as RFC 3339.
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.created_at.to_string())
    }
}
