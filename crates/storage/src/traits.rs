//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use depot_core::{BlobMeta, Content, Key};

/// Blob store abstraction consumed by the gateway.
///
/// Implementations own all consistency guarantees; the gateway adds no
/// locking of its own, so concurrent writes to one key resolve however the
/// backend resolves them.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Check if a blob exists.
    async fn exists(&self, key: &Key) -> StorageResult<bool>;

    /// Get a blob's content as a stream.
    async fn get(&self, key: &Key) -> StorageResult<Content>;

    /// Store a blob, consuming the content stream.
    ///
    /// The write is atomic: a content stream that fails mid-way must not
    /// leave a partial entry behind.
    async fn put(&self, key: &Key, content: Content) -> StorageResult<()>;

    /// Delete a blob.
    async fn delete(&self, key: &Key) -> StorageResult<()>;

    /// List blob keys under a prefix, in stable lexicographic order.
    async fn list(&self, prefix: &Key) -> StorageResult<Vec<Key>>;

    /// Get a blob's metadata.
    async fn metadata(&self, key: &Key) -> StorageResult<BlobMeta>;

    /// Static identifier of the backend type, used in logs.
    fn backend_name(&self) -> &'static str;
}
