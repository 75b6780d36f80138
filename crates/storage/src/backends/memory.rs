//! In-memory storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::BlobStore;
use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{BlobMeta, Content, Key};
use md5::{Digest, Md5};
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

struct StoredBlob {
    data: Bytes,
    created_at: OffsetDateTime,
}

/// In-memory blob store. Contents are lost when the process exits.
#[derive(Default)]
pub struct InMemoryBackend {
    blobs: RwLock<HashMap<Key, StoredBlob>>,
}

impl InMemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_blob_key(key: &Key) -> StorageResult<()> {
        if key.is_root() {
            return Err(StorageError::InvalidKey(
                "root key does not address a blob".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBackend {
    async fn exists(&self, key: &Key) -> StorageResult<bool> {
        Ok(self.blobs.read().await.contains_key(key))
    }

    async fn get(&self, key: &Key) -> StorageResult<Content> {
        Self::ensure_blob_key(key)?;
        let blobs = self.blobs.read().await;
        let blob = blobs
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(Content::from_bytes(blob.data.clone()))
    }

    async fn put(&self, key: &Key, content: Content) -> StorageResult<()> {
        Self::ensure_blob_key(key)?;
        // Collect the full stream before touching the map, so a failing
        // stream never leaves a partial entry.
        let data = content.into_bytes().await?;
        self.blobs.write().await.insert(
            key.clone(),
            StoredBlob {
                data,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &Key) -> StorageResult<()> {
        match self.blobs.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    async fn list(&self, prefix: &Key) -> StorageResult<Vec<Key>> {
        let blobs = self.blobs.read().await;
        let mut keys: Vec<Key> = blobs
            .keys()
            .filter(|k| prefix.is_prefix_of(k))
            .cloned()
            .collect();
        keys.sort_by_key(|k| k.to_string());
        Ok(keys)
    }

    async fn metadata(&self, key: &Key) -> StorageResult<BlobMeta> {
        Self::ensure_blob_key(key)?;
        let blobs = self.blobs.read().await;
        let blob = blobs
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        let mut hasher = Md5::new();
        hasher.update(&blob.data);
        Ok(BlobMeta {
            md5: hex::encode(hasher.finalize()),
            size: blob.data.len() as u64,
            created_at: blob.created_at,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
