//! Blob storage abstraction and backends for Depot.
//!
//! This crate provides:
//! - The `BlobStore` trait consumed by the gateway
//! - Backends: local filesystem and in-memory

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::InMemoryBackend};
pub use error::{StorageError, StorageResult};
pub use traits::BlobStore;

use depot_core::config::StorageConfig;
use std::sync::Arc;

/// Create a blob store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::InMemory => Ok(Arc::new(InMemoryBackend::new())),
    }
}
