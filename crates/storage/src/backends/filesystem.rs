//! Local filesystem storage backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::BlobStore;
use async_trait::async_trait;
use bytes::Bytes;
use depot_core::{BlobMeta, Content, Key};
use futures::StreamExt;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::instrument;
use uuid::Uuid;

/// Chunk size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Directory under the root holding in-flight uploads, excluded from listings.
const TMP_DIR: &str = ".tmp";

/// Local filesystem blob store.
///
/// Blobs are plain files below the root; key segments map to path components.
/// Keys reject `.`/`..` segments at construction, so a key can never address
/// a path outside the root.
pub struct FilesystemBackend {
    root: PathBuf,
    tmp: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        let tmp = root.join(TMP_DIR);
        fs::create_dir_all(&tmp).await?;
        Ok(Self { root, tmp })
    }

    /// Full path of the file addressed by `key`.
    fn blob_path(&self, key: &Key) -> StorageResult<PathBuf> {
        if key.is_root() {
            return Err(StorageError::InvalidKey(
                "root key does not address a blob".to_string(),
            ));
        }
        let mut path = self.root.clone();
        for segment in key.segments() {
            path.push(segment);
        }
        Ok(path)
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn map_not_found(key: &Key, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io(err)
        }
    }

    /// Open `key` for reading, failing with `NotFound` for missing files and
    /// for directory-like keys.
    async fn open_blob(&self, key: &Key) -> StorageResult<(fs::File, std::fs::Metadata)> {
        let path = self.blob_path(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let file = fs::File::open(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))?;
        Ok((file, meta))
    }
}

#[async_trait]
impl BlobStore for FilesystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem", key = %key))]
    async fn exists(&self, key: &Key) -> StorageResult<bool> {
        let path = self.blob_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem", key = %key))]
    async fn get(&self, key: &Key) -> StorageResult<Content> {
        let (file, meta) = self.open_blob(key).await?;

        // Stream the file in chunks instead of loading it into memory.
        let stream = async_stream::try_stream! {
            let mut file = file;
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(Content::new(stream, Some(meta.len())))
    }

    #[instrument(skip(self, content), fields(backend = "filesystem", key = %key))]
    async fn put(&self, key: &Key, content: Content) -> StorageResult<()> {
        let path = self.blob_path(key)?;
        self.ensure_parent(&path).await?;

        // Write to a temp file and rename into place, so a content stream
        // that fails mid-way never leaves a partial blob at the key.
        let tmp_path = self.tmp.join(format!("upload-{}", Uuid::new_v4()));
        let mut file = fs::File::create(&tmp_path).await?;

        let mut stream = content.into_stream();
        let written: StorageResult<()> = async {
            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk?).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        drop(file);
        match written {
            Ok(()) => {
                fs::rename(&tmp_path, &path).await?;
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                    tracing::warn!(path = %tmp_path.display(), error = %cleanup, "failed to remove temp upload");
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem", key = %key))]
    async fn delete(&self, key: &Key) -> StorageResult<()> {
        let path = self.blob_path(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| Self::map_not_found(key, e))
    }

    #[instrument(skip(self), fields(backend = "filesystem", prefix = %prefix))]
    async fn list(&self, prefix: &Key) -> StorageResult<Vec<Key>> {
        let mut start = self.root.clone();
        for segment in prefix.segments() {
            start.push(segment);
        }

        match fs::metadata(&start).await {
            Ok(meta) if meta.is_file() => return Ok(vec![prefix.clone()]),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        }

        let mut keys = Vec::new();
        let mut dirs = vec![start];
        while let Some(dir) = dirs.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path == self.tmp {
                    continue;
                }
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    dirs.push(path);
                } else if file_type.is_file() {
                    let rel = path.strip_prefix(&self.root).map_err(|_| {
                        StorageError::InvalidKey(format!(
                            "entry outside storage root: {}",
                            path.display()
                        ))
                    })?;
                    let segments = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned());
                    let key = Key::from_segments(segments)
                        .map_err(|e| StorageError::InvalidKey(e.to_string()))?;
                    keys.push(key);
                }
            }
        }

        keys.sort_by_key(|k| k.to_string());
        Ok(keys)
    }

    #[instrument(skip(self), fields(backend = "filesystem", key = %key))]
    async fn metadata(&self, key: &Key) -> StorageResult<BlobMeta> {
        let (mut file, meta) = self.open_blob(key).await?;

        let mut hasher = Md5::new();
        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        let created_at = meta
            .created()
            .or_else(|_| meta.modified())
            .map(OffsetDateTime::from)
            .unwrap_or_else(|_| OffsetDateTime::now_utc());

        Ok(BlobMeta {
            md5: hex::encode(hasher.finalize()),
            size: meta.len(),
            created_at,
        })
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
