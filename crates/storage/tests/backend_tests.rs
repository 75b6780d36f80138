//! Behavior tests shared by both storage backends.

use bytes::Bytes;
use depot_core::{Content, Key};
use depot_storage::{BlobStore, FilesystemBackend, InMemoryBackend, StorageError};
use futures::stream;
use std::io;
use std::sync::Arc;
use tempfile::TempDir;

fn key(path: &str) -> Key {
    Key::from_path(path).unwrap()
}

async fn filesystem() -> (Option<TempDir>, Arc<dyn BlobStore>) {
    let temp = tempfile::tempdir().expect("failed to create temp directory");
    let backend = FilesystemBackend::new(temp.path())
        .await
        .expect("failed to create filesystem backend");
    (Some(temp), Arc::new(backend))
}

fn memory() -> (Option<TempDir>, Arc<dyn BlobStore>) {
    (None, Arc::new(InMemoryBackend::new()))
}

async fn backends() -> Vec<(Option<TempDir>, Arc<dyn BlobStore>)> {
    vec![filesystem().await, memory()]
}

#[tokio::test]
async fn put_get_round_trip() {
    for (_guard, store) in backends().await {
        let k = key("a/b.txt");
        store
            .put(&k, Content::from_bytes("hello".as_bytes().to_vec()))
            .await
            .unwrap();

        let content = store.get(&k).await.unwrap();
        assert_eq!(content.size(), Some(5));
        assert_eq!(content.into_bytes().await.unwrap().as_ref(), b"hello");
    }
}

#[tokio::test]
async fn get_missing_is_not_found() {
    for (_guard, store) in backends().await {
        let err = store.get(&key("missing.bin")).await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }
}

#[tokio::test]
async fn exists_tracks_put_and_delete() {
    for (_guard, store) in backends().await {
        let k = key("dir/blob");
        assert!(!store.exists(&k).await.unwrap());

        store.put(&k, Content::from_bytes(vec![1, 2, 3])).await.unwrap();
        assert!(store.exists(&k).await.unwrap());

        store.delete(&k).await.unwrap();
        assert!(!store.exists(&k).await.unwrap());
    }
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    for (_guard, store) in backends().await {
        let err = store.delete(&key("nope")).await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }
}

#[tokio::test]
async fn put_overwrites_existing() {
    for (_guard, store) in backends().await {
        let k = key("a");
        store.put(&k, Content::from_bytes(vec![1])).await.unwrap();
        store.put(&k, Content::from_bytes(vec![2, 3])).await.unwrap();

        let data = store.get(&k).await.unwrap().into_bytes().await.unwrap();
        assert_eq!(data.as_ref(), &[2, 3]);
    }
}

#[tokio::test]
async fn list_is_prefix_scoped_and_sorted() {
    for (_guard, store) in backends().await {
        for path in ["a/c.txt", "a/b.txt", "a/sub/d.txt", "ab/e.txt", "z.txt"] {
            store
                .put(&key(path), Content::from_bytes(path.as_bytes().to_vec()))
                .await
                .unwrap();
        }

        let keys = store.list(&key("a")).await.unwrap();
        let names: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        // Segment-wise prefix: "ab/e.txt" is not under "a".
        assert_eq!(names, ["a/b.txt", "a/c.txt", "a/sub/d.txt"]);

        let all = store.list(&Key::root()).await.unwrap();
        assert_eq!(all.len(), 5);
    }
}

#[tokio::test]
async fn list_missing_prefix_is_empty() {
    for (_guard, store) in backends().await {
        assert!(store.list(&key("no/such/prefix")).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn metadata_reports_digest_and_size() {
    for (_guard, store) in backends().await {
        let k = key("meta/blob.bin");
        store
            .put(&k, Content::from_bytes("hello".as_bytes().to_vec()))
            .await
            .unwrap();

        let meta = store.metadata(&k).await.unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.md5, "5d41402abc4b2a76b9719d911017c592");
    }
}

#[tokio::test]
async fn metadata_missing_is_not_found() {
    for (_guard, store) in backends().await {
        let err = store.metadata(&key("absent")).await.unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err}");
    }
}

#[tokio::test]
async fn failing_stream_leaves_no_entry() {
    for (_guard, store) in backends().await {
        let k = key("partial.bin");
        let chunks = vec![
            Ok(Bytes::from_static(b"some data")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
        ];
        let content = Content::new(stream::iter(chunks), None);

        assert!(store.put(&k, content).await.is_err());
        assert!(!store.exists(&k).await.unwrap());
        assert!(store.list(&Key::root()).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn root_key_is_not_a_blob() {
    for (_guard, store) in backends().await {
        // The root key only makes sense as a listing prefix.
        assert!(matches!(
            store.get(&Key::root()).await,
            Err(StorageError::InvalidKey(_)) | Err(StorageError::NotFound(_))
        ));
    }
}
