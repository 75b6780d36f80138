//! Fetch-through proxy-cache engine.
//!
//! Every fetch goes to the remote origin first (always-refresh policy). A
//! successful response is streamed to the caller while being teed into
//! local storage; any remote failure collapses to `Absent`, which the
//! gateway renders as 404. Remote failure and true absence are observably
//! identical to the client.

use bytes::Bytes;
use depot_core::config::ProxyConfig;
use depot_core::{ChunkStream, Content, Key};
use depot_storage::BlobStore;
use futures::{Stream, StreamExt};
use reqwest::{Client, Url};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use axum::http::HeaderMap;
use axum::http::header;

/// Outcome of a proxy fetch.
pub enum FetchOutcome {
    /// Remote served the blob; headers are the remote's response headers.
    Found {
        headers: HeaderMap,
        content: Content,
    },
    /// Remote failed or the blob does not exist there.
    Absent,
}

#[derive(Debug, thiserror::Error)]
enum ProxyError {
    #[error("invalid remote url: {0}")]
    Url(#[from] url::ParseError),

    #[error("remote request failed: {0}")]
    Remote(#[from] reqwest::Error),
}

/// Fetch-through cache over a remote origin.
pub struct ProxyCache {
    client: Client,
    origin: Url,
    storage: Arc<dyn BlobStore>,
}

impl ProxyCache {
    pub fn new(client: Client, origin: Url, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            client,
            origin,
            storage,
        }
    }

    /// Build the engine from configuration. The origin gets a trailing
    /// slash so key paths join below it instead of replacing its last
    /// segment.
    pub fn from_config(
        config: &ProxyConfig,
        storage: Arc<dyn BlobStore>,
    ) -> depot_core::Result<Self> {
        let mut origin = config.origin.clone();
        if !origin.ends_with('/') {
            origin.push('/');
        }
        let origin = Url::parse(&origin)
            .map_err(|e| depot_core::Error::Config(format!("invalid proxy origin: {e}")))?;
        Ok(Self::new(Client::new(), origin, storage))
    }

    /// Fetch `key` from the remote origin.
    ///
    /// Transport errors never escape: they are logged and degraded to
    /// `Absent`, the same outcome as a remote 404.
    pub async fn fetch(&self, key: &Key) -> FetchOutcome {
        match self.try_fetch(key).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "remote fetch failed, treating as absent");
                FetchOutcome::Absent
            }
        }
    }

    async fn try_fetch(&self, key: &Key) -> Result<FetchOutcome, ProxyError> {
        let url = self.origin.join(&key.to_string())?;

        // Caller headers and body are not forwarded to the origin.
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(key = %key, status = %status, "remote returned non-success");
            return Ok(FetchOutcome::Absent);
        }

        let mut headers = response.headers().clone();
        headers.remove(header::TRANSFER_ENCODING);
        headers.remove(header::CONNECTION);
        let size = response.content_length();

        let (tx, rx) = mpsc::unbounded_channel();
        spawn_cache_writer(self.storage.clone(), key.clone(), rx, size);

        let remote: ChunkStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(io::Error::other)),
        );
        let content = Content::new(TeeStream::new(remote, tx), size);

        Ok(FetchOutcome::Found { headers, content })
    }
}

enum TeeEvent {
    Chunk(Bytes),
    End,
}

/// Forwards chunks unchanged while cloning each one to the cache writer.
///
/// The explicit `End` event distinguishes clean completion from truncation:
/// a sender dropped without `End` (mid-stream error, client disconnect)
/// makes the writer discard its copy, so no partial blob is ever persisted.
/// The channel is unbounded so the forwarding path never waits on the
/// writer.
struct TeeStream {
    inner: ChunkStream,
    tx: Option<mpsc::UnboundedSender<TeeEvent>>,
}

impl TeeStream {
    fn new(inner: ChunkStream, tx: mpsc::UnboundedSender<TeeEvent>) -> Self {
        Self {
            inner,
            tx: Some(tx),
        }
    }
}

impl Stream for TeeStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(tx) = &this.tx {
                    // Cloning Bytes is a refcount bump, not a copy.
                    if tx.send(TeeEvent::Chunk(chunk.clone())).is_err() {
                        this.tx = None;
                    }
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.tx = None;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if let Some(tx) = this.tx.take() {
                    let _ = tx.send(TeeEvent::End);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Replays teed chunks as a content stream for the storage write. Errors
/// with `UnexpectedEof` when the channel closes without a clean `End`, which
/// fails the (atomic) storage put and discards the partial copy.
struct CachedBody {
    rx: mpsc::UnboundedReceiver<TeeEvent>,
    done: bool,
}

impl Stream for CachedBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(TeeEvent::Chunk(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(TeeEvent::End)) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(Some(Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "remote body truncated before completion",
                ))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Persist the teed body into storage off the forwarding path. Failures are
/// logged and swallowed; the response to the caller is unaffected.
fn spawn_cache_writer(
    storage: Arc<dyn BlobStore>,
    key: Key,
    rx: mpsc::UnboundedReceiver<TeeEvent>,
    size: Option<u64>,
) {
    tokio::spawn(async move {
        let body = Content::new(CachedBody { rx, done: false }, size);
        match storage.put(&key, body).await {
            Ok(()) => tracing::debug!(key = %key, "persisted proxied blob"),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "failed to persist proxied blob");
            }
        }
    });
}
