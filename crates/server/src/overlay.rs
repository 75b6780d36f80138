//! Metadata response overlay.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Header carrying the blob's MD5 digest.
pub const MD5_HEADER: HeaderName = HeaderName::from_static("x-artipie-md5");
/// Header carrying the blob's creation timestamp.
pub const CREATED_AT_HEADER: HeaderName = HeaderName::from_static("x-artipie-createdat");
/// Header carrying the blob's size in bytes.
pub const SIZE_HEADER: HeaderName = HeaderName::from_static("x-artipie-size");

/// Wraps a read handler and, when the request carries `meta=true` and the
/// key exists in storage, merges the blob's metadata headers onto the
/// wrapped response.
///
/// The wrapped handler always runs first and its status and body are never
/// altered; the overlay only ever adds headers.
pub struct MetaOverlay {
    inner: Arc<dyn Handler>,
    storage: Arc<dyn BlobStore>,
}

impl MetaOverlay {
    pub fn new(inner: Arc<dyn Handler>, storage: Arc<dyn BlobStore>) -> Self {
        Self { inner, storage }
    }
}

#[async_trait]
impl Handler for MetaOverlay {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = if req.meta_requested() {
            Some(req.key()?)
        } else {
            None
        };

        let mut response = self.inner.handle(req).await?;

        if let Some(key) = key
            && self.storage.exists(&key).await?
        {
            let meta = self.storage.metadata(&key).await?;
            let headers = response.headers_mut();
            headers.insert(MD5_HEADER, header_value(&meta.md5)?);
            headers.insert(CREATED_AT_HEADER, header_value(&meta.created_at_rfc3339())?);
            headers.insert(SIZE_HEADER, header_value(&meta.size.to_string())?);
        }

        Ok(response)
    }
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::Internal(format!("invalid metadata header value: {e}")))
}
