//! Blob download handlers.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use crate::proxy::{FetchOutcome, ProxyCache};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Streams a blob out of local storage.
pub struct Download {
    storage: Arc<dyn BlobStore>,
}

impl Download {
    pub fn new(storage: Arc<dyn BlobStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler for Download {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = req.key()?;
        let content = self.storage.get(&key).await?;

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream");
        if let Some(size) = content.size() {
            builder = builder.header(header::CONTENT_LENGTH, size);
        }
        builder
            .body(Body::from_stream(content.into_stream()))
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}

/// Streams a blob fetched through the proxy cache.
///
/// An absent outcome covers both a remote 404 and a remote failure; the
/// client cannot tell them apart.
pub struct ProxyDownload {
    proxy: Arc<ProxyCache>,
}

impl ProxyDownload {
    pub fn new(proxy: Arc<ProxyCache>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl Handler for ProxyDownload {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = req.key()?;
        match self.proxy.fetch(&key).await {
            FetchOutcome::Found { headers, content } => {
                let mut response = Response::builder()
                    .status(StatusCode::OK)
                    .body(Body::from_stream(content.into_stream()))
                    .map_err(|e| ApiError::Internal(e.to_string()))?;
                // The remote's header metadata is preserved onto the response.
                *response.headers_mut() = headers;
                Ok(response)
            }
            FetchOutcome::Absent => Err(ApiError::NotFound(key.to_string())),
        }
    }
}
