//! Blob listing handler.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use crate::format::BlobListFormat;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Renders the keys under the request path's prefix in one listing format.
pub struct ListBlobs {
    storage: Arc<dyn BlobStore>,
    format: BlobListFormat,
}

impl ListBlobs {
    pub fn new(storage: Arc<dyn BlobStore>, format: BlobListFormat) -> Self {
        Self { storage, format }
    }
}

#[async_trait]
impl Handler for ListBlobs {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let prefix = req.key()?;
        let keys = self.storage.list(&prefix).await?;
        let rendered = self.format.apply(&keys);

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, self.format.mime())
            .header(header::CONTENT_LENGTH, rendered.len())
            .body(Body::from(rendered))
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
