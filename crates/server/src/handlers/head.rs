//! Metadata-only (HEAD) handler.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Answers with the blob's size and content type, no body.
pub struct Head {
    storage: Arc<dyn BlobStore>,
}

impl Head {
    pub fn new(storage: Arc<dyn BlobStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler for Head {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = req.key()?;
        let meta = self.storage.metadata(&key).await?;

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, meta.size)
            .body(Body::empty())
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
