//! Blob delete handler.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Removes the blob at the key; 204 when it existed, 404 otherwise.
pub struct Delete {
    storage: Arc<dyn BlobStore>,
}

impl Delete {
    pub fn new(storage: Arc<dyn BlobStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler for Delete {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = req.key()?;
        self.storage.delete(&key).await?;
        tracing::debug!(key = %key, "deleted blob");

        Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
