//! Blob upload handler.

use crate::dispatch::{Handler, Inbound};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Stores the request body at the key derived from the path.
pub struct Upload {
    storage: Arc<dyn BlobStore>,
}

impl Upload {
    pub fn new(storage: Arc<dyn BlobStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Handler for Upload {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        let key = req.key()?;
        self.storage.put(&key, req.body).await?;
        tracing::debug!(key = %key, "stored blob");

        Response::builder()
            .status(StatusCode::CREATED)
            .body(Body::empty())
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}
