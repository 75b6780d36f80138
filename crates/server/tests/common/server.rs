//! Server test utilities.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use depot_core::config::AppConfig;
use depot_server::{AppState, create_app};
use tower::ServiceExt;

/// A test gateway with its state.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a gateway over in-memory storage with free access.
    pub async fn new() -> Self {
        Self::with_config(AppConfig::for_testing()).await
    }

    /// Create a gateway from the given configuration.
    pub async fn with_config(config: AppConfig) -> Self {
        let storage = depot_storage::from_config(&config.storage)
            .await
            .expect("failed to create storage backend");
        let state = AppState::new(config, storage).expect("failed to create app state");
        let router = create_app(state.clone());
        Self { router, state }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        headers: &[(&str, &str)],
        body: Option<&[u8]>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        send(&self.router, method, uri, headers, body).await
    }
}

/// Send a request to a router, returning status, headers, and body.
#[allow(dead_code)]
pub async fn send(
    router: &axum::Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&[u8]>,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(bytes) => Body::from(bytes.to_vec()),
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes)
}

/// Basic auth header value for `username:password`.
#[allow(dead_code)]
pub fn basic_auth(username: &str, password: &str) -> String {
    use base64::{Engine as _, engine::general_purpose};
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{username}:{password}"))
    )
}
