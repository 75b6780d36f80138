//! Ordered predicate routing with a permission gate.
//!
//! Routes are held in a caller-declared sequence and evaluated in order;
//! the first predicate matching the request's method and headers wins. The
//! matched route's required action is checked against the caller identity
//! before its handler runs, so handlers never observe unauthorized calls.

use crate::auth::{Authenticator, Credentials, Identity, Permissions};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use depot_core::{Action, Content, Key};
use std::sync::Arc;

/// An inbound request as the gateway sees it: parsed line and headers plus
/// the not-yet-consumed body stream.
pub struct Inbound {
    pub method: Method,
    pub headers: HeaderMap,
    /// URL path, still percent-encoded as received.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub body: Content,
}

impl Inbound {
    /// The storage key addressed by this request's path.
    pub fn key(&self) -> ApiResult<Key> {
        Key::from_path(&self.path).map_err(|e| ApiError::BadRequest(e.to_string()))
    }

    /// The raw value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let query = self.query.as_deref()?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == name).then_some(v)
        })
    }

    /// Whether the `meta` query flag is set (case-insensitive `true`).
    pub fn meta_requested(&self) -> bool {
        self.query_param("meta")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// A request handler bound to a route.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: Inbound) -> ApiResult<Response>;
}

/// Predicate over a request's method and headers.
pub enum RoutePredicate {
    /// Exact method match.
    Method(Method),
    /// Any value of the named header contains the pattern.
    HeaderContains(HeaderName, String),
    /// Matches every request; reserved for fallback routes.
    Always,
}

impl RoutePredicate {
    pub fn matches(&self, method: &Method, headers: &HeaderMap) -> bool {
        match self {
            Self::Method(m) => m == method,
            Self::HeaderContains(name, pattern) => headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .any(|v| v.contains(pattern.as_str())),
            Self::Always => true,
        }
    }
}

/// A predicate/action/handler binding. Routes with `action: None` skip the
/// permission gate (the terminal 405 fallback).
pub struct Route {
    predicate: RoutePredicate,
    action: Option<Action>,
    handler: Arc<dyn Handler>,
}

/// First-match-wins router over an ordered route sequence.
///
/// The route table is immutable once built; dispatch holds no per-request
/// state. A `Router` is itself a `Handler`, so an outer method-keyed route
/// can bind an inner router keyed by header predicates.
pub struct Router {
    routes: Vec<Route>,
    authenticator: Arc<dyn Authenticator>,
    permissions: Arc<dyn Permissions>,
}

impl Router {
    pub fn new(authenticator: Arc<dyn Authenticator>, permissions: Arc<dyn Permissions>) -> Self {
        Self {
            routes: Vec::new(),
            authenticator,
            permissions,
        }
    }

    /// Append a permission-gated route.
    pub fn route(
        mut self,
        predicate: RoutePredicate,
        action: Action,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.routes.push(Route {
            predicate,
            action: Some(action),
            handler,
        });
        self
    }

    /// Append the terminal always-true route, bypassing the permission gate.
    pub fn fallback(mut self, handler: Arc<dyn Handler>) -> Self {
        self.routes.push(Route {
            predicate: RoutePredicate::Always,
            action: None,
            handler,
        });
        self
    }

    /// Dispatch a request to the first matching route.
    pub async fn dispatch(&self, req: Inbound) -> Response {
        for route in &self.routes {
            if !route.predicate.matches(&req.method, &req.headers) {
                continue;
            }
            if let Some(action) = route.action {
                let credentials = Credentials::from_headers(&req.headers);
                let identity = self.authenticator.identify(credentials);
                if !self.permissions.allowed(&identity, action) {
                    tracing::debug!(
                        identity = identity.name(),
                        action = %action,
                        "permission denied"
                    );
                    return deny(&identity);
                }
            }
            return match route.handler.handle(req).await {
                Ok(response) => response,
                Err(err) => err.into_response(),
            };
        }
        ApiError::MethodNotAllowed.into_response()
    }
}

#[async_trait]
impl Handler for Router {
    async fn handle(&self, req: Inbound) -> ApiResult<Response> {
        Ok(self.dispatch(req).await)
    }
}

/// Terminal handler for the reserved fallback route.
pub struct MethodNotAllowed;

#[async_trait]
impl Handler for MethodNotAllowed {
    async fn handle(&self, _req: Inbound) -> ApiResult<Response> {
        Err(ApiError::MethodNotAllowed)
    }
}

/// 401 for anonymous callers (the client may be able to authenticate),
/// 403 for callers who did authenticate but lack the grant.
fn deny(identity: &Identity) -> Response {
    match identity {
        Identity::Anonymous => {
            let mut response =
                ApiError::Unauthorized("authentication required".to_string()).into_response();
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"depot\""),
            );
            response
        }
        Identity::User(name) => {
            ApiError::Forbidden(format!("action not granted to {name}")).into_response()
        }
    }
}
