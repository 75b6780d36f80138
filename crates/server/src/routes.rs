//! Route table construction and transport mounting.

use crate::dispatch::{Handler, Inbound, MethodNotAllowed, RoutePredicate, Router};
use crate::format::BlobListFormat;
use crate::handlers::{Delete, Download, Head, ListBlobs, ProxyDownload, Upload};
use crate::overlay::MetaOverlay;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{Method, header};
use axum::response::Response;
use depot_core::{Action, Content};
use futures::StreamExt;
use std::io;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the gateway's ordered route table.
///
/// HEAD and GET require read, PUT write, DELETE delete; anything else hits
/// the terminal 405 fallback. GET splits on the Accept header into the
/// three listing formats, with the binary download as the inner fallback.
pub fn build_gateway(state: &AppState) -> Router {
    let storage = state.storage.clone();

    let download: Arc<dyn Handler> = match &state.proxy {
        Some(proxy) => Arc::new(ProxyDownload::new(proxy.clone())),
        None => Arc::new(MetaOverlay::new(
            Arc::new(Download::new(storage.clone())),
            storage.clone(),
        )),
    };

    let get_routes = Router::new(state.authenticator.clone(), state.permissions.clone())
        .route(
            RoutePredicate::HeaderContains(header::ACCEPT, "text/plain".to_string()),
            Action::Read,
            Arc::new(ListBlobs::new(storage.clone(), BlobListFormat::Text)),
        )
        .route(
            RoutePredicate::HeaderContains(header::ACCEPT, "application/json".to_string()),
            Action::Read,
            Arc::new(ListBlobs::new(storage.clone(), BlobListFormat::Json)),
        )
        .route(
            RoutePredicate::HeaderContains(header::ACCEPT, "text/html".to_string()),
            Action::Read,
            Arc::new(ListBlobs::new(storage.clone(), BlobListFormat::Html)),
        )
        .route(RoutePredicate::Always, Action::Read, download);

    Router::new(state.authenticator.clone(), state.permissions.clone())
        .route(
            RoutePredicate::Method(Method::HEAD),
            Action::Read,
            Arc::new(MetaOverlay::new(
                Arc::new(Head::new(storage.clone())),
                storage.clone(),
            )),
        )
        .route(
            RoutePredicate::Method(Method::GET),
            Action::Read,
            Arc::new(get_routes),
        )
        .route(
            RoutePredicate::Method(Method::PUT),
            Action::Write,
            Arc::new(Upload::new(storage.clone())),
        )
        .route(
            RoutePredicate::Method(Method::DELETE),
            Action::Delete,
            Arc::new(Delete::new(storage)),
        )
        .fallback(Arc::new(MethodNotAllowed))
}

/// Mount the gateway on an axum application.
///
/// The transport stays an external collaborator: every request, whatever
/// its path, lands in the axum fallback and goes through the gateway's own
/// ordered dispatch.
pub fn create_app(state: AppState) -> axum::Router {
    let gateway = Arc::new(build_gateway(&state));
    axum::Router::new()
        .fallback(dispatch_any)
        .with_state(gateway)
        .layer(TraceLayer::new_for_http())
}

/// Bridge an axum request into the gateway's request model.
async fn dispatch_any(State(gateway): State<Arc<Router>>, req: axum::extract::Request) -> Response {
    let (parts, body) = req.into_parts();

    let size = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let stream = body
        .into_data_stream()
        .map(|chunk| chunk.map_err(io::Error::other));

    let inbound = Inbound {
        method: parts.method,
        headers: parts.headers,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        body: Content::new(stream, size),
    };

    gateway.dispatch(inbound).await
}
