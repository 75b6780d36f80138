//! HTTP gateway serving binary blobs over pluggable storage.
//!
//! This crate provides the request-shaped half of Depot:
//! - Ordered predicate routing with a permission gate
//! - Blob handlers (download, upload, delete, head, listing)
//! - The fetch-through proxy-cache engine
//! - The metadata response overlay
//! - Listing formatters (text, JSON, HTML)

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod handlers;
pub mod overlay;
pub mod proxy;
pub mod routes;
pub mod state;

pub use dispatch::{Handler, Inbound, Route, RoutePredicate, Router};
pub use error::{ApiError, ApiResult};
pub use routes::{build_gateway, create_app};
pub use state::AppState;
