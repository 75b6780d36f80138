//! Application state shared across handlers.

use crate::auth::{self, Authenticator, Permissions};
use crate::proxy::ProxyCache;
use depot_core::config::AppConfig;
use depot_storage::BlobStore;
use std::sync::Arc;

/// Shared application state: configuration plus the collaborator handles
/// constructed at startup. Immutable for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Blob storage backend.
    pub storage: Arc<dyn BlobStore>,
    /// Caller identity resolution.
    pub authenticator: Arc<dyn Authenticator>,
    /// Permission oracle.
    pub permissions: Arc<dyn Permissions>,
    /// Proxy-cache engine, present when a remote origin is configured.
    pub proxy: Option<Arc<ProxyCache>>,
}

impl AppState {
    /// Create application state from validated configuration.
    pub fn new(config: AppConfig, storage: Arc<dyn BlobStore>) -> depot_core::Result<Self> {
        config.validate()?;

        let (authenticator, permissions) = auth::from_config(&config.auth);
        let proxy = match &config.proxy {
            Some(proxy_config) => Some(Arc::new(ProxyCache::from_config(
                proxy_config,
                storage.clone(),
            )?)),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            storage,
            authenticator,
            permissions,
            proxy,
        })
    }
}
