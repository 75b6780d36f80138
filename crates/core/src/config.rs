//! Configuration types shared across crates.

use crate::action::Action;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Local filesystem backend rooted at `path`.
    Filesystem { path: PathBuf },
    /// In-memory backend. Contents are lost on restart.
    InMemory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::InMemory
    }
}

/// Remote origin configuration for proxy-cache mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL of the remote origin, e.g. "https://files.example.com/".
    pub origin: String,
}

/// A configured user with its granted actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    /// Granted actions: "read", "write", "delete".
    pub actions: Vec<String>,
}

/// Authentication configuration.
///
/// An empty user table means free access: every caller is anonymous and
/// every action is allowed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// When set, GET downloads fetch through the remote origin.
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        for user in &self.auth.users {
            if user.username.is_empty() {
                return Err(Error::Config("user with empty username".to_string()));
            }
            for action in &user.actions {
                Action::parse(action).map_err(|_| {
                    Error::Config(format!(
                        "unknown action {:?} for user {}",
                        action, user.username
                    ))
                })?;
            }
        }
        if let Some(proxy) = &self.proxy
            && proxy.origin.is_empty()
        {
            return Err(Error::Config("proxy.origin must not be empty".to_string()));
        }
        Ok(())
    }

    /// Create a test configuration with in-memory storage and free access.
    ///
    /// **For testing only.**
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::InMemory,
            proxy: None,
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_testing()
    }
}
