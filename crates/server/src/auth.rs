//! Authentication and authorization seams.
//!
//! The gateway owns neither credential verification nor permission policy;
//! it only consumes the two traits below. Implementations here cover the
//! two modes the configuration can express: free access (anonymous callers,
//! everything allowed) and a static user table with per-user action grants.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::{Engine as _, engine::general_purpose};
use depot_core::Action;
use depot_core::config::AuthConfig;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Basic credentials extracted from a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Extract Basic credentials from the Authorization header.
    /// Per RFC 7617, the "Basic" scheme is case-insensitive. Missing or
    /// malformed headers yield `None` and the caller stays anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        if value.len() < 6 || !value[..6].eq_ignore_ascii_case("basic ") {
            return None;
        }
        let decoded = general_purpose::STANDARD.decode(value[6..].trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// The caller identity resolved by an authenticator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(String),
}

impl Identity {
    /// The identity's display name, used in logs and error messages.
    pub fn name(&self) -> &str {
        match self {
            Self::Anonymous => "anonymous",
            Self::User(name) => name,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Resolves caller credentials to an identity.
pub trait Authenticator: Send + Sync {
    fn identify(&self, credentials: Option<Credentials>) -> Identity;
}

/// Decides whether an identity may perform an action.
pub trait Permissions: Send + Sync {
    fn allowed(&self, identity: &Identity, action: Action) -> bool;
}

/// Treats every caller as anonymous, regardless of credentials.
pub struct AnonymousAuth;

impl Authenticator for AnonymousAuth {
    fn identify(&self, _credentials: Option<Credentials>) -> Identity {
        Identity::Anonymous
    }
}

/// Authenticates against a configured username/password table.
/// Unknown users and wrong passwords both resolve to anonymous.
pub struct ConfigUsers {
    passwords: HashMap<String, String>,
}

impl ConfigUsers {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            passwords: config
                .users
                .iter()
                .map(|u| (u.username.clone(), u.password.clone()))
                .collect(),
        }
    }
}

impl Authenticator for ConfigUsers {
    fn identify(&self, credentials: Option<Credentials>) -> Identity {
        match credentials {
            Some(c) if self.passwords.get(&c.username) == Some(&c.password) => {
                Identity::User(c.username)
            }
            _ => Identity::Anonymous,
        }
    }
}

/// Allows every action for every identity.
pub struct AllowAll;

impl Permissions for AllowAll {
    fn allowed(&self, _identity: &Identity, _action: Action) -> bool {
        true
    }
}

/// Per-user granted action sets; anonymous callers have no grants.
pub struct UserGrants {
    grants: HashMap<String, HashSet<Action>>,
}

impl UserGrants {
    pub fn new(config: &AuthConfig) -> Self {
        let grants = config
            .users
            .iter()
            .map(|u| {
                let actions = u
                    .actions
                    .iter()
                    .filter_map(|a| Action::parse(a).ok())
                    .collect();
                (u.username.clone(), actions)
            })
            .collect();
        Self { grants }
    }
}

impl Permissions for UserGrants {
    fn allowed(&self, identity: &Identity, action: Action) -> bool {
        match identity {
            Identity::User(name) => self.grants.get(name).is_some_and(|s| s.contains(&action)),
            Identity::Anonymous => false,
        }
    }
}

/// Build the authenticator/permissions pair from configuration.
///
/// An empty user table means free access, matching a gateway deployed
/// without credentials.
pub fn from_config(config: &AuthConfig) -> (Arc<dyn Authenticator>, Arc<dyn Permissions>) {
    if config.users.is_empty() {
        (Arc::new(AnonymousAuth), Arc::new(AllowAll))
    } else {
        (
            Arc::new(ConfigUsers::new(config)),
            Arc::new(UserGrants::new(config)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use depot_core::config::UserConfig;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn user_table() -> AuthConfig {
        AuthConfig {
            users: vec![
                UserConfig {
                    username: "alice".to_string(),
                    password: "secret".to_string(),
                    actions: vec!["read".to_string(), "write".to_string()],
                },
                UserConfig {
                    username: "bob".to_string(),
                    password: "hunter2".to_string(),
                    actions: vec!["read".to_string()],
                },
            ],
        }
    }

    #[test]
    fn parses_basic_credentials() {
        // "alice:secret"
        let headers = headers_with_auth("Basic YWxpY2U6c2VjcmV0");
        let creds = Credentials::from_headers(&headers).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with_auth("basic YWxpY2U6c2VjcmV0");
        assert!(Credentials::from_headers(&headers).is_some());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(Credentials::from_headers(&headers_with_auth("Bearer abc")).is_none());
        assert!(Credentials::from_headers(&headers_with_auth("Basic !!!not-base64")).is_none());
        assert!(Credentials::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn config_users_identify() {
        let auth = ConfigUsers::new(&user_table());
        let identity = auth.identify(Some(Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        }));
        assert_eq!(identity, Identity::User("alice".to_string()));

        let wrong = auth.identify(Some(Credentials {
            username: "alice".to_string(),
            password: "nope".to_string(),
        }));
        assert!(wrong.is_anonymous());
        assert!(auth.identify(None).is_anonymous());
    }

    #[test]
    fn user_grants_scope_actions() {
        let perms = UserGrants::new(&user_table());
        let alice = Identity::User("alice".to_string());
        let bob = Identity::User("bob".to_string());

        assert!(perms.allowed(&alice, Action::Write));
        assert!(!perms.allowed(&alice, Action::Delete));
        assert!(perms.allowed(&bob, Action::Read));
        assert!(!perms.allowed(&bob, Action::Write));
        assert!(!perms.allowed(&Identity::Anonymous, Action::Read));
    }

    #[test]
    fn empty_table_means_free_access() {
        let (auth, perms) = from_config(&AuthConfig::default());
        let identity = auth.identify(None);
        assert!(identity.is_anonymous());
        assert!(perms.allowed(&identity, Action::Delete));
    }
}
