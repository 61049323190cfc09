//! Backend endpoint resolution.
//!
//! A site/language pair maps to one search core. The [`EndpointResolver`]
//! trait is the seam where the hosting application plugs in its own
//! connection management; [`StaticResolver`] and [`ConnectionTable`] cover
//! single-core and configuration-driven deployments.

use std::collections::HashMap;
use std::fmt;

use crate::error::SmltError;

/// HTTP Basic credentials for a search core.
///
/// A missing password models an incomplete credential set, which is
/// treated as "no authentication".
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    /// Complete username/password credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Credentials with a username but no password.
    pub fn username_only(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }

    /// Returns the `(username, password)` pair if both are present.
    pub fn complete(&self) -> Option<(&str, &str)> {
        self.password
            .as_deref()
            .map(|password| (self.username.as_str(), password))
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Network location and credentials of a search core's read endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    /// Core base URI without trailing slash, e.g. `http://solr:8983/solr/core_en`.
    pub base_uri: String,
    pub credentials: Option<Credentials>,
}

impl BackendEndpoint {
    /// Create an endpoint without credentials. Trailing slashes are removed.
    pub fn new(base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        Self {
            base_uri: base_uri.trim_end_matches('/').to_owned(),
            credentials: None,
        }
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Resolves the search endpoint for a site root and language.
///
/// Implementations must be `Send + Sync`: one resolver is shared by every
/// concurrent lookup.
pub trait EndpointResolver: Send + Sync {
    /// Resolve the read endpoint for `site_root_id` / `language_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SmltError::Resolution`] if the site or language has no
    /// configured search connection.
    fn resolve(&self, site_root_id: u32, language_id: u32) -> Result<BackendEndpoint, SmltError>;
}

impl<T: EndpointResolver + ?Sized> EndpointResolver for &T {
    fn resolve(&self, site_root_id: u32, language_id: u32) -> Result<BackendEndpoint, SmltError> {
        (**self).resolve(site_root_id, language_id)
    }
}

impl<T: EndpointResolver + ?Sized> EndpointResolver for std::sync::Arc<T> {
    fn resolve(&self, site_root_id: u32, language_id: u32) -> Result<BackendEndpoint, SmltError> {
        (**self).resolve(site_root_id, language_id)
    }
}

/// Resolver that answers every site/language with the same endpoint.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    endpoint: BackendEndpoint,
}

impl StaticResolver {
    pub fn new(endpoint: BackendEndpoint) -> Self {
        Self { endpoint }
    }
}

impl EndpointResolver for StaticResolver {
    fn resolve(&self, _site_root_id: u32, _language_id: u32) -> Result<BackendEndpoint, SmltError> {
        Ok(self.endpoint.clone())
    }
}

/// Resolver over an explicit `(site_root_id, language_id) -> endpoint` table.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: HashMap<(u32, u32), BackendEndpoint>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the endpoint for a site/language pair, replacing any previous one.
    pub fn insert(&mut self, site_root_id: u32, language_id: u32, endpoint: BackendEndpoint) {
        self.connections
            .insert((site_root_id, language_id), endpoint);
    }

    /// Builder form of [`ConnectionTable::insert`].
    pub fn with_connection(
        mut self,
        site_root_id: u32,
        language_id: u32,
        endpoint: BackendEndpoint,
    ) -> Self {
        self.insert(site_root_id, language_id, endpoint);
        self
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl EndpointResolver for ConnectionTable {
    fn resolve(&self, site_root_id: u32, language_id: u32) -> Result<BackendEndpoint, SmltError> {
        self.connections
            .get(&(site_root_id, language_id))
            .cloned()
            .ok_or_else(|| {
                SmltError::Resolution(format!(
                    "no search connection for site root {site_root_id}, language {language_id}"
                ))
            })
    }
}
