//! Configuration for the similar-content application.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! site_hash = "3f2a9c"
//!
//! [http]
//! timeout_seconds = 5
//!
//! [defaults]
//! count = 5
//! mode = "hybrid"
//!
//! [[connections]]
//! site_root_id = 1
//! language_id = 0
//! base_uri = "http://solr:8983/solr/core_en"
//! username = "solr"
//! password = "secret"
//!
//! [[connections]]
//! site_root_id = 7
//! site_hash = "b81e04"
//! base_uri = "http://solr:8983/solr/shop_en"
//! ```
//!
//! `site_hash` at the top level applies to every site root whose
//! connections do not set their own.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use smlt_client::{BackendEndpoint, ConnectionTable, Credentials, HttpConfig};

use crate::document_id::SiteHashes;
use crate::error::{AppError, Result};
use crate::settings::PluginSettings;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SMLT_CONFIG";

/// The read endpoint of one site/language search core.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub site_root_id: u32,
    #[serde(default)]
    pub language_id: u32,
    pub base_uri: String,
    /// Index hash of this connection's site, overriding the top-level one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("site_root_id", &self.site_root_id)
            .field("language_id", &self.language_id)
            .field("base_uri", &self.base_uri)
            .field("site_hash", &self.site_hash)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl ConnectionConfig {
    /// The endpoint this connection describes. A password without a
    /// username is ignored.
    pub fn endpoint(&self) -> BackendEndpoint {
        let endpoint = BackendEndpoint::new(self.base_uri.as_str());
        match &self.username {
            Some(username) => endpoint.with_credentials(Credentials {
                username: username.clone(),
                password: self.password.clone(),
            }),
            None => endpoint,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hash identifying the site in index document ids, for site roots
    /// whose connections do not set one.
    pub site_hash: String,
    /// Transport settings for backend requests.
    pub http: HttpConfig,
    /// Site-wide element settings, overridden per element.
    pub defaults: PluginSettings,
    /// Search cores per site and language.
    pub connections: Vec<ConnectionConfig>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the text is not valid TOML for this schema.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - the HTTP settings are valid
    /// - at least one connection is configured
    /// - no connection has an empty `base_uri`
    /// - no site/language pair is configured twice
    /// - every site root has a non-empty site hash, and only one
    pub fn validate(&self) -> Result<()> {
        self.http
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if self.connections.is_empty() {
            return Err(AppError::Config(
                "at least one connection must be configured".into(),
            ));
        }

        let mut seen = HashSet::new();
        for connection in &self.connections {
            if connection.base_uri.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "connection for site root {} language {} has an empty base_uri",
                    connection.site_root_id, connection.language_id
                )));
            }
            if !seen.insert((connection.site_root_id, connection.language_id)) {
                return Err(AppError::Config(format!(
                    "duplicate connection for site root {} language {}",
                    connection.site_root_id, connection.language_id
                )));
            }
        }

        let mut hashes: HashMap<u32, &str> = HashMap::new();
        for connection in &self.connections {
            let hash = connection
                .site_hash
                .as_deref()
                .unwrap_or(self.site_hash.as_str());
            if hash.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "no site_hash for site root {}",
                    connection.site_root_id
                )));
            }
            match hashes.insert(connection.site_root_id, hash) {
                Some(previous) if previous != hash => {
                    return Err(AppError::Config(format!(
                        "conflicting site_hash for site root {}: {previous} vs {hash}",
                        connection.site_root_id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Index hashes per site root, as used to build page document ids.
    pub fn site_hashes(&self) -> SiteHashes {
        self.connections
            .iter()
            .fold(SiteHashes::new(self.site_hash.as_str()), |hashes, connection| {
                match &connection.site_hash {
                    Some(hash) => hashes.with_site(connection.site_root_id, hash.as_str()),
                    None => hashes,
                }
            })
    }

    /// Build the resolver for the configured connections.
    pub fn connection_table(&self) -> ConnectionTable {
        self.connections
            .iter()
            .fold(ConnectionTable::new(), |table, connection| {
                table.with_connection(
                    connection.site_root_id,
                    connection.language_id,
                    connection.endpoint(),
                )
            })
    }

    /// Returns the default config file path: `~/.config/similar-content/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("similar-content")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("similar-content")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/similar-content/config.toml")
        }
    }

    /// The config path to use: `$SMLT_CONFIG` if set, else the default.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path)
    }
}
