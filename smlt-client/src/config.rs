//! HTTP transport configuration with sensible defaults.
//!
//! [`HttpConfig`] controls the timeouts and User-Agent of the single
//! [`reqwest::Client`] shared by every similarity lookup. The transport
//! timeout is the only bound on how long a lookup can take.

use serde::{Deserialize, Serialize};

use crate::error::SmltError;

/// Default User-Agent sent to the search backend.
pub const DEFAULT_USER_AGENT: &str = concat!("smlt-client/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP transport used to reach the search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    pub timeout_seconds: u64,
    /// TCP connect timeout in seconds.
    pub connect_timeout_seconds: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            connect_timeout_seconds: 2,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `connect_timeout_seconds` must be greater than 0
    /// - `connect_timeout_seconds` must be <= `timeout_seconds`
    pub fn validate(&self) -> Result<(), SmltError> {
        if self.timeout_seconds == 0 {
            return Err(SmltError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(SmltError::Config(
                "connect_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.connect_timeout_seconds > self.timeout_seconds {
            return Err(SmltError::Config(
                "connect_timeout_seconds must be <= timeout_seconds".into(),
            ));
        }
        Ok(())
    }
}
