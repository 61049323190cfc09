//! Shared HTTP client for search backend requests.

use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::SmltError;

/// Build a [`reqwest::Client`] configured for SMLT lookups.
///
/// The client has:
/// - Whole-request and connect timeouts from config
/// - The configured User-Agent
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SmltError::Config`] if the config is invalid, or
/// [`SmltError::Http`] if the client cannot be constructed.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, SmltError> {
    config.validate()?;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| SmltError::Http(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let client = build_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = HttpConfig {
            user_agent: "SimilarContent/2.0".into(),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_rejects_invalid_config() {
        let config = HttpConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = build_client(&config).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
