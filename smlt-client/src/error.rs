//! Error types for the smlt-client crate.
//!
//! These errors never reach the rendering adapters: the service degrades
//! every failure to the empty similarity result. They exist so that the
//! individual layers (resolver, transport, config) can report what went
//! wrong, and so that the failure can be logged with a stable message.
//! Credentials never appear in error messages.

/// Errors that can occur while preparing or executing a similarity lookup.
#[derive(Debug, thiserror::Error)]
pub enum SmltError {
    /// No backend endpoint could be resolved for a site/language pair.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// An HTTP request to the search backend failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend response could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid client or endpoint configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for smlt-client results.
pub type Result<T> = std::result::Result<T, SmltError>;
