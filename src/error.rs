//! Error types for the similar-content application layer.
//!
//! Lookups themselves never fail; these errors cover startup (loading and
//! validating configuration, building the service) and the host protocol.

/// Top-level error type for the similar-content application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file missing, unreadable or invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The similarity client could not be set up.
    #[error("client error: {0}")]
    Client(#[from] smlt_client::SmltError),

    /// Host protocol read/write error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
