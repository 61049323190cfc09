//! Query construction and transport for the backend's `/smlt` handler.
//!
//! One lookup is exactly one `GET {base_uri}/smlt?...` request. There are
//! no retries. Failures are classified into [`QueryResponse`] variants
//! here and never surface as errors to the caller.

use base64::Engine as _;
use reqwest::StatusCode;
use url::Url;

use crate::config::HttpConfig;
use crate::endpoint::{BackendEndpoint, Credentials};
use crate::error::SmltError;
use crate::http;
use crate::types::SimilarityRequest;

/// Path of the SMLT request handler below a core's base URI.
pub const HANDLER_PATH: &str = "smlt";

/// What came back from a single request to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse {
    /// HTTP 200 with this body.
    Body(String),
    /// Any status other than 200.
    Status(u16),
    /// The backend could not be reached or the body could not be read.
    Transport(String),
}

/// Build the full request URL for a lookup.
///
/// Parameters are appended in a fixed order and form-urlencoded. `q=*:*`
/// with `rows=0` keeps the backend from returning a regular result list
/// next to the handler's payload.
///
/// # Errors
///
/// Returns [`SmltError::Config`] if the endpoint's base URI is not a valid URL.
pub fn build_query_url(
    request: &SimilarityRequest,
    endpoint: &BackendEndpoint,
) -> Result<Url, SmltError> {
    let raw = format!("{}/{HANDLER_PATH}", endpoint.base_uri.trim_end_matches('/'));
    let mut url = Url::parse(&raw)
        .map_err(|e| SmltError::Config(format!("invalid backend base URI {raw:?}: {e}")))?;

    url.query_pairs_mut()
        .append_pair("smlt", "true")
        .append_pair("smlt.id", &request.document_id)
        .append_pair("smlt.count", &request.count.to_string())
        .append_pair("smlt.mode", request.mode.as_str())
        .append_pair("smlt.vectorWeight", &request.vector_weight.to_string())
        .append_pair("smlt.mltWeight", &request.mlt_weight.to_string())
        .append_pair("q", "*:*")
        .append_pair("rows", "0")
        .append_pair("wt", "json");

    Ok(url)
}

/// `Authorization` header value for the credentials, if they are complete.
pub fn basic_auth_header(credentials: &Credentials) -> Option<String> {
    let (username, password) = credentials.complete()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    Some(format!("Basic {encoded}"))
}

/// Sends similarity lookups to the search backend.
///
/// Holds one [`reqwest::Client`]; clone it cheaply to share between tasks.
#[derive(Debug, Clone)]
pub struct SmltClient {
    client: reqwest::Client,
}

impl SmltClient {
    /// Create a client from transport configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SmltError`] if the config is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, SmltError> {
        Ok(Self {
            client: http::build_client(config)?,
        })
    }

    /// Wrap an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Run one lookup against `endpoint`.
    ///
    /// Never fails: transport problems become [`QueryResponse::Transport`]
    /// (logged at error level), other statuses become
    /// [`QueryResponse::Status`] (logged at warn level).
    pub async fn query(
        &self,
        request: &SimilarityRequest,
        endpoint: &BackendEndpoint,
    ) -> QueryResponse {
        let document_id = request.document_id.as_str();

        let url = match build_query_url(request, endpoint) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(document_id, error = %e, "SMLT request could not be built");
                return QueryResponse::Transport(e.to_string());
            }
        };

        tracing::debug!(document_id, base_uri = %endpoint.base_uri, "sending SMLT request");

        let mut builder = self.client.get(url);
        if let Some(value) = endpoint.credentials.as_ref().and_then(basic_auth_header) {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(document_id, error = %e, "SMLT request failed");
                return QueryResponse::Transport(format!("SMLT request failed: {e}"));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(document_id, status = status.as_u16(), "SMLT request returned non-200 status");
            return QueryResponse::Status(status.as_u16());
        }

        match response.text().await {
            Ok(body) => {
                tracing::trace!(document_id, bytes = body.len(), "SMLT response received");
                QueryResponse::Body(body)
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "SMLT response read failed");
                QueryResponse::Transport(format!("SMLT response read failed: {e}"))
            }
        }
    }
}
