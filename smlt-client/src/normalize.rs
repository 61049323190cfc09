//! Mapping backend responses onto [`SimilarityResult`].
//!
//! The envelope check is strict (a JSON object carrying a
//! `semanticMoreLikeThis` value), everything inside it is permissive:
//! missing fields take the request's values, document fields are not
//! validated beyond their JSON type, and entries of `docs` that are not
//! objects are skipped.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SmltError};
use crate::query::QueryResponse;
use crate::types::{
    FallbackReason, SimilarDoc, SimilarityOutcome, SimilarityRequest, SimilarityResult,
};

/// Top-level response key under which the handler places its payload.
pub const ENVELOPE_KEY: &str = "semanticMoreLikeThis";

/// Handler payload with every field optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    #[serde(default)]
    source_id: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    num_found: Option<u64>,
    #[serde(default)]
    docs: Option<Vec<Value>>,
}

impl Payload {
    fn into_result(self, request: &SimilarityRequest) -> SimilarityResult {
        let document_id = request.document_id.as_str();
        let docs = self
            .docs
            .unwrap_or_default()
            .into_iter()
            .filter_map(|doc| match doc {
                Value::Object(fields) => Some(SimilarDoc::from(fields)),
                other => {
                    tracing::debug!(document_id, entry = %other, "skipping non-object SMLT doc");
                    None
                }
            })
            .collect();

        SimilarityResult {
            source_id: self
                .source_id
                .unwrap_or_else(|| request.document_id.clone()),
            mode: self
                .mode
                .unwrap_or_else(|| request.mode.as_str().to_owned()),
            num_found: self.num_found.unwrap_or(0),
            docs,
        }
    }
}

/// Normalize the outcome of one backend request.
pub fn normalize(response: &QueryResponse, request: &SimilarityRequest) -> SimilarityOutcome {
    match response {
        QueryResponse::Body(body) => normalize_body(body, request),
        QueryResponse::Status(status) => {
            SimilarityOutcome::fallback(request, FallbackReason::Status(*status))
        }
        QueryResponse::Transport(_) => {
            SimilarityOutcome::fallback(request, FallbackReason::Transport)
        }
    }
}

/// Normalize a 200 response body.
///
/// Falls back to the empty result when the body is not JSON, not an
/// object, has no (or a `null`) `semanticMoreLikeThis` value, or that
/// value does not have the payload's shape.
pub fn normalize_body(body: &str, request: &SimilarityRequest) -> SimilarityOutcome {
    let document_id = request.document_id.as_str();

    match parse_payload(body) {
        Ok(payload) => {
            let result = payload.into_result(request);
            tracing::debug!(document_id, num_found = result.num_found, "SMLT lookup succeeded");
            SimilarityOutcome::Found(result)
        }
        Err(e) => {
            tracing::debug!(document_id, error = %e, "SMLT response is malformed");
            SimilarityOutcome::fallback(request, FallbackReason::Malformed)
        }
    }
}

fn parse_payload(body: &str) -> Result<Payload> {
    let mut parsed: Value = serde_json::from_str(body)
        .map_err(|e| SmltError::Parse(format!("response is not JSON: {e}")))?;

    let payload = match parsed.as_object_mut().and_then(|obj| obj.remove(ENVELOPE_KEY)) {
        Some(Value::Null) | None => {
            return Err(SmltError::Parse(format!("response has no {ENVELOPE_KEY} payload")));
        }
        Some(payload) => payload,
    };

    serde_json::from_value(payload)
        .map_err(|e| SmltError::Parse(format!("payload has unexpected shape: {e}")))
}
