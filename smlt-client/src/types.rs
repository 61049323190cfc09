//! Core types for similarity requests and results.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of similar documents requested.
pub const DEFAULT_COUNT: u32 = 5;
/// Default weight of the vector (semantic) signal in hybrid mode.
pub const DEFAULT_VECTOR_WEIGHT: f64 = 0.7;
/// Default weight of the lexical more-like-this signal in hybrid mode.
pub const DEFAULT_MLT_WEIGHT: f64 = 0.3;

/// Which similarity signals the backend handler should use.
///
/// The mode is string-typed on the wire. Unknown values are kept verbatim
/// in [`SimilarityMode::Other`] and forwarded; the backend decides what
/// to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SimilarityMode {
    /// Blend vector and lexical scores using the request weights.
    #[default]
    Hybrid,
    /// Vector (semantic) similarity only.
    VectorOnly,
    /// Lexical more-like-this only.
    MltOnly,
    /// Any other value, forwarded as-is.
    Other(String),
}

impl SimilarityMode {
    /// Parse a mode leniently.
    ///
    /// Known names match case-insensitively after trimming; an empty string
    /// means [`SimilarityMode::Hybrid`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::Hybrid;
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "hybrid" => Self::Hybrid,
            "vector_only" => Self::VectorOnly,
            "mlt_only" => Self::MltOnly,
            _ => {
                tracing::debug!(mode = trimmed, "unrecognised similarity mode, forwarding as-is");
                Self::Other(trimmed.to_owned())
            }
        }
    }

    /// Returns the wire name of this mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Hybrid => "hybrid",
            Self::VectorOnly => "vector_only",
            Self::MltOnly => "mlt_only",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SimilarityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SimilarityMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for SimilarityMode {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<SimilarityMode> for String {
    fn from(mode: SimilarityMode) -> Self {
        match mode {
            SimilarityMode::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

/// A single "find similar content" lookup.
///
/// Built per call and never mutated afterwards. Use
/// [`SimilarityRequest::new`] for the defaults and the `with_*` methods to
/// override them. Weights are conventionally in `[0.0, 1.0]` but are not
/// clamped; the backend interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityRequest {
    /// Index id of the source document.
    pub document_id: String,
    /// Root page of the site whose search core is queried.
    pub site_root_id: u32,
    /// Language whose search core is queried.
    #[serde(default)]
    pub language_id: u32,
    /// Maximum number of similar documents to return.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Similarity signals to use.
    #[serde(default)]
    pub mode: SimilarityMode,
    /// Weight of the vector signal.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,
    /// Weight of the lexical signal.
    #[serde(default = "default_mlt_weight")]
    pub mlt_weight: f64,
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_vector_weight() -> f64 {
    DEFAULT_VECTOR_WEIGHT
}

fn default_mlt_weight() -> f64 {
    DEFAULT_MLT_WEIGHT
}

impl SimilarityRequest {
    /// Create a request for `document_id` on the given site with default
    /// language (0), count (5), mode (hybrid) and weights (0.7 / 0.3).
    pub fn new(document_id: impl Into<String>, site_root_id: u32) -> Self {
        Self {
            document_id: document_id.into(),
            site_root_id,
            language_id: 0,
            count: DEFAULT_COUNT,
            mode: SimilarityMode::Hybrid,
            vector_weight: DEFAULT_VECTOR_WEIGHT,
            mlt_weight: DEFAULT_MLT_WEIGHT,
        }
    }

    /// Set the language id.
    pub fn with_language(mut self, language_id: u32) -> Self {
        self.language_id = language_id;
        self
    }

    /// Set the maximum number of results.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the similarity mode.
    pub fn with_mode(mut self, mode: impl Into<SimilarityMode>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Set the vector and lexical weights.
    pub fn with_weights(mut self, vector_weight: f64, mlt_weight: f64) -> Self {
        self.vector_weight = vector_weight;
        self.mlt_weight = mlt_weight;
        self
    }
}

/// Per-signal score details, present when the backend runs with `debugQuery`.
///
/// A score that is missing or not a number is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct ScoreBreakdown {
    /// Normalised vector similarity score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_score: Option<f64>,
    /// Normalised lexical more-like-this score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mlt_score: Option<f64>,
    /// Weighted combination of both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
}

impl From<Map<String, Value>> for ScoreBreakdown {
    fn from(map: Map<String, Value>) -> Self {
        let score = |key: &str| map.get(key).and_then(Value::as_f64);
        Self {
            vector_score: score("vectorScore"),
            mlt_score: score("mltScore"),
            combined_score: score("combinedScore"),
        }
    }
}

/// One similar document as returned by the backend.
///
/// Every known field is optional. A known field whose JSON type does not
/// match (a numeric `title`, a multivalued `category`, ...) is left `None`
/// and its raw value kept in [`SimilarDoc::extra`] together with the
/// fields this crate does not know about, so the document is passed
/// through rather than rejected. Numeric ids are read as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct SimilarDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Combined relevance score (higher is better).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    /// Unknown fields and mistyped known fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for SimilarDoc {
    fn from(mut extra: Map<String, Value>) -> Self {
        let id = take_field(&mut extra, "id", |value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let title = take_string(&mut extra, "title");
        let content = take_string(&mut extra, "content");
        let category = take_string(&mut extra, "category");
        let url = take_string(&mut extra, "url");
        let score = take_field(&mut extra, "score", Value::as_f64);
        let score_breakdown = take_field(&mut extra, "scoreBreakdown", |value| {
            value.as_object().cloned().map(ScoreBreakdown::from)
        });

        Self {
            id,
            title,
            content,
            category,
            url,
            score,
            score_breakdown,
            extra,
        }
    }
}

/// Remove `key` from `map` if `convert` accepts its value; otherwise leave
/// the raw value where it is. `null` counts as absent.
fn take_field<T>(
    map: &mut Map<String, Value>,
    key: &str,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    if map.get(key).is_some_and(Value::is_null) {
        map.remove(key);
        return None;
    }
    let converted = map.get(key).and_then(convert)?;
    map.remove(key);
    Some(converted)
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    take_field(map, key, |value| value.as_str().map(str::to_owned))
}

/// The normalized answer to a similarity lookup.
///
/// Always well-formed: on any failure the empty result produced by
/// [`SimilarityResult::empty`] stands in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    /// Id of the queried document.
    pub source_id: String,
    /// Effective similarity mode.
    pub mode: String,
    /// Number of similar documents found.
    pub num_found: u64,
    /// Similar documents, most relevant first.
    pub docs: Vec<SimilarDoc>,
}

impl SimilarityResult {
    /// The empty-result fallback for a document and mode.
    pub fn empty(document_id: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            source_id: document_id.into(),
            mode: mode.into(),
            num_found: 0,
            docs: Vec::new(),
        }
    }

    /// The empty-result fallback seeded from a request.
    pub fn empty_for(request: &SimilarityRequest) -> Self {
        Self::empty(request.document_id.as_str(), request.mode.as_str())
    }

    /// Returns `true` when no documents were found.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Why a lookup degraded to the empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// No backend endpoint for the site/language.
    Resolution,
    /// The backend could not be reached.
    Transport,
    /// The backend answered with a non-200 status.
    Status(u16),
    /// The backend answered 200 with a body that is not a similarity payload.
    Malformed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => f.write_str("endpoint resolution failed"),
            Self::Transport => f.write_str("transport failure"),
            Self::Status(status) => write!(f, "backend returned HTTP {status}"),
            Self::Malformed => f.write_str("malformed backend response"),
        }
    }
}

/// Outcome of a similarity lookup.
///
/// Adapters only see [`SimilarityOutcome::into_result`], where both variants
/// look the same. The variant itself records whether the backend answered
/// or the result is a stand-in.
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityOutcome {
    /// The backend answered with a similarity payload (possibly with zero docs).
    Found(SimilarityResult),
    /// The lookup failed and the empty result stands in.
    Fallback {
        /// The empty result for the request.
        result: SimilarityResult,
        /// What went wrong.
        reason: FallbackReason,
    },
}

impl SimilarityOutcome {
    /// Build the fallback outcome for a request.
    pub fn fallback(request: &SimilarityRequest, reason: FallbackReason) -> Self {
        Self::Fallback {
            result: SimilarityResult::empty_for(request),
            reason,
        }
    }

    /// Borrow the result regardless of variant.
    pub fn result(&self) -> &SimilarityResult {
        match self {
            Self::Found(result) | Self::Fallback { result, .. } => result,
        }
    }

    /// Take the result regardless of variant.
    pub fn into_result(self) -> SimilarityResult {
        match self {
            Self::Found(result) | Self::Fallback { result, .. } => result,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Found(_) => None,
            Self::Fallback { reason, .. } => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = SimilarityRequest::new("page-42", 1);
        assert_eq!(request.document_id, "page-42");
        assert_eq!(request.site_root_id, 1);
        assert_eq!(request.language_id, 0);
        assert_eq!(request.count, 5);
        assert_eq!(request.mode, SimilarityMode::Hybrid);
        assert!((request.vector_weight - 0.7).abs() < f64::EPSILON);
        assert!((request.mlt_weight - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn request_builders_override_defaults() {
        let request = SimilarityRequest::new("page-42", 1)
            .with_language(2)
            .with_count(3)
            .with_mode("vector_only")
            .with_weights(1.0, 0.0);
        assert_eq!(request.language_id, 2);
        assert_eq!(request.count, 3);
        assert_eq!(request.mode, SimilarityMode::VectorOnly);
        assert!((request.vector_weight - 1.0).abs() < f64::EPSILON);
        assert!(request.mlt_weight.abs() < f64::EPSILON);
    }

    #[test]
    fn weights_are_not_clamped() {
        let request = SimilarityRequest::new("x", 1).with_weights(1.5, -0.2);
        assert!((request.vector_weight - 1.5).abs() < f64::EPSILON);
        assert!((request.mlt_weight + 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn request_deserialize_applies_defaults() {
        let request: SimilarityRequest =
            serde_json::from_str(r#"{"documentId": "page-7", "siteRootId": 3}"#)
                .expect("deserialize");
        assert_eq!(request, SimilarityRequest::new("page-7", 3));
    }

    #[test]
    fn request_deserialize_requires_document_id() {
        let result = serde_json::from_str::<SimilarityRequest>(r#"{"siteRootId": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn mode_parse_known_values() {
        assert_eq!(SimilarityMode::parse("hybrid"), SimilarityMode::Hybrid);
        assert_eq!(SimilarityMode::parse(" Vector_Only "), SimilarityMode::VectorOnly);
        assert_eq!(SimilarityMode::parse("MLT_ONLY"), SimilarityMode::MltOnly);
        assert_eq!(SimilarityMode::parse(""), SimilarityMode::Hybrid);
    }

    #[test]
    fn mode_parse_keeps_unknown_values() {
        let mode = SimilarityMode::parse("rerank");
        assert_eq!(mode, SimilarityMode::Other("rerank".into()));
        assert_eq!(mode.as_str(), "rerank");
        assert_eq!(String::from(mode), "rerank");
    }

    #[test]
    fn mode_serializes_as_wire_string() {
        let json = serde_json::to_string(&SimilarityMode::VectorOnly).expect("serialize");
        assert_eq!(json, r#""vector_only""#);
        let decoded: SimilarityMode = serde_json::from_str(r#""mlt_only""#).expect("deserialize");
        assert_eq!(decoded, SimilarityMode::MltOnly);
    }

    #[test]
    fn empty_result_for_request() {
        let request = SimilarityRequest::new("page-42", 1).with_mode("mlt_only");
        let result = SimilarityResult::empty_for(&request);
        assert_eq!(result.source_id, "page-42");
        assert_eq!(result.mode, "mlt_only");
        assert_eq!(result.num_found, 0);
        assert!(result.is_empty());
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = SimilarityResult::empty("page-1", "hybrid");
        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"sourceId": "page-1", "mode": "hybrid", "numFound": 0, "docs": []})
        );
    }

    #[test]
    fn similar_doc_keeps_unknown_fields() {
        let doc: SimilarDoc = serde_json::from_value(serde_json::json!({
            "id": "a",
            "title": "Alpha",
            "score": 0.91,
            "scoreBreakdown": {"vectorScore": 1.0, "mltScore": 0.7, "combinedScore": 0.91},
            "author_s": "jdoe"
        }))
        .expect("deserialize");
        assert_eq!(doc.id.as_deref(), Some("a"));
        assert_eq!(doc.title.as_deref(), Some("Alpha"));
        assert!(doc.url.is_none());
        let breakdown = doc.score_breakdown.as_ref().expect("breakdown present");
        assert_eq!(breakdown.mlt_score, Some(0.7));
        assert_eq!(doc.extra.get("author_s"), Some(&serde_json::json!("jdoe")));

        let back = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(back["author_s"], "jdoe");
        assert!(back.get("url").is_none());
    }

    #[test]
    fn similar_doc_mistyped_fields_move_to_extra() {
        let doc: SimilarDoc = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": ["Alpha", "Alpha (de)"],
            "category": ["news", "tech"],
            "score": "high",
            "scoreBreakdown": {"vectorScore": null, "mltScore": 0.4, "combinedScore": "n/a"}
        }))
        .expect("deserialize");
        assert_eq!(doc.id.as_deref(), Some("42"));
        assert!(doc.title.is_none());
        assert!(doc.category.is_none());
        assert!(doc.score.is_none());
        assert_eq!(doc.extra.get("category"), Some(&serde_json::json!(["news", "tech"])));
        assert_eq!(doc.extra.get("score"), Some(&serde_json::json!("high")));
        assert!(!doc.extra.contains_key("id"));

        let breakdown = doc.score_breakdown.expect("breakdown present");
        assert_eq!(breakdown.vector_score, None);
        assert_eq!(breakdown.mlt_score, Some(0.4));
        assert_eq!(breakdown.combined_score, None);
    }

    #[test]
    fn similar_doc_null_fields_are_absent() {
        let doc: SimilarDoc =
            serde_json::from_str(r#"{"id": "b", "category": null}"#).expect("deserialize");
        assert!(doc.category.is_none());
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn outcome_accessors() {
        let request = SimilarityRequest::new("page-42", 1);
        let fallback = SimilarityOutcome::fallback(&request, FallbackReason::Status(503));
        assert!(fallback.is_fallback());
        assert_eq!(fallback.fallback_reason(), Some(FallbackReason::Status(503)));
        assert_eq!(fallback.result().source_id, "page-42");

        let found = SimilarityOutcome::Found(SimilarityResult::empty("page-42", "hybrid"));
        assert!(!found.is_fallback());
        assert_eq!(found.fallback_reason(), None);
        // Both variants present the same value to adapters.
        assert_eq!(found.into_result(), fallback.into_result());
    }

    #[test]
    fn fallback_reason_display() {
        assert_eq!(FallbackReason::Status(503).to_string(), "backend returned HTTP 503");
        assert_eq!(FallbackReason::Malformed.to_string(), "malformed backend response");
        assert_eq!(FallbackReason::Transport.to_string(), "transport failure");
        assert_eq!(FallbackReason::Resolution.to_string(), "endpoint resolution failed");
    }
}
