//! # smlt-client
//!
//! Client for the Semantic More Like This (SMLT) search handler.
//!
//! Given a source document id and the site/language it belongs to, this
//! crate asks the search backend's `/smlt` handler for similar documents.
//! The handler blends dense vector similarity with lexical more-like-this
//! scoring; this crate only builds the query and normalizes the answer.
//!
//! ## Design
//!
//! - [`EndpointResolver`] maps a site root and language to a search core
//! - [`SmltClient`] sends exactly one GET per lookup, with optional Basic auth
//! - [`normalize`](normalize::normalize) turns the response into a
//!   [`SimilarityResult`]
//! - [`SimilarityService`] ties the three together and is shared by every
//!   front-end adapter
//!
//! ## Failure handling
//!
//! Lookups never fail. Unresolvable endpoints, unreachable backends,
//! non-200 statuses and malformed bodies all yield the empty result for
//! the request. [`SimilarityOutcome`] keeps the reason for callers that
//! want to tell "nothing similar" apart from "backend down".

pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod normalize;
pub mod query;
pub mod service;
pub mod types;

pub use config::HttpConfig;
pub use endpoint::{BackendEndpoint, ConnectionTable, Credentials, EndpointResolver, StaticResolver};
pub use error::{Result, SmltError};
pub use query::{QueryResponse, SmltClient};
pub use service::SimilarityService;
pub use types::{
    FallbackReason, ScoreBreakdown, SimilarDoc, SimilarityMode, SimilarityOutcome,
    SimilarityRequest, SimilarityResult,
};

/// Find documents similar to `request.document_id`.
///
/// Convenience wrapper around [`SimilarityService::find_similar`] for
/// one-off lookups; long-lived callers should keep a [`SimilarityService`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() {
/// use smlt_client::{BackendEndpoint, SimilarityRequest, StaticResolver};
///
/// let resolver = StaticResolver::new(BackendEndpoint::new("http://localhost:8983/solr/core_en"));
/// let request = SimilarityRequest::new("page-42", 1).with_count(3);
/// let result = smlt_client::find_similar(&resolver, &request).await;
/// for doc in &result.docs {
///     println!("{:?}: {:?}", doc.title, doc.url);
/// }
/// # }
/// ```
pub async fn find_similar<R: EndpointResolver>(
    resolver: &R,
    request: &SimilarityRequest,
) -> SimilarityResult {
    let client = match SmltClient::new(&HttpConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(document_id = %request.document_id, error = %e, "SMLT client unavailable");
            return SimilarityResult::empty_for(request);
        }
    };
    SimilarityService::with_client(resolver, client)
        .find_similar(request)
        .await
}
