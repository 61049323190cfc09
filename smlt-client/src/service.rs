//! The `find_similar` facade shared by every front-end adapter.
//!
//! # Pipeline
//!
//! 1. Resolve the backend endpoint for the request's site and language
//! 2. Send one `/smlt` request
//! 3. Normalize the response
//!
//! Any failure along the way yields the empty result. Resolution failures
//! degrade the same way as transport failures.

use crate::config::HttpConfig;
use crate::endpoint::EndpointResolver;
use crate::error::SmltError;
use crate::normalize::normalize;
use crate::query::SmltClient;
use crate::types::{FallbackReason, SimilarityOutcome, SimilarityRequest, SimilarityResult};

/// Resolver + client pair answering similarity lookups.
///
/// Stateless between calls; share one instance (e.g. behind an
/// [`std::sync::Arc`]) between all adapters and concurrent requests.
#[derive(Debug)]
pub struct SimilarityService<R> {
    resolver: R,
    client: SmltClient,
}

impl<R: EndpointResolver> SimilarityService<R> {
    /// Create a service with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SmltError`] if the HTTP client cannot be built.
    pub fn new(resolver: R, http: &HttpConfig) -> Result<Self, SmltError> {
        Ok(Self::with_client(resolver, SmltClient::new(http)?))
    }

    /// Create a service around an existing client.
    pub fn with_client(resolver: R, client: SmltClient) -> Self {
        Self { resolver, client }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Run a lookup and report whether it succeeded.
    pub async fn find_similar_outcome(&self, request: &SimilarityRequest) -> SimilarityOutcome {
        let endpoint = match self
            .resolver
            .resolve(request.site_root_id, request.language_id)
        {
            Ok(endpoint) => endpoint,
            Err(e) => {
                tracing::error!(
                    document_id = %request.document_id,
                    site_root_id = request.site_root_id,
                    language_id = request.language_id,
                    error = %e,
                    "SMLT endpoint resolution failed"
                );
                return SimilarityOutcome::fallback(request, FallbackReason::Resolution);
            }
        };

        let response = self.client.query(request, &endpoint).await;
        let outcome = normalize(&response, request);

        if let Some(reason) = outcome.fallback_reason() {
            tracing::debug!(
                document_id = %request.document_id,
                %reason,
                "returning empty similarity result"
            );
        }
        outcome
    }

    /// Run a lookup. Never fails; see [`SimilarityResult::empty`].
    pub async fn find_similar(&self, request: &SimilarityRequest) -> SimilarityResult {
        self.find_similar_outcome(request).await.into_result()
    }
}
