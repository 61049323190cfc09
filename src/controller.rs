//! Page controller for the similar-content element.
//!
//! Runs when a page containing the element is rendered: derives the
//! page's index id from the request context, looks up similar content via
//! the shared [`SimilarityService`] and hands the view variables to the
//! template.

use std::sync::Arc;

use serde::Serialize;
use smlt_client::{EndpointResolver, SimilarDoc, SimilarityRequest, SimilarityResult, SimilarityService};

use crate::document_id::{SiteHashes, page_document_id};
use crate::settings::PluginSettings;

/// Routing attributes of the page being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    /// Uid of the page being rendered.
    pub page_id: u32,
    /// Root page uid of the page's site.
    pub site_root_page_id: u32,
    /// Language the page is rendered in.
    pub language_id: u32,
}

/// Variables handed to the element's template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarContentView {
    pub result: SimilarityResult,
    pub documents: Vec<SimilarDoc>,
    pub num_found: u64,
    pub source_id: String,
    pub mode: String,
}

impl SimilarContentView {
    fn from_result(result: SimilarityResult) -> Self {
        Self {
            documents: result.docs.clone(),
            num_found: result.num_found,
            source_id: result.source_id.clone(),
            mode: result.mode.clone(),
            result,
        }
    }
}

/// Controller rendering similar content for the current page.
pub struct SimilarContentController<R> {
    service: Arc<SimilarityService<R>>,
    site_hashes: SiteHashes,
    defaults: PluginSettings,
}

impl<R: EndpointResolver> SimilarContentController<R> {
    /// `site_hashes` give each site root's index hash; `defaults` are the
    /// site-wide settings that element settings are layered over.
    pub fn new(
        service: Arc<SimilarityService<R>>,
        site_hashes: impl Into<SiteHashes>,
        defaults: PluginSettings,
    ) -> Self {
        Self {
            service,
            site_hashes: site_hashes.into(),
            defaults,
        }
    }

    /// Build the lookup for a page and element settings.
    pub fn request_for(&self, context: &PageContext, settings: &PluginSettings) -> SimilarityRequest {
        let site_hash = self.site_hashes.for_site(context.site_root_page_id);
        let document_id = page_document_id(site_hash, context.page_id, 0, context.language_id);
        let base = SimilarityRequest::new(document_id, context.site_root_page_id)
            .with_language(context.language_id);
        settings.overlay(&self.defaults).resolved().apply(base)
    }

    /// Look up similar content for the page and build the view variables.
    pub async fn show(&self, context: &PageContext, settings: &PluginSettings) -> SimilarContentView {
        let request = self.request_for(context, settings);
        tracing::debug!(
            document_id = %request.document_id,
            page_id = context.page_id,
            "rendering similar content"
        );
        let result = self.service.find_similar(&request).await;
        SimilarContentView::from_result(result)
    }
}
