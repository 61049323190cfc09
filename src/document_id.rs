//! Search index ids of CMS pages.
//!
//! Pages are indexed under `{siteHash}/pages/{uid}/{type}/{language}/{accessGroups}`.
//! The page controller needs this id to ask for content similar to the
//! page being rendered.

use std::collections::HashMap;

/// Access groups of a page visible to everyone (no login restriction).
pub const PUBLIC_ACCESS_GROUPS: &str = "0,-1";

/// Build the index id of a publicly visible page.
pub fn page_document_id(site_hash: &str, page_uid: u32, type_num: u32, language_id: u32) -> String {
    format!("{site_hash}/pages/{page_uid}/{type_num}/{language_id}/{PUBLIC_ACCESS_GROUPS}")
}

/// Site hashes keyed by site root page, with a fallback for unlisted sites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteHashes {
    default: String,
    by_site_root: HashMap<u32, String>,
}

impl SiteHashes {
    /// Hashes where every site uses `default`.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            by_site_root: HashMap::new(),
        }
    }

    /// Use `hash` for pages below `site_root_id`.
    pub fn with_site(mut self, site_root_id: u32, hash: impl Into<String>) -> Self {
        self.by_site_root.insert(site_root_id, hash.into());
        self
    }

    /// The hash of the site rooted at `site_root_id`.
    pub fn for_site(&self, site_root_id: u32) -> &str {
        self.by_site_root
            .get(&site_root_id)
            .map_or(self.default.as_str(), String::as_str)
    }
}

impl From<&str> for SiteHashes {
    fn from(default: &str) -> Self {
        Self::new(default)
    }
}

impl From<String> for SiteHashes {
    fn from(default: String) -> Self {
        Self::new(default)
    }
}
