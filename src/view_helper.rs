//! Template helper rendering similar content inline.
//!
//! Usage in a template (pseudo-markup):
//!
//! ```text
//! <smlt:similarContent documentId="{page.uid}" siteRootPageId="{site.rootPageId}" count="3" as="docs">
//!     <for each="{docs}" as="doc"><a href="{doc.url}">{doc.title}</a></for>
//! </smlt:similarContent>
//! ```
//!
//! The helper looks up similar documents, exposes them to its children
//! under the `as` name for the duration of the child render, and wraps
//! the children's output in a `<div>`. Tag attributes such as `class` or
//! `id` given in [`HelperArguments::attributes`] end up on that `<div>`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smlt_client::types::{DEFAULT_COUNT, DEFAULT_MLT_WEIGHT, DEFAULT_VECTOR_WEIGHT};
use smlt_client::{EndpointResolver, SimilarityRequest, SimilarityService};

/// Variable name used when `as` is not given.
pub const DEFAULT_VARIABLE_NAME: &str = "similarDocuments";

/// Template variables visible to child content.
pub type TemplateVariables = serde_json::Map<String, Value>;

/// Arguments of the helper tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperArguments {
    pub document_id: String,
    pub site_root_page_id: u32,
    #[serde(default)]
    pub language_id: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,
    #[serde(default = "default_mlt_weight")]
    pub mlt_weight: f64,
    /// Name of the variable the documents are exposed as.
    #[serde(rename = "as", default = "default_variable_name")]
    pub as_name: String,
    /// HTML attributes of the wrapping `<div>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_mode() -> String {
    "hybrid".to_owned()
}

fn default_vector_weight() -> f64 {
    DEFAULT_VECTOR_WEIGHT
}

fn default_mlt_weight() -> f64 {
    DEFAULT_MLT_WEIGHT
}

fn default_variable_name() -> String {
    DEFAULT_VARIABLE_NAME.to_owned()
}

impl HelperArguments {
    /// Arguments with only the required values set.
    pub fn new(document_id: impl Into<String>, site_root_page_id: u32) -> Self {
        Self {
            document_id: document_id.into(),
            site_root_page_id,
            language_id: 0,
            count: DEFAULT_COUNT,
            mode: default_mode(),
            vector_weight: DEFAULT_VECTOR_WEIGHT,
            mlt_weight: DEFAULT_MLT_WEIGHT,
            as_name: default_variable_name(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute of the wrapping `<div>`.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The lookup these arguments describe.
    pub fn to_request(&self) -> SimilarityRequest {
        SimilarityRequest::new(self.document_id.as_str(), self.site_root_page_id)
            .with_language(self.language_id)
            .with_count(self.count)
            .with_mode(self.mode.as_str())
            .with_weights(self.vector_weight, self.mlt_weight)
    }
}

/// Template helper backed by the shared [`SimilarityService`].
pub struct SimilarContentHelper<R> {
    service: Arc<SimilarityService<R>>,
}

impl<R: EndpointResolver> SimilarContentHelper<R> {
    pub fn new(service: Arc<SimilarityService<R>>) -> Self {
        Self { service }
    }

    /// Render the helper.
    ///
    /// `children` renders the tag's content with `variables`, in which the
    /// similar documents are bound to `args.as_name`. The binding is
    /// removed again afterwards, restoring any value it shadowed. Returns
    /// the empty string when `children` produces nothing.
    pub async fn render<F>(
        &self,
        args: &HelperArguments,
        variables: &mut TemplateVariables,
        children: F,
    ) -> String
    where
        F: FnOnce(&TemplateVariables) -> Option<String>,
    {
        let result = self.service.find_similar(&args.to_request()).await;
        let docs = serde_json::to_value(&result.docs).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to expose similar documents to template");
            Value::Array(Vec::new())
        });

        let shadowed = variables.insert(args.as_name.clone(), docs);
        let content = children(variables);
        match shadowed {
            Some(previous) => {
                variables.insert(args.as_name.clone(), previous);
            }
            None => {
                variables.remove(&args.as_name);
            }
        }

        match content {
            Some(content) => format!("<div{}>{content}</div>", render_attributes(&args.attributes)),
            None => String::new(),
        }
    }
}

/// Render ` name="value"` pairs, escaping values. Names that are not valid
/// attribute names are dropped.
fn render_attributes(attributes: &BTreeMap<String, String>) -> String {
    let mut rendered = String::new();
    for (name, value) in attributes {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
        if !valid {
            tracing::warn!(attribute = %name, "dropping invalid tag attribute");
            continue;
        }
        let _ = write!(rendered, " {name}=\"{}\"", escape_attribute(value));
    }
    rendered
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
