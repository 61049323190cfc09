//! Similar content: "find similar content" for CMS pages.
//!
//! This crate connects CMS front ends to the search backend's Semantic More
//! Like This handler via [`smlt_client`]:
//!
//! - **Page controller**: renders similar content for the current page
//! - **Template helper**: renders similar content for any document inline
//! - **Host bridge**: newline-delimited JSON over stdin/stdout for
//!   processes that cannot link the library
//!
//! All three share one [`smlt_client::SimilarityService`], built from the
//! TOML [`AppConfig`]. None of them ever sees an error from a lookup; a
//! failed lookup renders like "nothing similar found".

pub mod config;
pub mod controller;
pub mod document_id;
pub mod error;
pub mod host;
pub mod settings;
pub mod view_helper;

pub use config::{AppConfig, ConnectionConfig};
pub use controller::{PageContext, SimilarContentController, SimilarContentView};
pub use document_id::SiteHashes;
pub use error::{AppError, Result};
pub use settings::{PluginSettings, ResolvedSettings, SettingValue};
pub use view_helper::{HelperArguments, SimilarContentHelper, TemplateVariables};
