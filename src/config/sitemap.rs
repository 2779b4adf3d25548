//! `[sitemap]` section configuration.

use super::{Indentation, defaults};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[sitemap]` section in folio.toml.
///
/// # Example
/// ```toml
/// [sitemap]
/// enable = true
/// path = "sitemap.xml"
/// exclude_sections = ["drafts"]
/// ```
#[derive(Debug, Clone, Educe, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub enable: bool,

    /// Output path relative to the output directory.
    #[serde(default = "defaults::sitemap::path")]
    #[educe(Default = defaults::sitemap::path())]
    pub path: PathBuf,

    /// Sections left out of the sitemap entirely.
    pub exclude_sections: Vec<String>,

    pub indent: Option<Indentation>,
}
