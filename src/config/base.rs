//! `[base]` section configuration.
//!
//! Site metadata shared by every generator: the feed envelope, absolute
//! URLs, and date formatting all read from here.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in folio.toml - site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "My Blog"
/// description = "Notes on systems programming"
/// url = "https://myblog.com"
/// timezone = "+02:00"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site name, used as the feed title.
    pub title: String,

    /// Site description, used as the feed description.
    pub description: String,

    /// Canonical site URL. Every absolute link is built from it.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: Option<String>,

    /// BCP 47 language code (e.g., "en", "zh-Hans").
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Default author name for feed entries.
    #[serde(default)]
    pub author: Option<String>,

    /// Contact address paired with author names in feed entries.
    #[serde(default)]
    pub email: Option<String>,

    /// UTC offset used when formatting dates, e.g. "+08:00".
    #[serde(default = "defaults::base::timezone")]
    #[educe(Default = defaults::base::timezone())]
    pub timezone: String,
}
