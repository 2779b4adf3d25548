//! `[build]` section configuration.
//!
//! Where content is read from, where artifacts go, and how rendering runs.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in folio.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"        # Source directory
/// output = "public"          # Output directory
/// cache_dir = ".folio-cache" # Artifact cache records
/// cache = true
/// jobs = 4                   # Render workers (default: one per core)
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory, one subdirectory per section.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory. Every generator writes below it.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory holding one cache record per generated artifact.
    #[serde(default = "defaults::build::cache_dir")]
    #[educe(Default = defaults::build::cache_dir())]
    pub cache_dir: PathBuf,

    /// Reuse a previous artifact when its config and item count are unchanged.
    ///
    /// Item content and `[base]` site metadata (url, title, timezone) are not
    /// compared; disable for strictly fresh output after changing either.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub cache: bool,

    /// Size of the render worker pool.
    #[serde(default = "defaults::build::jobs")]
    #[educe(Default = defaults::build::jobs())]
    pub jobs: Option<usize>,
}
