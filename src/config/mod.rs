//! Site configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                       |
//! |--------------|-----------------------------------------------|
//! | `[base]`     | Site metadata (title, url, language, tz)      |
//! | `[build]`    | Content/output paths, cache, worker pool      |
//! | `[[feeds]]`  | One table per RSS feed                        |
//! | `[sitemap]`  | Sitemap generation                            |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! description = "A personal blog"
//! url = "https://example.com"
//!
//! [build]
//! output = "public"
//!
//! [[feeds]]
//! path = "feed.rss"
//! sections = ["posts"]
//!
//! [sitemap]
//! enable = true
//! ```

mod base;
mod build;
pub mod defaults;
mod error;
mod feed;
mod sitemap;

pub use base::BaseConfig;
pub use build::BuildConfig;
pub use error::ConfigError;
pub use feed::{FeedConfig, IndentStyle, Indentation, ItemFilter};
pub use sitemap::SitemapConfig;

use crate::{
    cli::{BuildArgs, Cli},
    utils::{date::parse_offset, fs::join_within},
};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Feed generators, in build order
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,

    /// Sitemap generator
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config file selected by the CLI and apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let root = cli.root_dir();
        let config_path = root.join(&cli.config);

        let mut config = Self::from_path(&config_path)?;
        config.config_path = normalize_path(&config_path);
        config.update_with_cli(&root, cli.command.build_args());
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Apply CLI overrides and resolve every directory against `root`.
    pub fn update_with_cli(&mut self, root: &Path, args: &BuildArgs) {
        update_option(&mut self.build.content, args.content.as_ref());
        update_option(&mut self.build.output, args.output.as_ref());
        if args.jobs.is_some() {
            self.build.jobs = args.jobs;
        }
        if args.no_cache {
            self.build.cache = false;
        }

        let root = normalize_path(root);
        self.build.content = normalize_path(&root.join(&self.build.content));
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.build.cache_dir = normalize_path(&root.join(&self.build.cache_dir));
        self.build.root = Some(root);
    }

    /// Every target path produced by the configured generators, in build order.
    pub fn target_paths(&self) -> Vec<&Path> {
        let feeds = self.feeds.iter().map(|feed| feed.path.as_path());
        let sitemap = self.sitemap.enable.then_some(self.sitemap.path.as_path());
        feeds.chain(sitemap).collect()
    }

    /// Validate configuration before anything is written.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.base.url {
            None => {
                return Err(ConfigError::Validation(
                    "[base.url] is required to build absolute links".into(),
                ));
            }
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                return Err(ConfigError::Validation(
                    "[base.url] must start with http:// or https://".into(),
                ));
            }
            Some(_) => {}
        }

        if parse_offset(&self.base.timezone).is_none() {
            return Err(ConfigError::invalid("base.timezone", &self.base.timezone));
        }

        if self.build.jobs == Some(0) {
            return Err(ConfigError::invalid("build.jobs", "0"));
        }

        for feed in &self.feeds {
            feed.filter.to_predicate()?;
        }

        let mut seen = FxHashSet::default();
        for target in self.target_paths() {
            let resolved = join_within(Path::new(""), target).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "output path `{}` must stay inside the output directory",
                    target.display()
                ))
            })?;
            if !seen.insert(resolved) {
                return Err(ConfigError::DuplicateTarget(target.to_path_buf()));
            }
        }

        Ok(())
    }
}

/// Update config option if CLI value is provided
fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
    if let Some(option) = cli_option {
        *config_option = option.clone();
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
