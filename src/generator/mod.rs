//! Output generators.
//!
//! Each generator turns the section graph into one file below the output
//! root. The build driver holds them as `Box<dyn Generator>` and runs them
//! one after another; a generator is free to render in parallel through the
//! context's worker pool.
//!
//! Every generator follows the same persistence protocol:
//!
//! ```text
//! claim target ──► cache hit? ──yes──► write stored artifact
//!                      │
//!                      no
//!                      ▼
//!                   render ──► write artifact ──► store cache record
//! ```

pub mod cache;
pub mod feed;
pub mod sitemap;

use crate::{
    config::SiteConfig,
    context::PublishingContext,
    error::Result,
};
use cache::CacheRecord;
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

pub use feed::{FeedGenerator, ItemRenderer, RssItemRenderer};
pub use sitemap::SitemapGenerator;

/// One output artifact producer.
pub trait Generator: Send + Sync {
    /// Short name used in logs and cache keys.
    fn name(&self) -> &str;

    /// Output path relative to the output root.
    fn target_path(&self) -> &Path;

    fn generate(&self, ctx: &PublishingContext) -> Result<GenerateOutcome>;
}

/// How a generator satisfied its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Freshly rendered with `items` entries.
    Rendered { items: usize },
    /// Stored artifact reused; `items` entries as of the cached render.
    Cached { items: usize },
}

impl GenerateOutcome {
    pub const fn items(&self) -> usize {
        match self {
            Self::Rendered { items } | Self::Cached { items } => *items,
        }
    }
}

/// Cache identity of one artifact.
pub(crate) struct Artifact<'a, C> {
    pub generator: &'a str,
    pub target: &'a Path,
    pub config: &'a C,
    /// Eligible item count used to validate the cache record.
    pub eligible: usize,
    /// Entries the artifact contains.
    pub entries: usize,
}

/// Claim the target, then either replay the cached artifact or render it.
///
/// Nothing is written when `render` fails.
pub(crate) fn publish<C, F>(
    ctx: &PublishingContext,
    artifact: Artifact<'_, C>,
    render: F,
) -> Result<GenerateOutcome>
where
    C: Serialize + DeserializeOwned + PartialEq + Clone,
    F: FnOnce() -> Result<String>,
{
    let Artifact {
        generator,
        target,
        config,
        eligible,
        entries,
    } = artifact;
    let file = ctx.create_output_file(target)?;

    if let Some(stored) = ctx.cache().lookup(generator, target, config, eligible) {
        file.write(&stored)?;
        return Ok(GenerateOutcome::Cached { items: entries });
    }

    let rendered = render()?;
    file.write(&rendered)?;

    ctx.cache().store(
        generator,
        target,
        &CacheRecord {
            config: config.clone(),
            artifact: rendered,
            item_count: eligible,
        },
    );
    Ok(GenerateOutcome::Rendered { items: entries })
}

/// Generators described by `folio.toml`, in build order.
pub fn generators_from_config(config: &SiteConfig) -> Result<Vec<Box<dyn Generator>>> {
    let mut generators: Vec<Box<dyn Generator>> = Vec::new();

    for feed in &config.feeds {
        generators.push(Box::new(FeedGenerator::from_config(feed.clone())?));
    }
    if config.sitemap.enable {
        generators.push(Box::new(SitemapGenerator::new(config.sitemap.clone())));
    }

    Ok(generators)
}
