//! Build orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── prepare()
//!     │       ├── load_sections()      content dir → sections
//!     │       ├── PublishingContext    site meta, pool, cache
//!     │       └── generators_from_config()
//!     │
//!     └── run_generators()
//!             ├── ensure_unique_targets()   before anything is written
//!             └── generate() one after another
//! ```

use crate::{
    config::SiteConfig,
    content::load_sections,
    context::{PublishingContext, SiteMeta},
    error::{PublishError, Result as PublishResult},
    generator::{GenerateOutcome, Generator, cache::CacheStore, generators_from_config},
    log,
    utils::fs::join_within,
};
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::path::Path;

/// Load content and run every configured generator.
pub fn build_site(config: &SiteConfig) -> Result<Vec<GenerateOutcome>> {
    let (ctx, generators) = prepare(config)?;
    let outcomes = run_generators(&ctx, &generators)?;

    let cached = outcomes
        .iter()
        .filter(|o| matches!(o, GenerateOutcome::Cached { .. }))
        .count();
    log!("build"; "{} artifacts written ({cached} from cache)", outcomes.len());
    Ok(outcomes)
}

/// Load content and resolve every generator input without writing.
pub fn check_site(config: &SiteConfig) -> Result<()> {
    let (ctx, generators) = prepare(config)?;
    ensure_unique_targets(&generators)?;

    for feed in &config.feeds {
        for id in &feed.sections {
            ctx.section(id)
                .with_context(|| format!("feed `{}`", feed.path.display()))?;
        }
    }

    log!("build"; "ok: {} generators", generators.len());
    Ok(())
}

/// Run generators in order, stopping at the first failure.
///
/// Target paths are checked for collisions up front, so a conflicting
/// configuration writes nothing.
pub fn run_generators(
    ctx: &PublishingContext,
    generators: &[Box<dyn Generator>],
) -> PublishResult<Vec<GenerateOutcome>> {
    ensure_unique_targets(generators)?;

    let mut outcomes = Vec::with_capacity(generators.len());
    for generator in generators {
        let target = generator.target_path();
        let outcome = generator.generate(ctx)?;

        match outcome {
            GenerateOutcome::Rendered { items } => {
                log!(generator.name(); "{} ({items} items)", target.display());
            }
            GenerateOutcome::Cached { items } => {
                log!("cache"; "{} unchanged, reusing artifact ({items} items)", target.display());
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn prepare(config: &SiteConfig) -> Result<(PublishingContext, Vec<Box<dyn Generator>>)> {
    let content = &config.build.content;
    let sections = load_sections(content)
        .with_context(|| format!("Failed to load content from {}", content.display()))?;

    let items: usize = sections.iter().map(|s| s.len()).sum();
    log!("content"; "loaded {items} items from {} sections", sections.len());

    let cache = if config.build.cache {
        CacheStore::new(&config.build.cache_dir)
    } else {
        CacheStore::disabled()
    };
    if !cache.is_enabled() {
        log!("cache"; "disabled, rendering every artifact");
    }

    let ctx = PublishingContext::builder(SiteMeta::from_config(&config.base)?, &config.build.output)
        .sections(sections)
        .jobs(config.build.jobs)
        .cache(cache)
        .build()?;
    let generators = generators_from_config(config)?;

    Ok((ctx, generators))
}

/// Reject generator sets where two targets resolve to the same file.
fn ensure_unique_targets(generators: &[Box<dyn Generator>]) -> PublishResult<()> {
    let mut seen = FxHashSet::default();
    for generator in generators {
        let target = generator.target_path();
        let resolved = join_within(Path::new(""), target)
            .ok_or_else(|| PublishError::PathEscape(target.to_path_buf()))?;
        if !seen.insert(resolved) {
            return Err(PublishError::OutputCollision(target.to_path_buf()));
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
