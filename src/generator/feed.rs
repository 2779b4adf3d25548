//! RSS feed generation.
//!
//! # Pipeline
//!
//! ```text
//! sections ──► collect ──► sort (date desc, path, section)
//!                                   │
//!                                   ▼
//!                 filter (declarative AND programmatic predicate)
//!                                   │  eligible count ──► cache lookup
//!                                   ▼
//!                 take max_items ──► render entries in parallel
//!                                   │  (order preserved)
//!                                   ▼
//!                 envelope ──► validate ──► serialize ──► write
//! ```

use super::{Artifact, GenerateOutcome, Generator, publish};
use crate::{
    config::FeedConfig,
    content::Item,
    context::{PublishingContext, SiteMeta},
    error::{PublishError, Result},
    predicate::Predicate,
    utils::ordered::ordered_map,
};
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;
use rss::{
    CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder,
    extension::atom::{AtomExtension, Link},
    validation::Validate,
};
use std::{borrow::Cow, collections::BTreeMap, path::Path, sync::Arc, sync::LazyLock};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = "folio";

// ============================================================================
// Item rendering
// ============================================================================

/// Turns one item into one feed entry.
pub trait ItemRenderer: Send + Sync {
    fn render(&self, item: &Item, ctx: &PublishingContext) -> Result<rss::Item>;
}

/// Default entry renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssItemRenderer;

impl ItemRenderer for RssItemRenderer {
    fn render(&self, item: &Item, ctx: &PublishingContext) -> Result<rss::Item> {
        let site = ctx.site();
        let url = site.url_for(&item.path);

        let guid = GuidBuilder::default()
            .value(item.feed.guid.clone().unwrap_or_else(|| url.clone()))
            .permalink(item.feed.guid.is_none())
            .build();
        let link = item.feed.link.clone().unwrap_or(url);
        let categories: Vec<_> = item
            .tags
            .iter()
            .map(|tag| CategoryBuilder::default().name(tag.as_str()).build())
            .collect();
        let description = (!item.description.is_empty()).then(|| item.description.clone());
        let content = (!item.body.is_empty())
            .then(|| absolutize_links(&item.body, &site.url).into_owned());

        Ok(ItemBuilder::default()
            .title(item.feed_title())
            .link(link)
            .guid(guid)
            .description(description)
            .content(content)
            .pub_date(ctx.format_date(&item.date))
            .author(normalize_author(item.author.as_deref(), site))
            .categories(categories)
            .build())
    }
}

/// Rewrite root-relative `href="/..."` and `src="/..."` against the site URL.
///
/// Protocol-relative (`//host/...`) and already absolute links are kept.
fn absolutize_links<'a>(html: &'a str, base_url: &str) -> Cow<'a, str> {
    static RE_ROOT_RELATIVE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(href|src)="/([^"]*)""#).unwrap());

    RE_ROOT_RELATIVE.replace_all(html, |caps: &Captures| {
        let rest = &caps[2];
        if rest.starts_with('/') {
            caps[0].to_string()
        } else {
            format!(r#"{}="{base_url}/{rest}""#, &caps[1])
        }
    })
}

/// RSS wants "email@example.com (Name)".
///
/// Priority:
/// 1. Item author if already in that form
/// 2. Site author if already in that form
/// 3. Site email combined with the item or site author name
/// 4. Site email alone
///
/// Without a site email, names alone are not valid RSS authors and the
/// element is left out.
fn normalize_author(author: Option<&str>, site: &SiteMeta) -> Option<String> {
    static RE_VALID_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}[ \t]*\([^)]+\)$").unwrap()
    });

    if let Some(author) = author.filter(|a| RE_VALID_AUTHOR.is_match(a)) {
        return Some(author.to_owned());
    }
    if let Some(author) = site.author.as_deref().filter(|a| RE_VALID_AUTHOR.is_match(a)) {
        return Some(author.to_owned());
    }

    let email = site.email.as_deref()?;
    Some(match author.or(site.author.as_deref()) {
        Some(name) => format!("{email} ({name})"),
        None => email.to_owned(),
    })
}

// ============================================================================
// FeedGenerator
// ============================================================================

pub struct FeedGenerator {
    config: FeedConfig,
    /// Compiled from `config.filter`.
    filter: Predicate<Item>,
    predicate: Option<Predicate<Item>>,
    renderer: Arc<dyn ItemRenderer>,
}

impl FeedGenerator {
    /// Build from config, compiling its declarative filter.
    pub fn from_config(config: FeedConfig) -> Result<Self> {
        let filter = config.filter.to_predicate()?;
        Ok(Self {
            config,
            filter,
            predicate: None,
            renderer: Arc::new(RssItemRenderer),
        })
    }

    /// Additional programmatic filter, combined with the configured one.
    pub fn with_predicate(mut self, predicate: Predicate<Item>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ItemRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    fn effective_predicate(&self) -> Predicate<Item> {
        match &self.predicate {
            Some(predicate) => self.filter.and(predicate),
            None => self.filter.clone(),
        }
    }

    /// Every eligible item, most recent first. The item cap is not applied.
    pub fn select<'a>(&self, ctx: &'a PublishingContext) -> Result<Vec<&'a Item>> {
        let mut items: Vec<&Item> = if self.config.sections.is_empty() {
            ctx.sections().flat_map(|section| section.items()).collect()
        } else {
            // Listing a section twice must not list its items twice
            let mut seen = FxHashSet::default();
            let mut items = Vec::new();
            for id in &self.config.sections {
                if seen.insert(id.as_str()) {
                    items.extend(ctx.section(id)?.items());
                }
            }
            items
        };

        items.sort_by(|a, b| a.cmp_recency(b));

        let rejected = self.effective_predicate().inverse();
        items.retain(|item| !rejected.matches(item));
        Ok(items)
    }

    /// Render `items` into a complete feed document.
    pub fn render(&self, ctx: &PublishingContext, items: &[&Item]) -> Result<String> {
        let entries = ordered_map(ctx.pool(), items, |item| self.renderer.render(item, ctx))?;

        let site = ctx.site();
        let build_date = ctx.format_date(&ctx.build_date());
        let target = self.config.path.display().to_string();

        let mut self_link = Link::default();
        self_link.set_href(site.url_for(&target));
        self_link.set_rel("self");
        self_link.set_mime_type(Some("application/rss+xml".to_string()));
        let mut atom = AtomExtension::default();
        atom.set_links(vec![self_link]);

        let namespaces = BTreeMap::from([
            ("atom".to_string(), ATOM_NS.to_string()),
            ("content".to_string(), CONTENT_NS.to_string()),
        ]);

        let channel = ChannelBuilder::default()
            .namespaces(namespaces)
            .title(&site.name)
            .link(&site.url)
            .description(&site.description)
            .language(site.language.clone())
            .last_build_date(build_date.clone())
            .pub_date(build_date)
            .ttl(self.config.ttl.to_string())
            .generator(GENERATOR.to_string())
            .atom_ext(atom)
            .items(entries)
            .build();

        channel
            .validate()
            .map_err(|e| PublishError::render(&target, format!("rss validation failed: {e}")))?;

        let bytes = match self.config.indent {
            Some(indent) => channel.pretty_write_to(Vec::new(), indent.char_byte(), indent.width),
            None => channel.write_to(Vec::new()),
        }
        .map_err(|e| PublishError::render(&target, e))?;

        String::from_utf8(bytes).map_err(|e| PublishError::render(&target, e))
    }
}

impl Generator for FeedGenerator {
    fn name(&self) -> &str {
        "feed"
    }

    fn target_path(&self) -> &Path {
        &self.config.path
    }

    fn generate(&self, ctx: &PublishingContext) -> Result<GenerateOutcome> {
        let eligible = self.select(ctx)?;
        let items = &eligible[..eligible.len().min(self.config.max_items)];

        publish(
            ctx,
            Artifact {
                generator: self.name(),
                target: self.target_path(),
                config: &self.config,
                eligible: eligible.len(),
                entries: items.len(),
            },
            || self.render(ctx, items),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
