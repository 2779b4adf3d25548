//! Sitemap generation.
//!
//! Lists the home page, every section index, and every item for search
//! engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use super::{Artifact, GenerateOutcome, Generator, publish};
use crate::{
    config::SitemapConfig,
    content::Section,
    context::PublishingContext,
    error::{PublishError, Result},
    utils::{date::to_ymd, ordered::ordered_map},
};
use chrono::{DateTime, Utc};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::path::Path;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// A page to list, before URL and date formatting.
#[derive(Debug, Clone, PartialEq)]
struct Page<'a> {
    /// Site-relative path; empty for the home page.
    path: &'a str,
    lastmod: Option<DateTime<Utc>>,
}

/// Single URL entry in the sitemap
#[derive(Debug, Clone, PartialEq)]
struct UrlEntry {
    loc: String,
    /// YYYY-MM-DD in the site time zone
    lastmod: Option<String>,
}

pub struct SitemapGenerator {
    config: SitemapConfig,
}

impl SitemapGenerator {
    pub fn new(config: SitemapConfig) -> Self {
        Self { config }
    }

    fn is_listed(&self, section: &Section) -> bool {
        !self.config.exclude_sections.contains(&section.id)
    }

    /// Home page, section indexes, and items, ordered by path.
    fn pages<'a>(&self, ctx: &'a PublishingContext) -> Vec<Page<'a>> {
        let mut pages = Vec::new();
        let mut newest = None;

        for section in ctx.sections().filter(|s| self.is_listed(s)) {
            let section_newest = section.items().iter().map(|item| item.modified()).max();
            newest = newest.max(section_newest);

            pages.push(Page {
                path: &section.id,
                lastmod: section_newest,
            });
            pages.extend(section.items().iter().map(|item| Page {
                path: &item.path,
                lastmod: Some(item.modified()),
            }));
        }
        pages.push(Page {
            path: "",
            lastmod: newest,
        });

        pages.sort_by(|a, b| a.path.cmp(b.path));
        pages
    }

    fn render(&self, ctx: &PublishingContext, pages: &[Page<'_>]) -> Result<String> {
        let site = ctx.site();
        let entries = ordered_map(ctx.pool(), pages, |page| {
            Ok::<_, PublishError>(UrlEntry {
                loc: site.url_for(page.path),
                lastmod: page.lastmod.map(|date| to_ymd(&date, &site.timezone)),
            })
        })?;

        let target = self.config.path.display().to_string();
        let bytes = into_xml(&entries, self.config.indent.map(|i| (i.char_byte(), i.width)))
            .map_err(|e| PublishError::render(&target, e))?;
        String::from_utf8(bytes).map_err(|e| PublishError::render(&target, e))
    }
}

impl Generator for SitemapGenerator {
    fn name(&self) -> &str {
        "sitemap"
    }

    fn target_path(&self) -> &Path {
        &self.config.path
    }

    fn generate(&self, ctx: &PublishingContext) -> Result<GenerateOutcome> {
        let pages = self.pages(ctx);

        publish(
            ctx,
            Artifact {
                generator: self.name(),
                target: self.target_path(),
                config: &self.config,
                eligible: pages.len(),
                entries: pages.len(),
            },
            || self.render(ctx, &pages),
        )
    }
}

/// Serialize entries into a `<urlset>` document.
fn into_xml(entries: &[UrlEntry], indent: Option<(u8, usize)>) -> quick_xml::Result<Vec<u8>> {
    let mut writer = match indent {
        Some((ch, width)) => Writer::new_with_indent(Vec::new(), ch, width),
        None => Writer::new(Vec::new()),
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NS)]),
    ))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.loc)?;
        if let Some(lastmod) = &entry.lastmod {
            write_text_element(&mut writer, "lastmod", lastmod)?;
        }
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(writer.into_inner())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
