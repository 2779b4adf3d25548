//! Per-build read surface handed to every generator.
//!
//! The context owns the section graph, site metadata, the render worker pool,
//! and the cache store. Generators only borrow it, so a single
//! `&PublishingContext` is shared freely across render workers. The one piece
//! of mutable state is the set of output paths already claimed in this build.

use crate::{
    config::{BaseConfig, ConfigError},
    content::Section,
    error::{PublishError, Result},
    generator::cache::CacheStore,
    utils::{
        date::{parse_offset, to_rfc2822},
        fs::{join_within, write_atomic},
    },
};
use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashSet;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

// ============================================================================
// Site metadata
// ============================================================================

/// Site-wide metadata resolved from `[base]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMeta {
    pub name: String,
    pub description: String,
    /// Canonical URL without trailing slash.
    pub url: String,
    pub language: String,
    pub author: Option<String>,
    pub email: Option<String>,
    pub timezone: FixedOffset,
}

impl SiteMeta {
    pub fn from_config(base: &BaseConfig) -> Result<Self, ConfigError> {
        let url = base
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("[base.url] is required".into()))?;
        let timezone = parse_offset(&base.timezone)
            .ok_or_else(|| ConfigError::invalid("base.timezone", &base.timezone))?;

        Ok(Self {
            name: base.title.clone(),
            description: base.description.clone(),
            url: url.trim_end_matches('/').to_owned(),
            language: base.language.clone(),
            author: base.author.clone(),
            email: base.email.clone(),
            timezone,
        })
    }

    /// Absolute URL for a site-relative path.
    ///
    /// Segments are percent-encoded; slashes are kept.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let encoded = urlencoding::encode(path).replace("%2F", "/");
        format!("{}/{encoded}", self.url)
    }
}

// ============================================================================
// Output files
// ============================================================================

/// A claimed, not yet written, output path.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file's content in one step.
    pub fn write(&self, content: &str) -> Result<()> {
        write_atomic(&self.path, content.as_bytes()).map_err(|e| PublishError::io(&self.path, e))
    }
}

// ============================================================================
// Context
// ============================================================================

pub struct PublishingContext {
    site: SiteMeta,
    sections: BTreeMap<String, Section>,
    output_root: PathBuf,
    build_date: DateTime<Utc>,
    pool: Option<ThreadPool>,
    cache: CacheStore,
    claimed: Mutex<FxHashSet<PathBuf>>,
}

impl PublishingContext {
    pub fn builder(site: SiteMeta, output_root: impl Into<PathBuf>) -> ContextBuilder {
        ContextBuilder {
            site,
            output_root: output_root.into(),
            sections: Vec::new(),
            build_date: None,
            jobs: None,
            cache: CacheStore::disabled(),
        }
    }

    pub fn section(&self, id: &str) -> Result<&Section> {
        self.sections.get(id).ok_or_else(|| PublishError::NotFound {
            section: id.to_owned(),
        })
    }

    /// All sections, ordered by id.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn site(&self) -> &SiteMeta {
        &self.site
    }

    /// RFC 2822 date in the site's time zone.
    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        to_rfc2822(date, &self.site.timezone)
    }

    pub fn build_date(&self) -> DateTime<Utc> {
        self.build_date
    }

    pub fn pool(&self) -> Option<&ThreadPool> {
        self.pool.as_ref()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Claim `path` (relative to the output root) for writing.
    ///
    /// Absolute paths and paths escaping the root are rejected, as is a
    /// second claim of the same file in this build. Parent directories are
    /// created; the file itself is untouched until [`OutputFile::write`].
    pub fn create_output_file(&self, path: &Path) -> Result<OutputFile> {
        let full = join_within(&self.output_root, path)
            .ok_or_else(|| PublishError::PathEscape(path.to_path_buf()))?;

        if !self.claimed.lock().insert(full.clone()) {
            return Err(PublishError::OutputCollision(path.to_path_buf()));
        }

        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
        }
        Ok(OutputFile { path: full })
    }
}

pub struct ContextBuilder {
    site: SiteMeta,
    output_root: PathBuf,
    sections: Vec<Section>,
    build_date: Option<DateTime<Utc>>,
    jobs: Option<usize>,
    cache: CacheStore,
}

impl ContextBuilder {
    pub fn sections(mut self, sections: impl IntoIterator<Item = Section>) -> Self {
        self.sections.extend(sections);
        self
    }

    /// Fix the build timestamp instead of reading the clock.
    pub fn build_date(mut self, date: DateTime<Utc>) -> Self {
        self.build_date = Some(date);
        self
    }

    /// Render on a dedicated pool of `jobs` threads instead of rayon's global pool.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn build(self) -> Result<PublishingContext> {
        let mut sections = BTreeMap::new();
        for section in self.sections {
            if sections.contains_key(&section.id) {
                return Err(PublishError::DuplicateSection(section.id));
            }
            sections.insert(section.id.clone(), section);
        }

        let pool = match self.jobs {
            Some(jobs) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(jobs)
                    .thread_name(|i| format!("folio-render-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(PublishingContext {
            site: self.site,
            sections,
            output_root: self.output_root,
            build_date: self.build_date.unwrap_or_else(Utc::now),
            pool,
            cache: self.cache,
            claimed: Mutex::new(FxHashSet::default()),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{content::Item, utils::date::parse_date};
    use tempfile::TempDir;

    pub(crate) fn site() -> SiteMeta {
        SiteMeta {
            name: "Example".into(),
            description: "An example site".into(),
            url: "https://example.com".into(),
            language: "en".into(),
            author: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            timezone: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn section(id: &str) -> Section {
        let item = Item::new(id, format!("{id}/a"), "A", parse_date("2021-01-01").unwrap());
        Section::from_items(id, vec![item]).unwrap()
    }

    #[test]
    fn test_site_meta_from_config() {
        let base = BaseConfig {
            title: "T".into(),
            url: Some("https://example.com/".into()),
            timezone: "+08:00".into(),
            ..BaseConfig::default()
        };
        let site = SiteMeta::from_config(&base).unwrap();
        assert_eq!(site.url, "https://example.com");
        assert_eq!(site.timezone.local_minus_utc(), 8 * 3600);

        let base = BaseConfig::default();
        assert!(SiteMeta::from_config(&base).is_err());
    }

    #[test]
    fn test_url_for() {
        let site = site();
        assert_eq!(site.url_for("posts/hello"), "https://example.com/posts/hello");
        assert_eq!(site.url_for("/feed.rss"), "https://example.com/feed.rss");
        assert_eq!(site.url_for("posts/a b"), "https://example.com/posts/a%20b");
    }

    #[test]
    fn test_section_lookup() {
        let dir = TempDir::new().unwrap();
        let ctx = PublishingContext::builder(site(), dir.path())
            .sections([section("posts"), section("links")])
            .build()
            .unwrap();

        assert_eq!(ctx.section("posts").unwrap().len(), 1);
        assert!(matches!(
            ctx.section("missing"),
            Err(PublishError::NotFound { section }) if section == "missing"
        ));

        let ids: Vec<_> = ctx.sections().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["links", "posts"]);
    }

    #[test]
    fn test_duplicate_section() {
        let dir = TempDir::new().unwrap();
        let result = PublishingContext::builder(site(), dir.path())
            .sections([section("posts"), section("posts")])
            .build();
        assert!(matches!(result, Err(PublishError::DuplicateSection(id)) if id == "posts"));
    }

    #[test]
    fn test_build_date_is_injectable() {
        let dir = TempDir::new().unwrap();
        let date = parse_date("2020-02-29").unwrap();
        let ctx = PublishingContext::builder(site(), dir.path())
            .build_date(date)
            .build()
            .unwrap();

        assert_eq!(ctx.build_date(), date);
        assert_eq!(ctx.format_date(&date), "Sat, 29 Feb 2020 00:00:00 +0000");
    }

    #[test]
    fn test_fixed_pool() {
        let dir = TempDir::new().unwrap();
        let ctx = PublishingContext::builder(site(), dir.path())
            .jobs(Some(2))
            .build()
            .unwrap();
        assert_eq!(ctx.pool().unwrap().current_num_threads(), 2);
    }

    #[test]
    fn test_create_output_file() {
        let dir = TempDir::new().unwrap();
        let ctx = PublishingContext::builder(site(), dir.path()).build().unwrap();

        let file = ctx.create_output_file(Path::new("feeds/all.rss")).unwrap();
        assert!(dir.path().join("feeds").is_dir());
        assert!(!file.path().exists());

        file.write("<rss/>").unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("feeds/all.rss")).unwrap(),
            "<rss/>"
        );
    }

    #[test]
    fn test_create_output_file_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let ctx = PublishingContext::builder(site(), dir.path()).build().unwrap();

        assert!(matches!(
            ctx.create_output_file(Path::new("../feed.rss")),
            Err(PublishError::PathEscape(_))
        ));
        assert!(matches!(
            ctx.create_output_file(Path::new("/etc/feed.rss")),
            Err(PublishError::PathEscape(_))
        ));
    }

    #[test]
    fn test_create_output_file_rejects_second_claim() {
        let dir = TempDir::new().unwrap();
        let ctx = PublishingContext::builder(site(), dir.path()).build().unwrap();

        ctx.create_output_file(Path::new("feed.rss")).unwrap();
        assert!(matches!(
            ctx.create_output_file(Path::new("./feed.rss")),
            Err(PublishError::OutputCollision(_))
        ));
    }
}
