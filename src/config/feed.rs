//! `[[feeds]]` tables and the declarative item filter.
//!
//! A feed config is also the cache key for the feed artifact: two configs
//! that compare equal field-by-field produce the same document for the same
//! items, so every field that changes output (including indentation) lives
//! here.

use super::{ConfigError, defaults};
use crate::{content::Item, predicate::Predicate, utils::date::parse_date};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Indentation character for pretty-printed XML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Spaces,
    Tabs,
}

/// Pretty-printing mode. Absent means compact output.
#[derive(Debug, Clone, Copy, Educe, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct Indentation {
    #[serde(default)]
    pub style: IndentStyle,

    #[serde(default = "defaults::feed::indent_width")]
    #[educe(Default = defaults::feed::indent_width())]
    pub width: usize,
}

impl Indentation {
    pub const fn char_byte(&self) -> u8 {
        match self.style {
            IndentStyle::Spaces => b' ',
            IndentStyle::Tabs => b'\t',
        }
    }
}

/// Declarative item selection.
///
/// Every non-empty field must hold for an item to be kept.
///
/// ```toml
/// filter = { tags = ["rust"], exclude_tags = ["draft"], after = "2021-01-01" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemFilter {
    /// Item must carry at least one of these tags.
    pub tags: Vec<String>,
    /// Item must carry none of these tags.
    pub exclude_tags: Vec<String>,
    /// Item path must start with this prefix.
    pub path_prefix: Option<String>,
    /// Published on or after this date ("YYYY-MM-DD" or RFC 3339).
    pub after: Option<String>,
    /// Published strictly before this date.
    pub before: Option<String>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Compile into a single predicate; an empty filter matches everything.
    pub fn to_predicate(&self) -> Result<Predicate<Item>, ConfigError> {
        let mut parts = Vec::new();

        if !self.tags.is_empty() {
            let any_tag = self
                .tags
                .iter()
                .map(|tag| Predicate::tagged(tag.as_str()))
                .reduce(|acc, p| acc.or(&p));
            parts.extend(any_tag);
        }
        parts.extend(self.exclude_tags.iter().map(|tag| !Predicate::tagged(tag)));

        if let Some(prefix) = &self.path_prefix {
            parts.push(Predicate::path_prefix(prefix));
        }
        if let Some(after) = &self.after {
            let date = parse_date(after).ok_or_else(|| ConfigError::invalid("filter.after", after))?;
            parts.push(Predicate::published_after(date));
        }
        if let Some(before) = &self.before {
            let date =
                parse_date(before).ok_or_else(|| ConfigError::invalid("filter.before", before))?;
            parts.push(Predicate::published_before(date));
        }

        Ok(Predicate::all(parts))
    }
}

/// `[[feeds]]` table in folio.toml - one RSS feed.
///
/// # Example
/// ```toml
/// [[feeds]]
/// path = "feed.rss"
/// sections = ["posts"]
/// max_items = 20
/// ttl = 60
/// indent = { style = "spaces", width = 2 }
/// ```
#[derive(Debug, Clone, Educe, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Output path relative to the output directory.
    #[serde(default = "defaults::feed::path")]
    #[educe(Default = defaults::feed::path())]
    pub path: PathBuf,

    /// Sections to pull items from. Empty means every section.
    #[serde(default)]
    pub sections: Vec<String>,

    /// Maximum number of entries; the most recent items win.
    #[serde(default = "defaults::feed::max_items")]
    #[educe(Default = defaults::feed::max_items())]
    pub max_items: usize,

    /// Refresh hint for readers, in minutes.
    #[serde(default = "defaults::feed::ttl")]
    #[educe(Default = defaults::feed::ttl())]
    pub ttl: u64,

    #[serde(default)]
    pub indent: Option<Indentation>,

    #[serde(default)]
    pub filter: ItemFilter,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;

    fn items() -> Vec<Item> {
        let at = |d: &str| parse_date(d).unwrap();
        vec![
            Item::new("posts", "posts/a", "A", at("2021-01-01")).with_tags(["rust"]),
            Item::new("posts", "posts/b", "B", at("2021-01-02")).with_tags(["rust", "draft"]),
            Item::new("posts", "posts/c", "C", at("2021-01-03")).with_tags(["swift"]),
            Item::new("notes", "notes/d", "D", at("2021-01-04")),
        ]
    }

    fn kept(filter: &ItemFilter) -> Vec<String> {
        let predicate = filter.to_predicate().unwrap();
        items()
            .into_iter()
            .filter(|i| predicate.matches(i))
            .map(|i| i.path)
            .collect()
    }

    #[test]
    fn test_feed_config_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            title = "T"
            description = "D"

            [[feeds]]
            "#,
        )
        .unwrap();

        let feed = &config.feeds[0];
        assert_eq!(feed, &FeedConfig::default());
        assert_eq!(feed.path, PathBuf::from("feed.rss"));
        assert_eq!(feed.max_items, 100);
        assert_eq!(feed.ttl, 250);
        assert!(feed.sections.is_empty());
        assert!(feed.indent.is_none());
        assert!(feed.filter.is_empty());
    }

    #[test]
    fn test_feed_config_full() {
        let config: SiteConfig = toml::from_str(
            r#"
            [base]
            title = "T"
            description = "D"

            [[feeds]]
            path = "rust.xml"
            sections = ["posts", "links"]
            max_items = 10
            ttl = 60
            indent = { style = "tabs", width = 1 }
            filter = { tags = ["rust"], after = "2021-01-01" }

            [[feeds]]
            path = "all.xml"
            indent = { style = "spaces" }
            "#,
        )
        .unwrap();

        let rust = &config.feeds[0];
        assert_eq!(rust.sections, ["posts", "links"]);
        assert_eq!(rust.max_items, 10);
        assert_eq!(
            rust.indent,
            Some(Indentation {
                style: IndentStyle::Tabs,
                width: 1
            })
        );
        assert_eq!(rust.filter.tags, ["rust"]);
        assert_eq!(rust.filter.after.as_deref(), Some("2021-01-01"));

        let all = &config.feeds[1];
        assert_eq!(all.indent.unwrap().width, 4);
        assert_eq!(all.indent.unwrap().char_byte(), b' ');
    }

    #[test]
    fn test_indentation_is_part_of_equality() {
        let compact = FeedConfig::default();
        let pretty = FeedConfig {
            indent: Some(Indentation::default()),
            ..FeedConfig::default()
        };
        assert_ne!(compact, pretty);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(kept(&ItemFilter::default()).len(), 4);
    }

    #[test]
    fn test_filter_tags_are_any_of() {
        let filter = ItemFilter {
            tags: vec!["rust".into(), "swift".into()],
            ..Default::default()
        };
        assert_eq!(kept(&filter), ["posts/a", "posts/b", "posts/c"]);
    }

    #[test]
    fn test_filter_combines_fields() {
        let filter = ItemFilter {
            tags: vec!["rust".into()],
            exclude_tags: vec!["draft".into()],
            path_prefix: Some("posts/".into()),
            ..Default::default()
        };
        assert_eq!(kept(&filter), ["posts/a"]);

        let filter = ItemFilter {
            after: Some("2021-01-02".into()),
            before: Some("2021-01-04".into()),
            ..Default::default()
        };
        assert_eq!(kept(&filter), ["posts/b", "posts/c"]);
    }

    #[test]
    fn test_filter_rejects_bad_dates() {
        let filter = ItemFilter {
            after: Some("last week".into()),
            ..Default::default()
        };
        assert!(matches!(
            filter.to_predicate(),
            Err(ConfigError::InvalidValue { field: "filter.after", .. })
        ));
    }
}
