//! Content model: items grouped into sections.
//!
//! Both types are plain values. They are built once while loading content
//! and only read afterwards; generators borrow them through the
//! [`PublishingContext`](crate::context::PublishingContext).

mod loader;

pub use loader::{ContentError, load_sections};

use crate::error::{PublishError, Result};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Per-item overrides used when the item is rendered into a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedProperties {
    /// Link to use instead of the item's own URL.
    pub link: Option<String>,
    /// Guid to use instead of the item's URL.
    pub guid: Option<String>,
    /// Prepended to the title in feeds, e.g. "[Link] ".
    pub title_prefix: Option<String>,
    /// Appended to the title in feeds.
    pub title_suffix: Option<String>,
}

/// One published content unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Site-relative path without leading slash, e.g. `posts/hello-world`.
    pub path: String,
    /// Id of the owning section.
    pub section: String,
    pub title: String,
    pub description: String,
    /// Rendered body (HTML), passed through verbatim.
    pub body: String,
    pub date: DateTime<Utc>,
    pub last_modified: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub feed: FeedProperties,
}

impl Item {
    pub fn new(
        section: impl Into<String>,
        path: impl Into<String>,
        title: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
            title: title.into(),
            description: String::new(),
            body: String::new(),
            date,
            last_modified: None,
            tags: Vec::new(),
            author: None,
            feed: FeedProperties::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_feed(mut self, feed: FeedProperties) -> Self {
        self.feed = feed;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Title as shown in feeds, with the configured prefix and suffix.
    pub fn feed_title(&self) -> String {
        let prefix = self.feed.title_prefix.as_deref().unwrap_or_default();
        let suffix = self.feed.title_suffix.as_deref().unwrap_or_default();
        format!("{prefix}{}{suffix}", self.title)
    }

    /// Date used for "last modified" outputs.
    pub fn modified(&self) -> DateTime<Utc> {
        self.last_modified.unwrap_or(self.date)
    }

    /// Newest first; equal dates fall back to path, then section id.
    pub fn cmp_recency(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.section.cmp(&other.section))
    }
}

/// A named group of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    items: Vec<Item>,
}

impl Section {
    /// Build a section, taking ownership of `items` in ingestion order.
    ///
    /// Every item is re-tagged with this section's id. Fails when two items
    /// share a path.
    pub fn from_items(id: impl Into<String>, items: Vec<Item>) -> Result<Self> {
        let id = id.into();
        let mut seen = FxHashSet::default();

        let items = items
            .into_iter()
            .map(|mut item| {
                if !seen.insert(item.path.clone()) {
                    return Err(PublishError::DuplicateItem {
                        section: id.clone(),
                        path: item.path,
                    });
                }
                item.section.clone_from(&id);
                Ok(item)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title: id.clone(),
            id,
            items,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
