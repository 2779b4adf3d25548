//! Load sections from the content directory.
//!
//! ```text
//! content/
//! ├── posts/               → section "posts"
//! │   ├── _section.toml    → optional: title = "Posts"
//! │   ├── hello.md         → item "posts/hello"
//! │   └── 2021/recap.md    → item "posts/2021/recap"
//! └── links/               → section "links"
//! ```
//!
//! Each item file starts with TOML front matter fenced by `+++`:
//!
//! ```text
//! +++
//! title = "Hello"
//! date = "2021-01-03"
//! tags = ["rust"]
//! +++
//! <p>Body, passed through verbatim.</p>
//! ```

use super::{FeedProperties, Item, Section};
use crate::{error::PublishError, utils::date::parse_date};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

const FRONT_MATTER_FENCE: &str = "+++";
const SECTION_FILE: &str = "_section.toml";
const ITEM_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{0}` has no `+++` front matter")]
    MissingFrontMatter(PathBuf),

    #[error("invalid front matter in `{0}`")]
    FrontMatter(PathBuf, #[source] toml::de::Error),

    #[error("invalid date `{value}` in `{path}`")]
    InvalidDate { path: PathBuf, value: String },

    #[error(transparent)]
    Section(#[from] PublishError),
}

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    #[serde(default)]
    description: String,
    date: String,
    #[serde(default)]
    lastmod: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    feed: FeedFrontMatter,
}

#[derive(Debug, Default, Deserialize)]
struct FeedFrontMatter {
    link: Option<String>,
    guid: Option<String>,
    title_prefix: Option<String>,
    title_suffix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionFile {
    title: Option<String>,
}

/// Load every section under `dir`, sorted by section id.
///
/// A missing content directory yields no sections.
pub fn load_sections(dir: &Path) -> Result<Vec<Section>, ContentError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut section_dirs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ContentError::Io(dir.to_path_buf(), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    section_dirs.sort();

    section_dirs
        .iter()
        .filter_map(|path| {
            let id = path.file_name()?.to_str()?;
            (!id.starts_with('.')).then(|| load_section(id, path))
        })
        .collect()
}

fn load_section(id: &str, dir: &Path) -> Result<Section, ContentError> {
    let mut items = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            ContentError::Io(path, e.into())
        })?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().is_none_or(|ext| ext != ITEM_EXTENSION)
        {
            continue;
        }
        if let Some(item) = load_item(id, dir, path)? {
            items.push(item);
        }
    }

    let section = Section::from_items(id, items)?;
    match read_section_title(dir)? {
        Some(title) => Ok(section.with_title(title)),
        None => Ok(section),
    }
}

fn read_section_title(dir: &Path) -> Result<Option<String>, ContentError> {
    let path = dir.join(SECTION_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| ContentError::Io(path.clone(), e))?;
    let file: SectionFile =
        toml::from_str(&text).map_err(|e| ContentError::FrontMatter(path, e))?;
    Ok(file.title)
}

/// Returns `None` for drafts.
fn load_item(section: &str, section_dir: &Path, path: &Path) -> Result<Option<Item>, ContentError> {
    let text = fs::read_to_string(path).map_err(|e| ContentError::Io(path.to_path_buf(), e))?;
    let (front, body) =
        split_front_matter(&text).ok_or_else(|| ContentError::MissingFrontMatter(path.into()))?;
    let meta: FrontMatter =
        toml::from_str(front).map_err(|e| ContentError::FrontMatter(path.into(), e))?;

    if meta.draft {
        return Ok(None);
    }

    let parse = |value: &str| {
        parse_date(value).ok_or_else(|| ContentError::InvalidDate {
            path: path.to_path_buf(),
            value: value.to_owned(),
        })
    };
    let date = parse(&meta.date)?;
    let last_modified = meta.lastmod.as_deref().map(parse).transpose()?;

    let relative = path
        .strip_prefix(section_dir)
        .unwrap_or(path)
        .with_extension("");
    let relative = relative.to_string_lossy().replace('\\', "/");

    let mut item = Item::new(section, format!("{section}/{relative}"), meta.title, date)
        .with_description(meta.description)
        .with_body(body)
        .with_tags(meta.tags)
        .with_feed(FeedProperties {
            link: meta.feed.link,
            guid: meta.feed.guid,
            title_prefix: meta.feed.title_prefix,
            title_suffix: meta.feed.title_suffix,
        });
    item.last_modified = last_modified;
    item.author = meta.author;

    Ok(Some(item))
}

/// Split `+++`-fenced front matter from the body.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text.trim_start_matches('\u{feff}').strip_prefix(FRONT_MATTER_FENCE)?;
    let rest = strip_newline(rest)?;

    let (front, after) = if let Some(after) = rest.strip_prefix(FRONT_MATTER_FENCE) {
        ("", after)
    } else {
        let end = rest.find("\n+++")?;
        (&rest[..end], &rest[end + 1 + FRONT_MATTER_FENCE.len()..])
    };

    let body = strip_newline(after).unwrap_or(after);
    Some((front, body))
}

fn strip_newline(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}
