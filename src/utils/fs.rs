//! Filesystem helpers shared by output files and the artifact cache.

use std::{
    fs,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Write `content` to `path` so that readers see either the old file or the
/// complete new one.
///
/// The data goes to a temporary sibling first and is renamed over `path`
/// afterwards; the temporary file is removed if anything fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Lexically join a relative path onto `root`.
///
/// Returns `None` for absolute paths and for paths whose `..` components
/// climb above `root`. Nothing is touched on disk.
pub fn join_within(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().fold(root.to_path_buf(), |acc, part| acc.join(part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/feed.rss");

        write_atomic(&path, b"<rss/>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<rss/>");
    }

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitemap.xml");

        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_join_within() {
        let root = Path::new("/site/public");
        assert_eq!(
            join_within(root, Path::new("feed.rss")),
            Some(PathBuf::from("/site/public/feed.rss"))
        );
        assert_eq!(
            join_within(root, Path::new("./feeds/../rss/all.xml")),
            Some(PathBuf::from("/site/public/rss/all.xml"))
        );
    }

    #[test]
    fn test_join_within_rejects_escapes() {
        let root = Path::new("/site/public");
        assert_eq!(join_within(root, Path::new("../feed.rss")), None);
        assert_eq!(join_within(root, Path::new("a/../../feed.rss")), None);
        assert_eq!(join_within(root, Path::new("/etc/passwd")), None);
        assert_eq!(join_within(root, Path::new("")), None);
        assert_eq!(join_within(root, Path::new("a/..")), None);
    }
}
