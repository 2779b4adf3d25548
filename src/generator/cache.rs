//! Artifact cache: one JSON record per generated file.
//!
//! ```text
//! .folio-cache/
//! └── <blake3("feed:feed.rss")>.json   { config, artifact, item_count }
//! ```
//!
//! A record is reused when its config snapshot equals the current config and
//! the number of eligible items is unchanged. Item contents are not hashed,
//! so editing a post without adding or removing one keeps the old artifact
//! until the cache is disabled or cleared.

use crate::{log, utils::fs::write_atomic};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Memoized output of one generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord<C> {
    pub config: C,
    pub artifact: String,
    pub item_count: usize,
}

impl<C: PartialEq> CacheRecord<C> {
    pub fn is_valid_for(&self, config: &C, item_count: usize) -> bool {
        self.item_count == item_count && &self.config == config
    }
}

/// Where cache records live. A disabled store never hits and never writes.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    dir: Option<PathBuf>,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Record file for `generator` writing `target`.
    pub fn record_path(&self, generator: &str, target: &Path) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let key = format!("{generator}:{}", target.display());
        let hash = blake3::hash(key.as_bytes());
        Some(dir.join(format!("{}.json", hex::encode(hash.as_bytes()))))
    }

    /// Read a record. Missing, unreadable, or undecodable records are misses.
    pub fn load<C: DeserializeOwned>(
        &self,
        generator: &str,
        target: &Path,
    ) -> Option<CacheRecord<C>> {
        let path = self.record_path(generator, target)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log!("cache"; "cannot read {}: {e}", path.display());
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                log!("cache"; "ignoring corrupt record for {}: {e}", target.display());
                None
            }
        }
    }

    /// Stored artifact for `target` if the record matches `config` and `item_count`.
    pub fn lookup<C>(
        &self,
        generator: &str,
        target: &Path,
        config: &C,
        item_count: usize,
    ) -> Option<String>
    where
        C: DeserializeOwned + PartialEq,
    {
        let record = self.load::<C>(generator, target)?;
        if record.is_valid_for(config, item_count) {
            return Some(record.artifact);
        }

        if record.item_count != item_count {
            log!("cache"; "{}: item count {} -> {item_count}", target.display(), record.item_count);
        } else {
            log!("cache"; "{}: config changed", target.display());
        }
        None
    }

    /// Persist a record. Failures are logged; the artifact itself is already written.
    pub fn store<C: Serialize>(&self, generator: &str, target: &Path, record: &CacheRecord<C>) {
        let Some(path) = self.record_path(generator, target) else {
            return;
        };

        let result = serde_json::to_vec(record)
            .map_err(std::io::Error::other)
            .and_then(|bytes| write_atomic(&path, &bytes));
        if let Err(e) = result {
            log!("cache"; "cannot write {}: {e}", path.display());
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        ttl: u64,
    }

    fn record(ttl: u64, item_count: usize) -> CacheRecord<Settings> {
        CacheRecord {
            config: Settings { ttl },
            artifact: "<rss/>".into(),
            item_count,
        }
    }

    #[test]
    fn test_store_then_lookup_hits() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let target = Path::new("feed.rss");

        store.store("feed", target, &record(60, 3));

        let hit = store.lookup("feed", target, &Settings { ttl: 60 }, 3);
        assert_eq!(hit.as_deref(), Some("<rss/>"));
    }

    #[test]
    fn test_config_or_count_change_misses() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let target = Path::new("feed.rss");
        store.store("feed", target, &record(60, 3));

        assert!(store.lookup("feed", target, &Settings { ttl: 30 }, 3).is_none());
        assert!(store.lookup("feed", target, &Settings { ttl: 60 }, 4).is_none());
    }

    #[test]
    fn test_records_are_keyed_by_generator_and_target() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        store.store("feed", Path::new("a.rss"), &record(60, 1));

        assert!(store.load::<Settings>("feed", Path::new("b.rss")).is_none());
        assert!(store.load::<Settings>("sitemap", Path::new("a.rss")).is_none());
        assert_ne!(
            store.record_path("feed", Path::new("a.rss")),
            store.record_path("feed", Path::new("b.rss"))
        );
    }

    #[test]
    fn test_corrupt_record_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path());
        let target = Path::new("feed.rss");

        let path = store.record_path("feed", target).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(store.lookup("feed", target, &Settings { ttl: 60 }, 3).is_none());
    }

    #[test]
    fn test_disabled_store() {
        let store = CacheStore::disabled();
        let target = Path::new("feed.rss");

        store.store("feed", target, &record(60, 3));
        assert!(!store.is_enabled());
        assert!(store.record_path("feed", target).is_none());
        assert!(store.lookup("feed", target, &Settings { ttl: 60 }, 3).is_none());
    }
}
