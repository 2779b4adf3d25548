//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn language() -> String {
        "en".into()
    }

    pub fn timezone() -> String {
        "+00:00".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn cache_dir() -> PathBuf {
        ".folio-cache".into()
    }

    pub fn jobs() -> Option<usize> {
        None
    }
}

// ============================================================================
// [[feeds]] Defaults
// ============================================================================

pub mod feed {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "feed.rss".into()
    }

    pub fn max_items() -> usize {
        100
    }

    /// Minutes, as written to `<ttl>`.
    pub fn ttl() -> u64 {
        250
    }

    pub fn indent_width() -> usize {
        4
    }
}

// ============================================================================
// [sitemap] Defaults
// ============================================================================

pub mod sitemap {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "sitemap.xml".into()
    }
}
