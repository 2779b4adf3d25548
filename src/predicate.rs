//! Composable item predicates.
//!
//! A [`Predicate`] is an immutable value: a shared matcher function plus a
//! human-readable description used in logs. Combinators build new values and
//! never touch their inputs, so predicates can be cloned freely and evaluated
//! from any thread.
//!
//! ```ignore
//! let p = Predicate::tagged("rust") & !Predicate::tagged("draft");
//! assert_eq!(p.description(), "(tagged `rust`) and (not (tagged `draft`))");
//! ```

use crate::content::Item;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::{
    fmt,
    ops::{BitAnd, BitOr, Not},
    sync::Arc,
};

type Matcher<T> = dyn Fn(&T) -> bool + Send + Sync;

/// A named, pure boolean test.
pub struct Predicate<T> {
    matcher: Arc<Matcher<T>>,
    description: Arc<str>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            matcher: Arc::clone(&self.matcher),
            description: Arc::clone(&self.description),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<T: 'static> Predicate<T> {
    pub fn new<F>(description: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
            description: Arc::from(description.into()),
        }
    }

    /// Matches every value.
    pub fn always() -> Self {
        Self::new("always", |_| true)
    }

    #[inline]
    pub fn matches(&self, value: &T) -> bool {
        (self.matcher)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn inverse(&self) -> Self {
        let inner = Arc::clone(&self.matcher);
        Self::new(format!("not ({})", self.description), move |v| !inner(v))
    }

    /// Short-circuits: `other` is not evaluated when `self` fails.
    pub fn and(&self, other: &Self) -> Self {
        let (lhs, rhs) = (Arc::clone(&self.matcher), Arc::clone(&other.matcher));
        Self::new(
            format!("({}) and ({})", self.description, other.description),
            move |v| lhs(v) && rhs(v),
        )
    }

    /// Short-circuits: `other` is not evaluated when `self` holds.
    pub fn or(&self, other: &Self) -> Self {
        let (lhs, rhs) = (Arc::clone(&self.matcher), Arc::clone(&other.matcher));
        Self::new(
            format!("({}) or ({})", self.description, other.description),
            move |v| lhs(v) || rhs(v),
        )
    }

    /// Conjunction of all predicates; `always()` when empty.
    pub fn all(predicates: impl IntoIterator<Item = Self>) -> Self {
        predicates
            .into_iter()
            .reduce(|acc, p| acc.and(&p))
            .unwrap_or_else(Self::always)
    }
}

impl<T: 'static> Not for Predicate<T> {
    type Output = Self;

    fn not(self) -> Self {
        self.inverse()
    }
}

impl<T: 'static> BitAnd for Predicate<T> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(&rhs)
    }
}

impl<T: 'static> BitOr for Predicate<T> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(&rhs)
    }
}

// ============================================================================
// Item predicates
// ============================================================================

impl Predicate<Item> {
    pub fn tagged(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(format!("tagged `{tag}`"), move |item: &Item| item.has_tag(&tag))
    }

    pub fn in_section(section: impl Into<String>) -> Self {
        let section = section.into();
        Self::new(format!("in section `{section}`"), move |item: &Item| {
            item.section == section
        })
    }

    pub fn path_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(format!("path starts with `{prefix}`"), move |item: &Item| {
            item.path.starts_with(&prefix)
        })
    }

    /// Published at or after `date`.
    pub fn published_after(date: DateTime<Utc>) -> Self {
        Self::new(format!("published after {}", date.to_rfc3339()), move |item: &Item| {
            item.date >= date
        })
    }

    /// Published strictly before `date`.
    pub fn published_before(date: DateTime<Utc>) -> Self {
        Self::new(format!("published before {}", date.to_rfc3339()), move |item: &Item| {
            item.date < date
        })
    }

    pub fn title_matches(pattern: Regex) -> Self {
        Self::new(format!("title matches /{}/", pattern.as_str()), move |item: &Item| {
            pattern.is_match(&item.title)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::parse_date;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item(path: &str, date: &str, tags: &[&str]) -> Item {
        Item::new("posts", path, path.to_uppercase(), parse_date(date).unwrap())
            .with_tags(tags.iter().copied())
    }

    fn items() -> Vec<Item> {
        vec![
            item("posts/a", "2021-01-01", &["rust"]),
            item("posts/b", "2021-01-02", &["rust", "draft"]),
            item("posts/c", "2021-01-03", &[]),
            item("notes/d", "2021-01-04", &["swift"]),
        ]
    }

    #[test]
    fn test_matches_and_inverse() {
        let rust = Predicate::tagged("rust");
        let a = item("posts/a", "2021-01-01", &["rust"]);
        let c = item("posts/c", "2021-01-03", &[]);

        assert!(rust.matches(&a));
        assert!(!rust.matches(&c));
        assert!(!rust.inverse().matches(&a));
        assert!(rust.inverse().matches(&c));
        assert_eq!(rust.inverse().description(), "not (tagged `rust`)");
    }

    #[test]
    fn test_inverse_partitions() {
        let predicates = [
            Predicate::tagged("rust"),
            Predicate::path_prefix("posts/"),
            Predicate::published_after(parse_date("2021-01-03").unwrap()),
            Predicate::always(),
        ];

        for p in predicates {
            let all = items();
            let (kept, dropped): (Vec<_>, Vec<_>) = all.iter().partition(|i| p.matches(i));
            let inverse = p.inverse();

            assert!(kept.iter().all(|i| !inverse.matches(i)), "{p}");
            assert!(dropped.iter().all(|i| inverse.matches(i)), "{p}");
            assert_eq!(kept.len() + dropped.len(), all.len());
        }
    }

    #[test]
    fn test_combinators() {
        let p = Predicate::tagged("rust") & !Predicate::tagged("draft");
        let matched: Vec<_> = items().into_iter().filter(|i| p.matches(i)).map(|i| i.path).collect();
        assert_eq!(matched, ["posts/a"]);
        assert_eq!(p.description(), "(tagged `rust`) and (not (tagged `draft`))");

        let q = Predicate::tagged("swift") | Predicate::path_prefix("posts/c");
        let matched: Vec<_> = items().into_iter().filter(|i| q.matches(i)).map(|i| i.path).collect();
        assert_eq!(matched, ["posts/c", "notes/d"]);
        assert_eq!(q.to_string(), "(tagged `swift`) or (path starts with `posts/c`)");
    }

    #[test]
    fn test_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = {
            let calls = Arc::clone(&calls);
            Predicate::new("counted", move |_: &Item| {
                calls.fetch_add(1, Ordering::Relaxed);
                true
            })
        };
        let never = Predicate::new("never", |_: &Item| false);
        let a = item("posts/a", "2021-01-01", &[]);

        assert!(!never.and(&counter).matches(&a));
        assert!(Predicate::always().or(&counter).matches(&a));
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        assert!(counter.and(&Predicate::always()).matches(&a));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_all() {
        let empty = Predicate::<Item>::all([]);
        assert_eq!(empty.description(), "always");
        assert!(items().iter().all(|i| empty.matches(i)));

        let both = Predicate::all([Predicate::tagged("rust"), Predicate::path_prefix("posts/b")]);
        let matched: Vec<_> = items().into_iter().filter(|i| both.matches(i)).map(|i| i.path).collect();
        assert_eq!(matched, ["posts/b"]);
    }

    #[test]
    fn test_date_and_title_predicates() {
        let cutoff = parse_date("2021-01-03").unwrap();
        let after = Predicate::published_after(cutoff);
        let before = Predicate::published_before(cutoff);
        let title = Predicate::title_matches(Regex::new("^POSTS/[AB]$").unwrap());

        let paths = |p: &Predicate<Item>| -> Vec<String> {
            items().into_iter().filter(|i| p.matches(i)).map(|i| i.path).collect()
        };
        assert_eq!(paths(&after), ["posts/c", "notes/d"]);
        assert_eq!(paths(&before), ["posts/a", "posts/b"]);
        assert_eq!(paths(&title), ["posts/a", "posts/b"]);
        assert_eq!(paths(&Predicate::in_section("posts")).len(), 4);
    }

    #[test]
    fn test_predicates_are_shareable() {
        let p = Predicate::tagged("rust");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = p.clone();
                std::thread::spawn(move || items().iter().filter(|i| p.matches(i)).count())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
