//! Symbolic resource names
//!
//! Provides [`ResourceName`], the case-insensitive key shared by descriptor
//! files, identifier tables and files on disk.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Symbolic name of a declared resource (`icon` in `@drawable/icon`)
///
/// Comparison, ordering and hashing ignore ASCII case, so `Icon` and `icon`
/// name the same resource. The spelling first seen is kept for display.
#[derive(Debug, Clone)]
pub struct ResourceName {
    spelling: String,
    key: String,
}

impl ResourceName {
    /// Create a name from its textual form
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let spelling = name.into();
        let key = spelling.to_ascii_lowercase();
        Self { spelling, key }
    }

    /// Name as it was written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.spelling
    }

    /// Lowercase comparison key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Case-insensitive comparison against a raw string
    #[inline]
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.key.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for ResourceName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ResourceName {}

impl Hash for ResourceName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ResourceName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourceName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Display for ResourceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

impl From<&str> for ResourceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ResourceName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn equality_ignores_case() {
        assert_eq!(ResourceName::new("Hero_Banner"), ResourceName::new("hero_banner"));
        assert_ne!(ResourceName::new("hero"), ResourceName::new("hero2"));
    }

    #[test]
    fn keeps_original_spelling() {
        let name = ResourceName::new("Hero_Banner");
        assert_eq!(name.as_str(), "Hero_Banner");
        assert_eq!(name.key(), "hero_banner");
        assert_eq!(name.to_string(), "Hero_Banner");
    }

    #[test]
    fn hash_sets_deduplicate_across_case() {
        let set: HashSet<ResourceName> = ["icon", "ICON", "Icon"].into_iter().map(ResourceName::from).collect();
        assert_eq!(set.len(), 1);

        let ordered: BTreeSet<ResourceName> = ["b", "A", "a"].into_iter().map(ResourceName::from).collect();
        let keys: Vec<&str> = ordered.iter().map(ResourceName::key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn matches_raw_strings() {
        let name = ResourceName::new("logo");
        assert!(name.matches("LOGO"));
        assert!(!name.matches("logo2"));
    }
}
