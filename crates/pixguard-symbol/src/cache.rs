//! Process-wide identifier table cache
//!
//! Keyed by (absolute archive path, namespace). Only successful parses are
//! stored, so a missing archive is re-examined on the next call. Concurrent
//! variant builds racing on the same key compute identical tables; the first
//! insert wins and later ones are discarded.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::archive::parse_archive;
use crate::table::SymbolTable;

static GLOBAL: Lazy<SymbolCache> = Lazy::new(SymbolCache::new);

/// Cache key: absolute archive path plus namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    path: PathBuf,
    namespace: String,
}

impl CacheKey {
    /// Build a key, making `path` absolute against the working directory
    #[must_use]
    pub fn new(path: &Path, namespace: &str) -> Self {
        Self {
            path: absolute(path),
            namespace: namespace.trim().to_owned(),
        }
    }

    /// Absolute archive path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached tables
    pub entry_count: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the archive
    pub misses: u64,
}

/// Concurrent cache of parsed identifier tables
#[derive(Debug, Default)]
pub struct SymbolCache {
    inner: DashMap<CacheKey, Arc<SymbolTable>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SymbolCache {
    /// Empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance
    #[inline]
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Identifier table for `archive` under `namespace`
    ///
    /// Never fails: a blank namespace, a missing archive, or an unreadable
    /// archive all yield an empty table (logged, not cached).
    pub fn load(&self, archive: &Path, namespace: &str) -> Arc<SymbolTable> {
        if namespace.trim().is_empty() {
            debug!(archive = %archive.display(), "Blank namespace, no identifier table");
            return Arc::new(SymbolTable::new());
        }

        let key = CacheKey::new(archive, namespace);
        if let Some(table) = self.inner.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(table.value());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        if !key.path().is_file() {
            warn!(archive = %key.path().display(), "Identifier archive not found");
            return Arc::new(SymbolTable::new());
        }

        match parse_archive(key.path(), key.namespace()) {
            Ok(table) => {
                debug!(
                    archive = %key.path().display(),
                    namespace = key.namespace(),
                    entries = table.len(),
                    "Loaded identifier table"
                );
                let table = Arc::new(table);
                Arc::clone(self.inner.entry(key).or_insert(table).value())
            }
            Err(e) => {
                warn!(error = %e, "Identifier archive unreadable");
                Arc::new(SymbolTable::new())
            }
        }
    }

    /// Check if a table is cached for this key
    #[must_use]
    pub fn contains(&self, archive: &Path, namespace: &str) -> bool {
        self.inner.contains_key(&CacheKey::new(archive, namespace))
    }

    /// Drop every cached table
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.clear();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixguard_test_utils::{write_jar, ClassBuilder};
    use pixguard_types::{ResourceId, ResourceName};
    use pretty_assertions::assert_eq;

    fn jar_with_icon(path: &Path, id: i32) {
        let module = ClassBuilder::new("com/example/app/R$drawable")
            .int_constant("icon", id)
            .build();
        write_jar(path, &[("com/example/app/R$drawable.class", module.as_slice())]);
    }

    #[test]
    fn repeat_loads_hit_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("R.jar");
        jar_with_icon(&jar, 0x7f08_0001);

        let cache = SymbolCache::new();
        let first = cache.load(&jar, "com.example.app");

        // Replacing the archive on disk is not observed while cached
        jar_with_icon(&jar, 0x7f08_0009);
        let second = cache.load(&jar, "com.example.app");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            second.resolve("drawable", &ResourceName::new("icon")),
            Some(ResourceId::new(0x7f08_0001))
        );
        assert_eq!(
            cache.stats(),
            CacheStats {
                entry_count: 1,
                hits: 1,
                misses: 1
            }
        );

        cache.invalidate_all();
        let third = cache.load(&jar, "com.example.app");
        assert_eq!(
            third.resolve("drawable", &ResourceName::new("icon")),
            Some(ResourceId::new(0x7f08_0009))
        );
    }

    #[test]
    fn concurrent_loads_share_one_table() {
        const THREADS: usize = 8;
        const LOADS_PER_THREAD: usize = 16;

        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("R.jar");
        jar_with_icon(&jar, 0x7f08_0001);
        let cache = SymbolCache::new();

        let tables: Vec<Arc<SymbolTable>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        (0..LOADS_PER_THREAD)
                            .map(|_| cache.load(&jar, "com.example.app"))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });

        assert_eq!(tables.len(), THREADS * LOADS_PER_THREAD);
        let cached = cache.load(&jar, "com.example.app");
        for table in &tables {
            assert!(Arc::ptr_eq(table, &cached));
        }
        assert_eq!(
            cached.resolve("drawable", &ResourceName::new("icon")),
            Some(ResourceId::new(0x7f08_0001))
        );

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.hits + stats.misses, (THREADS * LOADS_PER_THREAD + 1) as u64);
        assert!(stats.misses >= 1);
    }

    #[test]
    fn namespace_is_part_of_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("R.jar");
        jar_with_icon(&jar, 1);

        let cache = SymbolCache::new();
        assert_eq!(cache.load(&jar, "com.example.app").len(), 1);
        assert!(cache.load(&jar, "com.other").is_empty());
        assert_eq!(cache.stats().entry_count, 2);
    }

    #[test]
    fn absent_archive_is_empty_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("R.jar");
        let cache = SymbolCache::new();

        assert!(cache.load(&jar, "com.example.app").is_empty());
        assert!(!cache.contains(&jar, "com.example.app"));

        jar_with_icon(&jar, 1);
        assert_eq!(cache.load(&jar, "com.example.app").len(), 1);
        assert!(cache.contains(&jar, "com.example.app"));
    }

    #[test]
    fn blank_namespace_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("R.jar");
        jar_with_icon(&jar, 1);
        let cache = SymbolCache::new();
        assert!(cache.load(&jar, "  ").is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn relative_keys_become_absolute() {
        let key = CacheKey::new(Path::new("build/R.jar"), " a.b ");
        assert!(key.path().is_absolute());
        assert_eq!(key.namespace(), "a.b");
    }
}
