//! Process-local diagram render cache, keyed by `(path, hash, renderer
//! version)`. Guarded by a read-write lock: readers don't block each
//! other; a miss takes the write lock only to insert.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::entities::content_hash;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: String,
    hash: String,
    renderer_version: String,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub output_path: std::path::PathBuf,
}

#[derive(Default)]
pub struct RenderCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached output path for `source` at `path` if present and
    /// still valid for `renderer_version`.
    pub fn get(&self, path: &str, source: &str, renderer_version: &str) -> Option<CacheEntry> {
        let key = CacheKey {
            path: path.to_string(),
            hash: content_hash(source),
            renderer_version: renderer_version.to_string(),
        };
        self.entries.read().unwrap().get(&key).cloned()
    }

    pub fn insert(&self, path: &str, source: &str, renderer_version: &str, entry: CacheEntry) {
        let key = CacheKey {
            path: path.to_string(),
            hash: content_hash(source),
            renderer_version: renderer_version.to_string(),
        };
        self.entries.write().unwrap().insert(key, entry);
    }

    /// Invalidates every cache entry recorded for `path`, regardless of
    /// hash.
    pub fn invalidate(&self, path: &str) {
        self.entries.write().unwrap().retain(|k, _| k.path != path);
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert_same_source() {
        let cache = RenderCache::new();
        assert!(cache.get("a.d2", "a -> b", "v1").is_none());
        cache.insert(
            "a.d2",
            "a -> b",
            "v1",
            CacheEntry {
                output_path: "dist/a.svg".into(),
            },
        );
        assert!(cache.get("a.d2", "a -> b", "v1").is_some());
    }

    #[test]
    fn source_change_is_a_miss() {
        let cache = RenderCache::new();
        cache.insert(
            "a.d2",
            "a -> b",
            "v1",
            CacheEntry {
                output_path: "dist/a.svg".into(),
            },
        );
        assert!(cache.get("a.d2", "a -> c", "v1").is_none());
    }

    #[test]
    fn invalidate_removes_by_path() {
        let cache = RenderCache::new();
        cache.insert(
            "a.d2",
            "a -> b",
            "v1",
            CacheEntry {
                output_path: "dist/a.svg".into(),
            },
        );
        cache.invalidate("a.d2");
        assert!(cache.get("a.d2", "a -> b", "v1").is_none());
    }
}
