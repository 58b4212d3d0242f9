//! Parsed path cache
//!
//! Stored positions tend to repeat the same handful of paths, so each
//! document resource keeps its most recently parsed ones.

use super::path::Path;
use crate::error::RangeError;
use lru::LruCache;
use std::num::NonZeroUsize;

pub const DEFAULT_CAPACITY: usize = 256;

/// LRU of parsed paths keyed by their source text
#[derive(Debug)]
pub struct PathCache {
    entries: LruCache<String, Path>,
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PathCache {
    /// A capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PathCache {
            entries: LruCache::new(capacity),
        }
    }

    /// Parse `raw`, reusing an earlier parse of the same text
    ///
    /// Malformed paths are not cached.
    pub fn get_or_parse(&mut self, raw: &str) -> Result<Path, RangeError> {
        if let Some(path) = self.entries.get(raw) {
            return Ok(path.clone());
        }
        let path: Path = raw.parse()?;
        self.entries.put(raw.to_string(), path.clone());
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_parsed_paths() {
        let mut cache = PathCache::default();
        let first = cache.get_or_parse("/p/strong").unwrap();
        let second = cache.get_or_parse("/p/strong").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), "/p[1]/strong[1]");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_malformed_paths_not_cached() {
        let mut cache = PathCache::new(4);
        assert!(matches!(
            cache.get_or_parse("p[0"),
            Err(RangeError::MalformedPath { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_least_recent() {
        let mut cache = PathCache::new(2);
        cache.get_or_parse("/a").unwrap();
        cache.get_or_parse("/b").unwrap();
        cache.get_or_parse("/a").unwrap();
        cache.get_or_parse("/c").unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.entries.contains("/a"));
        assert!(!cache.entries.contains("/b"));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = PathCache::new(0);
        cache.get_or_parse("/a").unwrap();
        cache.get_or_parse("/b").unwrap();
        assert_eq!(cache.len(), 1);
    }
}
