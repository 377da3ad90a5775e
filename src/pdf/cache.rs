//! LRU cache for rendered frames

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::request::RenderSpec;
use super::types::Frame;

/// Cache key for rendered frames
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number
    pub page: usize,
    /// Zoom factor (stored as millionths for stable hashing)
    pub zoom_millionths: u32,
}

impl CacheKey {
    /// Create a cache key from a render spec
    #[must_use]
    pub fn from_spec(spec: &RenderSpec) -> Self {
        Self {
            page: spec.page,
            zoom_millionths: (spec.zoom * 1_000_000.0) as u32,
        }
    }
}

/// LRU cache for rendered frames
pub struct FrameCache {
    cache: LruCache<CacheKey, Arc<Frame>>,
}

impl FrameCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached frame, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<Frame>> {
        self.cache.get(key).cloned()
    }

    /// Check if a key is in the cache without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a frame into the cache, returning an Arc to it
    pub fn insert(&mut self, key: CacheKey, frame: Frame) -> Arc<Frame> {
        let arc = Arc::new(frame);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached frames
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Invalidate every zoom level of a specific page
    pub fn invalidate_page(&mut self, page: usize) {
        let keys_to_remove: Vec<_> = self
            .cache
            .iter()
            .filter(|(k, _)| k.page == page)
            .map(|(k, _)| k.clone())
            .collect();

        for key in keys_to_remove {
            self.cache.pop(&key);
        }
    }

    /// Number of cached frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
