//! Payload cache for base64-encoded image data.
//!
//! Entries are evicted least-recently-used first once the estimated byte size
//! of all entries would exceed the configured budget. Sizes are estimated from
//! the encoded length rather than measured after decoding.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::{BASE64_SIZE_RATIO, IMAGE_CACHE_MAX_BYTES};
use crate::model::Payload;

/// Build the cache key for a path, optionally qualified by a thumbnail size.
pub fn cache_key(path: &Path, size: Option<u32>) -> String {
    match size {
        Some(size) if size > 0 => format!("{}_{}", path.display(), size),
        _ => path.display().to_string(),
    }
}

struct CacheEntry {
    data: Payload,
    /// Value of the access counter at the last read or write
    last_access: u64,
    size: usize,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub count: usize,
    pub size: usize,
    pub max_size: usize,
}

/// Size-bounded LRU cache keyed by path strings.
pub struct ImageCache {
    entries: HashMap<String, CacheEntry>,
    max_size: usize,
    current_size: usize,
    /// Monotonic access counter; orders entries by recency
    clock: u64,
}

impl ImageCache {
    /// Create a cache with the default 100 MB budget.
    pub fn new() -> Self {
        Self::with_max_size(IMAGE_CACHE_MAX_BYTES)
    }

    /// Create a cache with a custom byte budget.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            current_size: 0,
            clock: 0,
        }
    }

    /// Estimated decoded size of a base64 payload.
    pub fn estimate_size(data: &str) -> usize {
        (data.len() as f64 * BASE64_SIZE_RATIO) as usize
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Get a payload and mark it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<Payload> {
        let now = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_access = now;
        Some(Arc::clone(&entry.data))
    }

    /// Insert or overwrite a payload, evicting older entries to make room.
    ///
    /// A payload larger than the whole budget empties the cache and is still stored.
    pub fn set(&mut self, key: impl Into<String>, data: Payload) {
        let key = key.into();
        let size = Self::estimate_size(&data);

        if let Some(existing) = self.entries.remove(&key) {
            self.current_size -= existing.size;
        }

        self.evict_if_necessary(size);

        let last_access = self.tick();
        self.entries.insert(
            key,
            CacheEntry {
                data,
                last_access,
                size,
            },
        );
        self.current_size += size;
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_size -= entry.size;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            count: self.entries.len(),
            size: self.current_size,
            max_size: self.max_size,
        }
    }

    fn evict_if_necessary(&mut self, incoming: usize) {
        while self.current_size + incoming > self.max_size && !self.entries.is_empty() {
            self.evict_least_recently_used();
        }
    }

    fn evict_least_recently_used(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            log::debug!("Evicting cached payload: {}", key);
            self.delete(&key);
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide handle to an [`ImageCache`], shared between loader threads.
#[derive(Clone, Default)]
pub struct SharedImageCache {
    inner: Arc<Mutex<ImageCache>>,
}

impl SharedImageCache {
    pub fn new(cache: ImageCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ImageCache> {
        // The cache holds no invariants a panicking reader could break halfway
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Payload> {
        self.lock().get(key)
    }

    pub fn set(&self, key: impl Into<String>, data: Payload) {
        self.lock().set(key, data);
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Return the cached payload for `path`, or run `loader` and cache its result.
    ///
    /// The lock is released while the loader runs, so two threads missing on
    /// the same key may both load it; the later write wins.
    pub fn get_or_load<E>(
        &self,
        path: &Path,
        loader: impl FnOnce() -> Result<String, E>,
    ) -> Result<Payload, E> {
        let key = cache_key(path, None);
        if let Some(cached) = self.get(&key) {
            log::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let data: Payload = Arc::from(loader()?);
        self.set(key, Arc::clone(&data));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> Payload {
        Arc::from("A".repeat(len))
    }

    #[test]
    fn test_get_missing_key() {
        let mut cache = ImageCache::new();
        assert_eq!(cache.get("never-set"), None);
    }

    #[test]
    fn test_get_after_set() {
        let mut cache = ImageCache::new();
        cache.set("a.png", Arc::from("abcd"));
        assert_eq!(cache.get("a.png").as_deref(), Some("abcd"));
        assert!(cache.has("a.png"));
    }

    #[test]
    fn test_overwrite_replaces_size() {
        let mut cache = ImageCache::with_max_size(10_000);
        cache.set("k", payload(400));
        cache.set("k", payload(800));
        let stats = cache.stats();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.size, 600);
    }

    #[test]
    fn test_lru_evicts_least_recently_accessed() {
        // Each 400-char payload is estimated at 300 bytes; A, B, C fill the budget.
        let mut cache = ImageCache::with_max_size(900);
        cache.set("A", payload(400));
        cache.set("B", payload(400));
        cache.set("C", payload(400));

        assert!(cache.get("A").is_some());
        cache.set("D", payload(400));

        assert!(cache.has("A"));
        assert!(!cache.has("B"), "B was the least recently used entry");
        assert!(cache.has("C"));
        assert!(cache.has("D"));
        assert_eq!(cache.stats().size, 900);
    }

    #[test]
    fn test_size_never_exceeds_budget() {
        let mut cache = ImageCache::with_max_size(1_000);
        for i in 0..50 {
            cache.set(format!("img{}", i), payload(100 + (i * 37) % 900));
            assert!(cache.stats().size <= 1_000);
        }
    }

    #[test]
    fn test_oversized_entry_empties_cache() {
        let mut cache = ImageCache::with_max_size(100);
        cache.set("small", payload(40));
        cache.set("huge", payload(1_000));
        assert!(!cache.has("small"));
        assert!(cache.has("huge"));
        assert_eq!(cache.stats().count, 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut cache = ImageCache::new();
        cache.set("a", payload(8));
        cache.set("b", payload(8));

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(cache.stats().count, 1);
        assert_eq!(cache.stats().size, 6);

        cache.clear();
        assert_eq!(
            cache.stats(),
            CacheStats {
                count: 0,
                size: 0,
                max_size: IMAGE_CACHE_MAX_BYTES
            }
        );
    }

    #[test]
    fn test_cache_key() {
        let path = Path::new("/photos/a.png");
        assert_eq!(cache_key(path, None), "/photos/a.png");
        assert_eq!(cache_key(path, Some(256)), "/photos/a.png_256");
        assert_eq!(cache_key(path, Some(0)), "/photos/a.png");
    }

    #[test]
    fn test_get_or_load_runs_loader_once() {
        let cache = SharedImageCache::default();
        let path = Path::new("/photos/a.png");
        let mut calls = 0;

        for _ in 0..3 {
            let data = cache
                .get_or_load(path, || {
                    calls += 1;
                    Ok::<_, String>("pixels".to_string())
                })
                .unwrap();
            assert_eq!(&*data, "pixels");
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_or_load_does_not_cache_errors() {
        let cache = SharedImageCache::default();
        let path = Path::new("/photos/broken.png");

        let result = cache.get_or_load(path, || Err::<String, _>("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(cache.stats().count, 0);
    }
}
