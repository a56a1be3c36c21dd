//! Decoded backgrounds, kept for the next pass
//!
//! A pass whose background is already cached composites it synchronously,
//! so repeating the same parameters gives the same image every time.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use engrave_core::{cache_config, config::ImageCacheConfig, BackgroundRef};

use crate::background::BackgroundImage;

/// Default capacity when the configured one is zero
const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(v) => v,
    None => unreachable!(),
};

/// A background is only reusable at the canvas size it was scaled to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageCacheKey {
    pub reference: BackgroundRef,
    pub width: u32,
    pub height: u32,
}

impl ImageCacheKey {
    pub fn new(reference: BackgroundRef, width: u32, height: u32) -> Self {
        Self {
            reference,
            width,
            height,
        }
    }
}

/// Snapshot of cache behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// LRU of decoded backgrounds
///
/// Honors both its own `enabled` flag and the process-wide switch in
/// [`cache_config`]; when either is off, lookups miss and inserts are
/// dropped.
pub struct ImageCache {
    entries: Mutex<LruCache<ImageCacheKey, Arc<BackgroundImage>>>,
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ImageCache {
    pub fn new(config: &ImageCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            enabled: config.enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && cache_config::is_image_cache_enabled()
    }

    pub fn get(&self, key: &ImageCacheKey) -> Option<Arc<BackgroundImage>> {
        if !self.is_enabled() {
            return None;
        }
        let found = self.entries.lock().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, key: ImageCacheKey, image: Arc<BackgroundImage>) {
        if !self.is_enabled() {
            return;
        }
        log::debug!("ImageCache: storing {}", key.reference.describe());
        self.entries.lock().put(key, image);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            size: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(&ImageCacheConfig::default())
    }
}
