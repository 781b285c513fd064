//! LRU cache of opened grid files.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use spectral_codec::CacheStats;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::Result;

/// Datasets keyed by file path, bounded by entry count.
///
/// Loads happen outside the lock, so two threads missing on the same path
/// may both read it; the later insert replaces the earlier one.
pub struct DatasetCache {
    cache: Mutex<LruCache<PathBuf, Arc<Dataset>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DatasetCache {
    /// Create a cache holding at most `capacity` datasets (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<PathBuf, Arc<Dataset>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Dataset>> {
        let found = self.lock().get(path).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(&self, path: PathBuf, dataset: Arc<Dataset>) {
        if let Some((evicted, _)) = self.lock().push(path.clone(), dataset) {
            if evicted != path {
                debug!(path = %evicted.display(), "Evicted dataset");
            }
        }
    }

    /// Return the cached dataset for `path`, loading it with `load` on a
    /// miss. Failed loads are not cached.
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        if let Some(dataset) = self.get(path) {
            return Ok(dataset);
        }

        let dataset = Arc::new(load()?);
        debug!(path = %path.display(), bytes = dataset.nbytes(), "Loaded dataset");
        self.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(64)
    }
}
