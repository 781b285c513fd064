//! Memoized forward transforms.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::spectrum::Spectrum;

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Spectra keyed by a caller-chosen identity (a pressure level, a
/// variable/level pair, ...).
///
/// Entries are never evicted: the source arrays are immutable once loaded.
/// Two threads missing on the same key may both compute; the first insert
/// wins and both callers receive the stored entry.
pub struct SpectrumCache<K> {
    entries: RwLock<HashMap<K, Arc<Spectrum>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Eq + Hash + Clone + std::fmt::Debug> SpectrumCache<K> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a spectrum without computing it.
    pub fn get(&self, key: &K) -> Option<Arc<Spectrum>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let found = entries.get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Return the cached spectrum for `key`, computing it on a miss.
    ///
    /// The computation runs without holding the lock.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<Arc<Spectrum>>
    where
        F: FnOnce() -> Result<Spectrum>,
    {
        if let Some(spectrum) = self.get(&key) {
            return Ok(spectrum);
        }

        debug!(key = ?key, "Spectrum cache miss, computing forward transform");
        let spectrum = Arc::new(compute()?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(entries.entry(key).or_insert(spectrum)))
    }

    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<K: Eq + Hash + Clone + std::fmt::Debug> Default for SpectrumCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
