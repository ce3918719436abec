//! Thread-safe cache handle
//!
//! Every operation holds one mutex for its whole duration, so callers on
//! different threads observe a strictly serial history.

use std::borrow::Borrow;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::cost::CostProvider;
use crate::lru::{EntryMetadata, LruCache};
use crate::stats::CacheStats;

/// Shared LRU cache bounded by total cost and entry count
///
/// Hand it to consumers as `Arc<Cache<K, V>>`.
pub struct Cache<K, V> {
    /// Entries and recency order
    inner: Mutex<LruCache<K, V>>,

    /// Hit/miss and eviction counters
    stats: CacheStats,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache with the given bounds and the default cost provider
    pub fn new(config: CacheConfig) -> Self {
        Self::from_lru(LruCache::new(config))
    }

    /// Create a cache with neither a cost nor a count bound
    pub fn unbounded() -> Self {
        Self::new(CacheConfig::unbounded())
    }

    /// Create a cache with a custom cost provider
    ///
    /// # Arguments
    /// * `config` - Eviction bounds
    /// * `cost_provider` - Weighs each value once, on `set`
    pub fn with_cost_provider<P>(config: CacheConfig, cost_provider: P) -> Self
    where
        P: CostProvider<V> + 'static,
    {
        Self::from_lru(LruCache::with_cost_provider(config, cost_provider))
    }

    /// Wrap an existing single-threaded cache
    pub fn from_lru(lru: LruCache<K, V>) -> Self {
        Self {
            inner: Mutex::new(lru),
            stats: CacheStats::new(),
        }
    }

    /// Get a copy of a value, marking it as most recently used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        // Stats are recorded under the lock so `clear` cannot interleave
        let mut inner = self.inner.lock();
        let value = inner.get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Get an entry's metadata without changing its recency
    pub fn get_metadata<Q>(&self, key: &Q) -> Option<EntryMetadata<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get_metadata(key)
    }

    /// Insert a value, evicting least recently used entries as needed
    pub fn set(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        let evicted = inner.set(key, value);
        self.stats.record_insert();
        self.stats.record_evictions(evicted);
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// Check if a key is cached, without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    /// Remove every entry and reset the statistics
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.clear();
        self.stats.reset();
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Sum of the costs of all entries
    pub fn total_cost(&self) -> usize {
        self.inner.lock().total_cost()
    }

    /// Eviction bounds
    pub fn config(&self) -> CacheConfig {
        *self.inner.lock().config()
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::unbounded()
    }
}
