//! LRU (Least Recently Used) cache bounded by total cost and entry count
//!
//! A hash table maps each key to a handle in an [`OrderedList`]; the list
//! head is the least recently used entry and is evicted first.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::cost::{CostProvider, ShallowSize};
use crate::list::{Handle, OrderedList};

/// Cached value with its bookkeeping
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    cost: usize,
    created_at: Instant,
    last_accessed_at: Instant,
}

impl<K, V> Entry<K, V> {
    /// Create an entry stamped with the current time
    ///
    /// Used to pre-build a list for [`LruCache::with_parts`]; `set` creates
    /// entries itself.
    pub fn new(key: K, value: V, cost: usize) -> Self {
        let now = Instant::now();
        Self {
            key,
            value,
            cost,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Key the entry is stored under
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Cost computed at insertion
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// When the entry was inserted
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// When the entry was last read through `get`
    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
    }

    fn metadata(&self) -> EntryMetadata<K>
    where
        K: Clone,
    {
        EntryMetadata {
            key: self.key.clone(),
            cost: self.cost,
            created_at: self.created_at,
            last_accessed_at: self.last_accessed_at,
        }
    }
}

/// Snapshot of an entry's bookkeeping, taken without touching recency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata<K> {
    /// Key the entry is stored under
    pub key: K,
    /// Cost computed at insertion
    pub cost: usize,
    /// When the entry was inserted
    pub created_at: Instant,
    /// When the entry was last read through `get`
    pub last_accessed_at: Instant,
}

/// LRU cache evicting on either a cost or a count bound
///
/// Not synchronized; wrap it in a [`Cache`](crate::Cache) to share it
/// between threads.
pub struct LruCache<K, V> {
    map: HashMap<K, Handle, RandomState>,
    list: OrderedList<Entry<K, V>>,
    cost_provider: Box<dyn CostProvider<V>>,
    /// Exact sum of entry costs; never saturates
    total_cost: u128,
    config: CacheConfig,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache that weighs values with [`ShallowSize`]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_cost_provider(config, ShallowSize)
    }

    /// Create a cache with neither a cost nor a count bound
    pub fn unbounded() -> Self {
        Self::new(CacheConfig::unbounded())
    }

    /// Create a cache with a custom cost provider
    pub fn with_cost_provider<P>(config: CacheConfig, cost_provider: P) -> Self
    where
        P: CostProvider<V> + 'static,
    {
        Self::with_parts(config, OrderedList::new(), cost_provider)
    }

    /// Create a cache on top of a pre-built list
    ///
    /// Entries already in `list` are adopted in their current order. If a
    /// key appears more than once, the entry nearest the tail wins. The
    /// bounds are enforced before this returns.
    ///
    /// # Arguments
    /// * `config` - Eviction bounds
    /// * `list` - Ordered list to build on, usually empty
    /// * `cost_provider` - Weighs values on `set`
    ///
    /// # Example
    /// ```
    /// use costlru::{CacheConfig, Entry, LruCache, OrderedList};
    ///
    /// let mut list = OrderedList::new();
    /// list.append(Entry::new("a", 1u32, 4));
    /// list.append(Entry::new("b", 2u32, 4));
    ///
    /// let cache = LruCache::with_parts(CacheConfig::new(6, 10), list, |_: &u32| 4);
    /// assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["b"]);
    /// assert_eq!(cache.total_cost(), 4);
    /// ```
    pub fn with_parts<P>(
        config: CacheConfig,
        list: OrderedList<Entry<K, V>>,
        cost_provider: P,
    ) -> Self
    where
        P: CostProvider<V> + 'static,
    {
        let mut cache = Self {
            map: HashMap::with_hasher(RandomState::new()),
            list,
            cost_provider: Box::new(cost_provider),
            total_cost: 0,
            config,
        };
        cache.adopt_list();
        debug!(
            max_cost = config.max_cost,
            max_count = config.max_count,
            adopted = cache.len(),
            "created lru cache"
        );
        cache
    }

    /// Get a value, marking it as most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.map.get(key)?;
        self.list.move_to_tail(handle).ok()?;
        let entry = self.list.get_mut(handle)?;
        entry.touch();
        Some(&entry.value)
    }

    /// Get an entry's metadata without changing its recency
    pub fn get_metadata<Q>(&self, key: &Q) -> Option<EntryMetadata<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.map.get(key)?;
        self.list.get(*handle).map(Entry::metadata)
    }

    /// Insert a value as the most recently used entry
    ///
    /// An existing entry under the same key is replaced. Least recently used
    /// entries are then evicted until both bounds hold again, which may
    /// include the new entry itself if its cost alone exceeds `max_cost`.
    ///
    /// # Returns
    /// * `usize` - Number of entries evicted
    pub fn set(&mut self, key: K, value: V) -> usize {
        let cost = self.cost_provider.cost(&value);

        if let Some(old) = self.detach(&key) {
            trace!(old_cost = old.cost, new_cost = cost, "replacing cached entry");
        }

        let handle = self.list.append(Entry::new(key.clone(), value, cost));
        self.map.insert(key, handle);
        self.total_cost += cost as u128;

        self.purge()
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.detach(key).map(|entry| entry.value)
    }

    /// Check if a key is cached, without changing its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        let dropped = self.map.len();
        self.map.clear();
        self.list.clear();
        self.total_cost = 0;
        debug!(dropped, "cleared lru cache");
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sum of the costs of all entries
    ///
    /// Purge keeps the sum within `max_cost`, so it always fits a `usize`.
    pub fn total_cost(&self) -> usize {
        usize::try_from(self.total_cost).unwrap_or(usize::MAX)
    }

    /// Eviction bounds
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.list.iter().map(Entry::key)
    }

    /// Read-only view of the recency list
    pub fn list(&self) -> &OrderedList<Entry<K, V>> {
        &self.list
    }

    /// Unlink a key from both the table and the list, settling its cost
    fn detach<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.map.remove(key)?;
        let entry = self.list.remove(handle).ok()?;
        self.total_cost -= entry.cost as u128;
        Some(entry)
    }

    /// Evict from the head until both bounds hold
    fn purge(&mut self) -> usize {
        let mut evicted = 0;

        while self.config.is_over(self.total_cost, self.map.len()) {
            let Some(entry) = self.list.pop_head() else {
                break;
            };
            self.map.remove(&entry.key);
            self.total_cost -= entry.cost as u128;
            evicted += 1;
            trace!(cost = entry.cost, total_cost = self.total_cost(), "evicted lru entry");
        }

        evicted
    }

    /// Index entries of an injected list, dropping older duplicates
    fn adopt_list(&mut self) {
        let handles: Vec<Handle> = self.list.handles().collect();

        for handle in handles.into_iter().rev() {
            let Some(entry) = self.list.get(handle) else {
                continue;
            };

            if self.map.contains_key(&entry.key) {
                // Handle came from `handles()` above, so it is live
                let removed = self.list.remove(handle);
                debug_assert!(removed.is_ok());
                continue;
            }

            let (key, cost) = (entry.key.clone(), entry.cost);
            self.map.insert(key, handle);
            self.total_cost += cost as u128;
        }

        self.purge();
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K, V> std::fmt::Debug for LruCache<K, V>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("keys", &self.list.iter().map(Entry::key).collect::<Vec<_>>())
            .field("total_cost", &self.total_cost)
            .field("config", &self.config)
            .finish()
    }
}
