//! Cache Store Module
//!
//! Backing map for memoized results, combining HashMap storage with
//! insertion-order tracking for bounded size.

use std::collections::HashMap;
use std::iter;

use tracing::debug;

use crate::cache::{CacheStats, InsertionOrder};
use crate::key::CacheKey;
use crate::truthy::Truthy;
use crate::util::consume;

// == Cache Store ==
/// Key to result mapping with oldest-first eviction.
///
/// The store does not own a size limit: whoever drives it passes the limit
/// to [`CacheStore::control_size`]. This lets one store be lent to several
/// wrappers as a per-call override.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<CacheKey, V>,
    /// Insertion order of the keys in `entries`
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new empty CacheStore.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
        }
    }

    // == Lookup ==
    /// Returns a clone of the stored value if it is present and truthy.
    ///
    /// A falsy stored value counts as a miss, so the caller recomputes it.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<V>
    where
        V: Clone + Truthy,
    {
        match self.entries.get(key) {
            Some(value) if value.is_truthy() => {
                self.stats.record_hit();
                Some(value.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Returns the stored value without recording statistics, truthy or not.
    pub fn peek(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key)
    }

    // == Insert ==
    /// Stores a value, returning the previous one for that key.
    ///
    /// Overwriting keeps the key's original insertion position.
    pub fn insert(&mut self, key: CacheKey, value: V) -> Option<V> {
        let previous = self.entries.insert(key.clone(), value);
        if previous.is_none() {
            self.order.push(key);
        }
        self.stats.set_total_entries(self.entries.len());
        previous
    }

    // == Remove ==
    /// Removes an entry by key.
    pub fn remove(&mut self, key: &CacheKey) -> Option<V> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Control Size ==
    /// Evicts the oldest entries until at most `max` remain.
    ///
    /// Removes exactly `len - max` entries when over the limit, none
    /// otherwise. Returns the number evicted.
    pub fn control_size(&mut self, max: usize) -> usize {
        let excess = self.entries.len().saturating_sub(max);
        if excess == 0 {
            return 0;
        }

        debug!(
            size = self.entries.len(),
            max, excess, "Maximum cache size reached, shrinking"
        );

        {
            let entries = &mut self.entries;
            let order = &mut self.order;
            let mut evictions = iter::from_fn(|| order.pop_oldest())
                .take(excess)
                .inspect(|key| debug!(key = %key, "evicting cache entry"))
                .map(|key| entries.remove(&key));
            consume(&mut evictions, None);
        }

        self.stats.record_evictions(excess);
        self.stats.set_total_entries(self.entries.len());
        excess
    }

    pub(crate) fn record_bypass(&mut self) {
        self.stats.record_bypass();
    }

    // == Keys ==
    /// Iterates cached keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> + '_ {
        self.order.iter()
    }

    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drops every entry. Statistics other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

// == Standalone Capacity Control ==
/// Shrinks `cache` to at most `size` entries, oldest first.
///
/// A missing cache is a no-op. Returns the number of evicted entries.
/// [`STANDALONE_CACHE_SIZE`](crate::cache::STANDALONE_CACHE_SIZE) is the
/// conventional `size` outside a memoizing wrapper.
pub fn control_cache_size<V>(cache: Option<&mut CacheStore<V>>, size: usize) -> usize {
    match cache {
        Some(store) => store.control_size(size),
        None => {
            debug!("no cache to control");
            0
        }
    }
}
