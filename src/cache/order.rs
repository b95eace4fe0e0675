//! Insertion Order Module
//!
//! Tracks the order in which keys entered the cache, for oldest-first eviction.

use std::collections::VecDeque;

use crate::key::CacheKey;

// == Insertion Order ==
/// Tracks insertion order for eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Lookups and overwrites do not move a key.
#[derive(Debug, Default, Clone)]
pub struct InsertionOrder {
    order: VecDeque<CacheKey>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records a newly inserted key as the newest.
    ///
    /// Callers only push keys that are not already tracked.
    pub fn push(&mut self, key: CacheKey) {
        self.order.push_back(key);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &CacheKey) {
        if let Some(idx) = self.order.iter().position(|k| k == key) {
            self.order.remove(idx);
        }
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest key.
    ///
    /// Returns None if tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<CacheKey> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest key without removing it.
    pub fn peek_oldest(&self) -> Option<&CacheKey> {
        self.order.front()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CacheKey> + '_ {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{key_for, CallArgs};

    fn key(n: i64) -> CacheKey {
        key_for(&CallArgs::new().arg(n)).unwrap()
    }

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.peek_oldest(), None);
    }

    #[test]
    fn test_order_pop_oldest_first() {
        let mut order = InsertionOrder::new();

        order.push(key(1));
        order.push(key(2));
        order.push(key(3));

        assert_eq!(order.pop_oldest(), Some(key(1)));
        assert_eq!(order.pop_oldest(), Some(key(2)));
        assert_eq!(order.len(), 1);
        assert_eq!(order.peek_oldest(), Some(&key(3)));
    }

    #[test]
    fn test_order_pop_empty() {
        let mut order = InsertionOrder::new();
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_order_remove() {
        let mut order = InsertionOrder::new();

        order.push(key(1));
        order.push(key(2));
        order.push(key(3));

        order.remove(&key(2));

        assert_eq!(order.len(), 2);
        assert!(!order.contains(&key(2)));
        assert_eq!(order.iter().cloned().collect::<Vec<_>>(), vec![key(1), key(3)]);
    }

    #[test]
    fn test_order_remove_nonexistent_key() {
        let mut order = InsertionOrder::new();
        order.push(key(1));

        order.remove(&key(9));

        assert_eq!(order.len(), 1);
        assert!(order.contains(&key(1)));
    }
}
