//! Synchronous memoizing wrapper.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::ReentrantMutex;
use tracing::debug;

use super::{admit, lookup, resolve_capacity, CacheSelection, Lookup};
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::MemoError;
use crate::key::{CacheKey, CallArgs};
use crate::truthy::Truthy;

// == Memoized ==
/// A computation wrapped with its own bounded cache.
///
/// Each wrapper owns one shared [`CacheStore`], created on construction and
/// living as long as the wrapper. A call on the shared store holds a
/// re-entrant lock from lookup to insertion, so callers on other threads
/// with the same key wait and are then served from the cache. The store
/// itself is only borrowed for the lookup and the insertion, which lets a
/// computation call back into its own wrapper on the same thread: recursive
/// functions read and fill the same cache.
///
/// Errors returned by the computation reach the caller unchanged and are
/// never stored.
pub struct Memoized<F, V, E> {
    name: String,
    compute: F,
    /// None when the configured size was rejected
    capacity: Option<NonZeroUsize>,
    config_error: Option<MemoError>,
    shared: ReentrantMutex<RefCell<CacheStore<V>>>,
    /// Calls that skipped every store
    bypasses: AtomicU64,
    _marker: PhantomData<fn() -> E>,
}

impl<F, V, E> Memoized<F, V, E>
where
    F: Fn(&CallArgs) -> Result<V, E>,
    V: Clone + Truthy,
{
    // == Constructors ==
    /// Wraps `compute` with the default cache size of 50.
    pub fn new(name: impl Into<String>, compute: F) -> Self {
        Self::from_config(name, compute, &Config::default())
    }

    /// Wraps `compute` with a cache of at most `max_cache_size` entries.
    ///
    /// Zero or negative sizes are rejected: the wrapper still works but every
    /// call bypasses the cache. See [`Memoized::config_error`].
    pub fn with_max_cache_size(name: impl Into<String>, compute: F, max_cache_size: i64) -> Self {
        Self::from_config(name, compute, &Config { max_cache_size })
    }

    pub fn from_config(name: impl Into<String>, compute: F, config: &Config) -> Self {
        let name = name.into();
        let (capacity, config_error) = resolve_capacity(&name, config);
        Self {
            name,
            compute,
            capacity,
            config_error,
            shared: ReentrantMutex::new(RefCell::new(CacheStore::new())),
            bypasses: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    // == Call ==
    /// Calls through the shared cache.
    pub fn call(&self, args: &CallArgs) -> Result<V, E> {
        self.call_with(args, CacheSelection::Shared)
    }

    /// Calls through the cache chosen by `selection`.
    pub fn call_with(&self, args: &CallArgs, selection: CacheSelection<'_, V>) -> Result<V, E> {
        let Some(capacity) = self.capacity else {
            return self.bypass(args, "cache misconfigured");
        };

        match selection {
            CacheSelection::Disabled => self.bypass(args, "cache disabled for this call"),
            CacheSelection::Shared => {
                let store = self.shared.lock();
                self.call_shared(&store, args, capacity)
            }
            CacheSelection::Override(store) => self.call_cached(store, args, capacity),
        }
    }

    /// Like [`Self::call_cached`], but releases the store borrow while
    /// computing so nested calls on this thread can use it.
    fn call_shared(
        &self,
        store: &RefCell<CacheStore<V>>,
        args: &CallArgs,
        capacity: NonZeroUsize,
    ) -> Result<V, E> {
        let found = lookup(&self.name, &mut store.borrow_mut(), args, capacity);
        match found {
            Lookup::Hit(value) => Ok(value),
            Lookup::NoKey => (self.compute)(args),
            Lookup::Miss(key) => {
                let value = (self.compute)(args)?;
                admit(&mut store.borrow_mut(), key, value.clone(), capacity);
                Ok(value)
            }
        }
    }

    fn call_cached(
        &self,
        store: &mut CacheStore<V>,
        args: &CallArgs,
        capacity: NonZeroUsize,
    ) -> Result<V, E> {
        match lookup(&self.name, store, args, capacity) {
            Lookup::Hit(value) => Ok(value),
            Lookup::NoKey => (self.compute)(args),
            Lookup::Miss(key) => {
                let value = (self.compute)(args)?;
                admit(store, key, value.clone(), capacity);
                Ok(value)
            }
        }
    }

    fn bypass(&self, args: &CallArgs, reason: &str) -> Result<V, E> {
        debug!(function = %self.name, reason, "Bypassing cache");
        self.bypasses.fetch_add(1, Ordering::Relaxed);
        (self.compute)(args)
    }

    // == Capacity Control ==
    /// Runs the capacity pass on the shared store, returning the number of
    /// evicted entries. A misconfigured wrapper has nothing to control.
    pub fn control_cache_size(&self) -> usize {
        match self.capacity {
            Some(capacity) => self.shared.lock().borrow_mut().control_size(capacity.get()),
            None => 0,
        }
    }
}

impl<F, V, E> Memoized<F, V, E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The effective cache size, or None when the cache is disabled.
    pub fn max_cache_size(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    /// The error that disabled the cache at construction, if any.
    pub fn config_error(&self) -> Option<&MemoError> {
        self.config_error.as_ref()
    }

    // == Stats ==
    /// Statistics of the shared store, including calls that bypassed it.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.shared.lock().borrow().stats();
        stats.bypasses += self.bypasses.load(Ordering::Relaxed);
        stats
    }

    /// Keys of the shared store, oldest first.
    pub fn cached_keys(&self) -> Vec<CacheKey> {
        self.shared.lock().borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().borrow().is_empty()
    }
}

impl<F, V, E> std::fmt::Debug for Memoized<F, V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("max_cache_size", &self.max_cache_size())
            .field("len", &self.len())
            .finish()
    }
}
