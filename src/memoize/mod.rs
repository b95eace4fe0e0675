//! Memoize Module
//!
//! Wrappers that memoize a computation behind a bounded, function-owned cache.
//!
//! # Call Flow
//! 1. Resolve the active cache: the wrapper's shared store, a per-call
//!    override, or none at all
//! 2. Derive a key from the key-able subset of the arguments
//! 3. Serve a truthy stored result, or compute, store and return
//! 4. Without a cache or a key, compute directly

mod async_memoized;
mod memoized;

use std::num::NonZeroUsize;

use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::MemoError;
use crate::key::{key_for, CacheKey, CallArgs};
use crate::truthy::Truthy;

pub use async_memoized::AsyncMemoized;
pub use memoized::Memoized;

// == Cache Selection ==
/// Chooses which cache a single call reads and writes.
///
/// An override lasts for one call only. It never clears or rewrites the
/// wrapper's shared store, so later calls using [`CacheSelection::Shared`]
/// see the shared entries exactly as they were before the override.
#[derive(Debug)]
pub enum CacheSelection<'a, V> {
    /// The store owned by the wrapper
    Shared,
    /// A caller-owned store used for this call instead of the shared one
    Override(&'a mut CacheStore<V>),
    /// Compute without reading or writing any store
    Disabled,
}

impl<V> Default for CacheSelection<'_, V> {
    fn default() -> Self {
        CacheSelection::Shared
    }
}

/// Validates the configured size, logging the degradation on failure.
fn resolve_capacity(name: &str, config: &Config) -> (Option<NonZeroUsize>, Option<MemoError>) {
    match config.capacity() {
        Ok(capacity) => (Some(capacity), None),
        Err(err) => {
            warn!(function = %name, error = %err, "Cache disabled, every call will bypass it");
            (None, Some(err))
        }
    }
}

/// Outcome of consulting a store before computing.
enum Lookup<V> {
    /// A truthy result was stored
    Hit(V),
    /// The result must be computed and stored under this key
    Miss(CacheKey),
    /// No key-able subset, compute without caching
    NoKey,
}

/// Derives the key and consults `store`.
///
/// On a miss the capacity pass runs before returning, so the caller can go
/// straight to computing.
fn lookup<V: Clone + Truthy>(
    name: &str,
    store: &mut CacheStore<V>,
    args: &CallArgs,
    capacity: NonZeroUsize,
) -> Lookup<V> {
    let Some(key) = key_for(args) else {
        debug!(
            function = %name,
            ?args,
            "Unable to get a key-able subset of the arguments"
        );
        store.record_bypass();
        return Lookup::NoKey;
    };

    debug!(function = %name, key = %key, "Key-able key used");

    if let Some(value) = store.lookup(&key) {
        debug!(function = %name, "Result retrieved from cache");
        return Lookup::Hit(value);
    }

    debug!(function = %name, key = %key, "Call absent from cache");
    store.control_size(capacity.get());
    Lookup::Miss(key)
}

/// Stores a freshly computed result and re-establishes the size bound.
fn admit<V>(store: &mut CacheStore<V>, key: CacheKey, value: V, capacity: NonZeroUsize) {
    store.insert(key, value);
    store.control_size(capacity.get());
}
