//! Asynchronous memoizing wrapper.
//!
//! Same contract as [`Memoized`](super::Memoized) for computations that
//! return a future. The shared store is guarded by a `tokio` mutex held
//! across the computation's `.await`, so concurrent tasks calling with the
//! same key compute once and the rest are served from the cache.
//!
//! A computation that calls back into its own wrapper from the same task
//! would wait on that mutex forever. Such nested calls are detected through
//! a task-local list of held wrappers and bypass the cache instead.

use std::future::Future;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use super::{admit, lookup, resolve_capacity, CacheSelection, Lookup};
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::MemoError;
use crate::key::{CacheKey, CallArgs};
use crate::truthy::Truthy;

/// Source of wrapper identities for re-entry detection
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

tokio::task_local! {
    /// Wrappers whose shared lock is held by the current task
    static HELD_LOCKS: Vec<u64>;
}

// == Async Memoized ==
/// An async computation wrapped with its own bounded cache.
///
/// Owns one shared [`CacheStore`] for its whole lifetime. Calls on the
/// shared store are serialized from lookup to insertion; per-call
/// overrides and disabled calls never touch it. Errors from the computation
/// reach the caller unchanged and are never stored.
pub struct AsyncMemoized<F, V, E> {
    id: u64,
    name: String,
    compute: F,
    /// None when the configured size was rejected
    capacity: Option<NonZeroUsize>,
    config_error: Option<MemoError>,
    shared: Mutex<CacheStore<V>>,
    /// Calls that skipped every store
    bypasses: AtomicU64,
    _marker: PhantomData<fn() -> E>,
}

impl<F, Fut, V, E> AsyncMemoized<F, V, E>
where
    F: Fn(CallArgs) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    V: Clone + Truthy,
{
    // == Constructors ==
    /// Wraps `compute` with the default cache size of 50.
    pub fn new(name: impl Into<String>, compute: F) -> Self {
        Self::from_config(name, compute, &Config::default())
    }

    /// Wraps `compute` with a cache of at most `max_cache_size` entries.
    ///
    /// Zero or negative sizes disable the cache; every call then bypasses it.
    pub fn with_max_cache_size(name: impl Into<String>, compute: F, max_cache_size: i64) -> Self {
        Self::from_config(name, compute, &Config { max_cache_size })
    }

    /// Wraps `compute` with the size taken from `config`.
    pub fn from_config(name: impl Into<String>, compute: F, config: &Config) -> Self {
        let name = name.into();
        let (capacity, config_error) = resolve_capacity(&name, config);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
            compute,
            capacity,
            config_error,
            shared: Mutex::new(CacheStore::new()),
            bypasses: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    // == Call ==
    /// Calls through the shared cache.
    pub async fn call(&self, args: CallArgs) -> Result<V, E> {
        self.call_with(args, CacheSelection::Shared).await
    }

    /// Calls through the cache chosen by `selection`.
    pub async fn call_with(&self, args: CallArgs, selection: CacheSelection<'_, V>) -> Result<V, E> {
        let Some(capacity) = self.capacity else {
            return self.bypass(args, "cache misconfigured").await;
        };

        match selection {
            CacheSelection::Disabled => self.bypass(args, "cache disabled for this call").await,
            CacheSelection::Shared => {
                if self.holds_shared_lock() {
                    return self.bypass(args, "nested call while the cache is locked").await;
                }

                let mut held = HELD_LOCKS.try_with(|ids| ids.clone()).unwrap_or_default();
                held.push(self.id);
                HELD_LOCKS
                    .scope(held, async {
                        let mut store = self.shared.lock().await;
                        self.call_cached(&mut store, args, capacity).await
                    })
                    .await
            }
            CacheSelection::Override(store) => self.call_cached(store, args, capacity).await,
        }
    }

    fn holds_shared_lock(&self) -> bool {
        HELD_LOCKS
            .try_with(|ids| ids.contains(&self.id))
            .unwrap_or(false)
    }

    async fn call_cached(
        &self,
        store: &mut CacheStore<V>,
        args: CallArgs,
        capacity: NonZeroUsize,
    ) -> Result<V, E> {
        match lookup(&self.name, store, &args, capacity) {
            Lookup::Hit(value) => Ok(value),
            Lookup::NoKey => (self.compute)(args).await,
            Lookup::Miss(key) => {
                let value = (self.compute)(args).await?;
                admit(store, key, value.clone(), capacity);
                Ok(value)
            }
        }
    }

    async fn bypass(&self, args: CallArgs, reason: &str) -> Result<V, E> {
        debug!(function = %self.name, reason, "Bypassing cache");
        self.bypasses.fetch_add(1, Ordering::Relaxed);
        (self.compute)(args).await
    }

    // == Capacity Control ==
    /// Runs the capacity pass on the shared store, returning the number of
    /// evicted entries.
    pub async fn control_cache_size(&self) -> usize {
        match self.capacity {
            Some(capacity) => self.shared.lock().await.control_size(capacity.get()),
            None => 0,
        }
    }
}

impl<F, V, E> AsyncMemoized<F, V, E> {
    /// The name used in log events.
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
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.shared.lock().await.stats();
        stats.bypasses += self.bypasses.load(Ordering::Relaxed);
        stats
    }

    /// Keys of the shared store, oldest first.
    pub async fn cached_keys(&self) -> Vec<CacheKey> {
        self.shared.lock().await.keys().cloned().collect()
    }

    /// Number of entries in the shared store.
    pub async fn len(&self) -> usize {
        self.shared.lock().await.len()
    }

    /// Returns true if the shared store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.shared.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{key_for, ArgValue};
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, LazyLock};
    use std::time::Duration;

    type BoxedResult = Pin<Box<dyn Future<Output = Result<i64, Infallible>> + Send>>;

    /// Increments its argument, counting invocations.
    fn counting(calls: Arc<AtomicUsize>) -> impl Fn(CallArgs) -> BoxedResult + Send + Sync {
        move |args: CallArgs| -> BoxedResult {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(args.positional.first().and_then(ArgValue::as_int).unwrap_or(0) + 1)
            })
        }
    }

    #[tokio::test]
    async fn test_async_hit_skips_computation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = AsyncMemoized::new("inc", counting(calls.clone()));

        assert_eq!(memo.call(CallArgs::new().arg(1)).await, Ok(2));
        assert_eq!(memo.call(CallArgs::new().arg(1)).await, Ok(2));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_compute_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Arc::new(AsyncMemoized::new("inc", counting(calls.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                tokio::spawn(async move { memo.call(CallArgs::new().arg(41)).await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = memo.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_keys_respect_capacity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Arc::new(AsyncMemoized::with_max_cache_size(
            "inc",
            counting(calls.clone()),
            3,
        ));

        let handles: Vec<_> = (0..10)
            .map(|n| {
                let memo = Arc::clone(&memo);
                tokio::spawn(async move { memo.call(CallArgs::new().arg(n)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(memo.len().await, 3);
        assert_eq!(memo.stats().await.evictions, 7);
    }

    #[tokio::test]
    async fn test_async_override_leaves_shared_untouched() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = AsyncMemoized::new("inc", counting(calls.clone()));
        memo.call(CallArgs::new().arg(1)).await.unwrap();

        let mut local = CacheStore::new();
        memo.call_with(CallArgs::new().arg(2), CacheSelection::Override(&mut local))
            .await
            .unwrap();

        assert_eq!(local.len(), 1);
        assert_eq!(
            memo.cached_keys().await,
            vec![key_for(&CallArgs::new().arg(1)).unwrap()]
        );
    }

    #[tokio::test]
    async fn test_async_invalid_size_bypasses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = AsyncMemoized::with_max_cache_size("inc", counting(calls.clone()), -1);

        memo.call(CallArgs::new().arg(1)).await.unwrap();
        memo.call(CallArgs::new().arg(1)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.config_error(), Some(&MemoError::Configuration { value: -1 }));
        assert_eq!(memo.control_cache_size().await, 0);
        assert_eq!(memo.stats().await.bypasses, 2);
        assert_eq!(memo.name(), "inc");
        assert_eq!(memo.max_cache_size(), None);
    }

    #[tokio::test]
    async fn test_async_failures_are_not_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let memo = AsyncMemoized::new("flaky", move |args: CallArgs| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let n = args.positional[0].as_int().unwrap_or(0);
            async move {
                if attempt == 1 {
                    Err(format!("transient failure for {}", n))
                } else {
                    Ok(n)
                }
            }
        });

        assert_eq!(
            memo.call(CallArgs::new().arg(4)).await,
            Err("transient failure for 4".to_string())
        );
        assert!(memo.is_empty().await);

        assert_eq!(memo.call(CallArgs::new().arg(4)).await, Ok(4));
        assert_eq!(memo.call(CallArgs::new().arg(4)).await, Ok(4));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_async_falsy_results_are_always_recomputed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let memo = AsyncMemoized::new("zero", move |_: CallArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Infallible>(0i64) }
        });

        for _ in 0..3 {
            assert_eq!(memo.call(CallArgs::new().arg(1)).await, Ok(0));
        }

        // Stored, but never served
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(memo.len().await, 1);
        assert_eq!(memo.stats().await.hits, 0);
    }

    type BoxedFib = Pin<Box<dyn Future<Output = Result<u64, Infallible>> + Send>>;
    type AsyncFibFn = fn(CallArgs) -> BoxedFib;

    static ASYNC_FIB: LazyLock<AsyncMemoized<AsyncFibFn, u64, Infallible>> =
        LazyLock::new(|| AsyncMemoized::new("fib", fib as AsyncFibFn));

    fn fib(args: CallArgs) -> BoxedFib {
        Box::pin(async move {
            let n = args.positional[0].as_int().unwrap_or(0);
            if n < 2 {
                return Ok::<u64, Infallible>(n as u64);
            }
            let a = ASYNC_FIB.call(CallArgs::new().arg(n - 1)).await?;
            let b = ASYNC_FIB.call(CallArgs::new().arg(n - 2)).await?;
            Ok(a + b)
        })
    }

    #[tokio::test]
    async fn test_async_nested_calls_bypass_instead_of_waiting() {
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            ASYNC_FIB.call(CallArgs::new().arg(12)),
        )
        .await
        .expect("nested call waited on the cache lock");
        assert_eq!(result, Ok(144));

        // Only the outer call is stored
        assert_eq!(ASYNC_FIB.len().await, 1);
        let stats = ASYNC_FIB.stats().await;
        assert!(stats.bypasses > 0);

        assert_eq!(ASYNC_FIB.call(CallArgs::new().arg(12)).await, Ok(144));
        let after = ASYNC_FIB.stats().await;
        assert_eq!(after.hits, 1);
        assert_eq!(after.bypasses, stats.bypasses);
    }
}
