//! # Memoizing Facade
//!
//! Composes the key builder, a bounded [`PolicyStore`] and the hit/miss
//! counters into one cached entry point.
//!
//! ## Call Flow
//!
//! ```text
//!   call(args, op)
//!     │
//!     ├─ args.key() ──────────────── Err ──► MemoError::UnhashableArgument
//!     │                                      (store and op untouched)
//!     ├─ lock; store.get(key)
//!     │    ├─ Some(v) ─► record_hit; unlock ─► Ok(v)
//!     │    └─ None    ─► unlock
//!     │
//!     ├─ op(args)   (no lock held) ── Err ──► MemoError::Operation(e)
//!     │                                      (nothing stored, no miss recorded)
//!     └─ lock; store.put(key, v); record_miss; unlock ─► Ok(v)
//! ```
//!
//! A miss is recorded only once the operation has produced a value, so failed
//! calls never inflate the miss count.
//!
//! ## Concurrency
//!
//! One `parking_lot::Mutex` guards lookup, policy metadata and eviction. The
//! operation runs outside the lock, so concurrent misses on the same key may
//! each invoke it; the later `put` replaces the earlier value. Callers that
//! need at-most-once execution per key under contention must coordinate
//! themselves.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::builder::{CachePolicy, PolicyStore, StoreConfig};
use crate::error::{ConfigError, MemoError, UnhashableArgument};
use crate::key::{Args, CacheKey};
use crate::metrics::metrics_impl::MemoCounters;
use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::{MemoMetricsRecorder, MetricsSnapshotProvider};
use crate::traits::BoundedStore;

/// Memoizing cache over results of type `V`.
///
/// Results are stored as `Arc<V>` and never mutated; every hit hands out a
/// clone of the same `Arc`.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
///
/// use memokit::builder::{CachePolicy, StoreConfig};
/// use memokit::key::Args;
/// use memokit::memo::Memoizer;
///
/// let memo = Memoizer::new(StoreConfig::new(2, CachePolicy::RecencySingle)).unwrap();
/// let fetch = |args: &Args| Ok::<_, Infallible>(format!("{:?}", args.positional()));
///
/// let args = Args::new().arg("https://example.com");
/// memo.call(&args, fetch).unwrap();
/// memo.call(&args, fetch).unwrap();
/// assert_eq!((memo.hits(), memo.misses()), (1, 1));
/// ```
pub struct Memoizer<V> {
    store: Mutex<PolicyStore<CacheKey, Arc<V>>>,
    counters: MemoCounters,
    policy: CachePolicy,
}

impl<V> Memoizer<V> {
    /// Creates a memoizer, rejecting a capacity below 1.
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        let store = PolicyStore::try_new(config)?;
        Ok(Self {
            store: Mutex::new(store),
            counters: MemoCounters::new(),
            policy: config.policy,
        })
    }

    /// Shorthand for [`Memoizer::new`] with explicit fields.
    pub fn with_capacity(capacity: usize, policy: CachePolicy) -> Result<Self, ConfigError> {
        Self::new(StoreConfig::new(capacity, policy))
    }

    /// Returns the cached result for `args`, invoking `operation` on a miss.
    ///
    /// # Errors
    ///
    /// - [`MemoError::UnhashableArgument`] if `args` has no stable identity;
    ///   neither the store nor `operation` is touched.
    /// - [`MemoError::Operation`] if `operation` fails; nothing is cached and
    ///   no miss is recorded.
    pub fn call<F, E>(&self, args: &Args, operation: F) -> Result<Arc<V>, MemoError<E>>
    where
        F: FnOnce(&Args) -> Result<V, E>,
    {
        let key = args.key()?;
        self.fill(key, args, operation).map_err(MemoError::Operation)
    }

    /// Like [`call`](Self::call) for operations that cannot fail.
    pub fn get_or_insert_with<F>(
        &self,
        args: &Args,
        operation: F,
    ) -> Result<Arc<V>, UnhashableArgument>
    where
        F: FnOnce(&Args) -> V,
    {
        let key = args.key()?;
        match self.fill(key, args, |args| Ok::<_, Infallible>(operation(args))) {
            Ok(value) => Ok(value),
            Err(never) => match never {},
        }
    }

    fn fill<F, E>(&self, key: CacheKey, args: &Args, operation: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&Args) -> Result<V, E>,
    {
        {
            let mut store = self.store.lock();
            if let Some(value) = store.get(&key) {
                let value = Arc::clone(value);
                self.counters.record_hit();
                trace!(%key, policy = %self.policy, "memo hit");
                return Ok(value);
            }
        }

        let value = Arc::new(operation(args)?);

        trace!(%key, policy = %self.policy, "memo miss filled");
        let mut store = self.store.lock();
        store.put(key, Arc::clone(&value));
        self.counters.record_miss();
        Ok(value)
    }

    /// Checks whether `args` currently has a cached result, without counting
    /// as an access.
    pub fn contains(&self, args: &Args) -> Result<bool, UnhashableArgument> {
        let key = args.key()?;
        Ok(self.store.lock().contains(&key))
    }

    /// Cached result for `args`, without counting as an access.
    pub fn peek(&self, args: &Args) -> Result<Option<Arc<V>>, UnhashableArgument> {
        let key = args.key()?;
        Ok(self.store.lock().peek(&key).cloned())
    }

    pub fn hits(&self) -> u64 {
        self.counters.hits()
    }

    pub fn misses(&self) -> u64 {
        self.counters.misses()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Drops every cached result. Counters keep their values.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Counters plus store gauges.
    pub fn metrics(&self) -> MemoMetricsSnapshot {
        let counters = self.counters.snapshot();
        let store = self.store.lock();
        MemoMetricsSnapshot {
            hits: counters.hits,
            misses: counters.misses,
            evictions: store.evicted_total(),
            len: store.len(),
            capacity: store.capacity(),
        }
    }
}

impl<V> Default for Memoizer<V> {
    /// Capacity 2, frequency-batch eviction.
    fn default() -> Self {
        let config = StoreConfig::default();
        Self {
            store: Mutex::new(PolicyStore::from_valid(config)),
            counters: MemoCounters::new(),
            policy: config.policy,
        }
    }
}

impl<V> MetricsSnapshotProvider<MemoMetricsSnapshot> for Memoizer<V> {
    fn snapshot(&self) -> MemoMetricsSnapshot {
        self.metrics()
    }
}

impl<V> fmt::Debug for Memoizer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("policy", &self.policy)
            .field("store", &*self.store.lock())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

/// An operation bound to its own [`Memoizer`]: the cached entry point.
///
/// # Example
///
/// ```
/// use memokit::builder::StoreConfig;
/// use memokit::key::{ArgValue, Args};
/// use memokit::memo::Memoized;
///
/// let square = Memoized::new(
///     |args: &Args| match args.positional() {
///         [ArgValue::Int(n)] => Ok(n * n),
///         _ => Err("expected one integer"),
///     },
///     StoreConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(*square.call(&Args::new().arg(7)).unwrap(), 49);
/// assert!(square.call(&Args::new()).is_err());
/// assert_eq!(square.cache().misses(), 1);
/// ```
pub struct Memoized<F, V> {
    operation: F,
    memo: Memoizer<V>,
}

impl<F, V> Memoized<F, V> {
    /// Binds `operation` to a new cache.
    ///
    /// A rejected `config` surfaces as [`MemoError::InvalidConfiguration`],
    /// typed with the operation's own error so callers handle one error type.
    pub fn new<E>(operation: F, config: StoreConfig) -> Result<Self, MemoError<E>>
    where
        F: Fn(&Args) -> Result<V, E>,
    {
        Ok(Self {
            operation,
            memo: Memoizer::new(config)?,
        })
    }

    /// Calls the bound operation through the cache.
    pub fn call<E>(&self, args: &Args) -> Result<Arc<V>, MemoError<E>>
    where
        F: Fn(&Args) -> Result<V, E>,
    {
        self.memo.call(args, &self.operation)
    }

    /// The underlying cache, for counters and introspection.
    pub fn cache(&self) -> &Memoizer<V> {
        &self.memo
    }
}

impl<F, V> fmt::Debug for Memoized<F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("memo", &self.memo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn counting<'a>(calls: &'a Cell<u32>) -> impl Fn(&Args) -> Result<String, Infallible> + 'a {
        move |args: &Args| {
            calls.set(calls.get() + 1);
            Ok(format!("{:?}", args.positional()))
        }
    }

    fn url(name: &str) -> Args {
        Args::new().arg(name)
    }

    #[test]
    fn second_call_is_a_hit() {
        let memo = Memoizer::default();
        let calls = Cell::new(0);
        let op = counting(&calls);

        let first = memo.call(&url("a"), &op).unwrap();
        let second = memo.call(&url("a"), &op).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!((memo.hits(), memo.misses()), (1, 1));
    }

    #[test]
    fn named_argument_permutation_hits() {
        let memo = Memoizer::default();
        let calls = Cell::new(0);
        let op = counting(&calls);

        let a = Args::new().arg("u").named("retries", 2).named("timeout", 30);
        let b = Args::new().arg("u").named("timeout", 30).named("retries", 2);
        memo.call(&a, &op).unwrap();
        memo.call(&b, &op).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(memo.hits(), 1);
    }

    #[test]
    fn unhashable_argument_touches_nothing() {
        let memo: Memoizer<u32> = Memoizer::default();
        let called = Cell::new(false);
        let err = memo
            .call(&Args::new().arg(f64::NAN), |_| {
                called.set(true);
                Ok::<_, Infallible>(1)
            })
            .unwrap_err();

        assert!(err.is_unhashable());
        assert!(!called.get());
        assert!(memo.is_empty());
        assert_eq!((memo.hits(), memo.misses()), (0, 0));
    }

    #[test]
    fn failed_operation_is_not_cached_or_counted() {
        let memo: Memoizer<u32> = Memoizer::default();
        let err = memo
            .call(&url("a"), |_| Err::<u32, _>("connection refused"))
            .unwrap_err();
        assert_eq!(err.into_operation(), Some("connection refused"));
        assert!(memo.is_empty());
        assert_eq!(memo.misses(), 0);

        // The next call retries the operation.
        let value = memo.call(&url("a"), |_| Ok::<_, &str>(7)).unwrap();
        assert_eq!(*value, 7);
        assert_eq!(memo.misses(), 1);
    }

    #[test]
    fn operation_runs_once_per_key_until_evicted() {
        let memo = Memoizer::with_capacity(2, CachePolicy::RecencySingle).unwrap();
        let calls = Cell::new(0);
        let op = counting(&calls);

        for _ in 0..5 {
            memo.call(&url("a"), &op).unwrap();
        }
        assert_eq!(calls.get(), 1);

        memo.call(&url("b"), &op).unwrap();
        memo.call(&url("c"), &op).unwrap(); // evicts a
        memo.call(&url("a"), &op).unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn recency_scenario_counts() {
        let memo = Memoizer::with_capacity(2, CachePolicy::RecencySingle).unwrap();
        let calls = Cell::new(0);
        let op = counting(&calls);
        for name in ["A", "A", "B", "B", "A", "C"] {
            memo.call(&url(name), &op).unwrap();
        }
        assert_eq!((memo.hits(), memo.misses()), (3, 3));
        assert_eq!(calls.get(), 3);
        assert!(memo.contains(&url("A")).unwrap());
        assert!(!memo.contains(&url("B")).unwrap());
        assert!(memo.contains(&url("C")).unwrap());
    }

    #[test]
    fn get_or_insert_with_caches_infallible_results() {
        let memo = Memoizer::default();
        let v1 = memo.get_or_insert_with(&url("x"), |_| 10).unwrap();
        let v2 = memo.get_or_insert_with(&url("x"), |_| 20).unwrap();
        assert_eq!((*v1, *v2), (10, 10));
        assert!(memo.get_or_insert_with(&Args::new().arg(f32::NAN), |_| 0).is_err());
    }

    #[test]
    fn peek_and_contains_do_not_count() {
        let memo = Memoizer::default();
        memo.get_or_insert_with(&url("x"), |_| 1).unwrap();
        assert_eq!(memo.peek(&url("x")).unwrap().as_deref(), Some(&1));
        assert_eq!(memo.peek(&url("y")).unwrap(), None);
        assert!(memo.contains(&url("x")).unwrap());
        assert_eq!((memo.hits(), memo.misses()), (0, 1));
    }

    #[test]
    fn metrics_snapshot_reports_gauges() {
        let memo = Memoizer::with_capacity(1, CachePolicy::FrequencyBatch).unwrap();
        memo.get_or_insert_with(&url("a"), |_| 1).unwrap();
        memo.get_or_insert_with(&url("b"), |_| 2).unwrap();
        memo.get_or_insert_with(&url("b"), |_| 2).unwrap();

        let metrics = memo.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 2);
        assert_eq!(metrics.evictions, 1);
        assert_eq!(metrics.len, 1);
        assert_eq!(metrics.capacity, 1);
        assert_eq!(memo.snapshot(), metrics);
    }

    #[test]
    fn clear_keeps_counters() {
        let memo = Memoizer::default();
        memo.get_or_insert_with(&url("a"), |_| 1).unwrap();
        memo.clear();
        assert!(memo.is_empty());
        assert_eq!(memo.misses(), 1);
    }

    #[test]
    fn zero_capacity_fails_fast() {
        assert!(Memoizer::<u8>::with_capacity(0, CachePolicy::RecencySingle).is_err());
        let bound = Memoized::new(
            |_: &Args| Ok::<u8, &str>(0),
            StoreConfig::new(0, CachePolicy::FrequencyBatch),
        );
        match bound {
            Err(MemoError::InvalidConfiguration(err)) => {
                assert_eq!(err.message(), "capacity must be >= 1, got 0");
            },
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn memoizer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Memoizer<String>>();
    }
}
