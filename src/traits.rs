//! # Store Trait Hierarchy
//!
//! Bounded key/value stores that back the memoizing facade. Each eviction
//! policy is a store implementing [`BoundedStore`]; policy-specific
//! introspection lives in the extension traits.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────────────────┐
//!                    │          BoundedStore<K, V>             │
//!                    │                                         │
//!                    │  get(&mut, &K) → Option<&V>             │
//!                    │  peek(&, &K) → Option<&V>               │
//!                    │  put(&mut, K, V) → Option<V>            │
//!                    │  contains / len / capacity / clear      │
//!                    │  evicted_total(&) → u64                 │
//!                    └──────────────────┬──────────────────────┘
//!                                       │
//!                ┌──────────────────────┴───────────────────────┐
//!                ▼                                              ▼
//!   ┌────────────────────────────┐                ┌────────────────────────────┐
//!   │   LfuStoreTrait<K, V>      │                │   LruStoreTrait<K, V>      │
//!   │                            │                │                            │
//!   │  frequency(&K) → u64       │                │  recency_rank(&K) → usize  │
//!   │  peek_lfu() → (&K, u64)    │                │  peek_lru() → (&K, &V)     │
//!   │  batch_size() → usize      │                │                            │
//!   └────────────────────────────┘                └────────────────────────────┘
//! ```
//!
//! ## Policy Comparison
//!
//! | Policy            | Eviction Basis              | Entries per eviction     |
//! |-------------------|-----------------------------|--------------------------|
//! | `frequency-batch` | access count, then age      | `max(1, capacity / 10)`  |
//! | `recency-single`  | last access                 | 1                        |
//!
//! ## Thread Safety
//!
//! Stores are single-threaded and take `&mut self` for anything that touches
//! policy metadata. [`Memoizer`](crate::memo::Memoizer) wraps its store in a
//! `parking_lot::Mutex` so lookup, metadata updates and eviction happen as one
//! unit.

/// Core operations every bounded store supports.
///
/// # Invariant
///
/// After any call returns, `len() <= capacity()`, and a key passed to
/// [`put`](Self::put) is present.
///
/// # Example
///
/// ```
/// use memokit::policy::recency::RecencyStore;
/// use memokit::traits::BoundedStore;
///
/// fn warm<S: BoundedStore<u64, String>>(store: &mut S, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         store.put(*key, value.to_string());
///     }
/// }
///
/// let mut store = RecencyStore::new(2);
/// warm(&mut store, &[(1, "one"), (2, "two"), (3, "three")]);
/// assert_eq!(store.len(), 2);
/// assert!(!store.contains(&1));
/// ```
pub trait BoundedStore<K, V> {
    /// Looks up a key and records the access with the eviction policy.
    ///
    /// An absent key returns `None` and changes nothing.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Looks up a key without recording an access.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Inserts or replaces a value, returning the previous value for `key`.
    ///
    /// Inserting a new key into a full store first evicts according to the
    /// policy. Replacing an existing key counts as an access and never evicts.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    fn capacity(&self) -> usize;

    /// Total number of entries removed by eviction since construction.
    fn evicted_total(&self) -> u64;

    /// Removes all entries. Does not count as eviction.
    fn clear(&mut self);
}

/// Frequency-ordered stores.
pub trait LfuStoreTrait<K, V>: BoundedStore<K, V> {
    /// Access count of `key`, or `None` if absent.
    fn frequency(&self, key: &K) -> Option<u64>;

    /// Next eviction candidate and its access count.
    fn peek_lfu(&self) -> Option<(&K, u64)>;

    /// Entries removed per eviction pass.
    fn batch_size(&self) -> usize;
}

/// Recency-ordered stores.
pub trait LruStoreTrait<K, V>: BoundedStore<K, V> {
    /// Position of `key` in recency order, `0` being most recent.
    fn recency_rank(&self, key: &K) -> Option<usize>;

    /// Least recently accessed entry, the next eviction victim.
    fn peek_lru(&self) -> Option<(&K, &V)>;
}
