//! # Frequency-Batch Store
//!
//! Least-frequently-used store that evicts a *batch* of entries once full.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                      FrequencyBatchStore<K, V>                           │
//!   │                                                                          │
//!   │   FxHashMap<K, Slot<V>>              BTreeMap<(freq, seq), K>            │
//!   │   ┌─────────┬───────────────────┐    ┌──────────────┬─────────┐          │
//!   │   │   Key   │ value  freq  seq  │    │ (freq, seq)  │   Key   │          │
//!   │   ├─────────┼───────────────────┤    ├──────────────┼─────────┤          │
//!   │   │ page_1  │  ..     5     0   │    │ (1, 1)       │ page_2  │ ← victim │
//!   │   │ page_2  │  ..     1     1   │    │ (1, 3)       │ page_4  │          │
//!   │   │ page_3  │  ..     3     2   │    │ (3, 2)       │ page_3  │          │
//!   │   │ page_4  │  ..     1     3   │    │ (5, 0)       │ page_1  │          │
//!   │   └─────────┴───────────────────┘    └──────────────┴─────────┘          │
//!   │                                                                          │
//!   │   batch_size = max(1, capacity / 10)                                     │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `seq` is assigned once, at insertion, so ties between equally infrequent
//! keys always go to the oldest insertion.
//!
//! ## Eviction Flow
//!
//! ```text
//!   put(new_key) with len == capacity:
//!     1. take the first batch_size entries of the (freq, seq) index
//!     2. remove each from the map
//!     3. insert new_key with freq = 1
//!
//!   get(key) hit / put(existing):
//!     re-index (freq, seq) → (freq + 1, seq)
//! ```
//!
//! Evicting a batch means a store of capacity 100 only scans its index every
//! tenth insertion under steady miss pressure. The price is that right after
//! an eviction the store sits at `capacity - batch_size` entries.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::traits::{BoundedStore, LfuStoreTrait};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    freq: u64,
    seq: u64,
}

/// Least-frequently-used store with batch eviction.
///
/// # Example
///
/// ```
/// use memokit::policy::frequency_batch::FrequencyBatchStore;
/// use memokit::traits::{BoundedStore, LfuStoreTrait};
///
/// let mut store = FrequencyBatchStore::new(2);
/// store.put("a", 1);
/// store.put("b", 2);
/// store.get(&"a");
///
/// store.put("c", 3);
/// assert!(store.contains(&"a"));
/// assert!(!store.contains(&"b"));
/// assert_eq!(store.frequency(&"a"), Some(2));
/// ```
pub struct FrequencyBatchStore<K, V> {
    map: FxHashMap<K, Slot<V>>,
    order: BTreeMap<(u64, u64), K>,
    capacity: usize,
    batch_size: usize,
    next_seq: u64,
    evicted: u64,
}

impl<K, V> FrequencyBatchStore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a store holding at most `capacity` entries.
    ///
    /// Capacity is validated by [`CacheBuilder`](crate::builder::CacheBuilder);
    /// a raw `0` here behaves like `1`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: BTreeMap::new(),
            capacity,
            batch_size: (capacity / 10).max(1),
            next_seq: 0,
            evicted: 0,
        }
    }

    fn touch(&mut self, key: &K) {
        if let Some(slot) = self.map.get_mut(key) {
            let owned = self.order.remove(&(slot.freq, slot.seq));
            slot.freq = slot.freq.saturating_add(1);
            if let Some(owned) = owned {
                self.order.insert((slot.freq, slot.seq), owned);
            }
        }
    }

    /// Removes up to `batch_size` of the least frequently used entries.
    fn evict_batch(&mut self) -> usize {
        let mut removed = 0;
        while removed < self.batch_size {
            let Some((_, key)) = self.order.pop_first() else {
                break;
            };
            self.map.remove(&key);
            removed += 1;
        }
        self.evicted += removed as u64;

        debug!(
            policy = "frequency-batch",
            evicted = removed,
            len = self.map.len(),
            capacity = self.capacity,
            "evicted least frequently used batch"
        );
        removed
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.map.len(), self.order.len());
        debug_assert!(self.map.len() <= self.capacity);
        for ((freq, seq), key) in &self.order {
            let slot = self.map.get(key);
            debug_assert!(slot.is_some_and(|s| s.freq == *freq && s.seq == *seq));
        }
    }
}

impl<K, V> BoundedStore<K, V> for FrequencyBatchStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.map.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.map.get(key).map(|slot| &slot.value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|slot| &slot.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.map.get_mut(&key) {
            let previous = std::mem::replace(&mut slot.value, value);
            self.touch(&key);
            return Some(previous);
        }

        if self.map.len() >= self.capacity {
            self.evict_batch();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert((1, seq), key.clone());
        self.map.insert(
            key,
            Slot {
                value,
                freq: 1,
                seq,
            },
        );

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn evicted_total(&self) -> u64 {
        self.evicted
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}

impl<K, V> LfuStoreTrait<K, V> for FrequencyBatchStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn frequency(&self, key: &K) -> Option<u64> {
        self.map.get(key).map(|slot| slot.freq)
    }

    fn peek_lfu(&self) -> Option<(&K, u64)> {
        self.order
            .first_key_value()
            .map(|(&(freq, _), key)| (key, freq))
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl<K, V> fmt::Debug for FrequencyBatchStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyBatchStore")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .field("batch_size", &self.batch_size)
            .field("evicted", &self.evicted)
            .finish_non_exhaustive()
    }
}
