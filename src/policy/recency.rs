//! # Recency-Single Store
//!
//! Least-recently-used store that evicts exactly one entry per insertion
//! once full.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                         RecencyStore<K, V>                               │
//!   │                                                                          │
//!   │   FxHashMap<K, usize>  ──►  slots: Vec<Slot<K, V>>  (free_list reuse)    │
//!   │                                                                          │
//!   │   head ──► [C] ◄──► [A] ◄──► [B] ◄── tail                                │
//!   │            MRU                LRU (next victim)                          │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation        | Effect on order                         | Cost  |
//! |------------------|-----------------------------------------|-------|
//! | `get` (hit)      | move to head                            | O(1)  |
//! | `put` (new)      | evict tail if full, insert at head      | O(1)  |
//! | `put` (existing) | replace value, move to head             | O(1)  |
//! | `peek`           | none                                    | O(1)  |
//! | `recency_rank`   | none                                    | O(n)  |
//!
//! Links are slot indices rather than pointers, so the list needs no
//! `unsafe`.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::traits::{BoundedStore, LruStoreTrait};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Debug)]
struct Slot<K, V> {
    entry: Option<Entry<K, V>>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Least-recently-used store with single-entry eviction.
///
/// # Example
///
/// ```
/// use memokit::policy::recency::RecencyStore;
/// use memokit::traits::{BoundedStore, LruStoreTrait};
///
/// let mut store = RecencyStore::new(2);
/// store.put("k1", 1);
/// store.put("k2", 2);
/// store.get(&"k1");
///
/// store.put("k3", 3);
/// assert!(!store.contains(&"k2"));
/// assert_eq!(store.recency_rank(&"k3"), Some(0));
/// assert_eq!(store.recency_rank(&"k1"), Some(1));
/// ```
pub struct RecencyStore<K, V> {
    index: FxHashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    capacity: usize,
    evicted: u64,
}

impl<K, V> RecencyStore<K, V>
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
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            tail: None,
            capacity,
            evicted: 0,
        }
    }

    fn allocate_slot(&mut self, entry: Entry<K, V>) -> usize {
        let slot = Slot {
            entry: Some(entry),
            prev: None,
            next: None,
        };
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = slot;
            idx
        } else {
            self.slots.push(slot);
            self.slots.len() - 1
        }
    }

    fn release_slot(&mut self, idx: usize) -> Option<Entry<K, V>> {
        let entry = self.slots[idx].entry.take()?;
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
        self.free_list.push(idx);
        Some(entry)
    }

    fn detach(&mut self, idx: usize) {
        let prev = self.slots[idx].prev;
        let next = self.slots[idx].next;
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        let old_head = self.head;
        self.slots[idx].prev = None;
        self.slots[idx].next = old_head;
        match old_head {
            Some(h) => self.slots[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn evict_tail(&mut self) -> Option<Entry<K, V>> {
        let idx = self.tail?;
        self.detach(idx);
        let entry = self.release_slot(idx)?;
        self.index.remove(&entry.key);
        self.evicted += 1;

        debug!(
            policy = "recency-single",
            len = self.index.len(),
            capacity = self.capacity,
            "evicted least recently used entry"
        );
        Some(entry)
    }

    fn value_at(&self, idx: usize) -> Option<&V> {
        self.slots[idx].entry.as_ref().map(|entry| &entry.value)
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        let mut count = 0usize;
        let mut current = self.head;
        while let Some(idx) = current {
            count += 1;
            assert!(count <= self.index.len(), "cycle detected in recency list");
            let key = self.slots[idx].entry.as_ref().map(|entry| &entry.key);
            debug_assert!(key.is_some_and(|k| self.index.get(k) == Some(&idx)));
            current = self.slots[idx].next;
        }
        debug_assert_eq!(count, self.index.len());
        debug_assert!(self.index.len() <= self.capacity);
    }
}

impl<K, V> BoundedStore<K, V> for RecencyStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.value_at(idx)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.value_at(idx)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            let previous = self.slots[idx]
                .entry
                .as_mut()
                .map(|entry| std::mem::replace(&mut entry.value, value));
            self.move_to_front(idx);
            return previous;
        }

        if self.index.len() >= self.capacity {
            self.evict_tail();
        }

        let idx = self.allocate_slot(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, idx);
        self.attach_front(idx);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn evicted_total(&self) -> u64 {
        self.evicted
    }

    fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<K, V> LruStoreTrait<K, V> for RecencyStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn recency_rank(&self, key: &K) -> Option<usize> {
        let target = *self.index.get(key)?;
        let mut rank = 0usize;
        let mut current = self.head;
        while let Some(idx) = current {
            if idx == target {
                return Some(rank);
            }
            rank += 1;
            current = self.slots[idx].next;
        }
        None
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        let idx = self.tail?;
        self.slots[idx]
            .entry
            .as_ref()
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K, V> fmt::Debug for RecencyStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyStore")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted)
            .finish_non_exhaustive()
    }
}
