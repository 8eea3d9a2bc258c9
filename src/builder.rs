//! Store configuration and the unified policy-selecting store.
//!
//! Provides a simple API to create a bounded store for either eviction policy
//! from a capacity-and-policy configuration.
//!
//! ## Example
//!
//! ```rust
//! use memokit::builder::{CacheBuilder, CachePolicy};
//! use memokit::traits::BoundedStore;
//!
//! let mut store = CacheBuilder::new(100)
//!     .policy(CachePolicy::RecencySingle)
//!     .try_build::<u64, String>()
//!     .unwrap();
//! store.put(1, "hello".to_string());
//! assert_eq!(store.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::policy::frequency_batch::FrequencyBatchStore;
use crate::policy::recency::RecencyStore;
use crate::traits::BoundedStore;

/// Capacity used by [`StoreConfig::default`].
pub const DEFAULT_CAPACITY: usize = 2;

/// Available eviction policies.
///
/// Parses from and displays as `frequency-batch` / `recency-single`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CachePolicy {
    /// Least frequently used, evicting `max(1, capacity / 10)` entries at once.
    #[default]
    FrequencyBatch,
    /// Least recently used, evicting one entry at a time.
    RecencySingle,
}

impl CachePolicy {
    pub const ALL: [CachePolicy; 2] = [CachePolicy::FrequencyBatch, CachePolicy::RecencySingle];

    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::FrequencyBatch => "frequency-batch",
            CachePolicy::RecencySingle => "recency-single",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CachePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "unknown policy `{s}` (expected `frequency-batch` or `recency-single`)"
                ))
            })
    }
}

/// Capacity-and-policy configuration for a bounded store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Maximum number of entries, at least 1.
    pub capacity: usize,
    pub policy: CachePolicy,
}

impl StoreConfig {
    pub fn new(capacity: usize, policy: CachePolicy) -> Self {
        Self { capacity, policy }
    }

    /// Rejects configurations no store can honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 1 {
            return Err(ConfigError::new(format!(
                "capacity must be >= 1, got {}",
                self.capacity
            )));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: CachePolicy::default(),
        }
    }
}

/// Bounded store whose eviction policy is chosen at construction.
pub struct PolicyStore<K, V> {
    inner: PolicyStoreInner<K, V>,
}

enum PolicyStoreInner<K, V> {
    FrequencyBatch(FrequencyBatchStore<K, V>),
    RecencySingle(RecencyStore<K, V>),
}

impl<K, V> PolicyStore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Builds a store from a validated configuration.
    pub fn try_new(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Builds a store without validating; stores clamp a zero capacity to 1.
    pub(crate) fn from_valid(config: StoreConfig) -> Self {
        let inner = match config.policy {
            CachePolicy::FrequencyBatch => {
                PolicyStoreInner::FrequencyBatch(FrequencyBatchStore::new(config.capacity))
            },
            CachePolicy::RecencySingle => {
                PolicyStoreInner::RecencySingle(RecencyStore::new(config.capacity))
            },
        };
        Self { inner }
    }

    pub fn policy(&self) -> CachePolicy {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(_) => CachePolicy::FrequencyBatch,
            PolicyStoreInner::RecencySingle(_) => CachePolicy::RecencySingle,
        }
    }

    /// The frequency-batch store, if that policy was selected.
    pub fn as_frequency_batch(&self) -> Option<&FrequencyBatchStore<K, V>> {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => Some(store),
            PolicyStoreInner::RecencySingle(_) => None,
        }
    }

    /// The recency store, if that policy was selected.
    pub fn as_recency(&self) -> Option<&RecencyStore<K, V>> {
        match &self.inner {
            PolicyStoreInner::RecencySingle(store) => Some(store),
            PolicyStoreInner::FrequencyBatch(_) => None,
        }
    }
}

impl<K, V> BoundedStore<K, V> for PolicyStore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.get(key),
            PolicyStoreInner::RecencySingle(store) => store.get(key),
        }
    }

    fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.peek(key),
            PolicyStoreInner::RecencySingle(store) => store.peek(key),
        }
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.put(key, value),
            PolicyStoreInner::RecencySingle(store) => store.put(key, value),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.contains(key),
            PolicyStoreInner::RecencySingle(store) => store.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.len(),
            PolicyStoreInner::RecencySingle(store) => store.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.capacity(),
            PolicyStoreInner::RecencySingle(store) => store.capacity(),
        }
    }

    fn evicted_total(&self) -> u64 {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.evicted_total(),
            PolicyStoreInner::RecencySingle(store) => store.evicted_total(),
        }
    }

    fn clear(&mut self) {
        match &mut self.inner {
            PolicyStoreInner::FrequencyBatch(store) => store.clear(),
            PolicyStoreInner::RecencySingle(store) => store.clear(),
        }
    }
}

impl<K, V> fmt::Debug for PolicyStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            PolicyStoreInner::FrequencyBatch(store) => fmt::Debug::fmt(store, f),
            PolicyStoreInner::RecencySingle(store) => fmt::Debug::fmt(store, f),
        }
    }
}

/// Builder for creating bounded stores.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    config: StoreConfig,
}

impl CacheBuilder {
    /// Create a new builder with the specified capacity and the default policy.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: StoreConfig {
                capacity,
                policy: CachePolicy::default(),
            },
        }
    }

    /// Select the eviction policy.
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// The configuration this builder will validate and build from.
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Build a store, rejecting a capacity below 1.
    ///
    /// # Example
    ///
    /// ```rust
    /// use memokit::builder::{CacheBuilder, CachePolicy};
    ///
    /// let store = CacheBuilder::new(10)
    ///     .policy(CachePolicy::FrequencyBatch)
    ///     .try_build::<u64, String>();
    /// assert!(store.is_ok());
    ///
    /// assert!(CacheBuilder::new(0).try_build::<u64, String>().is_err());
    /// ```
    pub fn try_build<K, V>(self) -> Result<PolicyStore<K, V>, ConfigError>
    where
        K: Clone + Eq + Hash,
    {
        PolicyStore::try_new(self.config)
    }
}

impl From<StoreConfig> for CacheBuilder {
    fn from(config: StoreConfig) -> Self {
        Self { config }
    }
}
