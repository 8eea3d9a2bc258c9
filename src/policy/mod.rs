//! Eviction policies, each implemented as a [`BoundedStore`](crate::traits::BoundedStore).
//!
//! - [`frequency_batch`]: least-frequently-used, evicts `max(1, capacity / 10)`
//!   entries at a time.
//! - [`recency`]: least-recently-used, evicts one entry at a time.

pub mod frequency_batch;
pub mod recency;

pub use frequency_batch::FrequencyBatchStore;
pub use recency::RecencyStore;
