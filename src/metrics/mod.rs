//! Hit/miss instrumentation for the memoizing facade.

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::MemoCounters;
pub use snapshot::{MemoCountersSnapshot, MemoMetricsSnapshot};
