//! # Metrics Traits
//!
//! Separates *recording*, *snapshotting*, and *export* into small traits so
//! the memoizing facade never depends on how its counters are published.
//!
//! ```text
//!   ┌──────────────────────┐    ┌──────────────────────────────┐    ┌──────────────────────┐
//!   │ MemoMetricsRecorder  │    │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>   │
//!   │ record_hit/miss      │ ─► │ snapshot() → S               │ ─► │ export(&S)           │
//!   └──────────────────────┘    └──────────────────────────────┘    └──────────────────────┘
//! ```
//!
//! Recorders take `&self`: counters are atomics, so recording never needs the
//! store lock and snapshots can be read from any thread.

/// Hit/miss counters for a memoizing cache.
pub trait MemoMetricsRecorder {
    fn record_hit(&self);
    fn record_miss(&self);
}

/// Snapshot provider for tests, reports and exporters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
