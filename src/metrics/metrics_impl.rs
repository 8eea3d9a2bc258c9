use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::MemoCountersSnapshot;
use crate::metrics::traits::{MemoMetricsRecorder, MetricsSnapshotProvider};

/// Process-lifetime hit/miss counters.
///
/// Both counters only ever increase; there is no reset. Drop the cache and
/// build a new one to start over.
#[derive(Debug, Default)]
pub struct MemoCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl MemoMetricsRecorder for MemoCounters {
    #[inline]
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

impl MetricsSnapshotProvider<MemoCountersSnapshot> for MemoCounters {
    fn snapshot(&self) -> MemoCountersSnapshot {
        MemoCountersSnapshot {
            hits: self.hits(),
            misses: self.misses(),
        }
    }
}
