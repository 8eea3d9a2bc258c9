/// Hit/miss counters captured at one instant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoCountersSnapshot {
    pub hits: u64,
    pub misses: u64,
}

/// Counters plus store gauges, as reported by
/// [`Memoizer::metrics`](crate::memo::Memoizer::metrics).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MemoMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64, // entries removed by the policy, not by clear()

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl MemoMetricsSnapshot {
    /// Successful calls observed: hits plus filled misses.
    pub fn calls(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of calls served from the cache, `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        match self.calls() {
            0 => 0.0,
            calls => self.hits as f64 / calls as f64,
        }
    }
}
