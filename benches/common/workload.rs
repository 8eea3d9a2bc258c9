//! Workload generators for memoizer benchmarks.
//!
//! Provides deterministic key streams without pulling in external RNG crates.

use std::convert::Infallible;

use memokit::key::Args;
use memokit::memo::Memoizer;

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// Hot/cold split: `hot_prob` of accesses go to the first `hot_fraction`
    /// of the universe.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan in `[0, universe)`.
    Scan,
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: XorShift64,
    scan_pos: u64,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        Self {
            universe: universe.max(1),
            workload,
            rng: XorShift64::new(seed),
            scan_pos: 0,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.next_u64() % self.universe,
            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_size = ((self.universe as f64) * hot_fraction.clamp(0.0, 1.0)).round() as u64;
                let hot_size = hot_size.clamp(1, self.universe);
                if self.rng.next_f64() < hot_prob || hot_size == self.universe {
                    self.rng.next_u64() % hot_size
                } else {
                    hot_size + (self.rng.next_u64() % (self.universe - hot_size))
                }
            },
            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },
        }
    }
}

/// Drive `operations` keyed calls through `memo`, returning its hit rate.
pub fn run_hit_rate(memo: &Memoizer<u64>, generator: &mut WorkloadGenerator, operations: usize) -> f64 {
    for _ in 0..operations {
        let key = generator.next_key();
        let _ = memo.call(&Args::new().arg(key), |_| Ok::<_, Infallible>(key));
    }
    memo.metrics().hit_rate()
}

#[derive(Debug, Clone, Copy)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}
