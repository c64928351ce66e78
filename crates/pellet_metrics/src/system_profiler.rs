//! Per-phase timing for the solver's sub-step pipeline

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated time spent in one named phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTiming {
    pub total: Duration,
    pub calls: u64,
}

impl PhaseTiming {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        self.total.div_f64(self.calls as f64)
    }
}

#[derive(Debug, Default)]
pub struct SystemProfiler {
    timings: BTreeMap<&'static str, PhaseTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
        }
    }

    /// Run `f` and add its wall time to the `name` phase.
    pub fn time_system<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let entry = self.timings.entry(name).or_default();
        entry.total += elapsed;
        entry.calls += 1;
        result
    }

    pub fn get_timing(&self, name: &str) -> Duration {
        self.phase(name).total
    }

    pub fn phase(&self, name: &str) -> PhaseTiming {
        self.timings.get(name).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, PhaseTiming)> + '_ {
        self.timings.iter().map(|(&k, &v)| (k, v))
    }
}
