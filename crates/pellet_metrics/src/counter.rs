//! Named event counters (spawns, deletes, collisions, ...)

use std::collections::BTreeMap;

/// Running totals keyed by static names, iterated in name order so log
/// lines come out stable.
#[derive(Debug, Default)]
pub struct Counter {
    counters: BTreeMap<&'static str, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
        }
    }

    pub fn increment(&mut self, name: &'static str, value: usize) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    pub fn set(&mut self, name: &'static str, value: usize) {
        self.counters.insert(name, value);
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.counters.iter().map(|(&k, &v)| (k, v))
    }
}
