use crate::core::types::PlaceId;
use log::debug;
use std::collections::HashMap;

/// Memoized pairwise distances keyed by the unordered pair of places.
///
/// Unbounded by default. With a capacity, an insert that overflows it evicts the
/// least recently used half of the entries; evicted pairs are recomputed on the
/// next miss, so eviction never changes the value a lookup returns.
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    entries: HashMap<(PlaceId, PlaceId), CacheEntry>,
    capacity: Option<usize>,
    clock: u64,
    evictions: u64,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    distance: f64,
    last_used: u64,
}

fn key(a: PlaceId, b: PlaceId) -> (PlaceId, PlaceId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl DistanceCache {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(2)),
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Look up a pair in either direction, refreshing its recency
    pub fn get(&mut self, a: PlaceId, b: PlaceId) -> Option<f64> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(&key(a, b)).map(|entry| {
            entry.last_used = clock;
            entry.distance
        })
    }

    pub fn insert(&mut self, a: PlaceId, b: PlaceId, distance: f64) {
        self.clock += 1;
        self.entries.insert(
            key(a, b),
            CacheEntry {
                distance,
                last_used: self.clock,
            },
        );
        if let Some(capacity) = self.capacity {
            if self.entries.len() > capacity {
                self.evict_half();
            }
        }
    }

    fn evict_half(&mut self) {
        let mut by_age: Vec<((PlaceId, PlaceId), u64)> = self
            .entries
            .iter()
            .map(|(pair, entry)| (*pair, entry.last_used))
            .collect();
        by_age.sort_by_key(|(_, last_used)| *last_used);

        let to_remove = by_age.len() / 2;
        for (pair, _) in by_age.into_iter().take(to_remove) {
            self.entries.remove(&pair);
        }
        self.evictions += 1;
        debug!(
            "Distance cache evicted {} entries, {} remain",
            to_remove,
            self.entries.len()
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of eviction passes so far
    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}
