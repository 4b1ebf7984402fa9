//! Configuration for a coal delivery simulation run
//!
//! Controls polling granularity, randomness and memory bounds of the
//! distance cache.

use serde::{Deserialize, Serialize};

/// Vertex count above which the distance cache is bounded automatically
pub const DEFAULT_LARGE_GRAPH_THRESHOLD: usize = 5_000;

/// Cache capacity used when the graph counts as large
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

/// Configuration for simulation execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Clock increment applied after every polling tick
    pub tick: f64,
    /// Seed for the transport RNG; `None` seeds from entropy
    pub random_seed: Option<u64>,
    /// Stop once the clock passes this time, even with orders pending
    pub max_time: Option<f64>,
    /// Explicit distance cache bound; overrides the large-graph heuristic
    pub cache_capacity: Option<usize>,
    /// Graphs with more vertices than this get a bounded cache
    pub large_graph_threshold: usize,
    /// Allowed deviation of the spawn weight sum from 1
    pub weight_tolerance: f64,
}

impl SimulationConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            tick: 0.1,
            random_seed: None,
            max_time: None,
            cache_capacity: None,
            large_graph_threshold: DEFAULT_LARGE_GRAPH_THRESHOLD,
            weight_tolerance: 1e-6,
        }
    }

    pub fn with_tick(mut self, tick: f64) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_max_time(mut self, max_time: f64) -> Self {
        self.max_time = Some(max_time);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn with_large_graph_threshold(mut self, threshold: usize) -> Self {
        self.large_graph_threshold = threshold;
        self
    }

    pub fn with_weight_tolerance(mut self, tolerance: f64) -> Self {
        self.weight_tolerance = tolerance;
        self
    }

    /// Cache bound for a graph of `vertex_count` vertices, if any
    pub fn cache_bound(&self, vertex_count: usize) -> Option<usize> {
        self.cache_capacity.or_else(|| {
            (vertex_count > self.large_graph_threshold).then_some(DEFAULT_CACHE_CAPACITY)
        })
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
