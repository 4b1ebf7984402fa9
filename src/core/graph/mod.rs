pub mod distance_cache;
mod frontier;
#[allow(clippy::module_inception)]
pub mod graph;

pub use distance_cache::DistanceCache;
pub use graph::Graph;
