use super::distance_cache::DistanceCache;
use super::frontier::Frontier;
use crate::core::errors::GraphError;
use crate::core::types::PlaceId;
use log::debug;

/// Adjacency entry: the neighbouring vertex and the edge weight
#[derive(Debug, Clone, Copy)]
struct Edge {
    vertex: usize,
    weight: f64,
}

/// Result of a single-source Dijkstra run
struct Dijkstra {
    dist: Vec<f64>,
    prev: Vec<Option<usize>>,
}

/// Weighted undirected graph over place ids with a lazily filled distance cache
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
    cache: DistanceCache,
}

impl Graph {
    /// Create a graph with vertices `1..=vertex_count` and an unbounded cache
    pub fn new(vertex_count: usize) -> Self {
        Self::with_cache(vertex_count, DistanceCache::unbounded())
    }

    pub fn with_cache(vertex_count: usize, cache: DistanceCache) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            edge_count: 0,
            cache,
        }
    }

    fn slot(&self, id: PlaceId) -> Result<usize, GraphError> {
        let index = id.index();
        if index < self.adjacency.len() {
            Ok(index)
        } else {
            Err(GraphError::UnknownVertex(id))
        }
    }

    /// Insert an undirected edge. Self-loops are ignored; parallel edges are kept.
    pub fn add_edge(&mut self, u: PlaceId, v: PlaceId, weight: f64) -> Result<(), GraphError> {
        let a = self.slot(u)?;
        let b = self.slot(v)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight {
                from: u,
                to: v,
                weight,
            });
        }
        if a == b {
            debug!("Ignoring self-loop on vertex {}", u);
            return Ok(());
        }

        self.adjacency[a].push(Edge { vertex: b, weight });
        self.adjacency[b].push(Edge { vertex: a, weight });
        self.edge_count += 1;
        Ok(())
    }

    fn dijkstra(&self, src: usize) -> Dijkstra {
        let n = self.adjacency.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![None; n];
        let mut visited = vec![false; n];
        let mut frontier = Frontier::new();

        dist[src] = 0.0;
        frontier.push(src, 0.0);

        while let Some((u, _)) = frontier.pop() {
            if visited[u] {
                continue;
            }
            visited[u] = true;

            for edge in &self.adjacency[u] {
                let v = edge.vertex;
                let candidate = dist[u] + edge.weight;
                if !visited[v] && candidate < dist[v] {
                    dist[v] = candidate;
                    prev[v] = Some(u);
                    frontier.push(v, candidate);
                }
            }
        }

        Dijkstra { dist, prev }
    }

    /// Shortest path from `src` to `dst`, both inclusive.
    ///
    /// Among several equally short paths the one found first wins; which one
    /// that is depends on edge insertion order, so callers must not rely on it.
    pub fn shortest_path(&self, src: PlaceId, dst: PlaceId) -> Result<Vec<PlaceId>, GraphError> {
        let from = self.slot(src)?;
        let to = self.slot(dst)?;
        let run = self.dijkstra(from);
        Self::backtrack(&run, from, to).ok_or(GraphError::Unreachable { from: src, to: dst })
    }

    fn backtrack(run: &Dijkstra, from: usize, to: usize) -> Option<Vec<PlaceId>> {
        if !run.dist[to].is_finite() {
            return None;
        }
        let mut path = vec![PlaceId::from_index(to)];
        let mut at = to;
        while at != from {
            at = run.prev[at]?;
            path.push(PlaceId::from_index(at));
        }
        path.reverse();
        Some(path)
    }

    /// Shortest-path distance between two places, memoized per unordered pair
    pub fn distance(&mut self, src: PlaceId, dst: PlaceId) -> Result<f64, GraphError> {
        if let Some(distance) = self.cache.get(src, dst) {
            return Ok(distance);
        }

        debug!("Distance cache miss for {} -> {}", src, dst);
        let path = self.shortest_path(src, dst)?;
        let distance = self.path_weight(&path)?;
        self.cache.insert(src, dst, distance);
        Ok(distance)
    }

    /// Sum of edge weights along a path, taking the lightest of parallel edges
    pub fn path_weight(&self, path: &[PlaceId]) -> Result<f64, GraphError> {
        let mut total = 0.0;
        for pair in path.windows(2) {
            let a = self.slot(pair[0])?;
            let b = self.slot(pair[1])?;
            let weight = self.adjacency[a]
                .iter()
                .filter(|edge| edge.vertex == b)
                .map(|edge| edge.weight)
                .min_by(f64::total_cmp)
                .ok_or(GraphError::Unreachable {
                    from: pair[0],
                    to: pair[1],
                })?;
            total += weight;
        }
        Ok(total)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, edges) in self.adjacency.iter().enumerate() {
            writeln!(f, "{} {}", PlaceId::from_index(index), edges.len())?;
        }
        Ok(())
    }
}
