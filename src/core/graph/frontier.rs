use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
pub(crate) struct FrontierEntry {
    pub distance: f64,
    pub sequence_num: u64,
    pub vertex: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Min-priority frontier for Dijkstra. Equal distances pop in insertion order.
pub(crate) struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    sequence_counter: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    pub fn push(&mut self, vertex: usize, distance: f64) {
        self.heap.push(FrontierEntry {
            distance,
            sequence_num: self.sequence_counter,
            vertex,
        });
        self.sequence_counter += 1;
    }

    pub fn pop(&mut self) -> Option<(usize, f64)> {
        self.heap.pop().map(|entry| (entry.vertex, entry.distance))
    }
}
