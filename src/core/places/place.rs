use crate::core::types::Point;
use serde::{Deserialize, Serialize};

/// Coal source with finite stock that regenerates over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    pub point: Point,
    /// Stock ceiling, restored on every regeneration
    pub capacity: u32,
    /// Coal currently available for loading
    pub current_coal: u32,
    pub time_to_generate: f64,
    /// Loading (and unloading) time per unit of coal
    pub time_to_load: f64,
    /// Simulated time at which the stock is full again
    pub full_at: f64,
}

impl Storage {
    pub fn new(point: Point, capacity: u32, time_to_generate: f64, time_to_load: f64) -> Self {
        Self {
            point,
            capacity,
            current_coal: capacity,
            time_to_generate,
            time_to_load,
            full_at: 0.0,
        }
    }

    /// Restore the stock if the regeneration time has passed
    pub fn refresh(&mut self, now: f64) {
        if now >= self.full_at {
            self.current_coal = self.capacity;
        }
    }

    /// Take up to `wanted` units. Returns the amount actually taken and
    /// restarts regeneration when anything left the storage.
    pub fn take(&mut self, wanted: u32, now: f64) -> u32 {
        let taken = wanted.min(self.current_coal);
        if taken > 0 {
            self.current_coal -= taken;
            self.full_at = now + self.time_to_generate;
        }
        taken
    }
}

/// Order destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    pub point: Point,
}

impl Buyer {
    pub fn new(point: Point) -> Self {
        Self { point }
    }
}

/// A graph vertex: either a storage or a buyer
#[derive(Debug, Clone, Copy)]
pub enum Place<'a> {
    Storage(&'a Storage),
    Buyer(&'a Buyer),
}

impl Place<'_> {
    pub fn point(&self) -> Point {
        match self {
            Place::Storage(storage) => storage.point,
            Place::Buyer(buyer) => buyer.point,
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Place::Storage(_))
    }
}
