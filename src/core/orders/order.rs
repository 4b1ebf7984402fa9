use crate::core::types::PlaceId;
use serde::{Deserialize, Serialize};

/// Time-windowed request to deliver coal to a buyer.
///
/// The deadline is fixed at construction as `created_at + deadline_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    created_at: f64,
    customer: PlaceId,
    coal: u32,
    deadline: f64,
}

impl Order {
    pub fn new(created_at: f64, customer: PlaceId, coal: u32, deadline_offset: f64) -> Self {
        Self {
            created_at,
            customer,
            coal,
            deadline: created_at + deadline_offset,
        }
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn customer(&self) -> PlaceId {
        self.customer
    }

    pub fn coal(&self) -> u32 {
        self.coal
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    /// Time left before the deadline once `coal` units have been unloaded
    /// at `unload_rate` after arriving at `arrival`. Negative means breached.
    pub fn reserve(&self, arrival: f64, unload_rate: f64) -> f64 {
        self.deadline - arrival + self.coal as f64 * unload_rate
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.created_at, self.customer, self.coal, self.deadline
        )
    }
}
