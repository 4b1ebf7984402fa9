use super::order::Order;
use crate::core::types::{OrderId, PlaceId};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Queue key: creation time first, then arena position for stable ties
#[derive(Debug, Clone, Copy)]
struct QueueKey {
    created_at: f64,
    id: OrderId,
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .total_cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Pending orders, earliest creation time first.
///
/// Orders live in an arena and are addressed by `OrderId`; removal by handle
/// is O(log n). A per-customer index answers "earliest pending order of this
/// buyer" without scanning the queue.
#[derive(Debug, Clone, Default)]
pub struct OrderQueue {
    arena: Vec<Order>,
    pending: BTreeSet<QueueKey>,
    by_customer: HashMap<PlaceId, BTreeSet<QueueKey>>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: Order) -> OrderId {
        let id = OrderId(self.arena.len());
        let key = QueueKey {
            created_at: order.created_at(),
            id,
        };
        self.by_customer
            .entry(order.customer())
            .or_default()
            .insert(key);
        self.pending.insert(key);
        self.arena.push(order);
        id
    }

    /// Earliest pending order
    pub fn peek(&self) -> Option<(OrderId, &Order)> {
        self.pending
            .first()
            .map(|key| (key.id, &self.arena[key.id.0]))
    }

    /// Any order ever pushed, pending or not
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.arena.get(id.0)
    }

    pub fn is_pending(&self, id: OrderId) -> bool {
        self.key_of(id)
            .map(|key| self.pending.contains(&key))
            .unwrap_or(false)
    }

    fn key_of(&self, id: OrderId) -> Option<QueueKey> {
        self.arena.get(id.0).map(|order| QueueKey {
            created_at: order.created_at(),
            id,
        })
    }

    /// Remove a pending order by handle. Returns false if it was not pending.
    pub fn remove(&mut self, id: OrderId) -> bool {
        let Some(key) = self.key_of(id) else {
            return false;
        };
        if !self.pending.remove(&key) {
            return false;
        }
        let customer = self.arena[id.0].customer();
        if let Some(keys) = self.by_customer.get_mut(&customer) {
            keys.remove(&key);
            if keys.is_empty() {
                self.by_customer.remove(&customer);
            }
        }
        true
    }

    /// Earliest pending order of `customer` created no later than `created_by`,
    /// skipping `exclude`
    pub fn earliest_for_customer(
        &self,
        customer: PlaceId,
        created_by: f64,
        exclude: OrderId,
    ) -> Option<(OrderId, &Order)> {
        self.by_customer
            .get(&customer)?
            .iter()
            .take_while(|key| key.created_at <= created_by)
            .find(|key| key.id != exclude)
            .map(|key| (key.id, &self.arena[key.id.0]))
    }

    /// Pending orders in queue order
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, &Order)> {
        self.pending
            .iter()
            .map(move |key| (key.id, &self.arena[key.id.0]))
    }

    /// Drop every pending order, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.by_customer.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl FromIterator<Order> for OrderQueue {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        let mut queue = OrderQueue::new();
        for order in iter {
            queue.push(order);
        }
        queue
    }
}
