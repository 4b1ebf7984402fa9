pub mod order;
pub mod queue;

pub use order::Order;
pub use queue::OrderQueue;
