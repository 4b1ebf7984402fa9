pub mod core;

// Re-export commonly used types
pub use crate::core::errors::{FleetError, GraphError, ParseError, PlaceError, SimulationError};
pub use crate::core::execution::{
    DeadlineBreach, EventRecorder, FulfillmentEvent, Simulation, SimulationConfig,
    SimulationObserver, SimulationReport, TickOutcome,
};
pub use crate::core::input::Scenario;
pub use crate::core::types::{OrderId, PlaceId, Point, TransportId};
