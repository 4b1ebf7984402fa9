pub mod config;
pub mod events;
pub mod simulation_engine;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use events::{EventRecorder, FulfillmentEvent, SimulationObserver};
pub use simulation_engine::{DeadlineBreach, Simulation, SimulationReport, TickOutcome};
