use super::types::{PlaceId, TransportId};

/// Errors raised by the routing graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("vertex {0} is not part of the graph")]
    UnknownVertex(PlaceId),
    #[error("no path from {from} to {to}")]
    Unreachable { from: PlaceId, to: PlaceId },
    #[error("edge {from}-{to} has invalid weight {weight}")]
    InvalidWeight { from: PlaceId, to: PlaceId, weight: f64 },
}

/// Errors raised while resolving places
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaceError {
    #[error("unknown place {0}")]
    UnknownPlace(PlaceId),
    #[error("place {0} is not a storage")]
    NotAStorage(PlaceId),
    #[error("place {0} is not a buyer")]
    NotABuyer(PlaceId),
}

/// Errors raised by the fleet manager
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FleetError {
    #[error("no transport templates configured")]
    NoTemplates,
    #[error("spawn weights must sum to 1 (got {sum})")]
    InvalidSpawnWeights { sum: f64 },
    #[error("invalid transport template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },
    #[error("spawn draw {draw} exceeds cumulative weight {cumulative}")]
    SpawnDrawOutOfRange { draw: f64, cumulative: f64 },
    #[error("unknown transport {0}")]
    UnknownTransport(TransportId),
}

/// Errors raised while reading a scenario
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("invalid {expected}: '{token}'")]
    InvalidNumber { token: String, expected: &'static str },
    #[error("comment opened but never closed")]
    UnterminatedComment,
    #[error("edge references unknown place {0}")]
    UnknownPlace(u32),
    #[error("order references unknown customer {0}")]
    UnknownCustomer(u32),
}

/// Top-level error of a simulation run
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("graph has {vertices} vertices but there are {places} places")]
    GraphSizeMismatch { vertices: usize, places: usize },
    #[error("no storage can reach customer {0}")]
    NoReachableStorage(PlaceId),
    #[error("tick must be a positive finite number (got {0})")]
    InvalidTick(f64),
}
