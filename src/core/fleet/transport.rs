use super::template::TransportTemplate;
use crate::core::types::PlaceId;

/// Concrete carrier spawned from a template.
///
/// Invariant: `0 <= current_coal <= max_capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    template: String,
    speed: f64,
    max_capacity: u32,
    current_coal: u32,
    maintenance_distance: f64,
    time_to_repair: f64,
    /// Home storage the transport loads at
    pub position: PlaceId,
    /// Simulated time at which the transport is free again
    pub available_at: f64,
    /// Distance travelled since the last repair
    pub distance_since_service: f64,
}

impl Transport {
    pub fn new(
        template: &TransportTemplate,
        maintenance_distance: f64,
        position: PlaceId,
        available_at: f64,
    ) -> Self {
        Self {
            template: template.name.clone(),
            speed: template.nominal_speed,
            max_capacity: template.max_capacity,
            current_coal: 0,
            maintenance_distance,
            time_to_repair: template.time_to_repair,
            position,
            available_at,
            distance_since_service: 0.0,
        }
    }

    /// Load coal, never exceeding capacity. Returns the amount accepted.
    pub fn add_coal(&mut self, coal: u32) -> u32 {
        let accepted = coal.min(self.free_capacity());
        self.current_coal += accepted;
        accepted
    }

    /// Unload up to `coal` units. Returns the amount actually removed.
    pub fn unload(&mut self, coal: u32) -> u32 {
        let removed = coal.min(self.current_coal);
        self.current_coal -= removed;
        removed
    }

    pub fn is_full(&self) -> bool {
        self.current_coal >= self.max_capacity
    }

    pub fn free_capacity(&self) -> u32 {
        self.max_capacity - self.current_coal
    }

    /// Time needed to cover `distance`
    pub fn travel_time(&self, distance: f64) -> f64 {
        distance / self.speed
    }

    /// Record travelled distance and report whether maintenance is due
    pub fn record_travel(&mut self, distance: f64) -> bool {
        self.distance_since_service += distance;
        self.needs_service()
    }

    pub fn needs_service(&self) -> bool {
        self.distance_since_service > self.maintenance_distance
    }

    /// Reset the odometer after a repair; returns the repair duration
    pub fn service(&mut self) -> f64 {
        self.distance_since_service = 0.0;
        self.time_to_repair
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn current_coal(&self) -> u32 {
        self.current_coal
    }

    pub fn maintenance_distance(&self) -> f64 {
        self.maintenance_distance
    }

    pub fn time_to_repair(&self) -> f64 {
        self.time_to_repair
    }
}
