use crate::core::errors::FleetError;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Transport type as read from input. Ranges are resolved into concrete
/// values when the template is built and when instances are spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub speed_min: f64,
    pub speed_max: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub time_to_repair: f64,
    pub max_capacity: u32,
    pub spawn_weight: f64,
}

/// Transport template with its nominal speed fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTemplate {
    pub name: String,
    pub nominal_speed: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub time_to_repair: f64,
    pub max_capacity: u32,
    pub spawn_weight: f64,
}

impl TransportTemplate {
    /// Validate a spec and draw its nominal speed
    pub fn from_spec(spec: TemplateSpec, rng: &mut dyn RngCore) -> Result<Self, FleetError> {
        let invalid = |reason: &str| FleetError::InvalidTemplate {
            name: spec.name.clone(),
            reason: reason.to_string(),
        };
        if !(spec.speed_min > 0.0)
            || spec.speed_max < spec.speed_min
            || !spec.speed_max.is_finite()
        {
            return Err(invalid("speed range must be positive and ordered"));
        }
        if spec.distance_min < 0.0
            || spec.distance_max < spec.distance_min
            || !spec.distance_max.is_finite()
        {
            return Err(invalid("distance range must be non-negative and ordered"));
        }
        if !(spec.time_to_repair >= 0.0) {
            return Err(invalid("repair time must be non-negative"));
        }

        let nominal_speed = if spec.speed_min == spec.speed_max {
            spec.speed_min
        } else {
            rng.gen_range(spec.speed_min..=spec.speed_max)
        };

        Ok(Self {
            name: spec.name,
            nominal_speed,
            distance_min: spec.distance_min,
            distance_max: spec.distance_max,
            time_to_repair: spec.time_to_repair,
            max_capacity: spec.max_capacity,
            spawn_weight: spec.spawn_weight,
        })
    }

    /// Draw the maintenance distance of a new instance: Gaussian around the
    /// middle of the configured range with a quarter of its width as spread.
    pub fn draw_maintenance_distance(&self, rng: &mut dyn RngCore) -> f64 {
        if self.distance_min == self.distance_max {
            return self.distance_min;
        }
        let mean = (self.distance_min + self.distance_max) / 2.0;
        let std_dev = (self.distance_max - self.distance_min) / 4.0;
        match Normal::new(mean, std_dev) {
            Ok(normal) => normal.sample(rng).max(0.0),
            Err(_) => mean,
        }
    }
}
