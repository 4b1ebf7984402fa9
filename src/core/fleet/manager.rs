use super::template::{TemplateSpec, TransportTemplate};
use super::transport::Transport;
use crate::core::errors::{FleetError, GraphError};
use crate::core::graph::Graph;
use crate::core::types::{PlaceId, TransportId};
use log::debug;
use rand::{Rng, RngCore};

/// Holds transport templates and the active fleet spawned from them
pub struct FleetManager {
    /// Registry of templates in input order
    templates: Vec<TransportTemplate>,
    /// Normalized cumulative spawn weights, parallel to `templates`
    cumulative: Vec<f64>,
    /// Spawned instances; never shrinks
    active: Vec<Transport>,
    rng: Box<dyn RngCore>,
}

impl FleetManager {
    /// Build templates from their specs and validate spawn weights.
    ///
    /// Weights must be non-negative and sum to 1 within `tolerance`.
    pub fn new(
        specs: Vec<TemplateSpec>,
        mut rng: Box<dyn RngCore>,
        tolerance: f64,
    ) -> Result<Self, FleetError> {
        if specs.is_empty() {
            return Err(FleetError::NoTemplates);
        }

        let mut templates = Vec::with_capacity(specs.len());
        for spec in specs {
            if !spec.spawn_weight.is_finite() || spec.spawn_weight < 0.0 {
                return Err(FleetError::InvalidTemplate {
                    name: spec.name,
                    reason: "spawn weight must be a non-negative number".to_string(),
                });
            }
            templates.push(TransportTemplate::from_spec(spec, rng.as_mut())?);
        }

        let sum: f64 = templates.iter().map(|t| t.spawn_weight).sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(FleetError::InvalidSpawnWeights { sum });
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = templates
            .iter()
            .map(|t| {
                running += t.spawn_weight / sum;
                running
            })
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self {
            templates,
            cumulative,
            active: Vec::new(),
            rng,
        })
    }

    /// Pick a template by weighted random draw
    fn choose_template(&mut self) -> Result<usize, FleetError> {
        let draw: f64 = self.rng.gen();
        self.cumulative
            .iter()
            .position(|&cumulative| draw < cumulative)
            .ok_or(FleetError::SpawnDrawOutOfRange {
                draw,
                cumulative: self.cumulative.last().copied().unwrap_or(0.0),
            })
    }

    /// Spawn a transport from a randomly chosen template and add it to the active fleet
    pub fn spawn(
        &mut self,
        position: PlaceId,
        available_at: f64,
    ) -> Result<TransportId, FleetError> {
        let index = self.choose_template()?;
        let template = &self.templates[index];
        let maintenance_distance = template.draw_maintenance_distance(self.rng.as_mut());
        let transport = Transport::new(template, maintenance_distance, position, available_at);

        let id = TransportId(self.active.len());
        debug!(
            "Spawned transport {} ({}) at {}, maintenance every {:.1}",
            id,
            transport.template(),
            position,
            maintenance_distance
        );
        self.active.push(transport);
        Ok(id)
    }

    /// Among transports free by `available_by`, the one closest to `target`.
    /// Transports that cannot reach `target` are skipped; ties go to the lower id.
    pub fn find_best_available(
        &self,
        target: PlaceId,
        available_by: f64,
        graph: &mut Graph,
    ) -> Result<Option<TransportId>, GraphError> {
        let mut best: Option<(TransportId, f64)> = None;
        for (index, transport) in self.active.iter().enumerate() {
            if transport.available_at > available_by {
                continue;
            }
            let distance = match graph.distance(transport.position, target) {
                Ok(distance) => distance,
                Err(GraphError::Unreachable { .. }) => continue,
                Err(err) => return Err(err),
            };
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((TransportId(index), distance));
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Whether any active transport, busy or not, has a route to `target`
    pub fn can_reach(&self, target: PlaceId, graph: &mut Graph) -> Result<bool, GraphError> {
        for transport in &self.active {
            match graph.distance(transport.position, target) {
                Ok(_) => return Ok(true),
                Err(GraphError::Unreachable { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    /// Template with the lowest nominal speed; first one wins ties
    pub fn slowest_template(&self) -> Option<&TransportTemplate> {
        self.templates
            .iter()
            .reduce(|slowest, t| if t.nominal_speed < slowest.nominal_speed { t } else { slowest })
    }

    pub fn get(&self, id: TransportId) -> Result<&Transport, FleetError> {
        self.active.get(id.0).ok_or(FleetError::UnknownTransport(id))
    }

    pub fn get_mut(&mut self, id: TransportId) -> Result<&mut Transport, FleetError> {
        self.active.get_mut(id.0).ok_or(FleetError::UnknownTransport(id))
    }

    pub fn active(&self) -> &[Transport] {
        &self.active
    }

    pub fn templates(&self) -> &[TransportTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl std::fmt::Debug for FleetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetManager")
            .field("templates", &self.templates)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec(name: &str, speed: f64, weight: f64) -> TemplateSpec {
        TemplateSpec {
            name: name.to_string(),
            speed_min: speed,
            speed_max: speed,
            distance_min: 50.0,
            distance_max: 50.0,
            time_to_repair: 1.0,
            max_capacity: 10,
            spawn_weight: weight,
        }
    }

    fn fleet(specs: Vec<TemplateSpec>, rng: Box<dyn RngCore>) -> FleetManager {
        FleetManager::new(specs, rng, 1e-6).unwrap()
    }

    #[test]
    fn test_rejects_bad_weights() {
        let rng = || Box::new(StdRng::seed_from_u64(1)) as Box<dyn RngCore>;
        assert_eq!(
            FleetManager::new(vec![], rng(), 1e-6).unwrap_err(),
            FleetError::NoTemplates
        );
        assert!(matches!(
            FleetManager::new(vec![spec("a", 1.0, 0.7), spec("b", 1.0, 0.7)], rng(), 1e-6),
            Err(FleetError::InvalidSpawnWeights { .. })
        ));
        assert!(matches!(
            FleetManager::new(vec![spec("a", 1.0, 0.5)], rng(), 1e-6),
            Err(FleetError::InvalidSpawnWeights { .. })
        ));
        assert!(matches!(
            FleetManager::new(vec![spec("a", 1.0, -0.5), spec("b", 1.0, 1.5)], rng(), 1e-6),
            Err(FleetError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_deterministic_draws_with_mock_rng() {
        let specs = || vec![spec("slow", 1.0, 0.5), spec("fast", 4.0, 0.5)];

        let mut low = fleet(specs(), Box::new(StepRng::new(0, 0)));
        let id = low.spawn(PlaceId(1), 0.0).unwrap();
        assert_eq!(low.get(id).unwrap().template(), "slow");

        let mut high = fleet(specs(), Box::new(StepRng::new(u64::MAX, 0)));
        let id = high.spawn(PlaceId(2), 3.0).unwrap();
        let transport = high.get(id).unwrap();
        assert_eq!(transport.template(), "fast");
        assert_eq!(transport.speed(), 4.0);
        assert_eq!(transport.maintenance_distance(), 50.0);
        assert_eq!(transport.position, PlaceId(2));
        assert_eq!(transport.available_at, 3.0);
    }

    #[test]
    fn test_spawn_frequencies_follow_weights() {
        let mut manager = fleet(
            vec![spec("a", 1.0, 0.2), spec("b", 2.0, 0.3), spec("c", 3.0, 0.5)],
            Box::new(StdRng::seed_from_u64(2024)),
        );
        let n = 20_000;
        for _ in 0..n {
            manager.spawn(PlaceId(1), 0.0).unwrap();
        }
        for (name, weight) in [("a", 0.2), ("b", 0.3), ("c", 0.5)] {
            let count = manager.active().iter().filter(|t| t.template() == name).count();
            let frequency = count as f64 / n as f64;
            assert!((frequency - weight).abs() < 0.02, "{} drawn at {}", name, frequency);
        }
        assert_eq!(manager.len(), n);
    }

    #[test]
    fn test_slowest_template() {
        let manager = fleet(
            vec![spec("quick", 5.0, 0.4), spec("slug", 1.0, 0.3), spec("snail", 1.0, 0.3)],
            Box::new(StdRng::seed_from_u64(1)),
        );
        assert_eq!(manager.slowest_template().unwrap().name, "slug");
    }

    #[test]
    fn test_find_best_available() {
        // Storages 1 and 2, buyer 3; 1 is next to 3, 2 is far away
        let mut graph = Graph::new(4);
        graph.add_edge(PlaceId(1), PlaceId(3), 1.0).unwrap();
        graph.add_edge(PlaceId(2), PlaceId(3), 10.0).unwrap();

        let mut manager = fleet(vec![spec("a", 1.0, 1.0)], Box::new(StdRng::seed_from_u64(1)));
        let far = manager.spawn(PlaceId(2), 0.0).unwrap();
        let near_busy = manager.spawn(PlaceId(1), 50.0).unwrap();
        let _isolated = manager.spawn(PlaceId(4), 0.0).unwrap();

        assert_eq!(manager.find_best_available(PlaceId(1), 10.0, &mut graph).unwrap(), Some(far));
        assert_eq!(
            manager.find_best_available(PlaceId(1), 50.0, &mut graph).unwrap(),
            Some(near_busy)
        );

        manager.get_mut(far).unwrap().available_at = 20.0;
        assert_eq!(manager.find_best_available(PlaceId(1), 10.0, &mut graph).unwrap(), None);

        // Busy transports still count as able to reach; the isolated one never can
        assert!(manager.can_reach(PlaceId(1), &mut graph).unwrap());
        let mut island = fleet(vec![spec("a", 1.0, 1.0)], Box::new(StdRng::seed_from_u64(1)));
        island.spawn(PlaceId(4), 0.0).unwrap();
        assert!(!island.can_reach(PlaceId(1), &mut graph).unwrap());
    }

    #[test]
    fn test_unknown_transport() {
        let manager = fleet(vec![spec("a", 1.0, 1.0)], Box::new(StdRng::seed_from_u64(1)));
        assert_eq!(
            manager.get(TransportId(3)).unwrap_err(),
            FleetError::UnknownTransport(TransportId(3))
        );
    }
}
