// Tests for the order fulfillment loop
#[cfg(test)]
mod tests {
    use crate::core::{
        errors::{PlaceError, SimulationError},
        execution::{EventRecorder, FulfillmentEvent, Simulation, SimulationConfig, TickOutcome},
        fleet::{FleetManager, TemplateSpec},
        graph::Graph,
        orders::{Order, OrderQueue},
        places::{Buyer, PlaceRegistry, Storage},
        types::{PlaceId, Point},
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn template(speed: f64, capacity: u32, service_every: f64, repair: f64) -> TemplateSpec {
        TemplateSpec {
            name: "wagon".to_string(),
            speed_min: speed,
            speed_max: speed,
            distance_min: service_every,
            distance_max: service_every,
            time_to_repair: repair,
            max_capacity: capacity,
            spawn_weight: 1.0,
        }
    }

    fn fleet(spec: TemplateSpec) -> FleetManager {
        FleetManager::new(vec![spec], Box::new(StdRng::seed_from_u64(7)), 1e-6).unwrap()
    }

    /// Storage 1 at the origin, buyers 2 and 3 further along the x axis,
    /// connected as a line 1 - 2 - 3.
    fn line_of_buyers() -> (PlaceRegistry, Graph) {
        let places = PlaceRegistry::new(
            vec![Storage::new(Point::new(0.0, 0.0), 100, 10.0, 0.0)],
            vec![Buyer::new(Point::new(10.0, 0.0)), Buyer::new(Point::new(20.0, 0.0))],
        );
        let mut graph = Graph::new(3);
        graph.add_edge(PlaceId(1), PlaceId(2), 10.0).unwrap();
        graph.add_edge(PlaceId(2), PlaceId(3), 10.0).unwrap();
        (places, graph)
    }

    fn simulation(
        places: PlaceRegistry,
        graph: Graph,
        fleet: FleetManager,
        orders: Vec<Order>,
    ) -> (Simulation, Rc<RefCell<EventRecorder>>) {
        let queue: OrderQueue = orders.into_iter().collect();
        let mut sim =
            Simulation::new(places, graph, fleet, queue, SimulationConfig::new()).unwrap();
        let recorder = Rc::new(RefCell::new(EventRecorder::new()));
        sim.add_observer(Box::new(recorder.clone()));
        (sim, recorder)
    }

    fn default_fleet() -> FleetManager {
        fleet(template(1.0, 10, 100.0, 1.0))
    }

    #[test]
    fn test_step_outcomes_without_work() {
        let (places, graph) = line_of_buyers();
        let (mut sim, _) = simulation(places, graph, default_fleet(), vec![]);
        assert_eq!(sim.step().unwrap(), TickOutcome::Finished);

        let (places, graph) = line_of_buyers();
        let orders = vec![Order::new(5.0, PlaceId(2), 1, 100.0)];
        let (mut sim, recorder) = simulation(places, graph, default_fleet(), orders);
        assert_eq!(sim.step().unwrap(), TickOutcome::Idle);
        assert!(recorder.borrow().events.is_empty());
        assert!(sim.fleet().is_empty());
    }

    #[test]
    fn test_busy_fleet_defers_order() {
        let (places, graph) = line_of_buyers();
        let mut manager = default_fleet();
        let id = manager.spawn(PlaceId(1), 50.0).unwrap();
        let orders = vec![Order::new(0.0, PlaceId(2), 1, 100.0)];
        let (mut sim, _) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Deferred);
        assert_eq!(sim.queue().len(), 1);
        assert_eq!(sim.fleet().get(id).unwrap().available_at, 50.0);
    }

    #[test]
    fn test_disconnected_fleet_spawns_in_reachable_component() {
        // Two separate networks: 1 - 3 and 2 - 4
        let places = PlaceRegistry::new(
            vec![
                Storage::new(Point::new(0.0, 0.0), 100, 10.0, 0.0),
                Storage::new(Point::new(100.0, 0.0), 100, 10.0, 0.0),
            ],
            vec![Buyer::new(Point::new(10.0, 0.0)), Buyer::new(Point::new(110.0, 0.0))],
        );
        let mut graph = Graph::new(4);
        graph.add_edge(PlaceId(1), PlaceId(3), 10.0).unwrap();
        graph.add_edge(PlaceId(2), PlaceId(4), 10.0).unwrap();

        // Only the fast template is ever drawn, so fleet growth never fires
        let slow = TemplateSpec {
            name: "slow".to_string(),
            spawn_weight: 0.0,
            ..template(1.0, 100, 1000.0, 1.0)
        };
        let fast = TemplateSpec {
            name: "fast".to_string(),
            ..template(5.0, 100, 1000.0, 1.0)
        };
        let manager =
            FleetManager::new(vec![slow, fast], Box::new(StdRng::seed_from_u64(3)), 1e-6).unwrap();

        let queue: OrderQueue = vec![
            Order::new(0.0, PlaceId(3), 1, 100.0),
            Order::new(0.0, PlaceId(4), 1, 100.0),
        ]
        .into_iter()
        .collect();
        let config = SimulationConfig::new().with_max_time(1000.0);
        let mut sim = Simulation::new(places, graph, manager, queue, config).unwrap();

        let report = sim.run().unwrap();
        assert!(!report.timed_out);
        assert_eq!(report.completed_orders, 2);
        assert_eq!(report.fleet_size, 2);
        let positions: Vec<PlaceId> = sim.fleet().active().iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![PlaceId(1), PlaceId(2)]);
    }

    #[test]
    fn test_maintenance_at_intermediate_storage() {
        // Storage 1 -(10)- storage 2 -(5)- buyer 3
        let places = PlaceRegistry::new(
            vec![
                Storage::new(Point::new(0.0, 0.0), 100, 10.0, 0.0),
                Storage::new(Point::new(10.0, 0.0), 100, 10.0, 0.0),
            ],
            vec![Buyer::new(Point::new(15.0, 0.0))],
        );
        let mut graph = Graph::new(3);
        graph.add_edge(PlaceId(1), PlaceId(2), 10.0).unwrap();
        graph.add_edge(PlaceId(2), PlaceId(3), 5.0).unwrap();

        let mut manager = fleet(template(1.0, 100, 5.0, 7.0));
        let id = manager.spawn(PlaceId(1), 0.0).unwrap();
        let orders = vec![Order::new(0.0, PlaceId(3), 10, 1000.0)];
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Delivered);

        let transport = sim.fleet().get(id).unwrap();
        // 10 out, 7 repair, 5 to the buyer, 15 back
        assert_eq!(transport.available_at, 37.0);
        assert_eq!(transport.distance_since_service, 20.0);
        assert_eq!(transport.current_coal(), 90);

        let recorder = recorder.borrow();
        let events = &recorder.events;
        assert!(events.iter().any(|(_, e)| matches!(
            e,
            FulfillmentEvent::Maintenance { at, resume_at, .. }
                if *at == PlaceId(2) && *resume_at == 17.0
        )));
        assert!(events.iter().any(|(time, e)| matches!(
            e,
            FulfillmentEvent::Delivered { opportunistic: false, .. }
        ) && *time == 22.0));
    }

    #[test]
    fn test_pass_through_when_cargo_is_short() {
        let (places, graph) = line_of_buyers();
        let orders = vec![
            Order::new(0.0, PlaceId(3), 8, 1000.0),
            Order::new(0.0, PlaceId(2), 5, 1000.0),
        ];
        let manager = fleet(template(1.0, 10, 1000.0, 1.0));
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Delivered);
        let report = sim.report();
        assert_eq!(report.completed_orders, 1);
        assert_eq!(report.opportunistic_orders, 0);
        assert_eq!(report.delivered_coal, 8);
        assert_eq!(sim.queue().len(), 1);

        assert!(recorder.borrow().events.iter().any(|(_, e)| matches!(
            e,
            FulfillmentEvent::PassThrough { at, .. } if *at == PlaceId(2)
        )));
    }

    #[test]
    fn test_future_order_is_not_served_en_route() {
        let (places, graph) = line_of_buyers();
        let orders = vec![
            Order::new(0.0, PlaceId(3), 2, 1000.0),
            Order::new(50.0, PlaceId(2), 2, 1000.0),
        ];
        let manager = fleet(template(1.0, 100, 1000.0, 1.0));
        let (mut sim, _) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Delivered);
        assert_eq!(sim.report().opportunistic_orders, 0);
        assert_eq!(sim.queue().len(), 1);
    }

    #[test]
    fn test_deadline_lost_before_en_route_delivery() {
        let (places, graph) = line_of_buyers();
        // The primary is already late when the transport reaches buyer 2 at time 10
        let orders = vec![
            Order::new(0.0, PlaceId(3), 2, 5.0),
            Order::new(0.0, PlaceId(2), 2, 1000.0),
        ];
        let manager = fleet(template(1.0, 100, 1000.0, 1.0));
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Aborted);
        assert!(sim.queue().is_empty());

        let report = sim.report();
        assert_eq!(report.completed_orders, 0);
        assert_eq!(report.opportunistic_orders, 0);
        assert_eq!(report.delivered_coal, 0);
        let breach = report.breach.unwrap();
        assert_eq!(breach.customer, PlaceId(3));
        assert_eq!(breach.arrival, 10.0);
        assert_eq!(breach.deadline, 5.0);

        let recorder = recorder.borrow();
        assert!(!recorder
            .events
            .iter()
            .any(|(_, e)| matches!(e, FulfillmentEvent::Delivered { .. })));
        assert!(recorder
            .events
            .iter()
            .any(|(_, e)| matches!(e, FulfillmentEvent::Aborted { discarded: 2, .. })));
    }

    #[test]
    fn test_deadline_lost_after_en_route_delivery() {
        let (places, graph) = line_of_buyers();
        // Buyer 2 is served at time 10, the primary arrives at 20 past its deadline of 15
        let orders = vec![
            Order::new(0.0, PlaceId(3), 2, 15.0),
            Order::new(0.0, PlaceId(2), 3, 1000.0),
        ];
        let manager = fleet(template(1.0, 100, 1000.0, 1.0));
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Aborted);
        assert!(sim.queue().is_empty());

        let report = sim.report();
        assert_eq!(report.completed_orders, 0);
        assert_eq!(report.opportunistic_orders, 1);
        assert_eq!(report.delivered_coal, 3);
        let breach = report.breach.unwrap();
        assert_eq!(breach.customer, PlaceId(3));
        assert_eq!(breach.arrival, 20.0);

        assert!(recorder
            .borrow()
            .events
            .iter()
            .any(|(_, e)| matches!(e, FulfillmentEvent::Aborted { discarded: 1, .. })));
    }

    #[test]
    fn test_load_limited_by_stock() {
        let places = PlaceRegistry::new(
            vec![Storage::new(Point::new(0.0, 0.0), 3, 25.0, 0.0)],
            vec![Buyer::new(Point::new(4.0, 0.0))],
        );
        let mut graph = Graph::new(2);
        graph.add_edge(PlaceId(1), PlaceId(2), 4.0).unwrap();
        let orders = vec![Order::new(0.0, PlaceId(2), 2, 100.0)];
        let manager = fleet(template(2.0, 10, 1000.0, 1.0));
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Delivered);
        assert!(recorder
            .borrow()
            .events
            .iter()
            .any(|(_, e)| matches!(e, FulfillmentEvent::Loaded { coal: 3, .. })));

        let storage = sim.places().storage(PlaceId(1)).unwrap();
        assert_eq!(storage.current_coal, 0);
        assert_eq!(storage.full_at, 25.0);
    }

    #[test]
    fn test_short_delivery_counts_unloaded_coal() {
        let places = PlaceRegistry::new(
            vec![Storage::new(Point::new(0.0, 0.0), 3, 25.0, 0.0)],
            vec![Buyer::new(Point::new(4.0, 0.0))],
        );
        let mut graph = Graph::new(2);
        graph.add_edge(PlaceId(1), PlaceId(2), 4.0).unwrap();
        let orders = vec![Order::new(0.0, PlaceId(2), 20, 100.0)];
        let manager = fleet(template(2.0, 50, 1000.0, 1.0));
        let (mut sim, recorder) = simulation(places, graph, manager, orders);

        assert_eq!(sim.step().unwrap(), TickOutcome::Delivered);
        let report = sim.report();
        assert_eq!(report.completed_orders, 1);
        assert_eq!(report.delivered_coal, 3);
        assert!(recorder
            .borrow()
            .events
            .iter()
            .any(|(_, e)| matches!(e, FulfillmentEvent::Delivered { coal: 3, .. })));
    }

    #[test]
    fn test_run_stops_after_max_time() {
        let (places, graph) = line_of_buyers();
        let queue: OrderQueue = vec![Order::new(100.0, PlaceId(2), 1, 10.0)].into_iter().collect();
        let config = SimulationConfig::new().with_max_time(1.0);
        let mut sim = Simulation::new(places, graph, default_fleet(), queue, config).unwrap();

        let report = sim.run().unwrap();
        assert!(report.timed_out);
        assert_eq!(report.completed_orders, 0);
        assert!(report.final_time > 1.0);
        assert_eq!(sim.queue().len(), 1);
    }

    #[test]
    fn test_tick_must_be_positive_and_finite() {
        for tick in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let (places, graph) = line_of_buyers();
            let queue: OrderQueue = std::iter::once(Order::new(5.0, PlaceId(2), 1, 10.0)).collect();
            let config = SimulationConfig::new().with_tick(tick);
            let result = Simulation::new(places, graph, default_fleet(), queue, config);
            assert!(
                matches!(result, Err(SimulationError::InvalidTick(_))),
                "tick {} accepted",
                tick
            );
        }
    }

    #[test]
    fn test_orders_must_target_buyers() {
        let (places, graph) = line_of_buyers();
        let queue: OrderQueue = vec![Order::new(0.0, PlaceId(1), 1, 10.0)].into_iter().collect();
        let result =
            Simulation::new(places, graph, default_fleet(), queue, SimulationConfig::new());
        assert!(matches!(
            result,
            Err(SimulationError::Place(PlaceError::NotABuyer(PlaceId(1))))
        ));
    }

    #[test]
    fn test_graph_must_cover_every_place() {
        let (places, _) = line_of_buyers();
        let result = Simulation::new(
            places,
            Graph::new(2),
            default_fleet(),
            OrderQueue::new(),
            SimulationConfig::new(),
        );
        assert!(matches!(
            result,
            Err(SimulationError::GraphSizeMismatch { vertices: 2, places: 3 })
        ));
    }
}
