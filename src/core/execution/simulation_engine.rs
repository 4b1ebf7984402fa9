use super::config::SimulationConfig;
use super::events::{log_event, FulfillmentEvent, SimulationObserver};
use crate::core::errors::{GraphError, SimulationError};
use crate::core::fleet::FleetManager;
use crate::core::graph::{DistanceCache, Graph};
use crate::core::input::Scenario;
use crate::core::orders::{Order, OrderQueue};
use crate::core::places::{Place, PlaceRegistry};
use crate::core::types::{OrderId, PlaceId, TransportId};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// What a single polling tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The earliest order is not due yet
    Idle,
    /// No transport was free; retried on the next tick
    Deferred,
    /// The earliest order was delivered
    Delivered,
    /// A deadline was missed and the queue was discarded
    Aborted,
    /// No orders left
    Finished,
}

/// The missed deadline that stopped a run
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineBreach {
    pub order: OrderId,
    pub customer: PlaceId,
    pub arrival: f64,
    pub deadline: f64,
}

/// Counters collected over a run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Orders delivered as the primary order of a trip
    pub completed_orders: u32,
    /// Orders delivered en route to another customer
    pub opportunistic_orders: u32,
    pub delivered_coal: u64,
    pub fleet_size: usize,
    pub final_time: f64,
    pub breach: Option<DeadlineBreach>,
    pub timed_out: bool,
}

/// Order fulfillment control loop.
///
/// Owns the whole simulation context. Polls the order queue against the
/// simulated clock, assigns transports and walks each delivery along the
/// graph. Every trip runs on its own timeline that starts at the clock; the
/// transport becomes available again where that timeline ends.
pub struct Simulation {
    places: PlaceRegistry,
    graph: Graph,
    fleet: FleetManager,
    queue: OrderQueue,
    config: SimulationConfig,
    clock: f64,
    completed_orders: u32,
    opportunistic_orders: u32,
    delivered_coal: u64,
    fleet_expanded: bool,
    breach: Option<DeadlineBreach>,
    timed_out: bool,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Simulation {
    /// Assemble a simulation from its parts. Every order must target a buyer
    /// and the tick must be a positive finite step.
    pub fn new(
        places: PlaceRegistry,
        graph: Graph,
        fleet: FleetManager,
        queue: OrderQueue,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        if !config.tick.is_finite() || config.tick <= 0.0 {
            return Err(SimulationError::InvalidTick(config.tick));
        }
        for (_, order) in queue.iter() {
            places.buyer(order.customer())?;
        }
        if graph.vertex_count() != places.len() {
            return Err(SimulationError::GraphSizeMismatch {
                vertices: graph.vertex_count(),
                places: places.len(),
            });
        }

        Ok(Self {
            places,
            graph,
            fleet,
            queue,
            config,
            clock: 0.0,
            completed_orders: 0,
            opportunistic_orders: 0,
            delivered_coal: 0,
            fleet_expanded: false,
            breach: None,
            timed_out: false,
            observers: Vec::new(),
        })
    }

    /// Build a simulation from parsed input, seeding the RNG from the config
    pub fn from_scenario(
        scenario: Scenario,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let rng: Box<dyn RngCore> = match config.random_seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        Self::from_scenario_with_rng(scenario, config, rng)
    }

    /// Build a simulation from parsed input with an explicit random source
    pub fn from_scenario_with_rng(
        scenario: Scenario,
        config: SimulationConfig,
        rng: Box<dyn RngCore>,
    ) -> Result<Self, SimulationError> {
        let places = PlaceRegistry::new(scenario.storages, scenario.buyers);

        let cache = match config.cache_bound(places.len()) {
            Some(capacity) => DistanceCache::bounded(capacity),
            None => DistanceCache::unbounded(),
        };
        let mut graph = Graph::with_cache(places.len(), cache);
        for (from, to) in scenario.edges {
            let weight = places.get(from)?.point().distance(&places.get(to)?.point());
            graph.add_edge(from, to, weight)?;
        }

        let fleet = FleetManager::new(scenario.templates, rng, config.weight_tolerance)?;
        let queue = scenario.orders.into_iter().collect();
        Self::new(places, graph, fleet, queue, config)
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    fn emit(&mut self, time: f64, event: FulfillmentEvent) {
        log_event(time, &event);
        for observer in &mut self.observers {
            observer.on_event(time, &event);
        }
    }

    /// Run until the queue is empty, a deadline is missed or `max_time` passes
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        debug!("Starting with {} pending orders", self.queue.len());

        while !self.queue.is_empty() {
            if let Some(max_time) = self.config.max_time {
                if self.clock > max_time {
                    warn!(
                        "Stopping at time {:.1} with {} orders pending",
                        self.clock,
                        self.queue.len()
                    );
                    self.timed_out = true;
                    break;
                }
            }

            if self.step()? == TickOutcome::Aborted {
                break;
            }
            self.clock += self.config.tick;
        }

        debug!(
            "Finished at time {:.1}: {} completed, {} en route, {} coal delivered",
            self.clock, self.completed_orders, self.opportunistic_orders, self.delivered_coal
        );
        Ok(self.report())
    }

    /// Process the earliest order once against the current clock
    pub fn step(&mut self) -> Result<TickOutcome, SimulationError> {
        let Some((order_id, order)) = self.queue.peek() else {
            return Ok(TickOutcome::Finished);
        };
        let order = order.clone();
        if self.clock < order.created_at() {
            return Ok(TickOutcome::Idle);
        }

        let storage = self.nearest_storage(order.customer())?;
        let transport = match self
            .fleet
            .find_best_available(storage, self.clock, &mut self.graph)?
        {
            Some(id) => id,
            None if !self.fleet.can_reach(storage, &mut self.graph)? => {
                // Empty fleet, or every transport sits in another component
                self.fleet.spawn(storage, self.clock)?
            }
            None => {
                debug!("Time {:.1}: no transport free for order {}", self.clock, order_id);
                return Ok(TickOutcome::Deferred);
            }
        };

        self.dispatch(order_id, &order, transport)
    }

    /// Storage with the shortest route to `customer`; unreachable storages are skipped
    fn nearest_storage(&mut self, customer: PlaceId) -> Result<PlaceId, SimulationError> {
        let mut best: Option<(PlaceId, f64)> = None;
        let storages: Vec<PlaceId> = self.places.storage_ids().collect();
        for storage in storages {
            let distance = match self.graph.distance(storage, customer) {
                Ok(distance) => distance,
                Err(GraphError::Unreachable { .. }) => {
                    warn!("Storage {} cannot reach customer {}", storage, customer);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((storage, distance));
            }
        }
        best.map(|(storage, _)| storage)
            .ok_or(SimulationError::NoReachableStorage(customer))
    }

    /// Move a transport along `distance`, advancing the trip timeline.
    /// Returns whether maintenance is due.
    fn travel(
        &mut self,
        transport: TransportId,
        distance: f64,
        time: &mut f64,
    ) -> Result<bool, SimulationError> {
        let transport = self.fleet.get_mut(transport)?;
        let due = transport.record_travel(distance);
        *time += transport.travel_time(distance);
        Ok(due)
    }

    /// Load, travel, deliver and return for one order
    fn dispatch(
        &mut self,
        order_id: OrderId,
        order: &Order,
        transport_id: TransportId,
    ) -> Result<TickOutcome, SimulationError> {
        let start = self.clock;
        let mut time = start;
        self.emit(
            time,
            FulfillmentEvent::OrderStarted {
                order: order_id,
                customer: order.customer(),
                coal: order.coal(),
                deadline: order.deadline(),
            },
        );

        // Load at the transport's home storage
        let home = self.fleet.get(transport_id)?.position;
        let (loaded, unload_rate) = {
            let storage = self.places.storage_mut(home)?;
            storage.refresh(time);
            let transport = self.fleet.get_mut(transport_id)?;
            let loaded = storage.take(transport.free_capacity(), time);
            transport.add_coal(loaded);
            (loaded, storage.time_to_load)
        };
        time += loaded as f64 * unload_rate;
        self.emit(
            start,
            FulfillmentEvent::Loaded {
                transport: transport_id,
                storage: home,
                coal: loaded,
                departure: time,
            },
        );

        let path = self.graph.shortest_path(home, order.customer())?;
        let travelled = self.graph.path_weight(&path)?;

        if path.len() == 2 {
            self.travel(transport_id, travelled, &mut time)?;
        } else {
            for (leg, pair) in path.windows(2).enumerate() {
                let distance = self.graph.path_weight(pair)?;
                let service_due = self.travel(transport_id, distance, &mut time)?;
                if leg + 2 == path.len() {
                    break;
                }

                let stop = pair[1];
                let is_storage = self.places.get(stop)?.is_storage();
                if is_storage {
                    if service_due {
                        time += self.fleet.get_mut(transport_id)?.service();
                        self.emit(
                            time,
                            FulfillmentEvent::Maintenance {
                                transport: transport_id,
                                at: stop,
                                resume_at: time,
                            },
                        );
                    }
                } else if !self.serve_en_route(
                    order_id,
                    order,
                    transport_id,
                    stop,
                    unload_rate,
                    &mut time,
                )? {
                    return Ok(self.abort(order_id, order, time));
                }
            }
        }

        if order.reserve(time, unload_rate) < 0.0 {
            return Ok(self.abort(order_id, order, time));
        }
        self.deliver(transport_id, order_id, order, unload_rate, false, &mut time)?;
        self.completed_orders += 1;

        self.emit(
            time,
            FulfillmentEvent::Returning {
                transport: transport_id,
                storage: home,
            },
        );
        self.travel(transport_id, travelled, &mut time)?;

        self.fleet.get_mut(transport_id)?.available_at = time;
        self.queue.remove(order_id);

        self.maybe_expand_fleet(transport_id, order, time - start)?;
        Ok(TickOutcome::Delivered)
    }

    /// At an intermediate buyer, deliver that buyer's own pending order.
    ///
    /// The order is taken only if it was created no later than the current trip
    /// time and the transport carries at least `primary.coal + order.coal`, so
    /// the primary order is never left short by a stop on the way. Otherwise
    /// the stop is a pass-through. Returns false when the primary order's
    /// deadline is already lost.
    fn serve_en_route(
        &mut self,
        primary_id: OrderId,
        primary: &Order,
        transport_id: TransportId,
        stop: PlaceId,
        unload_rate: f64,
        time: &mut f64,
    ) -> Result<bool, SimulationError> {
        let carrying = self.fleet.get(transport_id)?.current_coal();
        let candidate = self
            .queue
            .earliest_for_customer(stop, *time, primary_id)
            .map(|(id, order)| (id, order.clone()))
            .filter(|(_, order)| carrying >= primary.coal() + order.coal());

        let Some((extra_id, extra)) = candidate else {
            self.emit(
                *time,
                FulfillmentEvent::PassThrough {
                    transport: transport_id,
                    at: stop,
                },
            );
            return Ok(true);
        };

        if primary.reserve(*time, unload_rate) < 0.0 {
            return Ok(false);
        }
        self.deliver(transport_id, extra_id, &extra, unload_rate, true, time)?;
        self.opportunistic_orders += 1;
        self.queue.remove(extra_id);
        Ok(true)
    }

    /// Unload an order at the current trip time and count the coal actually unloaded
    fn deliver(
        &mut self,
        transport_id: TransportId,
        order_id: OrderId,
        order: &Order,
        unload_rate: f64,
        opportunistic: bool,
        time: &mut f64,
    ) -> Result<(), SimulationError> {
        let arrival = *time;
        let unloaded = self.fleet.get_mut(transport_id)?.unload(order.coal());
        if unloaded < order.coal() {
            warn!(
                "Order {} short by {}: transport {} carried only {}",
                order_id,
                order.coal() - unloaded,
                transport_id,
                unloaded
            );
        }
        *time += unloaded as f64 * unload_rate;
        self.delivered_coal += u64::from(unloaded);
        self.emit(
            arrival,
            FulfillmentEvent::Delivered {
                transport: transport_id,
                order: order_id,
                customer: order.customer(),
                coal: unloaded,
                unloaded_at: *time,
                reserve: order.reserve(arrival, unload_rate),
                opportunistic,
            },
        );
        Ok(())
    }

    /// Deadline missed: discard every pending order and stop
    fn abort(&mut self, order_id: OrderId, order: &Order, arrival: f64) -> TickOutcome {
        let discarded = self.queue.clear();
        self.breach = Some(DeadlineBreach {
            order: order_id,
            customer: order.customer(),
            arrival,
            deadline: order.deadline(),
        });
        self.emit(
            arrival,
            FulfillmentEvent::Aborted {
                order: order_id,
                customer: order.customer(),
                discarded,
            },
        );
        TickOutcome::Aborted
    }

    /// One-shot fleet sizing: once a transport of the slowest template finishes
    /// its first trip, estimate how many trips fit before the order's deadline
    /// and spawn enough transports for the rest of the queue in one burst.
    fn maybe_expand_fleet(
        &mut self,
        transport_id: TransportId,
        order: &Order,
        elapsed: f64,
    ) -> Result<(), SimulationError> {
        if self.fleet_expanded {
            return Ok(());
        }
        let template = self.fleet.get(transport_id)?.template();
        let is_slowest = self
            .fleet
            .slowest_template()
            .map_or(false, |slowest| slowest.name == template);
        if !is_slowest {
            return Ok(());
        }
        self.fleet_expanded = true;

        let remaining = self.queue.len();
        if remaining == 0 || elapsed <= 0.0 {
            return Ok(());
        }
        let achievable = order.deadline() / elapsed;
        let extra = if achievable > 0.0 {
            ((remaining as f64 / achievable).ceil() as usize).min(remaining)
        } else {
            remaining
        };
        if extra == 0 {
            return Ok(());
        }

        let slice = remaining / extra;
        let customers: Vec<PlaceId> = self.queue.iter().map(|(_, o)| o.customer()).collect();
        for i in 0..extra {
            let customer = customers[(i * slice).min(customers.len() - 1)];
            let storage = self.nearest_storage(customer)?;
            self.fleet.spawn(storage, self.clock)?;
        }

        debug!(
            "Slowest trip took {:.1}, {:.1} trips fit before the deadline",
            elapsed, achievable
        );
        let fleet_size = self.fleet.len();
        self.emit(self.clock, FulfillmentEvent::FleetExpanded { added: extra, fleet_size });
        Ok(())
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            completed_orders: self.completed_orders,
            opportunistic_orders: self.opportunistic_orders,
            delivered_coal: self.delivered_coal,
            fleet_size: self.fleet.len(),
            final_time: self.clock,
            breach: self.breach.clone(),
            timed_out: self.timed_out,
        }
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    pub fn fleet(&self) -> &FleetManager {
        &self.fleet
    }

    pub fn places(&self) -> &PlaceRegistry {
        &self.places
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Resolve a place on the routing graph
    pub fn place(&self, id: PlaceId) -> Result<Place<'_>, SimulationError> {
        Ok(self.places.get(id)?)
    }
}
