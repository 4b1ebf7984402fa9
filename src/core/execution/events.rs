use crate::core::types::{OrderId, PlaceId, TransportId};
use log::info;

/// Something that happened while fulfilling orders
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentEvent {
    OrderStarted {
        order: OrderId,
        customer: PlaceId,
        coal: u32,
        deadline: f64,
    },
    Loaded {
        transport: TransportId,
        storage: PlaceId,
        coal: u32,
        departure: f64,
    },
    Maintenance {
        transport: TransportId,
        at: PlaceId,
        resume_at: f64,
    },
    PassThrough {
        transport: TransportId,
        at: PlaceId,
    },
    Delivered {
        transport: TransportId,
        order: OrderId,
        customer: PlaceId,
        coal: u32,
        unloaded_at: f64,
        reserve: f64,
        opportunistic: bool,
    },
    Returning {
        transport: TransportId,
        storage: PlaceId,
    },
    FleetExpanded {
        added: usize,
        fleet_size: usize,
    },
    Aborted {
        order: OrderId,
        customer: PlaceId,
        discarded: usize,
    },
}

/// Observer notified of every fulfillment event
pub trait SimulationObserver {
    fn on_event(&mut self, time: f64, event: &FulfillmentEvent);
}

/// Writes every event to the `log` facade as a progress line
pub fn log_event(time: f64, event: &FulfillmentEvent) {
    let time = time as i64;
    match event {
        FulfillmentEvent::OrderStarted { order, customer, coal, deadline } => info!(
            "Time: {}, Order: {}, Customer: {}, Coal: {}, Deadline: {}",
            time, order, customer, coal, *deadline as i64
        ),
        FulfillmentEvent::Loaded { transport, storage, coal, departure } => info!(
            "Time: {}, Transport: {}, Storage: {}, Loaded: {}, Departure: {}",
            time, transport, storage, coal, *departure as i64
        ),
        FulfillmentEvent::Maintenance { transport, at, resume_at } => info!(
            "Time: {}, Transport: {}, Maintenance at {}, Resume at: {}",
            time, transport, at, *resume_at as i64
        ),
        FulfillmentEvent::PassThrough { transport, at } => {
            info!("Time: {}, Transport: {}, Passing through {}", time, transport, at)
        }
        FulfillmentEvent::Delivered {
            transport,
            order,
            customer,
            coal,
            unloaded_at,
            reserve,
            opportunistic,
        } => info!(
            concat!(
                "Time: {}, Transport: {}, Customer: {}, Order: {}{}, ",
                "Unloaded: {}, Unloaded at: {}, Reserve: {}"
            ),
            time,
            transport,
            customer,
            order,
            if *opportunistic { " (en route)" } else { "" },
            coal,
            *unloaded_at as i64,
            *reserve as i64
        ),
        FulfillmentEvent::Returning { transport, storage } => info!(
            "Time: {}, Transport: {}, Returning to storage: {}",
            time, transport, storage
        ),
        FulfillmentEvent::FleetExpanded { added, fleet_size } => info!(
            "Time: {}, Fleet expanded by {} to {} transports",
            time, added, fleet_size
        ),
        FulfillmentEvent::Aborted { order, customer, discarded } => info!(
            "Time: {}, Customer {} missed the deadline of order {}, {} orders discarded",
            time, customer, order, discarded
        ),
    }
}

/// Observer that keeps every event; used by tests and reports
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    pub events: Vec<(f64, FulfillmentEvent)>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationObserver for EventRecorder {
    fn on_event(&mut self, time: f64, event: &FulfillmentEvent) {
        self.events.push((time, event.clone()));
    }
}

impl<T: SimulationObserver> SimulationObserver for std::rc::Rc<std::cell::RefCell<T>> {
    fn on_event(&mut self, time: f64, event: &FulfillmentEvent) {
        self.borrow_mut().on_event(time, event);
    }
}
