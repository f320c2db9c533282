//! Mutable construction state of one fleet slot.

use crate::config::InitialLoad;
use crate::models::{Route, Variant, Vehicle, Visit};

/// The state a vehicle carries while its route is being built.
///
/// `load` is the committed payload; remaining capacity is always
/// `capacity - load` and both stay within `[0, capacity]`. The clock never
/// moves backwards. Only [`assign`](crate::evaluation::assign) mutates a
/// state, and [`VehicleState::finish`] turns it into a [`Route`].
///
/// # Examples
///
/// ```
/// use u_spdtw::config::InitialLoad;
/// use u_spdtw::models::{Variant, Vehicle, VehicleState};
///
/// let v = Vehicle::new(1, 200).unwrap();
/// let full = VehicleState::start(&v, Variant::Vrptw, InitialLoad::Full);
/// assert_eq!(full.load(), 200);
/// assert_eq!(full.remaining(), 0);
///
/// let empty = VehicleState::start(&v, Variant::Vrpspdtw, InitialLoad::Full);
/// assert_eq!(empty.remaining(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct VehicleState {
    vehicle_id: usize,
    capacity: i32,
    initial_load: InitialLoad,
    start_load: i32,
    load: i32,
    time: f64,
    location: usize,
    route: Route,
}

impl VehicleState {
    /// Places a vehicle at the depot at time zero with the variant's
    /// starting load.
    pub fn start(vehicle: &Vehicle, variant: Variant, initial_load: InitialLoad) -> Self {
        let start_load = initial_load.load_for(variant, vehicle.capacity());
        Self {
            vehicle_id: vehicle.id(),
            capacity: vehicle.capacity(),
            initial_load,
            start_load,
            load: start_load,
            time: 0.0,
            location: 0,
            route: Route::new(vehicle.id()).with_initial_load(initial_load),
        }
    }

    /// Vehicle ID.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Starting-load policy this state was opened with.
    pub fn initial_load(&self) -> InitialLoad {
        self.initial_load
    }

    /// Payload on board when the vehicle left the depot.
    pub fn start_load(&self) -> i32 {
        self.start_load
    }

    /// Committed payload.
    pub fn load(&self) -> i32 {
        self.load
    }

    /// Free capacity, `capacity - load`.
    pub fn remaining(&self) -> i32 {
        self.capacity - self.load
    }

    /// Current simulated clock.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Node the vehicle currently stands at.
    pub fn location(&self) -> usize {
        self.location
    }

    /// Visits committed so far.
    pub fn visits(&self) -> &[Visit] {
        self.route.visits()
    }

    /// Returns `true` while no customer has been committed.
    pub fn is_idle(&self) -> bool {
        self.route.is_empty()
    }

    /// Share of capacity this route has put to work: goods delivered by a
    /// preloaded vehicle, goods on board otherwise.
    pub fn utilization(&self) -> f64 {
        f64::from((self.load - self.start_load).abs()) / f64::from(self.capacity)
    }

    pub(crate) fn commit(&mut self, visit: Visit) {
        self.time = visit.departure_time;
        self.load = visit.load_after;
        self.location = visit.customer_id;
        self.route.push_visit(visit);
    }

    /// Closes the route. Non-trivial routes implicitly return to the depot.
    pub fn finish(self) -> Route {
        self.route
    }
}
