//! Feasibility predicate shared by construction and validation.
//!
//! # Time rule
//!
//! `arrival = time + travel_time(location, customer)`,
//! `service_start = max(arrival, ready)`. The customer is rejected when
//! `service_start > due * (1 + tolerance)`; strict passes use zero
//! tolerance.
//!
//! # Payload rules
//!
//! | Variant | Rule |
//! |---|---|
//! | VRPTW (preloaded) | `load >= delivery`, then `load -= delivery` |
//! | PDPTW pickup | `load + pickup <= capacity` |
//! | PDPTW delivery | `load >= delivery` |
//! | VRPSPDTW | deliver first, draw any shortfall from the depot if `load + shortfall <= capacity`, then `max(load - delivery, 0) + pickup <= capacity` |
//!
//! A VRPTW vehicle that leaves empty uses the VRPSPDTW rule with zero
//! pickup.

use std::fmt;

use crate::config::InitialLoad;
use crate::distance::TravelProvider;
use crate::error::Result;
use crate::models::{Customer, NodeKind, TimeWindow, Variant, VehicleState};

/// Timing and load a vehicle would have after serving a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Travel time from the vehicle's location.
    pub travel_time: f64,
    /// Arrival at the customer.
    pub arrival: f64,
    /// Idle time before the window opens.
    pub waiting: f64,
    /// `max(arrival, ready)`.
    pub service_start: f64,
    /// Service start plus service duration.
    pub departure: f64,
    /// Committed load after service.
    pub load_after: i32,
}

/// Why a (vehicle, customer) pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// The candidate is the depot.
    Depot,
    /// Service would start after the (possibly widened) window end.
    TimeWindow {
        /// Earliest possible service start.
        service_start: f64,
        /// Latest admissible start under the active tolerance.
        latest: f64,
    },
    /// Not enough goods on board for the delivery.
    InsufficientLoad {
        /// Load on board.
        load: i32,
        /// Delivery quantity.
        required: i32,
    },
    /// Load after service would exceed capacity.
    CapacityExceeded {
        /// Resulting load.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Delivery shortfall cannot be carried from the depot.
    DepotShortfall {
        /// Missing quantity.
        shortfall: i32,
        /// Free capacity available to carry it.
        headroom: i32,
    },
}

impl Rejection {
    /// Stable numeric reason code for diagnostics.
    pub fn code(&self) -> u8 {
        match self {
            Rejection::Depot => 1,
            Rejection::TimeWindow { .. } => 2,
            Rejection::InsufficientLoad { .. } => 3,
            Rejection::CapacityExceeded { .. } => 4,
            Rejection::DepotShortfall { .. } => 5,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Depot => write!(f, "the depot is not a customer"),
            Rejection::TimeWindow {
                service_start,
                latest,
            } => write!(f, "service start {service_start:.2} is after {latest:.2}"),
            Rejection::InsufficientLoad { load, required } => {
                write!(f, "load {load} cannot cover delivery {required}")
            }
            Rejection::CapacityExceeded { load, capacity } => {
                write!(f, "load {load} exceeds capacity {capacity}")
            }
            Rejection::DepotShortfall {
                shortfall,
                headroom,
            } => write!(f, "shortfall {shortfall} exceeds headroom {headroom}"),
        }
    }
}

/// Outcome of [`can_serve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// The pair is admissible; the probe describes the resulting state.
    Feasible(Probe),
    /// The pair is inadmissible.
    Infeasible(Rejection),
}

impl Admission {
    /// Returns `true` for [`Admission::Feasible`].
    pub fn is_feasible(&self) -> bool {
        matches!(self, Admission::Feasible(_))
    }

    /// The probe of a feasible admission.
    pub fn probe(&self) -> Option<&Probe> {
        match self {
            Admission::Feasible(p) => Some(p),
            Admission::Infeasible(_) => None,
        }
    }

    /// The reason of an infeasible admission.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Admission::Feasible(_) => None,
            Admission::Infeasible(r) => Some(r),
        }
    }
}

/// Decides whether `state` can serve `customer` next.
///
/// Pure: neither the state nor the customer is modified. Fails only when
/// the travel provider has no data for the edge.
///
/// # Examples
///
/// ```
/// use u_spdtw::config::InitialLoad;
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::evaluation::can_serve;
/// use u_spdtw::models::{Customer, Demand, TimeWindow, Variant, Vehicle, VehicleState};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 10.0, 0.0, Demand::new(30, 40).unwrap(), tw, 0.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let state = VehicleState::start(&Vehicle::new(1, 100).unwrap(), Variant::Vrpspdtw, InitialLoad::Full);
///
/// let admission = can_serve(&state, &customers[1], Variant::Vrpspdtw, &dm, 0.0).unwrap();
/// assert_eq!(admission.probe().unwrap().load_after, 40);
/// ```
pub fn can_serve(
    state: &VehicleState,
    customer: &Customer,
    variant: Variant,
    travel: &dyn TravelProvider,
    tolerance: f64,
) -> Result<Admission> {
    if customer.is_depot() {
        return Ok(Admission::Infeasible(Rejection::Depot));
    }

    let travel_time = travel.travel_time(state.location(), customer.id())?;
    let arrival = state.time() + travel_time;
    let tw = customer.time_window();
    let service_start = match check_time(tw, arrival, tolerance) {
        Ok(start) => start,
        Err(rejection) => return Ok(Admission::Infeasible(rejection)),
    };

    let load_after = match next_load(
        variant,
        state.initial_load(),
        state.load(),
        state.capacity(),
        customer,
    ) {
        Ok(load) => load,
        Err(rejection) => return Ok(Admission::Infeasible(rejection)),
    };

    Ok(Admission::Feasible(Probe {
        travel_time,
        arrival,
        waiting: tw.waiting_time(arrival),
        service_start,
        departure: service_start + customer.service_duration(),
        load_after,
    }))
}

/// Service start for an arrival, or the time-window rejection.
pub(crate) fn check_time(
    tw: &TimeWindow,
    arrival: f64,
    tolerance: f64,
) -> std::result::Result<f64, Rejection> {
    let service_start = tw.service_start(arrival);
    let latest = tw.latest_start(tolerance);
    if service_start > latest {
        return Err(Rejection::TimeWindow {
            service_start,
            latest,
        });
    }
    Ok(service_start)
}

/// Load after serving `customer`, per the variant's payload rule.
pub(crate) fn next_load(
    variant: Variant,
    initial_load: InitialLoad,
    load: i32,
    capacity: i32,
    customer: &Customer,
) -> std::result::Result<i32, Rejection> {
    let demand = customer.demand();
    match variant {
        Variant::Vrptw if initial_load == InitialLoad::Full => {
            deliver(load, demand.delivery_qty())
        }
        Variant::Vrptw => simultaneous(load, capacity, demand.delivery_qty(), 0),
        Variant::Pdptw => match customer.kind() {
            NodeKind::Pickup => load_up(load, demand.pickup_qty(), capacity),
            NodeKind::Delivery => deliver(load, demand.delivery_qty()),
            NodeKind::Transit => Ok(load),
        },
        Variant::Vrpspdtw => simultaneous(
            load,
            capacity,
            demand.delivery_qty(),
            demand.pickup_qty(),
        ),
    }
}

fn deliver(load: i32, delivery: i32) -> std::result::Result<i32, Rejection> {
    if load < delivery {
        return Err(Rejection::InsufficientLoad {
            load,
            required: delivery,
        });
    }
    Ok(load - delivery)
}

fn simultaneous(
    load: i32,
    capacity: i32,
    delivery: i32,
    pickup: i32,
) -> std::result::Result<i32, Rejection> {
    let after_delivery = if load >= delivery {
        load - delivery
    } else {
        let shortfall = delivery - load;
        let headroom = capacity - load;
        if shortfall > headroom {
            return Err(Rejection::DepotShortfall {
                shortfall,
                headroom,
            });
        }
        0
    };
    load_up(after_delivery, pickup, capacity)
}

/// Adds `pickup` to `load`; a sum past `capacity` or past `i32::MAX` is
/// rejected.
fn load_up(load: i32, pickup: i32, capacity: i32) -> std::result::Result<i32, Rejection> {
    match load.checked_add(pickup) {
        Some(after) if after <= capacity => Ok(after),
        after => Err(Rejection::CapacityExceeded {
            load: after.unwrap_or(i32::MAX),
            capacity,
        }),
    }
}
