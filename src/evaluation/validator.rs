//! Post-hoc route validator.
//!
//! Replays a finished route from the depot, recomputing time and load from
//! the instance data alone, and reports the first node where a constraint
//! breaks or where the replay disagrees with what the constructing vehicle
//! recorded.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::models::{Instance, Route, Solution, Visit};

use super::feasibility::{check_time, next_load, Rejection};

/// Replayed values may differ from recorded ones by this much.
const DRIFT_EPS: f64 = 1e-6;

/// What went wrong at a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViolationKind {
    /// The route's vehicle is not part of the fleet.
    UnknownVehicle,
    /// The node id does not exist in the instance.
    UnknownNode,
    /// The depot appears between the first and last node.
    DepotInside,
    /// The customer was already visited, by this or another vehicle.
    AssignedTwice {
        /// Vehicle that visited it first.
        first_vehicle: usize,
    },
    /// Service starts after the admissible window end.
    TimeWindow {
        /// Replayed service start.
        service_start: f64,
        /// Latest admissible start.
        latest: f64,
    },
    /// Delivery exceeds the load on board.
    InsufficientLoad {
        /// Replayed load before the node.
        load: i32,
        /// Delivery quantity.
        required: i32,
    },
    /// Load leaves `[0, capacity]`.
    CapacityExceeded {
        /// Replayed load.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Delivery shortfall could not have been carried from the depot.
    DepotShortfall {
        /// Missing quantity.
        shortfall: i32,
        /// Free capacity.
        headroom: i32,
    },
    /// The recorded visit disagrees with the replay.
    StateDrift {
        /// Load the vehicle recorded.
        recorded_load: i32,
        /// Load the replay computed.
        replayed_load: i32,
        /// Service start the vehicle recorded.
        recorded_start: f64,
        /// Service start the replay computed.
        replayed_start: f64,
    },
}

impl From<Rejection> for ViolationKind {
    fn from(r: Rejection) -> Self {
        match r {
            // unreachable for replayed visits, which are checked for node 0 first
            Rejection::Depot => ViolationKind::DepotInside,
            Rejection::TimeWindow {
                service_start,
                latest,
            } => ViolationKind::TimeWindow {
                service_start,
                latest,
            },
            Rejection::InsufficientLoad { load, required } => {
                ViolationKind::InsufficientLoad { load, required }
            }
            Rejection::CapacityExceeded { load, capacity } => {
                ViolationKind::CapacityExceeded { load, capacity }
            }
            Rejection::DepotShortfall {
                shortfall,
                headroom,
            } => ViolationKind::DepotShortfall {
                shortfall,
                headroom,
            },
        }
    }
}

/// A constraint breach found in an already-built route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    /// Vehicle whose route failed.
    pub vehicle_id: usize,
    /// Offending node id.
    pub node_id: usize,
    /// Position of the node in `0 … 0` (the leading depot is position 0).
    pub position: usize,
    /// The breach.
    pub kind: ViolationKind,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vehicle {} fails at node {} (position {}): {:?}",
            self.vehicle_id, self.node_id, self.position, self.kind
        )
    }
}

/// Replay result of one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCheck {
    /// Vehicle of the route.
    pub vehicle_id: usize,
    /// Travelled distance up to the failure, or of the full route.
    pub distance: f64,
    /// Clock on return to the depot (or at the failure).
    pub duration: f64,
    /// Highest load seen.
    pub max_load: i32,
    /// First violation, if any.
    pub failure: Option<ValidationFailure>,
}

impl RouteCheck {
    /// Returns `true` if the replay found no violation.
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// Replay results for a whole solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionCheck {
    /// One entry per route, in solution order.
    pub routes: Vec<RouteCheck>,
    /// Every failure found, including cross-route duplicates.
    pub failures: Vec<ValidationFailure>,
}

impl SolutionCheck {
    /// Returns `true` if no route failed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replays routes against an instance.
///
/// The validator trusts nothing a route records except its node order and
/// the tolerance each visit claims to have been admitted under; the
/// effective tolerance is the smaller of that claim and the validator's
/// own limit.
///
/// # Examples
///
/// ```
/// use u_spdtw::config::SolverConfig;
/// use u_spdtw::constructive::construct;
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::evaluation::RouteValidator;
/// use u_spdtw::models::{Customer, Demand, Instance, TimeWindow, Variant, Vehicle};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 3.0, 4.0, Demand::delivery(10).unwrap(), tw, 5.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(1, 50).unwrap()];
/// let instance = Instance::new("demo", Variant::Vrptw, customers, vehicles, dm).unwrap();
/// let config = SolverConfig::default();
///
/// let construction = construct(&instance, &config).unwrap();
/// let validator = RouteValidator::new(&instance, &config);
/// let check = validator.check_route(&construction.solution.routes()[0]).unwrap();
/// assert!(check.is_valid());
/// assert!((check.distance - 10.0).abs() < 1e-10);
/// ```
pub struct RouteValidator<'a> {
    instance: &'a Instance,
    tolerance: f64,
}

impl<'a> RouteValidator<'a> {
    /// Creates a validator accepting up to the configuration's largest
    /// relaxation tolerance.
    pub fn new(instance: &'a Instance, config: &SolverConfig) -> Self {
        Self {
            instance,
            tolerance: config.relaxation.max_tolerance(),
        }
    }

    /// Overrides the largest accepted tolerance (zero = strict windows).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replays one route from the starting load recorded on it. Fails only
    /// when travel data is missing.
    pub fn check_route(&self, route: &Route) -> Result<RouteCheck> {
        let vehicle_id = route.vehicle_id();
        let mut check = RouteCheck {
            vehicle_id,
            distance: 0.0,
            duration: 0.0,
            max_load: 0,
            failure: None,
        };
        let fail = |node_id, position, kind| {
            Some(ValidationFailure {
                vehicle_id,
                node_id,
                position,
                kind,
            })
        };

        let Some(vehicle) = self.instance.vehicle(vehicle_id) else {
            check.failure = fail(0, 0, ViolationKind::UnknownVehicle);
            return Ok(check);
        };
        let capacity = vehicle.capacity();
        let variant = self.instance.variant();
        let travel = self.instance.travel();
        let initial_load = route.initial_load();

        let mut load = initial_load.load_for(variant, capacity);
        let mut time = 0.0;
        let mut prev = 0;
        let mut seen: HashMap<usize, usize> = HashMap::new();
        check.max_load = load;

        for (i, visit) in route.visits().iter().enumerate() {
            let position = i + 1;
            let node_id = visit.customer_id;
            if node_id == 0 {
                check.failure = fail(node_id, position, ViolationKind::DepotInside);
                return Ok(check);
            }
            let Some(customer) = self.instance.customer(node_id) else {
                check.failure = fail(node_id, position, ViolationKind::UnknownNode);
                return Ok(check);
            };
            if seen.insert(node_id, position).is_some() {
                check.failure = fail(
                    node_id,
                    position,
                    ViolationKind::AssignedTwice {
                        first_vehicle: vehicle_id,
                    },
                );
                return Ok(check);
            }

            check.distance += travel.distance(prev, node_id)?;
            let arrival = time + travel.travel_time(prev, node_id)?;
            let tolerance = visit.tolerance.min(self.tolerance).max(0.0);
            let service_start = match check_time(customer.time_window(), arrival, tolerance) {
                Ok(start) => start,
                Err(r) => {
                    check.failure = fail(node_id, position, r.into());
                    return Ok(check);
                }
            };
            let next = match next_load(variant, initial_load, load, capacity, customer) {
                Ok(next) => next,
                Err(r) => {
                    check.failure = fail(node_id, position, r.into());
                    return Ok(check);
                }
            };
            if !(0..=capacity).contains(&next) {
                check.failure = fail(
                    node_id,
                    position,
                    ViolationKind::CapacityExceeded {
                        load: next,
                        capacity,
                    },
                );
                return Ok(check);
            }
            if let Some(kind) = drift(visit, next, service_start) {
                check.failure = fail(node_id, position, kind);
                return Ok(check);
            }

            load = next;
            check.max_load = check.max_load.max(load);
            time = service_start + customer.service_duration();
            prev = node_id;
        }

        if !route.is_trivial() {
            check.distance += travel.distance(prev, 0)?;
            time += travel.travel_time(prev, 0)?;
        }
        check.duration = time;
        Ok(check)
    }

    /// Replays every route and checks that no customer is on two routes,
    /// including two routes that carry the same vehicle id.
    ///
    /// A failing route does not stop the others from being checked.
    pub fn validate_solution(&self, solution: &Solution) -> Result<SolutionCheck> {
        let mut routes = Vec::with_capacity(solution.num_routes());
        let mut failures = Vec::new();
        // customer id -> (route index, vehicle id) of its first visit
        let mut owner: HashMap<usize, (usize, usize)> = HashMap::new();

        for (index, route) in solution.routes().iter().enumerate() {
            let check = self.check_route(route)?;
            if let Some(f) = &check.failure {
                failures.push(f.clone());
            }
            for (i, visit) in route.visits().iter().enumerate() {
                let id = visit.customer_id;
                match owner.get(&id) {
                    // repeats inside one route are reported by check_route
                    Some(&(first_route, first_vehicle)) if first_route != index => {
                        failures.push(ValidationFailure {
                            vehicle_id: route.vehicle_id(),
                            node_id: id,
                            position: i + 1,
                            kind: ViolationKind::AssignedTwice { first_vehicle },
                        });
                    }
                    Some(_) => {}
                    None => {
                        owner.insert(id, (index, route.vehicle_id()));
                    }
                }
            }
            routes.push(check);
        }

        Ok(SolutionCheck { routes, failures })
    }
}

fn drift(visit: &Visit, replayed_load: i32, replayed_start: f64) -> Option<ViolationKind> {
    let start_differs = (visit.service_start - replayed_start).abs() > DRIFT_EPS;
    if visit.load_after != replayed_load || start_differs {
        return Some(ViolationKind::StateDrift {
            recorded_load: visit.load_after,
            replayed_load,
            recorded_start: visit.service_start,
            replayed_start,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialLoad;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Demand, TimeWindow, Variant, Vehicle};

    fn customer(id: usize, x: f64, delivery: i32, pickup: i32, due: f64) -> Customer {
        Customer::new(
            id,
            x,
            0.0,
            Demand::new(delivery, pickup).expect("valid"),
            TimeWindow::new(0.0, due).expect("valid"),
            0.0,
        )
        .expect("valid")
    }

    fn instance(variant: Variant, customers: Vec<Customer>, capacity: i32) -> Instance {
        let dm = DistanceMatrix::from_customers(&customers);
        let vehicles = vec![
            Vehicle::new(1, capacity).expect("valid"),
            Vehicle::new(2, capacity).expect("valid"),
        ];
        Instance::new("t", variant, customers, vehicles, dm).expect("valid")
    }

    fn visit(customer_id: usize, at: f64, load_after: i32) -> Visit {
        Visit {
            customer_id,
            arrival_time: at,
            service_start: at,
            departure_time: at,
            load_after,
            tolerance: 0.0,
        }
    }

    fn pickups() -> Instance {
        instance(
            Variant::Vrpspdtw,
            vec![
                Customer::depot(0.0, 0.0, 1000.0).expect("valid"),
                customer(1, 1.0, 0, 40, 100.0),
                customer(2, 2.0, 0, 40, 100.0),
                customer(3, 3.0, 0, 40, 100.0),
            ],
            100,
        )
    }

    #[test]
    fn test_catches_capacity_drift_at_node_3() {
        let inst = pickups();
        // The vehicle claims loads that stay under capacity; the replay
        // reaches 120 at node 3.
        let mut route = Route::new(1);
        route.push_visit(visit(1, 1.0, 10));
        route.push_visit(visit(2, 2.0, 20));
        route.push_visit(visit(3, 3.0, 30));

        let validator = RouteValidator::new(&inst, &SolverConfig::default());
        let check = validator.check_route(&route).expect("known edges");
        let failure = check.failure.expect("must fail");
        // node 1 already disagrees on load, so drift is reported first
        assert_eq!(failure.node_id, 1);
        assert!(matches!(failure.kind, ViolationKind::StateDrift { .. }));

        let mut honest = Route::new(1);
        honest.push_visit(visit(1, 1.0, 40));
        honest.push_visit(visit(2, 2.0, 80));
        honest.push_visit(visit(3, 3.0, 90));
        let failure = validator
            .check_route(&honest)
            .expect("known edges")
            .failure
            .expect("must fail");
        assert_eq!(failure.node_id, 3);
        assert_eq!(failure.position, 3);
        assert_eq!(
            failure.kind,
            ViolationKind::CapacityExceeded {
                load: 120,
                capacity: 100
            }
        );
    }

    #[test]
    fn test_valid_route_totals() {
        let inst = pickups();
        let mut route = Route::new(1);
        route.push_visit(visit(1, 1.0, 40));
        route.push_visit(visit(2, 2.0, 80));
        let validator = RouteValidator::new(&inst, &SolverConfig::default());
        let check = validator.check_route(&route).expect("known edges");
        assert!(check.is_valid());
        assert!((check.distance - 4.0).abs() < 1e-10);
        assert!((check.duration - 4.0).abs() < 1e-10);
        assert_eq!(check.max_load, 80);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let inst = pickups();
        let mut route = Route::new(1);
        route.push_visit(visit(2, 2.0, 40));
        route.push_visit(visit(1, 3.0, 80));
        let validator = RouteValidator::new(&inst, &SolverConfig::default());
        let first = validator.check_route(&route).expect("known edges");
        let second = validator.check_route(&route).expect("known edges");
        assert_eq!(first, second);
    }

    #[test]
    fn test_time_window_breach() {
        let inst = instance(
            Variant::Vrptw,
            vec![
                Customer::depot(0.0, 0.0, 1000.0).expect("valid"),
                customer(1, 50.0, 10, 0, 40.0),
            ],
            100,
        );
        let mut route = Route::new(1);
        route.push_visit(Visit {
            tolerance: 0.5,
            ..visit(1, 50.0, 90)
        });

        let strict = RouteValidator::new(&inst, &SolverConfig::default()).with_tolerance(0.0);
        let failure = strict
            .check_route(&route)
            .expect("known edges")
            .failure
            .expect("late");
        assert!(matches!(failure.kind, ViolationKind::TimeWindow { .. }));

        // 50 <= 40 * 1.5 once the validator allows the claimed tolerance
        let relaxed = RouteValidator::new(&inst, &SolverConfig::default()).with_tolerance(0.5);
        assert!(relaxed.check_route(&route).expect("known edges").is_valid());
    }

    #[test]
    fn test_shape_violations() {
        let inst = pickups();
        let validator = RouteValidator::new(&inst, &SolverConfig::default());

        let mut inner_depot = Route::new(1);
        inner_depot.push_visit(visit(1, 1.0, 40));
        inner_depot.push_visit(visit(0, 2.0, 40));
        let f = validator.check_route(&inner_depot).expect("ok").failure;
        assert_eq!(f.map(|f| f.kind), Some(ViolationKind::DepotInside));

        let mut unknown = Route::new(1);
        unknown.push_visit(visit(9, 1.0, 0));
        let f = validator.check_route(&unknown).expect("ok").failure;
        assert_eq!(f.map(|f| f.kind), Some(ViolationKind::UnknownNode));

        let f = validator.check_route(&Route::new(7)).expect("ok").failure;
        assert_eq!(f.map(|f| f.kind), Some(ViolationKind::UnknownVehicle));
    }

    #[test]
    fn test_cross_route_exclusivity() {
        let inst = pickups();
        let mut a = Route::new(1);
        a.push_visit(visit(1, 1.0, 40));
        let mut b = Route::new(2);
        b.push_visit(visit(1, 1.0, 40));
        let mut sol = Solution::new(3);
        sol.add_route(a);
        sol.add_route(b);

        let validator = RouteValidator::new(&inst, &SolverConfig::default());
        let check = validator.validate_solution(&sol).expect("known edges");
        assert!(check.routes.iter().all(RouteCheck::is_valid));
        assert_eq!(check.failures.len(), 1);
        assert_eq!(
            check.failures[0].kind,
            ViolationKind::AssignedTwice { first_vehicle: 1 }
        );
        assert_eq!(check.failures[0].vehicle_id, 2);
    }

    #[test]
    fn test_same_vehicle_id_on_two_routes() {
        let inst = pickups();
        let mut a = Route::new(1);
        a.push_visit(visit(1, 1.0, 40));
        let mut b = Route::new(1);
        b.push_visit(visit(2, 2.0, 40));
        b.push_visit(visit(1, 3.0, 80));
        let mut sol = Solution::new(3);
        sol.add_route(a);
        sol.add_route(b);

        let validator = RouteValidator::new(&inst, &SolverConfig::default());
        let check = validator.validate_solution(&sol).expect("known edges");
        assert_eq!(check.failures.len(), 1);
        let failure = &check.failures[0];
        assert_eq!(failure.node_id, 1);
        assert_eq!(failure.position, 2);
        assert_eq!(failure.kind, ViolationKind::AssignedTwice { first_vehicle: 1 });
    }

    #[test]
    fn test_replays_from_the_route_starting_load() {
        let inst = instance(
            Variant::Vrptw,
            vec![
                Customer::depot(0.0, 0.0, 1000.0).expect("valid"),
                customer(1, 1.0, 30, 0, 100.0),
            ],
            100,
        );
        // empty start: the 30 are drawn from the depot and delivered
        let mut empty = Route::new(1).with_initial_load(InitialLoad::Empty);
        empty.push_visit(visit(1, 1.0, 0));
        // full start: 100 on board, 70 left
        let mut full = Route::new(2);
        full.push_visit(visit(1, 1.0, 70));

        let mut config = SolverConfig::default();
        for policy in [InitialLoad::Full, InitialLoad::Empty] {
            config.vrptw_initial_load = policy;
            let validator = RouteValidator::new(&inst, &config);
            assert!(validator.check_route(&empty).expect("known edges").is_valid());
            assert!(validator.check_route(&full).expect("known edges").is_valid());
        }
    }
}
