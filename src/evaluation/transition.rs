//! State transition that commits a customer to a vehicle.

use tracing::trace;

use crate::distance::TravelProvider;
use crate::error::{Result, RoutingError};
use crate::models::{AssignedSet, Customer, Variant, VehicleState, Visit};

use super::{can_serve, Admission};

/// Commits `customer` as the next visit of `state`.
///
/// The clock advances by the travel time, waits for the window to open,
/// then adds the service duration; the load changes exactly as
/// [`can_serve`] simulated it. The customer id is recorded in `assigned`.
///
/// Feasibility is re-checked first. Offering a pair the predicate rejects,
/// or a customer that is already assigned, is a construction defect and
/// fails with [`RoutingError::InfeasibleAssignment`]; the state is left
/// untouched in that case.
///
/// # Examples
///
/// ```
/// use u_spdtw::config::InitialLoad;
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::evaluation::assign;
/// use u_spdtw::models::{AssignedSet, Customer, Demand, TimeWindow, Variant, Vehicle, VehicleState};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 10.0, 0.0, Demand::new(30, 40).unwrap(), tw, 5.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicle = Vehicle::new(1, 100).unwrap();
/// let mut state = VehicleState::start(&vehicle, Variant::Vrpspdtw, InitialLoad::Full);
/// let mut assigned = AssignedSet::new(1);
///
/// assign(&mut state, &customers[1], Variant::Vrpspdtw, &dm, 0.0, &mut assigned).unwrap();
/// assert_eq!(state.remaining(), 60);
/// assert_eq!(state.time(), 15.0);
/// assert!(assigned.contains(1));
/// ```
pub fn assign(
    state: &mut VehicleState,
    customer: &Customer,
    variant: Variant,
    travel: &dyn TravelProvider,
    tolerance: f64,
    assigned: &mut AssignedSet,
) -> Result<Visit> {
    if assigned.contains(customer.id()) {
        return Err(RoutingError::InfeasibleAssignment {
            vehicle_id: state.vehicle_id(),
            customer_id: customer.id(),
            reason: "customer is already assigned".into(),
        });
    }

    let probe = match can_serve(state, customer, variant, travel, tolerance)? {
        Admission::Feasible(probe) => probe,
        Admission::Infeasible(rejection) => {
            return Err(RoutingError::InfeasibleAssignment {
                vehicle_id: state.vehicle_id(),
                customer_id: customer.id(),
                reason: rejection.to_string(),
            });
        }
    };

    let visit = Visit {
        customer_id: customer.id(),
        arrival_time: probe.arrival,
        service_start: probe.service_start,
        departure_time: probe.departure,
        load_after: probe.load_after,
        tolerance,
    };
    trace!(
        vehicle = state.vehicle_id(),
        customer = customer.id(),
        arrival = probe.arrival,
        load = probe.load_after,
        "assigned"
    );
    state.commit(visit.clone());
    assigned.insert(customer.id());
    Ok(visit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitialLoad;
    use crate::distance::DistanceMatrix;
    use crate::models::{Demand, TimeWindow, Vehicle};

    fn customer(id: usize, x: f64, delivery: i32, pickup: i32, ready: f64, due: f64) -> Customer {
        Customer::new(
            id,
            x,
            0.0,
            Demand::new(delivery, pickup).expect("valid"),
            TimeWindow::new(ready, due).expect("valid"),
            10.0,
        )
        .expect("valid")
    }

    fn setup() -> (Vec<Customer>, DistanceMatrix) {
        let cs = vec![
            Customer::depot(0.0, 0.0, 1000.0).expect("valid"),
            customer(1, 5.0, 20, 0, 30.0, 100.0),
            customer(2, 8.0, 50, 0, 0.0, 100.0),
            customer(3, 500.0, 10, 0, 0.0, 100.0),
        ];
        let dm = DistanceMatrix::from_customers(&cs);
        (cs, dm)
    }

    #[test]
    fn test_assign_waits_and_serves() {
        let (cs, dm) = setup();
        let v = Vehicle::new(1, 100).expect("valid");
        let mut s = VehicleState::start(&v, Variant::Vrptw, InitialLoad::Full);
        let mut assigned = AssignedSet::new(3);

        let visit = assign(&mut s, &cs[1], Variant::Vrptw, &dm, 0.0, &mut assigned)
            .expect("feasible");
        // arrive at 5, wait until 30, serve 10
        assert!((visit.arrival_time - 5.0).abs() < 1e-10);
        assert!((visit.service_start - 30.0).abs() < 1e-10);
        assert!((s.time() - 40.0).abs() < 1e-10);
        assert_eq!(s.load(), 80);
        assert_eq!(s.remaining(), 20);
        assert_eq!(s.location(), 1);

        assign(&mut s, &cs[2], Variant::Vrptw, &dm, 0.0, &mut assigned).expect("feasible");
        assert_eq!(s.load(), 30);
        assert!((s.time() - 53.0).abs() < 1e-10);
        assert_eq!(assigned.len(), 2);
    }

    #[test]
    fn test_assign_rejected_pair_is_an_error() {
        let (cs, dm) = setup();
        let v = Vehicle::new(1, 100).expect("valid");
        let mut s = VehicleState::start(&v, Variant::Vrptw, InitialLoad::Full);
        let mut assigned = AssignedSet::new(3);

        let err = assign(&mut s, &cs[3], Variant::Vrptw, &dm, 0.0, &mut assigned)
            .expect_err("too far");
        assert!(err.is_fatal());
        assert!(s.is_idle());
        assert!(assigned.is_empty());
        assert_eq!(s.time(), 0.0);
    }

    #[test]
    fn test_assign_twice_is_an_error() {
        let (cs, dm) = setup();
        let v1 = Vehicle::new(1, 100).expect("valid");
        let v2 = Vehicle::new(2, 100).expect("valid");
        let mut s1 = VehicleState::start(&v1, Variant::Vrptw, InitialLoad::Full);
        let mut s2 = VehicleState::start(&v2, Variant::Vrptw, InitialLoad::Full);
        let mut assigned = AssignedSet::new(3);

        assign(&mut s1, &cs[2], Variant::Vrptw, &dm, 0.0, &mut assigned).expect("feasible");
        let err = assign(&mut s2, &cs[2], Variant::Vrptw, &dm, 0.0, &mut assigned);
        assert!(matches!(
            err,
            Err(RoutingError::InfeasibleAssignment { customer_id: 2, .. })
        ));
    }
}
