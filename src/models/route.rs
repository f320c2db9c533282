//! Route and visit types.

use std::fmt;

use serde::Serialize;

use crate::config::InitialLoad;

/// A single committed visit to a customer within a route.
///
/// Tracks the customer ID along with the timing and load the constructing
/// vehicle recorded when it committed the visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    /// Customer ID being visited.
    pub customer_id: usize,
    /// Arrival time at this customer.
    pub arrival_time: f64,
    /// Start of service (`max(arrival, ready)`).
    pub service_start: f64,
    /// Departure time (service start + service duration).
    pub departure_time: f64,
    /// Committed load after this visit.
    pub load_after: i32,
    /// Time-window tolerance in force when the visit was admitted.
    pub tolerance: f64,
}

/// An ordered sequence of customer visits assigned to a single vehicle.
///
/// The depot is implicit at both ends: `visits` holds customers only, and
/// [`Route::node_ids`] adds the leading and trailing node 0. A route with no
/// visits is trivial (depot-only) and is omitted from serialized output.
///
/// The route also records the starting-load policy its vehicle was loaded
/// under, so a replay reproduces the same loads whatever the current
/// configuration says.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::{Route, Visit};
///
/// let mut route = Route::new(1);
/// assert_eq!(route.to_string(), "Route 1: 0");
/// route.push_visit(Visit {
///     customer_id: 2,
///     arrival_time: 10.0,
///     service_start: 10.0,
///     departure_time: 20.0,
///     load_after: 10,
///     tolerance: 0.0,
/// });
/// assert_eq!(route.node_ids(), vec![0, 2, 0]);
/// assert_eq!(route.to_string(), "Route 1: 0 2 0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    vehicle_id: usize,
    initial_load: InitialLoad,
    visits: Vec<Visit>,
    total_distance: f64,
    total_duration: f64,
}

impl Route {
    /// Creates an empty route for the given vehicle, loaded under the
    /// default starting-load policy.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            initial_load: InitialLoad::default(),
            visits: Vec::new(),
            total_distance: 0.0,
            total_duration: 0.0,
        }
    }

    /// Sets the starting-load policy the vehicle left the depot under.
    pub fn with_initial_load(mut self, initial_load: InitialLoad) -> Self {
        self.initial_load = initial_load;
        self
    }

    /// Appends a visit to the end of this route.
    pub fn push_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Returns the vehicle assigned to this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Starting-load policy the route was built under.
    pub fn initial_load(&self) -> InitialLoad {
        self.initial_load
    }

    /// Returns the ordered sequence of visits.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns the number of customer visits (excluding depot).
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if this route has no customer visits.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// A depot-only route.
    pub fn is_trivial(&self) -> bool {
        self.is_empty()
    }

    /// Returns the customer IDs in visit order.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.customer_id).collect()
    }

    /// Full node sequence: `0, customers…, 0`, or just `0` when trivial.
    pub fn node_ids(&self) -> Vec<usize> {
        let mut nodes = Vec::with_capacity(self.visits.len() + 2);
        nodes.push(0);
        if !self.is_trivial() {
            nodes.extend(self.visits.iter().map(|v| v.customer_id));
            nodes.push(0);
        }
        nodes
    }

    /// Load recorded after the last visit, if any.
    pub fn final_load(&self) -> Option<i32> {
        self.visits.last().map(|v| v.load_after)
    }

    /// Total distance of this route (set by the validator replay).
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Time of return to the depot (set by the validator replay).
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub(crate) fn set_totals(&mut self, distance: f64, duration: f64) {
        self.total_distance = distance;
        self.total_duration = duration;
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route {}:", self.vehicle_id)?;
        for node in self.node_ids() {
            write!(f, " {node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(customer_id: usize, load_after: i32) -> Visit {
        Visit {
            customer_id,
            arrival_time: 0.0,
            service_start: 0.0,
            departure_time: 0.0,
            load_after,
            tolerance: 0.0,
        }
    }

    #[test]
    fn test_route_empty() {
        let r = Route::new(4);
        assert!(r.is_trivial());
        assert_eq!(r.len(), 0);
        assert_eq!(r.node_ids(), vec![0]);
        assert_eq!(r.final_load(), None);
    }

    #[test]
    fn test_route_push_visit() {
        let mut r = Route::new(1);
        r.push_visit(visit(5, 20));
        r.push_visit(visit(3, 35));
        assert_eq!(r.len(), 2);
        assert_eq!(r.customer_ids(), vec![5, 3]);
        assert_eq!(r.node_ids(), vec![0, 5, 3, 0]);
        assert_eq!(r.final_load(), Some(35));
    }

    #[test]
    fn test_route_display() {
        let mut r = Route::new(1);
        r.push_visit(visit(2, 0));
        r.push_visit(visit(1, 0));
        assert_eq!(r.to_string(), "Route 1: 0 2 1 0");
    }
}
