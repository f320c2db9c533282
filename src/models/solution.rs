//! Solution and coverage types.

use std::fmt;

use serde::Serialize;

use super::Route;

/// Share of routable customers that received a route.
///
/// Partial coverage is an expected outcome of the greedy construction and
/// is reported through this metric rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coverage {
    /// Customers placed on some route.
    pub assigned: usize,
    /// Customers that needed a route (depot excluded).
    pub total: usize,
}

impl Coverage {
    /// Returns `true` if every customer was routed.
    pub fn is_complete(&self) -> bool {
        self.assigned == self.total
    }

    /// Assigned fraction in `[0, 1]`; an empty instance counts as fully
    /// covered.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.assigned as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.1}%)",
            self.assigned,
            self.total,
            self.ratio() * 100.0
        )
    }
}

/// A complete solution: one route per vehicle plus the customers no
/// vehicle could take.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::{Route, Solution};
///
/// let mut sol = Solution::new(3);
/// sol.add_route(Route::new(1));
/// sol.add_unassigned(2);
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.num_used_routes(), 0);
/// assert_eq!(sol.coverage().assigned, 0);
/// assert_eq!(sol.to_string(), "");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    routes: Vec<Route>,
    unassigned: Vec<usize>,
    total_customers: usize,
}

impl Solution {
    /// Creates an empty solution for an instance with `total_customers`
    /// routable customers.
    pub fn new(total_customers: usize) -> Self {
        Self {
            routes: Vec::new(),
            unassigned: Vec::new(),
            total_customers,
        }
    }

    /// Adds a route to this solution.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Marks a customer as unassigned.
    pub fn add_unassigned(&mut self, customer_id: usize) {
        self.unassigned.push(customer_id);
    }

    /// Returns the routes in this solution, one per vehicle.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Mutable access to the routes (used by the validator to fill totals).
    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    /// Returns the number of routes (including depot-only ones).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Routes that serve at least one customer.
    pub fn num_used_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_trivial()).count()
    }

    /// Returns the IDs of unassigned customers.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Returns the number of unassigned customers.
    pub fn num_unassigned(&self) -> usize {
        self.unassigned.len()
    }

    /// Total number of customers served (across all routes).
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Served versus routable customers.
    pub fn coverage(&self) -> Coverage {
        Coverage {
            assigned: self.num_served(),
            total: self.total_customers,
        }
    }

    /// Total distance across all routes.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance()).sum()
    }
}

impl fmt::Display for Solution {
    /// One `Route <vehicleId>: 0 … 0` line per non-trivial route.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for route in self.routes.iter().filter(|r| !r.is_trivial()) {
            writeln!(f, "{route}")?;
        }
        Ok(())
    }
}
