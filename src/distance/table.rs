//! Sparse edge table with Euclidean fallback.

use std::collections::HashMap;

use crate::error::{Result, RoutingError};
use crate::models::Customer;

use super::TravelProvider;

/// Explicit `(from, to) → (distance, time)` entries, as supplied by
/// instances that list their edges.
///
/// Pairs without an entry fall back to the Euclidean distance between the
/// nodes' coordinates (time ≡ distance) when coordinates were registered.
/// A pair with neither fails with `UnknownEdge`.
///
/// # Examples
///
/// ```
/// use u_spdtw::distance::{EdgeTable, TravelProvider};
///
/// let mut table = EdgeTable::new();
/// table.insert(0, 1, 12.0, 15.0).unwrap();
/// assert_eq!(table.travel_time(0, 1).unwrap(), 15.0);
/// assert!(table.distance(1, 0).is_err());
/// assert!(table.insert(1, 0, f64::NAN, 1.0).is_err());
///
/// table.set_coordinates(1, 3.0, 4.0).unwrap();
/// table.set_coordinates(0, 0.0, 0.0).unwrap();
/// assert_eq!(table.distance(1, 0).unwrap(), 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    edges: HashMap<(usize, usize), (f64, f64)>,
    coordinates: HashMap<usize, (f64, f64)>,
}

impl EdgeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every customer's coordinates as fallback.
    pub fn with_coordinates(mut self, customers: &[Customer]) -> Self {
        // customer coordinates are finite by construction
        for c in customers {
            self.coordinates.insert(c.id(), (c.x(), c.y()));
        }
        self
    }

    /// Adds or replaces a directed edge.
    ///
    /// Fails with `MalformedInstance` if the distance or time is negative
    /// or non-finite; the table is left unchanged.
    pub fn insert(&mut self, from: usize, to: usize, distance: f64, time: f64) -> Result<()> {
        for (what, v) in [("distance", distance), ("time", time)] {
            if !v.is_finite() || v < 0.0 {
                return Err(RoutingError::malformed(format!(
                    "edge ({from}, {to}) has invalid {what} {v}"
                )));
            }
        }
        self.edges.insert((from, to), (distance, time));
        Ok(())
    }

    /// Registers the coordinates of one node.
    ///
    /// Fails with `MalformedInstance` if either coordinate is non-finite.
    pub fn set_coordinates(&mut self, node: usize, x: f64, y: f64) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(RoutingError::malformed(format!(
                "node {node} has non-finite coordinates ({x}, {y})"
            )));
        }
        self.coordinates.insert(node, (x, y));
        Ok(())
    }

    /// Number of explicit edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no explicit edge was inserted.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn lookup(&self, from: usize, to: usize) -> Result<(f64, f64)> {
        if from == to {
            return Ok((0.0, 0.0));
        }
        if let Some(&entry) = self.edges.get(&(from, to)) {
            return Ok(entry);
        }
        match (self.coordinates.get(&from), self.coordinates.get(&to)) {
            (Some(&(x1, y1)), Some(&(x2, y2))) => {
                let d = (x1 - x2).hypot(y1 - y2);
                Ok((d, d))
            }
            _ => Err(RoutingError::UnknownEdge { from, to }),
        }
    }
}

impl TravelProvider for EdgeTable {
    fn distance(&self, from: usize, to: usize) -> Result<f64> {
        self.lookup(from, to).map(|(d, _)| d)
    }

    fn travel_time(&self, from: usize, to: usize) -> Result<f64> {
        self.lookup(from, to).map(|(_, t)| t)
    }
}
