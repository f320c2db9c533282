//! Distance and travel time providers.
//!
//! Provides the [`TravelProvider`] lookup used by the feasibility engine,
//! backed by a dense matrix or a sparse edge table.

mod matrix;
mod table;

pub use matrix::DistanceMatrix;
pub use table::EdgeTable;

use crate::error::Result;

/// Travel distance and time between two nodes.
///
/// Implementations are read-only after construction. A pair with no data
/// fails with [`RoutingError::UnknownEdge`](crate::error::RoutingError).
pub trait TravelProvider: Send + Sync {
    /// Travel distance from node `from` to node `to`.
    fn distance(&self, from: usize, to: usize) -> Result<f64>;

    /// Travel time from node `from` to node `to`.
    ///
    /// Defaults to `distance(from, to)` (speed = 1).
    fn travel_time(&self, from: usize, to: usize) -> Result<f64> {
        self.distance(from, to)
    }
}
