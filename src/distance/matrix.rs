//! Dense distance matrix.

use crate::error::{Result, RoutingError};
use crate::models::Customer;

use super::TravelProvider;

/// A dense n×n distance matrix stored in row-major order, indexed by node
/// id.
///
/// Travel time equals distance unless a separate time grid is attached with
/// [`DistanceMatrix::with_times`].
///
/// # Examples
///
/// ```
/// use u_spdtw::models::{Customer, Demand, TimeWindow};
/// use u_spdtw::distance::{DistanceMatrix, TravelProvider};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 100.0).unwrap(),
///     Customer::new(1, 3.0, 4.0, Demand::delivery(10).unwrap(), tw, 5.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// assert!((dm.distance(0, 1).unwrap() - 5.0).abs() < 1e-10);
/// assert!(dm.travel_time(0, 9).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    times: Option<Vec<f64>>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            times: None,
            size,
        }
    }

    /// Computes a Euclidean distance matrix from customer coordinates.
    ///
    /// The matrix is sized to the largest customer id, which
    /// [`Customer::new`] bounds by [`MAX_NODE_ID`](crate::models::MAX_NODE_ID).
    pub fn from_customers(customers: &[Customer]) -> Self {
        let n = customers.iter().map(|c| c.id() + 1).max().unwrap_or(0);
        let mut dm = Self::new(n);
        for (i, a) in customers.iter().enumerate() {
            for b in &customers[i + 1..] {
                let d = a.distance_to(b);
                dm.set(a.id(), b.id(), d);
                dm.set(b.id(), a.id(), d);
            }
        }
        dm
    }

    /// Creates a distance matrix from an explicit n×n grid.
    ///
    /// Fails with `MalformedInstance` if the data length doesn't match
    /// `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self> {
        check_grid(size, &data, "distance")?;
        Ok(Self {
            data,
            times: None,
            size,
        })
    }

    /// Attaches an explicit n×n travel time grid.
    pub fn with_times(mut self, times: Vec<f64>) -> Result<Self> {
        check_grid(self.size, &times, "travel time")?;
        self.times = Some(times);
        Ok(self)
    }

    /// Returns the distance from node `from` to node `to`, if both are in
    /// range.
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.index(from, to).map(|i| self.data[i])
    }

    /// Sets the distance from node `from` to node `to`. Out-of-range ids
    /// are ignored.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        if let Some(i) = self.index(from, to) {
            self.data[i] = distance;
        }
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.data[i * self.size + j] - self.data[j * self.size + i]).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    fn index(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }
}

impl TravelProvider for DistanceMatrix {
    fn distance(&self, from: usize, to: usize) -> Result<f64> {
        self.get(from, to)
            .ok_or(RoutingError::UnknownEdge { from, to })
    }

    fn travel_time(&self, from: usize, to: usize) -> Result<f64> {
        let i = self
            .index(from, to)
            .ok_or(RoutingError::UnknownEdge { from, to })?;
        Ok(match &self.times {
            Some(times) => times[i],
            None => self.data[i],
        })
    }
}

fn check_grid(size: usize, data: &[f64], what: &str) -> Result<()> {
    if data.len() != size * size {
        return Err(RoutingError::malformed(format!(
            "{what} grid has {} entries, expected {}",
            data.len(),
            size * size
        )));
    }
    if let Some(v) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(RoutingError::malformed(format!(
            "{what} grid contains invalid entry {v}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Demand, TimeWindow};

    fn sample_customers() -> Vec<Customer> {
        let tw = TimeWindow::new(0.0, 100.0).expect("valid");
        vec![
            Customer::depot(0.0, 0.0, 100.0).expect("valid"),
            Customer::new(1, 3.0, 4.0, Demand::delivery(10).expect("valid"), tw, 5.0)
                .expect("valid"),
            Customer::new(2, 0.0, 8.0, Demand::delivery(20).expect("valid"), tw, 5.0)
                .expect("valid"),
        ]
    }

    #[test]
    fn test_from_customers() {
        let dm = DistanceMatrix::from_customers(&sample_customers());
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1).expect("in range") - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2).expect("in range") - 8.0).abs() < 1e-10);
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_err());
        assert!(DistanceMatrix::from_data(1, vec![-1.0]).is_err());
    }

    #[test]
    fn test_separate_time_grid() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0])
            .expect("valid")
            .with_times(vec![0.0, 7.0, 9.0, 0.0])
            .expect("valid");
        assert_eq!(dm.distance(0, 1).expect("known"), 5.0);
        assert_eq!(dm.travel_time(0, 1).expect("known"), 7.0);
        assert_eq!(dm.travel_time(1, 0).expect("known"), 9.0);
    }

    #[test]
    fn test_unknown_edge() {
        let dm = DistanceMatrix::new(2);
        assert_eq!(
            dm.distance(0, 5),
            Err(RoutingError::UnknownEdge { from: 0, to: 5 })
        );
    }

    #[test]
    fn test_asymmetric_matrix() {
        let mut dm = DistanceMatrix::new(2);
        dm.set(0, 1, 10.0);
        dm.set(1, 0, 15.0);
        assert!(!dm.is_symmetric(1e-10));
    }
}
