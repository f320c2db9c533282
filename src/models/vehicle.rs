//! Vehicle type with a fixed load capacity.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// A fleet unit. Every vehicle starts and ends at the depot (node 0).
///
/// # Examples
///
/// ```
/// use u_spdtw::models::Vehicle;
///
/// let v = Vehicle::new(1, 200).unwrap();
/// assert_eq!(v.id(), 1);
/// assert_eq!(v.capacity(), 200);
/// assert!(Vehicle::new(2, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVehicle")]
pub struct Vehicle {
    id: usize,
    capacity: i32,
}

impl Vehicle {
    /// Creates a vehicle. Fails with `MalformedInstance` unless
    /// `capacity > 0`.
    pub fn new(id: usize, capacity: i32) -> Result<Self> {
        if capacity <= 0 {
            return Err(RoutingError::malformed(format!(
                "vehicle {id} has non-positive capacity {capacity}"
            )));
        }
        Ok(Self { id, capacity })
    }

    /// Builds a homogeneous fleet with ids `1..=count`.
    pub fn fleet(count: usize, capacity: i32) -> Result<Vec<Self>> {
        (1..=count).map(|id| Self::new(id, capacity)).collect()
    }

    /// Vehicle ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
}

#[derive(Deserialize)]
struct RawVehicle {
    id: usize,
    capacity: i32,
}

impl TryFrom<RawVehicle> for Vehicle {
    type Error = RoutingError;

    fn try_from(raw: RawVehicle) -> Result<Self> {
        Self::new(raw.id, raw.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(0, 200).expect("valid");
        assert_eq!(v.id(), 0);
        assert_eq!(v.capacity(), 200);
    }

    #[test]
    fn test_vehicle_rejects_capacity() {
        assert!(matches!(
            Vehicle::new(3, -10),
            Err(RoutingError::MalformedInstance { .. })
        ));
        assert!(Vehicle::new(3, 0).is_err());
    }

    #[test]
    fn test_fleet_ids() {
        let fleet = Vehicle::fleet(3, 50).expect("valid");
        let ids: Vec<usize> = fleet.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(Vehicle::fleet(2, 0).is_err());
    }

    #[test]
    fn test_deserialize_rejects_capacity() {
        let v: Vehicle = serde_json::from_str(r#"{"id":2,"capacity":40}"#).expect("valid");
        assert_eq!(v.capacity(), 40);
        assert!(serde_json::from_str::<Vehicle>(r#"{"id":2,"capacity":0}"#).is_err());
    }
}
