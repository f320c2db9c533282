//! Customer, demand, and time window types.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// Largest accepted node id. Per-node tables are indexed by id, so ids are
/// expected to be dense.
pub const MAX_NODE_ID: usize = 1 << 20;

/// A time window constraint for the start of service at a customer.
///
/// Service may not begin before `ready` (the vehicle waits if early) and may
/// not begin after `due` unless a relaxation tolerance is in effect.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// assert_eq!(tw.service_start(40.0), 100.0);
/// assert!(TimeWindow::new(20.0, 10.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Fails with `MalformedInstance` if `ready > due` or either value is
    /// non-finite.
    pub fn new(ready: f64, due: f64) -> Result<Self> {
        if !ready.is_finite() || !due.is_finite() {
            return Err(RoutingError::malformed(format!(
                "time window [{ready}, {due}] is not finite"
            )));
        }
        if ready > due {
            return Err(RoutingError::malformed(format!(
                "time window start {ready} is after end {due}"
            )));
        }
        Ok(Self { ready, due })
    }

    /// Earliest allowable service start.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable service start.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Width of the window (`due - ready`). Smaller is tighter.
    pub fn width(&self) -> f64 {
        self.due - self.ready
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Returns the waiting time if arriving at the given time.
    ///
    /// Zero if the vehicle arrives within or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.ready {
            self.ready - arrival
        } else {
            0.0
        }
    }

    /// Service start for a given arrival: `max(arrival, ready)`.
    pub fn service_start(&self, arrival: f64) -> f64 {
        arrival.max(self.ready)
    }

    /// Latest admissible service start under a relative tolerance.
    ///
    /// A tolerance of `0.25` accepts starts up to `due * 1.25`.
    pub fn latest_start(&self, tolerance: f64) -> f64 {
        self.due * (1.0 + tolerance)
    }
}

/// Delivery and pickup quantities requested at a node.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::Demand;
///
/// let d = Demand::new(30, 40).unwrap();
/// assert_eq!(d.total(), 70);
/// assert!(Demand::new(-1, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDemand")]
pub struct Demand {
    delivery: i32,
    pickup: i32,
}

impl Demand {
    /// Creates a demand; both quantities must be non-negative.
    pub fn new(delivery: i32, pickup: i32) -> Result<Self> {
        if delivery < 0 || pickup < 0 {
            return Err(RoutingError::malformed(format!(
                "negative demand (delivery {delivery}, pickup {pickup})"
            )));
        }
        Ok(Self { delivery, pickup })
    }

    /// Delivery-only demand.
    pub fn delivery(quantity: i32) -> Result<Self> {
        Self::new(quantity, 0)
    }

    /// Pickup-only demand.
    pub fn pickup(quantity: i32) -> Result<Self> {
        Self::new(0, quantity)
    }

    /// Quantity unloaded at the node.
    pub fn delivery_qty(&self) -> i32 {
        self.delivery
    }

    /// Quantity loaded at the node.
    pub fn pickup_qty(&self) -> i32 {
        self.pickup
    }

    /// Delivery plus pickup, widened so that no pair of quantities
    /// overflows.
    pub fn total(&self) -> i64 {
        i64::from(self.delivery) + i64::from(self.pickup)
    }

    /// Returns `true` if both quantities are zero.
    pub fn is_zero(&self) -> bool {
        self.delivery == 0 && self.pickup == 0
    }
}

/// Role of a node in a pickup-before-delivery problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Loads goods onto the vehicle.
    Pickup,
    /// Unloads goods from the vehicle.
    Delivery,
    /// Neither loads nor unloads.
    Transit,
}

/// A customer (or the depot) in a routing problem.
///
/// Customer 0 is the depot. Customers are immutable once built; which
/// customers have been routed is tracked by the construction algorithm,
/// never on the record itself.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::{Customer, Demand, TimeWindow};
///
/// let depot = Customer::depot(35.0, 35.0, 1000.0).unwrap();
/// assert_eq!(depot.id(), 0);
/// assert!(depot.is_depot());
///
/// let tw = TimeWindow::new(10.0, 50.0).unwrap();
/// let c = Customer::new(1, 41.0, 49.0, Demand::new(10, 5).unwrap(), tw, 10.0).unwrap();
/// assert_eq!(c.demand().total(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomer")]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: Demand,
    time_window: TimeWindow,
    service_duration: f64,
}

impl Customer {
    /// Creates a new customer.
    ///
    /// Fails with `MalformedInstance` if the id exceeds [`MAX_NODE_ID`], a
    /// coordinate is non-finite, or the service duration is negative or
    /// non-finite.
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        demand: Demand,
        time_window: TimeWindow,
        service_duration: f64,
    ) -> Result<Self> {
        if id > MAX_NODE_ID {
            return Err(RoutingError::malformed(format!(
                "customer id {id} exceeds the limit {MAX_NODE_ID}"
            )));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(RoutingError::malformed(format!(
                "customer {id} has non-finite coordinates ({x}, {y})"
            )));
        }
        if !service_duration.is_finite() || service_duration < 0.0 {
            return Err(RoutingError::malformed(format!(
                "customer {id} has invalid service duration {service_duration}"
            )));
        }
        Ok(Self {
            id,
            x,
            y,
            demand,
            time_window,
            service_duration,
        })
    }

    /// Creates the depot (id 0, no demand, no service) open over
    /// `[0, horizon]`.
    pub fn depot(x: f64, y: f64, horizon: f64) -> Result<Self> {
        let tw = TimeWindow::new(0.0, horizon)?;
        Self::new(0, x, y, Demand::default(), tw, 0.0)
    }

    /// Customer ID (0 = depot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns `true` for node 0.
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Requested quantities.
    pub fn demand(&self) -> Demand {
        self.demand
    }

    /// Service time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Fixed service duration.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Node role when pickups and deliveries are separate visits.
    pub fn kind(&self) -> NodeKind {
        if self.demand.pickup > 0 {
            NodeKind::Pickup
        } else if self.demand.delivery > 0 {
            NodeKind::Delivery
        } else {
            NodeKind::Transit
        }
    }

    /// Euclidean distance to another customer.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// Wire forms. Deserialization goes through the checked constructors.

#[derive(Deserialize)]
struct RawTimeWindow {
    ready: f64,
    due: f64,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = RoutingError;

    fn try_from(raw: RawTimeWindow) -> Result<Self> {
        Self::new(raw.ready, raw.due)
    }
}

#[derive(Deserialize)]
struct RawDemand {
    delivery: i32,
    pickup: i32,
}

impl TryFrom<RawDemand> for Demand {
    type Error = RoutingError;

    fn try_from(raw: RawDemand) -> Result<Self> {
        Self::new(raw.delivery, raw.pickup)
    }
}

#[derive(Deserialize)]
struct RawCustomer {
    id: usize,
    x: f64,
    y: f64,
    demand: Demand,
    time_window: TimeWindow,
    service_duration: f64,
}

impl TryFrom<RawCustomer> for Customer {
    type Error = RoutingError;

    fn try_from(raw: RawCustomer) -> Result<Self> {
        Self::new(
            raw.id,
            raw.x,
            raw.y,
            raw.demand,
            raw.time_window,
            raw.service_duration,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tw(a: f64, b: f64) -> TimeWindow {
        TimeWindow::new(a, b).expect("valid")
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_err());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_err());
        assert!(TimeWindow::new(10.0, f64::INFINITY).is_err());
        assert!(TimeWindow::new(10.0, 10.0).is_ok());
    }

    #[test]
    fn test_time_window_contains() {
        let w = tw(10.0, 20.0);
        assert!(w.contains(10.0));
        assert!(w.contains(20.0));
        assert!(!w.contains(9.9));
        assert!(!w.contains(20.1));
    }

    #[test]
    fn test_time_window_waiting_and_start() {
        let w = tw(10.0, 20.0);
        assert!((w.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert!(w.waiting_time(15.0).abs() < 1e-10);
        assert_eq!(w.service_start(5.0), 10.0);
        assert_eq!(w.service_start(12.0), 12.0);
    }

    #[test]
    fn test_latest_start_with_tolerance() {
        let w = tw(0.0, 100.0);
        assert_eq!(w.latest_start(0.0), 100.0);
        assert!((w.latest_start(0.25) - 125.0).abs() < 1e-10);
        assert_eq!(w.width(), 100.0);
    }

    #[test]
    fn test_demand_rejects_negative() {
        assert!(Demand::new(-5, 0).is_err());
        assert!(Demand::new(0, -1).is_err());
        assert!(Demand::pickup(0).expect("valid").is_zero());
    }

    #[test]
    fn test_customer_rejects_bad_service() {
        let d = Demand::delivery(5).expect("valid");
        assert!(Customer::new(1, 0.0, 0.0, d, tw(0.0, 10.0), -1.0).is_err());
        assert!(Customer::new(1, 0.0, 0.0, d, tw(0.0, 10.0), f64::NAN).is_err());
    }

    #[test]
    fn test_customer_rejects_bad_coordinates() {
        let d = Demand::delivery(5).expect("valid");
        assert!(Customer::new(1, f64::NAN, 0.0, d, tw(0.0, 10.0), 0.0).is_err());
        assert!(Customer::new(1, 0.0, f64::INFINITY, d, tw(0.0, 10.0), 0.0).is_err());
    }

    #[test]
    fn test_customer_rejects_huge_id() {
        let d = Demand::delivery(5).expect("valid");
        assert!(Customer::new(MAX_NODE_ID, 0.0, 0.0, d, tw(0.0, 10.0), 0.0).is_ok());
        assert!(Customer::new(MAX_NODE_ID + 1, 0.0, 0.0, d, tw(0.0, 10.0), 0.0).is_err());
        assert!(Customer::new(usize::MAX, 0.0, 0.0, d, tw(0.0, 10.0), 0.0).is_err());

        let json = format!(
            r#"{{"id":{},"x":0,"y":0,"demand":{{"delivery":1,"pickup":0}},
            "time_window":{{"ready":0,"due":10}},"service_duration":0}}"#,
            usize::MAX
        );
        assert!(serde_json::from_str::<Customer>(&json).is_err());
    }

    #[test]
    fn test_demand_total_does_not_overflow() {
        let d = Demand::new(i32::MAX, i32::MAX).expect("valid");
        assert_eq!(d.total(), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let w: TimeWindow = serde_json::from_str(r#"{"ready":5,"due":10}"#).expect("valid");
        assert_eq!(w, tw(5.0, 10.0));
        assert!(serde_json::from_str::<TimeWindow>(r#"{"ready":10,"due":5}"#).is_err());

        assert!(serde_json::from_str::<Demand>(r#"{"delivery":-3,"pickup":0}"#).is_err());
        let d: Demand = serde_json::from_str(r#"{"delivery":3,"pickup":4}"#).expect("valid");
        assert_eq!(d.total(), 7);

        let ok = r#"{"id":1,"x":1.0,"y":2.0,"demand":{"delivery":3,"pickup":0},
            "time_window":{"ready":0,"due":10},"service_duration":2.0}"#;
        let c: Customer = serde_json::from_str(ok).expect("valid");
        assert_eq!(c.id(), 1);
        assert_eq!(c.kind(), NodeKind::Delivery);

        let bad_service = ok.replace("2.0}", "-2.0}");
        assert!(serde_json::from_str::<Customer>(&bad_service).is_err());
        let bad_window = ok.replace(r#""due":10"#, r#""due":-1"#);
        assert!(serde_json::from_str::<Customer>(&bad_window).is_err());
    }

    #[test]
    fn test_serialize_then_deserialize_keeps_customer() {
        let c = Customer::new(4, 1.5, -2.0, Demand::new(2, 3).expect("valid"), tw(1.0, 9.0), 0.5)
            .expect("valid");
        let json = serde_json::to_string(&c).expect("serializable");
        let back: Customer = serde_json::from_str(&json).expect("valid");
        assert_eq!(back, c);
    }

    #[test]
    fn test_customer_depot() {
        let d = Customer::depot(35.0, 35.0, 230.0).expect("valid");
        assert_eq!(d.id(), 0);
        assert!(d.demand().is_zero());
        assert_eq!(d.service_duration(), 0.0);
        assert_eq!(d.time_window().due(), 230.0);
    }

    #[test]
    fn test_customer_kind() {
        let w = tw(0.0, 10.0);
        let p = Customer::new(1, 0.0, 0.0, Demand::pickup(3).expect("valid"), w, 0.0)
            .expect("valid");
        let d = Customer::new(2, 0.0, 0.0, Demand::delivery(3).expect("valid"), w, 0.0)
            .expect("valid");
        let t = Customer::new(3, 0.0, 0.0, Demand::default(), w, 0.0).expect("valid");
        assert_eq!(p.kind(), NodeKind::Pickup);
        assert_eq!(d.kind(), NodeKind::Delivery);
        assert_eq!(t.kind(), NodeKind::Transit);
    }

    #[test]
    fn test_customer_distance() {
        let w = tw(0.0, 10.0);
        let a = Customer::new(0, 0.0, 0.0, Demand::default(), w, 0.0).expect("valid");
        let b = Customer::new(1, 3.0, 4.0, Demand::default(), w, 0.0).expect("valid");
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-10);
    }
}
