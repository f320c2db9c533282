//! A validated problem instance.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::distance::TravelProvider;
use crate::error::{Result, RoutingError};

use super::{Customer, NodeKind, Variant, Vehicle};

/// Everything the construction needs for one input file: variant,
/// customers (depot first), fleet, and travel data.
///
/// [`Instance::new`] checks the cross-record invariants that single
/// constructors cannot: the depot is node 0 with no demand, ids are unique,
/// and demands fit the variant.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::{Customer, Demand, Instance, TimeWindow, Variant, Vehicle};
/// use u_spdtw::distance::DistanceMatrix;
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 3.0, 4.0, Demand::delivery(10).unwrap(), tw, 5.0).unwrap(),
/// ];
/// let travel = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(1, 50).unwrap()];
///
/// let instance = Instance::new("demo", Variant::Vrptw, customers, vehicles, travel).unwrap();
/// assert_eq!(instance.num_customers(), 1);
/// assert_eq!(instance.customer(1).unwrap().demand().delivery_qty(), 10);
/// ```
pub struct Instance {
    name: String,
    variant: Variant,
    customers: Vec<Customer>,
    vehicles: Vec<Vehicle>,
    index: HashMap<usize, usize>,
    travel: Box<dyn TravelProvider>,
}

impl Instance {
    /// Validates and assembles an instance.
    pub fn new(
        name: impl Into<String>,
        variant: Variant,
        customers: Vec<Customer>,
        vehicles: Vec<Vehicle>,
        travel: impl TravelProvider + 'static,
    ) -> Result<Self> {
        let name = name.into();
        let depot = customers
            .first()
            .ok_or_else(|| RoutingError::malformed(format!("{name}: no depot")))?;
        if !depot.is_depot() {
            return Err(RoutingError::malformed(format!(
                "{name}: first node has id {}, expected depot 0",
                depot.id()
            )));
        }
        if !depot.demand().is_zero() || depot.service_duration() != 0.0 {
            return Err(RoutingError::malformed(format!(
                "{name}: depot must have zero demand and service"
            )));
        }
        if vehicles.is_empty() {
            return Err(RoutingError::malformed(format!("{name}: empty fleet")));
        }

        let mut vehicle_ids = HashSet::new();
        for v in &vehicles {
            if !vehicle_ids.insert(v.id()) {
                return Err(RoutingError::malformed(format!(
                    "{name}: duplicate vehicle id {}",
                    v.id()
                )));
            }
        }

        let mut index = HashMap::with_capacity(customers.len());
        for (i, c) in customers.iter().enumerate() {
            if index.insert(c.id(), i).is_some() {
                return Err(RoutingError::malformed(format!(
                    "{name}: duplicate customer id {}",
                    c.id()
                )));
            }
            check_variant_demand(&name, variant, c)?;
        }

        Ok(Self {
            name,
            variant,
            customers,
            vehicles,
            index,
            travel: Box::new(travel),
        })
    }

    /// Instance name, typically the input file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active problem variant.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The depot (node 0).
    pub fn depot(&self) -> &Customer {
        &self.customers[0]
    }

    /// All nodes, depot first.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Nodes that need a route (depot excluded).
    pub fn routable(&self) -> &[Customer] {
        &self.customers[1..]
    }

    /// Number of routable customers.
    pub fn num_customers(&self) -> usize {
        self.customers.len() - 1
    }

    /// Looks up a node by id.
    pub fn customer(&self, id: usize) -> Option<&Customer> {
        self.index.get(&id).map(|&i| &self.customers[i])
    }

    /// Largest node id, used to size per-node bitmaps.
    pub fn max_node_id(&self) -> usize {
        self.customers.iter().map(Customer::id).max().unwrap_or(0)
    }

    /// The fleet in input order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Looks up a vehicle by id.
    pub fn vehicle(&self, id: usize) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// Travel data for this instance.
    pub fn travel(&self) -> &dyn TravelProvider {
        self.travel.as_ref()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("customers", &self.customers.len())
            .field("vehicles", &self.vehicles.len())
            .finish()
    }
}

fn check_variant_demand(name: &str, variant: Variant, c: &Customer) -> Result<()> {
    let demand = c.demand();
    match variant {
        Variant::Vrptw if demand.pickup_qty() > 0 => Err(RoutingError::malformed(format!(
            "{name}: customer {} has pickup demand in a VRPTW instance",
            c.id()
        ))),
        Variant::Pdptw if c.kind() == NodeKind::Pickup && demand.delivery_qty() > 0 => {
            Err(RoutingError::malformed(format!(
                "{name}: customer {} is both pickup and delivery in a PDPTW instance",
                c.id()
            )))
        }
        _ => Ok(()),
    }
}
