//! Domain model types for vehicle routing problems.
//!
//! Provides the core abstractions: customers with delivery/pickup demands
//! and time windows, capacity-limited vehicles, the per-vehicle
//! construction state, routes as ordered sequences of visits, and a
//! validated instance that ties everything together.

mod assigned;
mod customer;
mod instance;
mod route;
mod solution;
mod state;
mod variant;
mod vehicle;

pub use assigned::AssignedSet;
pub use customer::{Customer, Demand, NodeKind, TimeWindow, MAX_NODE_ID};
pub use instance::Instance;
pub use route::{Route, Visit};
pub use solution::{Coverage, Solution};
pub use state::VehicleState;
pub use variant::Variant;
pub use vehicle::Vehicle;
