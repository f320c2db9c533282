//! # u-spdtw
//!
//! Greedy route construction for capacitated vehicle routing with time
//! windows and three payload models: delivery only (VRPTW), single-sided
//! pickup or delivery stops (PDPTW), and simultaneous pickup and delivery
//! (VRPSPDTW).
//!
//! Construction is one deterministic greedy pass over a priority order,
//! followed by bounded relaxation passes that widen time windows by a
//! growing tolerance. Every route it returns is replayable by the validator.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (Customer, Vehicle, Instance, Route, Solution)
//! - [`distance`] — Travel providers (dense matrix, sparse edge table)
//! - [`evaluation`] — Feasibility predicate, state transition, route validator
//! - [`constructive`] — Priority order, scoring, greedy assignment with relaxation
//! - [`config`] — Solver configuration
//! - [`batch`] — Per-instance orchestration and parallel batch runs
//! - [`error`] — Error type
//!
//! ## Example
//!
//! ```
//! use u_spdtw::batch::solve_instance;
//! use u_spdtw::config::SolverConfig;
//! use u_spdtw::distance::DistanceMatrix;
//! use u_spdtw::models::{Customer, Demand, Instance, TimeWindow, Variant, Vehicle};
//!
//! let tw = TimeWindow::new(0.0, 200.0).unwrap();
//! let customers = vec![
//!     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
//!     Customer::new(1, 10.0, 0.0, Demand::new(20, 30).unwrap(), tw, 5.0).unwrap(),
//!     Customer::new(2, 0.0, 10.0, Demand::new(40, 10).unwrap(), tw, 5.0).unwrap(),
//! ];
//! let dm = DistanceMatrix::from_customers(&customers);
//! let fleet = Vehicle::fleet(2, 100).unwrap();
//! let instance = Instance::new("demo", Variant::Vrpspdtw, customers, fleet, dm).unwrap();
//!
//! let report = solve_instance(&instance, &SolverConfig::default()).unwrap();
//! assert!(report.is_valid());
//! assert_eq!(report.coverage.assigned, 2);
//! ```

pub mod batch;
pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod models;
