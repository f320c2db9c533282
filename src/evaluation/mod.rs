//! Feasibility checking, state transition, and route validation.
//!
//! - [`can_serve`] — pure admissibility of a (vehicle state, customer) pair
//! - [`assign`] — commits an admissible pair, advancing the vehicle state
//! - [`RouteValidator`] — replays finished routes against the same rules

mod feasibility;
mod transition;
mod validator;

pub use feasibility::{can_serve, Admission, Probe, Rejection};
pub use transition::assign;
pub use validator::{RouteCheck, RouteValidator, SolutionCheck, ValidationFailure, ViolationKind};
