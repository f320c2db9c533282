//! Greedy route construction.
//!
//! - [`priority_order`] — tightest window first, heaviest demand next, id last
//! - [`score`] — cost of a feasible (vehicle, customer) pair, lower is better
//! - [`construct`] — strict pass, relaxation passes, last-resort round

mod greedy;
mod priority;
mod score;

pub use greedy::{construct, Construction, PassReport, Termination};
pub use priority::priority_order;
pub use score::score;
