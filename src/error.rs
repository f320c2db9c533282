//! Error taxonomy shared by every module.

use std::fmt;

/// Errors raised while building or solving a routing instance.
///
/// `MalformedInstance` and `UnknownEdge` abort a single instance only.
/// `InfeasibleAssignment` signals a logic defect in the construction and is
/// fatal for a whole batch run (see [`RoutingError::is_fatal`]).
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// A customer, vehicle, or instance failed its construction invariant.
    MalformedInstance {
        /// Human-readable description of the broken invariant.
        reason: String,
    },
    /// No distance/time data and no coordinate fallback for a node pair.
    UnknownEdge {
        /// Origin node id.
        from: usize,
        /// Destination node id.
        to: usize,
    },
    /// `assign` was invoked on a pair the feasibility predicate rejects.
    InfeasibleAssignment {
        /// Vehicle whose state would have been corrupted.
        vehicle_id: usize,
        /// Customer that was offered.
        customer_id: usize,
        /// Why the predicate rejected the pair.
        reason: String,
    },
    /// A solver configuration value is out of range.
    InvalidConfig {
        /// Which setting is wrong and why.
        reason: String,
    },
}

impl RoutingError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInstance {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that indicate a defect in the solver itself
    /// rather than bad input. A batch run stops on these.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InfeasibleAssignment { .. })
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInstance { reason } => write!(f, "malformed instance: {reason}"),
            Self::UnknownEdge { from, to } => {
                write!(f, "no distance or time data for edge {from} -> {to}")
            }
            Self::InfeasibleAssignment {
                vehicle_id,
                customer_id,
                reason,
            } => write!(
                f,
                "infeasible assignment of customer {customer_id} to vehicle {vehicle_id}: {reason}"
            ),
            Self::InvalidConfig { reason } => write!(f, "invalid solver configuration: {reason}"),
        }
    }
}

impl std::error::Error for RoutingError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_edge() {
        let e = RoutingError::UnknownEdge { from: 3, to: 7 };
        assert_eq!(e.to_string(), "no distance or time data for edge 3 -> 7");
    }

    #[test]
    fn test_only_infeasible_assignment_is_fatal() {
        assert!(!RoutingError::malformed("x").is_fatal());
        assert!(!RoutingError::UnknownEdge { from: 0, to: 1 }.is_fatal());
        assert!(!RoutingError::invalid_config("x").is_fatal());
        assert!(RoutingError::InfeasibleAssignment {
            vehicle_id: 1,
            customer_id: 2,
            reason: "late".into(),
        }
        .is_fatal());
    }
}
