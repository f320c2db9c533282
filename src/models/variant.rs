//! Problem variant tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

/// Which payload rules apply to an instance.
///
/// # Examples
///
/// ```
/// use u_spdtw::models::Variant;
///
/// let v: Variant = "vrpspdtw_wang_chen".parse().unwrap();
/// assert_eq!(v, Variant::Vrpspdtw);
/// assert_eq!(Variant::Pdptw.to_string(), "PDPTW");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Variant {
    /// Delivery-only routing with time windows.
    Vrptw,
    /// Pickup-before-delivery routing with time windows.
    Pdptw,
    /// Simultaneous pickup and delivery at one visit, with time windows.
    Vrpspdtw,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variant::Vrptw => "VRPTW",
            Variant::Pdptw => "PDPTW",
            Variant::Vrpspdtw => "VRPSPDTW",
        };
        f.write_str(s)
    }
}

impl FromStr for Variant {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VRPTW" => Ok(Variant::Vrptw),
            "PDPTW" => Ok(Variant::Pdptw),
            "VRPSPDTW" | "VRPSPDTW_WANG_CHEN" | "VRPSPDTW_LIU_TANG_YAO" => Ok(Variant::Vrpspdtw),
            other => Err(RoutingError::malformed(format!(
                "unknown problem variant '{other}'"
            ))),
        }
    }
}
