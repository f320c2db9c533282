//! Solver configuration.
//!
//! Everything the construction reads is passed in explicitly through
//! [`SolverConfig`]; nothing is taken from the environment. All structs
//! deserialize with defaults for missing fields, so a partial JSON document
//! such as `{"relaxation": {"passes": 3}}` is enough.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};
use crate::models::Variant;

/// How much a VRPTW vehicle carries when it leaves the depot.
///
/// Other variants ignore this: PDPTW and VRPSPDTW vehicles always leave
/// empty, and VRPSPDTW draws delivery shortfalls from the depot on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialLoad {
    /// Loaded to capacity; each delivery frees space.
    #[default]
    Full,
    /// Empty; deliveries are covered by depot stock on demand.
    Empty,
}

impl InitialLoad {
    /// Load at the depot for a vehicle of the given capacity.
    pub fn load_for(self, variant: Variant, capacity: i32) -> i32 {
        match (variant, self) {
            (Variant::Vrptw, InitialLoad::Full) => capacity,
            _ => 0,
        }
    }
}

/// Which side of the (vehicle, customer) pairing drives each greedy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Each vehicle in turn takes its best-scoring admissible customer.
    VehicleSweep,
    /// Each customer in priority order goes to its best-scoring vehicle.
    #[default]
    CustomerScan,
}

/// Bounded time-window relaxation applied after strict passes stall.
///
/// Relaxation pass `k` (1-based) admits service starts up to
/// `due * (1 + initial_tolerance * growth_factor^(k-1))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationSchedule {
    /// Number of relaxation passes; zero disables relaxation.
    pub passes: usize,
    /// Tolerance of the first relaxation pass.
    pub initial_tolerance: f64,
    /// Multiplier applied to the tolerance on every further pass.
    pub growth_factor: f64,
    /// Whether the last pass ends by offering leftovers to the roomiest
    /// vehicle at one extra tolerance step.
    pub last_resort: bool,
}

impl Default for RelaxationSchedule {
    fn default() -> Self {
        Self {
            passes: 4,
            initial_tolerance: 0.05,
            growth_factor: 1.5,
            last_resort: true,
        }
    }
}

impl RelaxationSchedule {
    /// A schedule with relaxation turned off.
    pub fn strict() -> Self {
        Self {
            passes: 0,
            ..Self::default()
        }
    }

    /// Tolerance for relaxation pass `pass` (1-based). Pass 0 is strict.
    pub fn tolerance(&self, pass: usize) -> f64 {
        if pass == 0 {
            return 0.0;
        }
        let exp = i32::try_from(pass - 1).unwrap_or(i32::MAX);
        self.initial_tolerance * self.growth_factor.powi(exp)
    }

    /// Tolerance granted by the last-resort round: one growth step beyond
    /// the final relaxation pass. `None` when that round does not run.
    pub fn last_resort_tolerance(&self) -> Option<f64> {
        (self.last_resort && self.passes > 0).then(|| self.tolerance(self.passes + 1))
    }

    /// Largest tolerance any admission under this schedule can use.
    pub fn max_tolerance(&self) -> f64 {
        self.last_resort_tolerance()
            .unwrap_or_else(|| self.tolerance(self.passes))
    }
}

/// Weights of the admission score. Lower scores are committed first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Cost per unit of idle waiting before the window opens.
    pub waiting: f64,
    /// Cost per unit of lateness beyond `due`, divided by `1 + tolerance`.
    pub lateness: f64,
    /// Numerator of the slack urgency term `urgency / (slack + 1)`.
    pub urgency: f64,
    /// Cost of an empty vehicle; scaled by `1 - utilization`.
    pub utilization: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            waiting: 0.1,
            lateness: 100.0,
            urgency: 10.0,
            utilization: 5.0,
        }
    }
}

/// Complete configuration of one construction run.
///
/// # Examples
///
/// ```
/// use u_spdtw::config::{SolverConfig, Strategy};
///
/// let config = SolverConfig::from_json(r#"{"strategy": "vehicle_sweep"}"#).unwrap();
/// assert_eq!(config.strategy, Strategy::VehicleSweep);
/// assert_eq!(config.relaxation.passes, 4);
///
/// assert!(SolverConfig::from_json(r#"{"relaxation": {"growth_factor": 1.0}}"#).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relaxation passes run after the strict phase stalls.
    pub relaxation: RelaxationSchedule,
    /// Greedy pairing order.
    pub strategy: Strategy,
    /// Admission score weights.
    pub weights: ScoreWeights,
    /// Starting load of VRPTW vehicles.
    pub vrptw_initial_load: InitialLoad,
}

impl SolverConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RoutingError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        let r = &self.relaxation;
        if !(r.growth_factor.is_finite() && r.growth_factor > 1.0) {
            return Err(RoutingError::invalid_config(format!(
                "growth_factor must be > 1, got {}",
                r.growth_factor
            )));
        }
        if !(r.initial_tolerance.is_finite() && r.initial_tolerance >= 0.0) {
            return Err(RoutingError::invalid_config(format!(
                "initial_tolerance must be >= 0, got {}",
                r.initial_tolerance
            )));
        }
        if !r.max_tolerance().is_finite() {
            return Err(RoutingError::invalid_config(format!(
                "{} passes overflow the tolerance",
                r.passes
            )));
        }
        let w = &self.weights;
        for (name, value) in [
            ("waiting", w.waiting),
            ("lateness", w.lateness),
            ("urgency", w.urgency),
            ("utilization", w.utilization),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(RoutingError::invalid_config(format!(
                    "weight {name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tolerance_growth() {
        let r = RelaxationSchedule {
            passes: 3,
            initial_tolerance: 0.1,
            growth_factor: 2.0,
            last_resort: true,
        };
        assert_eq!(r.tolerance(0), 0.0);
        assert!((r.tolerance(1) - 0.1).abs() < 1e-12);
        assert!((r.tolerance(2) - 0.2).abs() < 1e-12);
        // the last-resort round goes one step past pass 3
        assert_eq!(r.last_resort_tolerance(), Some(r.tolerance(4)));
        assert!((r.max_tolerance() - 0.8).abs() < 1e-12);

        let without = RelaxationSchedule {
            last_resort: false,
            ..r
        };
        assert_eq!(without.last_resort_tolerance(), None);
        assert!((without.max_tolerance() - 0.4).abs() < 1e-12);
        assert_eq!(RelaxationSchedule::strict().last_resort_tolerance(), None);
        assert_eq!(RelaxationSchedule::strict().max_tolerance(), 0.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut c = SolverConfig::default();
        c.relaxation.growth_factor = 0.5;
        assert!(matches!(c.validate(), Err(RoutingError::InvalidConfig { .. })));

        let mut c = SolverConfig::default();
        c.relaxation.initial_tolerance = -0.1;
        assert!(c.validate().is_err());

        let mut c = SolverConfig::default();
        c.weights.urgency = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let c = SolverConfig::from_json(r#"{"vrptw_initial_load": "empty"}"#).expect("valid");
        assert_eq!(c.vrptw_initial_load, InitialLoad::Empty);
        assert_eq!(c.weights, ScoreWeights::default());
        assert!(SolverConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_initial_load_by_variant() {
        assert_eq!(InitialLoad::Full.load_for(Variant::Vrptw, 80), 80);
        assert_eq!(InitialLoad::Empty.load_for(Variant::Vrptw, 80), 0);
        assert_eq!(InitialLoad::Full.load_for(Variant::Pdptw, 80), 0);
        assert_eq!(InitialLoad::Full.load_for(Variant::Vrpspdtw, 80), 0);
    }
}
