//! Per-instance orchestration and parallel batch runs.
//!
//! [`solve_instance`] constructs, validates and summarises one instance.
//! [`solve_batch`] does the same for many instances on the rayon pool; every
//! instance's data stays on the worker that solves it.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::SolverConfig;
use crate::constructive::{construct, Construction, PassReport, Termination};
use crate::error::{Result, RoutingError};
use crate::evaluation::{RouteValidator, ValidationFailure};
use crate::models::{Coverage, Instance, Solution, Variant};

/// Everything known about one solved instance.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    /// Instance name.
    pub name: String,
    /// Problem variant.
    pub variant: Variant,
    /// Routes with validated distance and duration totals.
    pub solution: Solution,
    /// Served share of the routable customers.
    pub coverage: Coverage,
    /// Why construction stopped.
    pub termination: Termination,
    /// Per-pass statistics.
    pub passes: Vec<PassReport>,
    /// Validator findings; empty for a sound solution.
    pub failures: Vec<ValidationFailure>,
}

impl InstanceReport {
    /// Returns `true` if the validator found nothing wrong.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Pretty-printed JSON of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Outcome of one entry of a batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// The instance was solved.
    Solved(Box<InstanceReport>),
    /// The instance could not be solved; the rest of the batch went on.
    Skipped {
        /// Position of the entry in the batch input.
        index: usize,
        /// What went wrong.
        error: RoutingError,
    },
}

impl BatchOutcome {
    /// The report of a solved entry.
    pub fn report(&self) -> Option<&InstanceReport> {
        match self {
            BatchOutcome::Solved(report) => Some(report.as_ref()),
            BatchOutcome::Skipped { .. } => None,
        }
    }
}

/// Constructs routes for `instance`, replays them through the
/// [`RouteValidator`], and records the replayed totals on each route.
///
/// Partial coverage and validation findings are reported, not raised.
///
/// # Examples
///
/// ```
/// use u_spdtw::batch::solve_instance;
/// use u_spdtw::config::SolverConfig;
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::models::{Customer, Demand, Instance, TimeWindow, Variant, Vehicle};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 3.0, 4.0, Demand::new(30, 40).unwrap(), tw, 5.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(1, 100).unwrap()];
/// let instance = Instance::new("demo", Variant::Vrpspdtw, customers, vehicles, dm).unwrap();
///
/// let report = solve_instance(&instance, &SolverConfig::default()).unwrap();
/// assert!(report.is_valid());
/// assert!(report.coverage.is_complete());
/// assert!((report.solution.total_distance() - 10.0).abs() < 1e-10);
/// ```
#[instrument(level = "info", skip_all, fields(instance = instance.name()))]
pub fn solve_instance(instance: &Instance, config: &SolverConfig) -> Result<InstanceReport> {
    let Construction {
        mut solution,
        passes,
        termination,
    } = construct(instance, config)?;

    let validator = RouteValidator::new(instance, config);
    let check = validator.validate_solution(&solution)?;
    for (route, replay) in solution.routes_mut().iter_mut().zip(&check.routes) {
        route.set_totals(replay.distance, replay.duration);
    }
    for failure in &check.failures {
        warn!(%failure, "validation failure");
    }

    let coverage = solution.coverage();
    info!(
        routes = solution.num_used_routes(),
        %coverage,
        distance = solution.total_distance(),
        "instance solved"
    );

    Ok(InstanceReport {
        name: instance.name().to_string(),
        variant: instance.variant(),
        solution,
        coverage,
        termination,
        passes,
        failures: check.failures,
    })
}

/// Solves a batch of instances in parallel.
///
/// Entries are typically the results of reading input files: an entry that
/// failed to load, or an instance that fails with a non-fatal error such as
/// [`RoutingError::UnknownEdge`], becomes [`BatchOutcome::Skipped`]. Outcomes
/// keep input order.
///
/// # Errors
///
/// [`RoutingError::InvalidConfig`] before any instance runs, or the first
/// fatal error (see [`RoutingError::is_fatal`]) raised by any instance, which
/// aborts the run.
#[instrument(level = "info", skip_all, fields(instances = inputs.len()))]
pub fn solve_batch(inputs: Vec<Result<Instance>>, config: &SolverConfig) -> Result<Vec<BatchOutcome>> {
    config.validate()?;

    inputs
        .into_par_iter()
        .enumerate()
        .map(|(index, input)| {
            let instance = match input {
                Ok(instance) => instance,
                Err(error) => {
                    warn!(index, %error, "skipping unreadable instance");
                    return Ok(BatchOutcome::Skipped { index, error });
                }
            };
            match solve_instance(&instance, config) {
                Ok(report) => Ok(BatchOutcome::Solved(Box::new(report))),
                Err(error) if error.is_fatal() => Err(error),
                Err(error) => {
                    warn!(index, instance = instance.name(), %error, "skipping instance");
                    Ok(BatchOutcome::Skipped { index, error })
                }
            }
        })
        .collect()
}
