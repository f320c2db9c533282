//! Greedy route construction with time-window relaxation.
//!
//! # Algorithm
//!
//! Every vehicle starts at the depot. Customers are considered in
//! [`priority_order`] and committed one at a time through
//! [`assign`](crate::evaluation::assign), so no route can ever hold an
//! infeasible visit. A *pass* repeats greedy rounds at a fixed time-window
//! tolerance until a round admits nothing.
//!
//! Pass 0 is strict. While customers remain, relaxation pass `k` retries
//! with tolerance `initial_tolerance × growth_factor^(k−1)`. The final
//! relaxation pass ends with a last-resort round that skips scoring and
//! offers each leftover customer to the vehicle with the most room, at one
//! further growth step of tolerance. Capacity is never relaxed: the offer
//! still goes through [`can_serve`].
//!
//! # Complexity
//!
//! O(p · r · n · m) where p = passes, r = rounds per pass, n = customers and
//! m = vehicles.

use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::config::{SolverConfig, Strategy};
use crate::distance::TravelProvider;
use crate::error::Result;
use crate::evaluation::{assign, can_serve, Admission};
use crate::models::{AssignedSet, Customer, Instance, Solution, Variant, VehicleState};

use super::{priority_order, score};

/// What one pass did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    /// Pass index; 0 is the strict pass.
    pub pass: usize,
    /// Time-window tolerance used.
    pub tolerance: f64,
    /// Greedy rounds run, including the final round that admitted nothing.
    pub rounds: usize,
    /// Customers admitted by the greedy rounds.
    pub admitted: usize,
    /// Customers admitted by the last-resort round, which runs at
    /// [`RelaxationSchedule::last_resort_tolerance`](crate::config::RelaxationSchedule::last_resort_tolerance).
    pub last_resort: usize,
}

/// Why construction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// Every routable customer is on a route.
    AllAssigned,
    /// The strict pass stalled and relaxation is disabled.
    NoProgress {
        /// Customers left over.
        remaining: usize,
    },
    /// Every relaxation pass stalled.
    RelaxationExhausted {
        /// Customers left over.
        remaining: usize,
    },
}

impl Termination {
    /// Number of customers left unassigned.
    pub fn remaining(&self) -> usize {
        match self {
            Termination::AllAssigned => 0,
            Termination::NoProgress { remaining } | Termination::RelaxationExhausted { remaining } => {
                *remaining
            }
        }
    }
}

/// Result of a construction run.
#[derive(Debug, Clone, Serialize)]
pub struct Construction {
    /// One route per vehicle plus the unassigned customers.
    pub solution: Solution,
    /// One report per pass that was run.
    pub passes: Vec<PassReport>,
    /// Terminal state.
    pub termination: Termination,
}

/// Builds routes for every vehicle of `instance`.
///
/// The run is deterministic: identical input and configuration yield
/// identical routes. Customers that no vehicle can serve, even after
/// relaxation, are reported in [`Solution::unassigned`] in ascending id
/// order; partial coverage is not an error.
///
/// # Errors
///
/// [`RoutingError::InvalidConfig`](crate::error::RoutingError::InvalidConfig)
/// for an out-of-range configuration, `UnknownEdge` when the travel provider
/// lacks a pair, and `InfeasibleAssignment` if a commit contradicts the
/// feasibility check.
///
/// # Examples
///
/// ```
/// use u_spdtw::config::SolverConfig;
/// use u_spdtw::constructive::{construct, Termination};
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::models::{Customer, Demand, Instance, TimeWindow, Variant, Vehicle};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 10.0, 0.0, Demand::delivery(50).unwrap(),
///         TimeWindow::new(0.0, 100.0).unwrap(), 0.0).unwrap(),
///     Customer::new(2, 20.0, 0.0, Demand::delivery(80).unwrap(),
///         TimeWindow::new(10.0, 50.0).unwrap(), 0.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let vehicles = vec![Vehicle::new(1, 200).unwrap()];
/// let instance = Instance::new("demo", Variant::Vrptw, customers, vehicles, dm).unwrap();
///
/// let result = construct(&instance, &SolverConfig::default()).unwrap();
/// assert_eq!(result.termination, Termination::AllAssigned);
/// assert_eq!(result.solution.to_string(), "Route 1: 0 2 1 0\n");
/// ```
#[instrument(level = "info", skip_all, fields(instance = instance.name(), variant = %instance.variant()))]
pub fn construct(instance: &Instance, config: &SolverConfig) -> Result<Construction> {
    config.validate()?;

    let variant = instance.variant();
    let mut run = Run {
        variant,
        travel: instance.travel(),
        config,
        order: priority_order(instance.routable()),
        states: instance
            .vehicles()
            .iter()
            .map(|v| VehicleState::start(v, variant, config.vrptw_initial_load))
            .collect(),
        assigned: AssignedSet::new(instance.max_node_id()),
    };

    let schedule = &config.relaxation;
    let mut passes = Vec::new();
    for pass in 0..=schedule.passes {
        if run.remaining() == 0 {
            break;
        }
        let tolerance = schedule.tolerance(pass);
        let mut report = PassReport {
            pass,
            tolerance,
            rounds: 0,
            admitted: 0,
            last_resort: 0,
        };

        loop {
            let admitted = match config.strategy {
                Strategy::VehicleSweep => run.sweep_round(tolerance)?,
                Strategy::CustomerScan => run.scan_round(tolerance)?,
            };
            report.rounds += 1;
            report.admitted += admitted;
            if admitted == 0 || run.remaining() == 0 {
                break;
            }
        }

        if pass == schedule.passes && run.remaining() > 0 {
            if let Some(widened) = schedule.last_resort_tolerance() {
                report.last_resort = run.last_resort_round(widened)?;
            }
        }

        debug!(
            pass,
            tolerance,
            rounds = report.rounds,
            admitted = report.admitted,
            last_resort = report.last_resort,
            remaining = run.remaining(),
            "pass finished"
        );
        passes.push(report);
    }

    let remaining = run.remaining();
    let termination = if remaining == 0 {
        Termination::AllAssigned
    } else if schedule.passes == 0 {
        Termination::NoProgress { remaining }
    } else {
        Termination::RelaxationExhausted { remaining }
    };

    let solution = run.finish();
    if remaining > 0 {
        warn!(coverage = %solution.coverage(), "partial coverage");
    }

    Ok(Construction {
        solution,
        passes,
        termination,
    })
}

/// Mutable state of one construction run.
struct Run<'a> {
    variant: Variant,
    travel: &'a dyn TravelProvider,
    config: &'a SolverConfig,
    order: Vec<&'a Customer>,
    states: Vec<VehicleState>,
    assigned: AssignedSet,
}

impl<'a> Run<'a> {
    fn remaining(&self) -> usize {
        self.order.len() - self.assigned.len()
    }

    /// Scores `customer` on vehicle `v`, or `None` if it is rejected.
    fn evaluate(&self, v: usize, customer: &Customer, tolerance: f64) -> Result<Option<f64>> {
        let state = &self.states[v];
        match can_serve(state, customer, self.variant, self.travel, tolerance)? {
            Admission::Feasible(probe) => Ok(Some(score(
                state,
                customer,
                &probe,
                tolerance,
                &self.config.weights,
            ))),
            Admission::Infeasible(rejection) => {
                trace!(
                    vehicle = state.vehicle_id(),
                    customer = customer.id(),
                    %rejection,
                    "rejected"
                );
                Ok(None)
            }
        }
    }

    fn commit(&mut self, v: usize, customer: &Customer, tolerance: f64) -> Result<()> {
        assign(
            &mut self.states[v],
            customer,
            self.variant,
            self.travel,
            tolerance,
            &mut self.assigned,
        )?;
        Ok(())
    }

    /// Each unassigned customer, in priority order, takes its best vehicle.
    fn scan_round(&mut self, tolerance: f64) -> Result<usize> {
        let mut admitted = 0;
        for rank in 0..self.order.len() {
            let customer = self.order[rank];
            if self.assigned.contains(customer.id()) {
                continue;
            }

            let mut best: Option<(f64, usize)> = None;
            for v in 0..self.states.len() {
                if let Some(s) = self.evaluate(v, customer, tolerance)? {
                    // strict < keeps the lowest vehicle index on equal scores
                    if best.map_or(true, |(b, _)| s < b) {
                        best = Some((s, v));
                    }
                }
            }

            if let Some((_, v)) = best {
                self.commit(v, customer, tolerance)?;
                admitted += 1;
            }
        }
        Ok(admitted)
    }

    /// Each vehicle, in fleet order, takes its best unassigned customer.
    fn sweep_round(&mut self, tolerance: f64) -> Result<usize> {
        let mut admitted = 0;
        for v in 0..self.states.len() {
            let mut best: Option<(f64, usize)> = None;
            for rank in 0..self.order.len() {
                let customer = self.order[rank];
                if self.assigned.contains(customer.id()) {
                    continue;
                }
                if let Some(s) = self.evaluate(v, customer, tolerance)? {
                    if best.map_or(true, |(b, _)| s < b) {
                        best = Some((s, rank));
                    }
                }
            }

            if let Some((_, rank)) = best {
                let customer = self.order[rank];
                self.commit(v, customer, tolerance)?;
                admitted += 1;
            }
        }
        Ok(admitted)
    }

    /// Offers each leftover customer to the vehicle with the most room at
    /// the widened `tolerance`, ignoring the score.
    fn last_resort_round(&mut self, tolerance: f64) -> Result<usize> {
        let mut admitted = 0;
        for rank in 0..self.order.len() {
            let customer = self.order[rank];
            if self.assigned.contains(customer.id()) {
                continue;
            }
            let Some(v) = self.roomiest() else {
                break;
            };
            let state = &self.states[v];
            let admission = can_serve(state, customer, self.variant, self.travel, tolerance)?;
            if admission.is_feasible() {
                self.commit(v, customer, tolerance)?;
                admitted += 1;
            }
        }
        Ok(admitted)
    }

    /// Vehicle with the most room, lowest index on ties. A preloaded vehicle's
    /// room is the stock it still carries; otherwise it is free capacity.
    fn roomiest(&self) -> Option<usize> {
        let room = |s: &VehicleState| {
            if s.start_load() > 0 {
                s.load()
            } else {
                s.remaining()
            }
        };
        let mut best: Option<(i32, usize)> = None;
        for (v, state) in self.states.iter().enumerate() {
            let r = room(state);
            if best.map_or(true, |(b, _)| r > b) {
                best = Some((r, v));
            }
        }
        best.map(|(_, v)| v)
    }

    fn finish(self) -> Solution {
        let mut solution = Solution::new(self.order.len());
        let mut unassigned: Vec<usize> = self
            .order
            .iter()
            .map(|c| c.id())
            .filter(|id| !self.assigned.contains(*id))
            .collect();
        unassigned.sort_unstable();
        for state in self.states {
            solution.add_route(state.finish());
        }
        for id in unassigned {
            solution.add_unassigned(id);
        }
        solution
    }
}
