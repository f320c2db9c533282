//! Admission score of a feasible (vehicle, customer) pair.

use crate::config::ScoreWeights;
use crate::evaluation::Probe;
use crate::models::{Customer, VehicleState};

/// Scores committing `customer` to `state` as simulated by `probe`.
///
/// Lower is better. The score adds four terms:
///
/// - the travel time to the customer
/// - idle waiting before the window opens, times `weights.waiting`
/// - lateness risk: `weights.lateness × (service_start − due) / (1 + tolerance)`
///   when the visit only fits thanks to relaxation, otherwise
///   `weights.urgency / (due − service_start + 1)`, so customers close to
///   their deadline are favoured
/// - under-utilization, `weights.utilization × (1 − utilization)` measured
///   after the visit
///
/// # Examples
///
/// ```
/// use u_spdtw::config::{InitialLoad, ScoreWeights};
/// use u_spdtw::constructive::score;
/// use u_spdtw::distance::DistanceMatrix;
/// use u_spdtw::evaluation::can_serve;
/// use u_spdtw::models::{Customer, Demand, TimeWindow, Variant, Vehicle, VehicleState};
///
/// let tw = TimeWindow::new(0.0, 100.0).unwrap();
/// let customers = vec![
///     Customer::depot(0.0, 0.0, 1000.0).unwrap(),
///     Customer::new(1, 10.0, 0.0, Demand::pickup(50).unwrap(), tw, 0.0).unwrap(),
/// ];
/// let dm = DistanceMatrix::from_customers(&customers);
/// let state = VehicleState::start(&Vehicle::new(1, 100).unwrap(), Variant::Pdptw, InitialLoad::Full);
/// let admission = can_serve(&state, &customers[1], Variant::Pdptw, &dm, 0.0).unwrap();
///
/// let s = score(&state, &customers[1], admission.probe().unwrap(), 0.0, &ScoreWeights::default());
/// // 10 travel + 10 / 91 urgency + 5 × 0.5 under-utilization
/// assert!((s - (10.0 + 10.0 / 91.0 + 2.5)).abs() < 1e-9);
/// ```
pub fn score(
    state: &VehicleState,
    customer: &Customer,
    probe: &Probe,
    tolerance: f64,
    weights: &ScoreWeights,
) -> f64 {
    let due = customer.time_window().due();
    let lateness_risk = if probe.service_start > due {
        weights.lateness * (probe.service_start - due) / (1.0 + tolerance)
    } else {
        weights.urgency / (due - probe.service_start + 1.0)
    };

    let used = f64::from((probe.load_after - state.start_load()).abs());
    let utilization = (used / f64::from(state.capacity())).min(1.0);

    probe.travel_time
        + weights.waiting * probe.waiting
        + lateness_risk
        + weights.utilization * (1.0 - utilization)
}
