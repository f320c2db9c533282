//! Priority order in which unrouted customers are considered.

use std::cmp::Ordering;

use crate::models::Customer;

/// Orders customers tightest window first, then heaviest total demand, then
/// lowest id. The id tie-break makes the order total, so two runs over the
/// same input always see customers in the same sequence.
///
/// # Examples
///
/// ```
/// use u_spdtw::constructive::priority_order;
/// use u_spdtw::models::{Customer, Demand, TimeWindow};
///
/// let c = |id, due, qty| {
///     let tw = TimeWindow::new(0.0, due).unwrap();
///     Customer::new(id, 0.0, 0.0, Demand::delivery(qty).unwrap(), tw, 0.0).unwrap()
/// };
/// let customers = vec![c(1, 100.0, 50), c(2, 40.0, 80), c(3, 100.0, 90)];
/// let ids: Vec<usize> = priority_order(&customers).iter().map(|c| c.id()).collect();
/// assert_eq!(ids, vec![2, 3, 1]);
/// ```
pub fn priority_order(customers: &[Customer]) -> Vec<&Customer> {
    let mut order: Vec<&Customer> = customers.iter().filter(|c| !c.is_depot()).collect();
    order.sort_by(|a, b| compare(a, b));
    order
}

fn compare(a: &Customer, b: &Customer) -> Ordering {
    a.time_window()
        .width()
        .total_cmp(&b.time_window().width())
        .then_with(|| b.demand().total().cmp(&a.demand().total()))
        .then_with(|| a.id().cmp(&b.id()))
}
