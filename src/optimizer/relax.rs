//! Constraint relaxation.
//!
//! Lowers per-leg minimums until the minimum coupon (every leg at its
//! `min_count`) fits the limit, either widest legs first (`relax`) or
//! weakest tail runner first (`trim_weakest`). Never goes below one
//! selection per leg, so it may give up over budget.

use tracing::{debug, warn};

use super::cost;
use crate::types::{Leg, LegConstraint};

/// Minimums are cut in tiers: first legs above 2, then legs above 1.
const RELAX_FLOORS: [usize; 2] = [2, 1];

/// Result of a relaxation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxOutcome {
    /// Number of single-step minimum reductions applied.
    pub reductions: usize,
    /// Whether the minimum coupon now fits the limit.
    pub feasible: bool,
}

fn min_counts(constraints: &[LegConstraint]) -> Vec<usize> {
    constraints.iter().map(|c| c.min_count).collect()
}

/// Cost of the coupon with every leg at its minimum.
pub fn minimum_cost(constraints: &[LegConstraint], unit_price: f64) -> f64 {
    cost::cost(&min_counts(constraints), unit_price)
}

/// Next leg (scanning round-robin from `cursor`) whose minimum is above
/// `floor`.
fn next_reducible(constraints: &[LegConstraint], floor: usize, cursor: usize) -> Option<usize> {
    let n = constraints.len();
    (0..n)
        .map(|offset| (cursor + offset) % n)
        .find(|&i| constraints[i].min_count > floor)
}

/// Reduce minimums until `unit_price × Π min_count <= limit` or nothing is
/// left to reduce.
pub fn relax(constraints: &mut [LegConstraint], limit: f64, unit_price: f64) -> RelaxOutcome {
    let mut reductions = 0;
    let mut cursor = 0;

    for floor in RELAX_FLOORS {
        while minimum_cost(constraints, unit_price) > limit {
            let Some(i) = next_reducible(constraints, floor, cursor) else {
                break;
            };
            constraints[i].min_count -= 1;
            reductions += 1;
            cursor = i + 1;
            debug!(
                leg = i,
                min_count = constraints[i].min_count,
                cost = format!("{:.2}", minimum_cost(constraints, unit_price)),
                "Minimum relaxed"
            );
        }
    }

    finish(constraints, limit, unit_price, reductions)
}

/// Leg whose last minimum runner scores lowest, among legs above one.
/// Ties go to the earliest leg.
fn weakest_tail(legs: &[Leg], constraints: &[LegConstraint]) -> Option<usize> {
    let mut weakest: Option<(usize, f64)> = None;
    for (i, (leg, constraint)) in legs.iter().zip(constraints).enumerate() {
        if constraint.min_count <= 1 {
            continue;
        }
        let Some(tail) = leg.candidates().get(constraint.min_count - 1) else {
            continue;
        };
        if weakest.map_or(true, |(_, score)| tail.score < score) {
            weakest = Some((i, tail.score));
        }
    }
    weakest.map(|(i, _)| i)
}

/// Drop the weakest tail runner across all legs, one at a time, until
/// `unit_price × Π min_count <= limit` or every leg is down to one.
pub fn trim_weakest(
    legs: &[Leg],
    constraints: &mut [LegConstraint],
    limit: f64,
    unit_price: f64,
) -> RelaxOutcome {
    let mut reductions = 0;

    while minimum_cost(constraints, unit_price) > limit {
        let Some(i) = weakest_tail(legs, constraints) else {
            break;
        };
        constraints[i].min_count -= 1;
        reductions += 1;
        debug!(
            leg = i,
            min_count = constraints[i].min_count,
            cost = format!("{:.2}", minimum_cost(constraints, unit_price)),
            "Weakest runner trimmed"
        );
    }

    finish(constraints, limit, unit_price, reductions)
}

fn finish(
    constraints: &[LegConstraint],
    limit: f64,
    unit_price: f64,
    reductions: usize,
) -> RelaxOutcome {
    let min_cost = minimum_cost(constraints, unit_price);
    let feasible = min_cost <= limit;
    if !feasible {
        warn!(
            min_cost = format!("{:.2}", min_cost),
            limit = format!("{:.2}", limit),
            reductions,
            "Minimum coupon still over limit after relaxation"
        );
    }

    RelaxOutcome {
        reductions,
        feasible,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
