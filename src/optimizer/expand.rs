//! Greedy expansion.
//!
//! Starting from the relaxed minimum coupon, repeatedly adds the single
//! best next runner across all legs while the coupon stays within the
//! limit. Each leg only ever grows by its next-ranked runner, so every
//! selection stays a prefix of its leg.

use tracing::debug;

use super::cost;
use super::policy::Policy;
use crate::types::{Leg, LegConstraint};

/// One accepted growth step.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub leg: usize,
    pub candidate_id: String,
    pub gain: f64,
    pub cost_after: f64,
}

/// Best affordable move for the current counts, if any.
///
/// Ties go to the earliest leg.
fn best_move(
    legs: &[Leg],
    constraints: &[LegConstraint],
    counts: &[usize],
    policy: &Policy,
    limit: f64,
    unit_price: f64,
) -> Option<(usize, f64, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;

    for (i, (leg, constraint)) in legs.iter().zip(constraints).enumerate() {
        let count = counts[i];
        if count >= constraint.max_count || count >= leg.field_size() {
            continue;
        }

        let new_cost = cost::price(cost::grown_combinations(counts, i), unit_price);
        if new_cost > limit {
            continue;
        }

        let next = &leg.candidates()[count];
        let gain = next.score * policy.boost(constraint.difficulty, count);

        if best.map_or(true, |(_, best_gain, _)| gain > best_gain) {
            best = Some((i, gain, new_cost));
        }
    }

    best
}

/// Grow `counts` in place until no leg can take another runner within
/// `limit`. Returns the moves in the order they were applied.
pub fn expand(
    legs: &[Leg],
    constraints: &[LegConstraint],
    counts: &mut [usize],
    policy: &Policy,
    limit: f64,
    unit_price: f64,
) -> Vec<Move> {
    let mut moves = Vec::new();

    while let Some((leg, gain, cost_after)) =
        best_move(legs, constraints, counts, policy, limit, unit_price)
    {
        let candidate_id = legs[leg].candidates()[counts[leg]].id.clone();
        counts[leg] += 1;

        debug!(
            leg,
            candidate = %candidate_id,
            gain = format!("{:.4}", gain),
            count = counts[leg],
            cost = format!("{:.2}", cost_after),
            "Leg expanded"
        );

        moves.push(Move {
            leg,
            candidate_id,
            gain,
            cost_after,
        });
    }

    moves
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
