//! Coupon optimizer: leg classification, minimum relaxation, greedy
//! expansion, and costing.
//!
//! Given ranked legs and a budget, chooses how many runners to take from
//! the top of each leg so the coupon's total cost (which multiplies across
//! legs) stays within `budget × (1 + tolerance)` while covering as much
//! as possible. Pure and deterministic: no I/O, no clock, no shared state,
//! so it is safe to call from any number of threads at once.

pub mod classify;
pub mod cost;
pub mod expand;
pub mod policy;
pub mod relax;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{Candidate, CouponError, Leg, LegConstraint};
pub use cost::DEFAULT_UNIT_PRICE;
pub use policy::{CoverageBoost, Policy, RelaxOrder};

/// Default overshoot allowed on the nominal budget.
pub const DEFAULT_TOLERANCE: f64 = 0.15;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Selection for one leg: always the top `selected.len()` runners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSelection {
    pub constraint: LegConstraint,
    pub selected: Vec<Candidate>,
}

impl LegSelection {
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    /// Single-runner leg (a "banker").
    pub fn is_banker(&self) -> bool {
        self.selected.len() == 1
    }
}

/// Final coupon: per-leg selections and what it costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponPlan {
    pub legs: Vec<LegSelection>,
    pub combinations: u64,
    pub total_cost: f64,
    pub budget: f64,
    /// `budget × (1 + tolerance)`.
    pub limit: f64,
    /// Minimum coverage could not be brought under the limit.
    pub over_budget: bool,
    /// Number of minimum reductions the relaxer applied.
    pub relaxations: usize,
}

impl CouponPlan {
    fn empty(budget: f64, limit: f64) -> Self {
        Self {
            legs: Vec::new(),
            combinations: 0,
            total_cost: 0.0,
            budget,
            limit,
            over_budget: false,
            relaxations: 0,
        }
    }

    /// Selected runners per leg, in leg order.
    pub fn selection(&self) -> Vec<&[Candidate]> {
        self.legs.iter().map(|l| l.selected.as_slice()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.legs.iter().map(LegSelection::count).collect()
    }

    /// Total runners across all legs.
    pub fn total_selected(&self) -> usize {
        self.legs.iter().map(LegSelection::count).sum()
    }
}

// ---------------------------------------------------------------------------
// Optimizer
// ---------------------------------------------------------------------------

fn validate(budget: f64, unit_price: f64, tolerance: f64) -> Result<(), CouponError> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(CouponError::InvalidBudget(budget));
    }
    if !unit_price.is_finite() || unit_price <= 0.0 {
        return Err(CouponError::InvalidUnitPrice(unit_price));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(CouponError::InvalidTolerance(tolerance));
    }
    Ok(())
}

/// Budget-constrained multi-leg selection under a fixed `Policy`.
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    policy: Policy,
}

impl Optimizer {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Build a coupon for `legs` within `budget × (1 + tolerance)`.
    ///
    /// Steps:
    /// 1. Classify every leg into a tier with min/max selection bounds.
    /// 2. Relax minimums in the policy's `RelaxOrder` if the minimum
    ///    coupon is over the relaxation limit. Giving up over the limit is
    ///    not an error: the plan comes back with `over_budget` set.
    /// 3. Greedily add the best next runner across legs while affordable.
    ///
    /// A policy's own `relax_tolerance`/`expand_tolerance` replace
    /// `tolerance` for that phase. Each leg must already be sorted by
    /// descending score; see `Leg`.
    pub fn optimize(
        &self,
        legs: &[Leg],
        budget: f64,
        unit_price: f64,
        tolerance: f64,
    ) -> Result<CouponPlan, CouponError> {
        validate(budget, unit_price, tolerance)?;
        self.policy.validate()?;
        let limit = budget * (1.0 + self.policy.expand_tolerance.unwrap_or(tolerance));
        let relax_limit = budget * (1.0 + self.policy.relax_tolerance.unwrap_or(tolerance));

        if legs.is_empty() {
            return Ok(CouponPlan::empty(budget, limit));
        }

        // Step 1 – classification
        let mut constraints: Vec<LegConstraint> = legs
            .iter()
            .map(|leg| classify::classify(leg, &self.policy))
            .collect();

        // Step 2 – relaxation
        let relaxations = match self.policy.relax {
            RelaxOrder::Off => 0,
            RelaxOrder::Tiered => relax::relax(&mut constraints, relax_limit, unit_price).reductions,
            RelaxOrder::WeakestTail => {
                relax::trim_weakest(legs, &mut constraints, relax_limit, unit_price).reductions
            }
        };

        // Step 3 – greedy expansion from the minimum coupon
        let mut counts: Vec<usize> = constraints.iter().map(|c| c.min_count).collect();
        let moves = expand::expand(
            legs,
            &constraints,
            &mut counts,
            &self.policy,
            limit,
            unit_price,
        );

        // Step 4 – costing
        let combinations = cost::combinations(&counts);
        let total_cost = cost::price(combinations, unit_price);
        let over_budget = total_cost > limit;

        let selections = legs
            .iter()
            .zip(&constraints)
            .zip(&counts)
            .map(|((leg, constraint), &count)| LegSelection {
                constraint: *constraint,
                selected: leg.prefix(count).to_vec(),
            })
            .collect();

        if over_budget {
            warn!(
                total_cost = format!("{:.2}", total_cost),
                limit = format!("{:.2}", limit),
                relaxations,
                "Coupon over budget at minimum coverage"
            );
        }

        info!(
            legs = legs.len(),
            counts = ?counts,
            expansions = moves.len(),
            relaxations,
            total_cost = format!("{:.2}", total_cost),
            budget = format!("{:.2}", budget),
            "Coupon optimized"
        );

        Ok(CouponPlan {
            legs: selections,
            combinations: combinations.unwrap_or(u64::MAX),
            total_cost,
            budget,
            limit,
            over_budget,
            relaxations,
        })
    }
}

/// Optimize with the standard policy.
pub fn optimize(
    legs: &[Leg],
    budget: f64,
    unit_price: f64,
    tolerance: f64,
) -> Result<CouponPlan, CouponError> {
    Optimizer::default().optimize(legs, budget, unit_price, tolerance)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
