//! Selection policy.
//!
//! Every threshold and weight the optimizer uses lives here, so the
//! different coupon styles are configuration rather than code forks.
//! Defaults are the empirically tuned constants of the standard coupon;
//! none of them has a derivation beyond backtesting.

use serde::{Deserialize, Serialize};

use crate::types::{CouponError, Difficulty};

// ---------------------------------------------------------------------------
// Coverage boost
// ---------------------------------------------------------------------------

/// Gain multiplier applied while a leg has fewer than `below` selections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageBoost {
    pub factor: f64,
    pub below: usize,
}

impl CoverageBoost {
    /// No boost at any coverage level.
    pub const NONE: CoverageBoost = CoverageBoost {
        factor: 1.0,
        below: 0,
    };

    /// Multiplier for a leg currently holding `count` selections.
    pub fn factor_at(&self, count: usize) -> f64 {
        if count < self.below {
            self.factor
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// Relaxation order
// ---------------------------------------------------------------------------

/// How minimums are lowered when the minimum coupon is unaffordable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxOrder {
    /// Keep minimums as classified, even over budget.
    Off,
    /// Cut legs above two, then legs above one, round-robin.
    Tiered,
    /// Drop the lowest-scored tail runner across all legs.
    WeakestTail,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Thresholds and weights for leg classification and expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// HARD needs at least this many runners...
    pub hard_min_field: usize,
    /// ...and a favourite scoring below this.
    pub hard_max_top_score: f64,
    /// EASY when the field is this small or smaller...
    pub easy_max_field: usize,
    /// ...or the favourite scores above this.
    pub easy_min_top_score: f64,
    /// Favourite above this always gets a single-runner minimum (banker)...
    pub monster_favorite: f64,
    /// ...unless the override is switched off.
    pub monster_override: bool,
    pub hard_min: usize,
    pub normal_min: usize,
    pub easy_min: usize,
    /// Upper bound on selections as a fraction of the field.
    pub max_field_ratio: f64,
    pub hard_boost: CoverageBoost,
    pub normal_boost: CoverageBoost,
    pub easy_boost: CoverageBoost,
    pub relax: RelaxOrder,
    /// Tolerance for the relaxation target; the coupon tolerance when unset.
    pub relax_tolerance: Option<f64>,
    /// Tolerance for expansion (and the plan's limit); the coupon tolerance
    /// when unset.
    pub expand_tolerance: Option<f64>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            hard_min_field: 12,
            hard_max_top_score: 0.35,
            easy_max_field: 7,
            easy_min_top_score: 0.60,
            monster_favorite: 0.85,
            monster_override: true,
            hard_min: 3,
            normal_min: 2,
            easy_min: 1,
            max_field_ratio: 0.6,
            hard_boost: CoverageBoost {
                factor: 2.0,
                below: 5,
            },
            normal_boost: CoverageBoost {
                factor: 1.2,
                below: 3,
            },
            easy_boost: CoverageBoost::NONE,
            relax: RelaxOrder::Tiered,
            relax_tolerance: None,
            expand_tolerance: None,
        }
    }
}

impl Policy {
    /// The standard favourite-led coupon.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Wider cover in chaotic legs: four-runner HARD minimum, half-field
    /// cap, a mild HARD boost, and no relaxation of minimums.
    pub fn wide() -> Self {
        Self {
            hard_min: 4,
            max_field_ratio: 0.5,
            hard_boost: CoverageBoost {
                factor: 1.2,
                below: 4,
            },
            normal_boost: CoverageBoost::NONE,
            relax: RelaxOrder::Off,
            ..Self::default()
        }
    }

    /// Two runners a leg to start, bankers included. Trims the weakest
    /// tail until the plain budget fits, then adds the highest raw score
    /// anywhere up to 5% over, with no field cap.
    pub fn balanced() -> Self {
        Self {
            hard_min: 2,
            normal_min: 2,
            easy_min: 2,
            monster_override: false,
            max_field_ratio: 1.0,
            hard_boost: CoverageBoost::NONE,
            normal_boost: CoverageBoost::NONE,
            easy_boost: CoverageBoost::NONE,
            relax: RelaxOrder::WeakestTail,
            relax_tolerance: Some(0.0),
            expand_tolerance: Some(0.05),
            ..Self::default()
        }
    }

    /// Look up a named preset (`standard` | `wide` | `balanced`,
    /// case-insensitive).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "logic" => Some(Self::standard()),
            "wide" | "smart" => Some(Self::wide()),
            "balanced" | "surprise" => Some(Self::balanced()),
            _ => None,
        }
    }

    /// Reject values that would make classification or expansion
    /// meaningless.
    pub fn validate(&self) -> Result<(), CouponError> {
        let invalid = |msg: String| Err(CouponError::InvalidPolicy(msg));

        for (name, value) in [
            ("hard_max_top_score", self.hard_max_top_score),
            ("easy_min_top_score", self.easy_min_top_score),
            ("monster_favorite", self.monster_favorite),
        ] {
            if !value.is_finite() {
                return invalid(format!("{name} must be finite, got {value}"));
            }
        }
        if !(self.max_field_ratio > 0.0 && self.max_field_ratio <= 1.0) {
            return invalid(format!(
                "max_field_ratio must be in (0, 1], got {}",
                self.max_field_ratio
            ));
        }
        for (name, min) in [
            ("hard_min", self.hard_min),
            ("normal_min", self.normal_min),
            ("easy_min", self.easy_min),
        ] {
            if min == 0 {
                return invalid(format!("{name} must be at least 1"));
            }
        }
        for (name, boost) in [
            ("hard_boost", self.hard_boost),
            ("normal_boost", self.normal_boost),
            ("easy_boost", self.easy_boost),
        ] {
            if !(boost.factor.is_finite() && boost.factor > 0.0) {
                return invalid(format!("{name}.factor must be positive, got {}", boost.factor));
            }
        }
        for (name, tolerance) in [
            ("relax_tolerance", self.relax_tolerance),
            ("expand_tolerance", self.expand_tolerance),
        ] {
            if let Some(t) = tolerance {
                if !(t.is_finite() && t >= 0.0) {
                    return invalid(format!("{name} must be a non-negative fraction, got {t}"));
                }
            }
        }
        Ok(())
    }

    /// Base minimum selection count for a tier.
    pub fn base_min(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy_min,
            Difficulty::Normal => self.normal_min,
            Difficulty::Hard => self.hard_min,
        }
    }

    /// Coverage-priority weight for a leg of `difficulty` holding `count`.
    pub fn boost(&self, difficulty: Difficulty, count: usize) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy_boost.factor_at(count),
            Difficulty::Normal => self.normal_boost.factor_at(count),
            Difficulty::Hard => self.hard_boost.factor_at(count),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
