//! Leg classification.
//!
//! Derives a difficulty tier and selection bounds for one leg from its
//! field size and the favourite's score.

use tracing::debug;

use super::policy::Policy;
use crate::types::{Difficulty, Leg, LegConstraint};

/// Classify a leg into a tier using the policy thresholds.
///
/// HARD wins over EASY: a big field with a weak favourite is hard even if
/// the field-size rule alone would call it easy.
pub fn difficulty(leg: &Leg, policy: &Policy) -> Difficulty {
    let field_size = leg.field_size();
    let top_score = leg.top_score();

    if field_size >= policy.hard_min_field && top_score < policy.hard_max_top_score {
        Difficulty::Hard
    } else if field_size <= policy.easy_max_field || top_score > policy.easy_min_top_score {
        Difficulty::Easy
    } else {
        Difficulty::Normal
    }
}

/// Compute the tier and `(min_count, max_count)` bounds for a leg.
///
/// An empty leg gets `0..=0`; the cost model counts it as a factor of 1.
pub fn classify(leg: &Leg, policy: &Policy) -> LegConstraint {
    let difficulty = difficulty(leg, policy);
    let field_size = leg.field_size();

    if field_size == 0 {
        return LegConstraint {
            difficulty,
            min_count: 0,
            max_count: 0,
        };
    }

    let mut min_count = policy.base_min(difficulty);
    if policy.monster_override && leg.top_score() > policy.monster_favorite {
        min_count = 1;
    }

    let ratio_cap = (field_size as f64 * policy.max_field_ratio).floor() as usize;
    let max_count = min_count.max(ratio_cap).min(field_size);
    let min_count = min_count.min(max_count);

    debug!(
        field_size,
        top_score = format!("{:.3}", leg.top_score()),
        difficulty = %difficulty,
        min_count,
        max_count,
        "Leg classified"
    );

    LegConstraint {
        difficulty,
        min_count,
        max_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
