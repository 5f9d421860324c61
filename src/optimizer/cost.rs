//! Coupon cost model.
//!
//! `cost = unit_price × Π count_i`. Counts multiply as integers; the unit
//! price is applied once at the end so long coupons don't drift.

/// Default price of one combination.
pub const DEFAULT_UNIT_PRICE: f64 = 1.25;

/// Multiplicative factor a leg contributes. A leg with nothing selected
/// (only possible for an empty field) is a single free option, never 0.
pub fn leg_factor(count: usize) -> u64 {
    count.max(1) as u64
}

/// Number of combinations on the coupon, or `None` on overflow.
///
/// A coupon where no leg has a selection (including a coupon with no legs)
/// has no combinations to play.
pub fn combinations(counts: &[usize]) -> Option<u64> {
    if counts.iter().all(|&c| c == 0) {
        return Some(0);
    }
    counts
        .iter()
        .try_fold(1u64, |acc, &c| acc.checked_mul(leg_factor(c)))
}

/// Combinations if leg `leg` grew by one selection.
pub fn grown_combinations(counts: &[usize], leg: usize) -> Option<u64> {
    counts
        .iter()
        .enumerate()
        .try_fold(1u64, |acc, (i, &c)| {
            let c = if i == leg { c + 1 } else { c };
            acc.checked_mul(leg_factor(c))
        })
}

/// Monetary cost of a combination count. Overflowed counts cost infinity.
pub fn price(combinations: Option<u64>, unit_price: f64) -> f64 {
    match combinations {
        Some(n) => n as f64 * unit_price,
        None => f64::INFINITY,
    }
}

/// Monetary cost of a selection given as per-leg counts.
pub fn cost(counts: &[usize], unit_price: f64) -> f64 {
    price(combinations(counts), unit_price)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
