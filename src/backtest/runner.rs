//! Historical backtesting engine.
//!
//! Replays resolved race cards through the planner and scores every
//! coupon against the actual winners: coupons won, hit rate, stake, and
//! how often each leg position was covered.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::report::money;
use crate::strategy::{CouponPlanner, CouponTicket};
use crate::types::RaceCard;

// ---------------------------------------------------------------------------
// Historical data
// ---------------------------------------------------------------------------

/// A card whose races have been run: race number → winning runner id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCard {
    pub card: RaceCard,
    pub winners: BTreeMap<u32, String>,
}

/// How one coupon fared against the results.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponOutcome {
    /// Per leg: did the selection contain the winner. A race with no
    /// recorded winner counts as a miss.
    pub leg_hits: Vec<bool>,
    pub legs_hit: usize,
    /// Every leg hit.
    pub won: bool,
}

impl CouponOutcome {
    pub fn evaluate(ticket: &CouponTicket, winners: &BTreeMap<u32, String>) -> Self {
        let leg_hits: Vec<bool> = ticket
            .plan
            .legs
            .iter()
            .zip(&ticket.races)
            .map(|(leg, race)| {
                winners
                    .get(race)
                    .is_some_and(|winner| leg.selected.iter().any(|c| &c.id == winner))
            })
            .collect();
        let legs_hit = leg_hits.iter().filter(|&&h| h).count();
        let won = !leg_hits.is_empty() && legs_hit == leg_hits.len();
        Self {
            leg_hits,
            legs_hit,
            won,
        }
    }
}

// ---------------------------------------------------------------------------
// Backtest results
// ---------------------------------------------------------------------------

/// Aggregate results for one strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyStats {
    pub coupons: usize,
    pub wins: usize,
    pub total_staked: Decimal,
    pub over_budget: usize,
    legs_hit_total: usize,
    leg_hits: Vec<usize>,
}

impl StrategyStats {
    fn record(&mut self, ticket: &CouponTicket, outcome: &CouponOutcome) {
        self.coupons += 1;
        if outcome.won {
            self.wins += 1;
        }
        if ticket.plan.over_budget {
            self.over_budget += 1;
        }
        self.total_staked += money(ticket.plan.total_cost);
        self.legs_hit_total += outcome.legs_hit;
        if self.leg_hits.len() < outcome.leg_hits.len() {
            self.leg_hits.resize(outcome.leg_hits.len(), 0);
        }
        for (slot, hit) in self.leg_hits.iter_mut().zip(&outcome.leg_hits) {
            if *hit {
                *slot += 1;
            }
        }
    }

    /// Fraction of coupons that hit every leg.
    pub fn hit_rate(&self) -> f64 {
        if self.coupons == 0 {
            0.0
        } else {
            self.wins as f64 / self.coupons as f64
        }
    }

    /// Average number of legs covered per coupon.
    pub fn mean_legs_hit(&self) -> f64 {
        if self.coupons == 0 {
            0.0
        } else {
            self.legs_hit_total as f64 / self.coupons as f64
        }
    }

    /// Per leg position, the fraction of coupons whose selection held the winner.
    pub fn leg_hit_rates(&self) -> Vec<f64> {
        self.leg_hits
            .iter()
            .map(|&h| {
                if self.coupons == 0 {
                    0.0
                } else {
                    h as f64 / self.coupons as f64
                }
            })
            .collect()
    }
}

/// Complete backtest report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestReport {
    pub cards_played: usize,
    pub cards_skipped: usize,
    /// Keyed by strategy id.
    pub strategies: BTreeMap<String, StrategyStats>,
}

// ---------------------------------------------------------------------------
// Backtester
// ---------------------------------------------------------------------------

pub struct Backtester {
    planner: CouponPlanner,
}

impl Backtester {
    pub fn new(planner: CouponPlanner) -> Self {
        Self { planner }
    }

    /// Run a backtest over resolved cards, in the order given.
    pub fn run(&self, cards: &[ResolvedCard]) -> BacktestReport {
        let mut report = BacktestReport::default();

        for resolved in cards {
            let (tickets, _) = self.planner.plan_card(&resolved.card, &[]);
            if tickets.is_empty() {
                report.cards_skipped += 1;
                continue;
            }
            report.cards_played += 1;

            for ticket in &tickets {
                let outcome = CouponOutcome::evaluate(ticket, &resolved.winners);
                debug!(
                    venue = %ticket.venue,
                    date = %ticket.date,
                    strategy = %ticket.strategy_id,
                    legs_hit = outcome.legs_hit,
                    won = outcome.won,
                    "Coupon settled"
                );
                report
                    .strategies
                    .entry(ticket.strategy_id.clone())
                    .or_default()
                    .record(ticket, &outcome);
            }
        }

        for (id, stats) in &report.strategies {
            info!(
                strategy = %id,
                coupons = stats.coupons,
                wins = stats.wins,
                hit_rate = format!("{:.1}%", stats.hit_rate() * 100.0),
                staked = %stats.total_staked,
                mean_legs_hit = format!("{:.2}", stats.mean_legs_hit()),
                "Backtest strategy summary"
            );
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
