//! Coupon planning: chaos scoring, budget selection, and per-strategy
//! optimization for a race card.

pub mod chaos;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::CouponSettings;
use crate::optimizer::{CouponPlan, Optimizer, Policy};
use crate::source::CardSource;
use crate::types::RaceCard;
use chaos::{ChaosGauge, ChaosReading};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// A named coupon style: a budget for calm and chaotic cards plus the
/// selection policy.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponStrategy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub calm_budget: f64,
    pub chaos_budget: f64,
    pub policy: Policy,
}

impl CouponStrategy {
    /// Favourite-led coupon; spends less when the card looks chaotic.
    pub fn logic() -> Self {
        Self {
            id: "LOGIC".to_string(),
            name: "Logic coupon".to_string(),
            description: "Model-led, favourite focused".to_string(),
            calm_budget: 1000.0,
            chaos_budget: 500.0,
            policy: Policy::standard(),
        }
    }

    /// Balanced coupon hunting surprises; spends more on chaotic cards.
    pub fn surprise() -> Self {
        Self {
            id: "SURPRISE".to_string(),
            name: "Surprise coupon".to_string(),
            description: "Favourites plus cover for upsets".to_string(),
            calm_budget: 500.0,
            chaos_budget: 1250.0,
            policy: Policy::balanced(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::logic(), Self::surprise()]
    }

    /// Budget for a card with the given chaos reading.
    pub fn budget_for(&self, chaos: &ChaosReading) -> f64 {
        if chaos.chaotic {
            self.chaos_budget
        } else {
            self.calm_budget
        }
    }
}

// ---------------------------------------------------------------------------
// Planner output
// ---------------------------------------------------------------------------

/// A planned coupon for one strategy on one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponTicket {
    pub strategy_id: String,
    pub strategy_name: String,
    pub venue: String,
    pub date: NaiveDate,
    /// Chaos reading of the card as planned (after exclusions).
    pub chaos: ChaosReading,
    /// Race numbers of the legs, in running order.
    pub races: Vec<u32>,
    pub plan: CouponPlan,
}

/// Record of every planning decision, including the ones that produced
/// no coupon and the reason why.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanRecord {
    /// Coupon within `budget × (1 + tolerance)`.
    Planned { strategy_id: String, total_cost: f64 },
    /// Coupon produced, but minimum coverage alone is over the limit.
    OverBudget {
        strategy_id: String,
        total_cost: f64,
        limit: f64,
    },
    /// Card could not be planned at all.
    Skipped { venue: String, reason: String },
    /// Optimizer rejected the strategy's parameters.
    Failed { strategy_id: String, reason: String },
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Runs every strategy over a card: exclusions → leg window → chaos
/// score → per-strategy budget → optimizer.
pub struct CouponPlanner {
    strategies: Vec<(CouponStrategy, Optimizer)>,
    gauge: ChaosGauge,
    settings: CouponSettings,
}

impl CouponPlanner {
    pub fn new(strategies: Vec<CouponStrategy>, gauge: ChaosGauge, settings: CouponSettings) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|s| {
                let optimizer = Optimizer::new(s.policy.clone());
                (s, optimizer)
            })
            .collect();
        Self {
            strategies,
            gauge,
            settings,
        }
    }

    pub fn settings(&self) -> &CouponSettings {
        &self.settings
    }

    pub fn strategies(&self) -> impl Iterator<Item = &CouponStrategy> {
        self.strategies.iter().map(|(s, _)| s)
    }

    /// Plan every strategy for a card with `excluded` runners scratched.
    ///
    /// Returns the coupons produced and a full decision log.
    pub fn plan_card(
        &self,
        card: &RaceCard,
        excluded: &[String],
    ) -> (Vec<CouponTicket>, Vec<PlanRecord>) {
        let mut tickets = Vec::new();
        let mut records = Vec::new();

        let card = card.without_runners(excluded);
        let races = match card.leg_races(self.settings.legs) {
            Ok(races) => races,
            Err(e) => {
                warn!(venue = %card.venue, reason = %e, "Card skipped");
                records.push(PlanRecord::Skipped {
                    venue: card.venue.clone(),
                    reason: e.to_string(),
                });
                return (tickets, records);
            }
        };
        let race_numbers: Vec<u32> = races.iter().map(|r| r.number).collect();
        let legs: Vec<_> = races.into_iter().map(|r| r.to_leg()).collect();
        let chaos = self.gauge.read(&card);

        info!(
            venue = %card.venue,
            date = %card.date,
            races = ?race_numbers,
            chaos = format!("{:.1}", chaos.score),
            chaotic = chaos.chaotic,
            "Planning card"
        );

        for (strategy, optimizer) in &self.strategies {
            let budget = strategy.budget_for(&chaos);
            let plan = match optimizer.optimize(
                &legs,
                budget,
                self.settings.unit_price,
                self.settings.tolerance,
            ) {
                Ok(plan) => plan,
                Err(e) => {
                    warn!(strategy = %strategy.id, error = %e, "Strategy failed");
                    records.push(PlanRecord::Failed {
                        strategy_id: strategy.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            records.push(if plan.over_budget {
                PlanRecord::OverBudget {
                    strategy_id: strategy.id.clone(),
                    total_cost: plan.total_cost,
                    limit: plan.limit,
                }
            } else {
                PlanRecord::Planned {
                    strategy_id: strategy.id.clone(),
                    total_cost: plan.total_cost,
                }
            });

            tickets.push(CouponTicket {
                strategy_id: strategy.id.clone(),
                strategy_name: strategy.name.clone(),
                venue: card.venue.clone(),
                date: card.date,
                chaos,
                races: race_numbers.clone(),
                plan,
            });
        }

        (tickets, records)
    }

    /// Load a card from `source` and plan it.
    pub fn plan_from(
        &self,
        source: &dyn CardSource,
        key: &str,
        excluded: &[String],
    ) -> Result<(RaceCard, Vec<CouponTicket>, Vec<PlanRecord>)> {
        let card = source.load(key)?;
        let (tickets, records) = self.plan_card(&card, excluded);
        Ok((card, tickets, records))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
