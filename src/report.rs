//! Coupon reports.
//!
//! Renders planned coupons as a markdown sheet for people and as flat
//! `TicketRecord`s for publishing/persistence. Amounts in records are
//! rounded to cents as `Decimal` so downstream consumers never see float
//! noise like `52.500000001`.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::strategy::CouponTicket;
use crate::types::RaceCard;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One leg of a published coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRecord {
    pub race: u32,
    pub difficulty: String,
    pub runners: Vec<String>,
}

/// A coupon as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub strategy_id: String,
    pub venue: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub combinations: u64,
    pub over_budget: bool,
    pub legs: Vec<LegRecord>,
}

/// Round a float amount to currency precision.
pub fn money(amount: f64) -> Decimal {
    Decimal::from_f64(amount)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

impl From<&CouponTicket> for TicketRecord {
    fn from(ticket: &CouponTicket) -> Self {
        TicketRecord {
            strategy_id: ticket.strategy_id.clone(),
            venue: ticket.venue.clone(),
            date: ticket.date,
            amount: money(ticket.plan.total_cost),
            combinations: ticket.plan.combinations,
            over_budget: ticket.plan.over_budget,
            legs: ticket
                .plan
                .legs
                .iter()
                .zip(&ticket.races)
                .map(|(leg, race)| LegRecord {
                    race: *race,
                    difficulty: leg.constraint.difficulty.to_string(),
                    runners: leg.selected.iter().map(|c| c.id.clone()).collect(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

/// Leg line: `Leg 1 BANKER: A` or `Leg 2 (3 runners): A, B, C`.
fn leg_line(index: usize, runners: &[String]) -> String {
    match runners.len() {
        0 => format!("Leg {index} (no runners)"),
        1 => format!("Leg {index} BANKER: {}", runners[0]),
        n => format!("Leg {index} ({n} runners): {}", runners.join(", ")),
    }
}

/// Markdown section for one card and its coupons.
///
/// The chaos line comes from the tickets, i.e. the card as planned with
/// non-runners removed.
pub fn render_card(card: &RaceCard, tickets: &[CouponTicket]) -> String {
    let mut lines = Vec::new();
    let legs = tickets.first().map_or(0, |t| t.races.len());
    lines.push(format!("## {} pick-{legs} ({})", card.venue, card.date));
    if let Some(chaos) = tickets.first().map(|t| t.chaos) {
        lines.push(format!(
            "Chaos index: {:.1}{}",
            chaos.score,
            if chaos.chaotic { " (chaotic)" } else { "" }
        ));
    }
    lines.push(String::new());

    for ticket in tickets {
        let record = TicketRecord::from(ticket);
        lines.push(format!("### {}", ticket.strategy_name));
        lines.push(format!(
            "Amount: {:.2} ({} combinations){}",
            record.amount,
            record.combinations,
            if record.over_budget { " OVER BUDGET" } else { "" }
        ));
        lines.push("```".to_string());
        for (i, leg) in record.legs.iter().enumerate() {
            lines.push(leg_line(i + 1, &leg.runners));
        }
        lines.push("```".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
