//! Backtests over resolved cards.

use std::collections::BTreeMap;

use altili::backtest::{Backtester, ResolvedCard};
use altili::config::CouponSettings;
use altili::strategy::chaos::{ChaosConfig, ChaosGauge};
use altili::strategy::{CouponPlanner, CouponStrategy};
use rust_decimal::Decimal;

use crate::memory_source::sample_card;

fn make_backtester() -> Backtester {
    Backtester::new(CouponPlanner::new(
        CouponStrategy::defaults(),
        ChaosGauge::new(ChaosConfig::default()),
        CouponSettings::default(),
    ))
}

/// Winners for races `1..=races`; `R{n}-{pick(n)}` wins race `n`.
fn winners(races: u32, pick: impl Fn(u32) -> usize) -> BTreeMap<u32, String> {
    (1..=races).map(|n| (n, format!("R{n}-{}", pick(n)))).collect()
}

#[test]
fn favourites_and_an_upset() {
    let history = vec![
        ResolvedCard {
            card: sample_card("İzmir", 6, 10, 0.40),
            winners: winners(6, |_| 0),
        },
        // Bottom runner of the last race wins: outside any selection.
        ResolvedCard {
            card: sample_card("Bursa", 6, 10, 0.40),
            winners: winners(6, |n| if n == 6 { 9 } else { 0 }),
        },
        // Too short for a pick-six.
        ResolvedCard {
            card: sample_card("Ankara", 4, 10, 0.40),
            winners: winners(4, |_| 0),
        },
    ];

    let report = make_backtester().run(&history);
    assert_eq!(report.cards_played, 2);
    assert_eq!(report.cards_skipped, 1);
    assert_eq!(report.strategies.len(), 2);

    for id in ["LOGIC", "SURPRISE"] {
        let stats = &report.strategies[id];
        assert_eq!(stats.coupons, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.mean_legs_hit(), 5.5);
        let rates = stats.leg_hit_rates();
        assert_eq!(rates.len(), 6);
        assert_eq!(rates[0], 1.0);
        assert_eq!(rates[5], 0.5);
        assert!(stats.total_staked > Decimal::ZERO);
    }
}

#[test]
fn history_file_parses() {
    let card = sample_card("İzmir", 6, 8, 0.40);
    let history = vec![ResolvedCard {
        card,
        winners: winners(6, |_| 1),
    }];
    let json = serde_json::to_string(&history).unwrap();
    let parsed: Vec<ResolvedCard> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0].winners[&3], "R3-1");

    let report = make_backtester().run(&parsed);
    assert_eq!(report.cards_played, 1);
    assert_eq!(report.strategies["LOGIC"].wins, 1);
}
