//! Card → planner → report → sheet, end to end.

use altili::config::{AppConfig, CouponSettings};
use altili::report::{money, render_card, TicketRecord};
use altili::source::JsonCardSource;
use altili::storage;
use altili::strategy::chaos::{ChaosConfig, ChaosGauge};
use altili::strategy::{CouponPlanner, CouponStrategy, PlanRecord};

use crate::memory_source::{sample_card, MemoryCardSource};

fn make_planner() -> CouponPlanner {
    CouponPlanner::new(
        CouponStrategy::defaults(),
        ChaosGauge::new(ChaosConfig::default()),
        CouponSettings::default(),
    )
}

fn temp_path(ext: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("altili_it_{}.{ext}", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

#[test]
fn calm_card_planned_for_every_strategy() {
    let source = MemoryCardSource::new().with_card("izmir", sample_card("İzmir", 8, 10, 0.40));
    let planner = make_planner();
    let (_, tickets, records) = planner.plan_from(&source, "izmir", &[]).unwrap();

    assert!(!tickets[0].chaos.chaotic);
    assert_eq!(tickets.len(), 2);
    assert!(records
        .iter()
        .all(|r| matches!(r, PlanRecord::Planned { .. })));

    for ticket in &tickets {
        assert_eq!(ticket.races, vec![3, 4, 5, 6, 7, 8]);
        assert!(!ticket.plan.over_budget);
        assert!(ticket.plan.total_cost <= ticket.plan.limit);
        assert_eq!(
            ticket.plan.total_cost,
            ticket.plan.combinations as f64 * 1.25
        );
        // Selections are the top of each ranked race.
        for (leg, race) in ticket.plan.legs.iter().zip(&ticket.races) {
            let ids: Vec<&str> = leg.selected.iter().map(|c| c.id.as_str()).collect();
            let expected: Vec<String> = (0..leg.count()).map(|i| format!("R{race}-{i}")).collect();
            assert_eq!(ids, expected);
        }
    }
    assert_eq!(tickets[0].plan.budget, 1000.0);
    assert_eq!(tickets[1].plan.budget, 500.0);
}

#[test]
fn chaotic_card_swaps_budgets() {
    let source = MemoryCardSource::new().with_card("adana", sample_card("Adana", 9, 16, 0.40));
    let planner = make_planner();
    let (_, tickets, _) = planner.plan_from(&source, "adana", &[]).unwrap();

    let chaos = tickets[0].chaos;
    assert!(chaos.chaotic);
    assert_eq!(chaos.score, 40.0);
    assert_eq!(tickets[0].plan.budget, 500.0);
    assert_eq!(tickets[1].plan.budget, 1250.0);
}

#[test]
fn scratched_runners_are_skipped() {
    let source = MemoryCardSource::new().with_card("izmir", sample_card("İzmir", 6, 10, 0.40));
    let planner = make_planner();
    let excluded = vec!["r1-0".to_string(), "R4-1".to_string()];
    let (_, tickets, _) = planner.plan_from(&source, "izmir", &excluded).unwrap();

    let logic = &tickets[0];
    assert_eq!(logic.plan.legs[0].selected[0].id, "R1-1");
    assert!(logic.plan.legs[3]
        .selected
        .iter()
        .all(|c| c.id != "R4-1"));
}

#[test]
fn report_header_matches_budget_after_scratches() {
    let source = MemoryCardSource::new().with_card("adana", sample_card("Adana", 9, 16, 0.40));
    let planner = make_planner();
    // Six non-runners per race: 10 left, 20 + 5 + 3 = 28.
    let excluded: Vec<String> = (1..=9)
        .flat_map(|race| (10..16).map(move |i| format!("R{race}-{i}")))
        .collect();
    let (card, tickets, _) = planner.plan_from(&source, "adana", &excluded).unwrap();
    assert_eq!(tickets[0].plan.budget, 1000.0);

    let md = render_card(&card, &tickets);
    assert!(md.contains("Chaos index: 28.0\n"));
    assert!(!md.contains("chaotic"));
}

#[test]
fn short_card_is_skipped_not_fatal() {
    let source = MemoryCardSource::new().with_card("bursa", sample_card("Bursa", 5, 10, 0.40));
    let (_, tickets, records) = make_planner().plan_from(&source, "bursa", &[]).unwrap();
    assert!(tickets.is_empty());
    assert!(matches!(&records[0], PlanRecord::Skipped { reason, .. } if reason.contains('6')));
}

#[test]
fn source_failure_propagates() {
    let source = MemoryCardSource::new().with_card("izmir", sample_card("İzmir", 6, 10, 0.40));
    source.set_error("feed offline");
    let err = make_planner().plan_from(&source, "izmir", &[]).unwrap_err();
    assert!(err.to_string().contains("feed offline"));
}

#[test]
fn report_and_sheet_round_trip() {
    let source = MemoryCardSource::new().with_card("izmir", sample_card("İzmir", 6, 10, 0.40));
    let planner = make_planner();
    let (card, tickets, _) = planner.plan_from(&source, "izmir", &[]).unwrap();

    let md = render_card(&card, &tickets);
    assert!(md.contains("## İzmir pick-6 (2026-01-18)"));
    assert!(md.contains("### Logic coupon"));
    assert!(md.contains("### Surprise coupon"));
    assert_eq!(md.matches("Leg 6 ").count(), 2);

    let sheet: Vec<TicketRecord> = tickets.iter().map(TicketRecord::from).collect();
    assert_eq!(sheet[0].amount, money(tickets[0].plan.total_cost));

    let path = temp_path("json");
    storage::save_sheet(&sheet, Some(&path)).unwrap();
    let loaded = storage::load_sheet(Some(&path)).unwrap().unwrap();
    assert_eq!(loaded, sheet);
    storage::delete_sheet(Some(&path)).unwrap();
}

#[test]
fn configured_planner_from_files() {
    let config_path = temp_path("toml");
    std::fs::write(
        &config_path,
        r#"
        [coupon]
        legs = 5
        unit_price = 2.0

        [[strategies]]
        id = "TIGHT"
        name = "Tight coupon"
        calm_budget = 40.0
        chaos_budget = 20.0
        "#,
    )
    .unwrap();
    let cfg = AppConfig::load(&config_path).unwrap();
    let planner = CouponPlanner::new(
        cfg.resolve_strategies().unwrap(),
        ChaosGauge::new(cfg.chaos.clone()),
        cfg.coupon.clone(),
    );

    let card_path = temp_path("json");
    std::fs::write(
        &card_path,
        serde_json::to_string(&sample_card("Bursa", 7, 9, 0.40)).unwrap(),
    )
    .unwrap();

    let source = JsonCardSource::default();
    let (_, tickets, _) = planner.plan_from(&source, &card_path, &[]).unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].strategy_id, "TIGHT");
    assert_eq!(tickets[0].races, vec![3, 4, 5, 6, 7]);
    assert_eq!(
        tickets[0].plan.total_cost,
        tickets[0].plan.combinations as f64 * 2.0
    );
    assert!(tickets[0].plan.total_cost <= 46.0);

    std::fs::remove_file(config_path).unwrap();
    std::fs::remove_file(card_path).unwrap();
}

#[test]
fn shipped_config_matches_built_in_strategies() {
    let cfg = AppConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
    assert_eq!(cfg.coupon, CouponSettings::default());
    assert_eq!(cfg.chaos, ChaosConfig::default());
    assert_eq!(cfg.resolve_strategies().unwrap(), CouponStrategy::defaults());
}
