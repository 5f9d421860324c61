//! Optimizer scenarios through the public `optimize` entry point.

use altili::{optimize, Candidate, CouponError, Difficulty, Leg, Optimizer, Policy};

/// `n` runners scoring `top - step * i`.
fn graded_leg(prefix: &str, n: usize, top: f64, step: f64) -> Leg {
    Leg::new(
        (0..n)
            .map(|i| Candidate::new(format!("{prefix}{i}"), top - step * i as f64))
            .collect(),
    )
}

fn assert_prefixes(legs: &[Leg], plan: &altili::CouponPlan) {
    for (leg, selection) in legs.iter().zip(plan.selection()) {
        assert_eq!(selection, leg.prefix(selection.len()));
    }
}

#[test]
fn dominant_favourite_is_a_banker() {
    let legs = vec![Leg::from_pairs([("A", 0.90), ("B", 0.10)])];
    let plan = optimize(&legs, 10.0, 1.25, 0.15).unwrap();

    assert_eq!(plan.legs[0].constraint.difficulty, Difficulty::Easy);
    assert_eq!(plan.legs[0].constraint.min_count, 1);
    assert_eq!(plan.legs[0].constraint.max_count, 1);
    assert!(plan.legs[0].is_banker());
    assert_eq!(plan.legs[0].selected[0].id, "A");
    assert_eq!(plan.total_cost, 1.25);
}

#[test]
fn empty_leg_never_zeroes_cost() {
    let legs = vec![
        graded_leg("A", 8, 0.40, 0.03),
        Leg::default(),
        graded_leg("C", 8, 0.40, 0.03),
    ];
    let plan = optimize(&legs, 10.0, 1.25, 0.15).unwrap();

    assert_eq!(plan.legs[1].count(), 0);
    assert!(plan.total_cost > 0.0);
    assert_eq!(
        plan.total_cost,
        (plan.legs[0].count() * plan.legs[2].count()) as f64 * 1.25
    );
}

#[test]
fn two_hard_legs_stay_within_limit() {
    let legs = vec![
        graded_leg("A", 20, 0.20, 0.005),
        graded_leg("B", 20, 0.20, 0.005),
    ];
    let plan = optimize(&legs, 50.0, 1.25, 0.15).unwrap();

    assert!(plan.legs.iter().all(|l| l.constraint.difficulty == Difficulty::Hard));
    assert!(plan.counts().iter().all(|&c| c >= 3));
    assert!(plan.total_cost >= 11.25);
    assert!(plan.total_cost <= 57.5);
    assert!(!plan.over_budget);
    assert_eq!(plan.relaxations, 0);
    assert_prefixes(&legs, &plan);
}

#[test]
fn infeasible_minimum_terminates_with_a_plan() {
    let legs: Vec<Leg> = (0..6)
        .map(|i| graded_leg(&format!("L{i}-"), 14, 0.25, 0.01))
        .collect();
    let plan = optimize(&legs, 1.0, 1.25, 0.15).unwrap();

    assert_eq!(plan.legs.len(), 6);
    assert!(plan.counts().iter().all(|&c| c == 1));
    assert_eq!(plan.total_cost, 1.25);
    assert!(plan.over_budget);
    assert_prefixes(&legs, &plan);
}

#[test]
fn cost_is_product_of_counts_times_unit_price() {
    let legs = vec![
        graded_leg("A", 9, 0.45, 0.04),
        graded_leg("B", 13, 0.22, 0.01),
        graded_leg("C", 5, 0.70, 0.10),
        graded_leg("D", 11, 0.30, 0.02),
    ];
    for budget in [20.0, 100.0, 400.0] {
        let plan = optimize(&legs, budget, 2.0, 0.10).unwrap();
        let product: usize = plan.counts().iter().product();
        assert_eq!(plan.combinations, product as u64);
        assert_eq!(plan.total_cost, product as f64 * 2.0);
        assert!(plan.over_budget || plan.total_cost <= budget * 1.10);
        for leg in &plan.legs {
            assert!(leg.count() >= 1);
            assert!(leg.count() >= leg.constraint.min_count);
            assert!(leg.count() <= leg.constraint.max_count);
        }
        assert_prefixes(&legs, &plan);
    }
}

#[test]
fn identical_inputs_identical_plans() {
    let legs = vec![
        graded_leg("A", 12, 0.30, 0.02),
        graded_leg("B", 7, 0.50, 0.05),
        graded_leg("C", 10, 0.40, 0.03),
    ];
    let first = optimize(&legs, 300.0, 1.25, 0.15).unwrap();
    for _ in 0..5 {
        assert_eq!(optimize(&legs, 300.0, 1.25, 0.15).unwrap(), first);
    }
}

#[test]
fn bad_parameters_rejected() {
    let legs = vec![graded_leg("A", 8, 0.40, 0.03)];
    assert!(matches!(
        optimize(&legs, 0.0, 1.25, 0.15),
        Err(CouponError::InvalidBudget(_))
    ));
    assert!(matches!(
        optimize(&legs, 10.0, -1.0, 0.15),
        Err(CouponError::InvalidUnitPrice(_))
    ));
    assert!(matches!(
        optimize(&legs, 10.0, 1.25, f64::NAN),
        Err(CouponError::InvalidTolerance(_))
    ));
}

#[test]
fn wide_policy_covers_hard_legs_deeper() {
    let legs: Vec<Leg> = (0..2)
        .map(|i| graded_leg(&format!("L{i}-"), 14, 0.25, 0.01))
        .collect();
    let plan = Optimizer::new(Policy::wide())
        .optimize(&legs, 100.0, 1.25, 0.15)
        .unwrap();
    assert!(plan.counts().iter().all(|&c| c >= 4));
    assert!(plan.counts().iter().all(|&c| c <= 7));
}

#[test]
fn card_legs_feed_the_optimizer_ranked() {
    let card = crate::memory_source::sample_card("İzmir", 7, 9, 0.40);
    let legs = card.legs(6).unwrap();
    assert_eq!(legs.len(), 6);
    assert_eq!(legs[0].candidates()[0].id, "R2-0");
    assert!(legs
        .iter()
        .all(|l| l.candidates().windows(2).all(|w| w[0].score >= w[1].score)));

    let plan = optimize(&legs, 200.0, 1.25, 0.15).unwrap();
    assert_prefixes(&legs, &plan);
    assert!(plan.total_cost <= 230.0);
}
