//! Invariants that hold for every cohort and seed

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::{comparator_arm, default_params, treated_arm};
use crate::budget::{BudgetInputs, PerCase, Uptake, project_budget};
use crate::cohort::{evaluate_cohort, evaluate_patient};
use crate::config::{DEFAULT_REFERENCE_LIFE_EXPECTANCY, ParameterSetBuilder};
use crate::cost::cost;
use crate::model::{OutcomeCategory, PatientEconomicRecord};
use crate::qaly::qaly;

#[test]
fn test_same_seed_gives_identical_cohort() {
    let params = default_params();
    let records = treated_arm();

    let first = evaluate_cohort(&records, &params, 42).unwrap();
    let second = evaluate_cohort(&records, &params, 42).unwrap();
    assert_eq!(first, second);
}

/// Evaluating patients one at a time matches the (possibly parallel) cohort
/// evaluation, so scheduling never changes the draws.
#[test]
fn test_cohort_matches_patient_by_patient_evaluation() {
    let params = default_params();
    let records = comparator_arm();

    let cohort = evaluate_cohort(&records, &params, 7).unwrap();
    for (index, record) in records.iter().enumerate() {
        let single = evaluate_patient(record, &params, 7, index).unwrap();
        assert_eq!(cohort.patients[index], single);
    }
}

#[test]
fn test_different_seeds_change_complication_draws() {
    let params = default_params();
    let records = treated_arm();

    let a = evaluate_cohort(&records, &params, 1).unwrap();
    let b = evaluate_cohort(&records, &params, 2).unwrap();
    assert_ne!(a.total_cost(), b.total_cost());
    assert_eq!(a.total_qalys(), b.total_qalys());
}

#[test]
fn test_cost_never_below_scaled_initiation() {
    let params = ParameterSetBuilder::new()
        .cost_multiplier(0.65)
        .build()
        .unwrap();
    let floor = params.cost_multiplier() * params.initiation_cost();
    let mut rng = SmallRng::seed_from_u64(11);

    let records = [
        PatientEconomicRecord::death(30.0, 0.0),
        PatientEconomicRecord::death(80.0, 1.0),
        PatientEconomicRecord::survivor(20.0, 500.0, OutcomeCategory::Normal),
    ];
    for record in &records {
        for _ in 0..50 {
            let breakdown = cost(record, &params, &mut rng).unwrap();
            assert!(breakdown.total >= floor);
        }
    }
}

#[test]
fn test_termination_cost_only_for_survivors() {
    let params = default_params();
    let mut rng = SmallRng::seed_from_u64(3);

    let died = cost(&PatientEconomicRecord::death(50.0, 24.0), &params, &mut rng).unwrap();
    assert_eq!(died.termination_cost, 0.0);

    let lived = cost(
        &PatientEconomicRecord::survivor(50.0, 24.0, OutcomeCategory::Normal),
        &params,
        &mut rng,
    )
    .unwrap();
    assert_eq!(lived.termination_cost, params.termination_cost());
}

#[test]
fn test_zero_duration_survivor_pays_only_initiation() {
    let params = ParameterSetBuilder::empty()
        .daily_rate("icu_bed", 1_000.0)
        .initiation_cost(10_000.0)
        .termination_cost(2_000.0)
        .replacement(7, 500.0)
        .build()
        .unwrap();
    let mut rng = SmallRng::seed_from_u64(5);

    let breakdown = cost(
        &PatientEconomicRecord::survivor(50.0, 0.0, OutcomeCategory::Normal),
        &params,
        &mut rng,
    )
    .unwrap();
    assert_eq!(breakdown.duration_days, 0);
    assert_eq!(breakdown.daily_cost, 0.0);
    assert_eq!(breakdown.termination_cost, 0.0);
    assert_eq!(breakdown.replacement_count, 0);
    assert_eq!(breakdown.total, 10_000.0);
}

#[test]
fn test_death_yields_no_qalys_at_any_age() {
    let params = default_params();
    for age in [0.0, 18.0, 45.5, 79.0, 120.0] {
        let result = qaly(
            &PatientEconomicRecord::death(age, 48.0),
            &params,
            DEFAULT_REFERENCE_LIFE_EXPECTANCY,
        )
        .unwrap();
        assert_eq!(result.utility, 0.0);
        assert_eq!(result.undiscounted_qalys, 0.0);
        assert_eq!(result.discounted_qalys, 0.0);
    }
}

#[test]
fn test_discounting_never_adds_qalys() {
    let params = ParameterSetBuilder::new()
        .discount_rate(0.05)
        .build()
        .unwrap();
    for age in [0.0, 25.0, 50.0, 77.0] {
        for outcome in OutcomeCategory::ALL {
            let record = PatientEconomicRecord::survivor(age, 96.0, outcome);
            let result = qaly(&record, &params, DEFAULT_REFERENCE_LIFE_EXPECTANCY).unwrap();
            assert!(result.discounted_qalys <= result.undiscounted_qalys);
        }
    }
}

#[test]
fn test_zero_utilization_budget_is_all_zero() {
    let params = default_params();
    let per_case = PerCase {
        cost: 120_000.0,
        qalys: 8.0,
    };
    let comparator = PerCase {
        cost: 40_000.0,
        qalys: 2.0,
    };
    let inputs = BudgetInputs {
        uptake: Uptake::LinearRamp,
        ..BudgetInputs::new(23_000_000, 0.0, 5)
    };

    let result = project_budget(&inputs, &per_case, Some(&comparator), &params).unwrap();

    assert_eq!(result.years.len(), 5);
    for year in &result.years {
        assert_eq!(year.cases, 0.0);
        assert_eq!(year.cost, 0.0);
        assert_eq!(year.qalys, 0.0);
        assert_eq!(year.incremental_cost, Some(0.0));
    }
    assert_eq!(result.cumulative_cost, 0.0);
    assert_eq!(result.cumulative_undiscounted_cost, 0.0);
    assert_eq!(result.cumulative_qalys, 0.0);
    assert_eq!(result.cumulative_incremental_cost, Some(0.0));
}

#[test]
fn test_budget_years_discounted_from_year_two() {
    let params = ParameterSetBuilder::new()
        .discount_rate(0.03)
        .build()
        .unwrap();
    let per_case = PerCase {
        cost: 100.0,
        qalys: 1.0,
    };
    let result =
        project_budget(&BudgetInputs::new(1_000, 0.1, 3), &per_case, None, &params).unwrap();

    assert_eq!(result.years[0].cost, 10_000.0);
    assert!((result.years[1].cost - 10_000.0 / 1.03).abs() < 1e-9);
    assert_eq!(result.cumulative_undiscounted_cost, 30_000.0);
    assert!(result.cumulative_cost < result.cumulative_undiscounted_cost);
    assert_eq!(result.cumulative_incremental_cost, None);
}
