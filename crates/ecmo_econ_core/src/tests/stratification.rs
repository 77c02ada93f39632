//! Risk quintile tests

use super::default_params;
use crate::cohort::evaluate_cohort;
use crate::config::WtpThresholds;
use crate::error::{AnalysisError, RecordError};
use crate::model::{Cer, Classification, OutcomeCategory, PatientEconomicRecord};
use crate::stratify::{Quintile, stratify};

fn risky_cohort(n: usize) -> Vec<PatientEconomicRecord> {
    (0..n)
        .map(|i| {
            // higher risk, more deaths
            let risk = ((i * 37) % n) as f64 / n as f64;
            if risk > 0.6 {
                PatientEconomicRecord::death(50.0, 100.0).with_risk(risk)
            } else {
                PatientEconomicRecord::survivor(50.0, 100.0, OutcomeCategory::Normal).with_risk(risk)
            }
        })
        .collect()
}

#[test]
fn test_quintile_sizes_differ_by_at_most_one() {
    let params = default_params();
    for n in [5, 12, 23, 100] {
        let records = risky_cohort(n);
        let results = evaluate_cohort(&records, &params, 5).unwrap();
        let analysis = stratify(&records, &results).unwrap();

        let sizes: Vec<usize> = analysis.quintiles.iter().map(|q| q.patients).collect();
        assert_eq!(sizes.iter().sum::<usize>(), n);
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        assert!(max - min <= 1, "sizes {sizes:?} for n={n}");
    }
}

#[test]
fn test_quintiles_ordered_by_risk() {
    let params = default_params();
    let records = risky_cohort(50);
    let results = evaluate_cohort(&records, &params, 5).unwrap();
    let analysis = stratify(&records, &results).unwrap();

    for pair in analysis.quintiles.windows(2) {
        assert!(pair[0].max_risk <= pair[1].min_risk);
    }
    assert!(analysis.boundaries.windows(2).all(|b| b[0] <= b[1]));
    assert_eq!(analysis.quintiles[0].survival_rate, 1.0);
    assert_eq!(analysis.quintiles[4].survival_rate, 0.0);
}

#[test]
fn test_ties_keep_input_order() {
    let params = default_params();
    let records: Vec<_> = (0..10)
        .map(|_| PatientEconomicRecord::death(60.0, 24.0).with_risk(0.5))
        .collect();
    let results = evaluate_cohort(&records, &params, 1).unwrap();
    let analysis = stratify(&records, &results).unwrap();

    let expected: Vec<Quintile> = [1, 1, 2, 2, 3, 3, 4, 4, 5, 5].map(Quintile).to_vec();
    assert_eq!(analysis.assignments, expected);
    assert_eq!(analysis.boundaries, [0.5; 4]);
}

#[test]
fn test_cer_undefined_when_no_qalys() {
    let params = default_params();
    let records: Vec<_> = (0..10)
        .map(|i| PatientEconomicRecord::death(60.0, 24.0).with_risk(i as f64))
        .collect();
    let results = evaluate_cohort(&records, &params, 1).unwrap();
    let analysis = stratify(&records, &results).unwrap();

    for quintile in &analysis.quintiles {
        assert_eq!(quintile.cer, Cer::Undefined);
        assert_eq!(quintile.cost_per_survivor, Cer::Undefined);
        assert!(quintile.mean_cost > 0.0);
    }
    assert_eq!(analysis.cer_by_quintile().len(), 5);
}

#[test]
fn test_missing_risk_score_reports_index() {
    let params = default_params();
    let mut records = risky_cohort(8);
    records[3].risk_score = None;
    let results = evaluate_cohort(&records, &params, 1).unwrap();

    assert_eq!(
        stratify(&records, &results).unwrap_err(),
        AnalysisError::Record {
            index: 3,
            source: RecordError::MissingRiskScore
        }
    );
}

#[test]
fn test_fewer_than_five_patients_is_an_error() {
    let params = default_params();
    let records = risky_cohort(4);
    let results = evaluate_cohort(&records, &params, 1).unwrap();
    assert!(matches!(
        stratify(&records, &results),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn test_icer_against_lowest_risk_quintile() {
    let params = default_params();
    let records = risky_cohort(50);
    let results = evaluate_cohort(&records, &params, 9).unwrap();
    let analysis = stratify(&records, &results).unwrap();

    let icers = analysis
        .icer_vs_baseline(Quintile(1), &WtpThresholds::default())
        .unwrap();
    assert_eq!(icers.len(), 5);
    assert_eq!(icers[0].1.classification, Classification::Equivalent);
    // all deaths against all survivors
    assert!(icers[4].1.incremental_qaly < 0.0);

    assert!(analysis
        .icer_vs_baseline(Quintile(6), &WtpThresholds::default())
        .is_err());
}
