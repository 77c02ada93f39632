//! Scenario file tests

use std::io::Write;

use ecmo_econ_core::analysis::SamplingDistribution;
use ecmo_econ_core::budget::Uptake;
use ecmo_econ_core::config::{ParameterKey, ParameterSet};
use ecmo_econ_core::model::OutcomeCategory;
use ecmo_econ_core::nhi::EcmoMode;

use super::FULL_SCENARIO;
use crate::scenario::{DEFAULT_SEED, Scenario, ScenarioError};

#[test]
fn test_parse_full_scenario() {
    let scenario = Scenario::from_yaml(FULL_SCENARIO).unwrap();

    assert_eq!(scenario.display_name(), "Adult cardiogenic shock");
    assert_eq!(scenario.seed, 7);
    assert_eq!(scenario.parameters.cost_multiplier(), 0.65);
    assert_eq!(scenario.parameters.initiation_cost(), 30_000.0);
    // untouched fields keep their defaults
    assert_eq!(
        scenario.parameters.termination_cost(),
        ParameterSet::default().termination_cost()
    );
    assert_eq!(scenario.intervention.len(), 6);
    assert_eq!(scenario.comparator.len(), 3);
    assert_eq!(
        scenario.intervention[1].outcome,
        Some(OutcomeCategory::MildDisability)
    );
    assert_eq!(scenario.intervention[2].outcome, None);
    assert_eq!(scenario.wtp, vec![0.0, 20_000.0, 50_000.0, 100_000.0]);

    let budget = scenario.budget.unwrap();
    assert_eq!(budget.population, 23_000_000);
    assert_eq!(budget.uptake, Uptake::LinearRamp);

    let nhi = scenario.nhi.unwrap();
    assert_eq!(nhi.mode, EcmoMode::Vv);
    assert_eq!(nhi.schedule.icu_daily_cap, 40_000.0);
    assert_eq!(nhi.schedule.vv_drg, 750_000.0);

    assert_eq!(scenario.sensitivity.len(), 2);
    assert_eq!(
        scenario.sensitivity[1].parameter,
        ParameterKey::ComplicationCost {
            name: "stroke".into()
        }
    );

    let psa = scenario.psa.unwrap();
    assert_eq!(psa.iterations, 40);
    assert_eq!(
        psa.parameters[0].distribution,
        SamplingDistribution::Beta {
            alpha: 30.0,
            beta: 70.0
        }
    );
}

#[test]
fn test_minimal_scenario_uses_defaults() {
    let yaml = r#"
intervention:
  - age: 40
    survived: true
    duration_hours: 96
    outcome: normal
comparator:
  - age: 40
    survived: false
    duration_hours: 10
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();
    assert_eq!(scenario.seed, DEFAULT_SEED);
    assert_eq!(scenario.parameters, ParameterSet::default());
    assert!(scenario.budget.is_none());
    assert!(scenario.nhi.is_none());
    assert!(scenario.sensitivity.is_empty());
    assert!(!scenario.wtp.is_empty());
}

#[test]
fn test_invalid_parameters_fail_to_load() {
    let yaml = r#"
parameters:
  discount_rate: -0.5
intervention:
  - age: 40
    survived: false
    duration_hours: 10
comparator:
  - age: 40
    survived: false
    duration_hours: 10
"#;
    assert!(matches!(
        Scenario::from_yaml(yaml),
        Err(ScenarioError::Parse(_))
    ));
}

#[test]
fn test_empty_arm_is_rejected() {
    let yaml = r#"
intervention: []
comparator:
  - age: 40
    survived: false
    duration_hours: 10
"#;
    assert!(matches!(
        Scenario::from_yaml(yaml),
        Err(ScenarioError::Invalid(_))
    ));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_SCENARIO.as_bytes()).unwrap();

    let scenario = Scenario::load(file.path()).unwrap();
    assert_eq!(scenario.seed, 7);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(matches!(Scenario::load(&missing), Err(ScenarioError::Io(_))));
}
