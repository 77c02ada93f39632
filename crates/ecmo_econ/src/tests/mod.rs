//! Tests for scenario loading and reporting
//!
//! - `scenario` - YAML parsing and validation of scenario files
//! - `report` - End-to-end runs and text rendering

mod scenario;

/// Small scenario exercising every optional section
pub(crate) const FULL_SCENARIO: &str = r#"
name: Adult cardiogenic shock
seed: 7
parameters:
  cost_multiplier: 0.65
  discount_rate: 0.03
  initiation_cost: 30000
wtp: [0, 20000, 50000, 100000]
intervention:
  - age: 55
    survived: true
    duration_hours: 120
    outcome: normal
    risk_score: 0.10
  - age: 48
    survived: true
    duration_hours: 200
    outcome: mild_disability
    risk_score: 0.30
  - age: 62
    survived: false
    duration_hours: 90
    risk_score: 0.80
  - age: 35
    survived: true
    duration_hours: 72
    outcome: moderate_disability
    risk_score: 0.20
  - age: 70
    survived: true
    duration_hours: 300
    outcome: severe_disability
    risk_score: 0.60
  - age: 58
    survived: false
    duration_hours: 30
    risk_score: 0.95
comparator:
  - age: 57
    survived: false
    duration_hours: 24
  - age: 50
    survived: true
    duration_hours: 48
    outcome: severe_disability
  - age: 66
    survived: false
    duration_hours: 12
budget:
  population: 23000000
  utilization: 0.00002
  years: 5
  uptake: linear_ramp
nhi:
  mode: vv
  schedule:
    icu_daily_cap: 40000
sensitivity:
  - parameter:
      kind: cost_multiplier
    low: 0.5
    high: 1.0
  - parameter:
      kind: complication_cost
      name: stroke
    low: 20000
    high: 60000
bootstrap_iterations: 200
psa:
  iterations: 40
  parameters:
    - parameter:
        kind: complication_probability
        name: bleeding
      distribution:
        kind: beta
        alpha: 30
        beta: 70
evpi:
  population: 460
  horizon_years: 5
"#;
