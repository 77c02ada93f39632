//! Integration tests for the ECMO economic engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Worked examples with hand-checked numbers
//! - `properties` - Determinism, cost floor, death and discounting invariants
//! - `stratification` - Risk quintiles
//! - `analysis` - Sensitivity, bootstrap, PSA and acceptability curves

mod properties;
mod stratification;

use crate::config::ParameterSet;
use crate::model::{OutcomeCategory, PatientEconomicRecord};

/// Survivors with a good outcome; the intervention arm in most tests
pub(crate) fn treated_arm() -> Vec<PatientEconomicRecord> {
    (0..20)
        .map(|i| {
            let outcome = match i % 4 {
                0 | 1 => OutcomeCategory::Normal,
                2 => OutcomeCategory::MildDisability,
                _ => OutcomeCategory::ModerateDisability,
            };
            PatientEconomicRecord::survivor(35.0 + i as f64, 72.0 + 12.0 * i as f64, outcome)
        })
        .collect()
}

/// Mostly deaths after short runs
pub(crate) fn comparator_arm() -> Vec<PatientEconomicRecord> {
    (0..20)
        .map(|i| {
            if i % 5 == 0 {
                PatientEconomicRecord::survivor(40.0 + i as f64, 48.0, OutcomeCategory::SevereDisability)
            } else {
                PatientEconomicRecord::death(40.0 + i as f64, 24.0 + i as f64)
            }
        })
        .collect()
}

pub(crate) fn default_params() -> ParameterSet {
    ParameterSet::default()
}
