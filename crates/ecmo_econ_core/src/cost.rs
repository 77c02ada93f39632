//! Per-patient cost of a therapy course
//!
//! A course accrues every daily rate for each started day, one-time
//! initiation (always) and termination (survivors of a non-empty course)
//! costs, equipment replacements at a fixed interval, and any complications
//! realized by an independent draw per category. The regional multiplier scales the grand
//! sum exactly once.

use rand::Rng;

use crate::config::ParameterSet;
use crate::error::RecordError;
use crate::model::{CostBreakdown, PatientEconomicRecord, RealizedComplication};

/// Number of equipment replacements for a course of `duration_days`.
pub fn replacement_count(duration_days: u32, interval_days: u32) -> u32 {
    duration_days.div_ceil(interval_days)
}

/// Cost one patient's course.
///
/// Exactly one uniform value is drawn from `rng` per configured complication,
/// in declaration order, whether or not it occurs. This keeps the stream
/// aligned across patients and across perturbed parameter sets.
pub fn cost<R: Rng + ?Sized>(
    record: &PatientEconomicRecord,
    params: &ParameterSet,
    rng: &mut R,
) -> Result<CostBreakdown, RecordError> {
    record.validate()?;

    let duration_days = record.duration_days();
    let daily_cost = duration_days as f64 * params.daily_total();

    let initiation_cost = params.initiation_cost();
    let termination_cost = if record.survived && duration_days > 0 {
        params.termination_cost()
    } else {
        0.0
    };

    let replacements = replacement_count(duration_days, params.replacement_interval_days());
    let replacement_cost = replacements as f64 * params.replacement_unit_cost();

    let complications: Vec<RealizedComplication> = params
        .complications()
        .iter()
        .map(|c| {
            let occurred = rng.random::<f64>() < c.probability;
            RealizedComplication {
                name: c.name.clone(),
                occurred,
                cost: if occurred { c.cost } else { 0.0 },
            }
        })
        .collect();
    let complication_cost = complications.iter().map(|c| c.cost).sum::<f64>();

    let subtotal =
        daily_cost + initiation_cost + termination_cost + replacement_cost + complication_cost;
    let multiplier = params.cost_multiplier();

    Ok(CostBreakdown {
        duration_days,
        daily_cost,
        initiation_cost,
        termination_cost,
        replacement_count: replacements,
        replacement_cost,
        complications,
        complication_cost,
        subtotal,
        multiplier,
        total: multiplier * subtotal,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::ParameterSetBuilder;
    use crate::model::OutcomeCategory;

    #[test]
    fn test_replacement_count_rounds_up() {
        assert_eq!(replacement_count(0, 7), 0);
        assert_eq!(replacement_count(7, 7), 1);
        assert_eq!(replacement_count(8, 7), 2);
        assert_eq!(replacement_count(14, 7), 2);
    }

    #[test]
    fn test_multiplier_applied_once_to_grand_sum() {
        let params = ParameterSetBuilder::empty()
            .daily_rate("icu_bed", 1_000.0)
            .initiation_cost(10_000.0)
            .termination_cost(2_000.0)
            .replacement(7, 500.0)
            .complication("certain", 1.0, 3_000.0)
            .cost_multiplier(0.5)
            .build()
            .unwrap();
        let record = PatientEconomicRecord::survivor(50.0, 48.0, OutcomeCategory::Normal);
        let mut rng = SmallRng::seed_from_u64(1);

        let breakdown = cost(&record, &params, &mut rng).unwrap();

        // 2 days * 1000 + 10000 + 2000 + 1 * 500 + 3000
        assert_eq!(breakdown.subtotal, 17_500.0);
        assert_eq!(breakdown.total, 8_750.0);
    }

    #[test]
    fn test_certain_and_impossible_complications() {
        let params = ParameterSetBuilder::empty()
            .complication("always", 1.0, 100.0)
            .complication("never", 0.0, 1_000_000.0)
            .build()
            .unwrap();
        let record = PatientEconomicRecord::death(70.0, 5.0);
        let mut rng = SmallRng::seed_from_u64(99);

        let breakdown = cost(&record, &params, &mut rng).unwrap();
        let occurred: Vec<&str> = breakdown.occurred_complications().collect();
        assert_eq!(occurred, vec!["always"]);
        assert_eq!(breakdown.complication_cost, 100.0);
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let params = ParameterSet::default();
        let record = PatientEconomicRecord::death(70.0, -3.0);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            cost(&record, &params, &mut rng),
            Err(RecordError::NegativeDuration(-3.0))
        );
    }
}
