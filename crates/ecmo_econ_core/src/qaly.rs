//! Quality-adjusted life years for one patient
//!
//! Survivors are credited `utility * adjusted_life_expectancy` QALYs, where the
//! remaining life expectancy is reduced by a fixed number of years. The whole
//! stream is discounted with a single factor evaluated at the midpoint of the
//! remaining years.
//!
//! The midpoint convention approximates a uniform utility stream. It differs
//! from year-by-year life-table discounting and changes absolute QALY
//! magnitudes; do not swap it without review by the health-economics owners.

use crate::config::ParameterSet;
use crate::error::RecordError;
use crate::model::{PatientEconomicRecord, QalyResult};

/// Discount factor applied to a stream of `years` remaining years.
///
/// `1 / (1 + rate)^(years / 2)`, or exactly 1 when the rate is zero.
pub fn midpoint_discount_factor(rate: f64, years: f64) -> f64 {
    if rate == 0.0 {
        1.0
    } else {
        1.0 / (1.0 + rate).powf(years / 2.0)
    }
}

/// QALYs for one patient against `reference_life_expectancy`.
///
/// Survivors need an outcome with a configured utility; a missing or unknown
/// outcome is an error and is never replaced by a default.
pub fn qaly(
    record: &PatientEconomicRecord,
    params: &ParameterSet,
    reference_life_expectancy: f64,
) -> Result<QalyResult, RecordError> {
    record.validate()?;

    if !record.survived {
        return Ok(QalyResult::death());
    }

    let outcome = record.outcome.ok_or(RecordError::MissingOutcome)?;
    let utility = params
        .utility(outcome)
        .ok_or(RecordError::UnknownOutcome(outcome))?;

    let adjusted_life_expectancy =
        (reference_life_expectancy - record.age - params.life_expectancy_reduction()).max(0.0);
    let undiscounted_qalys = utility * adjusted_life_expectancy;
    let discount_factor =
        midpoint_discount_factor(params.discount_rate(), adjusted_life_expectancy);

    Ok(QalyResult {
        utility,
        adjusted_life_expectancy,
        undiscounted_qalys,
        discount_factor,
        discounted_qalys: undiscounted_qalys * discount_factor,
    })
}
