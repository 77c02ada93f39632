//! One-way and two-way deterministic sensitivity analysis.
//!
//! Every run re-evaluates both arms from scratch on a perturbed copy of the
//! base `ParameterSet`, reusing the base seed so that complication draws are
//! common random numbers across runs.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{SensitivityRange, StrategyComparison, SweepGrid};
use crate::cohort::evaluate_cohort;
use crate::config::{ParameterKey, ParameterSet};
use crate::error::{AnalysisError, Result};
use crate::icer::icer;
use crate::model::{IcerResult, IcerValue};

/// Evaluate both arms under `params` and compare them.
pub fn evaluate_comparison(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    seed: u64,
) -> Result<IcerResult> {
    let intervention = evaluate_cohort(comparison.intervention, params, seed)?;
    let comparator = evaluate_cohort(comparison.comparator, params, seed)?;
    icer(&intervention, &comparator, params.thresholds())
}

/// Percent change of `value` relative to `base`.
///
/// `None` when either ratio is a sentinel or the base is zero.
pub fn pct_change(base: IcerValue, value: IcerValue) -> Option<f64> {
    match (base.finite(), value.finite()) {
        (Some(b), Some(v)) if b != 0.0 => Some((v - b) / b * 100.0),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: f64,
    pub result: IcerResult,
    /// Change of the ICER against the base case, in percent
    pub pct_change: Option<f64>,
}

impl SensitivityPoint {
    fn new(value: f64, result: IcerResult, base: &IcerResult) -> Self {
        Self {
            value,
            pct_change: pct_change(base.icer, result.icer),
            result,
        }
    }

    pub fn icer(&self) -> IcerValue {
        self.result.icer
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSensitivity {
    pub parameter: ParameterKey,
    pub low: SensitivityPoint,
    pub base: SensitivityPoint,
    pub high: SensitivityPoint,
}

impl ParameterSensitivity {
    /// Spread between the low and high ICERs, if both are finite
    pub fn swing(&self) -> Option<f64> {
        Some((self.high.icer().finite()? - self.low.icer().finite()?).abs())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub base: IcerResult,
    /// In the order the ranges were given
    pub parameters: Vec<ParameterSensitivity>,
}

impl SensitivityResult {
    /// Parameters by decreasing ICER swing. Parameters whose swing is
    /// undefined go last, in input order.
    pub fn tornado(&self) -> Vec<&ParameterSensitivity> {
        let mut ordered: Vec<&ParameterSensitivity> = self.parameters.iter().collect();
        ordered.sort_by(|a, b| match (a.swing(), b.swing()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ordered
    }

    pub fn get(&self, parameter: &ParameterKey) -> Option<&ParameterSensitivity> {
        self.parameters.iter().find(|p| &p.parameter == parameter)
    }
}

fn run_range(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    range: &SensitivityRange,
    base: &IcerResult,
    seed: u64,
) -> Result<ParameterSensitivity> {
    let base_value = range.parameter.get(params)?;
    let at = |value: f64| -> Result<SensitivityPoint> {
        let perturbed = params.with_parameter(&range.parameter, value)?;
        let result = evaluate_comparison(comparison, &perturbed, seed)?;
        Ok(SensitivityPoint::new(value, result, base))
    };

    Ok(ParameterSensitivity {
        parameter: range.parameter.clone(),
        low: at(range.low)?,
        base: SensitivityPoint::new(base_value, *base, base),
        high: at(range.high)?,
    })
}

/// One-way ("tornado") analysis: each range is evaluated at its low and high
/// bound with every other parameter held at its base value.
pub fn one_way(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    ranges: &[SensitivityRange],
    seed: u64,
) -> Result<SensitivityResult> {
    let base = evaluate_comparison(comparison, params, seed)?;

    #[cfg(feature = "parallel")]
    let parameters = ranges
        .par_iter()
        .map(|range| run_range(comparison, params, range, &base, seed))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let parameters = ranges
        .iter()
        .map(|range| run_range(comparison, params, range, &base, seed))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        ranges = ranges.len(),
        base_icer = %base.icer,
        "one-way sensitivity complete"
    );
    Ok(SensitivityResult { base, parameters })
}

/// Values one parameter takes along one axis of a two-way grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxis {
    pub parameter: ParameterKey,
    pub values: Vec<f64>,
}

impl SweepAxis {
    pub fn new(parameter: ParameterKey, values: Vec<f64>) -> Self {
        Self { parameter, values }
    }
}

/// Two-way analysis over the full grid of `first` x `second` values.
///
/// Cell `[i, j]` holds the ICER with `first` at its i-th and `second` at its
/// j-th value.
pub fn two_way(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    first: &SweepAxis,
    second: &SweepAxis,
    seed: u64,
) -> Result<SweepGrid<IcerValue>> {
    if first.values.is_empty() || second.values.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "two-way analysis needs at least one value per axis".into(),
        ));
    }
    if first.parameter == second.parameter {
        return Err(AnalysisError::InvalidInput(format!(
            "two-way analysis varies {} on both axes",
            first.parameter
        )));
    }

    let shape = vec![first.values.len(), second.values.len()];
    let cells: Vec<(f64, f64)> = first
        .values
        .iter()
        .flat_map(|&a| second.values.iter().map(move |&b| (a, b)))
        .collect();

    let evaluate = |&(a, b): &(f64, f64)| -> Result<IcerValue> {
        let perturbed = params
            .with_parameter(&first.parameter, a)?
            .with_parameter(&second.parameter, b)?;
        Ok(evaluate_comparison(comparison, &perturbed, seed)?.icer)
    };

    #[cfg(feature = "parallel")]
    let data = cells.par_iter().map(evaluate).collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let data = cells.iter().map(evaluate).collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        first = %first.parameter,
        second = %second.parameter,
        cells = data.len(),
        "two-way sensitivity complete"
    );
    SweepGrid::from_data(shape, data)
        .ok_or_else(|| AnalysisError::InvalidInput("two-way grid shape mismatch".into()))
}
