//! Decision uncertainty: acceptability curves, net monetary benefit,
//! bootstrap and probabilistic draws, and the value of perfect information.
//!
//! Draw generation gives iteration `i` its own stream derived from
//! `(seed, i)`, so the draws are identical with or without the `parallel`
//! feature.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{StrategyComparison, UncertainParameter};
use crate::cohort::{evaluate_cohort, stream_rng, stream_seed};
use crate::config::ParameterSet;
use crate::error::{AnalysisError, Result};
use crate::model::{CohortResult, PatientResult};

/// One joint realisation of the incremental cost and QALYs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcerDraw {
    pub incremental_cost: f64,
    pub incremental_qaly: f64,
}

impl IcerDraw {
    pub fn new(incremental_cost: f64, incremental_qaly: f64) -> Self {
        Self {
            incremental_cost,
            incremental_qaly,
        }
    }

    /// Dominant draws always count. Otherwise QALYs must be gained at a cost
    /// per QALY below `wtp`.
    pub fn is_cost_effective_at(&self, wtp: f64) -> bool {
        if self.incremental_qaly <= 0.0 {
            return false;
        }
        self.incremental_cost <= 0.0 || self.incremental_cost / self.incremental_qaly < wtp
    }

    pub fn net_monetary_benefit(&self, wtp: f64) -> f64 {
        self.incremental_qaly * wtp - self.incremental_cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CeacPoint {
    pub wtp: f64,
    /// Share of draws that are cost-effective at `wtp`
    pub probability: f64,
}

/// Cost-effectiveness acceptability curve, ascending in willingness to pay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ceac {
    pub points: Vec<CeacPoint>,
}

impl Ceac {
    pub fn probability_at(&self, wtp: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.wtp == wtp)
            .map(|p| p.probability)
    }
}

pub fn ceac(draws: &[IcerDraw], wtps: &[f64]) -> Result<Ceac> {
    if draws.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "acceptability curve needs at least one draw".into(),
        ));
    }
    if let Some(bad) = wtps.iter().find(|w| !w.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "willingness-to-pay threshold must be finite, got {bad}"
        )));
    }

    let mut sorted = wtps.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total = draws.len() as f64;
    let points: Vec<CeacPoint> = sorted
        .into_iter()
        .map(|wtp| CeacPoint {
            wtp,
            probability: draws.iter().filter(|d| d.is_cost_effective_at(wtp)).count() as f64
                / total,
        })
        .collect();

    for pair in points.windows(2) {
        if pair[1].probability < pair[0].probability {
            return Err(AnalysisError::NonMonotoneCeac {
                wtp: pair[1].wtp,
                previous: pair[0].probability,
                current: pair[1].probability,
            });
        }
    }

    Ok(Ceac { points })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetMonetaryBenefit {
    pub wtp: f64,
    pub value: f64,
    /// Strictly positive benefit; break-even is not cost-effective
    pub cost_effective: bool,
}

/// `incremental_qaly * wtp - incremental_cost`
pub fn nmb(incremental_qaly: f64, incremental_cost: f64, wtp: f64) -> NetMonetaryBenefit {
    let value = incremental_qaly * wtp - incremental_cost;
    NetMonetaryBenefit {
        wtp,
        value,
        cost_effective: value > 0.0,
    }
}

fn resampled_means<R: Rng>(patients: &[PatientResult], rng: &mut R) -> (f64, f64) {
    let n = patients.len();
    let (cost, qalys) = (0..n).fold((0.0, 0.0), |(cost, qalys), _| {
        let p = &patients[rng.random_range(0..n)];
        (cost + p.cost.total, qalys + p.qaly.discounted_qalys)
    });
    (cost / n as f64, qalys / n as f64)
}

/// Non-parametric bootstrap: each iteration resamples both arms' patients
/// with replacement and records the difference in means.
pub fn bootstrap_draws(
    intervention: &CohortResult,
    comparator: &CohortResult,
    iterations: usize,
    seed: u64,
) -> Result<Vec<IcerDraw>> {
    if intervention.is_empty() {
        return Err(AnalysisError::EmptyCohort("intervention"));
    }
    if comparator.is_empty() {
        return Err(AnalysisError::EmptyCohort("comparator"));
    }

    let draw = |i: usize| {
        let mut rng = stream_rng(seed, i);
        let (cost_a, qaly_a) = resampled_means(&intervention.patients, &mut rng);
        let (cost_b, qaly_b) = resampled_means(&comparator.patients, &mut rng);
        IcerDraw::new(cost_a - cost_b, qaly_a - qaly_b)
    };

    #[cfg(feature = "parallel")]
    let draws: Vec<IcerDraw> = (0..iterations).into_par_iter().map(draw).collect();

    #[cfg(not(feature = "parallel"))]
    let draws: Vec<IcerDraw> = (0..iterations).map(draw).collect();

    tracing::debug!(iterations, seed, "bootstrap draws generated");
    Ok(draws)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsaResult {
    pub draws: Vec<IcerDraw>,
    pub mean_incremental_cost: f64,
    pub mean_incremental_qaly: f64,
}

impl PsaResult {
    fn from_draws(draws: Vec<IcerDraw>) -> Self {
        let n = draws.len() as f64;
        Self {
            mean_incremental_cost: draws.iter().map(|d| d.incremental_cost).sum::<f64>() / n,
            mean_incremental_qaly: draws.iter().map(|d| d.incremental_qaly).sum::<f64>() / n,
            draws,
        }
    }

    pub fn probability_cost_effective(&self, wtp: f64) -> f64 {
        self.draws
            .iter()
            .filter(|d| d.is_cost_effective_at(wtp))
            .count() as f64
            / self.draws.len() as f64
    }
}

fn psa_iteration(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    parameters: &[UncertainParameter],
    seed: u64,
    iteration: usize,
) -> Result<IcerDraw> {
    let mut rng = stream_rng(seed, iteration);
    let mut config = params.config().clone();
    for uncertain in parameters {
        let value = uncertain.sample(&mut rng)?;
        uncertain.parameter.apply(&mut config, value)?;
    }
    let sampled = ParameterSet::new(config)?;

    let cohort_seed = stream_seed(seed, iteration as u64);
    let intervention = evaluate_cohort(comparison.intervention, &sampled, cohort_seed)?
        .require_summary("intervention")?;
    let comparator = evaluate_cohort(comparison.comparator, &sampled, cohort_seed)?
        .require_summary("comparator")?;
    Ok(IcerDraw::new(
        intervention.mean_cost - comparator.mean_cost,
        intervention.mean_qalys - comparator.mean_qalys,
    ))
}

/// Probabilistic sensitivity analysis.
///
/// Each iteration draws every listed parameter from its distribution,
/// clamps it into its valid range and re-evaluates both arms.
pub fn probabilistic_sensitivity(
    comparison: &StrategyComparison<'_>,
    params: &ParameterSet,
    parameters: &[UncertainParameter],
    iterations: usize,
    seed: u64,
) -> Result<PsaResult> {
    if iterations == 0 {
        return Err(AnalysisError::InvalidInput(
            "probabilistic analysis needs at least one iteration".into(),
        ));
    }

    #[cfg(feature = "parallel")]
    let draws = (0..iterations)
        .into_par_iter()
        .map(|i| psa_iteration(comparison, params, parameters, seed, i))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let draws = (0..iterations)
        .map(|i| psa_iteration(comparison, params, parameters, seed, i))
        .collect::<Result<Vec<_>>>()?;

    let result = PsaResult::from_draws(draws);
    tracing::debug!(
        iterations,
        parameters = parameters.len(),
        mean_incremental_cost = result.mean_incremental_cost,
        mean_incremental_qaly = result.mean_incremental_qaly,
        "probabilistic sensitivity complete"
    );
    Ok(result)
}

/// Expected value of perfect information at one willingness to pay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evpi {
    pub wtp: f64,
    pub per_person: f64,
    pub population: u64,
    pub horizon_years: u32,
    /// `per_person` times the population summed over the discounted horizon
    pub population_evpi: f64,
}

/// Per-person EVPI is `E[max(NMB, 0)] - max(E[NMB], 0)` over the draws, with
/// the comparator's net benefit taken as zero.
pub fn evpi(
    draws: &[IcerDraw],
    wtp: f64,
    population: u64,
    horizon_years: u32,
    discount_rate: f64,
) -> Result<Evpi> {
    if draws.is_empty() {
        return Err(AnalysisError::InvalidInput("EVPI needs at least one draw".into()));
    }
    if !(discount_rate.is_finite() && discount_rate >= 0.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "discount rate must be non-negative, got {discount_rate}"
        )));
    }

    let n = draws.len() as f64;
    let nmbs: Vec<f64> = draws.iter().map(|d| d.net_monetary_benefit(wtp)).collect();
    let expected_max = nmbs.iter().map(|v| v.max(0.0)).sum::<f64>() / n;
    let max_expected = (nmbs.iter().sum::<f64>() / n).max(0.0);
    let per_person = (expected_max - max_expected).max(0.0);

    let annuity: f64 = (0..horizon_years)
        .map(|t| 1.0 / (1.0 + discount_rate).powi(t as i32))
        .sum();

    Ok(Evpi {
        wtp,
        per_person,
        population,
        horizon_years,
        population_evpi: per_person * population as f64 * annuity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_draw_counts_at_any_wtp() {
        let dominant = IcerDraw::new(-5_000.0, 0.5);
        assert!(dominant.is_cost_effective_at(-1_000_000.0));
        assert!(dominant.is_cost_effective_at(0.0));

        let costly = IcerDraw::new(5_000.0, 0.5);
        assert!(!costly.is_cost_effective_at(0.0));
        assert!(costly.is_cost_effective_at(10_001.0));

        let harmful = IcerDraw::new(-5_000.0, -0.5);
        assert!(!harmful.is_cost_effective_at(1_000_000.0));
    }

    #[test]
    fn test_nmb_break_even_is_not_cost_effective() {
        let result = nmb(5.0, 50_000.0, 10_000.0);
        assert_eq!(result.value, 0.0);
        assert!(!result.cost_effective);
        assert!(nmb(5.0, 49_999.0, 10_000.0).cost_effective);
    }

    #[test]
    fn test_dominant_draw_counts_at_zero_wtp() {
        assert!(IcerDraw::new(-100.0, 1.0).is_cost_effective_at(0.0));
        assert!(!IcerDraw::new(-100.0, 0.0).is_cost_effective_at(1e9));
        assert!(!IcerDraw::new(100.0, -1.0).is_cost_effective_at(1e9));
    }

    #[test]
    fn test_ceac_sorts_thresholds() {
        let draws = [
            IcerDraw::new(10_000.0, 1.0),
            IcerDraw::new(30_000.0, 1.0),
            IcerDraw::new(-5.0, 1.0),
            IcerDraw::new(1_000.0, -1.0),
        ];
        let curve = ceac(&draws, &[50_000.0, 0.0, 20_000.0]).unwrap();
        let wtps: Vec<f64> = curve.points.iter().map(|p| p.wtp).collect();
        assert_eq!(wtps, vec![0.0, 20_000.0, 50_000.0]);
        assert_eq!(curve.probability_at(0.0), Some(0.25));
        assert_eq!(curve.probability_at(20_000.0), Some(0.5));
        assert_eq!(curve.probability_at(50_000.0), Some(0.75));
    }

    #[test]
    fn test_ceac_rejects_empty_draws() {
        assert!(ceac(&[], &[1.0]).is_err());
    }

    #[test]
    fn test_evpi_zero_without_decision_uncertainty() {
        let draws = [IcerDraw::new(1_000.0, 1.0), IcerDraw::new(2_000.0, 1.0)];
        let result = evpi(&draws, 50_000.0, 100, 5, 0.03).unwrap();
        assert_eq!(result.per_person, 0.0);
        assert_eq!(result.population_evpi, 0.0);
    }

    #[test]
    fn test_evpi_scales_with_population_and_horizon() {
        // NMB at wtp 1: +10 and -10, so E[max] = 5 and max(E) = 0
        let draws = [IcerDraw::new(-10.0, 0.0), IcerDraw::new(10.0, 0.0)];
        let result = evpi(&draws, 1.0, 10, 2, 0.0).unwrap();
        assert_eq!(result.per_person, 5.0);
        assert_eq!(result.population_evpi, 100.0);
    }
}
