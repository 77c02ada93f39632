//! Risk quintile stratification
//!
//! Patients are ranked by their risk score and cut into five groups of
//! (almost) equal size. Cut points are sample percentiles of the cohort,
//! not fixed population thresholds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::WtpThresholds;
use crate::error::{AnalysisError, Result};
use crate::model::{Cer, CohortResult, IcerResult, PatientEconomicRecord};

pub const QUINTILES: usize = 5;

/// Risk quintile, 1 (lowest risk) to 5 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quintile(pub u8);

impl fmt::Display for Quintile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuintileSummary {
    pub quintile: Quintile,
    pub patients: usize,
    pub min_risk: f64,
    pub max_risk: f64,
    pub survival_rate: f64,
    pub mean_cost: f64,
    pub mean_qalys: f64,
    /// Mean cost over mean discounted QALYs
    pub cer: Cer,
    /// Total cost over number of survivors
    pub cost_per_survivor: Cer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuintileAnalysis {
    /// 20th, 40th, 60th and 80th percentiles of the risk scores
    pub boundaries: [f64; 4],
    /// Index-aligned with the input: the quintile of each record
    pub assignments: Vec<Quintile>,
    pub quintiles: Vec<QuintileSummary>,
}

impl QuintileAnalysis {
    pub fn cer_by_quintile(&self) -> BTreeMap<Quintile, Cer> {
        self.quintiles.iter().map(|q| (q.quintile, q.cer)).collect()
    }

    pub fn get(&self, quintile: Quintile) -> Option<&QuintileSummary> {
        self.quintiles.iter().find(|q| q.quintile == quintile)
    }

    /// ICER of every quintile against `baseline` (usually the lowest-risk group).
    pub fn icer_vs_baseline(
        &self,
        baseline: Quintile,
        thresholds: &WtpThresholds,
    ) -> Result<Vec<(Quintile, IcerResult)>> {
        let base = self.get(baseline).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("no quintile {baseline} in analysis"))
        })?;
        Ok(self
            .quintiles
            .iter()
            .map(|q| {
                (
                    q.quintile,
                    IcerResult::from_increments(
                        q.mean_cost - base.mean_cost,
                        q.mean_qalys - base.mean_qalys,
                        thresholds,
                    ),
                )
            })
            .collect())
    }
}

/// Sample percentile with linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty; `p` is in [0, 100].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let position = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

/// Partition an evaluated cohort into risk quintiles.
///
/// `records` and `results` must be index-aligned. Every record needs a risk
/// score. Ties keep their input order.
pub fn stratify(
    records: &[PatientEconomicRecord],
    results: &CohortResult,
) -> Result<QuintileAnalysis> {
    if records.len() != results.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "{} records but {} results",
            records.len(),
            results.len()
        )));
    }
    if records.len() < QUINTILES {
        return Err(AnalysisError::InvalidInput(format!(
            "need at least {QUINTILES} patients to form quintiles, got {}",
            records.len()
        )));
    }

    let risks = records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            r.validate()
                .and_then(|_| r.require_risk())
                .map_err(|e| AnalysisError::record(index, e))
        })
        .collect::<Result<Vec<f64>>>()?;

    let n = risks.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| risks[a].total_cmp(&risks[b]));

    let sorted: Vec<f64> = order.iter().map(|&i| risks[i]).collect();
    let boundaries = [20.0, 40.0, 60.0, 80.0].map(|p| percentile(&sorted, p));

    let mut assignments = vec![Quintile(0); n];
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); QUINTILES];
    for (rank, &index) in order.iter().enumerate() {
        let group = rank * QUINTILES / n;
        assignments[index] = Quintile(group as u8 + 1);
        groups[group].push(index);
    }

    let quintiles = groups
        .iter()
        .enumerate()
        .map(|(group, members)| {
            let count = members.len() as f64;
            let total_cost: f64 = members.iter().map(|&i| results.patients[i].cost.total).sum();
            let total_qalys: f64 = members
                .iter()
                .map(|&i| results.patients[i].qaly.discounted_qalys)
                .sum();
            let survivors = members
                .iter()
                .filter(|&&i| results.patients[i].survived)
                .count();
            let mean_cost = total_cost / count;
            let mean_qalys = total_qalys / count;
            QuintileSummary {
                quintile: Quintile(group as u8 + 1),
                patients: members.len(),
                min_risk: members.iter().map(|&i| risks[i]).fold(f64::INFINITY, f64::min),
                max_risk: members
                    .iter()
                    .map(|&i| risks[i])
                    .fold(f64::NEG_INFINITY, f64::max),
                survival_rate: survivors as f64 / count,
                mean_cost,
                mean_qalys,
                cer: Cer::ratio(mean_cost, mean_qalys),
                cost_per_survivor: Cer::ratio(total_cost, survivors as f64),
            }
        })
        .collect();

    Ok(QuintileAnalysis {
        boundaries,
        assignments,
        quintiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
        assert!((percentile(&sorted, 20.0) - 1.8).abs() < 1e-12);
    }
}
