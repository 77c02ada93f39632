//! Multi-year population budget impact
//!
//! Each projection year is computed on its own from the per-case means and
//! then summed; there is no state carried from one year to the next. Year 1
//! is undiscounted.

use serde::{Deserialize, Serialize};

use crate::config::ParameterSet;
use crate::error::{AnalysisError, Result};
use crate::model::CohortSummary;

/// How the share of the eligible population treated develops over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Uptake {
    /// Full utilization from year one
    #[default]
    Constant,
    /// Utilization ramps linearly, reaching its full value in the final year
    LinearRamp,
}

impl Uptake {
    /// Fraction of the configured utilization reached in `year` (1-based)
    pub fn fraction(&self, year: u32, horizon: u32) -> f64 {
        match self {
            Uptake::Constant => 1.0,
            Uptake::LinearRamp => (year as f64 / horizon as f64).min(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetInputs {
    /// Eligible population per year
    pub population: u64,
    /// Share of the population that receives the therapy, in [0, 1]
    pub utilization: f64,
    pub years: u32,
    #[serde(default)]
    pub uptake: Uptake,
}

impl BudgetInputs {
    pub fn new(population: u64, utilization: f64, years: u32) -> Self {
        Self {
            population,
            utilization,
            years,
            uptake: Uptake::Constant,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.population < 1 {
            return Err(AnalysisError::InvalidInput(
                "population must be at least 1".into(),
            ));
        }
        if self.years < 1 {
            return Err(AnalysisError::InvalidInput(
                "budget horizon must be at least 1 year".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.utilization) {
            return Err(AnalysisError::InvalidInput(format!(
                "utilization must be within [0, 1], got {}",
                self.utilization
            )));
        }
        Ok(())
    }
}

/// Mean cost and discounted QALYs of one treated case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerCase {
    pub cost: f64,
    pub qalys: f64,
}

impl From<&CohortSummary> for PerCase {
    fn from(summary: &CohortSummary) -> Self {
        Self {
            cost: summary.mean_cost,
            qalys: summary.mean_qalys,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetYear {
    pub year: u32,
    pub cases: f64,
    pub discount_factor: f64,
    pub undiscounted_cost: f64,
    pub cost: f64,
    pub qalys: f64,
    /// Discounted cost above the comparator, when one was given
    pub incremental_cost: Option<f64>,
    pub incremental_qalys: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetImpactResult {
    pub inputs: BudgetInputs,
    pub years: Vec<BudgetYear>,
    pub cumulative_cost: f64,
    pub cumulative_undiscounted_cost: f64,
    pub cumulative_qalys: f64,
    pub cumulative_incremental_cost: Option<f64>,
    pub cumulative_incremental_qalys: Option<f64>,
}

/// `1 / (1 + rate)^(year - 1)`
pub fn year_discount_factor(rate: f64, year: u32) -> f64 {
    1.0 / (1.0 + rate).powi(year as i32 - 1)
}

/// Project yearly and cumulative spending and QALYs for a treated population.
///
/// With a `comparator`, each year also reports the discounted difference
/// between treating the same cases with the intervention and the comparator.
pub fn project_budget(
    inputs: &BudgetInputs,
    per_case: &PerCase,
    comparator: Option<&PerCase>,
    params: &ParameterSet,
) -> Result<BudgetImpactResult> {
    inputs.validate()?;

    let rate = params.discount_rate();
    let annual_cases = inputs.population as f64 * inputs.utilization;

    let years: Vec<BudgetYear> = (1..=inputs.years)
        .map(|year| {
            let cases = annual_cases * inputs.uptake.fraction(year, inputs.years);
            let discount_factor = year_discount_factor(rate, year);
            let undiscounted_cost = cases * per_case.cost;
            BudgetYear {
                year,
                cases,
                discount_factor,
                undiscounted_cost,
                cost: undiscounted_cost * discount_factor,
                qalys: cases * per_case.qalys * discount_factor,
                incremental_cost: comparator
                    .map(|c| cases * (per_case.cost - c.cost) * discount_factor),
                incremental_qalys: comparator
                    .map(|c| cases * (per_case.qalys - c.qalys) * discount_factor),
            }
        })
        .collect();

    let cumulative_incremental_cost = comparator.map(|_| {
        years
            .iter()
            .filter_map(|y| y.incremental_cost)
            .sum::<f64>()
    });
    let cumulative_incremental_qalys = comparator.map(|_| {
        years
            .iter()
            .filter_map(|y| y.incremental_qalys)
            .sum::<f64>()
    });

    let result = BudgetImpactResult {
        inputs: *inputs,
        cumulative_cost: years.iter().map(|y| y.cost).sum(),
        cumulative_undiscounted_cost: years.iter().map(|y| y.undiscounted_cost).sum(),
        cumulative_qalys: years.iter().map(|y| y.qalys).sum(),
        cumulative_incremental_cost,
        cumulative_incremental_qalys,
        years,
    };

    tracing::debug!(
        years = inputs.years,
        cumulative_cost = result.cumulative_cost,
        "budget impact projected"
    );
    Ok(result)
}
