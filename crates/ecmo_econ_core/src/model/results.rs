//! Per-patient and per-cohort results
//!
//! Everything here is a read-only value built fresh by the engines. Cohort
//! outputs stay index-aligned with the input records.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One complication category and whether it occurred for this patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedComplication {
    pub name: String,
    pub occurred: bool,
    /// Pre-multiplier cost, zero when the complication did not occur
    pub cost: f64,
}

/// Itemized cost of one patient's course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub duration_days: u32,
    pub daily_cost: f64,
    pub initiation_cost: f64,
    /// Zero unless the patient survived
    pub termination_cost: f64,
    pub replacement_count: u32,
    pub replacement_cost: f64,
    pub complications: Vec<RealizedComplication>,
    pub complication_cost: f64,
    /// Sum of all components before the regional multiplier
    pub subtotal: f64,
    pub multiplier: f64,
    /// `multiplier * subtotal`
    pub total: f64,
}

impl CostBreakdown {
    pub fn procedure_cost(&self) -> f64 {
        self.initiation_cost + self.termination_cost
    }

    /// Names of the complications that occurred
    pub fn occurred_complications(&self) -> impl Iterator<Item = &str> {
        self.complications
            .iter()
            .filter(|c| c.occurred)
            .map(|c| c.name.as_str())
    }
}

/// Quality-adjusted survival for one patient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QalyResult {
    pub utility: f64,
    pub adjusted_life_expectancy: f64,
    pub undiscounted_qalys: f64,
    pub discount_factor: f64,
    pub discounted_qalys: f64,
}

impl QalyResult {
    /// Result for a patient who died: no utility, no QALYs.
    pub fn death() -> Self {
        Self {
            utility: 0.0,
            adjusted_life_expectancy: 0.0,
            undiscounted_qalys: 0.0,
            discount_factor: 1.0,
            discounted_qalys: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientResult {
    pub survived: bool,
    pub cost: CostBreakdown,
    pub qaly: QalyResult,
}

/// Aggregate means of an evaluated cohort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub patients: usize,
    pub mean_cost: f64,
    pub mean_qalys: f64,
    pub mean_undiscounted_qalys: f64,
    pub survival_rate: f64,
}

/// Index-aligned results for every record of a cohort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortResult {
    pub patients: Vec<PatientResult>,
}

impl CohortResult {
    pub fn new(patients: Vec<PatientResult>) -> Self {
        Self { patients }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.patients.iter().map(|p| p.cost.total).sum()
    }

    pub fn total_qalys(&self) -> f64 {
        self.patients.iter().map(|p| p.qaly.discounted_qalys).sum()
    }

    /// Means over the cohort, `None` when the cohort is empty
    pub fn summary(&self) -> Option<CohortSummary> {
        if self.patients.is_empty() {
            return None;
        }
        let n = self.patients.len() as f64;
        let undiscounted: f64 = self.patients.iter().map(|p| p.qaly.undiscounted_qalys).sum();
        let survivors = self.patients.iter().filter(|p| p.survived).count();
        Some(CohortSummary {
            patients: self.patients.len(),
            mean_cost: self.total_cost() / n,
            mean_qalys: self.total_qalys() / n,
            mean_undiscounted_qalys: undiscounted / n,
            survival_rate: survivors as f64 / n,
        })
    }

    /// Like [`summary`](Self::summary) but reports an empty cohort as an error.
    pub fn require_summary(&self, which: &'static str) -> Result<CohortSummary, AnalysisError> {
        self.summary().ok_or(AnalysisError::EmptyCohort(which))
    }
}
