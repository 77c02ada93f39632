//! Taiwan National Health Insurance reimbursement
//!
//! A course is paid a DRG amount by ECMO mode plus a per-day ICU payment
//! capped by the schedule. Schedule amounts are TWD; results are converted
//! into the parameter currency so they compare directly with costs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::check_cost;
use crate::error::{AnalysisError, ConfigError, Result};
use crate::model::{CohortResult, CostBreakdown, Currency};

/// ECMO configuration, which selects the DRG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcmoMode {
    /// Veno-arterial
    #[default]
    Va,
    /// Veno-venous
    Vv,
}

impl fmt::Display for EcmoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcmoMode::Va => f.write_str("VA"),
            EcmoMode::Vv => f.write_str("VV"),
        }
    }
}

/// Payment schedule in TWD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhiSchedule {
    pub va_drg: f64,
    pub vv_drg: f64,
    /// ICU payment per day on top of the DRG
    pub icu_daily_rate: f64,
    pub icu_daily_cap: f64,
}

impl Default for NhiSchedule {
    fn default() -> Self {
        Self {
            va_drg: 800_000.0,
            vv_drg: 750_000.0,
            icu_daily_rate: 10_000.0,
            icu_daily_cap: 45_000.0,
        }
    }
}

impl NhiSchedule {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_cost("nhi.va_drg", self.va_drg)?;
        check_cost("nhi.vv_drg", self.vv_drg)?;
        check_cost("nhi.icu_daily_rate", self.icu_daily_rate)?;
        check_cost("nhi.icu_daily_cap", self.icu_daily_cap)
    }

    pub fn drg_payment(&self, mode: EcmoMode) -> f64 {
        match mode {
            EcmoMode::Va => self.va_drg,
            EcmoMode::Vv => self.vv_drg,
        }
    }

    /// ICU payment for `days` in the unit, never above the daily cap
    pub fn icu_payment(&self, days: f64) -> f64 {
        days * self.icu_daily_rate.min(self.icu_daily_cap)
    }
}

/// Mode and schedule a cohort is reimbursed under
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NhiInputs {
    #[serde(default)]
    pub mode: EcmoMode,
    #[serde(default)]
    pub schedule: NhiSchedule,
}

/// Reimbursement against actual cost, in the parameter currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NhiReimbursement {
    pub drg_payment: f64,
    pub icu_additional: f64,
    pub total: f64,
    pub actual_cost: f64,
    /// `total - actual_cost`; negative when the hospital loses money
    pub margin: f64,
    /// Margin as a percentage of the reimbursement, 0 when nothing is paid
    pub margin_pct: f64,
}

impl NhiReimbursement {
    fn from_parts(drg_payment: f64, icu_additional: f64, actual_cost: f64) -> Self {
        let total = drg_payment + icu_additional;
        let margin = total - actual_cost;
        let margin_pct = if total > 0.0 {
            margin / total * 100.0
        } else {
            0.0
        };
        Self {
            drg_payment,
            icu_additional,
            total,
            actual_cost,
            margin,
            margin_pct,
        }
    }
}

/// Reimbursement of one costed course. ICU days are the days on support.
pub fn reimbursement(
    breakdown: &CostBreakdown,
    inputs: &NhiInputs,
    currency: Currency,
) -> NhiReimbursement {
    let schedule = &inputs.schedule;
    let icu_days = breakdown.duration_days as f64;
    NhiReimbursement::from_parts(
        Currency::Twd.convert(schedule.drg_payment(inputs.mode), currency),
        Currency::Twd.convert(schedule.icu_payment(icu_days), currency),
        breakdown.total,
    )
}

/// Mean reimbursement per patient of an evaluated cohort.
///
/// The margin percentage is taken from the mean amounts, not averaged.
pub fn cohort_reimbursement(
    results: &CohortResult,
    inputs: &NhiInputs,
    currency: Currency,
) -> Result<NhiReimbursement> {
    inputs.schedule.validate()?;
    if results.is_empty() {
        return Err(AnalysisError::EmptyCohort("reimbursed"));
    }

    let n = results.len() as f64;
    let (drg, icu, cost) = results
        .patients
        .iter()
        .map(|p| reimbursement(&p.cost, inputs, currency))
        .fold((0.0, 0.0, 0.0), |(d, i, c), r| {
            (d + r.drg_payment, i + r.icu_additional, c + r.actual_cost)
        });

    let mean = NhiReimbursement::from_parts(drg / n, icu / n, cost / n);
    tracing::debug!(
        mode = %inputs.mode,
        patients = results.len(),
        margin = mean.margin,
        "NHI reimbursement computed"
    );
    Ok(mean)
}
