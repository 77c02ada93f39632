//! Running a scenario end to end and presenting the results
//!
//! All amounts in a [`ScenarioReport`] are in the scenario's parameter
//! currency. [`render_text`] converts them for display.

use std::fmt::Write as _;

use ecmo_econ_core::analysis::{
    Ceac, Evpi, NetMonetaryBenefit, SensitivityResult, StrategyComparison, bootstrap_draws, ceac,
    evpi, nmb, one_way, probabilistic_sensitivity,
};
use ecmo_econ_core::budget::{BudgetImpactResult, PerCase, project_budget};
use ecmo_econ_core::error::AnalysisError;
use ecmo_econ_core::icer::icer;
use ecmo_econ_core::model::{
    Cer, CohortResult, CohortSummary, Currency, IcerResult, PatientEconomicRecord,
};
use ecmo_econ_core::nhi::{NhiReimbursement, cohort_reimbursement};
use ecmo_econ_core::stratify::{QUINTILES, QuintileAnalysis, stratify};
use ecmo_econ_core::{evaluate_cohort, partition_valid};
use serde::Serialize;

use crate::format::{
    format_cer, format_compact_money, format_icer, format_money, format_percentage,
};
use crate::scenario::Scenario;

/// A record left out of the analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub arm: &'static str,
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmReport {
    pub summary: CohortSummary,
    /// Total cost over number of survivors
    pub cost_per_survivor: Cer,
}

impl ArmReport {
    fn new(results: &CohortResult, which: &'static str) -> Result<Self, AnalysisError> {
        let summary = results.require_summary(which)?;
        let survivors = results.patients.iter().filter(|p| p.survived).count();
        Ok(Self {
            summary,
            cost_per_survivor: Cer::ratio(results.total_cost(), survivors as f64),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PsaSummary {
    pub iterations: usize,
    pub mean_incremental_cost: f64,
    pub mean_incremental_qaly: f64,
    pub ceac: Ceac,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub seed: u64,
    pub currency: Currency,
    pub rejected: Vec<RejectedRecord>,
    pub intervention: ArmReport,
    pub comparator: ArmReport,
    pub icer: IcerResult,
    pub net_benefit: Vec<NetMonetaryBenefit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetImpactResult>,
    /// Mean NHI reimbursement per intervention patient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nhi: Option<NhiReimbursement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityResult>,
    /// Intervention arm by risk; present when every record has a score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quintiles: Option<QuintileAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_ceac: Option<Ceac>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub psa: Option<PsaSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evpi: Vec<Evpi>,
}

/// Drop invalid records, logging each one.
fn keep_valid(
    arm: &'static str,
    records: &[PatientEconomicRecord],
    scenario: &Scenario,
    rejected: &mut Vec<RejectedRecord>,
) -> Vec<PatientEconomicRecord> {
    let partitioned = partition_valid(records, &scenario.parameters);
    for (index, reason) in partitioned.rejected {
        tracing::warn!(arm, index, %reason, "skipping invalid record");
        rejected.push(RejectedRecord {
            arm,
            index,
            reason: reason.to_string(),
        });
    }
    partitioned.valid
}

/// Run every analysis the scenario configures.
///
/// With `skip_invalid`, records the engines would reject are dropped and
/// listed in the report; otherwise the first invalid record aborts the run.
pub fn run_scenario(
    scenario: &Scenario,
    skip_invalid: bool,
) -> Result<ScenarioReport, AnalysisError> {
    let params = &scenario.parameters;
    let seed = scenario.seed;
    let thresholds = params.thresholds();

    let mut rejected = Vec::new();
    let (intervention_records, comparator_records) = if skip_invalid {
        (
            keep_valid("intervention", &scenario.intervention, scenario, &mut rejected),
            keep_valid("comparator", &scenario.comparator, scenario, &mut rejected),
        )
    } else {
        (scenario.intervention.clone(), scenario.comparator.clone())
    };

    let intervention = evaluate_cohort(&intervention_records, params, seed)?;
    let comparator = evaluate_cohort(&comparator_records, params, seed)?;
    let intervention_report = ArmReport::new(&intervention, "intervention")?;
    let comparator_report = ArmReport::new(&comparator, "comparator")?;
    let icer_result = icer(&intervention, &comparator, thresholds)?;
    tracing::info!(
        intervention = intervention.len(),
        comparator = comparator.len(),
        icer = %icer_result.icer,
        classification = %icer_result.classification,
        "cohorts evaluated"
    );

    let net_benefit = scenario
        .wtp
        .iter()
        .map(|&wtp| nmb(icer_result.incremental_qaly, icer_result.incremental_cost, wtp))
        .collect();

    let budget = scenario
        .budget
        .as_ref()
        .map(|inputs| {
            project_budget(
                inputs,
                &PerCase::from(&intervention_report.summary),
                Some(&PerCase::from(&comparator_report.summary)),
                params,
            )
        })
        .transpose()?;

    let nhi = scenario
        .nhi
        .as_ref()
        .map(|inputs| cohort_reimbursement(&intervention, inputs, params.currency()))
        .transpose()?;

    let comparison = StrategyComparison::new(&intervention_records, &comparator_records);
    let sensitivity = if scenario.sensitivity.is_empty() {
        None
    } else {
        Some(one_way(&comparison, params, &scenario.sensitivity, seed)?)
    };

    let quintiles = if intervention_records.len() < QUINTILES {
        tracing::info!(
            patients = intervention_records.len(),
            "too few intervention records for quintiles, skipping stratification"
        );
        None
    } else if intervention_records.iter().all(|r| r.risk_score.is_some()) {
        Some(stratify(&intervention_records, &intervention)?)
    } else {
        tracing::info!("intervention records lack risk scores, skipping stratification");
        None
    };

    let bootstrap = scenario
        .bootstrap_iterations
        .map(|iterations| bootstrap_draws(&intervention, &comparator, iterations, seed))
        .transpose()?;
    let bootstrap_ceac = bootstrap
        .as_deref()
        .map(|draws| ceac(draws, &scenario.wtp))
        .transpose()?;

    let psa = scenario
        .psa
        .as_ref()
        .map(|settings| {
            probabilistic_sensitivity(
                &comparison,
                params,
                &settings.parameters,
                settings.iterations,
                seed,
            )
        })
        .transpose()?;
    let psa_summary = psa
        .as_ref()
        .map(|result| -> Result<PsaSummary, AnalysisError> {
            Ok(PsaSummary {
                iterations: result.draws.len(),
                mean_incremental_cost: result.mean_incremental_cost,
                mean_incremental_qaly: result.mean_incremental_qaly,
                ceac: ceac(&result.draws, &scenario.wtp)?,
            })
        })
        .transpose()?;

    // probabilistic draws are preferred over bootstrap draws for EVPI
    let draws = psa.as_ref().map(|r| r.draws.as_slice()).or(bootstrap.as_deref());
    let evpi = match (scenario.evpi, draws) {
        (Some(settings), Some(draws)) => scenario
            .wtp
            .iter()
            .map(|&wtp| {
                evpi(
                    draws,
                    wtp,
                    settings.population,
                    settings.horizon_years,
                    params.discount_rate(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?,
        (Some(_), None) => {
            tracing::warn!("EVPI requested without bootstrap or PSA draws");
            Vec::new()
        }
        _ => Vec::new(),
    };

    Ok(ScenarioReport {
        name: scenario.display_name().to_string(),
        seed,
        currency: params.currency(),
        rejected,
        intervention: intervention_report,
        comparator: comparator_report,
        icer: icer_result,
        net_benefit,
        budget,
        nhi,
        sensitivity,
        quintiles,
        bootstrap_ceac,
        psa: psa_summary,
        evpi,
    })
}

fn render_ceac(out: &mut String, title: &str, curve: &Ceac, from: Currency, to: Currency) {
    let _ = writeln!(out, "\n{title}");
    for point in &curve.points {
        let _ = writeln!(
            out,
            "  {:>22}  {:>8}",
            format_money(from.convert(point.wtp, to), to),
            format_percentage(point.probability)
        );
    }
}

/// Plain-text tables of every section present in the report, with amounts
/// shown in `display`.
pub fn render_text(report: &ScenarioReport, display: Currency) -> String {
    let from = report.currency;
    let money = |v: f64| format_money(from.convert(v, display), display);
    let mut out = String::new();

    let _ = writeln!(out, "Scenario: {} (seed {})", report.name, report.seed);
    if !report.rejected.is_empty() {
        let _ = writeln!(out, "Skipped {} invalid record(s):", report.rejected.len());
        for r in &report.rejected {
            let _ = writeln!(out, "  {} #{}: {}", r.arm, r.index, r.reason);
        }
    }

    let _ = writeln!(
        out,
        "\n{:<14}{:>10}{:>20}{:>12}{:>10}{:>22}",
        "Arm", "Patients", "Mean cost", "Mean QALYs", "Survival", "Cost per survivor"
    );
    let arms = [
        ("Intervention", &report.intervention),
        ("Comparator", &report.comparator),
    ];
    for (label, arm) in arms {
        let _ = writeln!(
            out,
            "{:<14}{:>10}{:>20}{:>12.3}{:>10}{:>22}",
            label,
            arm.summary.patients,
            money(arm.summary.mean_cost),
            arm.summary.mean_qalys,
            format_percentage(arm.summary.survival_rate),
            format_cer(arm.cost_per_survivor, from, display),
        );
    }

    let icer = &report.icer;
    let _ = writeln!(out, "\nIncremental cost:  {}", money(icer.incremental_cost));
    let _ = writeln!(out, "Incremental QALYs: {:.3}", icer.incremental_qaly);
    let _ = writeln!(out, "ICER:              {}", format_icer(icer.icer, from, display));
    let _ = writeln!(out, "Classification:    {}", icer.classification);

    if !report.net_benefit.is_empty() {
        let _ = writeln!(out, "\nNet monetary benefit");
        for n in &report.net_benefit {
            let _ = writeln!(
                out,
                "  {:>22}  {:>22}  {}",
                money(n.wtp),
                money(n.value),
                if n.cost_effective { "cost-effective" } else { "-" }
            );
        }
    }

    if let Some(budget) = &report.budget {
        let _ = writeln!(out, "\nBudget impact ({} years)", budget.inputs.years);
        let _ = writeln!(
            out,
            "  {:>4}{:>10}{:>16}{:>16}{:>12}",
            "Year", "Cases", "Cost", "Incremental", "QALYs"
        );
        for y in &budget.years {
            let _ = writeln!(
                out,
                "  {:>4}{:>10.1}{:>16}{:>16}{:>12.1}",
                y.year,
                y.cases,
                format_compact_money(from.convert(y.cost, display), display),
                y.incremental_cost
                    .map(|c| format_compact_money(from.convert(c, display), display))
                    .unwrap_or_default(),
                y.qalys
            );
        }
        let _ = writeln!(out, "  Cumulative: {}", money(budget.cumulative_cost));
    }

    if let Some(nhi) = &report.nhi {
        let _ = writeln!(out, "\nNHI reimbursement (per intervention patient)");
        let _ = writeln!(out, "  DRG payment:    {}", money(nhi.drg_payment));
        let _ = writeln!(out, "  ICU additional: {}", money(nhi.icu_additional));
        let _ = writeln!(out, "  Reimbursed:     {}", money(nhi.total));
        let _ = writeln!(out, "  Actual cost:    {}", money(nhi.actual_cost));
        let _ = writeln!(
            out,
            "  Margin:         {} ({:.1}%)",
            money(nhi.margin),
            nhi.margin_pct
        );
    }

    if let Some(sensitivity) = &report.sensitivity {
        let _ = writeln!(out, "\nOne-way sensitivity (by ICER swing)");
        for p in sensitivity.tornado() {
            let pct = |v: Option<f64>| {
                v.map(|v| format!("{v:+.1}%"))
                    .unwrap_or_else(|| "n/a".into())
            };
            let _ = writeln!(
                out,
                "  {:<36} low {:>26} ({:>8})  high {:>26} ({:>8})",
                p.parameter.to_string(),
                format_icer(p.low.icer(), from, display),
                pct(p.low.pct_change),
                format_icer(p.high.icer(), from, display),
                pct(p.high.pct_change),
            );
        }
    }

    if let Some(quintiles) = &report.quintiles {
        let _ = writeln!(out, "\nRisk quintiles (intervention arm)");
        for q in &quintiles.quintiles {
            let _ = writeln!(
                out,
                "  {} n={:<5} risk {:.3}-{:.3}  survival {:>8}  CER {}",
                q.quintile,
                q.patients,
                q.min_risk,
                q.max_risk,
                format_percentage(q.survival_rate),
                format_cer(q.cer, from, display),
            );
        }
    }

    if let Some(curve) = &report.bootstrap_ceac {
        render_ceac(&mut out, "Acceptability (bootstrap)", curve, from, display);
    }
    if let Some(psa) = &report.psa {
        render_ceac(
            &mut out,
            &format!("Acceptability (PSA, {} iterations)", psa.iterations),
            &psa.ceac,
            from,
            display,
        );
    }
    if !report.evpi.is_empty() {
        let _ = writeln!(out, "\nExpected value of perfect information");
        for e in &report.evpi {
            let _ = writeln!(
                out,
                "  {:>22}  per person {:>18}  population {:>18}",
                money(e.wtp),
                money(e.per_person),
                money(e.population_evpi)
            );
        }
    }

    out
}
