//! Incremental cost-effectiveness of an intervention against a comparator
//!
//! Uses mean total cost and mean discounted QALYs of each arm. A zero QALY
//! difference yields a sentinel instead of a division.

use crate::config::WtpThresholds;
use crate::error::Result;
use crate::model::{Classification, CohortResult, CohortSummary, IcerResult, IcerValue};

/// Classify a finite ICER.
pub fn classify(icer: f64, incremental_qaly: f64, thresholds: &WtpThresholds) -> Classification {
    if icer < 0.0 {
        if incremental_qaly > 0.0 {
            Classification::Dominant
        } else {
            Classification::Dominated
        }
    } else if icer < thresholds.very_cost_effective {
        Classification::VeryCostEffective
    } else if icer < thresholds.cost_effective {
        Classification::CostEffective
    } else if icer < thresholds.moderately_cost_effective {
        Classification::ModeratelyCostEffective
    } else {
        Classification::NotCostEffective
    }
}

impl IcerResult {
    /// Build a result from already-aggregated differences (intervention minus
    /// comparator).
    pub fn from_increments(
        incremental_cost: f64,
        incremental_qaly: f64,
        thresholds: &WtpThresholds,
    ) -> Self {
        let (icer, classification) = if incremental_qaly == 0.0 {
            if incremental_cost > 0.0 {
                (IcerValue::Dominated, Classification::Dominated)
            } else if incremental_cost == 0.0 {
                (IcerValue::Equivalent, Classification::Equivalent)
            } else {
                (
                    IcerValue::CostSavingNoBenefit,
                    Classification::CostSavingNoBenefit,
                )
            }
        } else {
            let ratio = incremental_cost / incremental_qaly;
            (
                IcerValue::Finite(ratio),
                classify(ratio, incremental_qaly, thresholds),
            )
        };

        let below = |threshold: f64| match icer {
            IcerValue::Finite(v) => classification != Classification::Dominated && v < threshold,
            _ => false,
        };

        Self {
            incremental_cost,
            incremental_qaly,
            icer,
            classification,
            within_wtp_50k: below(thresholds.cost_effective),
            within_wtp_100k: below(thresholds.moderately_cost_effective),
        }
    }

    /// Whether this comparison is acceptable at willingness-to-pay `wtp`.
    ///
    /// Dominant results always are. Otherwise the intervention must gain
    /// QALYs at a cost per QALY below `wtp`.
    pub fn is_cost_effective_at(&self, wtp: f64) -> bool {
        match (self.classification, self.icer) {
            (Classification::Dominant, _) => true,
            (_, IcerValue::Finite(v)) => self.incremental_qaly > 0.0 && v < wtp,
            _ => false,
        }
    }
}

/// Compare two cohort summaries.
pub fn icer_from_summaries(
    intervention: &CohortSummary,
    comparator: &CohortSummary,
    thresholds: &WtpThresholds,
) -> IcerResult {
    IcerResult::from_increments(
        intervention.mean_cost - comparator.mean_cost,
        intervention.mean_qalys - comparator.mean_qalys,
        thresholds,
    )
}

/// Compare two evaluated cohorts. Either cohort being empty is an error.
pub fn icer(
    intervention: &CohortResult,
    comparator: &CohortResult,
    thresholds: &WtpThresholds,
) -> Result<IcerResult> {
    let intervention = intervention.require_summary("intervention")?;
    let comparator = comparator.require_summary("comparator")?;
    Ok(icer_from_summaries(&intervention, &comparator, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> WtpThresholds {
        WtpThresholds::default()
    }

    #[test]
    fn test_classification_bands() {
        let t = thresholds();
        assert_eq!(classify(0.0, 1.0, &t), Classification::VeryCostEffective);
        assert_eq!(classify(19_999.0, 1.0, &t), Classification::VeryCostEffective);
        assert_eq!(classify(20_000.0, 1.0, &t), Classification::CostEffective);
        assert_eq!(classify(50_000.0, 1.0, &t), Classification::ModeratelyCostEffective);
        assert_eq!(classify(100_000.0, 1.0, &t), Classification::NotCostEffective);
        assert_eq!(classify(-5.0, 1.0, &t), Classification::Dominant);
        assert_eq!(classify(-5.0, -1.0, &t), Classification::Dominated);
    }

    #[test]
    fn test_zero_qaly_sentinels() {
        let t = thresholds();
        let r = IcerResult::from_increments(100.0, 0.0, &t);
        assert_eq!(r.icer, IcerValue::Dominated);
        assert!(!r.within_wtp_50k && !r.within_wtp_100k);

        let r = IcerResult::from_increments(0.0, 0.0, &t);
        assert_eq!(r.icer, IcerValue::Equivalent);
        assert_eq!(r.classification, Classification::Equivalent);

        let r = IcerResult::from_increments(-100.0, 0.0, &t);
        assert_eq!(r.icer, IcerValue::CostSavingNoBenefit);
        assert_eq!(r.classification.label(), "Cost-saving, no benefit");
    }

    #[test]
    fn test_less_effective_and_costlier_is_dominated() {
        let r = IcerResult::from_increments(10_000.0, -2.0, &thresholds());
        assert_eq!(r.classification, Classification::Dominated);
        assert!(!r.within_wtp_50k);
        assert!(!r.is_cost_effective_at(1_000_000.0));
    }

    #[test]
    fn test_cheaper_less_effective_uses_ratio_bands() {
        // positive ratio from two negative increments: savings per QALY lost
        let r = IcerResult::from_increments(-10_000.0, -1.0, &thresholds());
        assert_eq!(r.icer, IcerValue::Finite(10_000.0));
        assert_eq!(r.classification, Classification::VeryCostEffective);
        assert!(r.within_wtp_50k && r.within_wtp_100k);
        // acceptance requires a QALY gain
        assert!(!r.is_cost_effective_at(50_000.0));
    }

    #[test]
    fn test_wtp_booleans_split_between_thresholds() {
        let r = IcerResult::from_increments(75_000.0, 1.0, &thresholds());
        assert_eq!(r.classification, Classification::ModeratelyCostEffective);
        assert!(!r.within_wtp_50k);
        assert!(r.within_wtp_100k);
    }

    #[test]
    fn test_empty_cohort_is_an_error() {
        let empty = CohortResult::default();
        assert!(icer(&empty, &empty, &thresholds()).is_err());
    }
}
