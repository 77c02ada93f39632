//! Ratio results with explicit variants for the zero-denominator cases
//!
//! A comparison with no QALY difference is clinically meaningful, so it is
//! modelled as a variant rather than as an infinity or NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Incremental cost-effectiveness ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IcerValue {
    /// Cost per QALY gained
    Finite(f64),
    /// No QALY difference at a higher cost
    Dominated,
    /// No QALY difference and no cost difference
    Equivalent,
    /// No QALY difference at a lower cost
    CostSavingNoBenefit,
}

impl IcerValue {
    pub fn finite(&self) -> Option<f64> {
        match self {
            IcerValue::Finite(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, IcerValue::Finite(_))
    }
}

impl fmt::Display for IcerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcerValue::Finite(v) => write!(f, "{v:.2}"),
            IcerValue::Dominated => f.write_str("Dominated"),
            IcerValue::Equivalent => f.write_str("Equivalent"),
            IcerValue::CostSavingNoBenefit => f.write_str("Cost-saving, no benefit"),
        }
    }
}

/// Decision category derived from an ICER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Cheaper and more effective
    Dominant,
    VeryCostEffective,
    CostEffective,
    ModeratelyCostEffective,
    NotCostEffective,
    /// More expensive for no gain, or less effective at a higher cost
    Dominated,
    Equivalent,
    CostSavingNoBenefit,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Dominant => "Dominant",
            Classification::VeryCostEffective => "Very cost-effective",
            Classification::CostEffective => "Cost-effective",
            Classification::ModeratelyCostEffective => "Moderately cost-effective",
            Classification::NotCostEffective => "Not cost-effective",
            Classification::Dominated => "Dominated",
            Classification::Equivalent => "Equivalent",
            Classification::CostSavingNoBenefit => "Cost-saving, no benefit",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of comparing an intervention against a comparator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IcerResult {
    pub incremental_cost: f64,
    pub incremental_qaly: f64,
    pub icer: IcerValue,
    pub classification: Classification,
    /// ICER below the cost-effective threshold (50,000 by default)
    pub within_wtp_50k: bool,
    /// ICER below the upper threshold (100,000 by default)
    pub within_wtp_100k: bool,
}

/// Cost-effectiveness ratio of a single group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cer {
    Finite(f64),
    /// The denominator was zero
    Undefined,
}

impl Cer {
    /// `numerator / denominator`, `Undefined` when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Cer::Undefined
        } else {
            Cer::Finite(numerator / denominator)
        }
    }

    pub fn finite(&self) -> Option<f64> {
        match self {
            Cer::Finite(v) => Some(*v),
            Cer::Undefined => None,
        }
    }
}

impl fmt::Display for Cer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cer::Finite(v) => write!(f, "{v:.2}"),
            Cer::Undefined => f.write_str("undefined"),
        }
    }
}
