//! Addressing individual scalar parameters
//!
//! Sensitivity ranges and probabilistic distributions name the value they
//! vary with a `ParameterKey`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ParameterConfig, ParameterSet};
use crate::error::ConfigError;
use crate::model::OutcomeCategory;

/// One scalar in a [`ParameterSet`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterKey {
    DailyRate { name: String },
    InitiationCost,
    TerminationCost,
    ComplicationProbability { name: String },
    ComplicationCost { name: String },
    ReplacementIntervalDays,
    ReplacementUnitCost,
    CostMultiplier,
    Utility { outcome: OutcomeCategory },
    LifeExpectancyReduction,
    DiscountRate,
    ReferenceLifeExpectancy,
}

fn unknown(table: &'static str, name: &str) -> ConfigError {
    ConfigError::UnknownEntry {
        table,
        name: name.to_string(),
    }
}

impl ParameterKey {
    /// Current value in `params`
    pub fn get(&self, params: &ParameterSet) -> Result<f64, ConfigError> {
        let config = params.config();
        let value = match self {
            ParameterKey::DailyRate { name } => {
                config
                    .daily_rates
                    .iter()
                    .find(|r| &r.name == name)
                    .ok_or_else(|| unknown("daily rate", name))?
                    .cost
            }
            ParameterKey::InitiationCost => config.initiation_cost,
            ParameterKey::TerminationCost => config.termination_cost,
            ParameterKey::ComplicationProbability { name } => {
                config
                    .complications
                    .iter()
                    .find(|c| &c.name == name)
                    .ok_or_else(|| unknown("complication", name))?
                    .probability
            }
            ParameterKey::ComplicationCost { name } => {
                config
                    .complications
                    .iter()
                    .find(|c| &c.name == name)
                    .ok_or_else(|| unknown("complication", name))?
                    .cost
            }
            ParameterKey::ReplacementIntervalDays => config.replacement_interval_days as f64,
            ParameterKey::ReplacementUnitCost => config.replacement_unit_cost,
            ParameterKey::CostMultiplier => config.cost_multiplier,
            ParameterKey::Utility { outcome } => params
                .utility(*outcome)
                .ok_or_else(|| unknown("utility", outcome.as_str()))?,
            ParameterKey::LifeExpectancyReduction => config.life_expectancy_reduction,
            ParameterKey::DiscountRate => config.discount_rate,
            ParameterKey::ReferenceLifeExpectancy => config.reference_life_expectancy,
        };
        Ok(value)
    }

    /// Write `value` into an unvalidated config. Range checks happen when the
    /// config is turned back into a [`ParameterSet`].
    pub fn apply(&self, config: &mut ParameterConfig, value: f64) -> Result<(), ConfigError> {
        match self {
            ParameterKey::DailyRate { name } => {
                config
                    .daily_rates
                    .iter_mut()
                    .find(|r| &r.name == name)
                    .ok_or_else(|| unknown("daily rate", name))?
                    .cost = value;
            }
            ParameterKey::InitiationCost => config.initiation_cost = value,
            ParameterKey::TerminationCost => config.termination_cost = value,
            ParameterKey::ComplicationProbability { name } => {
                config
                    .complications
                    .iter_mut()
                    .find(|c| &c.name == name)
                    .ok_or_else(|| unknown("complication", name))?
                    .probability = value;
            }
            ParameterKey::ComplicationCost { name } => {
                config
                    .complications
                    .iter_mut()
                    .find(|c| &c.name == name)
                    .ok_or_else(|| unknown("complication", name))?
                    .cost = value;
            }
            ParameterKey::ReplacementIntervalDays => {
                if !value.is_finite() || value.round() < 1.0 {
                    return Err(ConfigError::out_of_range(
                        "replacement_interval_days",
                        value,
                        "must be at least 1 day",
                    ));
                }
                config.replacement_interval_days = value.round() as u32;
            }
            ParameterKey::ReplacementUnitCost => config.replacement_unit_cost = value,
            ParameterKey::CostMultiplier => config.cost_multiplier = value,
            ParameterKey::Utility { outcome } => {
                let slot = config
                    .utilities
                    .get_mut(outcome)
                    .ok_or_else(|| unknown("utility", outcome.as_str()))?;
                *slot = value;
            }
            ParameterKey::LifeExpectancyReduction => config.life_expectancy_reduction = value,
            ParameterKey::DiscountRate => config.discount_rate = value,
            ParameterKey::ReferenceLifeExpectancy => config.reference_life_expectancy = value,
        }
        Ok(())
    }

    /// Pull a sampled value back inside the parameter's valid range.
    pub fn clamp(&self, value: f64) -> f64 {
        match self {
            ParameterKey::ComplicationProbability { .. } | ParameterKey::Utility { .. } => {
                value.clamp(0.0, 1.0)
            }
            ParameterKey::CostMultiplier => value.max(0.001),
            ParameterKey::ReplacementIntervalDays => value.max(1.0),
            ParameterKey::ReferenceLifeExpectancy => value.max(1.0),
            _ => value.max(0.0),
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKey::DailyRate { name } => write!(f, "daily_rate.{name}"),
            ParameterKey::InitiationCost => f.write_str("initiation_cost"),
            ParameterKey::TerminationCost => f.write_str("termination_cost"),
            ParameterKey::ComplicationProbability { name } => {
                write!(f, "complication.{name}.probability")
            }
            ParameterKey::ComplicationCost { name } => write!(f, "complication.{name}.cost"),
            ParameterKey::ReplacementIntervalDays => f.write_str("replacement_interval_days"),
            ParameterKey::ReplacementUnitCost => f.write_str("replacement_unit_cost"),
            ParameterKey::CostMultiplier => f.write_str("cost_multiplier"),
            ParameterKey::Utility { outcome } => write!(f, "utility.{outcome}"),
            ParameterKey::LifeExpectancyReduction => f.write_str("life_expectancy_reduction"),
            ParameterKey::DiscountRate => f.write_str("discount_rate"),
            ParameterKey::ReferenceLifeExpectancy => f.write_str("reference_life_expectancy"),
        }
    }
}
