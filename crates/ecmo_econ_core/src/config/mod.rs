//! Economic parameter configuration
//!
//! `ParameterConfig` is the plain, serializable form of every cost, probability
//! and utility the engines read. `ParameterSet` is the validated, immutable
//! version that the engines actually accept; it can only be obtained through
//! validation, including when deserialized from a scenario file.
//!
//! # Builder DSL
//!
//! ```ignore
//! use ecmo_econ_core::config::ParameterSetBuilder;
//! use ecmo_econ_core::model::OutcomeCategory;
//!
//! let params = ParameterSetBuilder::new()
//!     .daily_rate("icu_bed", 4_500.0)
//!     .complication("bleeding", 0.30, 18_000.0)
//!     .utility(OutcomeCategory::Normal, 0.8)
//!     .discount_rate(0.03)
//!     .cost_multiplier(0.65)
//!     .build()?;
//! ```

use std::collections::HashSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Currency, OutcomeCategory};

pub mod builder;
pub mod parameter;

pub use builder::ParameterSetBuilder;
pub use parameter::ParameterKey;

/// Reference life expectancy used when none is configured
pub const DEFAULT_REFERENCE_LIFE_EXPECTANCY: f64 = 80.0;

/// A named cost accrued for every day on support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub name: String,
    pub cost: f64,
}

/// A complication that may occur independently during a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complication {
    pub name: String,
    pub probability: f64,
    pub cost: f64,
}

/// Cost-per-QALY cut points used to classify an ICER
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WtpThresholds {
    pub very_cost_effective: f64,
    pub cost_effective: f64,
    pub moderately_cost_effective: f64,
}

impl Default for WtpThresholds {
    fn default() -> Self {
        Self {
            very_cost_effective: 20_000.0,
            cost_effective: 50_000.0,
            moderately_cost_effective: 100_000.0,
        }
    }
}

fn default_daily_rates() -> Vec<DailyRate> {
    vec![
        DailyRate {
            name: "icu_bed".into(),
            cost: 4_500.0,
        },
        DailyRate {
            name: "ecmo_consumables".into(),
            cost: 2_500.0,
        },
        DailyRate {
            name: "perfusion_staff".into(),
            cost: 1_200.0,
        },
    ]
}

fn default_complications() -> Vec<Complication> {
    [
        ("bleeding", 0.30, 18_000.0),
        ("circuit_thrombosis", 0.15, 9_000.0),
        ("infection", 0.20, 14_000.0),
        ("acute_kidney_injury", 0.25, 20_000.0),
        ("stroke", 0.07, 45_000.0),
    ]
    .into_iter()
    .map(|(name, probability, cost)| Complication {
        name: name.into(),
        probability,
        cost,
    })
    .collect()
}

fn default_utilities() -> FxHashMap<OutcomeCategory, f64> {
    FxHashMap::from_iter([
        (OutcomeCategory::Normal, 0.8),
        (OutcomeCategory::MildDisability, 0.7),
        (OutcomeCategory::ModerateDisability, 0.5),
        (OutcomeCategory::SevereDisability, 0.3),
    ])
}

/// Unvalidated economic parameters, as written in a scenario file.
///
/// Every field has a default so a file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterConfig {
    pub daily_rates: Vec<DailyRate>,
    pub initiation_cost: f64,
    pub termination_cost: f64,
    /// Sampled in the listed order
    pub complications: Vec<Complication>,
    pub replacement_interval_days: u32,
    pub replacement_unit_cost: f64,
    /// Regional price multiplier applied once to each patient's total
    pub cost_multiplier: f64,
    pub utilities: FxHashMap<OutcomeCategory, f64>,
    /// Years subtracted from the reference life expectancy for survivors
    pub life_expectancy_reduction: f64,
    pub discount_rate: f64,
    pub reference_life_expectancy: f64,
    pub currency: Currency,
    pub thresholds: WtpThresholds,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            daily_rates: default_daily_rates(),
            initiation_cost: 35_000.0,
            termination_cost: 6_000.0,
            complications: default_complications(),
            replacement_interval_days: 7,
            replacement_unit_cost: 7_500.0,
            cost_multiplier: 1.0,
            utilities: default_utilities(),
            life_expectancy_reduction: 2.0,
            discount_rate: 0.03,
            reference_life_expectancy: DEFAULT_REFERENCE_LIFE_EXPECTANCY,
            currency: Currency::default(),
            thresholds: WtpThresholds::default(),
        }
    }
}

pub(crate) fn check_cost(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::out_of_range(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(ConfigError::out_of_range(field, value, "must be >= 0"));
    }
    Ok(())
}

fn check_unit_interval(field: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::out_of_range(field, value, "must be within [0, 1]"));
    }
    Ok(())
}

fn check_unique_names<'a>(
    table: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName { table });
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateEntry {
                table,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

impl ParameterConfig {
    /// Check every declared range, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unique_names("daily rate", self.daily_rates.iter().map(|r| r.name.as_str()))?;
        for rate in &self.daily_rates {
            check_cost(format!("daily rate '{}'", rate.name), rate.cost)?;
        }

        check_cost("initiation_cost", self.initiation_cost)?;
        check_cost("termination_cost", self.termination_cost)?;

        check_unique_names(
            "complication",
            self.complications.iter().map(|c| c.name.as_str()),
        )?;
        for c in &self.complications {
            check_unit_interval(format!("complication '{}' probability", c.name), c.probability)?;
            check_cost(format!("complication '{}' cost", c.name), c.cost)?;
        }

        if self.replacement_interval_days == 0 {
            return Err(ConfigError::out_of_range(
                "replacement_interval_days",
                0.0,
                "must be at least 1 day",
            ));
        }
        check_cost("replacement_unit_cost", self.replacement_unit_cost)?;

        if !self.cost_multiplier.is_finite() || self.cost_multiplier <= 0.0 {
            return Err(ConfigError::out_of_range(
                "cost_multiplier",
                self.cost_multiplier,
                "must be > 0",
            ));
        }

        for (outcome, utility) in &self.utilities {
            check_unit_interval(format!("utility.{outcome}"), *utility)?;
        }

        check_cost("life_expectancy_reduction", self.life_expectancy_reduction)?;
        check_cost("discount_rate", self.discount_rate)?;

        if !self.reference_life_expectancy.is_finite() || self.reference_life_expectancy <= 0.0 {
            return Err(ConfigError::out_of_range(
                "reference_life_expectancy",
                self.reference_life_expectancy,
                "must be > 0",
            ));
        }

        let t = &self.thresholds;
        check_cost("thresholds.very_cost_effective", t.very_cost_effective)?;
        if !(t.very_cost_effective < t.cost_effective
            && t.cost_effective < t.moderately_cost_effective
            && t.moderately_cost_effective.is_finite())
        {
            return Err(ConfigError::out_of_range(
                "thresholds",
                t.cost_effective,
                "thresholds must be strictly ascending",
            ));
        }

        Ok(())
    }
}

/// Validated, immutable economic parameters.
///
/// Engines only take a `ParameterSet`, so every computation runs against a
/// configuration that already passed [`ParameterConfig::validate`].
/// Perturbed copies for sensitivity analysis are made with
/// [`with_parameter`](Self::with_parameter), which re-validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterConfig", into = "ParameterConfig")]
pub struct ParameterSet {
    config: ParameterConfig,
    daily_total: f64,
}

impl ParameterSet {
    pub fn new(config: ParameterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let daily_total = config.daily_rates.iter().map(|r| r.cost).sum();
        Ok(Self {
            config,
            daily_total,
        })
    }

    pub fn daily_rates(&self) -> &[DailyRate] {
        &self.config.daily_rates
    }

    /// Sum of every daily rate
    pub fn daily_total(&self) -> f64 {
        self.daily_total
    }

    pub fn initiation_cost(&self) -> f64 {
        self.config.initiation_cost
    }

    pub fn termination_cost(&self) -> f64 {
        self.config.termination_cost
    }

    pub fn complications(&self) -> &[Complication] {
        &self.config.complications
    }

    pub fn replacement_interval_days(&self) -> u32 {
        self.config.replacement_interval_days
    }

    pub fn replacement_unit_cost(&self) -> f64 {
        self.config.replacement_unit_cost
    }

    pub fn cost_multiplier(&self) -> f64 {
        self.config.cost_multiplier
    }

    pub fn utility(&self, outcome: OutcomeCategory) -> Option<f64> {
        self.config.utilities.get(&outcome).copied()
    }

    pub fn life_expectancy_reduction(&self) -> f64 {
        self.config.life_expectancy_reduction
    }

    pub fn discount_rate(&self) -> f64 {
        self.config.discount_rate
    }

    pub fn reference_life_expectancy(&self) -> f64 {
        self.config.reference_life_expectancy
    }

    pub fn currency(&self) -> Currency {
        self.config.currency
    }

    pub fn thresholds(&self) -> &WtpThresholds {
        &self.config.thresholds
    }

    /// The unvalidated form, e.g. for editing and rebuilding
    pub fn config(&self) -> &ParameterConfig {
        &self.config
    }

    /// A copy with one scalar parameter replaced. `self` is left untouched.
    pub fn with_parameter(&self, key: &ParameterKey, value: f64) -> Result<Self, ConfigError> {
        let mut config = self.config.clone();
        key.apply(&mut config, value)?;
        Self::new(config)
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        let config = ParameterConfig::default();
        let daily_total = config.daily_rates.iter().map(|r| r.cost).sum();
        Self {
            config,
            daily_total,
        }
    }
}

impl TryFrom<ParameterConfig> for ParameterSet {
    type Error = ConfigError;

    fn try_from(config: ParameterConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<ParameterSet> for ParameterConfig {
    fn from(params: ParameterSet) -> Self {
        params.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ParameterConfig::default().validate().is_ok());
        let params = ParameterSet::default();
        assert!((params.daily_total() - 8_200.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_probability_above_one() {
        let mut config = ParameterConfig::default();
        config.complications[0].probability = 1.2;
        let err = ParameterSet::new(config).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        let config = ParameterConfig {
            cost_multiplier: 0.0,
            ..Default::default()
        };
        assert!(ParameterSet::new(config).is_err());
    }

    #[test]
    fn test_rejects_negative_discount_rate() {
        let config = ParameterConfig {
            discount_rate: -0.01,
            ..Default::default()
        };
        assert!(ParameterSet::new(config).is_err());
    }

    #[test]
    fn test_rejects_utility_outside_unit_interval() {
        let mut config = ParameterConfig::default();
        config.utilities.insert(OutcomeCategory::Normal, 1.5);
        assert!(ParameterSet::new(config).is_err());
    }

    #[test]
    fn test_rejects_duplicate_complication() {
        let mut config = ParameterConfig::default();
        let first = config.complications[0].clone();
        config.complications.push(first);
        assert!(matches!(
            ParameterSet::new(config),
            Err(ConfigError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_replacement_interval() {
        let config = ParameterConfig {
            replacement_interval_days: 0,
            ..Default::default()
        };
        assert!(ParameterSet::new(config).is_err());
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let config = ParameterConfig {
            thresholds: WtpThresholds {
                very_cost_effective: 60_000.0,
                cost_effective: 50_000.0,
                moderately_cost_effective: 100_000.0,
            },
            ..Default::default()
        };
        assert!(ParameterSet::new(config).is_err());
    }

    #[test]
    fn test_with_parameter_leaves_original_untouched() {
        let params = ParameterSet::default();
        let changed = params
            .with_parameter(&ParameterKey::DiscountRate, 0.05)
            .unwrap();
        assert_eq!(params.discount_rate(), 0.03);
        assert_eq!(changed.discount_rate(), 0.05);
    }

    #[test]
    fn test_with_parameter_revalidates() {
        let params = ParameterSet::default();
        assert!(
            params
                .with_parameter(&ParameterKey::CostMultiplier, -1.0)
                .is_err()
        );
    }
}
