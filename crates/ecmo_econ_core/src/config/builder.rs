//! Parameter Set Builder
//!
//! Fluent construction of a [`ParameterSet`], starting either from the
//! default cost tables or from an empty configuration.
//!
//! # Example
//!
//! ```ignore
//! use ecmo_econ_core::config::ParameterSetBuilder;
//! use ecmo_econ_core::model::{Currency, OutcomeCategory};
//!
//! let params = ParameterSetBuilder::empty()
//!     .daily_rate("icu_bed", 30_000.0)
//!     .daily_rate("ecmo_consumables", 15_000.0)
//!     .initiation_cost(100_000.0)
//!     .replacement(7, 60_000.0)
//!     .complication("bleeding", 0.3, 120_000.0)
//!     .utility(OutcomeCategory::Normal, 0.8)
//!     .currency(Currency::Twd)
//!     .build()?;
//! ```

use super::{Complication, DailyRate, ParameterConfig, ParameterSet, WtpThresholds};
use crate::error::ConfigError;
use crate::model::{Currency, OutcomeCategory};

/// Builder for a validated [`ParameterSet`]
#[derive(Debug, Clone)]
pub struct ParameterSetBuilder {
    config: ParameterConfig,
}

impl Default for ParameterSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSetBuilder {
    /// Start from the default cost, complication and utility tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ParameterConfig::default(),
        }
    }

    /// Start with no daily rates, procedure costs, complications or utilities
    #[must_use]
    pub fn empty() -> Self {
        Self {
            config: ParameterConfig {
                daily_rates: Vec::new(),
                initiation_cost: 0.0,
                termination_cost: 0.0,
                complications: Vec::new(),
                replacement_unit_cost: 0.0,
                utilities: Default::default(),
                ..Default::default()
            },
        }
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: ParameterConfig) -> Self {
        Self { config }
    }

    // =========================================================================
    // Costs
    // =========================================================================

    /// Add a daily rate, replacing any existing rate with the same name
    #[must_use]
    pub fn daily_rate(mut self, name: impl Into<String>, cost: f64) -> Self {
        let name = name.into();
        match self.config.daily_rates.iter_mut().find(|r| r.name == name) {
            Some(rate) => rate.cost = cost,
            None => self.config.daily_rates.push(DailyRate { name, cost }),
        }
        self
    }

    #[must_use]
    pub fn clear_daily_rates(mut self) -> Self {
        self.config.daily_rates.clear();
        self
    }

    #[must_use]
    pub fn initiation_cost(mut self, cost: f64) -> Self {
        self.config.initiation_cost = cost;
        self
    }

    #[must_use]
    pub fn termination_cost(mut self, cost: f64) -> Self {
        self.config.termination_cost = cost;
        self
    }

    /// Equipment replacement every `interval_days` at `unit_cost` each
    #[must_use]
    pub fn replacement(mut self, interval_days: u32, unit_cost: f64) -> Self {
        self.config.replacement_interval_days = interval_days;
        self.config.replacement_unit_cost = unit_cost;
        self
    }

    /// Add a complication, replacing any existing one with the same name
    #[must_use]
    pub fn complication(mut self, name: impl Into<String>, probability: f64, cost: f64) -> Self {
        let name = name.into();
        match self
            .config
            .complications
            .iter_mut()
            .find(|c| c.name == name)
        {
            Some(c) => {
                c.probability = probability;
                c.cost = cost;
            }
            None => self.config.complications.push(Complication {
                name,
                probability,
                cost,
            }),
        }
        self
    }

    #[must_use]
    pub fn no_complications(mut self) -> Self {
        self.config.complications.clear();
        self
    }

    #[must_use]
    pub fn cost_multiplier(mut self, multiplier: f64) -> Self {
        self.config.cost_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.config.currency = currency;
        self
    }

    // =========================================================================
    // Outcomes
    // =========================================================================

    #[must_use]
    pub fn utility(mut self, outcome: OutcomeCategory, utility: f64) -> Self {
        self.config.utilities.insert(outcome, utility);
        self
    }

    #[must_use]
    pub fn life_expectancy_reduction(mut self, years: f64) -> Self {
        self.config.life_expectancy_reduction = years;
        self
    }

    #[must_use]
    pub fn reference_life_expectancy(mut self, years: f64) -> Self {
        self.config.reference_life_expectancy = years;
        self
    }

    #[must_use]
    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.config.discount_rate = rate;
        self
    }

    #[must_use]
    pub fn thresholds(
        mut self,
        very_cost_effective: f64,
        cost_effective: f64,
        moderately_cost_effective: f64,
    ) -> Self {
        self.config.thresholds = WtpThresholds {
            very_cost_effective,
            cost_effective,
            moderately_cost_effective,
        };
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<ParameterSet, ConfigError> {
        ParameterSet::new(self.config)
    }
}
