//! Scenario files
//!
//! A scenario is a single YAML document holding the parameters, both
//! patient arms and the settings of every optional analysis:
//!
//! ```yaml
//! name: Adult VA-ECMO
//! seed: 42
//! parameters:
//!   cost_multiplier: 0.65
//!   discount_rate: 0.03
//! intervention:
//!   - { age: 55, survived: true, duration_hours: 120, outcome: normal, risk_score: 0.2 }
//! comparator:
//!   - { age: 61, survived: false, duration_hours: 36 }
//! budget: { population: 23000000, utilization: 0.00002, years: 5 }
//! nhi: { mode: va }
//! sensitivity:
//!   - { parameter: { kind: cost_multiplier }, low: 0.5, high: 1.0 }
//! ```

use std::fs;
use std::path::Path;

use ecmo_econ_core::analysis::{SensitivityRange, UncertainParameter};
use ecmo_econ_core::budget::BudgetInputs;
use ecmo_econ_core::config::ParameterSet;
use ecmo_econ_core::model::PatientEconomicRecord;
use ecmo_econ_core::nhi::NhiInputs;
use serde::{Deserialize, Serialize};

/// Errors reading or writing a scenario
#[derive(Debug)]
pub enum ScenarioError {
    Io(String),
    Parse(String),
    Serialize(String),
    Invalid(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(msg) => write!(f, "IO error: {msg}"),
            ScenarioError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ScenarioError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
            ScenarioError::Invalid(msg) => write!(f, "Invalid scenario: {msg}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

pub const DEFAULT_SEED: u64 = 42;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_wtp() -> Vec<f64> {
    vec![0.0, 10_000.0, 20_000.0, 50_000.0, 100_000.0, 150_000.0]
}

fn default_psa_iterations() -> usize {
    1_000
}

/// Probabilistic sensitivity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsaSettings {
    #[serde(default = "default_psa_iterations")]
    pub iterations: usize,
    pub parameters: Vec<UncertainParameter>,
}

/// Population the value of information is scaled to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvpiSettings {
    /// Patients affected by the decision each year
    pub population: u64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Validated on load; omitted fields take their defaults
    #[serde(default)]
    pub parameters: ParameterSet,
    pub intervention: Vec<PatientEconomicRecord>,
    pub comparator: Vec<PatientEconomicRecord>,
    /// Willingness-to-pay thresholds for net benefit and acceptability
    #[serde(default = "default_wtp")]
    pub wtp: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetInputs>,
    /// Reimbursement of the intervention arm under the NHI schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nhi: Option<NhiInputs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sensitivity: Vec<SensitivityRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psa: Option<PsaSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evpi: Option<EvpiSettings>,
}

impl Scenario {
    pub fn new(
        parameters: ParameterSet,
        intervention: Vec<PatientEconomicRecord>,
        comparator: Vec<PatientEconomicRecord>,
    ) -> Self {
        Self {
            name: None,
            seed: DEFAULT_SEED,
            parameters,
            intervention,
            comparator,
            wtp: default_wtp(),
            budget: None,
            nhi: None,
            sensitivity: Vec::new(),
            bootstrap_iterations: None,
            psa: None,
            evpi: None,
        }
    }

    /// Parse and check a scenario from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| ScenarioError::Parse(format!("Failed to parse YAML: {e}")))?;
        scenario.check()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String, ScenarioError> {
        serde_saphyr::to_string(self)
            .map_err(|e| ScenarioError::Serialize(format!("Failed to serialize scenario: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScenarioError::Io(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        let yaml = self.to_yaml()?;
        fs::write(path, yaml)
            .map_err(|e| ScenarioError::Io(format!("Failed to write {}: {e}", path.display())))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed scenario")
    }

    /// Structural checks that do not depend on individual records.
    fn check(&self) -> Result<(), ScenarioError> {
        if self.intervention.is_empty() {
            return Err(ScenarioError::Invalid(
                "intervention arm has no patients".into(),
            ));
        }
        if self.comparator.is_empty() {
            return Err(ScenarioError::Invalid("comparator arm has no patients".into()));
        }
        if let Some(bad) = self.wtp.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "willingness-to-pay thresholds must be non-negative, got {bad}"
            )));
        }
        Ok(())
    }
}
