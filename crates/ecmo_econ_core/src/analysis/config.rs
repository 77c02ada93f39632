//! Inputs of the sensitivity and uncertainty analyses.

use rand::{Rng, distr::Distribution};
use serde::{Deserialize, Serialize};

use crate::config::{ParameterKey, ParameterSet};
use crate::error::{AnalysisError, ConfigError};
use crate::model::PatientEconomicRecord;

/// The two arms being compared. Both are evaluated against the same
/// `ParameterSet` and seed.
#[derive(Debug, Clone, Copy)]
pub struct StrategyComparison<'a> {
    pub intervention: &'a [PatientEconomicRecord],
    pub comparator: &'a [PatientEconomicRecord],
}

impl<'a> StrategyComparison<'a> {
    pub fn new(
        intervention: &'a [PatientEconomicRecord],
        comparator: &'a [PatientEconomicRecord],
    ) -> Self {
        Self {
            intervention,
            comparator,
        }
    }
}

/// Low and high values for one parameter in a one-way analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRange {
    pub parameter: ParameterKey,
    pub low: f64,
    pub high: f64,
}

impl SensitivityRange {
    pub fn new(parameter: ParameterKey, low: f64, high: f64) -> Self {
        Self {
            parameter,
            low,
            high,
        }
    }

    /// Base value scaled down and up by `fraction` (0.2 for ±20%), clamped to
    /// the parameter's valid range.
    pub fn relative(
        parameter: ParameterKey,
        params: &ParameterSet,
        fraction: f64,
    ) -> Result<Self, ConfigError> {
        let base = parameter.get(params)?;
        Ok(Self {
            low: parameter.clamp(base * (1.0 - fraction)),
            high: parameter.clamp(base * (1.0 + fraction)),
            parameter,
        })
    }
}

/// Evenly spaced values from `min` to `max` inclusive.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![min];
    }
    let step = (max - min) / (steps - 1) as f64;
    (0..steps).map(|i| min + step * i as f64).collect()
}

/// Distribution a parameter is drawn from in probabilistic analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplingDistribution {
    Normal { mean: f64, std_dev: f64 },
    /// Parameters of the underlying normal
    LogNormal { mu: f64, sigma: f64 },
    Gamma { shape: f64, scale: f64 },
    Beta { alpha: f64, beta: f64 },
    Uniform { low: f64, high: f64 },
}

impl SamplingDistribution {
    pub fn name(&self) -> &'static str {
        match self {
            SamplingDistribution::Normal { .. } => "normal",
            SamplingDistribution::LogNormal { .. } => "log_normal",
            SamplingDistribution::Gamma { .. } => "gamma",
            SamplingDistribution::Beta { .. } => "beta",
            SamplingDistribution::Uniform { .. } => "uniform",
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, String> {
        match *self {
            SamplingDistribution::Normal { mean, std_dev } => rand_distr::Normal::new(mean, std_dev)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            SamplingDistribution::LogNormal { mu, sigma } => rand_distr::LogNormal::new(mu, sigma)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            SamplingDistribution::Gamma { shape, scale } => rand_distr::Gamma::new(shape, scale)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            SamplingDistribution::Beta { alpha, beta } => rand_distr::Beta::new(alpha, beta)
                .map(|d| d.sample(rng))
                .map_err(|e| e.to_string()),
            SamplingDistribution::Uniform { low, high } => {
                rand::distr::Uniform::new_inclusive(low, high)
                    .map(|d| d.sample(rng))
                    .map_err(|e| e.to_string())
            }
        }
    }
}

/// A parameter and the distribution it is drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainParameter {
    pub parameter: ParameterKey,
    pub distribution: SamplingDistribution,
}

impl UncertainParameter {
    pub fn new(parameter: ParameterKey, distribution: SamplingDistribution) -> Self {
        Self {
            parameter,
            distribution,
        }
    }

    /// Draw a value and clamp it into the parameter's valid range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, AnalysisError> {
        self.distribution
            .sample(rng)
            .map(|v| self.parameter.clamp(v))
            .map_err(|reason| AnalysisError::InvalidDistribution {
                parameter: self.parameter.to_string(),
                distribution: self.distribution.name(),
                reason,
            })
    }
}

/// Results of a sweep over several parameter axes, row-major with the last
/// axis varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T> SweepGrid<T> {
    /// `None` unless `data` holds exactly one value per grid cell.
    pub fn from_data(shape: Vec<usize>, data: Vec<T>) -> Option<Self> {
        if data.len() != shape.iter().product::<usize>() {
            return None;
        }
        Some(Self { data, shape })
    }

    /// Number of values along each axis
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Value at one index per axis, `None` when out of range.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&idx, &size) in indices.iter().zip(&self.shape) {
            if idx >= size {
                return None;
            }
            flat = flat * size + idx;
        }
        self.data.get(flat)
    }
}
