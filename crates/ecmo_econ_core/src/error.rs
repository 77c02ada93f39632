use std::fmt;

use crate::model::OutcomeCategory;

/// Errors raised while validating a parameter set.
///
/// These are fatal: no computation runs against a configuration that failed
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    OutOfRange {
        field: String,
        value: f64,
        reason: &'static str,
    },
    DuplicateEntry {
        table: &'static str,
        name: String,
    },
    EmptyName {
        table: &'static str,
    },
    UnknownEntry {
        table: &'static str,
        name: String,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(field: impl Into<String>, value: f64, reason: &'static str) -> Self {
        ConfigError::OutOfRange {
            field: field.into(),
            value,
            reason,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange {
                field,
                value,
                reason,
            } => write!(f, "invalid {field} ({value}): {reason}"),
            ConfigError::DuplicateEntry { table, name } => {
                write!(f, "duplicate {table} entry '{name}'")
            }
            ConfigError::EmptyName { table } => write!(f, "{table} entry has an empty name"),
            ConfigError::UnknownEntry { table, name } => {
                write!(f, "no {table} entry named '{name}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised for a single patient record.
///
/// The engine never substitutes defaults for invalid clinical values; the
/// caller decides whether to skip the record or abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    NegativeAge(f64),
    NegativeDuration(f64),
    NonFinite { field: &'static str, value: f64 },
    /// A survivor without an outcome category
    MissingOutcome,
    /// A survivor whose outcome has no utility in the parameter set
    UnknownOutcome(OutcomeCategory),
    MissingRiskScore,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NegativeAge(age) => write!(f, "age must be >= 0, got {age}"),
            RecordError::NegativeDuration(hours) => {
                write!(f, "therapy duration must be >= 0 hours, got {hours}")
            }
            RecordError::NonFinite { field, value } => {
                write!(f, "{field} must be finite, got {value}")
            }
            RecordError::MissingOutcome => write!(f, "survivor has no outcome category"),
            RecordError::UnknownOutcome(category) => {
                write!(f, "no utility configured for outcome '{category}'")
            }
            RecordError::MissingRiskScore => write!(f, "record has no risk indicator"),
        }
    }
}

impl std::error::Error for RecordError {}

/// Errors from cohort-level analyses
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    Config(ConfigError),
    Record {
        index: usize,
        source: RecordError,
    },
    /// A mean was requested over a cohort with no patients
    EmptyCohort(&'static str),
    InvalidInput(String),
    InvalidDistribution {
        parameter: String,
        distribution: &'static str,
        reason: String,
    },
    /// The acceptability curve decreased between two thresholds
    NonMonotoneCeac {
        wtp: f64,
        previous: f64,
        current: f64,
    },
}

impl AnalysisError {
    pub(crate) fn record(index: usize, source: RecordError) -> Self {
        AnalysisError::Record { index, source }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Config(e) => write!(f, "configuration error: {e}"),
            AnalysisError::Record { index, source } => {
                write!(f, "invalid record at index {index}: {source}")
            }
            AnalysisError::EmptyCohort(which) => write!(f, "{which} cohort is empty"),
            AnalysisError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            AnalysisError::InvalidDistribution {
                parameter,
                distribution,
                reason,
            } => write!(
                f,
                "invalid {distribution} distribution for {parameter}: {reason}"
            ),
            AnalysisError::NonMonotoneCeac {
                wtp,
                previous,
                current,
            } => write!(
                f,
                "acceptability curve decreased at wtp={wtp} ({previous} -> {current})"
            ),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Config(e) => Some(e),
            AnalysisError::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        AnalysisError::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
