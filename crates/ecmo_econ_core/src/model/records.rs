//! Per-patient input records
//!
//! Records arrive already cleaned by the upstream ingestion pipeline. The
//! engine re-checks the clinical ranges it depends on and rejects anything
//! outside them instead of clamping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Functional outcome at discharge for a surviving patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Normal,
    MildDisability,
    ModerateDisability,
    SevereDisability,
}

impl OutcomeCategory {
    pub const ALL: [OutcomeCategory; 4] = [
        OutcomeCategory::Normal,
        OutcomeCategory::MildDisability,
        OutcomeCategory::ModerateDisability,
        OutcomeCategory::SevereDisability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCategory::Normal => "normal",
            OutcomeCategory::MildDisability => "mild_disability",
            OutcomeCategory::ModerateDisability => "moderate_disability",
            OutcomeCategory::SevereDisability => "severe_disability",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One patient's economically relevant course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientEconomicRecord {
    /// Age in years at therapy start
    pub age: f64,
    pub survived: bool,
    /// Time on support in hours
    pub duration_hours: f64,
    /// Only meaningful when `survived` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeCategory>,
    /// Optional score from the upstream risk model; higher means riskier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

impl PatientEconomicRecord {
    /// A survivor with the given discharge outcome
    pub fn survivor(age: f64, duration_hours: f64, outcome: OutcomeCategory) -> Self {
        Self {
            age,
            survived: true,
            duration_hours,
            outcome: Some(outcome),
            risk_score: None,
        }
    }

    /// A patient who died before discharge
    pub fn death(age: f64, duration_hours: f64) -> Self {
        Self {
            age,
            survived: false,
            duration_hours,
            outcome: None,
            risk_score: None,
        }
    }

    #[must_use]
    pub fn with_risk(mut self, risk_score: f64) -> Self {
        self.risk_score = Some(risk_score);
        self
    }

    /// Duration in whole days, rounding any started day up
    pub fn duration_days(&self) -> u32 {
        (self.duration_hours / 24.0).ceil() as u32
    }

    /// Check the numeric fields shared by every engine.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !self.age.is_finite() {
            return Err(RecordError::NonFinite {
                field: "age",
                value: self.age,
            });
        }
        if !self.duration_hours.is_finite() {
            return Err(RecordError::NonFinite {
                field: "duration_hours",
                value: self.duration_hours,
            });
        }
        if self.age < 0.0 {
            return Err(RecordError::NegativeAge(self.age));
        }
        if self.duration_hours < 0.0 {
            return Err(RecordError::NegativeDuration(self.duration_hours));
        }
        if let Some(risk) = self.risk_score
            && !risk.is_finite()
        {
            return Err(RecordError::NonFinite {
                field: "risk_score",
                value: risk,
            });
        }
        Ok(())
    }

    /// Risk score, required by stratification
    pub fn require_risk(&self) -> Result<f64, RecordError> {
        self.risk_score.ok_or(RecordError::MissingRiskScore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_days_rounds_up() {
        let record = PatientEconomicRecord::death(60.0, 25.0);
        assert_eq!(record.duration_days(), 2);
        let record = PatientEconomicRecord::death(60.0, 24.0);
        assert_eq!(record.duration_days(), 1);
        let record = PatientEconomicRecord::death(60.0, 0.0);
        assert_eq!(record.duration_days(), 0);
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        let record = PatientEconomicRecord::death(-1.0, 10.0);
        assert_eq!(record.validate(), Err(RecordError::NegativeAge(-1.0)));

        let record = PatientEconomicRecord::death(40.0, -0.5);
        assert_eq!(record.validate(), Err(RecordError::NegativeDuration(-0.5)));
    }

    #[test]
    fn test_validate_rejects_nan_risk() {
        let record = PatientEconomicRecord::death(40.0, 10.0).with_risk(f64::NAN);
        assert!(matches!(
            record.validate(),
            Err(RecordError::NonFinite {
                field: "risk_score",
                ..
            })
        ));
    }

    #[test]
    fn test_outcome_display_matches_serde_name() {
        assert_eq!(OutcomeCategory::MildDisability.to_string(), "mild_disability");
    }
}
