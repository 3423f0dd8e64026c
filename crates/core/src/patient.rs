//! Patient data model and boundary validation.

use crate::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};

/// The unit of analysis: one patient's risk-factor measurements.
///
/// The record is owned by the caller for the duration of a request and echoed
/// back unchanged in the [`AnalysisResult`]; no component retains it beyond
/// the request's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years.
    pub age: u32,
    /// Glucose level in mg/dL.
    pub glucose_level: f64,
    /// Systolic blood pressure in mmHg.
    pub systolic_pressure: f64,
    /// Diastolic blood pressure in mmHg.
    pub diastolic_pressure: f64,
    /// Whether the patient has a family history of diabetes/hypertension.
    pub family_history: bool,
}

impl PatientRecord {
    /// Validate the record before it is submitted to any downstream
    /// capability.
    ///
    /// Bounds are conservative physiological ranges; values outside them are
    /// almost certainly data-entry errors and are rejected rather than
    /// forwarded.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::Validation`] naming the offending field.
    pub fn validate(&self) -> TriageResult<()> {
        if self.age > 120 {
            return Err(TriageError::Validation(
                "age must be at most 120 years".into(),
            ));
        }
        for (name, value) in [
            ("glucose_level", self.glucose_level),
            ("systolic_pressure", self.systolic_pressure),
            ("diastolic_pressure", self.diastolic_pressure),
        ] {
            if !value.is_finite() {
                return Err(TriageError::Validation(format!(
                    "{name} must be a finite number"
                )));
            }
        }
        if !(0.0..=800.0).contains(&self.glucose_level) {
            return Err(TriageError::Validation(
                "glucose_level must be between 0 and 800 mg/dL".into(),
            ));
        }
        if !(60.0..=300.0).contains(&self.systolic_pressure) {
            return Err(TriageError::Validation(
                "systolic_pressure must be between 60 and 300 mmHg".into(),
            ));
        }
        if !(40.0..=200.0).contains(&self.diastolic_pressure) {
            return Err(TriageError::Validation(
                "diastolic_pressure must be between 40 and 200 mmHg".into(),
            ));
        }
        if self.systolic_pressure <= self.diastolic_pressure {
            return Err(TriageError::Validation(
                "systolic_pressure must be greater than diastolic_pressure".into(),
            ));
        }
        Ok(())
    }
}

/// The orchestrator's output: the original record, the outlier flag, and
/// either the generated action plan or the fixed no-action sentinel.
///
/// Constructed once per request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub record: PatientRecord,
    pub is_outlier: bool,
    pub recommendation: String,
}
