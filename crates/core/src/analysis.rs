//! The analysis orchestration pipeline.
//!
//! One meaningful algorithmic decision lives here: the recommendation
//! generator is only invoked for outliers, so the common (non-outlier) case
//! never pays the cost or latency of a generation call. Non-outliers get the
//! fixed sentinel text, outliers get generated text, never both and never
//! neither.

use std::sync::Arc;

use crate::classify::Classify;
use crate::error::TriageResult;
use crate::patient::{AnalysisResult, PatientRecord};
use crate::recommend::Recommend;

/// Recommendation text returned when the patient is not an outlier.
pub const NO_ACTION_RECOMMENDATION: &str =
    "no action recommended, patient within normal parameters.";

/// Sequences the classification and recommendation calls for one request.
///
/// Stateless across requests: each [`analyze`](Self::analyze) call is
/// independent, so the orchestrator is safely invokable concurrently. Both
/// downstream calls are awaited in-task, so dropping the `analyze` future
/// (e.g. when the caller disconnects) aborts whichever call is in flight.
pub struct AnalysisOrchestrator {
    classifier: Arc<dyn Classify>,
    generator: Arc<dyn Recommend>,
}

impl AnalysisOrchestrator {
    /// Compose the orchestrator from its two collaborators.
    pub fn new(classifier: Arc<dyn Classify>, generator: Arc<dyn Recommend>) -> Self {
        Self {
            classifier,
            generator,
        }
    }

    /// Analyze a well-formed patient record.
    ///
    /// Classification always runs first; the recommendation call is strictly
    /// conditional on its result. Errors from either dependency terminate the
    /// request; no partial result is returned.
    ///
    /// # Errors
    ///
    /// Propagates [`TriageError`](crate::TriageError) values from either
    /// downstream verbatim.
    pub async fn analyze(&self, record: PatientRecord) -> TriageResult<AnalysisResult> {
        let classification = self.classifier.classify(&record).await?;
        tracing::info!(
            is_outlier = classification.is_outlier,
            age = record.age,
            "patient classified"
        );

        if !classification.is_outlier {
            return Ok(AnalysisResult {
                record,
                is_outlier: false,
                recommendation: NO_ACTION_RECOMMENDATION.to_string(),
            });
        }

        let recommendation = match self.generator.generate(&record).await {
            Ok(text) => text,
            Err(e) => {
                // Keep the established classification visible next to the
                // failure, since the result itself is discarded.
                tracing::error!(is_outlier = true, error = %e, "recommendation generation failed");
                return Err(e);
            }
        };

        Ok(AnalysisResult {
            record,
            is_outlier: true,
            recommendation,
        })
    }
}
