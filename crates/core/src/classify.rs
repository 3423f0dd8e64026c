//! Client for the remote classification service.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::TriageConfig;
use crate::error::{Downstream, TriageError, TriageResult};
use crate::patient::PatientRecord;

/// Labels a patient record as a statistical outlier or not.
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, record: &PatientRecord) -> TriageResult<Classification>;
}

/// Outcome of the classification step.
///
/// Only `is_outlier` is contractually guaranteed; any extra fields the remote
/// service returns are dropped during deserialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Classification {
    pub is_outlier: bool,
}

/// HTTP client for the classification service.
///
/// Issues exactly one `POST {base_url}/classify` per call, with the record as
/// the JSON body. No retries; resilience policy belongs to the caller.
pub struct HttpClassificationClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpClassificationClient {
    /// Build a client from startup configuration.
    ///
    /// The configured request timeout bounds each downstream call.
    pub fn new(cfg: &TriageConfig) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| {
                TriageError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: cfg.classification_base_url().to_string(),
            client,
        })
    }
}

fn transport_error(err: &reqwest::Error) -> TriageError {
    let reason = if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {err}")
    };
    TriageError::dependency(Downstream::Classification, reason)
}

#[async_trait]
impl Classify for HttpClassificationClient {
    async fn classify(&self, record: &PatientRecord) -> TriageResult<Classification> {
        let url = format!("{}/classify", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::dependency(
                Downstream::Classification,
                format!("unexpected status {status}"),
            ));
        }

        let classification: Classification = response.json().await.map_err(|e| {
            TriageError::dependency(
                Downstream::Classification,
                format!("malformed response body: {e}"),
            )
        })?;

        tracing::debug!(is_outlier = classification.is_outlier, "classification received");
        Ok(classification)
    }
}
