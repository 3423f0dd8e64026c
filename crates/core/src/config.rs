//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process
//! startup and then passed into core services. The intent is to avoid reading
//! process-wide environment variables during request handling, and to surface
//! missing required values as a fatal error before the first request is
//! served rather than lazily per request.

use crate::{TriageError, TriageResult};
use std::time::Duration;

/// Model identifier used when no override is configured.
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";

/// Timeout applied to each downstream request when no override is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Triage configuration resolved at startup.
///
/// Both the classification base URL and the generation API key are required;
/// construction fails with [`TriageError::Configuration`] when either is
/// blank. The value is immutable after construction.
#[derive(Clone, Debug)]
pub struct TriageConfig {
    classification_base_url: String,
    gemini_api_key: String,
    generation_model: String,
    request_timeout: Duration,
}

impl TriageConfig {
    /// Create a new `TriageConfig`.
    ///
    /// A trailing `/` on the classification base URL is trimmed so request
    /// paths can be appended uniformly.
    pub fn new(
        classification_base_url: String,
        gemini_api_key: String,
        generation_model: Option<String>,
        request_timeout: Option<Duration>,
    ) -> TriageResult<Self> {
        if classification_base_url.trim().is_empty() {
            return Err(TriageError::Configuration(
                "CLASSIFICATION_SERVICE_URL is required".into(),
            ));
        }
        if gemini_api_key.trim().is_empty() {
            return Err(TriageError::Configuration(
                "GEMINI_API_KEY is required".into(),
            ));
        }

        let generation_model = generation_model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.into());

        Ok(Self {
            classification_base_url: classification_base_url
                .trim()
                .trim_end_matches('/')
                .to_string(),
            gemini_api_key: gemini_api_key.trim().to_string(),
            generation_model,
            request_timeout: request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }

    pub fn classification_base_url(&self) -> &str {
        &self.classification_base_url
    }

    pub fn gemini_api_key(&self) -> &str {
        &self.gemini_api_key
    }

    pub fn generation_model(&self) -> &str {
        &self.generation_model
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Parse the downstream request timeout from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn request_timeout_from_env_value(value: Option<String>) -> TriageResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
        Some(v) => {
            let secs: u64 = v.parse().map_err(|_| {
                TriageError::Configuration(format!(
                    "TRIAGE_TIMEOUT_SECS must be a whole number of seconds, got '{v}'"
                ))
            })?;
            if secs == 0 {
                return Err(TriageError::Configuration(
                    "TRIAGE_TIMEOUT_SECS must be greater than zero".into(),
                ));
            }
            Ok(Duration::from_secs(secs))
        }
    }
}
