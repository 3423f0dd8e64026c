//! Recommendation generation via a remote generative-text capability.
//!
//! The prompt is a fixed template over the five patient fields; the response
//! text is returned unmodified and untruncated. Each outlier gets a fresh
//! generation call, never a cached one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TriageConfig;
use crate::error::{Downstream, TriageError, TriageResult};
use crate::patient::PatientRecord;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Produces a natural-language action plan for an outlier patient.
///
/// Callers invoke this only after the record has been classified as an
/// outlier; the generator does not re-check.
#[async_trait]
pub trait Recommend: Send + Sync {
    async fn generate(&self, record: &PatientRecord) -> TriageResult<String>;
}

/// Render the generation prompt for a patient record.
///
/// Deterministic: the same record always yields the same prompt.
pub fn build_prompt(record: &PatientRecord) -> String {
    format!(
        "You are a public health operator coordinating follow-up care for \
         patients flagged by automated screening.\n\
         \n\
         Patient data:\n\
         - Age: {age} years\n\
         - Glucose level: {glucose} mg/dL\n\
         - Blood pressure: {systolic}/{diastolic} mmHg\n\
         - Family history of diabetes/hypertension: {history}\n\
         \n\
         This patient was classified as a statistical outlier for diabetes \
         and hypertension risk factors.\n\
         \n\
         Write an itemized, professional, action-oriented plan for the care \
         team covering patient contact, appointment scheduling, and \
         verification of the reported measurements. Be direct and practical.",
        age = record.age,
        glucose = record.glucose_level,
        systolic = record.systolic_pressure,
        diastolic = record.diastolic_pressure,
        history = if record.family_history { "Yes" } else { "No" },
    )
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client from startup configuration.
    ///
    /// The API key requirement is enforced by [`TriageConfig`], so a client
    /// can only exist for a fully configured process.
    pub fn new(cfg: &TriageConfig) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| {
                TriageError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            api_base: GEMINI_API_BASE.into(),
            api_key: cfg.gemini_api_key().to_string(),
            model: cfg.generation_model().to_string(),
            client,
        })
    }

    /// Override the API base URL, e.g. to point at a local proxy.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

fn transport_error(err: &reqwest::Error) -> TriageError {
    let reason = if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_timeout() {
        "request timed out".to_string()
    } else {
        // reqwest transport errors don't carry the request headers, so the
        // API key cannot leak through here.
        format!("request failed: {err}")
    };
    TriageError::dependency(Downstream::Recommendation, reason)
}

#[async_trait]
impl Recommend for GeminiClient {
    async fn generate(&self, record: &PatientRecord) -> TriageResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(record),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::dependency(
                Downstream::Recommendation,
                format!("unexpected status {status}"),
            ));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            TriageError::dependency(
                Downstream::Recommendation,
                format!("malformed response body: {e}"),
            )
        })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| {
                TriageError::dependency(
                    Downstream::Recommendation,
                    "response contained no candidates",
                )
            })?;

        tracing::debug!(length = text.len(), "recommendation generated");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record() -> PatientRecord {
        PatientRecord {
            age: 65,
            glucose_level: 280.0,
            systolic_pressure: 160.0,
            diastolic_pressure: 95.0,
            family_history: true,
        }
    }

    fn client_for(api_base: &str) -> GeminiClient {
        let cfg = TriageConfig::new(
            "http://localhost:9000".into(),
            "test-key".into(),
            None,
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        GeminiClient::new(&cfg).unwrap().with_api_base(api_base)
    }

    #[test]
    fn prompt_embeds_all_five_fields() {
        let prompt = build_prompt(&record());
        assert!(prompt.contains("65 years"));
        assert!(prompt.contains("280 mg/dL"));
        assert!(prompt.contains("160/95 mmHg"));
        assert!(prompt.contains("Family history of diabetes/hypertension: Yes"));
        assert!(prompt.contains("public health operator"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&record()), build_prompt(&record()));

        let mut no_history = record();
        no_history.family_history = false;
        assert!(build_prompt(&no_history).contains("No"));
    }

    #[tokio::test]
    async fn returns_candidate_text_joined_across_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "parts": [
                            {"text": "- Contact patient\n"},
                            {"text": "- Schedule exam"}
                        ]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server.uri()).generate(&record()).await.unwrap();
        assert_eq!(text, "- Contact patient\n- Schedule exam");
    }

    #[tokio::test]
    async fn error_status_is_a_dependency_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).generate(&record()).await.unwrap_err();
        match err {
            TriageError::DependencyUnavailable { service, ref reason } => {
                assert_eq!(service, Downstream::Recommendation);
                assert!(reason.contains("403"));
            }
            other => panic!("expected dependency error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_is_a_dependency_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).generate(&record()).await.unwrap_err();
        assert!(err.to_string().contains("no candidates"));
    }
}
