//! # API REST
//!
//! REST API implementation for the patient triage analysis service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON DTOs, CORS, error-to-status mapping)
//!
//! The orchestration pipeline itself lives in `triage-core`; this crate only
//! converts between wire DTOs and core types and maps core errors to HTTP
//! status codes.

#![warn(rust_2018_idioms)]

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use triage_core::{AnalysisOrchestrator, PatientRecord, TriageError};

pub mod dto {
    //! Wire DTOs for the REST surface.

    use serde::{Deserialize, Serialize};
    use triage_core::{AnalysisResult, PatientRecord};
    use utoipa::ToSchema;

    /// Patient record as accepted on the wire and echoed in responses.
    #[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
    pub struct PatientBody {
        /// Age in years.
        pub age: u32,
        /// Glucose level in mg/dL.
        pub glucose_level: f64,
        /// Systolic blood pressure in mmHg.
        pub systolic_pressure: f64,
        /// Diastolic blood pressure in mmHg.
        pub diastolic_pressure: f64,
        /// Family history of diabetes/hypertension.
        pub family_history: bool,
    }

    #[derive(Serialize, ToSchema)]
    pub struct HealthRes {
        pub ok: bool,
        pub message: String,
    }

    #[derive(Serialize, ToSchema)]
    pub struct AnalyzePatientRes {
        pub record: PatientBody,
        pub is_outlier: bool,
        pub recommendation: String,
    }

    #[derive(Serialize, ToSchema)]
    pub struct ErrorRes {
        pub error: String,
    }

    impl From<PatientBody> for PatientRecord {
        fn from(body: PatientBody) -> Self {
            PatientRecord {
                age: body.age,
                glucose_level: body.glucose_level,
                systolic_pressure: body.systolic_pressure,
                diastolic_pressure: body.diastolic_pressure,
                family_history: body.family_history,
            }
        }
    }

    impl From<PatientRecord> for PatientBody {
        fn from(record: PatientRecord) -> Self {
            PatientBody {
                age: record.age,
                glucose_level: record.glucose_level,
                systolic_pressure: record.systolic_pressure,
                diastolic_pressure: record.diastolic_pressure,
                family_history: record.family_history,
            }
        }
    }

    impl From<AnalysisResult> for AnalyzePatientRes {
        fn from(result: AnalysisResult) -> Self {
            AnalyzePatientRes {
                record: result.record.into(),
                is_outlier: result.is_outlier,
                recommendation: result.recommendation,
            }
        }
    }
}

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<AnalysisOrchestrator>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, analyze_patient),
    components(schemas(
        dto::HealthRes,
        dto::PatientBody,
        dto::AnalyzePatientRes,
        dto::ErrorRes,
    ))
)]
struct ApiDoc;

/// Build the REST router around a fully constructed orchestrator.
///
/// Taking the orchestrator as an argument keeps the router testable with
/// stub collaborators.
pub fn app(orchestrator: Arc<AnalysisOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patient/analyze", post(analyze_patient))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { orchestrator })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(dto::HealthRes {
        ok: true,
        message: "triage API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/patient/analyze",
    request_body = dto::PatientBody,
    responses(
        (status = 200, description = "Analysis completed", body = dto::AnalyzePatientRes),
        (status = 400, description = "Malformed patient record", body = dto::ErrorRes),
        (status = 503, description = "A downstream dependency is unavailable", body = dto::ErrorRes),
        (status = 500, description = "Internal server error", body = dto::ErrorRes)
    )
)]
/// Analyze a patient record
///
/// Validates the record, classifies it via the remote classification service
/// and, only for outliers, generates a natural-language action plan. The
/// response echoes the submitted record together with the outlier flag and
/// the recommendation text.
///
/// # Errors
/// Returns `400 Bad Request` if the record fails boundary validation,
/// `503 Service Unavailable` if either downstream dependency fails, and
/// `500 Internal Server Error` for configuration faults.
#[axum::debug_handler]
async fn analyze_patient(
    State(state): State<AppState>,
    Json(body): Json<dto::PatientBody>,
) -> Result<Json<dto::AnalyzePatientRes>, (StatusCode, Json<dto::ErrorRes>)> {
    let record: PatientRecord = body.into();

    if let Err(e) = record.validate() {
        tracing::warn!(error = %e, "rejected malformed patient record");
        return Err(error_response(e));
    }

    match state.orchestrator.analyze(record).await {
        Ok(result) => Ok(Json(result.into())),
        Err(e) => {
            tracing::error!(error = %e, "patient analysis failed");
            Err(error_response(e))
        }
    }
}

/// Map a core error to an HTTP status and a caller-safe body.
///
/// Dependency failures name the downstream that failed but keep the
/// underlying transport detail in the logs only.
fn error_response(err: TriageError) -> (StatusCode, Json<dto::ErrorRes>) {
    match err {
        TriageError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(dto::ErrorRes { error: message }),
        ),
        TriageError::DependencyUnavailable { service, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(dto::ErrorRes {
                error: format!("{service} service temporarily unavailable"),
            }),
        ),
        TriageError::Configuration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(dto::ErrorRes {
                error: "internal configuration error".into(),
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use triage_core::{
        Classification, Classify, Downstream, PatientRecord, Recommend, TriageResult,
        NO_ACTION_RECOMMENDATION,
    };

    struct StubClassifier {
        is_outlier: bool,
        fail: bool,
    }

    #[async_trait]
    impl Classify for StubClassifier {
        async fn classify(&self, _record: &PatientRecord) -> TriageResult<Classification> {
            if self.fail {
                return Err(TriageError::dependency(
                    Downstream::Classification,
                    "stubbed outage",
                ));
            }
            Ok(Classification {
                is_outlier: self.is_outlier,
            })
        }
    }

    struct StubGenerator {
        text: &'static str,
    }

    #[async_trait]
    impl Recommend for StubGenerator {
        async fn generate(&self, _record: &PatientRecord) -> TriageResult<String> {
            Ok(self.text.to_string())
        }
    }

    fn test_app(is_outlier: bool, classifier_fails: bool, text: &'static str) -> Router {
        let orchestrator = AnalysisOrchestrator::new(
            Arc::new(StubClassifier {
                is_outlier,
                fail: classifier_fails,
            }),
            Arc::new(StubGenerator { text }),
        );
        app(Arc::new(orchestrator))
    }

    fn analyze_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/patient/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn outlier_body() -> serde_json::Value {
        serde_json::json!({
            "age": 65,
            "glucose_level": 280.0,
            "systolic_pressure": 160.0,
            "diastolic_pressure": 95.0,
            "family_history": true
        })
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let app = test_app(false, false, "");
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn outlier_analysis_round_trips_record_and_recommendation() {
        let app = test_app(true, false, "- Contact patient\n- Schedule exam");
        let response = app.oneshot(analyze_request(outlier_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_outlier"], true);
        assert_eq!(json["recommendation"], "- Contact patient\n- Schedule exam");
        assert_eq!(json["record"]["age"], 65);
        assert_eq!(json["record"]["family_history"], true);
    }

    #[tokio::test]
    async fn typical_patient_gets_sentinel_recommendation() {
        let app = test_app(false, false, "should never appear");
        let body = serde_json::json!({
            "age": 30,
            "glucose_level": 90.0,
            "systolic_pressure": 115.0,
            "diastolic_pressure": 75.0,
            "family_history": false
        });
        let response = app.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["is_outlier"], false);
        assert_eq!(json["recommendation"], NO_ACTION_RECOMMENDATION);
    }

    #[tokio::test]
    async fn inverted_blood_pressure_is_rejected_before_analysis() {
        // Classifier would succeed; validation must reject first.
        let app = test_app(true, false, "unused");
        let body = serde_json::json!({
            "age": 50,
            "glucose_level": 120.0,
            "systolic_pressure": 80.0,
            "diastolic_pressure": 95.0,
            "family_history": false
        });
        let response = app.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("systolic_pressure"));
    }

    #[tokio::test]
    async fn classifier_outage_maps_to_service_unavailable() {
        let app = test_app(false, true, "unused");
        let response = app.oneshot(analyze_request(outlier_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        let message = json["error"].as_str().unwrap();
        assert!(message.contains("classification"));
        // Transport detail stays in the logs.
        assert!(!message.contains("stubbed outage"));
    }
}
