//! Triage REST API server binary.
//!
//! Loads configuration from the environment, builds the downstream clients
//! and the orchestrator, and serves the REST API. Missing required
//! configuration aborts startup; the process never serves requests it cannot
//! complete.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_core::{
    config::request_timeout_from_env_value, AnalysisOrchestrator, GeminiClient,
    HttpClassificationClient, TriageConfig,
};

/// Main entry point for the triage REST API server
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CLASSIFICATION_SERVICE_URL`: Base URL of the classification service (required)
/// - `GEMINI_API_KEY`: API key for the generation capability (required)
/// - `GEMINI_MODEL`: Generation model identifier (optional)
/// - `TRIAGE_TIMEOUT_SECS`: Downstream request timeout in seconds (optional)
///
/// # Errors
/// Returns an error if:
/// - required configuration is missing,
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("triage_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = TriageConfig::new(
        std::env::var("CLASSIFICATION_SERVICE_URL").unwrap_or_default(),
        std::env::var("GEMINI_API_KEY").unwrap_or_default(),
        std::env::var("GEMINI_MODEL").ok(),
        Some(request_timeout_from_env_value(
            std::env::var("TRIAGE_TIMEOUT_SECS").ok(),
        )?),
    )?;

    let classifier = Arc::new(HttpClassificationClient::new(&cfg)?);
    let generator = Arc::new(GeminiClient::new(&cfg)?);
    let orchestrator = Arc::new(AnalysisOrchestrator::new(classifier, generator));

    tracing::info!("-- Starting triage REST API on {}", addr);
    tracing::info!(
        classification_url = cfg.classification_base_url(),
        model = cfg.generation_model(),
        timeout_secs = cfg.request_timeout().as_secs(),
        "downstream configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::app(orchestrator)).await?;

    Ok(())
}
