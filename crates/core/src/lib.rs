//! # Triage Core
//!
//! Core business logic for the patient triage analysis service.
//!
//! This crate contains the orchestration pipeline and its collaborators:
//! - Patient data model with boundary validation
//! - Classification client wrapping the remote outlier-detection service
//! - Recommendation generator wrapping the remote generative-text capability
//! - The orchestrator that sequences the two and composes the final result
//!
//! **No API concerns**: HTTP routing, OpenAPI documentation, and server
//! lifecycle belong in `api-rest`.

#![warn(rust_2018_idioms)]

pub mod analysis;
pub mod classify;
pub mod config;
pub mod error;
pub mod patient;
pub mod recommend;

pub use analysis::{AnalysisOrchestrator, NO_ACTION_RECOMMENDATION};
pub use classify::{Classification, Classify, HttpClassificationClient};
pub use config::TriageConfig;
pub use error::{Downstream, TriageError, TriageResult};
pub use patient::{AnalysisResult, PatientRecord};
pub use recommend::{GeminiClient, Recommend};
