//! Error taxonomy for the triage analysis core.
//!
//! The split matters to callers: `Configuration` means the process is
//! misconfigured and should never have started serving, while
//! `DependencyUnavailable` is a per-request downstream failure a caller may
//! retry or alert on. `Validation` rejects malformed records at the boundary
//! before they reach the orchestrator.

/// Identifies which downstream capability a dependency failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Downstream {
    Classification,
    Recommendation,
}

impl std::fmt::Display for Downstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Downstream::Classification => write!(f, "classification"),
            Downstream::Recommendation => write!(f, "recommendation"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    /// Required configuration is missing or unusable. Fatal at startup,
    /// never retried.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A downstream capability was unreachable or returned an error. The
    /// reason never includes credentials.
    #[error("{service} service unavailable: {reason}")]
    DependencyUnavailable {
        service: Downstream,
        reason: String,
    },
    /// The patient record failed boundary validation.
    #[error("invalid patient record: {0}")]
    Validation(String),
}

impl TriageError {
    /// Shorthand for a dependency failure against the given downstream.
    pub fn dependency(service: Downstream, reason: impl Into<String>) -> Self {
        TriageError::DependencyUnavailable {
            service,
            reason: reason.into(),
        }
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
