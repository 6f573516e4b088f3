//! Error taxonomy shared by the session, generation and scoring layers.

use thiserror::Error;

/// Errors surfaced by the interview core.
///
/// `UpstreamUnavailable` only escapes the core where no deterministic
/// fallback exists (question editing, health probes, speech synthesis).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InterviewError {
    /// Bad or missing required input
    #[error("{0}")]
    InvalidInput(String),

    /// Unknown session, interview, transcript or result id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Operation is not valid in the current state
    #[error("{0}")]
    FailedPrecondition(String),

    /// Language model or speech service could not be reached
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence layer failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else that should not happen in normal operation
    #[error("internal error: {0}")]
    Internal(String),
}

impl InterviewError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::FailedPrecondition(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<std::io::Error> for InterviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for InterviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(format!("JSON: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, InterviewError>;
