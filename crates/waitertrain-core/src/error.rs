//! Error types for the training core.
//!
//! `TrainingError` is what callers of the session manager see. `ProviderError`
//! describes feedback provider failures; it is defined here so the manager can
//! classify and log them, but it never escapes `process_response`.

use thiserror::Error;
use uuid::Uuid;

/// Errors reported to callers of [`crate::SessionManager`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrainingError {
    /// The session id was never issued or the session has already ended.
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// The requested category is not part of the configured catalog.
    #[error("category {0} not found")]
    UnknownCategory(String),

    /// A response was submitted against the current scenario, but none has
    /// been served to this session yet.
    #[error("session {0} has no active scenario")]
    NoActiveScenario(Uuid),
}

/// Errors that can occur when asking a feedback provider for an evaluation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The provider answered but produced no usable feedback text.
    #[error("empty feedback from provider")]
    EmptyFeedback,

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProviderError::AuthenticationFailed(_))
    }
}
