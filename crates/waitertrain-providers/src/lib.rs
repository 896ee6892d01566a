//! waitertrain-providers: feedback backends for the training session manager.
//!
//! Implements the `FeedbackProvider` trait for OpenAI, Anthropic and Ollama,
//! plus a canned provider for offline use, and loads `waitertrain.toml`.

pub mod anthropic;
pub mod canned;
pub mod config;
pub mod ollama;
pub mod openai;

pub use config::{
    create_provider, load_catalog, load_config, load_config_from, ProviderConfig, TrainerConfig,
    TrainingSettings,
};
pub use waitertrain_core::error::ProviderError;

/// Sampling parameters shared by the HTTP-backed providers.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationSettings {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 200,
        }
    }
}

/// Pass a successful response through, or classify the failure.
///
/// OpenAI and Anthropic both wrap failures as `{"error": {"message": ...}}`;
/// the inner message is surfaced when present.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::AuthenticationFailed(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(ProviderError::ApiError { status, message });
    }
    Ok(response)
}

#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

pub(crate) fn parse_error(e: reqwest::Error) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}

/// Trim provider output, rejecting blank feedback.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ProviderError::EmptyFeedback),
    }
}
