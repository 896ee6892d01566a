//! Trait definition for feedback providers.
//!
//! Implemented by the `waitertrain-providers` crate. The session manager only
//! ever sees a `dyn FeedbackProvider`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Feedback provider trait
// ---------------------------------------------------------------------------

/// A backend that evaluates a trainee response and returns feedback text.
///
/// Implementations may fail or hang; the session manager bounds every call
/// with a timeout and records fallback text on any error.
#[async_trait]
pub trait FeedbackProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Evaluate one response.
    async fn evaluate(&self, request: &FeedbackRequest) -> anyhow::Result<String>;
}

/// One response submitted for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub category: String,
    pub response_text: String,
    pub difficulty: String,
}

impl FeedbackRequest {
    pub fn new(category: &str, response_text: &str, difficulty: &str) -> Self {
        Self {
            category: category.to_string(),
            response_text: response_text.to_string(),
            difficulty: difficulty.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default evaluation prompt
// ---------------------------------------------------------------------------

/// System prompt for LLM-backed feedback providers.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert restaurant trainer evaluating a waiter's response to a training scenario.";

/// Render the evaluation prompt sent to LLM-backed providers.
pub fn build_feedback_prompt(request: &FeedbackRequest) -> String {
    format!(
        "Category: {}\n\
         Difficulty Level: {}\n\
         Waiter's Response: {}\n\n\
         Please provide constructive feedback that:\n\
         1. Acknowledges what was done well\n\
         2. Suggests specific improvements\n\
         3. Provides actionable advice\n\
         4. Maintains a positive, encouraging tone\n\n\
         Keep the feedback concise but helpful (2-3 sentences).",
        request.category, request.difficulty, request.response_text
    )
}
