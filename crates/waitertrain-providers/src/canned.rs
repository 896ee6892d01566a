//! Canned feedback provider for offline use and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use waitertrain_core::error::ProviderError;
use waitertrain_core::traits::{FeedbackProvider, FeedbackRequest};

/// Returns configured feedback without calling any model.
///
/// Feedback is chosen by category, falling back to a default template in
/// which `{category}` and `{difficulty}` are substituted.
pub struct CannedProvider {
    by_category: HashMap<String, String>,
    default_feedback: String,
    failing: bool,
    call_count: AtomicU32,
    last_request: Mutex<Option<FeedbackRequest>>,
}

pub const DEFAULT_CANNED_FEEDBACK: &str = "Thanks for your {category} response. You covered the basics well; at {difficulty} level, try adding one specific detail that makes the guest feel looked after.";

impl CannedProvider {
    /// Create a provider with per-category feedback.
    pub fn new(by_category: HashMap<String, String>) -> Self {
        Self {
            by_category,
            default_feedback: DEFAULT_CANNED_FEEDBACK.to_string(),
            failing: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a provider that always returns the same feedback.
    pub fn with_fixed_feedback(feedback: &str) -> Self {
        Self::default().with_default_feedback(feedback)
    }

    /// Replace the feedback used for categories without a specific entry.
    pub fn with_default_feedback(mut self, feedback: &str) -> Self {
        self.default_feedback = feedback.to_string();
        self
    }

    /// Create a provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(HashMap::new())
        }
    }

    /// Number of evaluations requested so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<FeedbackRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for CannedProvider {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

#[async_trait]
impl FeedbackProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn evaluate(&self, request: &FeedbackRequest) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        if self.failing {
            return Err(ProviderError::NetworkError("canned provider set to fail".into()).into());
        }

        let template = self
            .by_category
            .get(&request.category)
            .unwrap_or(&self.default_feedback);

        Ok(template
            .replace("{category}", &request.category.replace('_', " "))
            .replace("{difficulty}", &request.difficulty))
    }
}
