//! Core data model types for waitertrain.
//!
//! `Session` is the only mutable entity in the system. Everything handed back
//! to callers is a snapshot (`SessionStatus`, `ScenarioPrompt`,
//! `ResponseOutcome`) so no reference to live state outlives a call.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// External handle for a live session.
pub type SessionId = Uuid;

/// Difficulty used when a requested level is not configured.
pub const DEFAULT_DIFFICULTY: &str = "beginner";

/// Suggestion text returned once every configured category has been completed.
pub const ALL_COMPLETED_MESSAGE: &str =
    "Congratulations! You've completed all training scenarios.";

/// Feedback recorded when the feedback provider fails or times out.
pub const FALLBACK_FEEDBACK: &str = "Thank you for your response. I'm having trouble processing feedback right now, but please continue with the training.";

/// A single trainee's training session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub trainee_name: String,
    pub difficulty: String,
    pub started_at: DateTime<Utc>,
    /// Categories completed at least once, in first-completion order.
    pub completed_categories: Vec<String>,
    pub score: f64,
    /// One entry per processed response. Append-only.
    pub feedback_log: Vec<String>,
    /// Category most recently served by `next_scenario`.
    pub current_category: Option<String>,
}

impl Session {
    pub fn new(trainee_name: &str, difficulty: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            trainee_name: trainee_name.to_string(),
            difficulty: difficulty.to_string(),
            started_at: Utc::now(),
            completed_categories: Vec::new(),
            score: 0.0,
            feedback_log: Vec::new(),
            current_category: None,
        }
    }

    /// Mark `category` as completed. Returns `false` if it already was.
    pub fn record_completion(&mut self, category: &str) -> bool {
        if self.completed_categories.iter().any(|c| c == category) {
            return false;
        }
        self.completed_categories.push(category.to_string());
        true
    }

    /// Raise the score by `increment`, never past `ceiling` and never down.
    pub fn add_score(&mut self, increment: f64, ceiling: f64) -> f64 {
        let raised = (self.score + increment.max(0.0)).min(ceiling);
        self.score = self.score.max(raised);
        self.score
    }

    pub fn is_completed(&self, category: &str) -> bool {
        self.completed_categories.iter().any(|c| c == category)
    }

    /// Take a structural snapshot of this session.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            trainee_name: self.trainee_name.clone(),
            difficulty: self.difficulty.clone(),
            started_at: self.started_at,
            completed_categories: self.completed_categories.clone(),
            score: self.score,
            feedback_count: self.feedback_log.len(),
            current_category: self.current_category.clone(),
        }
    }
}

/// Read-only snapshot returned by `SessionManager::get_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub trainee_name: String,
    pub difficulty: String,
    pub started_at: DateTime<Utc>,
    pub completed_categories: Vec<String>,
    pub score: f64,
    pub feedback_count: usize,
    #[serde(default)]
    pub current_category: Option<String>,
}

/// A rendered scenario served to a trainee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPrompt {
    pub session_id: SessionId,
    pub category: String,
    pub prompt: String,
    /// The session's difficulty, as requested at creation.
    pub difficulty: String,
}

/// Result of processing one trainee response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    pub feedback: String,
    pub score: f64,
    pub completed_count: usize,
    pub suggested_next: NextStep,
    /// `true` when the provider failed and the fallback text was recorded.
    #[serde(default)]
    pub used_fallback: bool,
}

/// What the trainee should try after a response.
///
/// Serializes as a plain string: either the category id or
/// [`ALL_COMPLETED_MESSAGE`]. Callers must treat `AllCompleted` as terminal and
/// never pass it to `next_scenario`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NextStep {
    Category(String),
    AllCompleted,
}

impl NextStep {
    pub fn as_str(&self) -> &str {
        match self {
            NextStep::Category(c) => c,
            NextStep::AllCompleted => ALL_COMPLETED_MESSAGE,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            NextStep::Category(c) => Some(c),
            NextStep::AllCompleted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NextStep::AllCompleted)
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NextStep {
    fn from(s: String) -> Self {
        if s == ALL_COMPLETED_MESSAGE {
            NextStep::AllCompleted
        } else {
            NextStep::Category(s)
        }
    }
}

impl From<NextStep> for String {
    fn from(step: NextStep) -> Self {
        match step {
            NextStep::Category(c) => c,
            NextStep::AllCompleted => ALL_COMPLETED_MESSAGE.to_string(),
        }
    }
}
