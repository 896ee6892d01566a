//! The session manager: owner of every live training session.
//!
//! Sessions live in a table guarded by an async `RwLock`; each entry is its own
//! `Mutex`, so operations on different sessions never contend beyond a brief
//! table lookup. `process_response` asks the feedback provider for an
//! evaluation while holding no lock at all, then takes the session mutex to
//! apply the completion/score/suggestion update as one step. A session ended
//! while its feedback was in flight is left untouched and the late response is
//! rejected with `SessionNotFound`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::catalog::ScenarioCatalog;
use crate::error::TrainingError;
use crate::model::{
    ResponseOutcome, ScenarioPrompt, Session, SessionId, SessionStatus, FALLBACK_FEEDBACK,
};
use crate::report::SessionSummary;
use crate::selection::{pick_any, suggest_next, CategorySelector, RandomSelector};
use crate::traits::{FeedbackProvider, FeedbackRequest};

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Points added per processed response.
    pub score_increment: f64,
    /// Score ceiling.
    pub max_score: f64,
    /// Upper bound on a single feedback provider call.
    pub feedback_timeout: Duration,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            score_increment: 10.0,
            max_score: 100.0,
            feedback_timeout: Duration::from_secs(30),
        }
    }
}

/// `None` once the session has been ended.
type SessionSlot = Arc<Mutex<Option<Session>>>;

/// Owns the live session table and drives the session state machine.
pub struct SessionManager {
    catalog: Arc<ScenarioCatalog>,
    provider: Arc<dyn FeedbackProvider>,
    selector: Arc<dyn CategorySelector>,
    config: SessionManagerConfig,
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
}

impl SessionManager {
    pub fn new(
        catalog: Arc<ScenarioCatalog>,
        provider: Arc<dyn FeedbackProvider>,
        config: SessionManagerConfig,
    ) -> Self {
        Self {
            catalog,
            provider,
            selector: Arc::new(RandomSelector::new()),
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the randomness source used by both selection policies.
    pub fn with_selector(mut self, selector: Arc<dyn CategorySelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionManagerConfig {
        &self.config
    }

    pub fn categories(&self) -> &[String] {
        self.catalog.categories()
    }

    pub fn difficulty_levels(&self) -> &[String] {
        self.catalog.difficulty_levels()
    }

    pub fn describe(&self, category: &str) -> &str {
        self.catalog.describe(category)
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Create a session and return its id.
    ///
    /// Names are not validated; adapters supply a default for empty input. An
    /// unconfigured difficulty is kept as given and resolved to the catalog
    /// default whenever a prompt is rendered.
    pub async fn start_session(&self, trainee_name: &str, difficulty: &str) -> SessionId {
        let mut sessions = self.sessions.write().await;

        let mut session = Session::new(trainee_name, difficulty);
        while sessions.contains_key(&session.id) {
            session = Session::new(trainee_name, difficulty);
        }
        let id = session.id;

        if self.catalog.resolve_difficulty(difficulty) != difficulty {
            warn!(
                session_id = %id,
                "difficulty '{difficulty}' is not configured, prompts will use '{}'",
                self.catalog.default_difficulty()
            );
        }

        sessions.insert(id, Arc::new(Mutex::new(Some(session))));
        info!(session_id = %id, trainee = trainee_name, difficulty, "started training session");

        id
    }

    /// Serve a scenario. With no category, any configured category may be
    /// chosen, including ones already completed.
    ///
    /// Progress is left untouched; only the session's current-scenario pointer
    /// moves.
    pub async fn next_scenario(
        &self,
        session_id: SessionId,
        category: Option<&str>,
    ) -> Result<ScenarioPrompt, TrainingError> {
        let slot = self.slot(session_id).await?;

        let category = match category {
            Some(c) if self.catalog.contains(c) => c.to_string(),
            Some(c) => return Err(TrainingError::UnknownCategory(c.to_string())),
            None => pick_any(self.selector.as_ref(), &self.catalog)
                .ok_or_else(|| TrainingError::UnknownCategory(String::new()))?,
        };

        let mut guard = slot.lock().await;
        let session = guard
            .as_mut()
            .ok_or(TrainingError::SessionNotFound(session_id))?;

        let prompt = self.catalog.prompt_for(&category, &session.difficulty);
        session.current_category = Some(category.clone());
        debug!(session_id = %session_id, category = %category, "served scenario");

        Ok(ScenarioPrompt {
            session_id,
            category,
            prompt,
            difficulty: session.difficulty.clone(),
        })
    }

    /// Evaluate a response, record the category as completed, and raise the
    /// score.
    ///
    /// Feedback provider failures never surface here: the fallback text is
    /// recorded instead and the session carries on.
    pub async fn process_response(
        &self,
        session_id: SessionId,
        category: &str,
        response_text: &str,
    ) -> Result<ResponseOutcome, TrainingError> {
        let slot = self.slot(session_id).await?;

        if !self.catalog.contains(category) {
            return Err(TrainingError::UnknownCategory(category.to_string()));
        }

        let difficulty = {
            let guard = slot.lock().await;
            guard
                .as_ref()
                .map(|s| s.difficulty.clone())
                .ok_or(TrainingError::SessionNotFound(session_id))?
        };

        let request = FeedbackRequest::new(category, response_text, &difficulty);
        let (feedback, used_fallback) = self.request_feedback(session_id, &request).await;

        let mut guard = slot.lock().await;
        let Some(session) = guard.as_mut() else {
            warn!(session_id = %session_id, "session ended while feedback was pending");
            return Err(TrainingError::SessionNotFound(session_id));
        };

        session.record_completion(category);
        session.feedback_log.push(feedback.clone());
        let score = session.add_score(self.config.score_increment, self.config.max_score);
        let suggested_next = suggest_next(
            self.selector.as_ref(),
            &self.catalog,
            &session.completed_categories,
        );

        debug!(
            session_id = %session_id,
            category,
            score,
            completed = session.completed_categories.len(),
            "processed response"
        );

        Ok(ResponseOutcome {
            feedback,
            score,
            completed_count: session.completed_categories.len(),
            suggested_next,
            used_fallback,
        })
    }

    /// Process a response against the scenario most recently served to this
    /// session, so callers need not echo the category back.
    pub async fn respond_to_current(
        &self,
        session_id: SessionId,
        response_text: &str,
    ) -> Result<ResponseOutcome, TrainingError> {
        let category = {
            let slot = self.slot(session_id).await?;
            let guard = slot.lock().await;
            let session = guard
                .as_ref()
                .ok_or(TrainingError::SessionNotFound(session_id))?;
            session
                .current_category
                .clone()
                .ok_or(TrainingError::NoActiveScenario(session_id))?
        };

        self.process_response(session_id, &category, response_text)
            .await
    }

    /// Finalize a session into a summary and discard it. Not idempotent.
    pub async fn end_session(&self, session_id: SessionId) -> Result<SessionSummary, TrainingError> {
        let slot = self
            .sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(TrainingError::SessionNotFound(session_id))?;

        let session = slot
            .lock()
            .await
            .take()
            .ok_or(TrainingError::SessionNotFound(session_id))?;

        let summary =
            SessionSummary::from_session(&session, self.catalog.categories().len(), Utc::now());

        info!(
            session_id = %session_id,
            trainee = %summary.trainee_name,
            final_score = summary.final_score,
            completion_rate = summary.completion_rate,
            "ended training session"
        );

        Ok(summary)
    }

    /// Snapshot of a live session, or `None` for unknown and ended ids.
    pub async fn get_status(&self, session_id: SessionId) -> Option<SessionStatus> {
        let slot = self.slot(session_id).await.ok()?;
        let guard = slot.lock().await;
        guard.as_ref().map(Session::status)
    }

    async fn slot(&self, session_id: SessionId) -> Result<SessionSlot, TrainingError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(TrainingError::SessionNotFound(session_id))
    }

    /// Ask the provider for feedback, degrading to the fallback text on error,
    /// empty output, or timeout.
    async fn request_feedback(
        &self,
        session_id: SessionId,
        request: &FeedbackRequest,
    ) -> (String, bool) {
        let provider = self.provider.name();
        let outcome =
            tokio::time::timeout(self.config.feedback_timeout, self.provider.evaluate(request))
                .await;

        match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => (text.trim().to_string(), false),
            Ok(Ok(_)) => {
                warn!(session_id = %session_id, provider, "feedback provider returned no text");
                (FALLBACK_FEEDBACK.to_string(), true)
            }
            Ok(Err(e)) => {
                warn!(session_id = %session_id, provider, "feedback provider failed: {e:#}");
                (FALLBACK_FEEDBACK.to_string(), true)
            }
            Err(_) => {
                warn!(
                    session_id = %session_id,
                    provider,
                    "feedback provider timed out after {:?}",
                    self.config.feedback_timeout
                );
                (FALLBACK_FEEDBACK.to_string(), true)
            }
        }
    }
}
