//! Session summaries with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Session, SessionId};

/// Terminal summary of an ended session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub trainee_name: String,
    pub difficulty: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Wall-clock length, rounded to two decimals.
    pub duration_minutes: f64,
    pub final_score: f64,
    pub completed_categories: Vec<String>,
    pub feedback_count: usize,
    /// Share of configured categories completed, in percent.
    pub completion_rate: f64,
}

impl SessionSummary {
    /// Summarize `session` as of `ended_at`.
    pub fn from_session(session: &Session, total_categories: usize, ended_at: DateTime<Utc>) -> Self {
        let elapsed_ms = (ended_at - session.started_at).num_milliseconds().max(0);
        let duration_minutes = round2(elapsed_ms as f64 / 60_000.0);

        let completion_rate = if total_categories == 0 {
            0.0
        } else {
            session.completed_categories.len() as f64 / total_categories as f64 * 100.0
        };

        Self {
            session_id: session.id,
            trainee_name: session.trainee_name.clone(),
            difficulty: session.difficulty.clone(),
            started_at: session.started_at,
            ended_at,
            duration_minutes,
            final_score: session.score,
            completed_categories: session.completed_categories.clone(),
            feedback_count: session.feedback_log.len(),
            completion_rate,
        }
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// File name used when saving into a directory of summaries.
    pub fn file_name(&self) -> String {
        format!(
            "summary-{}-{}.json",
            self.ended_at.format("%Y-%m-%dT%H%M%S"),
            self.session_id.simple()
        )
    }
}

/// Load every `.json` summary in a directory, skipping unreadable files.
pub fn load_summary_directory(dir: &Path) -> Result<Vec<SessionSummary>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut summaries = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match SessionSummary::load_json(&path) {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
            }
        }
    }

    summaries.sort_by_key(|s| s.ended_at);
    Ok(summaries)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
