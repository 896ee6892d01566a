//! Per-trainee progress aggregated across saved session summaries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::report::SessionSummary;

/// Progress statistics for one trainee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraineeProgress {
    pub trainee_name: String,
    /// Number of ended sessions.
    pub sessions: usize,
    pub avg_final_score: f64,
    pub best_final_score: f64,
    pub best_completion_rate: f64,
    /// Total minutes across all sessions.
    pub total_minutes: f64,
    /// Every category completed in at least one session, sorted.
    pub categories_covered: Vec<String>,
    /// Difficulty of the most recent session.
    pub latest_difficulty: String,
}

/// Aggregate progress keyed by trainee name.
pub fn compute_progress(summaries: &[SessionSummary]) -> BTreeMap<String, TraineeProgress> {
    let mut grouped: BTreeMap<&str, Vec<&SessionSummary>> = BTreeMap::new();
    for summary in summaries {
        grouped
            .entry(summary.trainee_name.as_str())
            .or_default()
            .push(summary);
    }

    grouped
        .into_iter()
        .map(|(name, mut sessions)| {
            sessions.sort_by_key(|s| s.ended_at);
            let count = sessions.len();
            let total_score: f64 = sessions.iter().map(|s| s.final_score).sum();
            let covered: BTreeSet<&String> = sessions
                .iter()
                .flat_map(|s| s.completed_categories.iter())
                .collect();

            let progress = TraineeProgress {
                trainee_name: name.to_string(),
                sessions: count,
                avg_final_score: total_score / count as f64,
                best_final_score: sessions.iter().map(|s| s.final_score).fold(0.0, f64::max),
                best_completion_rate: sessions
                    .iter()
                    .map(|s| s.completion_rate)
                    .fold(0.0, f64::max),
                total_minutes: sessions.iter().map(|s| s.duration_minutes).sum(),
                categories_covered: covered.into_iter().cloned().collect(),
                latest_difficulty: sessions
                    .last()
                    .map(|s| s.difficulty.clone())
                    .unwrap_or_default(),
            };
            (name.to_string(), progress)
        })
        .collect()
}
