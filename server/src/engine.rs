//! The unlock engine: the only writer of session progress, plus the
//! read-only status queries.
//!
//! A submission is load → evaluate → merge → conditional save. When the
//! save loses a version race the whole cycle reruns against the fresh
//! record, a bounded number of times, so concurrent submissions for one
//! session merge instead of overwriting each other. Either the full
//! submission lands in one durable write or nothing does.

use std::sync::Arc;

use catalog::{Catalog, UnlockRequirement};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    database::{ProgressStore, SaveOutcome},
    error::AppError,
    evaluator::{Submission, UnlockedItem, evaluate},
    progress::{GrantedAchievement, SessionProgress},
};

const MAX_SAVE_ATTEMPTS: u32 = 5;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub score: u32,
    pub best_score: u32,
    pub total_play_time: u64,
    pub games_played: u32,
    pub new_unlocks: Vec<UnlockedItem>,
    pub new_achievements: Vec<GrantedAchievement>,
    pub all_unlocks: Vec<String>,
    pub achievements: Vec<GrantedAchievement>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub best_score: u32,
    pub total_play_time: u64,
    /// Derived from the stored seconds on every read, never persisted.
    pub minutes_played: u64,
    pub games_played: u32,
    pub unlocked_items: Vec<String>,
    pub achievements: Vec<GrantedAchievement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UnlockStatus {
    pub is_unlocked: bool,
    pub reason: String,
    pub current_score: u32,
    pub score_required: u32,
}

pub struct UnlockEngine {
    store: Arc<dyn ProgressStore>,
    catalog: Catalog,
}

impl UnlockEngine {
    pub fn new(store: Arc<dyn ProgressStore>, catalog: Catalog) -> Self {
        Self { store, catalog }
    }

    pub async fn submit_score(
        &self,
        session_id: &str,
        submission: Submission,
    ) -> Result<SubmissionOutcome, AppError> {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let now = Utc::now();

            let (expected_version, mut progress) = match self.store.load(session_id).await? {
                Some(stored) => (stored.version, stored.progress),
                None => (0, SessionProgress::new(session_id, now)),
            };

            let evaluation = evaluate(&progress, &submission, &self.catalog);
            progress.apply(&evaluation, now);

            match self.store.save(expected_version, &progress).await? {
                SaveOutcome::Saved => {
                    if !evaluation.new_unlocks.is_empty() || !evaluation.new_achievements.is_empty()
                    {
                        info!(
                            session_id,
                            unlocks = evaluation.new_unlocks.len(),
                            achievements = evaluation.new_achievements.len(),
                            "Granted new unlocks"
                        );
                    }

                    let new_achievements = evaluation
                        .new_achievements
                        .iter()
                        .map(|rule| GrantedAchievement::from_rule(rule, now))
                        .collect();

                    return Ok(SubmissionOutcome {
                        score: submission.score,
                        best_score: progress.best_score,
                        total_play_time: progress.total_play_time,
                        games_played: progress.games_played,
                        new_unlocks: evaluation.new_unlocks,
                        new_achievements,
                        all_unlocks: progress.unlocked_items.clone(),
                        achievements: progress.achievements,
                    });
                }
                SaveOutcome::Conflict => {
                    debug!(session_id, attempt, "Save conflicted, reloading");
                }
            }
        }

        warn!(session_id, "Submission exhausted save attempts");
        Err(AppError::WriteContention)
    }

    /// A session that has never played reports zeros, not an error.
    pub async fn progress_summary(&self, session_id: &str) -> Result<ProgressSummary, AppError> {
        let summary = match self.store.load(session_id).await? {
            Some(stored) => ProgressSummary {
                best_score: stored.progress.best_score,
                total_play_time: stored.progress.total_play_time,
                minutes_played: stored.progress.minutes_played(),
                games_played: stored.progress.games_played,
                unlocked_items: stored.progress.unlocked_items,
                achievements: stored.progress.achievements,
                last_active: Some(stored.progress.last_active),
            },
            None => ProgressSummary {
                best_score: 0,
                total_play_time: 0,
                minutes_played: 0,
                games_played: 0,
                unlocked_items: Vec::new(),
                achievements: Vec::new(),
                last_active: None,
            },
        };

        Ok(summary)
    }

    pub async fn unlock_status(
        &self,
        session_id: &str,
        item_id: &str,
    ) -> Result<UnlockStatus, AppError> {
        let item = self
            .catalog
            .find_item(item_id)
            .ok_or(AppError::ItemNotFound)?;

        let progress = self
            .store
            .load(session_id)
            .await?
            .map(|stored| stored.progress);

        let current_score = progress.as_ref().map_or(0, |p| p.best_score);

        let (is_unlocked, reason) = match item.unlock_requirement {
            UnlockRequirement::Free => (true, "Always available".to_string()),
            UnlockRequirement::Purchase => (false, "Available for purchase".to_string()),
            UnlockRequirement::GameScore => {
                // The unlocked set is authoritative: once earned, a later
                // threshold edit never locks the item again.
                if progress.as_ref().is_some_and(|p| p.has_unlocked(&item.id)) {
                    (true, "Unlocked through gameplay".to_string())
                } else {
                    (
                        false,
                        format!(
                            "Score {} points in Frequency Match to unlock",
                            item.score_required
                        ),
                    )
                }
            }
        };

        Ok(UnlockStatus {
            is_unlocked,
            reason,
            current_score,
            score_required: item.score_required,
        })
    }
}
