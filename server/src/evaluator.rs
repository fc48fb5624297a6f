//! Pure decision logic for a score submission.
//!
//! Given a progress snapshot and the submitted run, computes the candidate
//! totals and which achievement rules and game-score unlocks become newly
//! satisfied. No I/O, no clock: the engine owns persistence and timestamps,
//! so the same inputs always produce the same decision.

use catalog::{
    Catalog,
    rules::{AchievementRule, TriggerKind},
};
use serde::Serialize;

use crate::progress::SessionProgress;

/// One validated game run.
#[derive(Debug, Clone, Copy)]
pub struct Submission {
    pub score: u32,
    pub play_time: u32,
    pub perfect_matches: Option<u32>,
}

/// Catalog item newly earned by this submission.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UnlockedItem {
    pub id: String,
    pub name: String,
}

/// What a submission should change.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub best_score: u32,
    pub total_play_time: u64,
    pub games_played: u32,
    pub new_unlocks: Vec<UnlockedItem>,
    pub new_achievements: Vec<AchievementRule>,
}

pub fn evaluate(
    progress: &SessionProgress,
    submission: &Submission,
    catalog: &Catalog,
) -> Evaluation {
    let best_score = progress.best_score.max(submission.score);
    let total_play_time = progress.total_play_time + u64::from(submission.play_time);
    let games_played = progress.games_played + 1;

    // Rules are checked in declaration order; already-granted names never
    // re-fire.
    let mut new_achievements = Vec::new();
    for rule in catalog.rules() {
        if progress.has_achievement(&rule.name) {
            continue;
        }

        let satisfied = match rule.trigger {
            TriggerKind::ScoreThreshold => best_score >= rule.value,
            TriggerKind::GamesPlayedCount => games_played >= rule.value,
            TriggerKind::TimePlayedMinutes => total_play_time / 60 >= u64::from(rule.value),
            TriggerKind::PerfectMatchCount => submission
                .perfect_matches
                .is_some_and(|count| count >= rule.value),
        };

        if satisfied {
            new_achievements.push(rule.clone());
        }
    }

    // Unlocks are checked against the candidate best score, in catalog
    // order. The unlocked set is authoritative: items already present are
    // skipped, never re-granted.
    let mut new_unlocks = Vec::new();
    for item in catalog.game_unlock_items() {
        if item.score_required <= best_score && !progress.has_unlocked(&item.id) {
            new_unlocks.push(UnlockedItem {
                id: item.id.clone(),
                name: item.name.clone(),
            });
        }
    }

    Evaluation {
        best_score,
        total_play_time,
        games_played,
        new_unlocks,
        new_achievements,
    }
}
