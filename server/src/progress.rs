use catalog::rules::AchievementRule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::{Evaluation, UnlockedItem};

/// One badge earned by a session. Grant order is preserved for display.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GrantedAchievement {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub granted_at: DateTime<Utc>,
}

impl GrantedAchievement {
    pub fn from_rule(rule: &AchievementRule, granted_at: DateTime<Utc>) -> Self {
        Self {
            name: rule.name.clone(),
            description: rule.description.clone(),
            icon: rule.icon.clone(),
            granted_at,
        }
    }
}

/// Durable per-session record. Created lazily on the first score submission
/// and mutated only through the unlock engine.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub session_id: String,
    pub best_score: u32,
    pub total_play_time: u64,
    pub games_played: u32,
    pub last_active: DateTime<Utc>,
    pub unlocked_items: Vec<String>,
    pub achievements: Vec<GrantedAchievement>,
}

impl SessionProgress {
    pub fn new(session_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            best_score: 0,
            total_play_time: 0,
            games_played: 0,
            last_active: now,
            unlocked_items: Vec::new(),
            achievements: Vec::new(),
        }
    }

    /// Whole minutes of play, derived on read.
    pub fn minutes_played(&self) -> u64 {
        self.total_play_time / 60
    }

    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.iter().any(|a| a.name == name)
    }

    pub fn has_unlocked(&self, item_id: &str) -> bool {
        self.unlocked_items.iter().any(|id| id == item_id)
    }

    /// Folds an evaluation into the record. Unlocks and achievements are
    /// appended only if absent, so re-applying an already-satisfied rule is
    /// a no-op.
    pub fn apply(&mut self, evaluation: &Evaluation, now: DateTime<Utc>) {
        self.best_score = evaluation.best_score;
        self.total_play_time = evaluation.total_play_time;
        self.games_played = evaluation.games_played;
        self.last_active = now;

        for item in &evaluation.new_unlocks {
            if !self.has_unlocked(&item.id) {
                self.unlocked_items.push(item.id.clone());
            }
        }

        for rule in &evaluation.new_achievements {
            if !self.has_achievement(&rule.name) {
                self.achievements
                    .push(GrantedAchievement::from_rule(rule, now));
            }
        }
    }
}
