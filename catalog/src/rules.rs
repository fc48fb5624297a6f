use serde::{Deserialize, Serialize};

/// Condition that grants an achievement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Best score reached the rule value.
    ScoreThreshold,
    /// Total games played reached the rule value.
    GamesPlayedCount,
    /// Whole minutes of play time reached the rule value.
    TimePlayedMinutes,
    /// A single run reported at least this many perfect matches.
    PerfectMatchCount,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AchievementRule {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub trigger: TriggerKind,
    pub value: u32,
}

impl AchievementRule {
    fn new(name: &str, description: &str, icon: &str, trigger: TriggerKind, value: u32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            trigger,
            value,
        }
    }
}

/// Built-in rule set, used whenever the catalog file does not override it.
pub fn default_rules() -> Vec<AchievementRule> {
    vec![
        AchievementRule::new(
            "Cosmic Cadet",
            "Scored 100+ in frequency match",
            "🚀",
            TriggerKind::ScoreThreshold,
            100,
        ),
        AchievementRule::new(
            "Frequency Master",
            "Unlocked Earl's exclusive content",
            "🎯",
            TriggerKind::ScoreThreshold,
            150,
        ),
        AchievementRule::new(
            "Dedicated Explorer",
            "Played 5 games",
            "⭐",
            TriggerKind::GamesPlayedCount,
            5,
        ),
        AchievementRule::new(
            "Marathon Listener",
            "Spent 30 minutes matching frequencies",
            "🎧",
            TriggerKind::TimePlayedMinutes,
            30,
        ),
        AchievementRule::new(
            "Perfect Pitch",
            "Hit 10 perfect matches in a single run",
            "🎼",
            TriggerKind::PerfectMatchCount,
            10,
        ),
    ]
}
