//! Achievement definitions
//!
//! Loaded from RON (`assets/config/achievements.ron`, embedded by default).
//! Definitions are immutable; unlock state lives in `AchievementProgress`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_ACHIEVEMENTS_RON: &str = include_str!("../../assets/config/achievements.ron");

/// The statistic an achievement is measured against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementMetric {
    BattlesFought,
    BattlesWon,
    DamageDealt,
    DamageTaken,
    Transformations,
    SpecialMoves,
    BestStreak,
    Level,
}

/// Granted once, on unlock
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementReward {
    Experience(u32),
    Ability(String),
    Title(String),
    Arena(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub metric: AchievementMetric,
    pub requirement: f32,
    pub reward: AchievementReward,
}

/// Root structure for achievements.ron
#[derive(Debug, Serialize, Deserialize)]
pub struct AchievementsConfig {
    pub achievements: Vec<AchievementDefinition>,
}

/// Persisted per-achievement state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub id: String,
    pub current_progress: f32,
    pub unlocked: bool,
    /// Unix seconds of the unlock
    #[serde(default)]
    pub unlocked_at: Option<u64>,
}

impl AchievementProgress {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            current_progress: 0.0,
            unlocked: false,
            unlocked_at: None,
        }
    }
}

pub fn from_ron(contents: &str) -> Result<Vec<AchievementDefinition>, String> {
    let config: AchievementsConfig =
        ron::from_str(contents).map_err(|e| format!("Failed to parse achievements: {}", e))?;
    validate(&config.achievements)?;
    Ok(config.achievements)
}

pub fn load_from_file(path: &Path) -> Result<Vec<AchievementDefinition>, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let achievements = from_ron(&contents)?;
    info!(
        "Loaded {} achievement definitions from {}",
        achievements.len(),
        path.display()
    );
    Ok(achievements)
}

/// The embedded achievement set (empty, with an error logged, if it is broken)
pub fn default_achievements() -> Vec<AchievementDefinition> {
    from_ron(DEFAULT_ACHIEVEMENTS_RON).unwrap_or_else(|e| {
        error!("Embedded achievement definitions are invalid: {}", e);
        Vec::new()
    })
}

fn validate(achievements: &[AchievementDefinition]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for achievement in achievements {
        if !seen.insert(achievement.id.as_str()) {
            return Err(format!("Duplicate achievement id '{}'", achievement.id));
        }
        if !(achievement.requirement > 0.0) {
            return Err(format!(
                "Achievement '{}' needs a positive requirement",
                achievement.id
            ));
        }
    }
    Ok(())
}
