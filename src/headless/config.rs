//! JSON configuration parsing for headless mode
//!
//! Parses JSON match configurations and turns them into resolver participants.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::combat::abilities::AbilityDefinitions;
use crate::combat::combatant::Participant;
use crate::combat::constants::DEFAULT_DIFFICULTY;
use crate::combat::stats::{CombatantStats, Faction};
use crate::settings::CombatConfig;

/// One combatant in a headless match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantConfig {
    pub id: String,
    pub faction: Faction,
    /// Starting position (x, y, z)
    #[serde(default)]
    pub position: [f32; 3],
    /// Starting stats; missing fields use the defaults
    #[serde(default)]
    pub stats: CombatantStats,
    /// Ability loadout (ids from the ability definitions)
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Whether an AI controller drives this combatant (default: true)
    #[serde(default = "default_true")]
    pub ai_controlled: bool,
    /// Per-combatant difficulty override
    #[serde(default)]
    pub difficulty: Option<f32>,
}

impl CombatantConfig {
    pub fn to_participant(&self) -> Participant {
        let [x, y, z] = self.position;
        Participant::new(self.id.as_str(), self.faction, self.stats.clone())
            .at(Vec3::new(x, y, z))
            .with_abilities(self.abilities.iter().cloned())
    }
}

/// Headless match configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessMatchConfig {
    pub combatants: Vec<CombatantConfig>,
    /// AI difficulty for every controller without an override
    #[serde(default = "default_difficulty")]
    pub difficulty: f32,
    /// Maximum match duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic match reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for match log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Combatant whose progression is tracked (default: first Player combatant)
    #[serde(default)]
    pub tracked: Option<String>,
    /// Combat tuning file (RON); defaults when absent
    #[serde(default)]
    pub combat_config: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_difficulty() -> f32 {
    DEFAULT_DIFFICULTY
}

fn default_max_duration() -> f32 {
    300.0
}

impl HeadlessMatchConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: HeadlessMatchConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Combat tuning for this match
    pub fn combat_settings(&self) -> CombatConfig {
        let mut config = match &self.combat_config {
            Some(path) => CombatConfig::load(path),
            None => CombatConfig::default(),
        };
        config.difficulty = self.difficulty;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.combatants.len() < 2 {
            return Err("at least two combatants are required".to_string());
        }

        let mut ids = HashSet::new();
        for combatant in &self.combatants {
            if combatant.id.trim().is_empty() {
                return Err("combatant ids must not be empty".to_string());
            }
            if !ids.insert(combatant.id.as_str()) {
                return Err(format!("duplicate combatant id '{}'", combatant.id));
            }
            if combatant.difficulty.is_some_and(|d| !(0.0..=1.0).contains(&d)) {
                return Err(format!("difficulty for '{}' must be between 0 and 1", combatant.id));
            }
        }

        let has_faction = |faction: Faction| self.combatants.iter().any(|c| c.faction == faction);
        if !has_faction(Faction::Player) || !has_faction(Faction::Enemy) {
            return Err("combatants must include both a Player and an Enemy".to_string());
        }

        let abilities = self.combat_settings().ability_definitions();
        self.validate_abilities(&abilities)?;

        if !(0.0..=1.0).contains(&self.difficulty) {
            return Err("difficulty must be between 0 and 1".to_string());
        }

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        if let Some(tracked) = &self.tracked {
            if !ids.contains(tracked.as_str()) {
                return Err(format!("tracked combatant '{}' is not in the match", tracked));
            }
        }

        Ok(())
    }

    fn validate_abilities(&self, abilities: &AbilityDefinitions) -> Result<(), String> {
        for combatant in &self.combatants {
            if let Some(unknown) = combatant.abilities.iter().find(|a| !abilities.contains(a)) {
                return Err(format!(
                    "Unknown ability '{}' for '{}'. Valid abilities: {}",
                    unknown,
                    combatant.id,
                    abilities.ids().join(", ")
                ));
            }
        }
        Ok(())
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.combatants.iter().map(CombatantConfig::to_participant).collect()
    }

    /// Id whose progression is recorded
    pub fn tracked_id(&self) -> Option<&str> {
        self.tracked.as_deref().or_else(|| {
            self.combatants
                .iter()
                .find(|c| c.faction == Faction::Player)
                .map(|c| c.id.as_str())
        })
    }
}
