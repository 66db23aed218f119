//! Combat configuration
//!
//! Construction-time tuning for the combat core: energy regen, basic attack
//! and transform cooldowns, AI difficulty, and optional paths to replacement
//! ability/achievement definition files. Nothing here changes once a resolver
//! has been built from it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::combat::abilities::AbilityDefinitions;
use crate::combat::constants::{DEFAULT_DIFFICULTY, DEFAULT_TRANSFORM_COOLDOWN_MS};
use crate::combat::ledger::{DEFAULT_ATTACK_COOLDOWN_MS, DEFAULT_ENERGY_REGEN_RATE};
use crate::progression::achievements::AchievementDefinition;

/// Default location of the combat config, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "assets/config/combat.ron";

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Fraction of max energy regenerated per second
    pub energy_regen_rate_per_second: f32,
    /// Minimum time between basic attacks
    pub attack_cooldown_ms: u32,
    /// Minimum time between form changes
    pub transform_cooldown_ms: u32,
    /// Enemy AI difficulty (0.0 to 1.0)
    pub difficulty: f32,
    /// Replacement ability definitions (RON). Embedded defaults when absent.
    pub abilities_path: Option<PathBuf>,
    /// Replacement achievement definitions (RON). Embedded defaults when absent.
    pub achievements_path: Option<PathBuf>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            energy_regen_rate_per_second: DEFAULT_ENERGY_REGEN_RATE,
            attack_cooldown_ms: DEFAULT_ATTACK_COOLDOWN_MS,
            transform_cooldown_ms: DEFAULT_TRANSFORM_COOLDOWN_MS,
            difficulty: DEFAULT_DIFFICULTY,
            abilities_path: None,
            achievements_path: None,
        }
    }
}

impl CombatConfig {
    /// Load from a RON file, or return defaults if the file is missing or broken
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No combat config at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_ron(&contents) {
                Ok(config) => {
                    info!("Loaded combat config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("{}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read combat config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let config: CombatConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse combat config: {}", e))?;
        Ok(config.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize combat config: {}", e))?;
        fs::write(path, contents).map_err(|e| format!("Failed to write {:?}: {}", path, e))?;
        info!("Saved combat config to {:?}", path);
        Ok(())
    }

    /// Clamp out-of-range values into something the core can run with
    pub fn sanitized(mut self) -> Self {
        if !self.difficulty.is_finite() {
            self.difficulty = DEFAULT_DIFFICULTY;
        }
        self.difficulty = self.difficulty.clamp(0.0, 1.0);

        if !self.energy_regen_rate_per_second.is_finite() || self.energy_regen_rate_per_second < 0.0 {
            warn!(
                "Invalid energy regen rate {}, using 0",
                self.energy_regen_rate_per_second
            );
            self.energy_regen_rate_per_second = 0.0;
        }
        self
    }

    /// Ability definitions named by this config, or the embedded set.
    ///
    /// A broken replacement file is logged and the embedded set is used instead.
    pub fn ability_definitions(&self) -> AbilityDefinitions {
        match &self.abilities_path {
            Some(path) => AbilityDefinitions::load_from_file(path).unwrap_or_else(|e| {
                warn!("{}; falling back to built-in abilities", e);
                AbilityDefinitions::default()
            }),
            None => AbilityDefinitions::default(),
        }
    }

    /// Achievement definitions named by this config, or the embedded set
    pub fn achievement_definitions(&self) -> Vec<AchievementDefinition> {
        match &self.achievements_path {
            Some(path) => crate::progression::achievements::load_from_file(path).unwrap_or_else(|e| {
                warn!("{}; falling back to built-in achievements", e);
                crate::progression::achievements::default_achievements()
            }),
            None => crate::progression::achievements::default_achievements(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults_for_missing_fields() {
        let config = CombatConfig::from_ron("(difficulty: 0.9)").expect("partial config should parse");

        assert_eq!(config.difficulty, 0.9);
        assert_eq!(config.attack_cooldown_ms, 500);
        assert_eq!(config.energy_regen_rate_per_second, 0.2);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = CombatConfig::from_ron("(difficulty: 3.0, energy_regen_rate_per_second: -1.0)")
            .expect("config should parse");

        assert_eq!(config.difficulty, 1.0);
        assert_eq!(config.energy_regen_rate_per_second, 0.0);
    }

    #[test]
    fn test_missing_file_returns_defaults() {
        let config = CombatConfig::load(Path::new("definitely/not/here.ron"));
        assert_eq!(config, CombatConfig::default());
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(CombatConfig::from_ron("not ron at all {").is_err());
    }

    #[test]
    fn test_broken_abilities_path_falls_back() {
        let config = CombatConfig {
            abilities_path: Some(PathBuf::from("missing_abilities.ron")),
            ..Default::default()
        };
        assert!(!config.ability_definitions().is_empty());
    }
}
