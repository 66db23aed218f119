//! Data-Driven Ability Definitions
//!
//! Abilities are defined in RON (`assets/config/abilities.ron`) and never
//! mutated once loaded. The default set is embedded in the binary so a
//! resolver can always be built, even without an assets directory.
//!
//! ## Usage
//! ```ignore
//! let abilities = AbilityDefinitions::default();
//! let def = abilities.get("plasma_lance").unwrap();
//! println!("Plasma Lance costs {} energy", def.energy_cost);
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::effects::EffectTemplate;

const DEFAULT_ABILITIES_RON: &str = include_str!("../../assets/config/abilities.ron");

/// Who an ability lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// The caster
    #[serde(rename = "self")]
    Caster,
    /// A single hostile target
    Enemy,
    /// Every hostile combatant within range of the caster
    Area,
}

/// Flavour of damage, carried through to events for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Physical,
    Energy,
    Fire,
    Electric,
}

/// Immutable ability definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityInfo {
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub energy_cost: f32,
    #[serde(default)]
    pub cooldown_ms: u32,
    /// Direct damage. Applied raw, ignoring the target's defense.
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default)]
    pub damage_type: Option<DamageType>,
    /// Effects applied to every target hit
    #[serde(default)]
    pub effects: Vec<EffectTemplate>,
    pub range: f32,
    pub target_type: TargetType,
}

impl AbilityInfo {
    pub fn is_damage(&self) -> bool {
        self.damage.is_some_and(|d| d > 0.0)
    }

    /// Whether the ability only helps whoever it lands on
    pub fn is_supportive(&self) -> bool {
        !self.is_damage() && self.effects.iter().all(|e| !e.kind.is_harmful())
    }
}

/// Root structure for abilities.ron
#[derive(Debug, Serialize, Deserialize)]
pub struct AbilitiesConfig {
    pub abilities: Vec<AbilityInfo>,
}

/// All ability definitions, keyed by id.
#[derive(Clone, Debug)]
pub struct AbilityDefinitions {
    definitions: HashMap<String, AbilityInfo>,
}

impl Default for AbilityDefinitions {
    /// The embedded default ability set. Logs and returns an empty set if the
    /// embedded file is broken.
    fn default() -> Self {
        match Self::from_ron(DEFAULT_ABILITIES_RON) {
            Ok(definitions) => definitions,
            Err(e) => {
                error!("Embedded ability definitions are invalid: {}", e);
                Self {
                    definitions: HashMap::new(),
                }
            }
        }
    }
}

impl AbilityDefinitions {
    /// Build from a list, validating every entry
    pub fn new(abilities: Vec<AbilityInfo>) -> Result<Self, String> {
        validate_abilities(&abilities)?;
        Ok(Self {
            definitions: abilities.into_iter().map(|a| (a.id.clone(), a)).collect(),
        })
    }

    pub fn from_ron(contents: &str) -> Result<Self, String> {
        let config: AbilitiesConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse abilities: {}", e))?;
        Self::new(config.abilities)
    }

    /// Load ability definitions from a RON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let definitions = Self::from_ron(&contents)?;
        info!(
            "Loaded {} ability definitions from {}",
            definitions.len(),
            path.display()
        );
        Ok(definitions)
    }

    pub fn get(&self, id: &str) -> Option<&AbilityInfo> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityInfo> {
        self.definitions.values()
    }

    /// All ability ids, sorted for stable output
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn validate_abilities(abilities: &[AbilityInfo]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for ability in abilities {
        if ability.id.is_empty() {
            return Err("Ability with empty id".to_string());
        }
        if !seen.insert(ability.id.as_str()) {
            return Err(format!("Duplicate ability id '{}'", ability.id));
        }
        if ability.energy_cost < 0.0 {
            return Err(format!("Ability '{}' has negative energy cost", ability.id));
        }
        if ability.range < 0.0 {
            return Err(format!("Ability '{}' has negative range", ability.id));
        }
        if ability.damage.is_some_and(|d| d < 0.0) {
            return Err(format!("Ability '{}' has negative damage", ability.id));
        }
        if let Some(effect) = ability.effects.iter().find(|e| e.duration <= 0.0) {
            return Err(format!(
                "Ability '{}' applies {:?} with non-positive duration",
                ability.id, effect.kind
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effects::StatusEffectKind;

    fn test_ability(id: &str) -> AbilityInfo {
        AbilityInfo {
            id: id.to_string(),
            name: "Test".to_string(),
            energy_cost: 20.0,
            cooldown_ms: 3000,
            damage: Some(15.0),
            damage_type: Some(DamageType::Energy),
            effects: vec![],
            range: 10.0,
            target_type: TargetType::Enemy,
        }
    }

    #[test]
    fn test_embedded_definitions_load() {
        let abilities = AbilityDefinitions::default();
        assert!(!abilities.is_empty(), "Default ability set should not be empty");
        for ability in abilities.iter() {
            assert!(!ability.name.is_empty(), "{} should have a name", ability.id);
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = AbilityDefinitions::new(vec![test_ability("a"), test_ability("a")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut ability = test_ability("a");
        ability.energy_cost = -1.0;
        assert!(AbilityDefinitions::new(vec![ability]).is_err());
    }

    #[test]
    fn test_zero_duration_effect_rejected() {
        let mut ability = test_ability("a");
        ability.effects.push(EffectTemplate {
            kind: StatusEffectKind::Stun,
            duration: 0.0,
            intensity: 0.0,
        });
        assert!(AbilityDefinitions::new(vec![ability]).is_err());
    }

    #[test]
    fn test_supportive_classification() {
        let mut shield = test_ability("shield");
        shield.damage = None;
        shield.target_type = TargetType::Caster;
        shield.effects.push(EffectTemplate {
            kind: StatusEffectKind::DefenseBoost,
            duration: 5.0,
            intensity: 0.5,
        });

        assert!(shield.is_supportive());
        assert!(!test_ability("bolt").is_supportive());
    }

    #[test]
    fn test_parse_self_target_type() {
        let ron_text = r#"(
            abilities: [
                (
                    id: "repair",
                    name: "Field Repair",
                    energy_cost: 30.0,
                    cooldown_ms: 8000,
                    effects: [(kind: heal, duration: 4.0, intensity: 5.0)],
                    range: 0.0,
                    target_type: self,
                ),
            ],
        )"#;

        let abilities = AbilityDefinitions::from_ron(ron_text).expect("ability RON should parse");
        assert_eq!(abilities.get("repair").map(|a| a.target_type), Some(TargetType::Caster));
    }
}
