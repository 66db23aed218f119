//! Combatant Stats
//!
//! Numeric attributes for a single combatant plus the identifiers used to
//! address combatants across the combat core.
//!
//! Health and energy are always kept inside `0..=max`. Only the resolver and
//! the energy ledger mutate these values once combat has started.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a combatant ("player", "enemy-1", ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CombatantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CombatantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which side a combatant fights for. Combatants of different factions are hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn is_hostile_to(&self, other: Faction) -> bool {
        *self != other
    }

    pub fn name(&self) -> &'static str {
        match self {
            Faction::Player => "Player",
            Faction::Enemy => "Enemy",
        }
    }
}

/// Numeric combat attributes. Missing fields deserialize to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantStats {
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub special_attack: Option<f32>,
    pub special_defense: Option<f32>,
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            energy: 100.0,
            max_energy: 100.0,
            attack: 20.0,
            defense: 10.0,
            speed: 5.0,
            special_attack: None,
            special_defense: None,
        }
    }
}

impl CombatantStats {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Health as a fraction of maximum (0.0 to 1.0)
    pub fn health_pct(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Energy as a fraction of maximum (0.0 to 1.0)
    pub fn energy_pct(&self) -> f32 {
        if self.max_energy > 0.0 {
            self.energy / self.max_energy
        } else {
            0.0
        }
    }

    /// Bring every value back inside its bounds.
    ///
    /// Used when stats come from outside (config files, callers of `initialize`).
    pub fn clamped(mut self) -> Self {
        self.max_health = self.max_health.max(0.0);
        self.max_energy = self.max_energy.max(0.0);
        self.health = self.health.clamp(0.0, self.max_health);
        self.energy = self.energy.clamp(0.0, self.max_energy);
        self.attack = self.attack.max(0.0);
        self.defense = self.defense.max(0.0);
        self.speed = self.speed.max(0.0);
        self
    }

    /// Subtract damage from health, clamping at zero. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0, "take_damage: amount cannot be negative, got {}", amount);
        let lost = amount.max(0.0).min(self.health);
        self.health -= lost;
        lost
    }

    /// Add health, clamping at maximum. Returns the health actually restored.
    pub fn restore_health(&mut self, amount: f32) -> f32 {
        let gained = amount.max(0.0).min(self.max_health - self.health);
        self.health += gained;
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_pulls_values_into_bounds() {
        let stats = CombatantStats {
            health: 150.0,
            energy: -5.0,
            defense: -1.0,
            ..Default::default()
        }
        .clamped();

        assert_eq!(stats.health, 100.0);
        assert_eq!(stats.energy, 0.0);
        assert_eq!(stats.defense, 0.0);
    }

    #[test]
    fn test_take_damage_never_goes_below_zero() {
        let mut stats = CombatantStats::default();
        let lost = stats.take_damage(250.0);

        assert_eq!(lost, 100.0, "Only the remaining health can be lost");
        assert_eq!(stats.health, 0.0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn test_restore_health_caps_at_max() {
        let mut stats = CombatantStats {
            health: 90.0,
            ..Default::default()
        };
        let gained = stats.restore_health(30.0);

        assert_eq!(gained, 10.0);
        assert_eq!(stats.health, 100.0);
    }

    #[test]
    fn test_health_pct_with_zero_max() {
        let stats = CombatantStats {
            health: 0.0,
            max_health: 0.0,
            ..Default::default()
        };
        assert_eq!(stats.health_pct(), 0.0);
    }

    #[test]
    fn test_factions_are_hostile_to_each_other() {
        assert!(Faction::Player.is_hostile_to(Faction::Enemy));
        assert!(!Faction::Enemy.is_hostile_to(Faction::Enemy));
    }
}
