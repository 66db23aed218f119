//! Status Effect Definitions
//!
//! Pure data for timed buffs and debuffs. Behaviour (stacking, expiry,
//! periodic ticks) lives in the `status` module.

use serde::{Deserialize, Serialize};

use super::stats::CombatantId;

/// All status effect kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffectKind {
    /// Blocks attacks and ability use
    Stun,
    /// Scales movement and attack speed by `1 - intensity`
    Slow,
    /// Deals `intensity` damage per second
    DamageOverTime,
    /// Scales speed by `1 + intensity`
    SpeedBoost,
    /// Scales defense by `1 + intensity`
    DefenseBoost,
    /// Scales attack by `1 + intensity`
    AttackBoost,
    /// Restores `intensity` health per second
    Heal,
    /// Deals `intensity` damage per second
    Burn,
}

impl StatusEffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusEffectKind::Stun => "Stun",
            StatusEffectKind::Slow => "Slow",
            StatusEffectKind::DamageOverTime => "Damage Over Time",
            StatusEffectKind::SpeedBoost => "Speed Boost",
            StatusEffectKind::DefenseBoost => "Defense Boost",
            StatusEffectKind::AttackBoost => "Attack Boost",
            StatusEffectKind::Heal => "Heal",
            StatusEffectKind::Burn => "Burn",
        }
    }

    /// Effects that act once per second while active
    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            StatusEffectKind::DamageOverTime | StatusEffectKind::Burn | StatusEffectKind::Heal
        )
    }

    /// Whether the effect harms the combatant it is applied to
    pub fn is_harmful(&self) -> bool {
        matches!(
            self,
            StatusEffectKind::Stun
                | StatusEffectKind::Slow
                | StatusEffectKind::DamageOverTime
                | StatusEffectKind::Burn
        )
    }
}

/// Who caused an effect, a hit or a heal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Combatant(CombatantId),
    /// Environmental hazard (lava floor, electric fence, ...)
    Hazard(String),
}

impl Origin {
    /// The combatant responsible, if any
    pub fn combatant(&self) -> Option<&CombatantId> {
        match self {
            Origin::Combatant(id) => Some(id),
            Origin::Hazard(_) => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Origin::Combatant(id) => id.as_str(),
            Origin::Hazard(hazard) => hazard.as_str(),
        }
    }
}

/// Effect definition as written in ability configs.
///
/// Instantiated into a `StatusEffect` when the ability lands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub kind: StatusEffectKind,
    /// Duration in seconds
    pub duration: f32,
    /// Effect magnitude (meaning depends on kind)
    #[serde(default)]
    pub intensity: f32,
}

impl EffectTemplate {
    pub fn instantiate(&self, source: Origin) -> StatusEffect {
        StatusEffect::new(self.kind, self.duration, self.intensity, source)
    }
}

/// A live effect on a combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    /// Remaining duration in seconds. Only ever decreases.
    pub duration: f32,
    pub intensity: f32,
    pub source: Origin,
    /// Time accumulated towards the next periodic tick
    pub(crate) tick_progress: f32,
}

impl StatusEffect {
    pub fn new(kind: StatusEffectKind, duration: f32, intensity: f32, source: Origin) -> Self {
        Self {
            kind,
            duration,
            intensity,
            source,
            tick_progress: 0.0,
        }
    }
}
