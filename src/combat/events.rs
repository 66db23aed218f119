//! Combat events
//!
//! Outbound notifications emitted by the resolver, in emission order.
//! Consumers (presentation, combat log, progression) treat them as
//! append-only; nothing queries back into the resolver from a handler.

use bevy::prelude::*;

use super::abilities::DamageType;
use super::effects::{Origin, StatusEffectKind};
use super::stats::CombatantId;

#[derive(Clone, Debug, PartialEq)]
pub enum CombatEventKind {
    /// Health lost by `target`
    Damage {
        source: Origin,
        target: CombatantId,
        amount: f32,
        position: Vec3,
        /// Ability that caused the damage (None for basic attacks and periodic ticks)
        ability_id: Option<String>,
        damage_type: Option<DamageType>,
        /// Periodic effect that ticked, if this came from one
        effect: Option<StatusEffectKind>,
    },
    /// Health restored to `target`
    Heal {
        source: Origin,
        target: CombatantId,
        amount: f32,
        position: Vec3,
    },
    /// A status effect landed
    Effect {
        source: Origin,
        target: CombatantId,
        effect: StatusEffectKind,
        duration: f32,
        intensity: f32,
        /// Whether an active effect of the same kind was overwritten
        replaced: bool,
    },
    Transform {
        source: CombatantId,
        /// True when entering vehicle form
        transformed: bool,
        position: Vec3,
    },
    Ability {
        source: CombatantId,
        target: Option<CombatantId>,
        ability_id: String,
        position: Vec3,
    },
    Moved {
        source: CombatantId,
        position: Vec3,
    },
    Victory {
        winner: CombatantId,
    },
    Defeat {
        loser: CombatantId,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CombatEvent {
    /// Match time in milliseconds
    pub timestamp_ms: f64,
    pub kind: CombatEventKind,
}

impl CombatEvent {
    pub fn new(timestamp_ms: f64, kind: CombatEventKind) -> Self {
        Self { timestamp_ms, kind }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            CombatEventKind::Damage { .. } => "damage",
            CombatEventKind::Heal { .. } => "heal",
            CombatEventKind::Effect { .. } => "effect",
            CombatEventKind::Transform { .. } => "transform",
            CombatEventKind::Ability { .. } => "ability",
            CombatEventKind::Moved { .. } => "moved",
            CombatEventKind::Victory { .. } => "victory",
            CombatEventKind::Defeat { .. } => "defeat",
        }
    }

    /// The combatant who acted, if the event has one
    pub fn actor(&self) -> Option<&CombatantId> {
        match &self.kind {
            CombatEventKind::Damage { source, .. }
            | CombatEventKind::Heal { source, .. }
            | CombatEventKind::Effect { source, .. } => source.combatant(),
            CombatEventKind::Transform { source, .. }
            | CombatEventKind::Ability { source, .. }
            | CombatEventKind::Moved { source, .. } => Some(source),
            CombatEventKind::Victory { winner } => Some(winner),
            CombatEventKind::Defeat { loser } => Some(loser),
        }
    }
}

/// Bevy event wrapper so systems can read the resolver's output with `EventReader`.
#[derive(Event, Clone, Debug)]
pub struct CombatEventMessage(pub CombatEvent);
