//! Command Intents
//!
//! One-shot values describing what a combatant wants to do. Human input and
//! the enemy AI produce exactly the same shape. Each variant carries only the
//! fields it needs, so nothing is read optimistically out of a loose bag.

use bevy::prelude::*;

use super::effects::EffectTemplate;
use super::stats::CombatantId;

#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    /// Basic attack. Melee attacks have a shorter reach than ranged ones.
    Attack { target: CombatantId, melee: bool },
    /// Use an ability from the source's loadout. Self and area abilities take no target.
    Ability {
        ability_id: String,
        target: Option<CombatantId>,
    },
    /// Toggle between robot and vehicle form
    Transform,
    /// Place the combatant at a position facing `direction`
    Move { position: Vec3, direction: Vec3 },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Attack { .. } => "attack",
            ActionKind::Ability { .. } => "ability",
            ActionKind::Transform => "transform",
            ActionKind::Move { .. } => "move",
        }
    }

    /// Offensive actions are blocked by stuns
    pub fn is_offensive(&self) -> bool {
        matches!(self, ActionKind::Attack { .. } | ActionKind::Ability { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CombatAction {
    pub source: CombatantId,
    pub kind: ActionKind,
    /// Match time (ms) at which the intent was produced
    pub timestamp_ms: f64,
}

impl CombatAction {
    pub fn new(source: impl Into<CombatantId>, kind: ActionKind) -> Self {
        Self {
            source: source.into(),
            kind,
            timestamp_ms: 0.0,
        }
    }

    pub fn attack(
        source: impl Into<CombatantId>,
        target: impl Into<CombatantId>,
        melee: bool,
    ) -> Self {
        Self::new(
            source,
            ActionKind::Attack {
                target: target.into(),
                melee,
            },
        )
    }

    pub fn ability(
        source: impl Into<CombatantId>,
        ability_id: impl Into<String>,
        target: Option<CombatantId>,
    ) -> Self {
        Self::new(
            source,
            ActionKind::Ability {
                ability_id: ability_id.into(),
                target,
            },
        )
    }

    pub fn transform(source: impl Into<CombatantId>) -> Self {
        Self::new(source, ActionKind::Transform)
    }

    pub fn movement(source: impl Into<CombatantId>, position: Vec3, direction: Vec3) -> Self {
        Self::new(source, ActionKind::Move { position, direction })
    }

    pub fn at(mut self, timestamp_ms: f64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// Everything the resolver queues between updates.
#[derive(Clone, Debug)]
pub(crate) enum QueuedCommand {
    Action(CombatAction),
    Hazard {
        hazard_id: String,
        target: CombatantId,
        effect: EffectTemplate,
    },
    Remove(CombatantId),
}

/// Why a queued command was dropped. Only ever logged; never surfaced to callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionRejection {
    CombatNotActive,
    UnknownSource,
    UnknownTarget,
    MissingTarget,
    InvalidTarget,
    SourceDefeated,
    TargetDefeated,
    Stunned,
    UnknownAbility,
    AbilityNotOwned,
    OnCooldown,
    InsufficientEnergy,
    AttackNotReady,
    OutOfRange,
    TransformLocked,
    InvalidPosition,
}
