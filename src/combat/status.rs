//! Status Effect Tracker
//!
//! Per-combatant collection of active timed effects.
//!
//! Rules:
//! - One instance per kind. Applying a kind that is already active replaces it.
//! - `tick` decrements every duration and removes anything at or below zero in
//!   the same call, so `active_effects` never reports an expired effect.
//! - Periodic kinds (damage over time, burn, heal) fire once per full second of
//!   lifetime, including a final tick on the frame they expire.
//!
//! The tracker never touches stats. Slow, boosts and stuns are read by the
//! resolver and the AI at the call site.

use smallvec::SmallVec;

use super::effects::{Origin, StatusEffect, StatusEffectKind};

/// Float slack when deciding whether a full second has elapsed.
const PERIODIC_TICK_EPSILON: f32 = 1e-4;

/// Slow intensity above this is treated as this (never a full stop).
pub const MAX_SLOW_INTENSITY: f32 = 0.9;

/// One periodic application produced by `tick`.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicTick {
    pub kind: StatusEffectKind,
    pub amount: f32,
    pub source: Origin,
}

/// Everything that happened during one `tick`.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub periodic: SmallVec<[PeriodicTick; 2]>,
    pub expired: SmallVec<[StatusEffectKind; 2]>,
}

#[derive(Clone, Debug, Default)]
pub struct StatusEffectTracker {
    effects: SmallVec<[StatusEffect; 4]>,
}

impl StatusEffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect, replacing any active effect of the same kind.
    ///
    /// Returns the replaced instance. Effects with a non-positive duration are
    /// already expired and are ignored.
    pub fn apply(&mut self, effect: StatusEffect) -> Option<StatusEffect> {
        if effect.duration <= 0.0 {
            return None;
        }

        match self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            Some(existing) => Some(std::mem::replace(existing, effect)),
            None => {
                self.effects.push(effect);
                None
            }
        }
    }

    /// Advance all effects by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if dt <= 0.0 {
            return outcome;
        }

        for effect in self.effects.iter_mut() {
            if effect.kind.is_periodic() {
                effect.tick_progress += dt.min(effect.duration);
                while effect.tick_progress >= 1.0 - PERIODIC_TICK_EPSILON {
                    effect.tick_progress -= 1.0;
                    outcome.periodic.push(PeriodicTick {
                        kind: effect.kind,
                        amount: effect.intensity,
                        source: effect.source.clone(),
                    });
                }
            }
            effect.duration -= dt;
        }

        self.effects.retain(|effect| {
            if effect.duration <= 0.0 {
                outcome.expired.push(effect.kind);
                false
            } else {
                true
            }
        });

        outcome
    }

    pub fn active_effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Whether an effect of this kind is currently active
    pub fn has_restriction(&self, kind: StatusEffectKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn is_stunned(&self) -> bool {
        self.has_restriction(StatusEffectKind::Stun)
    }

    /// `1 - slow intensity`, or 1.0 when not slowed
    pub fn slow_factor(&self) -> f32 {
        self.get(StatusEffectKind::Slow)
            .map(|slow| 1.0 - slow.intensity.clamp(0.0, MAX_SLOW_INTENSITY))
            .unwrap_or(1.0)
    }

    /// `1 + boost intensity` for a boost kind, or 1.0 when not active
    pub fn boost_factor(&self, kind: StatusEffectKind) -> f32 {
        self.get(kind)
            .map(|boost| 1.0 + boost.intensity.max(0.0))
            .unwrap_or(1.0)
    }

    pub fn remove(&mut self, kind: StatusEffectKind) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(index))
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
