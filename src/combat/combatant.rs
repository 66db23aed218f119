//! Combatant State
//!
//! One `CombatantState` per participant id, owned by the resolver. Outside
//! the resolver it is only ever handed out by shared reference.

use bevy::prelude::*;

use super::constants::{VEHICLE_DEFENSE_MULTIPLIER, VEHICLE_SPEED_MULTIPLIER};
use super::effects::{StatusEffect, StatusEffectKind};
use super::ledger::CooldownLedger;
use super::stats::{CombatantId, CombatantStats, Faction};
use super::status::StatusEffectTracker;

/// Everything needed to put a combatant into a match.
#[derive(Clone, Debug)]
pub struct Participant {
    pub id: CombatantId,
    pub faction: Faction,
    pub position: Vec3,
    pub rotation: Vec3,
    pub stats: CombatantStats,
    /// Ability ids this combatant may use
    pub abilities: Vec<String>,
    /// Whether AIs may pick this combatant as a target
    pub targetable: bool,
}

impl Participant {
    pub fn new(id: impl Into<CombatantId>, faction: Faction, stats: CombatantStats) -> Self {
        Self {
            id: id.into(),
            faction,
            position: Vec3::ZERO,
            rotation: Vec3::Z,
            stats,
            abilities: Vec::new(),
            targetable: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_abilities<I, S>(mut self, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.abilities = abilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn untargetable(mut self) -> Self {
        self.targetable = false;
        self
    }
}

/// Robot-form values saved while in vehicle form.
///
/// Restoring copies these back instead of dividing, so any number of
/// transform cycles returns exactly the original stats.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RobotForm {
    speed: f32,
    defense: f32,
}

#[derive(Clone, Debug)]
pub struct CombatantState {
    pub id: CombatantId,
    pub faction: Faction,
    /// Mirrored from the presentation layer for range checks
    pub position: Vec3,
    pub rotation: Vec3,
    pub stats: CombatantStats,
    pub effects: StatusEffectTracker,
    pub cooldowns: CooldownLedger,
    pub abilities: Vec<String>,
    pub is_transformed: bool,
    pub targetable: bool,
    robot_form: Option<RobotForm>,
    last_transform_ms: Option<f64>,
}

impl CombatantState {
    pub fn from_participant(participant: Participant) -> Self {
        Self {
            id: participant.id,
            faction: participant.faction,
            position: participant.position,
            rotation: participant.rotation,
            stats: participant.stats.clamped(),
            effects: StatusEffectTracker::new(),
            cooldowns: CooldownLedger::new(),
            abilities: participant.abilities,
            is_transformed: false,
            targetable: participant.targetable,
            robot_form: None,
            last_transform_ms: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    pub fn is_hostile_to(&self, other: &CombatantState) -> bool {
        self.faction.is_hostile_to(other.faction)
    }

    pub fn distance_to(&self, other: &CombatantState) -> f32 {
        self.position.distance(other.position)
    }

    pub fn knows_ability(&self, ability_id: &str) -> bool {
        self.abilities.iter().any(|a| a == ability_id)
    }

    pub fn active_effects(&self) -> &[StatusEffect] {
        self.effects.active_effects()
    }

    pub fn last_attack_time(&self) -> Option<f64> {
        self.cooldowns.last_attack_ms()
    }

    pub fn last_transform_time(&self) -> Option<f64> {
        self.last_transform_ms
    }

    /// Attack after boosts
    pub fn effective_attack(&self) -> f32 {
        self.stats.attack * self.effects.boost_factor(StatusEffectKind::AttackBoost)
    }

    /// Defense after boosts
    pub fn effective_defense(&self) -> f32 {
        self.stats.defense * self.effects.boost_factor(StatusEffectKind::DefenseBoost)
    }

    /// Movement speed after boosts and slows
    pub fn effective_speed(&self) -> f32 {
        self.stats.speed
            * self.effects.boost_factor(StatusEffectKind::SpeedBoost)
            * self.effects.slow_factor()
    }

    /// Toggle robot/vehicle form. Returns the new `is_transformed` value.
    pub(crate) fn toggle_form(&mut self, now_ms: f64) -> bool {
        match self.robot_form.take() {
            Some(robot) => {
                self.stats.speed = robot.speed;
                self.stats.defense = robot.defense;
                self.is_transformed = false;
            }
            None => {
                self.robot_form = Some(RobotForm {
                    speed: self.stats.speed,
                    defense: self.stats.defense,
                });
                self.stats.speed *= VEHICLE_SPEED_MULTIPLIER;
                self.stats.defense *= VEHICLE_DEFENSE_MULTIPLIER;
                self.is_transformed = true;
            }
        }
        self.last_transform_ms = Some(now_ms);
        self.is_transformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_state() -> CombatantState {
        CombatantState::from_participant(Participant::new(
            "robo",
            Faction::Player,
            CombatantStats {
                speed: 6.0,
                defense: 13.0,
                ..Default::default()
            },
        ))
    }

    #[test]
    fn test_vehicle_form_multipliers() {
        let mut state = create_test_state();

        assert!(state.toggle_form(0.0));
        assert!((state.stats.speed - 9.0).abs() < 1e-6);
        assert!((state.stats.defense - 9.1).abs() < 1e-5);
    }

    #[test]
    fn test_repeated_transform_cycles_restore_exact_values() {
        let mut state = create_test_state();

        for i in 0..25 {
            state.toggle_form(i as f64 * 2000.0);
            state.toggle_form(i as f64 * 2000.0 + 1000.0);
        }

        assert!(!state.is_transformed);
        assert_eq!(state.stats.speed, 6.0, "Speed must not drift across cycles");
        assert_eq!(state.stats.defense, 13.0, "Defense must not drift across cycles");
    }

    #[test]
    fn test_effective_stats_apply_boosts_and_slow() {
        use crate::combat::effects::Origin;

        let mut state = create_test_state();
        let source = Origin::Combatant(CombatantId::from("ally"));
        state.effects.apply(StatusEffect::new(StatusEffectKind::AttackBoost, 5.0, 0.5, source.clone()));
        state.effects.apply(StatusEffect::new(StatusEffectKind::Slow, 5.0, 0.5, source));

        assert!((state.effective_attack() - 30.0).abs() < 1e-5);
        assert!((state.effective_speed() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_participant_stats_are_clamped() {
        let state = CombatantState::from_participant(Participant::new(
            "over",
            Faction::Enemy,
            CombatantStats {
                health: 500.0,
                ..Default::default()
            },
        ));
        assert_eq!(state.stats.health, state.stats.max_health);
    }
}
