//! Enemy Decision Module
//!
//! Each `EnemyAi` drives one combatant. On a fixed cadence it reads the match
//! through `CombatView` and returns the same `CombatAction`s a human input
//! layer would submit. It never mutates combat state.
//!
//! ## Behaviour
//! - Aggressive: close the distance (vehicle form when far away), melee when
//!   in range, and use offensive abilities with probability = difficulty
//! - Ranged: hold the 8-12 unit band and shoot
//! - Defensive: use a self-help ability if ready, retreat from anything inside
//!   8 units, and only swing back when the opponent is inside 4 units
//!
//! Targets are always the nearest living, targetable hostile.

pub mod behavior;

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::abilities::TargetType;
use crate::combat::action::CombatAction;
use crate::combat::combatant::CombatantState;
use crate::combat::constants::{
    DEFENSIVE_ATTACK_DISTANCE, MELEE_RANGE, PURSUIT_TRANSFORM_DISTANCE, RANGED_ATTACK_RANGE,
    RANGED_BAND_MAX, RANGED_BAND_MIN, RETREAT_DISTANCE,
};
use crate::combat::rng::GameRng;
use crate::combat::stats::CombatantId;
use crate::combat::view::CombatView;

pub use behavior::{decision_interval, Behavior};

/// Actions produced by a single decision. Rarely more than two.
pub type Decision = SmallVec<[CombatAction; 3]>;

/// Where melee fighters try to stand relative to their target
const MELEE_APPROACH_DISTANCE: f32 = MELEE_RANGE * 0.8;

#[derive(Clone, Debug)]
pub struct EnemyAi {
    pub id: CombatantId,
    difficulty: f32,
    interval: f32,
    since_last_decision: f32,
    behavior: Option<Behavior>,
    rng: GameRng,
}

impl EnemyAi {
    pub fn new(id: impl Into<CombatantId>, difficulty: f32, rng: GameRng) -> Self {
        let difficulty = difficulty.clamp(0.0, 1.0);
        let interval = decision_interval(difficulty);
        Self {
            id: id.into(),
            difficulty,
            interval,
            // First decision happens on the first update.
            since_last_decision: interval,
            behavior: None,
            rng,
        }
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Seconds between decisions
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Behaviour chosen at the last decision
    pub fn behavior(&self) -> Option<Behavior> {
        self.behavior
    }

    /// Advance the decision clock. Decides only when a full interval has passed.
    pub fn update(&mut self, dt: f32, view: &impl CombatView) -> Decision {
        self.since_last_decision += dt.max(0.0);
        if self.since_last_decision < self.interval {
            return Decision::new();
        }
        self.since_last_decision = 0.0;
        self.decide(view)
    }

    /// Make one decision right now.
    pub fn decide(&mut self, view: &impl CombatView) -> Decision {
        let mut decision = Decision::new();
        let Some(me) = view.participant(&self.id) else {
            return decision;
        };
        if !me.is_alive() {
            return decision;
        }
        let Some(target) = nearest_target(view, me) else {
            return decision;
        };

        let behavior = Behavior::classify(me.stats.health_pct());
        if self.behavior != Some(behavior) {
            debug!("{} switches to {} behaviour", self.id, behavior.name());
            self.behavior = Some(behavior);
        }

        let now = view.now_ms();
        match behavior {
            Behavior::Aggressive => self.aggressive(view, me, target, &mut decision),
            Behavior::Ranged => self.ranged(view, me, target, &mut decision),
            Behavior::Defensive => self.defensive(view, me, target, &mut decision),
        }

        for action in decision.iter_mut() {
            action.timestamp_ms = now;
        }
        decision
    }

    fn aggressive(
        &mut self,
        view: &impl CombatView,
        me: &CombatantState,
        target: &CombatantState,
        decision: &mut Decision,
    ) {
        let distance = me.distance_to(target);

        let wants_vehicle = distance > PURSUIT_TRANSFORM_DISTANCE;
        let wants_robot = distance <= MELEE_RANGE;
        if ((wants_vehicle && !me.is_transformed) || (wants_robot && me.is_transformed))
            && view.can_transform(&me.id)
        {
            decision.push(CombatAction::transform(me.id.clone()));
        }

        let can_fight = !me.effects.is_stunned();
        if can_fight && self.rng.chance(self.difficulty) {
            if let Some(ability_id) = self.pick_offensive_ability(view, me, distance) {
                decision.push(CombatAction::ability(
                    me.id.clone(),
                    ability_id,
                    Some(target.id.clone()),
                ));
                return;
            }
        }

        let mut distance_after = distance;
        if distance > MELEE_RANGE {
            if let Some(position) = self.step(me, target, MELEE_APPROACH_DISTANCE) {
                distance_after = position.distance(target.position);
                decision.push(move_towards(me, target, position));
            }
        }

        if can_fight && distance_after <= MELEE_RANGE && view.attack_ready(&me.id) {
            decision.push(CombatAction::attack(me.id.clone(), target.id.clone(), true));
        }
    }

    fn ranged(
        &mut self,
        view: &impl CombatView,
        me: &CombatantState,
        target: &CombatantState,
        decision: &mut Decision,
    ) {
        let distance = me.distance_to(target);
        let mut distance_after = distance;

        if !(RANGED_BAND_MIN..=RANGED_BAND_MAX).contains(&distance) {
            let middle = (RANGED_BAND_MIN + RANGED_BAND_MAX) / 2.0;
            if let Some(position) = self.step(me, target, middle) {
                distance_after = position.distance(target.position);
                decision.push(move_towards(me, target, position));
            }
        }

        if !me.effects.is_stunned()
            && distance_after <= RANGED_ATTACK_RANGE
            && view.attack_ready(&me.id)
        {
            decision.push(CombatAction::attack(me.id.clone(), target.id.clone(), false));
        }
    }

    fn defensive(
        &mut self,
        view: &impl CombatView,
        me: &CombatantState,
        target: &CombatantState,
        decision: &mut Decision,
    ) {
        let distance = me.distance_to(target);
        let can_fight = !me.effects.is_stunned();

        if can_fight {
            if let Some(ability_id) = self.pick_self_ability(view, me) {
                decision.push(CombatAction::ability(me.id.clone(), ability_id, None));
            }
        }

        // Swing first: the attack is range-checked before the retreat is applied.
        if can_fight && distance < DEFENSIVE_ATTACK_DISTANCE && view.attack_ready(&me.id) {
            decision.push(CombatAction::attack(me.id.clone(), target.id.clone(), true));
        }

        if distance < RETREAT_DISTANCE {
            if let Some(position) = self.step(me, target, RETREAT_DISTANCE) {
                decision.push(move_towards(me, target, position));
            }
        }
    }

    /// How far this combatant can travel in one decision interval
    fn step(&self, me: &CombatantState, target: &CombatantState, desired: f32) -> Option<Vec3> {
        let max_step = me.effective_speed() * self.interval;
        behavior::step_to_distance(me.position, target.position, desired, max_step)
    }

    fn pick_offensive_ability(
        &mut self,
        view: &impl CombatView,
        me: &CombatantState,
        distance: f32,
    ) -> Option<String> {
        let candidates: SmallVec<[&str; 4]> = me
            .abilities
            .iter()
            .map(String::as_str)
            .filter(|id| {
                view.ability(id).is_some_and(|ability| {
                    !ability.is_supportive()
                        && matches!(ability.target_type, TargetType::Enemy | TargetType::Area)
                        && distance <= ability.range
                })
            })
            .filter(|id| view.ability_ready(&me.id, id))
            .collect();

        if candidates.is_empty() {
            return None;
        }
        let index = ((self.rng.random_f32() * candidates.len() as f32) as usize).min(candidates.len() - 1);
        Some(candidates[index].to_string())
    }

    fn pick_self_ability(&self, view: &impl CombatView, me: &CombatantState) -> Option<String> {
        me.abilities
            .iter()
            .filter(|id| {
                view.ability(id)
                    .is_some_and(|a| a.target_type == TargetType::Caster && a.is_supportive())
            })
            .find(|id| view.ability_ready(&me.id, id))
            .cloned()
    }
}

/// Nearest living, targetable hostile by Euclidean distance
pub fn nearest_target<'a>(view: &'a impl CombatView, me: &CombatantState) -> Option<&'a CombatantState> {
    view.participants()
        .iter()
        .filter(|other| other.id != me.id && other.is_alive() && other.targetable && me.is_hostile_to(other))
        .min_by(|a, b| me.distance_to(a).total_cmp(&me.distance_to(b)))
}

fn move_towards(me: &CombatantState, target: &CombatantState, position: Vec3) -> CombatAction {
    let facing = (target.position - position).normalize_or_zero();
    CombatAction::movement(me.id.clone(), position, facing)
}

/// All AI controllers driven by the combat plugin
#[derive(Resource, Default, Debug)]
pub struct AiControllers(pub Vec<EnemyAi>);

impl AiControllers {
    pub fn push(&mut self, ai: EnemyAi) {
        self.0.push(ai);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Step every controller and collect what they want to do
    pub fn update(&mut self, dt: f32, view: &impl CombatView) -> Vec<CombatAction> {
        self.0
            .iter_mut()
            .flat_map(|ai| ai.update(dt, view))
            .collect()
    }
}
