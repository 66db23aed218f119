//! Combat Resolver
//!
//! The single state machine that owns every combatant in a match.
//!
//! Lifecycle: `Inactive -> Active -> Ended`, and `initialize` starts a fresh
//! match from either `Inactive` or `Ended`.
//!
//! Each `update(dt)` runs, in order:
//! 1. Status effects tick (periodic damage/heal applied) and energy regenerates
//! 2. Queued commands are validated and applied, one event per applied action
//! 3. Termination is checked
//!
//! Commands are only ever queued by `submit_*`; nothing mutates combatants
//! outside `update`. Rejected commands are logged at debug level and dropped
//! without touching state or emitting events.

use bevy::prelude::*;
use std::collections::VecDeque;

use super::abilities::{AbilityDefinitions, AbilityInfo, DamageType, TargetType};
use super::action::{ActionKind, ActionRejection, CombatAction, QueuedCommand};
use super::combatant::{CombatantState, Participant};
use super::constants::{
    DAMAGE_RANDOM_MAX, DAMAGE_RANDOM_MIN, MELEE_RANGE, MIN_DAMAGE, RANGED_ATTACK_RANGE,
};
use super::effects::{EffectTemplate, Origin, StatusEffect, StatusEffectKind};
use super::events::{CombatEvent, CombatEventKind};
use super::ledger::EnergyLedger;
use super::rng::GameRng;
use super::stats::{CombatantId, Faction};
use crate::settings::CombatConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatPhase {
    Inactive,
    Active,
    Ended,
}

/// How a finished match ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every living combatant belongs to `faction`
    Victory {
        faction: Faction,
        survivors: Vec<CombatantId>,
    },
    /// Nobody survived (including simultaneous elimination)
    Draw,
}

impl MatchOutcome {
    pub fn winning_faction(&self) -> Option<Faction> {
        match self {
            MatchOutcome::Victory { faction, .. } => Some(*faction),
            MatchOutcome::Draw => None,
        }
    }

    pub fn is_winner(&self, id: &CombatantId) -> bool {
        match self {
            MatchOutcome::Victory { survivors, .. } => survivors.contains(id),
            MatchOutcome::Draw => false,
        }
    }
}

/// Basic attack damage: `max(1, attack - defense) * U[0.8, 1.2)`, rounded, never below 1.
pub fn compute_damage(attack: f32, defense: f32, rng: &mut GameRng) -> f32 {
    let base = (attack - defense).max(MIN_DAMAGE);
    let factor = rng.random_range(DAMAGE_RANDOM_MIN, DAMAGE_RANDOM_MAX);
    (base * factor).round().max(MIN_DAMAGE)
}

#[derive(Resource)]
pub struct CombatResolver {
    phase: CombatPhase,
    energy: EnergyLedger,
    attack_cooldown_ms: f64,
    transform_cooldown_ms: f64,
    abilities: AbilityDefinitions,
    /// Kept in insertion order so iteration (and therefore RNG use) is stable
    combatants: Vec<CombatantState>,
    queue: VecDeque<QueuedCommand>,
    events: Vec<CombatEvent>,
    clock_ms: f64,
    rng: GameRng,
    outcome: Option<MatchOutcome>,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(&CombatConfig::default(), AbilityDefinitions::default(), GameRng::default())
    }
}

impl CombatResolver {
    pub fn new(config: &CombatConfig, abilities: AbilityDefinitions, rng: GameRng) -> Self {
        Self {
            phase: CombatPhase::Inactive,
            energy: EnergyLedger::new(config.energy_regen_rate_per_second),
            attack_cooldown_ms: f64::from(config.attack_cooldown_ms),
            transform_cooldown_ms: f64::from(config.transform_cooldown_ms),
            abilities,
            combatants: Vec::new(),
            queue: VecDeque::new(),
            events: Vec::new(),
            clock_ms: 0.0,
            rng,
            outcome: None,
        }
    }

    /// Default config and abilities with a deterministic RNG
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            &CombatConfig::default(),
            AbilityDefinitions::default(),
            GameRng::from_seed(seed),
        )
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a new match with exactly these participants.
    ///
    /// Everything from a previous match (combatants, cooldowns, effects,
    /// queued commands, undrained events, the clock) is discarded. A repeated
    /// id replaces the earlier entry.
    pub fn initialize(&mut self, participants: impl IntoIterator<Item = Participant>) {
        self.combatants.clear();
        self.queue.clear();
        self.events.clear();
        self.clock_ms = 0.0;
        self.outcome = None;

        for participant in participants {
            let state = CombatantState::from_participant(participant);
            match self.combatants.iter_mut().find(|c| c.id == state.id) {
                Some(existing) => {
                    warn!("Participant '{}' listed twice; keeping the later entry", state.id);
                    *existing = state;
                }
                None => self.combatants.push(state),
            }
        }

        self.phase = CombatPhase::Active;
        info!("Combat started with {} participants", self.combatants.len());
    }

    /// Queue an action for the next `update`
    pub fn submit_action(&mut self, action: CombatAction) {
        if self.phase != CombatPhase::Active {
            log_rejection(&action.source, action.kind.name(), &ActionRejection::CombatNotActive);
            return;
        }
        self.queue.push_back(QueuedCommand::Action(action));
    }

    /// Queue an environmental effect on `target`
    pub fn submit_hazard(
        &mut self,
        hazard_id: impl Into<String>,
        target: impl Into<CombatantId>,
        effect: EffectTemplate,
    ) {
        let target = target.into();
        if self.phase != CombatPhase::Active {
            log_rejection(&target, "hazard", &ActionRejection::CombatNotActive);
            return;
        }
        self.queue.push_back(QueuedCommand::Hazard {
            hazard_id: hazard_id.into(),
            target,
            effect,
        });
    }

    /// Queue removal of a participant; it disappears on the next `update`
    pub fn remove_participant(&mut self, id: impl Into<CombatantId>) {
        let id = id.into();
        if self.phase != CombatPhase::Active {
            log_rejection(&id, "remove", &ActionRejection::CombatNotActive);
            return;
        }
        self.queue.push_back(QueuedCommand::Remove(id));
    }

    /// Advance the match by `dt` seconds. Never fails.
    pub fn update(&mut self, dt: f32) {
        if self.phase != CombatPhase::Active {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock_ms += f64::from(dt) * 1000.0;

        self.tick_combatants(dt);

        let commands: Vec<QueuedCommand> = self.queue.drain(..).collect();
        for command in commands {
            let (actor, label) = command_label(&command);
            if let Err(rejection) = self.apply_command(command) {
                log_rejection(&actor, label, &rejection);
            }
        }

        self.check_termination();
    }

    /// Take every event emitted since the last drain, in emission order
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CombatPhase::Active
    }

    /// Set once the match has ended
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    /// Match clock in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn participant(&self, id: &CombatantId) -> Option<&CombatantState> {
        self.combatants.iter().find(|c| &c.id == id)
    }

    pub fn participants(&self) -> &[CombatantState] {
        &self.combatants
    }

    pub fn ability(&self, ability_id: &str) -> Option<&AbilityInfo> {
        self.abilities.get(ability_id)
    }

    pub fn abilities(&self) -> &AbilityDefinitions {
        &self.abilities
    }

    pub fn can_afford(&self, id: &CombatantId, cost: f32) -> bool {
        self.participant(id)
            .is_some_and(|c| self.energy.can_afford(&c.stats, cost))
    }

    pub fn is_on_cooldown(&self, id: &CombatantId, ability_id: &str) -> bool {
        self.participant(id)
            .is_some_and(|c| c.cooldowns.is_on_cooldown(ability_id, self.clock_ms))
    }

    /// Active effects on a combatant (empty for unknown ids)
    pub fn active_effects(&self, id: &CombatantId) -> &[StatusEffect] {
        self.participant(id)
            .map(|c| c.active_effects())
            .unwrap_or(&[])
    }

    pub fn has_restriction(&self, id: &CombatantId, kind: StatusEffectKind) -> bool {
        self.participant(id)
            .is_some_and(|c| c.effects.has_restriction(kind))
    }

    /// Basic attack cooldown for a combatant, after slows
    pub fn attack_cooldown_ms(&self, id: &CombatantId) -> f64 {
        let slow = self
            .participant(id)
            .map(|c| c.effects.slow_factor())
            .unwrap_or(1.0);
        self.attack_cooldown_ms / f64::from(slow)
    }

    /// Whether a transform would be accepted right now
    pub fn can_transform(&self, id: &CombatantId) -> bool {
        self.participant(id)
            .is_some_and(|c| self.transform_unlocked(c))
    }

    /// Commands waiting for the next update
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    // ========================================================================
    // Step 1: effects and energy
    // ========================================================================

    fn tick_combatants(&mut self, dt: f32) {
        let now = self.clock_ms;
        for combatant in self.combatants.iter_mut().filter(|c| c.is_alive()) {
            let outcome = combatant.effects.tick(dt);

            for tick in outcome.periodic {
                if !combatant.is_alive() {
                    break;
                }
                match tick.kind {
                    StatusEffectKind::Heal => {
                        let gained = combatant.stats.restore_health(tick.amount);
                        self.events.push(CombatEvent::new(
                            now,
                            CombatEventKind::Heal {
                                source: tick.source,
                                target: combatant.id.clone(),
                                amount: gained,
                                position: combatant.position,
                            },
                        ));
                    }
                    kind => {
                        let lost = combatant.stats.take_damage(tick.amount);
                        let damage_type = (kind == StatusEffectKind::Burn).then_some(DamageType::Fire);
                        self.events.push(CombatEvent::new(
                            now,
                            CombatEventKind::Damage {
                                source: tick.source,
                                target: combatant.id.clone(),
                                amount: lost,
                                position: combatant.position,
                                ability_id: None,
                                damage_type,
                                effect: Some(kind),
                            },
                        ));
                    }
                }
            }

            if combatant.is_alive() {
                self.energy.regenerate(&mut combatant.stats, dt);
            }
        }
    }

    // ========================================================================
    // Step 2: commands
    // ========================================================================

    fn index_of(&self, id: &CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| &c.id == id)
    }

    fn transform_unlocked(&self, combatant: &CombatantState) -> bool {
        combatant
            .last_transform_time()
            .map_or(true, |last| self.clock_ms - last >= self.transform_cooldown_ms)
    }

    fn emit(&mut self, kind: CombatEventKind) {
        self.events.push(CombatEvent::new(self.clock_ms, kind));
    }

    fn apply_command(&mut self, command: QueuedCommand) -> Result<(), ActionRejection> {
        match command {
            QueuedCommand::Action(action) => self.apply_action(action),
            QueuedCommand::Hazard {
                hazard_id,
                target,
                effect,
            } => self.apply_hazard(hazard_id, &target, &effect),
            QueuedCommand::Remove(id) => {
                let index = self.index_of(&id).ok_or(ActionRejection::UnknownTarget)?;
                self.combatants.remove(index);
                info!("Removed participant '{}' from combat", id);
                Ok(())
            }
        }
    }

    fn apply_action(&mut self, action: CombatAction) -> Result<(), ActionRejection> {
        let source = self
            .index_of(&action.source)
            .ok_or(ActionRejection::UnknownSource)?;
        if !self.combatants[source].is_alive() {
            return Err(ActionRejection::SourceDefeated);
        }
        if action.kind.is_offensive() && self.combatants[source].effects.is_stunned() {
            return Err(ActionRejection::Stunned);
        }

        match action.kind {
            ActionKind::Attack { target, melee } => self.apply_attack(source, &target, melee),
            ActionKind::Ability { ability_id, target } => {
                self.apply_ability(source, &ability_id, target.as_ref())
            }
            ActionKind::Transform => self.apply_transform(source),
            ActionKind::Move {
                position,
                direction,
            } => self.apply_move(source, position, direction),
        }
    }

    /// Resolve a single hostile, living target for `source`
    fn hostile_target(&self, source: usize, target: &CombatantId) -> Result<usize, ActionRejection> {
        let index = self.index_of(target).ok_or(ActionRejection::UnknownTarget)?;
        let (attacker, defender) = (&self.combatants[source], &self.combatants[index]);
        if index == source || !attacker.is_hostile_to(defender) {
            return Err(ActionRejection::InvalidTarget);
        }
        if !defender.is_alive() {
            return Err(ActionRejection::TargetDefeated);
        }
        Ok(index)
    }

    fn apply_attack(
        &mut self,
        source: usize,
        target: &CombatantId,
        melee: bool,
    ) -> Result<(), ActionRejection> {
        let target = self.hostile_target(source, target)?;

        let attacker = &self.combatants[source];
        let cooldown = self.attack_cooldown_ms / f64::from(attacker.effects.slow_factor());
        if !attacker.cooldowns.attack_ready(self.clock_ms, cooldown) {
            return Err(ActionRejection::AttackNotReady);
        }
        let reach = if melee { MELEE_RANGE } else { RANGED_ATTACK_RANGE };
        if attacker.distance_to(&self.combatants[target]) > reach {
            return Err(ActionRejection::OutOfRange);
        }

        let damage = compute_damage(
            attacker.effective_attack(),
            self.combatants[target].effective_defense(),
            &mut self.rng,
        );

        let now = self.clock_ms;
        let source_id = self.combatants[source].id.clone();
        self.combatants[source].cooldowns.record_attack(now);

        let defender = &mut self.combatants[target];
        let lost = defender.stats.take_damage(damage);
        let (target_id, position) = (defender.id.clone(), defender.position);

        self.emit(CombatEventKind::Damage {
            source: Origin::Combatant(source_id),
            target: target_id,
            amount: lost,
            position,
            ability_id: None,
            damage_type: Some(DamageType::Physical),
            effect: None,
        });
        Ok(())
    }

    fn apply_ability(
        &mut self,
        source: usize,
        ability_id: &str,
        target: Option<&CombatantId>,
    ) -> Result<(), ActionRejection> {
        let ability = self
            .abilities
            .get(ability_id)
            .cloned()
            .ok_or(ActionRejection::UnknownAbility)?;

        let caster = &self.combatants[source];
        if !caster.knows_ability(ability_id) {
            return Err(ActionRejection::AbilityNotOwned);
        }
        if caster.cooldowns.is_on_cooldown(ability_id, self.clock_ms) {
            return Err(ActionRejection::OnCooldown);
        }
        if !self.energy.can_afford(&caster.stats, ability.energy_cost) {
            return Err(ActionRejection::InsufficientEnergy);
        }

        let (targets, primary_target) = match ability.target_type {
            TargetType::Caster => (vec![source], Some(caster.id.clone())),
            TargetType::Enemy => {
                let target_id = target.ok_or(ActionRejection::MissingTarget)?;
                let index = self.hostile_target(source, target_id)?;
                if caster.distance_to(&self.combatants[index]) > ability.range {
                    return Err(ActionRejection::OutOfRange);
                }
                (vec![index], Some(target_id.clone()))
            }
            TargetType::Area => {
                let hit = self
                    .combatants
                    .iter()
                    .enumerate()
                    .filter(|(_, other)| {
                        other.is_alive()
                            && caster.is_hostile_to(other)
                            && caster.distance_to(other) <= ability.range
                    })
                    .map(|(index, _)| index)
                    .collect();
                (hit, None)
            }
        };

        let now = self.clock_ms;
        let caster = &mut self.combatants[source];
        if !self.energy.spend(&mut caster.stats, ability.energy_cost) {
            return Err(ActionRejection::InsufficientEnergy);
        }
        caster.cooldowns.start_cooldown(ability_id, now, ability.cooldown_ms);
        let (caster_id, caster_position) = (caster.id.clone(), caster.position);

        self.emit(CombatEventKind::Ability {
            source: caster_id.clone(),
            target: primary_target,
            ability_id: ability.id.clone(),
            position: caster_position,
        });

        let origin = Origin::Combatant(caster_id);
        for index in targets {
            self.land_ability(&ability, &origin, index);
        }
        Ok(())
    }

    /// Direct damage (raw, ignoring defense) then status effects on one target
    fn land_ability(&mut self, ability: &AbilityInfo, origin: &Origin, index: usize) {
        let now = self.clock_ms;
        let target = &mut self.combatants[index];
        let (target_id, position) = (target.id.clone(), target.position);
        let mut emitted = Vec::new();

        if let Some(damage) = ability.damage.filter(|d| *d > 0.0) {
            let lost = target.stats.take_damage(damage);
            emitted.push(CombatEventKind::Damage {
                source: origin.clone(),
                target: target_id.clone(),
                amount: lost,
                position,
                ability_id: Some(ability.id.clone()),
                damage_type: ability.damage_type,
                effect: None,
            });
        }

        if target.is_alive() {
            for template in &ability.effects {
                let replaced = target.effects.apply(template.instantiate(origin.clone()));
                emitted.push(CombatEventKind::Effect {
                    source: origin.clone(),
                    target: target_id.clone(),
                    effect: template.kind,
                    duration: template.duration,
                    intensity: template.intensity,
                    replaced: replaced.is_some(),
                });
            }
        }

        self.events
            .extend(emitted.into_iter().map(|kind| CombatEvent::new(now, kind)));
    }

    fn apply_transform(&mut self, source: usize) -> Result<(), ActionRejection> {
        if !self.transform_unlocked(&self.combatants[source]) {
            return Err(ActionRejection::TransformLocked);
        }

        let now = self.clock_ms;
        let combatant = &mut self.combatants[source];
        let transformed = combatant.toggle_form(now);
        let (id, position) = (combatant.id.clone(), combatant.position);

        self.emit(CombatEventKind::Transform {
            source: id,
            transformed,
            position,
        });
        Ok(())
    }

    fn apply_move(
        &mut self,
        source: usize,
        position: Vec3,
        direction: Vec3,
    ) -> Result<(), ActionRejection> {
        if !position.is_finite() {
            return Err(ActionRejection::InvalidPosition);
        }

        let combatant = &mut self.combatants[source];
        combatant.position = position;
        if direction.is_finite() && direction.length_squared() > f32::EPSILON {
            combatant.rotation = direction.normalize();
        }
        let id = combatant.id.clone();

        self.emit(CombatEventKind::Moved { source: id, position });
        Ok(())
    }

    fn apply_hazard(
        &mut self,
        hazard_id: String,
        target: &CombatantId,
        template: &EffectTemplate,
    ) -> Result<(), ActionRejection> {
        let index = self.index_of(target).ok_or(ActionRejection::UnknownTarget)?;
        if !self.combatants[index].is_alive() {
            return Err(ActionRejection::TargetDefeated);
        }
        if template.duration <= 0.0 {
            return Ok(());
        }

        let source = Origin::Hazard(hazard_id);
        let replaced = self.combatants[index]
            .effects
            .apply(template.instantiate(source.clone()));

        self.emit(CombatEventKind::Effect {
            source,
            target: target.clone(),
            effect: template.kind,
            duration: template.duration,
            intensity: template.intensity,
            replaced: replaced.is_some(),
        });
        Ok(())
    }

    // ========================================================================
    // Step 3: termination
    // ========================================================================

    /// The match ends once every living combatant belongs to one faction, so
    /// several allied survivors end it just like a lone one. Nobody alive is a draw.
    fn check_termination(&mut self) {
        let survivors: Vec<&CombatantState> =
            self.combatants.iter().filter(|c| c.is_alive()).collect();

        let decided = match survivors.first() {
            None => true,
            Some(first) => survivors.iter().all(|c| c.faction == first.faction),
        };
        if !decided {
            return;
        }

        let outcome = match survivors.first() {
            Some(first) => MatchOutcome::Victory {
                faction: first.faction,
                survivors: survivors.iter().map(|c| c.id.clone()).collect(),
            },
            None => MatchOutcome::Draw,
        };

        if let MatchOutcome::Victory { survivors, .. } = &outcome {
            for winner in survivors.clone() {
                self.emit(CombatEventKind::Victory { winner });
            }
            let fallen: Vec<CombatantId> = self
                .combatants
                .iter()
                .filter(|c| !c.is_alive())
                .map(|c| c.id.clone())
                .collect();
            for loser in fallen {
                self.emit(CombatEventKind::Defeat { loser });
            }
        }

        match &outcome {
            MatchOutcome::Victory { faction, survivors } => info!(
                "Combat ended at {:.1}s: {} wins ({})",
                self.clock_ms / 1000.0,
                faction.name(),
                survivors
                    .iter()
                    .map(CombatantId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            MatchOutcome::Draw => info!(
                "Combat ended at {:.1}s: no survivors",
                self.clock_ms / 1000.0
            ),
        }

        self.phase = CombatPhase::Ended;
        self.outcome = Some(outcome);
        self.queue.clear();
    }
}

fn command_label(command: &QueuedCommand) -> (CombatantId, &'static str) {
    match command {
        QueuedCommand::Action(action) => (action.source.clone(), action.kind.name()),
        QueuedCommand::Hazard { target, .. } => (target.clone(), "hazard"),
        QueuedCommand::Remove(id) => (id.clone(), "remove"),
    }
}

fn log_rejection(actor: &CombatantId, command: &str, rejection: &ActionRejection) {
    debug!("Dropped {} from '{}': {:?}", command, actor, rejection);
}
