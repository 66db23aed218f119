//! Combat system
//!
//! Implements the combat core:
//! - Combatant stats, status effects and ability definitions (pure data)
//! - Status effect tracking, energy and cooldown ledgers
//! - The `CombatResolver` state machine and its read-only `CombatView`
//! - Combat logging
//!
//! `CombatPlugin` hosts the resolver inside a bevy `App`: AI controllers
//! submit actions, the resolver is stepped once per frame, and every event it
//! emits is re-published as a `CombatEventMessage`.

use bevy::prelude::*;

pub mod abilities;
pub mod action;
pub mod combatant;
pub mod constants;
pub mod effects;
pub mod events;
pub mod ledger;
pub mod log;
pub mod resolver;
pub mod rng;
pub mod stats;
pub mod status;
pub mod view;

use crate::ai::AiControllers;
use crate::settings::CombatConfig;
use events::CombatEventMessage;
use log::CombatLog;
use resolver::CombatResolver;
use rng::GameRng;

/// System ordering inside `Update`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSystemPhase {
    /// AI controllers decide and submit actions
    Decisions,
    /// The resolver steps and publishes its events
    Resolution,
    /// Consumers of `CombatEventMessage` (log, progression)
    Consumers,
}

/// Plugin for the combat system.
///
/// Uses a `CombatConfig` or `GameRng` resource if one was inserted before the
/// plugin; otherwise defaults and an entropy-seeded RNG.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<CombatConfig>()
            .cloned()
            .unwrap_or_default();
        let rng = app
            .world_mut()
            .get_resource_mut::<GameRng>()
            .map(|mut rng| rng.fork())
            .unwrap_or_default();

        if !app.world().contains_resource::<CombatResolver>() {
            app.insert_resource(CombatResolver::new(&config, config.ability_definitions(), rng));
        }

        app.add_event::<CombatEventMessage>()
            .insert_resource(config)
            .init_resource::<CombatLog>()
            .init_resource::<SimulationSpeed>()
            .init_resource::<AiControllers>()
            .configure_sets(
                Update,
                (
                    CombatSystemPhase::Decisions,
                    CombatSystemPhase::Resolution,
                    CombatSystemPhase::Consumers,
                )
                    .chain(),
            )
            .add_systems(Update, drive_ai_controllers.in_set(CombatSystemPhase::Decisions))
            .add_systems(Update, step_combat.in_set(CombatSystemPhase::Resolution))
            .add_systems(Update, record_combat_log.in_set(CombatSystemPhase::Consumers));
    }
}

/// Controls the speed of the combat simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }

    /// Frame time scaled by the multiplier
    pub fn scale(&self, dt: f32) -> f32 {
        dt * self.multiplier.max(0.0)
    }
}

fn drive_ai_controllers(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut controllers: ResMut<AiControllers>,
    mut resolver: ResMut<CombatResolver>,
) {
    if !resolver.is_active() || speed.is_paused() {
        return;
    }
    let actions = controllers.update(speed.scale(time.delta_secs()), &*resolver);
    for action in actions {
        resolver.submit_action(action);
    }
}

fn step_combat(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    mut resolver: ResMut<CombatResolver>,
    mut events: EventWriter<CombatEventMessage>,
) {
    if !resolver.is_active() {
        return;
    }
    resolver.update(speed.scale(time.delta_secs()));
    for event in resolver.drain_events() {
        events.send(CombatEventMessage(event));
    }
}

fn record_combat_log(mut events: EventReader<CombatEventMessage>, mut combat_log: ResMut<CombatLog>) {
    for CombatEventMessage(event) in events.read() {
        combat_log.record(event);
    }
}
