//! Progression system
//!
//! Statistics, achievements, levels and their persistence for one tracked
//! combatant. `ProgressionPlugin` feeds the ledger from `CombatEventMessage`s
//! after combat has resolved, and saves on a timer or on request through the
//! bevy `IoTaskPool` so storage never blocks a frame.

pub mod achievements;
pub mod ledger;
pub mod snapshot;

use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, IoTaskPool, Task, TaskPool};
use std::path::PathBuf;
use std::sync::Arc;

use crate::combat::events::CombatEventMessage;
use crate::combat::resolver::{CombatResolver, MatchOutcome};
use crate::combat::stats::CombatantId;
use crate::combat::CombatSystemPhase;
use crate::settings::CombatConfig;

pub use ledger::{BattleResult, CombatStatistics, ProgressionLedger, ProgressionState};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, ProgressionSnapshot, SnapshotStore};

/// Default autosave period
pub const DEFAULT_AUTOSAVE_SECS: f32 = 300.0;

/// Ask for an immediate save
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct SaveProgressRequest;

/// Where the tracked profile is persisted
#[derive(Resource, Clone)]
pub struct ProfileStore(pub Arc<dyn SnapshotStore>);

#[derive(Resource)]
pub struct AutosaveTimer(pub Timer);

/// The save currently being written, if any
#[derive(Resource, Default)]
pub struct PendingSave {
    task: Option<Task<Result<(), String>>>,
    /// The last write failed; save on the next tick even if nothing changed
    retry: bool,
    /// A save was requested and has not been started yet
    requested: bool,
}

impl PendingSave {
    pub fn in_flight(&self) -> bool {
        self.task.is_some()
    }
}

pub struct ProgressionPlugin {
    pub tracked: CombatantId,
    /// JSON profile file. `None` keeps progress in memory only.
    pub profile_path: Option<PathBuf>,
    pub autosave_secs: f32,
}

impl ProgressionPlugin {
    pub fn new(tracked: impl Into<CombatantId>) -> Self {
        Self {
            tracked: tracked.into(),
            profile_path: None,
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
        }
    }

    pub fn with_profile(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = Some(path.into());
        self
    }
}

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        let definitions = app
            .world()
            .get_resource::<CombatConfig>()
            .cloned()
            .unwrap_or_default()
            .achievement_definitions();

        let store: Arc<dyn SnapshotStore> = match &self.profile_path {
            Some(path) => Arc::new(FileSnapshotStore::new(path.clone())),
            None => Arc::new(MemorySnapshotStore::new()),
        };
        let ledger = ProgressionLedger::load_or_default(self.tracked.clone(), definitions, store.as_ref());

        app.add_event::<SaveProgressRequest>()
            .insert_resource(ledger)
            .insert_resource(ProfileStore(store))
            .insert_resource(AutosaveTimer(Timer::from_seconds(
                self.autosave_secs.max(1.0),
                TimerMode::Repeating,
            )))
            .init_resource::<PendingSave>()
            .add_systems(
                Update,
                (track_progression, autosave_progression)
                    .chain()
                    .in_set(CombatSystemPhase::Consumers),
            );
    }
}

fn track_progression(
    mut events: EventReader<CombatEventMessage>,
    mut ledger: ResMut<ProgressionLedger>,
    resolver: Option<Res<CombatResolver>>,
    mut draw_recorded: Local<bool>,
) {
    for CombatEventMessage(event) in events.read() {
        ledger.observe(event);
    }

    // A draw emits no victory/defeat events, so read it off the outcome.
    let Some(resolver) = resolver else {
        return;
    };
    match resolver.outcome() {
        Some(MatchOutcome::Draw) => {
            let tracked = ledger.tracked().clone();
            if !*draw_recorded && resolver.participant(&tracked).is_some() {
                ledger.record_battle(BattleResult::Draw);
            }
            *draw_recorded = true;
        }
        _ => *draw_recorded = false,
    }
}

fn autosave_progression(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    mut requests: EventReader<SaveProgressRequest>,
    mut ledger: ResMut<ProgressionLedger>,
    store: Res<ProfileStore>,
    mut pending: ResMut<PendingSave>,
) {
    if let Some(task) = pending.task.as_mut() {
        if let Some(result) = block_on(future::poll_once(task)) {
            pending.task = None;
            if let Err(e) = result {
                warn!("Failed to save progression, will retry: {}", e);
                pending.retry = true;
            }
        }
    }

    timer.0.tick(time.delta());
    if requests.read().count() > 0 {
        pending.requested = true;
    }
    if pending.in_flight() {
        return;
    }
    let due = timer.0.just_finished() || pending.requested;
    if !due || !(ledger.is_dirty() || pending.requested || pending.retry) {
        return;
    }

    let json = match ledger.snapshot().to_json() {
        Ok(json) => json,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };
    ledger.mark_saved();
    pending.retry = false;
    pending.requested = false;

    let store = Arc::clone(&store.0);
    let task = IoTaskPool::get_or_init(TaskPool::new).spawn(async move { store.write(&json) });
    pending.task = Some(task);
}
