//! Integration tests for progression fed by real combat
//!
//! These tests verify that:
//! - Resolver events update the tracked combatant's statistics
//! - Victories unlock achievements and grant experience
//! - Progress survives a save/load round trip through a store
//! - The plugin saves on its timer, on request, and retries failed writes

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use mechduel::combat::events::CombatEventMessage;
use mechduel::progression::achievements::default_achievements;
use mechduel::progression::{
    BattleResult, MemorySnapshotStore, PendingSave, ProfileStore, ProgressionLedger, ProgressionPlugin,
    SaveProgressRequest, SnapshotStore,
};
use mechduel::{CombatAction, CombatResolver, CombatantStats, Faction, Participant};

/// Run a one-sided duel to its end, feeding every event to the ledger
fn win_one_battle(ledger: &mut ProgressionLedger, seed: u64) {
    let mut resolver = CombatResolver::with_seed(seed);
    resolver.initialize([
        Participant::new(
            "player",
            Faction::Player,
            CombatantStats {
                attack: 200.0,
                ..CombatantStats::default()
            },
        ),
        Participant::new("drone", Faction::Enemy, CombatantStats::default()).at(Vec3::new(2.0, 0.0, 0.0)),
    ]);

    resolver.submit_action(CombatAction::attack("player", "drone", true));
    resolver.update(0.016);
    assert!(!resolver.is_active(), "One hit should end the duel");

    for event in resolver.drain_events() {
        ledger.observe(&event);
    }
}

#[test]
fn test_victory_updates_statistics_and_unlocks_first_victory() {
    let mut ledger = ProgressionLedger::new("player", default_achievements());
    win_one_battle(&mut ledger, 1);

    assert_eq!(ledger.statistics.battles_fought, 1);
    assert_eq!(ledger.statistics.battles_won, 1);
    assert_eq!(ledger.statistics.current_streak, 1);
    assert_eq!(ledger.statistics.damage_dealt, 100.0, "Damage is capped at the health lost");
    assert!(ledger.is_unlocked("first_victory"));
    assert_eq!(ledger.state.experience, 200, "Victory plus the first-victory reward");
    assert!(ledger.is_dirty());
}

#[test]
fn test_untracked_events_are_ignored() {
    let mut ledger = ProgressionLedger::new("someone_else", default_achievements());
    win_one_battle(&mut ledger, 2);

    assert_eq!(ledger.statistics.battles_fought, 0);
    assert_eq!(ledger.statistics.damage_dealt, 0.0);
    assert!(!ledger.is_unlocked("first_victory"));
}

#[test]
fn test_streak_unlocks_arena_after_five_wins() {
    let mut ledger = ProgressionLedger::new("player", default_achievements());
    for seed in 0..5 {
        win_one_battle(&mut ledger, seed);
    }

    assert_eq!(ledger.statistics.best_streak, 5);
    assert!(ledger.is_unlocked("unstoppable"));
    assert!(ledger.state.unlocked_arenas.contains(&"volcano_pit".to_string()));
}

#[test]
fn test_progress_survives_save_and_load() {
    let store = MemorySnapshotStore::new();
    let mut ledger = ProgressionLedger::new("player", default_achievements());
    for seed in 0..3 {
        win_one_battle(&mut ledger, seed);
    }
    ledger.save(&store).expect("memory store should accept writes");
    assert!(!ledger.is_dirty(), "Saving clears the dirty flag");

    let loaded = ProgressionLedger::load_or_default("player", default_achievements(), &store);

    assert_eq!(loaded.statistics, ledger.statistics);
    assert_eq!(loaded.state, ledger.state);
    assert!(loaded.is_unlocked("first_victory"));
    assert!(!loaded.is_dirty());
}

#[test]
fn test_failed_save_keeps_ledger_dirty() {
    let store = MemorySnapshotStore::failing();
    let mut ledger = ProgressionLedger::new("player", default_achievements());
    win_one_battle(&mut ledger, 4);

    assert!(ledger.save(&store).is_err());
    assert!(ledger.is_dirty(), "Unsaved progress must be retried later");
}

// =============================================================================
// Plugin save path
// =============================================================================

/// Store that counts writes and can be slowed down or made to fail
#[derive(Clone, Default)]
struct RecordingStore {
    slot: Arc<Mutex<Option<String>>>,
    attempts: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Duration,
}

impl RecordingStore {
    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for RecordingStore {
    fn read(&self) -> Result<Option<String>, String> {
        Ok(self.slot.lock().map_err(|e| e.to_string())?.clone())
    }

    fn write(&self, json: &str) -> Result<(), String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if self.failing.load(Ordering::SeqCst) {
            return Err("disk full".to_string());
        }
        *self.slot.lock().map_err(|e| e.to_string())? = Some(json.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Headless app with progression only; each update advances time by 250ms
fn progression_app(store: &RecordingStore, autosave_secs: f32) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_event::<CombatEventMessage>()
        .add_plugins(ProgressionPlugin {
            autosave_secs,
            ..ProgressionPlugin::new("player")
        })
        .insert_resource(ProfileStore(Arc::new(store.clone())))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)));
    app
}

fn record_win(app: &mut App) {
    app.world_mut()
        .resource_mut::<ProgressionLedger>()
        .record_battle(BattleResult::Won);
}

fn in_flight(app: &App) -> bool {
    app.world().resource::<PendingSave>().in_flight()
}

/// Update until `done` holds, giving background writes real time to finish
fn update_until(app: &mut App, mut done: impl FnMut(&App) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        app.update();
        if done(app) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn test_autosave_timer_writes_dirty_progress() {
    let store = RecordingStore::default();
    let mut app = progression_app(&store, 1.0);
    record_win(&mut app);

    // The first update has zero delta, so three updates cover half a second
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(store.attempts(), 0, "Nothing is saved before the timer fires");
    assert!(!in_flight(&app));

    assert!(
        update_until(&mut app, |app| store.writes() == 1 && !in_flight(app)),
        "Timer should trigger a save"
    );
    assert!(!app.world().resource::<ProgressionLedger>().is_dirty());

    for _ in 0..12 {
        app.update();
    }
    assert_eq!(store.attempts(), 1, "Clean ledger is not saved again");
}

#[test]
fn test_save_request_writes_before_timer() {
    let store = RecordingStore::default();
    let mut app = progression_app(&store, 300.0);
    record_win(&mut app);
    app.world_mut().send_event(SaveProgressRequest);

    assert!(
        update_until(&mut app, |app| store.writes() == 1 && !in_flight(app)),
        "Request should save without waiting for the timer"
    );
    let saved = ProgressionLedger::load_or_default("player", default_achievements(), &store);
    assert_eq!(saved.statistics.battles_won, 1);
}

#[test]
fn test_failed_save_is_retried_on_next_timer_tick() {
    let store = RecordingStore::default();
    store.failing.store(true, Ordering::SeqCst);
    let mut app = progression_app(&store, 1.0);
    record_win(&mut app);

    assert!(
        update_until(&mut app, |app| store.attempts() == 1 && !in_flight(app)),
        "Timer should attempt a save"
    );
    assert_eq!(store.writes(), 0);
    store.failing.store(false, Ordering::SeqCst);

    // No new progress since the failure: only the retry can cause this write
    assert!(
        update_until(&mut app, |app| store.writes() == 1 && !in_flight(app)),
        "Failed save should be retried on the next tick"
    );
    assert_eq!(store.attempts(), 2);
    let saved = ProgressionLedger::load_or_default("player", default_achievements(), &store);
    assert_eq!(saved.statistics.battles_won, 1);
}

#[test]
fn test_request_during_running_save_is_served_afterwards() {
    let store = RecordingStore {
        delay: Duration::from_millis(300),
        ..RecordingStore::default()
    };
    let mut app = progression_app(&store, 300.0);

    record_win(&mut app);
    app.world_mut().send_event(SaveProgressRequest);
    app.update();
    assert!(in_flight(&app), "First request starts a save");

    record_win(&mut app);
    app.world_mut().send_event(SaveProgressRequest);
    app.update();
    assert_eq!(store.writes(), 0, "First save is still being written");

    assert!(
        update_until(&mut app, |app| store.writes() == 2 && !in_flight(app)),
        "Second request must be saved once the first write finishes, got {} writes",
        store.writes()
    );
    assert!(!app.world().resource::<ProgressionLedger>().is_dirty());
    let saved = ProgressionLedger::load_or_default("player", default_achievements(), &store);
    assert_eq!(saved.statistics.battles_won, 2, "Latest progress reaches the store");
}
