//! Headless match execution
//!
//! Two ways to run an AI-vs-AI match without any graphical output:
//! - `simulate_match`: a plain fixed-step loop over the resolver, for tests
//!   and batch analysis
//! - `run_headless_match`: the same match hosted in a bevy `App` with
//!   `MinimalPlugins`, writing the combat log and the progression profile

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::{AiControllers, EnemyAi};
use crate::combat::log::{CombatLog, CombatLogEventType, CombatantMetadata, MatchMetadata};
use crate::combat::resolver::{CombatResolver, MatchOutcome};
use crate::combat::rng::GameRng;
use crate::combat::stats::{CombatantId, Faction};
use crate::combat::{CombatPlugin, CombatSystemPhase};
use crate::progression::{BattleResult, ProfileStore, ProgressionLedger, ProgressionPlugin};

use super::config::HeadlessMatchConfig;

/// Fixed simulation step
pub const TICK_SECS: f32 = 1.0 / 60.0;

/// Result of a completed headless match
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Winning faction, or None for a draw or timeout
    pub winner: Option<Faction>,
    pub survivors: Vec<CombatantId>,
    /// Total match duration in seconds
    pub match_time: f32,
    pub timed_out: bool,
    pub combatants: Vec<CombatantResult>,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Statistics for a single combatant after the match
#[derive(Debug, Clone)]
pub struct CombatantResult {
    pub id: CombatantId,
    pub faction: Faction,
    pub max_health: f32,
    /// Health remaining at match end (0 if destroyed)
    pub final_health: f32,
    pub max_energy: f32,
    pub final_energy: f32,
    pub final_position: Vec3,
    pub survived: bool,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

/// Resolver and AI controllers for a configured match, sharing one seed
fn prepare_match(config: &HeadlessMatchConfig) -> (CombatResolver, AiControllers, GameRng) {
    let settings = config.combat_settings();
    let mut rng = GameRng::from_optional_seed(config.random_seed);

    let mut resolver = CombatResolver::new(&settings, settings.ability_definitions(), rng.fork());
    resolver.initialize(config.participants());

    let mut controllers = AiControllers::default();
    for combatant in config.combatants.iter().filter(|c| c.ai_controlled) {
        let difficulty = combatant.difficulty.unwrap_or(config.difficulty);
        controllers.push(EnemyAi::new(combatant.id.as_str(), difficulty, rng.fork()));
    }

    (resolver, controllers, rng)
}

/// Run a match to completion without bevy. Returns the result and the full log.
pub fn simulate_match_with_log(config: &HeadlessMatchConfig) -> (MatchResult, CombatLog) {
    let (mut resolver, mut controllers, _) = prepare_match(config);
    let mut combat_log = CombatLog::default();
    combat_log.log(CombatLogEventType::MatchEvent, "Match started (simulation)".to_string());

    let mut elapsed = 0.0;
    while resolver.is_active() && elapsed < config.max_duration_secs {
        for action in controllers.update(TICK_SECS, &resolver) {
            resolver.submit_action(action);
        }
        resolver.update(TICK_SECS);
        for event in resolver.drain_events() {
            combat_log.record(&event);
        }
        elapsed += TICK_SECS;
    }

    let result = build_match_result(&resolver, &combat_log, elapsed, config.random_seed);
    (result, combat_log)
}

pub fn simulate_match(config: &HeadlessMatchConfig) -> MatchResult {
    simulate_match_with_log(config).0
}

/// Build the MatchResult from current resolver state
fn build_match_result(
    resolver: &CombatResolver,
    combat_log: &CombatLog,
    elapsed: f32,
    random_seed: Option<u64>,
) -> MatchResult {
    let (winner, survivors) = match resolver.outcome() {
        Some(MatchOutcome::Victory { faction, survivors }) => (Some(*faction), survivors.clone()),
        _ => (None, Vec::new()),
    };

    let combatants = resolver
        .participants()
        .iter()
        .map(|c| CombatantResult {
            id: c.id.clone(),
            faction: c.faction,
            max_health: c.stats.max_health,
            final_health: c.stats.health,
            max_energy: c.stats.max_energy,
            final_energy: c.stats.energy,
            final_position: c.position,
            survived: c.is_alive(),
            damage_dealt: combat_log.total_damage_dealt(&c.id),
            damage_taken: combat_log.total_damage_taken(&c.id),
        })
        .collect();

    MatchResult {
        winner,
        survivors,
        match_time: elapsed,
        timed_out: resolver.outcome().is_none(),
        combatants,
        random_seed,
    }
}

impl MatchResult {
    /// Metadata block written alongside the combat log
    pub fn metadata(&self) -> MatchMetadata {
        MatchMetadata {
            winner: self.winner.map(|f| f.name().to_string()),
            match_time: self.match_time,
            random_seed: self.random_seed,
            combatants: self
                .combatants
                .iter()
                .map(|c| CombatantMetadata {
                    id: c.id.to_string(),
                    faction: c.faction.name().to_string(),
                    max_health: c.max_health,
                    final_health: c.final_health,
                    max_energy: c.max_energy,
                    final_energy: c.final_energy,
                    damage_dealt: c.damage_dealt,
                    damage_taken: c.damage_taken,
                    final_position: (c.final_position.x, c.final_position.y, c.final_position.z),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Bevy host
// ============================================================================

/// Resource to track headless match state
#[derive(Resource)]
pub struct HeadlessMatchState {
    /// Maximum match duration before declaring a draw
    pub max_duration: f32,
    pub elapsed_time: f32,
    /// Custom output path for match log
    pub output_path: Option<String>,
    pub match_complete: bool,
    pub random_seed: Option<u64>,
    /// Populated when the match completes
    pub result: Option<MatchResult>,
}

/// Plugin for headless match execution
pub struct HeadlessPlugin {
    pub config: HeadlessMatchConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let (resolver, controllers, rng) = prepare_match(&self.config);

        app.insert_resource(self.config.combat_settings())
            .insert_resource(resolver)
            .insert_resource(controllers)
            .insert_resource(rng)
            .insert_resource(HeadlessMatchState {
                max_duration: self.config.max_duration_secs,
                elapsed_time: 0.0,
                output_path: self.config.output_path.clone(),
                match_complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .add_plugins(CombatPlugin)
            .add_systems(Startup, headless_setup_match)
            .add_systems(
                Update,
                (headless_track_time, headless_check_match_end)
                    .chain()
                    .after(CombatSystemPhase::Consumers),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

fn headless_setup_match(
    resolver: Res<CombatResolver>,
    headless_state: Res<HeadlessMatchState>,
    mut combat_log: ResMut<CombatLog>,
) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::MatchEvent,
        "Match started (headless mode)!".to_string(),
    );

    match headless_state.random_seed {
        Some(seed) => info!("Using deterministic RNG with seed: {}", seed),
        None => info!("Using non-deterministic RNG (no seed provided)"),
    }
    info!(
        "Headless match setup complete: {} combatants",
        resolver.participants().len()
    );
}

fn headless_track_time(time: Res<Time>, mut headless_state: ResMut<HeadlessMatchState>) {
    if !headless_state.match_complete {
        headless_state.elapsed_time += time.delta_secs();
    }
}

/// Check if the match has ended (elimination or timeout)
fn headless_check_match_end(
    resolver: Res<CombatResolver>,
    combat_log: Res<CombatLog>,
    mut headless_state: ResMut<HeadlessMatchState>,
    ledger: Option<ResMut<ProgressionLedger>>,
    store: Option<Res<ProfileStore>>,
) {
    if headless_state.match_complete {
        return;
    }

    let timed_out = resolver.is_active() && headless_state.elapsed_time >= headless_state.max_duration;
    if resolver.is_active() && !timed_out {
        return;
    }

    let result = build_match_result(
        &resolver,
        &combat_log,
        headless_state.elapsed_time,
        headless_state.random_seed,
    );
    match (&result.winner, timed_out) {
        (_, true) => info!("Match timed out after {:.1}s - declaring DRAW", result.match_time),
        (Some(faction), _) => info!("Match ended! {} wins!", faction.name()),
        (None, _) => info!("Match ended in a DRAW (mutual elimination)!"),
    }

    let output = headless_state.output_path.as_deref().map(Path::new);
    match combat_log.save_to_file(&result.metadata(), output) {
        Ok(filename) => println!("Match complete. Log saved to: {}", filename),
        Err(e) => eprintln!("Failed to save combat log: {}", e),
    }

    if let (Some(mut ledger), Some(store)) = (ledger, store) {
        if timed_out {
            ledger.record_battle(BattleResult::Draw);
        }
        if let Err(e) = ledger.save(store.0.as_ref()) {
            warn!("Failed to save progression: {}", e);
        }
    }

    headless_state.result = Some(result);
    headless_state.match_complete = true;
}

/// Exit the app when the match is complete
fn headless_exit_on_complete(headless_state: Res<HeadlessMatchState>, mut exit: EventWriter<AppExit>) {
    if headless_state.match_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless match with the given configuration
pub fn run_headless_match(config: HeadlessMatchConfig, profile: Option<PathBuf>) -> Result<(), String> {
    config.validate()?;

    println!("Starting headless match simulation...");
    for combatant in &config.combatants {
        println!(
            "  {} ({}): {:?}",
            combatant.id,
            combatant.faction.name(),
            combatant.abilities
        );
    }
    println!("  Difficulty: {:.2}", config.difficulty);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let mut progression = config.tracked_id().map(ProgressionPlugin::new);
    if let (Some(plugin), Some(path)) = (progression.as_mut(), profile) {
        plugin.profile_path = Some(path);
    }

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            f64::from(TICK_SECS),
        ))),
    )
    .add_plugins(bevy::log::LogPlugin::default())
    .add_plugins(HeadlessPlugin { config });
    if let Some(plugin) = progression {
        app.add_plugins(plugin);
    }

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("Headless match exited with code {}", code)),
    }
}
