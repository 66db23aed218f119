//! Tests for CombatLog recording, queries and export

use bevy::prelude::Vec3;
use regex::Regex;

use mechduel::combat::effects::{Origin, StatusEffectKind};
use mechduel::combat::events::{CombatEvent, CombatEventKind};
use mechduel::combat::log::{CombatLog, CombatLogEventType, MatchMetadata};
use mechduel::combat::stats::CombatantId;

// ============================================================================
// Helpers
// ============================================================================

fn id(s: &str) -> CombatantId {
    CombatantId::from(s)
}

fn hit(at_ms: f64, source: &str, target: &str, amount: f32) -> CombatEvent {
    CombatEvent::new(
        at_ms,
        CombatEventKind::Damage {
            source: Origin::Combatant(id(source)),
            target: id(target),
            amount,
            position: Vec3::ZERO,
            ability_id: None,
            damage_type: None,
            effect: None,
        },
    )
}

fn heal(at_ms: f64, target: &str, amount: f32) -> CombatEvent {
    CombatEvent::new(
        at_ms,
        CombatEventKind::Heal {
            source: Origin::Combatant(id(target)),
            target: id(target),
            amount,
            position: Vec3::ZERO,
        },
    )
}

fn sample_log() -> CombatLog {
    let mut log = CombatLog::default();
    log.record(&hit(500.0, "player", "brute", 12.0));
    log.record(&hit(1500.0, "brute", "player", 8.0));
    log.record(&heal(2000.0, "brute", 4.0));
    log.record(&hit(2500.0, "player", "brute", 10.0));
    log.record(&CombatEvent::new(
        3000.0,
        CombatEventKind::Transform {
            source: id("player"),
            transformed: true,
            position: Vec3::ZERO,
        },
    ));
    log
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_total_damage_dealt() {
    let log = sample_log();

    assert_eq!(log.total_damage_dealt(&id("player")), 22.0);
    assert_eq!(log.total_damage_dealt(&id("brute")), 8.0);
    assert_eq!(log.total_damage_dealt(&id("nobody")), 0.0);
}

#[test]
fn test_total_damage_taken() {
    let log = sample_log();

    assert_eq!(log.total_damage_taken(&id("brute")), 22.0);
    assert_eq!(log.total_damage_taken(&id("player")), 8.0);
}

#[test]
fn test_damage_by_combatant_includes_hazards() {
    let mut log = sample_log();
    log.record(&CombatEvent::new(
        4000.0,
        CombatEventKind::Damage {
            source: Origin::Hazard("lava_floor".to_string()),
            target: id("player"),
            amount: 3.0,
            position: Vec3::ZERO,
            ability_id: None,
            damage_type: None,
            effect: Some(StatusEffectKind::Burn),
        },
    ));

    let totals = log.damage_by_combatant();
    assert_eq!(totals.get("player"), Some(&22.0));
    assert_eq!(totals.get("brute"), Some(&8.0));
    assert_eq!(totals.get("lava_floor"), Some(&3.0));
}

#[test]
fn test_filter_by_type() {
    let log = sample_log();

    assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 3);
    assert_eq!(log.filter_by_type(CombatLogEventType::Healing).len(), 1);
    assert_eq!(log.filter_by_type(CombatLogEventType::Transform).len(), 1);
    assert!(log.filter_by_type(CombatLogEventType::Death).is_empty());
}

#[test]
fn test_hp_changes_only() {
    let log = sample_log();
    let changes = log.hp_changes_only();

    assert_eq!(changes.len(), 4, "Three hits and one heal");
    assert!(changes.iter().all(|e| e.amount.is_some()));
}

#[test]
fn test_recent_entries() {
    let log = sample_log();
    let recent = log.recent(2);

    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].event_type, CombatLogEventType::Transform, "Newest entry comes last");
    assert_eq!(log.recent(50).len(), log.entries.len());
}

#[test]
fn test_timestamps_follow_event_clock() {
    let log = sample_log();

    assert_eq!(log.entries[0].timestamp, 0.5);
    assert_eq!(log.match_time, 3.0, "Match time tracks the latest event");
}

#[test]
fn test_clear_resets_log() {
    let mut log = sample_log();
    log.clear();

    assert!(log.entries.is_empty());
    assert_eq!(log.match_time, 0.0);
}

// ============================================================================
// Message formats
// ============================================================================

#[test]
fn test_damage_message_format() {
    let log = sample_log();
    let pattern = Regex::new(r"^\w+'s \w+ hits \w+ for \d+ damage$").expect("valid regex");

    for entry in log.filter_by_type(CombatLogEventType::Damage) {
        assert!(pattern.is_match(&entry.message), "Unexpected message: {}", entry.message);
    }
    assert_eq!(log.entries[0].message, "player's attack hits brute for 12 damage");
}

#[test]
fn test_ability_and_match_messages() {
    let mut log = CombatLog::default();
    log.record(&CombatEvent::new(
        0.0,
        CombatEventKind::Ability {
            source: id("player"),
            target: Some(id("brute")),
            ability_id: "plasma_lance".to_string(),
            position: Vec3::ZERO,
        },
    ));
    log.record(&CombatEvent::new(0.0, CombatEventKind::Victory { winner: id("player") }));
    log.record(&CombatEvent::new(0.0, CombatEventKind::Defeat { loser: id("brute") }));

    assert_eq!(log.entries[0].message, "player uses plasma_lance on brute");
    assert_eq!(log.entries[1].message, "player is victorious");
    assert_eq!(log.entries[2].message, "brute has been destroyed");
    assert_eq!(log.entries[2].event_type, CombatLogEventType::Death);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_save_to_file_writes_metadata_and_entries() {
    let log = sample_log();
    let path = std::env::temp_dir()
        .join(format!("mechduel_log_{}", std::process::id()))
        .join("match.json");
    let metadata = MatchMetadata {
        winner: Some("Player".to_string()),
        match_time: 3.0,
        random_seed: Some(42),
        combatants: Vec::new(),
    };

    let written = log
        .save_to_file(&metadata, Some(&path))
        .expect("log should save");
    let contents = std::fs::read_to_string(&written).expect("saved log should be readable");
    let json: serde_json::Value = serde_json::from_str(&contents).expect("saved log should be JSON");

    assert_eq!(json["metadata"]["winner"], "Player");
    assert_eq!(json["metadata"]["random_seed"], 42);
    assert_eq!(
        json["entries"].as_array().map(Vec::len),
        Some(log.entries.len())
    );

    let _ = std::fs::remove_dir_all(path.parent().expect("path has a parent"));
}
