//! Tests for ability definitions and how the resolver applies them
//!
//! These tests verify that:
//! - The shipped ability set has valid values
//! - Custom ability sets load from RON and are validated
//! - Abilities are gated by ownership, energy and cooldowns through the public API
//! - Damage-over-time effects tick for their full duration

use bevy::prelude::Vec3;

use mechduel::combat::abilities::{AbilityDefinitions, TargetType};
use mechduel::combat::effects::StatusEffectKind;
use mechduel::combat::rng::GameRng;
use mechduel::{CombatAction, CombatConfig, CombatResolver, CombatantId, CombatantStats, Faction, Participant};

// =============================================================================
// Helpers
// =============================================================================

fn id(s: &str) -> CombatantId {
    CombatantId::from(s)
}

fn duel(resolver: &mut CombatResolver, loadout: &[&str]) {
    resolver.initialize([
        Participant::new("player", Faction::Player, CombatantStats::default())
            .with_abilities(loadout.iter().copied()),
        Participant::new("brute", Faction::Enemy, CombatantStats::default()).at(Vec3::new(4.0, 0.0, 0.0)),
    ]);
}

fn health(resolver: &CombatResolver, who: &str) -> f32 {
    resolver
        .participant(&id(who))
        .map(|c| c.stats.health)
        .expect("combatant should exist")
}

// =============================================================================
// Definition Validation Tests
// =============================================================================

#[test]
fn test_all_abilities_have_names_and_valid_numbers() {
    let abilities = AbilityDefinitions::default();
    assert!(abilities.len() >= 8, "Expected the full default ability set");

    for ability in abilities.iter() {
        assert!(!ability.name.is_empty(), "{} should have a name", ability.id);
        assert!(ability.energy_cost >= 0.0, "{} has negative cost", ability.id);
        assert!(ability.range >= 0.0, "{} has negative range", ability.id);
        for effect in &ability.effects {
            assert!(effect.duration > 0.0, "{} has a zero-length effect", ability.id);
        }
    }
}

#[test]
fn test_damage_abilities_target_enemies() {
    let abilities = AbilityDefinitions::default();
    for ability in abilities.iter().filter(|a| a.is_damage()) {
        assert_ne!(
            ability.target_type,
            TargetType::Caster,
            "{} deals damage but targets its caster",
            ability.id
        );
        assert!(ability.range > 0.0, "{} needs a positive range", ability.id);
    }
}

#[test]
fn test_self_abilities_are_supportive() {
    let abilities = AbilityDefinitions::default();
    for ability in abilities.iter().filter(|a| a.target_type == TargetType::Caster) {
        assert!(ability.is_supportive(), "{} should only help its caster", ability.id);
    }
}

#[test]
fn test_custom_ability_set_from_ron() {
    let ron = r#"(
        abilities: [
            (
                id: "rail_spike",
                name: "Rail Spike",
                energy_cost: 50.0,
                cooldown_ms: 2000,
                damage: Some(40.0),
                range: 20.0,
                target_type: enemy,
            ),
        ],
    )"#;
    let abilities = AbilityDefinitions::from_ron(ron).expect("custom set should parse");

    assert_eq!(abilities.ids(), vec!["rail_spike"]);
    let spike = abilities.get("rail_spike").expect("rail_spike exists");
    assert_eq!(spike.damage, Some(40.0));
    assert!(spike.effects.is_empty(), "Effects default to none");
}

#[test]
fn test_invalid_effect_duration_rejected() {
    let ron = r#"(
        abilities: [
            (
                id: "dud",
                name: "Dud",
                effects: [(kind: stun, duration: 0.0)],
                range: 5.0,
                target_type: enemy,
            ),
        ],
    )"#;
    let err = AbilityDefinitions::from_ron(ron).expect_err("zero duration should be rejected");
    assert!(err.contains("dud"), "Error should name the ability: {}", err);
}

// =============================================================================
// Resolver Integration Tests
// =============================================================================

#[test]
fn test_custom_abilities_drive_the_resolver() {
    let ron = r#"(
        abilities: [
            (
                id: "rail_spike",
                name: "Rail Spike",
                energy_cost: 50.0,
                cooldown_ms: 2000,
                damage: Some(40.0),
                range: 20.0,
                target_type: enemy,
            ),
        ],
    )"#;
    let abilities = AbilityDefinitions::from_ron(ron).expect("custom set should parse");
    let config = CombatConfig {
        energy_regen_rate_per_second: 0.0,
        ..CombatConfig::default()
    };
    let mut resolver = CombatResolver::new(&config, abilities, GameRng::from_seed(1));
    duel(&mut resolver, &["rail_spike"]);

    resolver.submit_action(CombatAction::ability("player", "rail_spike", Some(id("brute"))));
    resolver.update(0.0);
    assert_eq!(health(&resolver, "brute"), 60.0);

    // No regen: exactly two spikes' worth of energy
    resolver.update(2.0);
    resolver.submit_action(CombatAction::ability("player", "rail_spike", Some(id("brute"))));
    resolver.update(0.0);
    assert_eq!(health(&resolver, "brute"), 20.0);

    resolver.update(2.0);
    resolver.submit_action(CombatAction::ability("player", "rail_spike", Some(id("brute"))));
    resolver.update(0.0);
    assert_eq!(health(&resolver, "brute"), 20.0, "Out of energy: third spike must not land");
    assert!(resolver.is_active());
}

#[test]
fn test_damage_over_time_ticks_for_full_duration() {
    let mut resolver = CombatResolver::with_seed(2);
    duel(&mut resolver, &["corrosive_round"]);

    resolver.submit_action(CombatAction::ability("player", "corrosive_round", Some(id("brute"))));
    resolver.update(0.0);
    assert_eq!(health(&resolver, "brute"), 94.0, "Impact damage lands immediately");
    assert!(resolver.has_restriction(&id("brute"), StatusEffectKind::DamageOverTime));

    for _ in 0..4 {
        resolver.update(1.0);
    }
    assert_eq!(health(&resolver, "brute"), 82.0, "Four ticks of three damage");
    assert!(
        resolver.active_effects(&id("brute")).is_empty(),
        "Effect should have expired"
    );

    resolver.update(1.0);
    assert_eq!(health(&resolver, "brute"), 82.0, "No ticks after expiry");
}

#[test]
fn test_ability_on_friendly_target_is_rejected() {
    let mut resolver = CombatResolver::with_seed(3);
    resolver.initialize([
        Participant::new("player", Faction::Player, CombatantStats::default()).with_abilities(["plasma_lance"]),
        Participant::new("wingman", Faction::Player, CombatantStats::default()).at(Vec3::new(2.0, 0.0, 0.0)),
        Participant::new("brute", Faction::Enemy, CombatantStats::default()).at(Vec3::new(30.0, 0.0, 0.0)),
    ]);

    resolver.submit_action(CombatAction::ability("player", "plasma_lance", Some(id("wingman"))));
    resolver.update(0.0);

    assert_eq!(health(&resolver, "wingman"), 100.0);
    assert!(resolver.drain_events().is_empty(), "Rejected abilities emit nothing");
    assert!(!resolver.is_on_cooldown(&id("player"), "plasma_lance"));
}
