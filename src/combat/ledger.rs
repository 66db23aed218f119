//! Energy & Cooldown Ledger
//!
//! Energy lives in `CombatantStats`; the `EnergyLedger` holds the regen policy
//! and is the only thing besides the resolver allowed to change it. Every
//! operation keeps `0 <= energy <= max_energy`.
//!
//! `CooldownLedger` is per combatant: ability id -> expiry timestamp, plus the
//! time of the last basic attack (basic attacks do not use the ability map).
//! All timestamps are milliseconds of match time.

use bevy::prelude::*;
use std::collections::HashMap;

use super::stats::CombatantStats;

/// Energy regeneration as a fraction of max energy per second
pub const DEFAULT_ENERGY_REGEN_RATE: f32 = 0.2;

/// Basic attack cooldown in milliseconds
pub const DEFAULT_ATTACK_COOLDOWN_MS: u32 = 500;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyLedger {
    pub regen_rate_per_second: f32,
}

impl Default for EnergyLedger {
    fn default() -> Self {
        Self {
            regen_rate_per_second: DEFAULT_ENERGY_REGEN_RATE,
        }
    }
}

impl EnergyLedger {
    pub fn new(regen_rate_per_second: f32) -> Self {
        Self {
            regen_rate_per_second: regen_rate_per_second.max(0.0),
        }
    }

    /// Regenerate `max_energy * rate * dt`, clamped to max. Returns the energy gained.
    pub fn regenerate(&self, stats: &mut CombatantStats, dt: f32) -> f32 {
        if dt <= 0.0 {
            return 0.0;
        }
        let before = stats.energy;
        let gain = stats.max_energy * self.regen_rate_per_second * dt;
        stats.energy = (stats.energy + gain).clamp(0.0, stats.max_energy);
        stats.energy - before
    }

    pub fn can_afford(&self, stats: &CombatantStats, cost: f32) -> bool {
        cost <= stats.energy
    }

    /// Spend energy. Callers check `can_afford` first; if they didn't and the
    /// pool is short, nothing is spent and `false` is returned.
    pub fn spend(&self, stats: &mut CombatantStats, cost: f32) -> bool {
        let cost = cost.max(0.0);
        if !self.can_afford(stats, cost) {
            warn!(
                "Refusing to spend {:.1} energy with only {:.1} available",
                cost, stats.energy
            );
            return false;
        }
        stats.energy = (stats.energy - cost).max(0.0);
        true
    }
}

#[derive(Clone, Debug, Default)]
pub struct CooldownLedger {
    expiries: HashMap<String, f64>,
    last_attack_ms: Option<f64>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while `now` is before the stored expiry. No entry means ready.
    pub fn is_on_cooldown(&self, ability_id: &str, now_ms: f64) -> bool {
        self.expiries
            .get(ability_id)
            .is_some_and(|&expiry| now_ms < expiry)
    }

    /// Set expiry to `now + duration`, overwriting any earlier value
    pub fn start_cooldown(&mut self, ability_id: &str, now_ms: f64, duration_ms: u32) {
        self.expiries
            .insert(ability_id.to_string(), now_ms + f64::from(duration_ms));
    }

    /// Milliseconds until the ability is ready (0 when ready)
    pub fn remaining_ms(&self, ability_id: &str, now_ms: f64) -> f64 {
        self.expiries
            .get(ability_id)
            .map(|&expiry| (expiry - now_ms).max(0.0))
            .unwrap_or(0.0)
    }

    pub fn expiries(&self) -> &HashMap<String, f64> {
        &self.expiries
    }

    pub fn last_attack_ms(&self) -> Option<f64> {
        self.last_attack_ms
    }

    /// Whether a basic attack is allowed given the (already slow-adjusted) cooldown
    pub fn attack_ready(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_attack_ms {
            Some(last) => now_ms - last >= cooldown_ms,
            None => true,
        }
    }

    pub fn record_attack(&mut self, now_ms: f64) {
        self.last_attack_ms = Some(now_ms);
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
        self.last_attack_ms = None;
    }
}
