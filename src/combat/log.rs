//! Combat logging
//!
//! Records every combat event as a timestamped, human-readable entry for
//! post-match analysis, and exports the whole match as JSON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::events::{CombatEvent, CombatEventKind};
use super::stats::CombatantId;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Timestamp in match time (seconds since match start)
    pub timestamp: f32,
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Who acted, if anyone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Damage or healing amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f32>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatLogEventType {
    Damage,
    Healing,
    AbilityUsed,
    /// Buff/debuff applied
    StatusApplied,
    Transform,
    Movement,
    /// Combatant died
    Death,
    /// Match event (start, end, etc.)
    MatchEvent,
}

/// Final state of one combatant, written alongside the log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantMetadata {
    pub id: String,
    pub faction: String,
    pub max_health: f32,
    pub final_health: f32,
    pub max_energy: f32,
    pub final_energy: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub final_position: (f32, f32, f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Winning faction, None for a draw or timeout
    pub winner: Option<String>,
    pub match_time: f32,
    pub random_seed: Option<u64>,
    pub combatants: Vec<CombatantMetadata>,
}

#[derive(Serialize)]
struct SavedMatch<'a> {
    metadata: &'a MatchMetadata,
    entries: &'a [CombatLogEntry],
}

/// The combat log resource storing all events
#[derive(Resource, Default, Debug, Clone)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current match time in seconds
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new match
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a free-form entry at the current match time
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
            source: None,
            target: None,
            amount: None,
        });
    }

    /// Record a resolver event. The entry uses the event's own timestamp.
    pub fn record(&mut self, event: &CombatEvent) {
        let timestamp = (event.timestamp_ms / 1000.0) as f32;
        self.match_time = self.match_time.max(timestamp);

        let (event_type, message, target, amount) = describe(&event.kind);
        self.entries.push(CombatLogEntry {
            timestamp,
            event_type,
            message,
            source: event_source(&event.kind),
            target,
            amount,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    pub fn total_damage_dealt(&self, id: &CombatantId) -> f32 {
        self.sum_damage(|e| e.source.as_deref() == Some(id.as_str()))
    }

    pub fn total_damage_taken(&self, id: &CombatantId) -> f32 {
        self.sum_damage(|e| e.target.as_deref() == Some(id.as_str()))
    }

    /// Damage dealt per source. Hazards show up under their hazard id.
    pub fn damage_by_combatant(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.filter_by_type(CombatLogEventType::Damage) {
            if let (Some(source), Some(amount)) = (&entry.source, entry.amount) {
                *totals.entry(source.clone()).or_insert(0.0) += amount;
            }
        }
        totals
    }

    fn sum_damage(&self, predicate: impl Fn(&CombatLogEntry) -> bool) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.event_type == CombatLogEventType::Damage && predicate(e))
            .filter_map(|e| e.amount)
            .sum()
    }

    /// Write metadata and every entry as pretty JSON.
    ///
    /// Without an explicit path the file goes to `match_logs/` with a
    /// timestamped name. Returns the path written.
    pub fn save_to_file(&self, metadata: &MatchMetadata, path: Option<&Path>) -> Result<String, String> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let stamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                Path::new("match_logs").join(format!("match_{}.json", stamp))
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let saved = SavedMatch {
            metadata,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize combat log: {}", e))?;
        std::fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        Ok(path.display().to_string())
    }
}

fn event_source(kind: &CombatEventKind) -> Option<String> {
    match kind {
        CombatEventKind::Damage { source, .. }
        | CombatEventKind::Heal { source, .. }
        | CombatEventKind::Effect { source, .. } => Some(source.label().to_string()),
        CombatEventKind::Transform { source, .. }
        | CombatEventKind::Ability { source, .. }
        | CombatEventKind::Moved { source, .. } => Some(source.to_string()),
        CombatEventKind::Victory { winner } => Some(winner.to_string()),
        CombatEventKind::Defeat { loser } => Some(loser.to_string()),
    }
}

fn describe(kind: &CombatEventKind) -> (CombatLogEventType, String, Option<String>, Option<f32>) {
    match kind {
        CombatEventKind::Damage {
            source,
            target,
            amount,
            ability_id,
            effect,
            ..
        } => {
            let cause = match (ability_id, effect) {
                (Some(ability), _) => ability.clone(),
                (None, Some(effect)) => effect.name().to_string(),
                (None, None) => "attack".to_string(),
            };
            (
                CombatLogEventType::Damage,
                format!("{}'s {} hits {} for {:.0} damage", source.label(), cause, target, amount),
                Some(target.to_string()),
                Some(*amount),
            )
        }
        CombatEventKind::Heal {
            source,
            target,
            amount,
            ..
        } => (
            CombatLogEventType::Healing,
            format!("{} heals {} for {:.0}", source.label(), target, amount),
            Some(target.to_string()),
            Some(*amount),
        ),
        CombatEventKind::Effect {
            source,
            target,
            effect,
            duration,
            replaced,
            ..
        } => (
            CombatLogEventType::StatusApplied,
            format!(
                "{} {} {} on {} ({:.1}s)",
                source.label(),
                if *replaced { "refreshes" } else { "applies" },
                effect.name(),
                target,
                duration
            ),
            Some(target.to_string()),
            None,
        ),
        CombatEventKind::Transform {
            source, transformed, ..
        } => (
            CombatLogEventType::Transform,
            format!(
                "{} transforms into {} form",
                source,
                if *transformed { "vehicle" } else { "robot" }
            ),
            None,
            None,
        ),
        CombatEventKind::Ability {
            source,
            target,
            ability_id,
            ..
        } => {
            let message = match target {
                Some(target) if target != source => format!("{} uses {} on {}", source, ability_id, target),
                _ => format!("{} uses {}", source, ability_id),
            };
            (
                CombatLogEventType::AbilityUsed,
                message,
                target.as_ref().map(ToString::to_string),
                None,
            )
        }
        CombatEventKind::Moved { source, position } => (
            CombatLogEventType::Movement,
            format!(
                "{} moves to ({:.1}, {:.1}, {:.1})",
                source, position.x, position.y, position.z
            ),
            None,
            None,
        ),
        CombatEventKind::Victory { winner } => (
            CombatLogEventType::MatchEvent,
            format!("{} is victorious", winner),
            None,
            None,
        ),
        CombatEventKind::Defeat { loser } => (
            CombatLogEventType::Death,
            format!("{} has been destroyed", loser),
            None,
            None,
        ),
    }
}
