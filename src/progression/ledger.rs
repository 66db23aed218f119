//! Progression & Persistence Ledger
//!
//! Follows one tracked combatant across matches:
//! - accumulates `CombatStatistics` from combat events
//! - evaluates achievements (unlock once, reward on the unlock only)
//! - manages level, experience and skill points
//! - produces and restores versioned snapshots
//!
//! It only ever reads `CombatEvent`s; nothing here touches the resolver.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::achievements::{
    AchievementDefinition, AchievementMetric, AchievementProgress, AchievementReward,
};
use super::snapshot::{ProgressionSnapshot, SnapshotStore, SNAPSHOT_VERSION};
use crate::combat::events::{CombatEvent, CombatEventKind};
use crate::combat::stats::CombatantId;

/// Experience needed to go from level 1 to level 2
pub const BASE_EXPERIENCE_TO_NEXT_LEVEL: u32 = 500;

/// Each level needs this much more experience than the last
pub const LEVEL_THRESHOLD_MULTIPLIER: f32 = 1.5;

pub const VICTORY_EXPERIENCE: u32 = 100;
pub const DEFEAT_EXPERIENCE: u32 = 25;
pub const SKILL_POINTS_PER_LEVEL: u32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombatStatistics {
    pub battles_fought: u32,
    pub battles_won: u32,
    pub battles_lost: u32,
    pub draws: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub transformations: u32,
    pub special_moves: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionState {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next_level: u32,
    pub unlocked_abilities: Vec<String>,
    pub unlocked_arenas: Vec<String>,
    pub unlocked_titles: Vec<String>,
    pub skill_points: u32,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next_level: BASE_EXPERIENCE_TO_NEXT_LEVEL,
            unlocked_abilities: Vec::new(),
            unlocked_arenas: Vec::new(),
            unlocked_titles: Vec::new(),
            skill_points: 0,
        }
    }
}

impl ProgressionState {
    /// Add experience and level up as often as it allows. Returns levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);

        let mut gained = 0;
        while self.experience_to_next_level > 0 && self.experience >= self.experience_to_next_level {
            self.experience -= self.experience_to_next_level;
            self.level += 1;
            self.experience_to_next_level =
                (self.experience_to_next_level as f32 * LEVEL_THRESHOLD_MULTIPLIER).round() as u32;
            self.skill_points += SKILL_POINTS_PER_LEVEL;
            gained += 1;
        }
        gained
    }
}

/// How a tracked combatant's match ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleResult {
    Won,
    Lost,
    Draw,
}

#[derive(Resource, Clone, Debug)]
pub struct ProgressionLedger {
    tracked: CombatantId,
    definitions: Vec<AchievementDefinition>,
    pub statistics: CombatStatistics,
    pub achievements: Vec<AchievementProgress>,
    pub state: ProgressionState,
    /// Set whenever something worth saving changed
    dirty: bool,
}

impl ProgressionLedger {
    pub fn new(tracked: impl Into<CombatantId>, definitions: Vec<AchievementDefinition>) -> Self {
        let achievements = definitions
            .iter()
            .map(|d| AchievementProgress::new(d.id.clone()))
            .collect();
        Self {
            tracked: tracked.into(),
            definitions,
            statistics: CombatStatistics::default(),
            achievements,
            state: ProgressionState::default(),
            dirty: false,
        }
    }

    pub fn tracked(&self) -> &CombatantId {
        &self.tracked
    }

    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.achievements
            .iter()
            .any(|a| a.id == achievement_id && a.unlocked)
    }

    /// Fold one combat event into the statistics
    pub fn observe(&mut self, event: &CombatEvent) {
        let tracked = &self.tracked;
        match &event.kind {
            CombatEventKind::Damage {
                source,
                target,
                amount,
                ..
            } => {
                if source.combatant() == Some(tracked) {
                    self.statistics.damage_dealt += amount;
                }
                if target == tracked {
                    self.statistics.damage_taken += amount;
                }
            }
            CombatEventKind::Transform { source, .. } if source == tracked => {
                self.statistics.transformations += 1;
            }
            CombatEventKind::Ability { source, .. } if source == tracked => {
                self.statistics.special_moves += 1;
            }
            CombatEventKind::Victory { winner } if winner == tracked => {
                self.record_battle(BattleResult::Won);
                return;
            }
            CombatEventKind::Defeat { loser } if loser == tracked => {
                self.record_battle(BattleResult::Lost);
                return;
            }
            _ => return,
        }
        self.dirty = true;
        self.evaluate_achievements();
    }

    /// Count a finished battle and grant its experience
    pub fn record_battle(&mut self, result: BattleResult) {
        let stats = &mut self.statistics;
        stats.battles_fought += 1;
        let experience = match result {
            BattleResult::Won => {
                stats.battles_won += 1;
                stats.current_streak += 1;
                stats.best_streak = stats.best_streak.max(stats.current_streak);
                VICTORY_EXPERIENCE
            }
            BattleResult::Lost => {
                stats.battles_lost += 1;
                stats.current_streak = 0;
                DEFEAT_EXPERIENCE
            }
            BattleResult::Draw => {
                stats.draws += 1;
                stats.current_streak = 0;
                0
            }
        };
        info!("{} recorded a {:?} ({} battles)", self.tracked, result, stats.battles_fought);

        self.dirty = true;
        self.add_experience(experience);
        self.evaluate_achievements();
    }

    /// Grant experience. Returns levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }
        let gained = self.state.add_experience(amount);
        if gained > 0 {
            info!(
                "{} reached level {} ({} skill points)",
                self.tracked, self.state.level, self.state.skill_points
            );
        }
        self.dirty = true;
        gained
    }

    fn metric(&self, metric: AchievementMetric) -> f32 {
        let stats = &self.statistics;
        match metric {
            AchievementMetric::BattlesFought => stats.battles_fought as f32,
            AchievementMetric::BattlesWon => stats.battles_won as f32,
            AchievementMetric::DamageDealt => stats.damage_dealt,
            AchievementMetric::DamageTaken => stats.damage_taken,
            AchievementMetric::Transformations => stats.transformations as f32,
            AchievementMetric::SpecialMoves => stats.special_moves as f32,
            AchievementMetric::BestStreak => stats.best_streak as f32,
            AchievementMetric::Level => self.state.level as f32,
        }
    }

    /// Update progress and unlock anything that reached its requirement.
    ///
    /// Rewards can raise the level, which can unlock more, so this repeats
    /// until nothing new unlocks. Returns the ids unlocked by this call.
    pub fn evaluate_achievements(&mut self) -> Vec<String> {
        let now = unix_now();
        let mut unlocked = Vec::new();

        loop {
            let mut rewards = Vec::new();
            for definition in &self.definitions {
                let current = self.metric(definition.metric);
                let Some(progress) = self.achievements.iter_mut().find(|a| a.id == definition.id) else {
                    continue;
                };
                if progress.unlocked {
                    continue;
                }
                progress.current_progress = current.min(definition.requirement);
                if current >= definition.requirement {
                    progress.unlocked = true;
                    progress.unlocked_at = Some(now);
                    info!("Achievement unlocked: {}", definition.name);
                    unlocked.push(definition.id.clone());
                    rewards.push(definition.reward.clone());
                }
            }

            if rewards.is_empty() {
                break;
            }
            self.dirty = true;
            for reward in rewards {
                self.apply_reward(reward);
            }
        }
        unlocked
    }

    fn apply_reward(&mut self, reward: AchievementReward) {
        let state = &mut self.state;
        match reward {
            AchievementReward::Experience(amount) => {
                self.add_experience(amount);
            }
            AchievementReward::Ability(id) => push_unique(&mut state.unlocked_abilities, id),
            AchievementReward::Title(title) => push_unique(&mut state.unlocked_titles, title),
            AchievementReward::Arena(arena) => push_unique(&mut state.unlocked_arenas, arena),
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            statistics: self.statistics.clone(),
            achievements: self.achievements.clone(),
            progression: self.state.clone(),
            last_save_date: unix_now(),
            version: SNAPSHOT_VERSION,
        }
    }

    /// Replace state with a snapshot's.
    ///
    /// Achievements in the snapshot that no longer have a definition are
    /// dropped; definitions missing from the snapshot start fresh.
    pub fn restore(&mut self, snapshot: ProgressionSnapshot) {
        let mut saved = snapshot.achievements;
        self.achievements = self
            .definitions
            .iter()
            .map(|d| match saved.iter().position(|a| a.id == d.id) {
                Some(index) => saved.swap_remove(index),
                None => AchievementProgress::new(d.id.clone()),
            })
            .collect();
        self.statistics = snapshot.statistics;
        self.state = snapshot.progression;
        self.dirty = false;
    }

    /// Build a ledger from whatever the store holds, falling back to a fresh
    /// one if the save is missing, unreadable, malformed or from another version.
    pub fn load_or_default(
        tracked: impl Into<CombatantId>,
        definitions: Vec<AchievementDefinition>,
        store: &dyn SnapshotStore,
    ) -> Self {
        let mut ledger = Self::new(tracked, definitions);
        match store.read() {
            Ok(Some(contents)) => match ProgressionSnapshot::from_json(&contents) {
                Ok(snapshot) => {
                    ledger.restore(snapshot);
                    info!(
                        "Loaded progression: level {}, {} battles",
                        ledger.state.level, ledger.statistics.battles_fought
                    );
                }
                Err(e) => warn!("{}; starting fresh progression", e),
            },
            Ok(None) => info!("No saved progression, starting fresh"),
            Err(e) => warn!("{}; starting fresh progression", e),
        }
        ledger
    }

    /// Serialize and write synchronously
    pub fn save(&mut self, store: &dyn SnapshotStore) -> Result<(), String> {
        let json = self.snapshot().to_json()?;
        store.write(&json)?;
        self.mark_saved();
        Ok(())
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
