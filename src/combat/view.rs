//! Read-only query surface over a running combat.
//!
//! Decision makers (the enemy AI, UI pre-checks) see combat only through
//! this trait. They can look but every change still goes through the
//! resolver's command queue.

use super::abilities::AbilityInfo;
use super::combatant::CombatantState;
use super::resolver::CombatResolver;
use super::stats::CombatantId;

pub trait CombatView {
    fn participant(&self, id: &CombatantId) -> Option<&CombatantState>;

    fn participants(&self) -> &[CombatantState];

    /// Match clock in milliseconds
    fn now_ms(&self) -> f64;

    fn ability(&self, ability_id: &str) -> Option<&AbilityInfo>;

    /// Basic attack cooldown for `id` after slows
    fn attack_cooldown_ms(&self, id: &CombatantId) -> f64;

    fn can_transform(&self, id: &CombatantId) -> bool;

    /// Whether `id` could pay for and use `ability_id` right now
    fn ability_ready(&self, id: &CombatantId, ability_id: &str) -> bool {
        let (Some(combatant), Some(ability)) = (self.participant(id), self.ability(ability_id)) else {
            return false;
        };
        combatant.knows_ability(ability_id)
            && !combatant.cooldowns.is_on_cooldown(ability_id, self.now_ms())
            && combatant.stats.energy >= ability.energy_cost
    }

    /// Whether a basic attack from `id` would clear the attack cooldown
    fn attack_ready(&self, id: &CombatantId) -> bool {
        self.participant(id).is_some_and(|c| {
            c.cooldowns
                .attack_ready(self.now_ms(), self.attack_cooldown_ms(id))
        })
    }
}

impl CombatView for CombatResolver {
    fn participant(&self, id: &CombatantId) -> Option<&CombatantState> {
        CombatResolver::participant(self, id)
    }

    fn participants(&self) -> &[CombatantState] {
        CombatResolver::participants(self)
    }

    fn now_ms(&self) -> f64 {
        CombatResolver::now_ms(self)
    }

    fn ability(&self, ability_id: &str) -> Option<&AbilityInfo> {
        CombatResolver::ability(self, ability_id)
    }

    fn attack_cooldown_ms(&self, id: &CombatantId) -> f64 {
        CombatResolver::attack_cooldown_ms(self, id)
    }

    fn can_transform(&self, id: &CombatantId) -> bool {
        CombatResolver::can_transform(self, id)
    }
}
