//! Behaviour classification and movement math for the enemy AI.

use bevy::prelude::*;

use crate::combat::constants::{
    AGGRESSIVE_HP_THRESHOLD, ARENA_HALF_EXTENT, DEFENSIVE_HP_THRESHOLD, MAX_DECISION_INTERVAL,
    MIN_DECISION_INTERVAL,
};

/// Stance picked from the AI's own health fraction each decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
    /// Health >= 60%: close in and fight in melee
    Aggressive,
    /// 30% to 60%: hold the ranged band and shoot
    Ranged,
    /// Below 30%: back off, only fight when cornered
    Defensive,
}

impl Behavior {
    pub fn classify(health_pct: f32) -> Self {
        if health_pct >= AGGRESSIVE_HP_THRESHOLD {
            Behavior::Aggressive
        } else if health_pct >= DEFENSIVE_HP_THRESHOLD {
            Behavior::Ranged
        } else {
            Behavior::Defensive
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Aggressive => "aggressive",
            Behavior::Ranged => "ranged",
            Behavior::Defensive => "defensive",
        }
    }
}

/// Seconds between decisions. Higher difficulty decides faster, never below the floor.
pub fn decision_interval(difficulty: f32) -> f32 {
    (MAX_DECISION_INTERVAL - difficulty.clamp(0.0, 1.0)).max(MIN_DECISION_INTERVAL)
}

/// Keep a position inside the arena on X and Z
pub fn clamp_to_arena(position: Vec3) -> Vec3 {
    Vec3::new(
        position.x.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
        position.y,
        position.z.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT),
    )
}

/// Position after moving from `from` along the line to `anchor` so that the
/// distance to `anchor` approaches `desired`, travelling at most `max_step`.
///
/// Movement is on the XZ plane. Returns `None` when already at the desired
/// distance or unable to move.
pub fn step_to_distance(from: Vec3, anchor: Vec3, desired: f32, max_step: f32) -> Option<Vec3> {
    if max_step <= 0.0 {
        return None;
    }

    let mut offset = from - anchor;
    offset.y = 0.0;
    let current = offset.length();
    let gap = current - desired;
    if gap.abs() < 0.05 {
        return None;
    }

    // Standing on top of the anchor: pick an arbitrary direction to back off along.
    let away = if current > f32::EPSILON { offset / current } else { Vec3::X };
    let travel = gap.abs().min(max_step);
    let moved = if gap > 0.0 {
        from - away * travel
    } else {
        from + away * travel
    };

    let clamped = clamp_to_arena(moved);
    (clamped.distance_squared(from) > f32::EPSILON).then_some(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(Behavior::classify(1.0), Behavior::Aggressive);
        assert_eq!(Behavior::classify(0.6), Behavior::Aggressive);
        assert_eq!(Behavior::classify(0.59), Behavior::Ranged);
        assert_eq!(Behavior::classify(0.3), Behavior::Ranged);
        assert_eq!(Behavior::classify(0.29), Behavior::Defensive);
        assert_eq!(Behavior::classify(0.0), Behavior::Defensive);
    }

    #[test]
    fn test_decision_interval_floor() {
        assert_eq!(decision_interval(0.5), 1.0, "Default difficulty decides once per second");
        assert_eq!(decision_interval(1.0), 1.0);
        assert_eq!(decision_interval(0.0), 1.5);
        assert!(decision_interval(0.2) > decision_interval(0.4));
    }

    #[test]
    fn test_step_closes_without_overshooting() {
        let moved = step_to_distance(Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO, 4.0, 100.0)
            .expect("should move");
        assert!((moved.x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_is_limited_by_speed() {
        let moved = step_to_distance(Vec3::new(20.0, 0.0, 0.0), Vec3::ZERO, 4.0, 5.0)
            .expect("should move");
        assert!((moved.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_backs_away() {
        let moved = step_to_distance(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, 8.0, 10.0)
            .expect("should move");
        assert!((moved.z - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_clamps_to_arena() {
        let moved = step_to_distance(Vec3::new(39.0, 0.0, 0.0), Vec3::new(30.0, 0.0, 0.0), 20.0, 50.0)
            .expect("should move");
        assert_eq!(moved.x, ARENA_HALF_EXTENT);
    }

    #[test]
    fn test_no_step_when_in_position() {
        assert!(step_to_distance(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 10.0, 5.0).is_none());
    }
}
