//! Combat Constants
//!
//! Centralized location for magic numbers used throughout the combat core.

// ============================================================================
// Ranges
// ============================================================================

/// Maximum distance for a melee basic attack, in world units.
pub const MELEE_RANGE: f32 = 5.0;

/// Maximum distance for a ranged basic attack.
pub const RANGED_ATTACK_RANGE: f32 = 15.0;

/// Arena half-size on X and Z. Positions produced by the AI are clamped to this.
pub const ARENA_HALF_EXTENT: f32 = 40.0;

// ============================================================================
// Damage
// ============================================================================

/// Lower bound of the basic attack random factor.
pub const DAMAGE_RANDOM_MIN: f32 = 0.8;

/// Upper bound of the basic attack random factor.
pub const DAMAGE_RANDOM_MAX: f32 = 1.2;

/// Basic attacks never deal less than this.
pub const MIN_DAMAGE: f32 = 1.0;

// ============================================================================
// Forms
// ============================================================================

/// Speed multiplier while in vehicle form.
pub const VEHICLE_SPEED_MULTIPLIER: f32 = 1.5;

/// Defense multiplier while in vehicle form.
pub const VEHICLE_DEFENSE_MULTIPLIER: f32 = 0.7;

/// Minimum time between two transforms, in milliseconds.
pub const DEFAULT_TRANSFORM_COOLDOWN_MS: u32 = 1000;

// ============================================================================
// Enemy AI
// ============================================================================

/// At or above this health fraction the AI plays aggressively.
pub const AGGRESSIVE_HP_THRESHOLD: f32 = 0.6;

/// Below this health fraction the AI plays defensively.
pub const DEFENSIVE_HP_THRESHOLD: f32 = 0.3;

/// Preferred distance band while fighting at range.
pub const RANGED_BAND_MIN: f32 = 8.0;
pub const RANGED_BAND_MAX: f32 = 12.0;

/// Defensive AI backs off from anything closer than this.
pub const RETREAT_DISTANCE: f32 = 8.0;

/// Defensive AI only fights back when the opponent is closer than this.
pub const DEFENSIVE_ATTACK_DISTANCE: f32 = 4.0;

/// Aggressive AI switches to vehicle form when the target is farther than this.
pub const PURSUIT_TRANSFORM_DISTANCE: f32 = 15.0;

/// Decision interval at difficulty 0, in seconds.
pub const MAX_DECISION_INTERVAL: f32 = 1.5;

/// Decision interval floor, in seconds.
pub const MIN_DECISION_INTERVAL: f32 = 1.0;

// ============================================================================
// Difficulty
// ============================================================================

pub const DEFAULT_DIFFICULTY: f32 = 0.5;
