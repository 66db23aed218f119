//! MechDuel - combat resolution core for a transforming robot battle game
//!
//! Real-time combat between robots that can shift into vehicle form: a
//! deterministic resolver, a utility-style enemy AI, persistent progression
//! with achievements, and a headless runner for AI-vs-AI matches.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod ai;
pub mod cli;
pub mod combat;
pub mod headless;
pub mod progression;
pub mod settings;

// Re-export commonly used types
pub use combat::action::{ActionKind, CombatAction};
pub use combat::combatant::Participant;
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::resolver::{CombatPhase, CombatResolver, MatchOutcome};
pub use combat::stats::{CombatantId, CombatantStats, Faction};
pub use headless::HeadlessMatchConfig;
pub use settings::CombatConfig;
