//! Headless mode for automated matches
//!
//! Runs AI-vs-AI matches without any graphical output, suitable for
//! automated testing, balance runs and progression smoke tests.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --headless match.json --output log.json --profile profile.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "combatants": [
//!     { "id": "player", "faction": "Player", "position": [-10, 0, 0],
//!       "abilities": ["plasma_lance", "overdrive"] },
//!     { "id": "brute", "faction": "Enemy", "position": [10, 0, 0],
//!       "abilities": ["shock_net", "field_repair"], "difficulty": 0.8 }
//!   ],
//!   "difficulty": 0.5,
//!   "max_duration_secs": 120,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{CombatantConfig, HeadlessMatchConfig};
pub use runner::{run_headless_match, simulate_match, simulate_match_with_log, CombatantResult, MatchResult};
