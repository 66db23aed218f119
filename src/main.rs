//! MechDuel - robot duel combat simulator
//!
//! Runs AI-vs-AI matches from a JSON config, either hosted in a headless
//! bevy app or as a plain fixed-step simulation.

use std::path::Path;
use std::process::ExitCode;

use mechduel::cli;
use mechduel::headless::{run_headless_match, simulate_match_with_log, HeadlessMatchConfig};

fn main() -> ExitCode {
    let args = cli::parse_args();

    let Some(config_path) = args.headless else {
        eprintln!("Nothing to do: pass --headless <CONFIG_FILE> (see --help)");
        return ExitCode::FAILURE;
    };

    let mut config = match HeadlessMatchConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid match config {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(output) = args.output {
        config.output_path = Some(output.display().to_string());
    }

    let outcome = if args.simulate {
        run_simulation(&config)
    } else {
        run_headless_match(config, args.profile)
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_simulation(config: &HeadlessMatchConfig) -> Result<(), String> {
    config.validate()?;
    let (result, combat_log) = simulate_match_with_log(config);

    match result.winner {
        Some(faction) if !result.timed_out => {
            println!("{} wins after {:.1}s", faction.name(), result.match_time)
        }
        _ => println!("Draw after {:.1}s", result.match_time),
    }
    for combatant in &result.combatants {
        println!(
            "  {:<12} {:>5.0}/{:<5.0} hp  dealt {:>6.0}  taken {:>6.0}",
            combatant.id,
            combatant.final_health,
            combatant.max_health,
            combatant.damage_dealt,
            combatant.damage_taken
        );
    }

    if let Some(path) = &config.output_path {
        let saved = combat_log.save_to_file(&result.metadata(), Some(Path::new(path)))?;
        println!("Log saved to: {}", saved);
    }
    Ok(())
}
