//! Command-line interface for MechDuel

use clap::Parser;
use std::path::PathBuf;

/// Robot duel combat simulator
#[derive(Parser, Debug)]
#[command(name = "mechduel")]
#[command(about = "Robot duel combat simulator")]
#[command(version)]
pub struct Args {
    /// Run a headless match with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the match log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum match duration in seconds (overrides the config file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Progression profile to load and save
    #[arg(long, value_name = "PROFILE_PATH")]
    pub profile: Option<PathBuf>,

    /// Run the match as a plain fixed-step simulation and print a summary
    #[arg(long)]
    pub simulate: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_flags_parse() {
        let args = Args::try_parse_from([
            "mechduel",
            "--headless",
            "match.json",
            "--max-duration",
            "60",
            "--profile",
            "profile.json",
        ])
        .expect("arguments should parse");

        assert_eq!(args.headless, Some(PathBuf::from("match.json")));
        assert_eq!(args.max_duration, Some(60.0));
        assert_eq!(args.profile, Some(PathBuf::from("profile.json")));
        assert!(!args.simulate);
    }
}
