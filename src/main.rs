//! Gilding - headless runner for the gold affliction
//!
//! Loads a JSON scenario and the RON settings, then steps the round at a
//! fixed tick rate and prints what ended up gilded.

use std::process::ExitCode;

use gilding::cli;
use gilding::headless::{run_headless_scenario, ScenarioConfig};
use gilding::settings::GildingSettings;

fn main() -> ExitCode {
    let args = cli::parse_args();

    let settings = match &args.settings {
        Some(path) => match GildingSettings::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => GildingSettings::load_or_default(&GildingSettings::settings_path()),
    };

    let mut config = match ScenarioConfig::load_from_file(&args.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid scenario {}: {}", args.scenario.display(), e);
            return ExitCode::FAILURE;
        }
    };
    args.apply_overrides(&mut config);

    match run_headless_scenario(config, settings) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Scenario failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
