//! Command-line interface for the headless gilding runner

use clap::Parser;
use std::path::PathBuf;

use crate::headless::ScenarioConfig;

/// Gold affliction scenario runner
#[derive(Parser, Debug)]
#[command(name = "gilding")]
#[command(about = "Runs gold affliction scenarios headlessly")]
#[command(version)]
pub struct Args {
    /// JSON scenario file to run
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: PathBuf,

    /// Output path for the affliction log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Override the scenario's tick count
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Override the scenario's ticks per second
    #[arg(long)]
    pub tick_rate: Option<f32>,

    /// RON settings file (default: assets/config/gilding.ron)
    #[arg(long, value_name = "SETTINGS_FILE")]
    pub settings: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of a loaded scenario.
    pub fn apply_overrides(&self, config: &mut ScenarioConfig) {
        if let Some(output) = &self.output {
            config.output_path = Some(output.display().to_string());
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate = tick_rate;
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
