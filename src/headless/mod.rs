//! Headless mode for scripted gilding scenarios
//!
//! Runs a gilding round without any graphical output, suitable for automated
//! testing and tuning.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- --scenario scenario.json --output gilding_log.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "holders": [
//!     { "name": "midas", "position": [0, 0, 0] },
//!     { "name": "hand", "position": [500, 0, 0], "ability": { "trigger": "Contact" } }
//!   ],
//!   "targets": [
//!     { "name": "runner", "position": [30, 0, 0], "viewer": 1, "speed_multiplier": 1.0, "parts": 2 },
//!     { "name": "vase", "position": [200, 0, 0] }
//!   ],
//!   "scatter": { "count": 12, "radius": 80, "seed": 7 },
//!   "contacts": [ { "tick": 5, "holder": "hand", "target": "vase", "phase": "Began" } ],
//!   "ticks": 120,
//!   "tick_rate": 10
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{ContactSpec, HolderSpec, ScatterSpec, ScenarioConfig, TargetSpec};
pub use runner::{
    build_scenario_app, run_headless_scenario, run_scenario_app, HeadlessPlugin, ScenarioResult, TargetResult,
    Velocity,
};
