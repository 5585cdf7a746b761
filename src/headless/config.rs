//! JSON configuration parsing for headless mode
//!
//! A scenario lists ability holders, gildable targets, an optional seeded
//! scatter of props and scripted contacts, then runs for a fixed number of
//! ticks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::ability::config::AbilityConfig;
use crate::affliction::events::ContactPhase;

/// Headless scenario loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Entities carrying the ability
    pub holders: Vec<HolderSpec>,
    /// Named gildable targets
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    /// Randomly placed props around the origin
    #[serde(default)]
    pub scatter: Option<ScatterSpec>,
    /// Contact begin/end events injected at given ticks
    #[serde(default)]
    pub contacts: Vec<ContactSpec>,
    /// Number of fixed ticks to simulate (default: 600)
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Ticks per simulated second (default: 10)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f32,
    /// Release everything with a round end after the last tick
    #[serde(default)]
    pub end_round: bool,
    /// Custom output path for the affliction log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

/// One ability holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderSpec {
    pub name: String,
    pub position: [f32; 3],
    /// Units per second
    #[serde(default)]
    pub velocity: [f32; 3],
    /// Uniform model scale; grows both the scan radius and the eye offset
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Eye height above the holder's origin, if not the default
    #[serde(default)]
    pub eye_height: Option<f32>,
    /// Per-holder ability config; the settings file's ability is used otherwise
    #[serde(default)]
    pub ability: Option<AbilityConfig>,
}

/// One named gildable target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    /// Viewer controlling this target; makes it a character
    #[serde(default)]
    pub viewer: Option<u32>,
    /// Starting speed multiplier; targets without one cannot move
    #[serde(default)]
    pub speed_multiplier: Option<f32>,
    /// Number of visual sub-objects
    #[serde(default)]
    pub parts: u32,
}

/// Seeded scatter of unnamed props
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScatterSpec {
    pub count: u32,
    /// Props land uniformly inside this disc around the origin
    pub radius: f32,
    pub seed: u64,
}

/// A scripted contact between a holder and a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSpec {
    /// Tick index (0-based) at which the event is delivered
    pub tick: u32,
    pub holder: String,
    pub target: String,
    pub phase: ContactPhase,
}

fn default_ticks() -> u32 {
    600
}

fn default_tick_rate() -> f32 {
    10.0
}

fn default_scale() -> f32 {
    1.0
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read scenario file: {}", e))?;

        let config: ScenarioConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.holders.is_empty() {
            return Err("scenario needs at least one holder".to_string());
        }
        if self.ticks == 0 {
            return Err("ticks must be positive".to_string());
        }
        if !(self.tick_rate > 0.0) {
            return Err("tick_rate must be positive".to_string());
        }

        let mut names = HashSet::new();
        for name in self
            .holders
            .iter()
            .map(|h| &h.name)
            .chain(self.targets.iter().map(|t| &t.name))
        {
            if !names.insert(name.as_str()) {
                return Err(format!("Duplicate entity name: '{}'", name));
            }
        }

        for holder in &self.holders {
            if !(holder.scale > 0.0) {
                return Err(format!("holder '{}' must have a positive scale", holder.name));
            }
            if let Some(ability) = &holder.ability {
                ability
                    .validate()
                    .map_err(|e| format!("holder '{}': {}", holder.name, e))?;
            }
        }

        for target in &self.targets {
            if let Some(speed) = target.speed_multiplier {
                if speed < 0.0 {
                    return Err(format!(
                        "target '{}' has a negative speed_multiplier",
                        target.name
                    ));
                }
            }
        }

        if let Some(scatter) = &self.scatter {
            if scatter.radius < 0.0 {
                return Err("scatter radius must not be negative".to_string());
            }
        }

        for contact in &self.contacts {
            if !self.holders.iter().any(|h| h.name == contact.holder) {
                return Err(format!("contact names unknown holder '{}'", contact.holder));
            }
            if !names.contains(contact.target.as_str()) {
                return Err(format!("contact names unknown target '{}'", contact.target));
            }
            if contact.tick >= self.ticks {
                return Err(format!(
                    "contact at tick {} is past the last tick ({})",
                    contact.tick,
                    self.ticks - 1
                ));
            }
        }

        Ok(())
    }

    /// Seconds simulated per tick
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ScenarioConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_fill_in() {
        let config = parse(r#"{ "holders": [ { "name": "midas", "position": [0, 0, 0] } ] }"#);
        assert_eq!(config.ticks, 600);
        assert_eq!(config.tick_rate, 10.0);
        assert_eq!(config.holders[0].scale, 1.0);
        assert!(config.holders[0].ability.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_contact_target_rejected() {
        let config = parse(
            r#"{
                "holders": [ { "name": "midas", "position": [0, 0, 0] } ],
                "contacts": [ { "tick": 1, "holder": "midas", "target": "ghost", "phase": "Began" } ]
            }"#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.contains("ghost"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = parse(
            r#"{
                "holders": [ { "name": "midas", "position": [0, 0, 0] } ],
                "targets": [ { "name": "midas", "position": [1, 0, 0] } ]
            }"#,
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_contact_past_last_tick_rejected() {
        let config = parse(
            r#"{
                "holders": [ { "name": "midas", "position": [0, 0, 0] } ],
                "targets": [ { "name": "vase", "position": [1, 0, 0] } ],
                "contacts": [ { "tick": 10, "holder": "midas", "target": "vase", "phase": "Ended" } ],
                "ticks": 10
            }"#,
        );
        assert!(config.validate().is_err());
    }
}
