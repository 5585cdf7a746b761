//! Gilding settings
//!
//! Global tuning loaded from `assets/config/gilding.ron`. The default ability
//! config here is what holders get when a scenario does not give them one.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ability::config::AbilityConfig;
use crate::affliction::constants::GILDED_SPEED_MULTIPLIER;

fn default_speed_penalty() -> f32 {
    GILDED_SPEED_MULTIPLIER
}

/// Global gilding tuning
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GildingSettings {
    /// Speed multiplier forced onto gilded targets that can move
    #[serde(default = "default_speed_penalty")]
    pub speed_penalty: f32,
    /// Ability config for holders that do not bring their own
    #[serde(default)]
    pub ability: AbilityConfig,
}

impl Default for GildingSettings {
    fn default() -> Self {
        Self {
            speed_penalty: GILDED_SPEED_MULTIPLIER,
            ability: AbilityConfig::default(),
        }
    }
}

impl GildingSettings {
    /// Default location of the settings file
    pub fn settings_path() -> PathBuf {
        PathBuf::from("assets/config/gilding.ron")
    }

    /// Load and validate settings from a RON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        let settings: GildingSettings = ron::from_str(&contents)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or return defaults if it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(settings) => {
                info!("Loaded gilding settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        info!("Saved gilding settings to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.speed_penalty >= 0.0) {
            return Err(format!(
                "speed_penalty must not be negative, got {}",
                self.speed_penalty
            ));
        }
        self.ability.validate()
    }
}
