//! Ability Configuration
//!
//! Per-holder parameters chosen at round start. Read-only once the round is
//! running: changing a holder's config only takes effect at the next
//! `RoundStarted`.
//!
//! ## Example (RON)
//! ```ron
//! (
//!     radius: 50.0,
//!     durations: (character: 5.0, object: 30.0),
//!     trigger: ProximityScan,
//!     scan_arming: OnDecay,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::affliction::constants::*;
use crate::affliction::target::Target;

fn default_radius() -> f32 {
    BASE_SCAN_RADIUS
}

fn default_eye_offset_factor() -> f32 {
    EYE_OFFSET_FACTOR
}

/// Which front-end feeds the affliction core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Scan a radius around the holder every tick
    #[default]
    ProximityScan,
    /// React to begin/end touching events
    Contact,
}

/// When the proximity scan starts a target's countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanArming {
    /// Never from the scan: the target's own tick arms it the first tick it
    /// is no longer in range.
    #[default]
    OnDecay,
    /// Arm on first sighting and restart the countdown on every scan.
    OnScan,
}

/// Countdown lengths by target kind, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GildDurations {
    pub character: f32,
    pub object: f32,
}

impl Default for GildDurations {
    fn default() -> Self {
        Self {
            character: CHARACTER_GILD_DURATION,
            object: OBJECT_GILD_DURATION,
        }
    }
}

impl GildDurations {
    pub fn for_target(&self, target: &Target) -> f32 {
        if target.is_character() {
            self.character
        } else {
            self.object
        }
    }
}

/// Complete per-holder configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// Scan radius before the holder's scale is applied
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Fraction of the eye offset added to the holder position for the scan centre
    #[serde(default = "default_eye_offset_factor")]
    pub eye_offset_factor: f32,
    #[serde(default)]
    pub durations: GildDurations,
    #[serde(default)]
    pub trigger: TriggerKind,
    #[serde(default)]
    pub scan_arming: ScanArming,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            radius: BASE_SCAN_RADIUS,
            eye_offset_factor: EYE_OFFSET_FACTOR,
            durations: GildDurations::default(),
            trigger: TriggerKind::default(),
            scan_arming: ScanArming::default(),
        }
    }
}

impl AbilityConfig {
    /// Contact-triggered ability with default timings
    pub fn contact() -> Self {
        Self {
            trigger: TriggerKind::Contact,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.radius > 0.0) {
            return Err(format!("radius must be positive, got {}", self.radius));
        }
        if self.eye_offset_factor < 0.0 {
            return Err(format!(
                "eye_offset_factor must not be negative, got {}",
                self.eye_offset_factor
            ));
        }
        if !(self.durations.character > 0.0) || !(self.durations.object > 0.0) {
            return Err(format!(
                "durations must be positive, got character {} / object {}",
                self.durations.character, self.durations.object
            ));
        }
        Ok(())
    }
}
