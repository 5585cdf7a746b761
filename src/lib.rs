//! Gilding - a gold affliction status effect for Bevy
//!
//! A holder's ability turns nearby or touched entities to gold: visually
//! overridden, slowed if they can move, and released again after a countdown.
//!
//! This library exposes the affliction core, the trigger strategies and the
//! headless runner for testing and reuse.

pub mod ability;
pub mod affliction;
pub mod cli;
pub mod headless;
pub mod settings;
pub mod systems;
pub mod trigger;
pub mod visual;

// Re-export commonly used types
pub use ability::{AbilityConfig, AbilityHolder, EyeOffset};
pub use affliction::{AfflictionController, AfflictionLog, AfflictionLogEventType, AfflictionRegistry, AfflictionState};
pub use headless::ScenarioConfig;
pub use settings::GildingSettings;
pub use systems::{GildingPhase, GildingPlugin};
