//! Gilding Constants
//!
//! Default tuning for the gold affliction. Every value here can be overridden
//! through `GildingSettings` / `AbilityConfig`; these are the shipped defaults.

// ============================================================================
// Movement
// ============================================================================

/// Speed multiplier forced onto a gilded target that can move.
/// Restoration adds `baseline - GILDED_SPEED_MULTIPLIER` back on removal.
pub const GILDED_SPEED_MULTIPLIER: f32 = 0.15;

// ============================================================================
// Timers
// ============================================================================

/// Countdown for character targets, in seconds of simulated time.
pub const CHARACTER_GILD_DURATION: f32 = 5.0;

/// Countdown for everything that is not a character (props, items, debris).
pub const OBJECT_GILD_DURATION: f32 = 30.0;

// ============================================================================
// Proximity scan
// ============================================================================

/// Scan radius before the holder's scale is applied.
pub const BASE_SCAN_RADIUS: f32 = 50.0;

/// Fraction of the holder's eye offset added to its position to get the scan centre.
pub const EYE_OFFSET_FACTOR: f32 = 0.5;

/// Eye offset used for holders that carry no `EyeOffset` component.
pub const DEFAULT_EYE_HEIGHT: f32 = 64.0;
