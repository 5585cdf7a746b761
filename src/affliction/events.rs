//! Gilding events
//!
//! Notifications emitted when a target is gilded or released, plus the
//! round/contact inputs that drive the ability.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Fired when a target receives a fresh gilding record.
#[derive(Event, Debug, Clone)]
pub struct AfflictionApplied {
    /// Holder whose trigger caused the gilding
    pub source: Entity,
    /// Entity that was gilded
    pub target: Entity,
    /// Countdown length recorded for the target, in seconds
    pub duration: f32,
    /// Whether the countdown started immediately
    pub armed: bool,
}

/// Fired when a target's gilding record is deleted.
#[derive(Event, Debug, Clone)]
pub struct AfflictionRemoved {
    pub target: Entity,
    pub reason: RemovalReason,
}

/// Why a gilding record went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Countdown reached its deadline
    Expired,
    /// Round teardown released everything
    RoundEnded,
    /// The target entity no longer exists
    Despawned,
}

/// Whether two bodies started or stopped touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    Began,
    Ended,
}

/// Contact between a holder and another entity, from the physics collaborator.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContactEvent {
    /// Entity carrying the ability
    pub holder: Entity,
    /// Entity it touched
    pub other: Entity,
    pub phase: ContactPhase,
}

/// Starts a round for every ability holder.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RoundStarted;

/// Ends the round: releases every gilded target and uninstalls triggers.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RoundEnded;
