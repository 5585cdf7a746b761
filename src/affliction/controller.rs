//! Affliction Controller
//!
//! The only writer of `AfflictionState`. Every trigger strategy and the
//! per-target tick go through these operations:
//!
//! - `apply`: create/activate a record, capture the speed baseline once
//! - `refresh`: push the deadline out and arm the countdown
//! - `disarm`: stop the countdown, keep the record
//! - `hold_contact` / `release_contact`: per-holder contact holds
//! - `sustain`: a scan re-observed the target; hold it without arming
//! - `expire_if_due` / `tick`: per-target countdown evaluation
//! - `remove`: clear visuals, restore speed additively, delete the record
//!
//! `refresh` and `apply` are kept apart because re-triggering an active target
//! must never re-capture the baseline. Restoration adds the difference between
//! the baseline and the penalty instead of setting an absolute value, so speed
//! changes made by other systems while gilded are preserved.

use bevy::prelude::*;

use super::state::{AfflictionRegistry, AfflictionState};
use super::target::Target;
use crate::visual::{ViewCommand, VisualSync};

/// Result of an `apply` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new record was created.
    Created,
    /// The target already had a record; it was re-activated in place.
    Existing,
}

/// What the per-target tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing changed (held, still counting, or no record).
    Idle,
    /// A scan hold lapsed and the countdown started.
    Armed { expires_at: f32 },
    /// The countdown reached its deadline and the record was removed.
    Expired(AfflictionState),
}

pub struct AfflictionController<'a, V: VisualSync> {
    registry: &'a mut AfflictionRegistry,
    visuals: &'a mut V,
    speed_penalty: f32,
}

impl<'a, V: VisualSync> AfflictionController<'a, V> {
    pub fn new(registry: &'a mut AfflictionRegistry, visuals: &'a mut V, speed_penalty: f32) -> Self {
        Self {
            registry,
            visuals,
            speed_penalty,
        }
    }

    pub fn state(&self, target: Entity) -> Option<&AfflictionState> {
        self.registry.get(target)
    }

    pub fn is_afflicted(&self, target: Entity) -> bool {
        self.registry.contains(target)
    }

    /// Gild `target`. Creates the record if needed, captures the speed baseline
    /// on the first activation of the episode, and (re)applies the override to
    /// the target and every current sub-object.
    pub fn apply(&mut self, target: &mut Target, duration: f32, arm: bool, now: f32) -> Applied {
        let entity = target.entity;
        let penalty = self.speed_penalty;
        let (state, created) = self.registry.entry(entity, duration);
        let was_active = state.active;
        state.active = true;

        if let Some(movement) = target.movement_control() {
            if state.saved_speed_multiplier.is_none() {
                state.saved_speed_multiplier = Some(movement.speed_multiplier);
                movement.speed_multiplier = penalty;
            } else {
                debug!("{:?} already has a saved speed baseline, skipping capture", entity);
            }
        }

        if arm {
            state.arm(now, duration);
        } else {
            state.timer_duration = duration;
            state.disarm();
        }

        self.visuals.apply_override(entity, target.parts);
        if !was_active {
            if let Some(character) = target.as_character() {
                self.visuals
                    .notify_viewer(character.viewer, ViewCommand::ApplyViewOverride);
            }
        }

        if created {
            Applied::Created
        } else {
            Applied::Existing
        }
    }

    /// Restart the countdown at `now + duration` and make sure it is armed.
    /// Returns `false` if the target has no record.
    pub fn refresh(&mut self, target: Entity, duration: f32, now: f32) -> bool {
        let Some(state) = self.registry.get_mut(target) else {
            return false;
        };
        state.arm(now, duration);
        true
    }

    /// Stop any running countdown while keeping the record.
    pub fn disarm(&mut self, target: Entity) -> bool {
        let Some(state) = self.registry.get_mut(target) else {
            return false;
        };
        state.disarm();
        true
    }

    /// `holder` started touching the target: stop the countdown and hold the
    /// record until that holder lets go.
    pub fn hold_contact(&mut self, target: Entity, holder: Entity) -> bool {
        let Some(state) = self.registry.get_mut(target) else {
            return false;
        };
        state.disarm();
        state.hold.add_contact(holder);
        true
    }

    /// `holder` let go of the target. Refreshes the countdown once nothing
    /// else holds the record. Returns `None` without a record, otherwise
    /// whether the countdown was armed.
    pub fn release_contact(&mut self, target: Entity, holder: Entity, duration: f32, now: f32) -> Option<bool> {
        let state = self.registry.get_mut(target)?;
        state.hold.release_contact(holder);
        state.timer_duration = duration;
        if !state.hold.is_free() {
            return Some(false);
        }
        Some(self.refresh(target, duration, now))
    }

    /// Drop contact holds from holders that are gone, arming the countdown if
    /// that left the record unheld. Returns whether it armed.
    pub fn drop_stale_contacts(&mut self, target: Entity, now: f32, is_live: impl Fn(Entity) -> bool) -> bool {
        let Some(state) = self.registry.get_mut(target) else {
            return false;
        };
        let before = state.hold.contacts.len();
        state.hold.contacts.retain(|holder| is_live(*holder));
        if state.hold.contacts.len() == before || !state.hold.is_free() || state.timer_armed {
            return false;
        }
        let duration = state.timer_duration;
        state.arm(now, duration);
        true
    }

    /// Whether any contact holder is still touching `target`.
    pub fn held_by_contact(&self, target: Entity) -> bool {
        self.registry
            .get(target)
            .is_some_and(|state| state.hold.by_contact())
    }

    /// A scan re-observed `target`: record the countdown length it should use
    /// once released, and keep it disarmed while it stays in range. Contact
    /// holds are left alone.
    pub fn sustain(&mut self, target: Entity, duration: f32) -> bool {
        let Some(state) = self.registry.get_mut(target) else {
            return false;
        };
        state.timer_duration = duration;
        state.disarm();
        state.hold.scan = Some(true);
        true
    }

    /// Remove the record if its armed countdown has run out.
    pub fn expire_if_due(&mut self, target: &mut Target, now: f32) -> Option<AfflictionState> {
        let due = self
            .registry
            .get(target.entity)
            .is_some_and(|state| state.is_due(now));
        if due {
            self.remove(target)
        } else {
            None
        }
    }

    /// Per-target tick: lapse scan holds into a countdown, then evaluate expiry.
    pub fn tick(&mut self, target: &mut Target, now: f32) -> TickOutcome {
        let Some(state) = self.registry.get_mut(target.entity) else {
            return TickOutcome::Idle;
        };

        let mut armed_at = None;
        match state.hold.scan {
            Some(true) => state.hold.scan = Some(false),
            Some(false) => {
                state.hold.scan = None;
                // contact holds outlive the scan
                if state.hold.is_free() && !state.timer_armed {
                    let duration = state.timer_duration;
                    state.arm(now, duration);
                    armed_at = state.expires_at;
                }
            }
            None => {}
        }

        if let Some(removed) = self.expire_if_due(target, now) {
            return TickOutcome::Expired(removed);
        }
        match armed_at {
            Some(expires_at) => TickOutcome::Armed { expires_at },
            None => TickOutcome::Idle,
        }
    }

    /// Clear the override, restore speed and delete the record.
    /// Calling this on a target without a record does nothing.
    pub fn remove(&mut self, target: &mut Target) -> Option<AfflictionState> {
        let entity = target.entity;
        let state = self.registry.take(entity)?;

        self.visuals.clear_override(entity, target.parts);
        if let Some(character) = target.as_character() {
            self.visuals
                .notify_viewer(character.viewer, ViewCommand::ClearViewOverride);
        }

        if let (Some(saved), Some(movement)) = (state.saved_speed_multiplier, target.movement_control()) {
            movement.speed_multiplier += saved - self.speed_penalty;
        }

        Some(state)
    }

    /// Forget the record of a target that no longer exists. Nothing is restored.
    pub fn forget(&mut self, target: Entity) -> Option<AfflictionState> {
        self.registry.take(target)
    }
}
