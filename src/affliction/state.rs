//! Affliction State & Registry
//!
//! `AfflictionState` is the per-target record of an ongoing gilding episode.
//! `AfflictionRegistry` owns every live record, keyed by target entity. The
//! existence of a record *is* the active/pending state: removal deletes it and
//! nothing is retained afterwards.

use std::collections::BTreeMap;

use bevy::prelude::*;
use smallvec::SmallVec;

/// What is currently keeping a disarmed timer from counting down.
///
/// Contact and scan holds are tracked side by side so that one trigger never
/// releases a hold another trigger placed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hold {
    /// Contact holders still touching the target.
    pub contacts: SmallVec<[Entity; 2]>,
    /// Proximity scan hold. `Some(true)` is set by each scan and lowered to
    /// `Some(false)` by the target's own tick; an unseen scan hold lapses.
    pub scan: Option<bool>,
}

impl Hold {
    /// Nothing holds the record; it only expires if something arms it.
    pub fn is_free(&self) -> bool {
        self.contacts.is_empty() && self.scan.is_none()
    }

    pub fn by_contact(&self) -> bool {
        !self.contacts.is_empty()
    }

    pub(crate) fn add_contact(&mut self, holder: Entity) {
        if !self.contacts.contains(&holder) {
            self.contacts.push(holder);
        }
    }

    /// Returns whether `holder` was touching.
    pub(crate) fn release_contact(&mut self, holder: Entity) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|h| *h != holder);
        self.contacts.len() != before
    }
}

/// Per-target gilding record.
#[derive(Debug, Clone, PartialEq)]
pub struct AfflictionState {
    /// Visual override currently applied.
    pub active: bool,
    /// Whether an expiry countdown is running.
    pub timer_armed: bool,
    /// Deadline in simulated seconds. Only meaningful while `timer_armed`.
    pub expires_at: Option<f32>,
    /// Countdown length recorded by the last apply/refresh/sustain.
    pub timer_duration: f32,
    /// Speed multiplier to restore on removal. Captured once per episode.
    pub saved_speed_multiplier: Option<f32>,
    /// Contact and scan holds keeping the countdown disarmed.
    pub hold: Hold,
}

impl AfflictionState {
    pub(crate) fn new(timer_duration: f32) -> Self {
        Self {
            active: false,
            timer_armed: false,
            expires_at: None,
            timer_duration,
            saved_speed_multiplier: None,
            hold: Hold::default(),
        }
    }

    /// Start (or restart) the countdown from `now`.
    pub(crate) fn arm(&mut self, now: f32, duration: f32) {
        self.timer_duration = duration;
        self.timer_armed = true;
        self.expires_at = Some(now + duration);
    }

    pub(crate) fn disarm(&mut self) {
        self.timer_armed = false;
        self.expires_at = None;
    }

    /// True once an armed countdown has reached its deadline.
    pub fn is_due(&self, now: f32) -> bool {
        self.timer_armed && self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Seconds left on an armed countdown, `None` while disarmed.
    pub fn remaining(&self, now: f32) -> Option<f32> {
        if !self.timer_armed {
            return None;
        }
        self.expires_at.map(|deadline| (deadline - now).max(0.0))
    }
}

/// Every live gilding record, keyed by target.
///
/// Ordered by entity so the once-per-tick sweep and the affliction log are
/// deterministic across runs.
#[derive(Resource, Debug, Default)]
pub struct AfflictionRegistry {
    states: BTreeMap<Entity, AfflictionState>,
}

impl AfflictionRegistry {
    pub fn get(&self, target: Entity) -> Option<&AfflictionState> {
        self.states.get(&target)
    }

    pub(crate) fn get_mut(&mut self, target: Entity) -> Option<&mut AfflictionState> {
        self.states.get_mut(&target)
    }

    /// Fetch the record for `target`, creating an empty one if missing.
    /// Returns whether the record was created.
    pub(crate) fn entry(&mut self, target: Entity, timer_duration: f32) -> (&mut AfflictionState, bool) {
        let created = !self.states.contains_key(&target);
        let state = self
            .states
            .entry(target)
            .or_insert_with(|| AfflictionState::new(timer_duration));
        (state, created)
    }

    pub(crate) fn take(&mut self, target: Entity) -> Option<AfflictionState> {
        self.states.remove(&target)
    }

    pub fn contains(&self, target: Entity) -> bool {
        self.states.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Snapshot of afflicted targets, safe to iterate while mutating the registry.
    pub fn targets(&self) -> Vec<Entity> {
        self.states.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &AfflictionState)> {
        self.states.iter().map(|(entity, state)| (*entity, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_only_when_armed() {
        let mut state = AfflictionState::new(5.0);
        state.expires_at = Some(1.0);
        assert!(!state.is_due(10.0), "disarmed deadline must be ignored");

        state.arm(0.0, 5.0);
        assert!(!state.is_due(4.999));
        assert!(state.is_due(5.0));
    }

    #[test]
    fn test_disarm_clears_deadline() {
        let mut state = AfflictionState::new(5.0);
        state.arm(2.0, 5.0);
        assert_eq!(state.remaining(3.0), Some(4.0));

        state.disarm();
        assert!(!state.timer_armed);
        assert_eq!(state.remaining(3.0), None);
    }

    #[test]
    fn test_entry_creates_once() {
        let mut registry = AfflictionRegistry::default();
        let target = Entity::from_raw(7);

        let (_, created) = registry.entry(target, 30.0);
        assert!(created);
        let (_, created) = registry.entry(target, 30.0);
        assert!(!created);
        assert_eq!(registry.len(), 1);

        assert!(registry.take(target).is_some());
        assert!(registry.take(target).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_contact_holds_are_per_holder() {
        let mut hold = Hold::default();
        let left = Entity::from_raw(1);
        let right = Entity::from_raw(2);

        hold.add_contact(left);
        hold.add_contact(left);
        hold.add_contact(right);
        assert_eq!(hold.contacts.len(), 2);

        assert!(hold.release_contact(left));
        assert!(!hold.release_contact(left));
        assert!(hold.by_contact());

        hold.release_contact(right);
        hold.scan = Some(false);
        assert!(!hold.is_free());
        hold.scan = None;
        assert!(hold.is_free());
    }
}
