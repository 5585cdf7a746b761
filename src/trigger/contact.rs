//! Contact trigger
//!
//! Touching the holder gilds a target and holds it for as long as the contact
//! lasts. Letting go starts the countdown.

use bevy::prelude::Entity;

use super::TriggerOutcome;
use crate::ability::config::{AbilityConfig, GildDurations};
use crate::affliction::controller::AfflictionController;
use crate::affliction::target::Target;
use crate::visual::VisualSync;

#[derive(Debug, Clone, PartialEq)]
pub struct ContactTrigger {
    pub durations: GildDurations,
}

impl ContactTrigger {
    pub fn from_config(config: &AbilityConfig) -> Self {
        Self {
            durations: config.durations,
        }
    }

    pub fn on_contact_begin<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        holder: Entity,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        let entity = target.entity;
        if controller.is_afflicted(entity) {
            // still (or again) touching: cancel any pending countdown
            controller.hold_contact(entity, holder);
            return TriggerOutcome::Held;
        }

        let duration = self.durations.for_target(target);
        controller.apply(target, duration, false, now);
        controller.hold_contact(entity, holder);
        TriggerOutcome::Applied { armed: false, duration }
    }

    /// Release this holder's contact. The countdown only starts once no other
    /// holder is touching and no scan is holding the target.
    pub fn on_contact_end<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        holder: Entity,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        let duration = self.durations.for_target(target);
        match controller.release_contact(target.entity, holder, duration, now) {
            Some(true) => TriggerOutcome::Refreshed { duration },
            Some(false) => TriggerOutcome::Sustained,
            None => TriggerOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affliction::constants::GILDED_SPEED_MULTIPLIER;
    use crate::affliction::state::AfflictionRegistry;
    use crate::affliction::target::{Character, MovementControl, ViewerId};
    use crate::visual::OverrideBuffer;

    const HAND: Entity = Entity::PLACEHOLDER;

    #[test]
    fn test_contact_lifecycle() {
        let trigger = ContactTrigger::from_config(&AbilityConfig::contact());
        let mut registry = AfflictionRegistry::default();
        let mut visuals = OverrideBuffer::default();
        let mut controller = AfflictionController::new(&mut registry, &mut visuals, GILDED_SPEED_MULTIPLIER);
        let player = Character {
            viewer: ViewerId(1),
        };
        let mut movement = MovementControl::default();
        let mut target = Target {
            entity: Entity::from_raw(1),
            character: Some(&player),
            parts: &[],
            movement: Some(&mut movement),
        };
        let entity = target.entity;

        assert_eq!(
            trigger.on_contact_begin(&mut controller, HAND, &mut target, 0.0),
            TriggerOutcome::Applied { armed: false, duration: 5.0 }
        );
        assert_eq!(trigger.on_contact_begin(&mut controller, HAND, &mut target, 0.5), TriggerOutcome::Held);
        assert_eq!(controller.state(entity).unwrap().saved_speed_multiplier, Some(1.0));
        assert!(!controller.state(entity).unwrap().timer_armed);

        assert_eq!(
            trigger.on_contact_end(&mut controller, HAND, &mut target, 1.0),
            TriggerOutcome::Refreshed { duration: 5.0 }
        );
        let state = controller.state(entity).unwrap();
        assert!(state.timer_armed);
        assert_eq!(state.expires_at, Some(6.0));
        assert!(state.hold.is_free());
    }

    #[test]
    fn test_contact_end_without_record_is_ignored() {
        let trigger = ContactTrigger::from_config(&AbilityConfig::contact());
        let mut registry = AfflictionRegistry::default();
        let mut visuals = OverrideBuffer::default();
        let mut controller = AfflictionController::new(&mut registry, &mut visuals, GILDED_SPEED_MULTIPLIER);
        let mut target = Target::prop(Entity::from_raw(2));

        assert_eq!(
            trigger.on_contact_end(&mut controller, HAND, &mut target, 0.0),
            TriggerOutcome::Ignored
        );
        assert!(!controller.is_afflicted(target.entity));
    }

    #[test]
    fn test_retouch_stops_countdown() {
        let trigger = ContactTrigger::from_config(&AbilityConfig::contact());
        let mut registry = AfflictionRegistry::default();
        let mut visuals = OverrideBuffer::default();
        let mut controller = AfflictionController::new(&mut registry, &mut visuals, GILDED_SPEED_MULTIPLIER);
        let mut target = Target::prop(Entity::from_raw(3));

        trigger.on_contact_begin(&mut controller, HAND, &mut target, 0.0);
        trigger.on_contact_end(&mut controller, HAND, &mut target, 1.0);
        trigger.on_contact_begin(&mut controller, HAND, &mut target, 20.0);

        assert!(controller.expire_if_due(&mut target, 100.0).is_none());
        assert!(!controller.state(target.entity).unwrap().timer_armed);
    }

    #[test]
    fn test_second_holder_keeps_target_held() {
        let trigger = ContactTrigger::from_config(&AbilityConfig::contact());
        let mut registry = AfflictionRegistry::default();
        let mut visuals = OverrideBuffer::default();
        let mut controller = AfflictionController::new(&mut registry, &mut visuals, GILDED_SPEED_MULTIPLIER);
        let mut target = Target::prop(Entity::from_raw(4));
        let other_hand = Entity::from_raw(5);

        trigger.on_contact_begin(&mut controller, HAND, &mut target, 0.0);
        trigger.on_contact_begin(&mut controller, other_hand, &mut target, 1.0);
        assert_eq!(
            trigger.on_contact_end(&mut controller, HAND, &mut target, 2.0),
            TriggerOutcome::Sustained
        );
        assert!(controller.expire_if_due(&mut target, 100.0).is_none());

        assert_eq!(
            trigger.on_contact_end(&mut controller, other_hand, &mut target, 100.0),
            TriggerOutcome::Refreshed { duration: 30.0 }
        );
        assert_eq!(controller.state(target.entity).unwrap().expires_at, Some(130.0));
    }
}
