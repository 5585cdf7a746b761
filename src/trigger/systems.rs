//! Trigger systems
//!
//! ECS front-ends for the two strategies. Both run in `GildingPhase::Triggers`,
//! before any target's own expiry check.

use bevy::prelude::*;

use super::{find_within_radius, record_outcome, HolderPose, TriggerOutcome, TriggerStrategy};
use crate::ability::EyeOffset;
use crate::affliction::constants::DEFAULT_EYE_HEIGHT;
use crate::affliction::controller::AfflictionController;
use crate::affliction::events::{AfflictionApplied, ContactEvent, ContactPhase};
use crate::affliction::log::AfflictionLog;
use crate::affliction::state::AfflictionRegistry;
use crate::affliction::target::{fetch_target, Gildable, TargetData};
use crate::settings::GildingSettings;
use crate::visual::OverrideBuffer;

/// Run every installed proximity scan once.
///
/// Each holder scans independently; a target found by several holders in the
/// same tick still ends up with a single record.
#[allow(clippy::too_many_arguments)]
pub fn run_proximity_scans(
    time: Res<Time>,
    settings: Res<GildingSettings>,
    mut registry: ResMut<AfflictionRegistry>,
    mut buffer: ResMut<OverrideBuffer>,
    mut log: ResMut<AfflictionLog>,
    mut applied: EventWriter<AfflictionApplied>,
    holders: Query<(Entity, &TriggerStrategy, &Transform, Option<&EyeOffset>)>,
    positions: Query<(Entity, &Transform), With<Gildable>>,
    mut targets: Query<TargetData, With<Gildable>>,
) {
    let now = time.elapsed_secs();
    let mut controller = AfflictionController::new(&mut registry, &mut *buffer, settings.speed_penalty);

    for (holder, strategy, transform, eye_offset) in holders.iter() {
        let pose = HolderPose {
            translation: transform.translation,
            eye_offset: eye_offset.map_or(Vec3::Y * DEFAULT_EYE_HEIGHT, |eye| eye.0),
            scale: transform.scale.max_element(),
        };
        let Some((centre, radius)) = strategy.scan_volume(&pose) else {
            continue;
        };

        let found = find_within_radius(
            positions.iter().map(|(entity, t)| (entity, t.translation)),
            centre,
            radius,
        );

        for entity in found {
            if entity == holder {
                continue;
            }
            let Some(mut target) = fetch_target(&mut targets, entity) else {
                continue;
            };
            let outcome = strategy.on_sighted(&mut controller, &mut target, now);
            record_outcome(outcome, holder, entity, &mut log, &mut applied);
        }
    }
}

/// Forward contact begin/end events to the touched holder's strategy.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_contact_events(
    time: Res<Time>,
    settings: Res<GildingSettings>,
    mut contacts: EventReader<ContactEvent>,
    mut registry: ResMut<AfflictionRegistry>,
    mut buffer: ResMut<OverrideBuffer>,
    mut log: ResMut<AfflictionLog>,
    mut applied: EventWriter<AfflictionApplied>,
    holders: Query<&TriggerStrategy>,
    mut targets: Query<TargetData, With<Gildable>>,
) {
    let now = time.elapsed_secs();
    let mut controller = AfflictionController::new(&mut registry, &mut *buffer, settings.speed_penalty);

    for contact in contacts.read() {
        if contact.holder == contact.other {
            continue;
        }
        let Ok(strategy) = holders.get(contact.holder) else {
            // no ability installed this round
            continue;
        };
        let Some(mut target) = fetch_target(&mut targets, contact.other) else {
            continue;
        };

        let outcome = match contact.phase {
            ContactPhase::Began => strategy.on_contact_begin(&mut controller, contact.holder, &mut target, now),
            ContactPhase::Ended => strategy.on_contact_end(&mut controller, contact.holder, &mut target, now),
        };
        if outcome == TriggerOutcome::Ignored {
            debug!("{:?} contact with {:?} ignored", contact.phase, contact.other);
        }
        record_outcome(outcome, contact.holder, contact.other, &mut log, &mut applied);
    }
}
