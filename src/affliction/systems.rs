//! Affliction systems
//!
//! The per-target tick. Runs in `GildingPhase::Expiry`, after every trigger
//! has had its say this tick, so a target refreshed this tick is never
//! removed on a stale deadline.

use bevy::prelude::*;

use super::controller::{AfflictionController, TickOutcome};
use super::events::{AfflictionRemoved, RemovalReason};
use super::log::{AfflictionLog, AfflictionLogEventType};
use super::state::AfflictionRegistry;
use super::target::{fetch_target, TargetData};
use crate::settings::GildingSettings;
use crate::trigger::TriggerStrategy;
use crate::visual::OverrideBuffer;

/// Keep the affliction log's clock on simulated time.
pub fn sync_log_clock(time: Res<Time>, mut log: ResMut<AfflictionLog>) {
    log.current_time = time.elapsed_secs();
}

/// Tick every gilded target once: release holds of holders that are gone,
/// lapse scan holds, expire due countdowns, and drop records of targets that
/// no longer exist.
#[allow(clippy::too_many_arguments)]
pub fn tick_afflictions(
    time: Res<Time>,
    settings: Res<GildingSettings>,
    mut registry: ResMut<AfflictionRegistry>,
    mut buffer: ResMut<OverrideBuffer>,
    mut log: ResMut<AfflictionLog>,
    mut removed: EventWriter<AfflictionRemoved>,
    mut targets: Query<TargetData>,
    holders: Query<(), With<TriggerStrategy>>,
) {
    if registry.is_empty() {
        return;
    }
    let now = time.elapsed_secs();
    let afflicted = registry.targets();
    let mut controller = AfflictionController::new(&mut registry, &mut *buffer, settings.speed_penalty);

    for entity in afflicted {
        let Some(mut target) = fetch_target(&mut targets, entity) else {
            controller.forget(entity);
            debug!("{:?} despawned while gilded", entity);
            removed.send(AfflictionRemoved {
                target: entity,
                reason: RemovalReason::Despawned,
            });
            continue;
        };

        if controller.drop_stale_contacts(entity, now, |holder| holders.contains(holder)) {
            debug!("{:?} lost a contact holder without an end event", entity);
        }

        match controller.tick(&mut target, now) {
            TickOutcome::Idle => {}
            TickOutcome::Armed { expires_at } => {
                log.log(
                    AfflictionLogEventType::Armed,
                    Some(entity),
                    format!("{:?} left range, expires at {:.1}s", entity, expires_at),
                );
            }
            TickOutcome::Expired(_) => {
                log.log(
                    AfflictionLogEventType::Removed,
                    Some(entity),
                    format!("{:?} is no longer gilded", entity),
                );
                removed.send(AfflictionRemoved {
                    target: entity,
                    reason: RemovalReason::Expired,
                });
            }
        }
    }
}
