//! Proximity scan trigger
//!
//! Every tick the holder gilds everything inside a sphere centred half an eye
//! height above it. The radius scales with the holder.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::TriggerOutcome;
use crate::ability::config::{AbilityConfig, GildDurations, ScanArming};
use crate::affliction::controller::AfflictionController;
use crate::affliction::target::Target;
use crate::visual::VisualSync;

/// Where a holder is and how big it is, for computing its scan volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolderPose {
    pub translation: Vec3,
    /// Eye position relative to `translation`, before scaling
    pub eye_offset: Vec3,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximityScanTrigger {
    pub radius: f32,
    pub eye_offset_factor: f32,
    pub durations: GildDurations,
    pub arming: ScanArming,
}

impl ProximityScanTrigger {
    pub fn from_config(config: &AbilityConfig) -> Self {
        Self {
            radius: config.radius,
            eye_offset_factor: config.eye_offset_factor,
            durations: config.durations,
            arming: config.scan_arming,
        }
    }

    /// Centre and radius of the sphere scanned this tick.
    pub fn scan_volume(&self, pose: &HolderPose) -> (Vec3, f32) {
        let centre = pose.translation + pose.eye_offset * self.eye_offset_factor * pose.scale;
        (centre, self.radius * pose.scale)
    }

    /// Gild or re-observe one target found inside the scan volume.
    pub fn on_sighted<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        let duration = self.durations.for_target(target);
        let entity = target.entity;

        match (self.arming, controller.is_afflicted(entity)) {
            (ScanArming::OnDecay, false) => {
                controller.apply(target, duration, false, now);
                controller.sustain(entity, duration);
                TriggerOutcome::Applied { armed: false, duration }
            }
            (ScanArming::OnDecay, true) => {
                let was_armed = controller.state(entity).is_some_and(|s| s.timer_armed);
                controller.sustain(entity, duration);
                if was_armed {
                    TriggerOutcome::Held
                } else {
                    TriggerOutcome::Sustained
                }
            }
            (ScanArming::OnScan, false) => {
                controller.apply(target, duration, true, now);
                TriggerOutcome::Applied { armed: true, duration }
            }
            (ScanArming::OnScan, true) if controller.held_by_contact(entity) => {
                // a contact holder still has it; its release starts the countdown
                TriggerOutcome::Sustained
            }
            (ScanArming::OnScan, true) => {
                controller.refresh(entity, duration, now);
                TriggerOutcome::Refreshed { duration }
            }
        }
    }
}

/// Spatial query: every candidate whose position lies within `radius` of `point`.
pub fn find_within_radius(
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
    point: Vec3,
    radius: f32,
) -> SmallVec<[Entity; 16]> {
    let radius_sq = radius * radius;
    candidates
        .into_iter()
        .filter(|(_, position)| position.distance_squared(point) <= radius_sq)
        .map(|(entity, _)| entity)
        .collect()
}
