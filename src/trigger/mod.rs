//! Trigger Strategies
//!
//! Decide *when* the affliction controller is called. One strategy is
//! installed per holder at round start:
//! - `ProximityScanTrigger`: periodic radius scan
//! - `ContactTrigger`: begin/end touching events
//!
//! Both feed the same `AfflictionController`. A strategy ignores the inputs
//! that belong to the other variant.

pub mod contact;
pub mod proximity;
pub mod systems;

pub use contact::ContactTrigger;
pub use proximity::{find_within_radius, HolderPose, ProximityScanTrigger};
pub use systems::{dispatch_contact_events, run_proximity_scans};

use bevy::prelude::*;

use crate::ability::config::{AbilityConfig, TriggerKind};
use crate::affliction::controller::AfflictionController;
use crate::affliction::events::AfflictionApplied;
use crate::affliction::log::{AfflictionLog, AfflictionLogEventType};
use crate::affliction::target::Target;
use crate::visual::VisualSync;

/// What a trigger did to one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerOutcome {
    /// A new record was created
    Applied { armed: bool, duration: f32 },
    /// Countdown restarted
    Refreshed { duration: f32 },
    /// A running countdown was stopped
    Held,
    /// Re-observed by a scan while already held
    Sustained,
    /// Input did not apply to this target or strategy
    Ignored,
}

/// The strategy installed on a holder for the current round.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum TriggerStrategy {
    ProximityScan(ProximityScanTrigger),
    Contact(ContactTrigger),
}

impl TriggerStrategy {
    pub fn from_config(config: &AbilityConfig) -> Self {
        match config.trigger {
            TriggerKind::ProximityScan => Self::ProximityScan(ProximityScanTrigger::from_config(config)),
            TriggerKind::Contact => Self::Contact(ContactTrigger::from_config(config)),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::ProximityScan(_) => TriggerKind::ProximityScan,
            Self::Contact(_) => TriggerKind::Contact,
        }
    }

    /// Volume to scan this tick. `None` for strategies that do not scan.
    pub fn scan_volume(&self, pose: &HolderPose) -> Option<(Vec3, f32)> {
        match self {
            Self::ProximityScan(scan) => Some(scan.scan_volume(pose)),
            Self::Contact(_) => None,
        }
    }

    pub fn on_sighted<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        match self {
            Self::ProximityScan(scan) => scan.on_sighted(controller, target, now),
            Self::Contact(_) => TriggerOutcome::Ignored,
        }
    }

    pub fn on_contact_begin<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        holder: Entity,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        match self {
            Self::Contact(contact) => contact.on_contact_begin(controller, holder, target, now),
            Self::ProximityScan(_) => TriggerOutcome::Ignored,
        }
    }

    pub fn on_contact_end<V: VisualSync>(
        &self,
        controller: &mut AfflictionController<V>,
        holder: Entity,
        target: &mut Target,
        now: f32,
    ) -> TriggerOutcome {
        match self {
            Self::Contact(contact) => contact.on_contact_end(controller, holder, target, now),
            Self::ProximityScan(_) => TriggerOutcome::Ignored,
        }
    }
}

/// Write a trigger outcome to the affliction log and announce new records.
/// Sustained scans are not logged: they happen every tick.
pub(crate) fn record_outcome(
    outcome: TriggerOutcome,
    holder: Entity,
    target: Entity,
    log: &mut AfflictionLog,
    applied: &mut EventWriter<AfflictionApplied>,
) {
    match outcome {
        TriggerOutcome::Applied { armed, duration } => {
            log.log(
                AfflictionLogEventType::Applied,
                Some(target),
                format!("{:?} gilded {:?} ({:.1}s, armed: {})", holder, target, duration, armed),
            );
            applied.send(AfflictionApplied {
                source: holder,
                target,
                duration,
                armed,
            });
        }
        TriggerOutcome::Refreshed { duration } => {
            log.log(
                AfflictionLogEventType::Refreshed,
                Some(target),
                format!("{:?} refreshed {:?} ({:.1}s)", holder, target, duration),
            );
        }
        TriggerOutcome::Held => {
            log.log(
                AfflictionLogEventType::Held,
                Some(target),
                format!("{:?} is holding {:?}", holder, target),
            );
        }
        TriggerOutcome::Sustained | TriggerOutcome::Ignored => {}
    }
}
