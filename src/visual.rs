//! Visual Sync
//!
//! The affliction core only decides *that* an override should be applied or
//! cleared and on *which* entities. This module carries those decisions out to
//! the collaborators:
//! - `MaterialOverride` events for the renderer (one per target / sub-object)
//! - `ViewerOutbox`: fire-and-forget first-person commands, keyed by viewer
//! - `Gilded`: marker mirrored onto every overridden entity
//!
//! Nothing here is authoritative. A dropped command is a cosmetic desync only.

use std::collections::BTreeMap;

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::affliction::target::{Character, ViewerId};

/// Whether an override is being put on or taken off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideAction {
    Apply,
    Clear,
}

/// Renderer-facing command: put the gold material on (or take it off) one entity.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialOverride {
    pub entity: Entity,
    pub action: OverrideAction,
}

/// Command for the viewer that owns a character's first-person presentation
/// (held item, legs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    ApplyViewOverride,
    ClearViewOverride,
}

/// Marker present on every entity currently showing the override.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Gilded;

/// Outbound per-viewer queue. No acknowledgement, no retry.
#[derive(Debug, Default)]
pub struct ViewerOutbox {
    queues: BTreeMap<ViewerId, SmallVec<[ViewCommand; 4]>>,
}

impl ViewerOutbox {
    pub fn push(&mut self, viewer: ViewerId, command: ViewCommand) {
        self.queues.entry(viewer).or_default().push(command);
    }

    /// Commands waiting for `viewer`, oldest first.
    pub fn pending(&self, viewer: ViewerId) -> &[ViewCommand] {
        self.queues.get(&viewer).map_or(&[][..], |queue| queue.as_slice())
    }

    /// Hand every queued command for `viewer` to the transport.
    pub fn drain(&mut self, viewer: ViewerId) -> SmallVec<[ViewCommand; 4]> {
        self.queues.remove(&viewer).unwrap_or_default()
    }

    /// Drop everything queued for `viewer`. Returns how many commands were lost.
    pub fn forget(&mut self, viewer: ViewerId) -> usize {
        self.queues.remove(&viewer).map_or(0, |queue| queue.len())
    }

    pub fn viewers(&self) -> impl Iterator<Item = ViewerId> + '_ {
        self.queues.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

/// Collaborator interface the affliction controller talks to.
pub trait VisualSync {
    /// Override `target` and each of `parts`. Idempotent.
    fn apply_override(&mut self, target: Entity, parts: &[Entity]);
    /// Clear the override from `target` and each of `parts`. Idempotent.
    fn clear_override(&mut self, target: Entity, parts: &[Entity]);
    fn notify_viewer(&mut self, viewer: ViewerId, command: ViewCommand);
}

/// Buffer filled by the controller during a tick and published in `GildingPhase::Sync`.
#[derive(Resource, Debug, Default)]
pub struct OverrideBuffer {
    pub pending: Vec<MaterialOverride>,
    pub outbox: ViewerOutbox,
}

impl OverrideBuffer {
    fn push_all(&mut self, target: Entity, parts: &[Entity], action: OverrideAction) {
        self.pending.reserve(parts.len() + 1);
        self.pending.push(MaterialOverride {
            entity: target,
            action,
        });
        self.pending.extend(
            parts
                .iter()
                .map(|&entity| MaterialOverride { entity, action }),
        );
    }
}

impl VisualSync for OverrideBuffer {
    fn apply_override(&mut self, target: Entity, parts: &[Entity]) {
        self.push_all(target, parts, OverrideAction::Apply);
    }

    fn clear_override(&mut self, target: Entity, parts: &[Entity]) {
        self.push_all(target, parts, OverrideAction::Clear);
    }

    fn notify_viewer(&mut self, viewer: ViewerId, command: ViewCommand) {
        self.outbox.push(viewer, command);
    }
}

/// Send this tick's buffered overrides to the renderer, in the order they were decided.
pub fn publish_material_overrides(
    mut buffer: ResMut<OverrideBuffer>,
    mut overrides: EventWriter<MaterialOverride>,
) {
    if buffer.pending.is_empty() {
        return;
    }
    overrides.send_batch(buffer.pending.drain(..));
}

/// Mirror override commands onto the `Gilded` marker.
pub fn mirror_gilded_markers(mut commands: Commands, mut overrides: EventReader<MaterialOverride>) {
    for command in overrides.read() {
        let Some(mut entity) = commands.get_entity(command.entity) else {
            continue; // sub-object already gone
        };
        match command.action {
            OverrideAction::Apply => {
                entity.try_insert(Gilded);
            }
            OverrideAction::Clear => {
                entity.remove::<Gilded>();
            }
        }
    }
}

/// Drop queued commands for viewers that no longer own a character.
pub fn prune_viewer_outbox(mut buffer: ResMut<OverrideBuffer>, characters: Query<&Character>) {
    if buffer.outbox.is_empty() {
        return;
    }
    let stale: Vec<ViewerId> = buffer
        .outbox
        .viewers()
        .filter(|viewer| !characters.iter().any(|c| c.viewer == *viewer))
        .collect();

    for viewer in stale {
        let dropped = buffer.outbox.forget(viewer);
        debug!("Dropped {} view command(s) for absent viewer {:?}", dropped, viewer);
    }
}
