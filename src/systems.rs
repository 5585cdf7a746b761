//! Gilding Systems API
//!
//! Stable entry point for wiring the gold affliction into an app. Both the
//! headless runner and host games should go through `GildingPlugin` (or the
//! helpers below) rather than registering internal systems one by one.
//!
//! ## System Phases
//!
//! Gilding systems run in four ordered phases each tick:
//!
//! 1. **Lifecycle** - log clock, round end/start, kit requests
//! 2. **Triggers** - contact events, proximity scans
//! 3. **Expiry** - every gilded target's own tick
//! 4. **Sync** - publish overrides, mirror `Gilded` markers, prune viewer outbox
//!
//! Expiry after Triggers is what keeps a target refreshed this tick from being
//! removed on its old deadline.

use bevy::prelude::*;

pub use crate::ability::{end_round, start_round, KitRequest};
pub use crate::affliction::systems::{sync_log_clock, tick_afflictions};
pub use crate::trigger::{dispatch_contact_events, run_proximity_scans};
pub use crate::visual::{mirror_gilded_markers, prune_viewer_outbox, publish_material_overrides};

use crate::affliction::events::{AfflictionApplied, AfflictionRemoved, ContactEvent, RoundEnded, RoundStarted};
use crate::affliction::log::AfflictionLog;
use crate::affliction::state::AfflictionRegistry;
use crate::settings::GildingSettings;
use crate::visual::{MaterialOverride, OverrideBuffer};

/// System set labels for gilding system ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GildingPhase {
    /// Round start/end and clock bookkeeping
    Lifecycle,
    /// Contact dispatch and proximity scans
    Triggers,
    /// Per-target countdowns
    Expiry,
    /// Visual and viewer output
    Sync,
}

/// Configures the ordering between gilding phases.
pub fn configure_gilding_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GildingPhase::Lifecycle,
            GildingPhase::Triggers,
            GildingPhase::Expiry,
            GildingPhase::Sync,
        )
            .chain(),
    );
}

/// Adds the gilding systems to the app.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - e.g. `in_state(GamePhase::Playing)`, or `|| true`
pub fn add_gilding_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    app.add_systems(
        Update,
        (sync_log_clock, end_round, start_round)
            .chain()
            .in_set(GildingPhase::Lifecycle)
            .run_if(run_condition.clone()),
    );

    // Strategies inserted at round start must be visible to this tick's triggers
    app.add_systems(
        Update,
        apply_deferred
            .after(GildingPhase::Lifecycle)
            .before(GildingPhase::Triggers)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        (dispatch_contact_events, run_proximity_scans)
            .chain()
            .in_set(GildingPhase::Triggers)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        tick_afflictions
            .in_set(GildingPhase::Expiry)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        (publish_material_overrides, mirror_gilded_markers, prune_viewer_outbox)
            .chain()
            .in_set(GildingPhase::Sync)
            .run_if(run_condition),
    );
}

/// Plugin registering resources, events and systems for the gold affliction.
#[derive(Default)]
pub struct GildingPlugin {
    pub settings: GildingSettings,
}

impl Plugin for GildingPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .init_resource::<AfflictionRegistry>()
            .init_resource::<OverrideBuffer>()
            .init_resource::<AfflictionLog>()
            .add_event::<RoundStarted>()
            .add_event::<RoundEnded>()
            .add_event::<ContactEvent>()
            .add_event::<KitRequest>()
            .add_event::<MaterialOverride>()
            .add_event::<AfflictionApplied>()
            .add_event::<AfflictionRemoved>();

        configure_gilding_system_ordering(app);
        add_gilding_systems(app, || true);
    }
}
