//! Ability Lifecycle
//!
//! Wires a holder's `AbilityConfig` into a running trigger strategy.
//!
//! ## Flow
//! 1. `RoundStarted`: every `AbilityHolder` gets its cosmetic kit equipped and
//!    a fresh `TriggerStrategy` built from its config.
//! 2. During the round the trigger systems drive the strategy; every gilded
//!    target is ticked on its own, whichever holder gilded it.
//! 3. `RoundEnded`: all gilding is released, kits are unequipped and the
//!    strategies are uninstalled. The next `RoundStarted` starts over.

pub mod config;

pub use config::{AbilityConfig, GildDurations, ScanArming, TriggerKind};

use bevy::prelude::*;

use crate::affliction::controller::AfflictionController;
use crate::affliction::events::{AfflictionRemoved, RemovalReason, RoundEnded, RoundStarted};
use crate::affliction::log::{AfflictionLog, AfflictionLogEventType};
use crate::affliction::state::AfflictionRegistry;
use crate::affliction::target::{fetch_target, TargetData};
use crate::settings::GildingSettings;
use crate::trigger::TriggerStrategy;
use crate::visual::OverrideBuffer;

/// Entity that carries the gilding ability.
#[derive(Component, Debug, Clone, Default)]
pub struct AbilityHolder {
    pub config: AbilityConfig,
}

/// Eye position relative to the holder's origin. The scan centre sits part
/// of the way up it.
#[derive(Component, Debug, Clone, Copy)]
pub struct EyeOffset(pub Vec3);

/// What the cosmetic collaborator should do with a holder's outfit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitAction {
    Equip,
    Unequip,
}

/// Request for the cosmetic-kit collaborator. Opaque to the affliction core.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KitRequest {
    pub holder: Entity,
    pub action: KitAction,
}

/// Equip kits and install strategies for every holder.
pub fn start_round(
    mut commands: Commands,
    mut rounds: EventReader<RoundStarted>,
    mut kits: EventWriter<KitRequest>,
    mut log: ResMut<AfflictionLog>,
    holders: Query<(Entity, &AbilityHolder)>,
) {
    if rounds.read().last().is_none() {
        return;
    }

    let mut installed = 0;
    for (holder, ability) in holders.iter() {
        if let Err(e) = ability.config.validate() {
            warn!("{:?} has an invalid ability config, skipping: {}", holder, e);
            continue;
        }

        kits.send(KitRequest {
            holder,
            action: KitAction::Equip,
        });
        let strategy = TriggerStrategy::from_config(&ability.config);
        log.log(
            AfflictionLogEventType::Kit,
            Some(holder),
            format!("{:?} equipped kit, trigger: {:?}", holder, strategy.kind()),
        );
        commands.entity(holder).insert(strategy);
        installed += 1;
    }
    let message = format!("Round started with {} ability holder(s)", installed);
    info!("{}", message);
    log.log(AfflictionLogEventType::RoundEvent, None, message);
}

/// Release every gilded target, unequip kits and uninstall strategies.
#[allow(clippy::too_many_arguments)]
pub fn end_round(
    mut commands: Commands,
    mut rounds: EventReader<RoundEnded>,
    settings: Res<GildingSettings>,
    mut registry: ResMut<AfflictionRegistry>,
    mut buffer: ResMut<OverrideBuffer>,
    mut log: ResMut<AfflictionLog>,
    mut kits: EventWriter<KitRequest>,
    mut removed: EventWriter<AfflictionRemoved>,
    holders: Query<Entity, With<TriggerStrategy>>,
    mut targets: Query<TargetData>,
) {
    if rounds.read().last().is_none() {
        return;
    }

    let afflicted = registry.targets();
    let mut controller = AfflictionController::new(&mut registry, &mut *buffer, settings.speed_penalty);
    for entity in afflicted {
        let reason = match fetch_target(&mut targets, entity) {
            Some(mut target) => {
                controller.remove(&mut target);
                RemovalReason::RoundEnded
            }
            None => {
                controller.forget(entity);
                RemovalReason::Despawned
            }
        };
        log.log(
            AfflictionLogEventType::Removed,
            Some(entity),
            format!("{:?} released ({:?})", entity, reason),
        );
        removed.send(AfflictionRemoved {
            target: entity,
            reason,
        });
    }

    for holder in holders.iter() {
        kits.send(KitRequest {
            holder,
            action: KitAction::Unequip,
        });
        log.log(
            AfflictionLogEventType::Kit,
            Some(holder),
            format!("{:?} unequipped kit", holder),
        );
        commands.entity(holder).remove::<TriggerStrategy>();
    }

    log.log(AfflictionLogEventType::RoundEvent, None, "Round ended".to_string());
    info!("Round ended");
}
