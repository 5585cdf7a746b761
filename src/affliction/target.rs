//! Target Capabilities
//!
//! A target is any `Gildable` entity. What it can do is expressed through
//! optional components rather than type checks:
//! - `Character`: a controllable character, owned by a viewer
//! - `MovementControl`: exposes a mutable speed multiplier
//! - `Children`: sub-objects that mirror the material override

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker for entities that can be gilded.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Gildable;

/// Identity of the client whose first-person view belongs to a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub u32);

/// Controllable character capability.
#[derive(Component, Debug, Clone, Copy)]
pub struct Character {
    pub viewer: ViewerId,
}

/// Movement capability. Other systems may stack their own changes on top of
/// `speed_multiplier` while a target is gilded; restoration is additive so
/// those changes survive.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MovementControl {
    pub speed_multiplier: f32,
}

impl Default for MovementControl {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
        }
    }
}

/// Borrowed view of one target for the duration of a controller call.
pub struct Target<'a> {
    pub entity: Entity,
    pub character: Option<&'a Character>,
    pub parts: &'a [Entity],
    pub movement: Option<&'a mut MovementControl>,
}

impl<'a> Target<'a> {
    /// A bare target: no character, no movement, no sub-objects.
    pub fn prop(entity: Entity) -> Self {
        Self {
            entity,
            character: None,
            parts: &[],
            movement: None,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        self.character
    }

    pub fn movement_control(&mut self) -> Option<&mut MovementControl> {
        self.movement.as_deref_mut()
    }

    pub fn is_character(&self) -> bool {
        self.character.is_some()
    }
}

/// Query data needed to build a `Target`.
pub type TargetData = (
    Entity,
    Option<&'static Character>,
    Option<&'static Children>,
    Option<&'static mut MovementControl>,
);

/// Borrow `entity` out of a target query. `None` if it no longer matches
/// (despawned, or filtered out).
pub fn fetch_target<'a, F: QueryFilter>(
    query: &'a mut Query<'_, '_, TargetData, F>,
    entity: Entity,
) -> Option<Target<'a>> {
    let (entity, character, children, movement) = query.get_mut(entity).ok()?;
    Some(Target {
        entity,
        character,
        parts: children.map_or(&[][..], |children| &children[..]),
        movement: movement.map(Mut::into_inner),
    })
}
