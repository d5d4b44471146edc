//! Collision detection and response against registry entities
//!
//! Detection is two-stage: a cheap box rejection, then a per-pixel mask
//! confirmation so transparent sprite corners never block anything.
//! Response comes in two flavours: a horizontal probe that only answers
//! "would this step hit something", and a vertical resolve that snaps the
//! actor onto whatever it landed on or bumped into.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::geom::Rect;
use super::mask::Mask;
use super::world::{Entity, EntityId, Registry};

/// How side effects fire when one vertical move overlaps several entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactPolicy {
    /// Landing/ceiling callbacks fire once per overlapping entity. A second
    /// ceiling contact in the same frame flips the velocity back upward.
    PerEntity,
    /// Every overlap still snaps the position, but the landing/ceiling
    /// callback fires at most once per resolve
    #[default]
    OncePerFrame,
}

/// Which live entities stop actor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Blocking {
    /// Every entity in the registry. Players stand on fruit, power-ups and
    /// hazards, and can only take them by dropping onto them.
    #[default]
    Everything,
    /// Terrain only; pickups and hazards can be walked through
    Terrain,
}

impl Blocking {
    pub fn blocks(&self, entity: &Entity) -> bool {
        match self {
            Blocking::Everything => true,
            Blocking::Terrain => entity.is_solid(),
        }
    }
}

/// Box test, then mask test at pixel alignment
pub fn collides(a_bounds: &Rect, a_mask: &Mask, b_bounds: &Rect, b_mask: &Mask) -> bool {
    if !a_bounds.intersects(b_bounds) {
        return false;
    }
    let offset = b_bounds.pixel_origin() - a_bounds.pixel_origin();
    a_mask.overlap(b_mask, offset).is_some()
}

/// Whether the actor's visible frame overlaps an entity
pub fn actor_overlaps(actor: &Actor, entity: &Entity) -> bool {
    collides(&actor.bounds(), actor.current_frame(), &entity.bounds, &entity.mask)
}

/// First blocking entity the actor would hit after shifting `dx` pixels
/// sideways.
///
/// The shift is applied to a copy of the actor's box, so the actor itself
/// never moves; callers decide whether to commit the step.
pub fn probe_horizontal(
    actor: &Actor,
    registry: &Registry,
    dx: f32,
    blocking: Blocking,
) -> Option<EntityId> {
    let probe = actor.bounds().translated(dx, 0.0);
    let frame = actor.current_frame();
    registry
        .iter()
        .filter(|e| blocking.blocks(e))
        .find(|e| collides(&probe, frame, &e.bounds, &e.mask))
        .map(|e| e.id)
}

/// Push the actor out of any blocking entity it overlaps after moving `dy`
/// vertically.
///
/// Falling (`dy > 0`) puts the actor's bottom on the entity's top and lands
/// it; rising (`dy < 0`) puts its top under the entity's bottom and bounces
/// it. Entities are visited in registry order and each test sees the
/// position left by the previous snap, so the last overlap wins. Returns
/// every entity touched.
pub fn resolve_vertical(
    actor: &mut Actor,
    registry: &Registry,
    dy: f32,
    policy: ContactPolicy,
    blocking: Blocking,
) -> Vec<EntityId> {
    let mut touched = Vec::new();
    for entity in registry.iter().filter(|e| blocking.blocks(e)) {
        if !actor_overlaps(actor, entity) {
            continue;
        }
        let fire = policy == ContactPolicy::PerEntity || touched.is_empty();
        if dy > 0.0 {
            actor.snap_bottom(entity.bounds.top());
            if fire {
                actor.landed();
            }
        } else if dy < 0.0 {
            actor.snap_top(entity.bounds.bottom());
            if fire {
                actor.hit_head();
            }
        }
        touched.push(entity.id);
    }
    touched
}
