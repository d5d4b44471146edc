//! Level entities and the object registry
//!
//! Registry membership is the only record of whether a collectible was
//! eaten or a hazard neutralized: consumed entities are removed, never
//! flagged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::mask::Mask;

/// Stable entity handle, allocated in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What happens when a collectible is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    /// Counts toward the level's required item total (fruit)
    Score,
    /// Grants hazard immunity for the rest of the round (power-up)
    Immunity,
}

/// Entity capability tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Terrain
    Static,
    /// Removed on contact, applying its effect
    Collectible(Consumable),
    /// Ends the round on contact unless immunity is active
    Hazard,
}

/// A placed level entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub bounds: Rect,
    pub mask: Arc<Mask>,
}

impl Entity {
    /// Whether this is level terrain
    pub fn is_solid(&self) -> bool {
        matches!(self.kind, EntityKind::Static)
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, EntityKind::Hazard)
    }

    /// Effect applied when an actor consumes this entity
    pub fn on_consumed(&self) -> Option<Consumable> {
        match self.kind {
            EntityKind::Collectible(effect) => Some(effect),
            _ => None,
        }
    }
}

/// Ordered set of live entities
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Sorted by id
    entities: Vec<Entity>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its id
    pub fn spawn(&mut self, kind: EntityKind, bounds: Rect, mask: Arc<Mask>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            kind,
            bounds,
            mask,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Remove an entity. Removing one that is already gone is a no-op and
    /// returns false.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(i) => {
                self.entities.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Ids of every live entity matching `pred`, frozen for one scan
    pub fn snapshot(&self, pred: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities.iter().filter(|e| pred(e)).map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn hazards(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_hazard())
    }

    /// Live collectibles with the given effect
    pub fn count_consumable(&self, effect: Consumable) -> usize {
        self.entities
            .iter()
            .filter(|e| e.on_consumed() == Some(effect))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
