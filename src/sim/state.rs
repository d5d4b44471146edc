//! Round state and core simulation types
//!
//! A [`Round`] is created from a validated level, stepped by
//! [`super::tick`] until it reaches a terminal outcome, then dropped.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::camera::Camera;
use super::collision::actor_overlaps;
use super::level::{Level, LevelConfig, PlayerSlot};
use super::sprites::{AnimState, Facing, SpriteSet};
use super::world::{Entity, EntityId, EntityKind, Registry};
use crate::settings::{Settings, Skin};
use crate::ticks_to_secs;

/// Why a round was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// The countdown ran out
    TimeUp,
    /// A player touched a hazard without immunity
    HazardContact,
    /// A player dropped below the level's fall-out line
    FellOut,
}

/// Round outcome; `Won` and `Lost` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Continuing,
    Won,
    Lost(LossReason),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Continuing)
    }
}

/// Counters driving the win/lose rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    /// Ticks simulated so far
    pub elapsed_ticks: u64,
    /// Fruit eaten by either player
    pub collected: u32,
    /// Hazards removed by the champion
    pub neutralized: u32,
    /// Unprotected hazard contacts; any at all loses the round
    pub hazard_contacts: u32,
    /// Set by the first power-up and kept for the rest of the round
    pub immunity: bool,
    /// Power-ups eaten
    pub power_ups: u32,
}

/// Things that happened during one tick, for audio and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Jumped { slot: PlayerSlot },
    Landed { slot: PlayerSlot },
    HeadBump { slot: PlayerSlot },
    Collected { slot: PlayerSlot, id: EntityId },
    PoweredUp { slot: PlayerSlot, id: EntityId },
    Damaged { slot: PlayerSlot, id: EntityId },
    Neutralized { slot: PlayerSlot, id: EntityId },
    Won,
    Lost(LossReason),
}

/// One round of play
#[derive(Debug, Clone)]
pub struct Round {
    pub level: LevelConfig,
    pub settings: Settings,
    /// Player one, then player two
    pub actors: [Actor; 2],
    pub registry: Registry,
    pub stats: RoundStats,
    pub outcome: Outcome,
    pub camera: Camera,
    /// Events from the most recent tick
    pub events: Vec<RoundEvent>,
    /// Entities each player's vertical resolve touched in the most recent
    /// tick; the rules count these as contacts even after the snap
    pub contacts: [Vec<EntityId>; 2],
}

impl Round {
    /// Start a round; `sprites` are the frame sets for player one and two
    pub fn new(level: Level, settings: Settings, sprites: [Arc<SpriteSet>; 2]) -> Self {
        let Level { config, registry } = level;
        let [sprites_one, sprites_two] = sprites;
        let actors = [
            Actor::new(config.spawns[0], settings.profiles[0], sprites_one),
            Actor::new(config.spawns[1], settings.profiles[1], sprites_two),
        ];
        let camera = Camera::new(config.camera_x);
        log::info!(
            "Round start: {:?} ({} vs {})",
            config.name,
            settings.profiles[0].skin.as_str(),
            settings.profiles[1].skin.as_str()
        );
        Self {
            level: config,
            settings,
            actors,
            registry,
            stats: RoundStats::default(),
            outcome: Outcome::Continuing,
            camera,
            events: Vec::new(),
            contacts: [Vec::new(), Vec::new()],
        }
    }

    pub fn actor(&self, slot: PlayerSlot) -> &Actor {
        &self.actors[slot.index()]
    }

    pub fn actor_mut(&mut self, slot: PlayerSlot) -> &mut Actor {
        &mut self.actors[slot.index()]
    }

    /// Whether a player touches an entity this tick: by mask overlap, or by
    /// having been snapped off it during the vertical resolve
    pub fn touches(&self, slot: PlayerSlot, entity: &Entity) -> bool {
        self.contacts[slot.index()].contains(&entity.id)
            || actor_overlaps(self.actor(slot), entity)
    }

    pub fn fps(&self) -> u32 {
        self.settings.fps
    }

    pub fn time_limit_ticks(&self) -> u64 {
        self.level.time_limit_secs as u64 * self.settings.fps as u64
    }

    pub fn remaining_secs(&self) -> f32 {
        let left = self.time_limit_ticks().saturating_sub(self.stats.elapsed_ticks);
        ticks_to_secs(left, self.settings.fps)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Move to a terminal outcome. The first terminal outcome sticks.
    pub fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_terminal() || !outcome.is_terminal() {
            return;
        }
        self.outcome = outcome;
        self.events.push(match outcome {
            Outcome::Lost(reason) => RoundEvent::Lost(reason),
            _ => RoundEvent::Won,
        });
        log::info!(
            "Round {:?} ended at tick {}: {:?} ({} fruit, {} hazards)",
            self.level.name,
            self.stats.elapsed_ticks,
            outcome,
            self.stats.collected,
            self.stats.neutralized
        );
    }

    /// Render-ready view of the current frame
    pub fn snapshot(&self) -> FrameSnapshot {
        let actors = PlayerSlot::BOTH
            .iter()
            .map(|&slot| {
                let actor = self.actor(slot);
                let bounds = actor.bounds();
                ActorSnapshot {
                    slot,
                    skin: actor.profile().skin,
                    pos: bounds.pos,
                    size: bounds.size,
                    facing: actor.facing,
                    anim: actor.anim_state(),
                    frame: actor.frame_index(),
                }
            })
            .collect();
        let entities = self
            .registry
            .iter()
            .map(|e| EntitySnapshot {
                id: e.id,
                kind: e.kind,
                pos: e.bounds.pos,
                size: e.bounds.size,
            })
            .collect();
        FrameSnapshot {
            tick: self.stats.elapsed_ticks,
            outcome: self.outcome,
            camera_x: self.camera.offset_x,
            actors,
            entities,
            hud: Hud {
                collected: self.stats.collected,
                required_items: self.level.required_items,
                neutralized: self.stats.neutralized,
                required_hazards: self.level.required_hazards,
                immunity: self.stats.immunity,
                remaining_secs: self.remaining_secs(),
            },
        }
    }
}

/// Drawing data for one actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub slot: PlayerSlot,
    pub skin: Skin,
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub anim: AnimState,
    /// Frame index within the animation
    pub frame: usize,
}

/// Drawing data for one live entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
}

/// Overlay numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hud {
    pub collected: u32,
    pub required_items: u32,
    pub neutralized: u32,
    pub required_hazards: u32,
    pub immunity: bool,
    pub remaining_secs: f32,
}

/// Everything the presentation layer needs to draw a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub outcome: Outcome,
    pub camera_x: f32,
    pub actors: Vec<ActorSnapshot>,
    pub entities: Vec<EntitySnapshot>,
    pub hud: Hud,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{LevelBuilder, MaskLibrary};
    use crate::sim::mask::Mask;

    fn round() -> Round {
        let config = LevelBuilder::new("state")
            .goal(1, 0)
            .time_limit(2)
            .spawns(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0))
            .fruit(500.0, 0.0, 16.0)
            .config();
        let level = Level::build(config, &MaskLibrary::new()).unwrap();
        let sprites = Arc::new(SpriteSet::uniform(Mask::filled(32, 32).unwrap()));
        Round::new(level, Settings::default(), [sprites.clone(), sprites])
    }

    #[test]
    fn test_new_round_places_actors() {
        let r = round();
        assert_eq!(r.actor(PlayerSlot::One).pos, Vec2::new(0.0, 0.0));
        assert_eq!(r.actor(PlayerSlot::Two).pos, Vec2::new(100.0, 0.0));
        assert_eq!(r.actor(PlayerSlot::Two).profile().animation_delay, 2);
        assert_eq!(r.outcome, Outcome::Continuing);
        assert_eq!(r.time_limit_ticks(), 120);
        assert_eq!(r.remaining_secs(), 2.0);
        assert_eq!(r.camera.offset_x, crate::consts::DEFAULT_CAMERA_X);
    }

    #[test]
    fn test_first_terminal_outcome_sticks() {
        let mut r = round();
        r.finish(Outcome::Lost(LossReason::FellOut));
        r.finish(Outcome::Won);
        assert_eq!(r.outcome, Outcome::Lost(LossReason::FellOut));
        assert_eq!(r.events, vec![RoundEvent::Lost(LossReason::FellOut)]);
    }

    #[test]
    fn test_finish_continuing_is_ignored() {
        let mut r = round();
        r.finish(Outcome::Continuing);
        assert!(!r.is_over());
        assert!(r.events.is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let r = round();
        let snap = r.snapshot();
        assert_eq!(snap.actors.len(), 2);
        assert_eq!(snap.entities.len(), 1);
        assert_eq!(snap.hud.required_items, 1);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["actors"][0]["anim"], "Idle");
        assert_eq!(json["outcome"], "Continuing");
    }
}
