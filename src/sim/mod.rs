//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID, player one before player two)
//! - No rendering or platform dependencies

pub mod actor;
pub mod camera;
pub mod collision;
pub mod geom;
pub mod level;
pub mod mask;
pub mod pilot;
pub mod rules;
pub mod sprites;
pub mod state;
pub mod tick;
pub mod world;

pub use actor::{Actor, ActorProfile, AirState};
pub use camera::Camera;
pub use collision::{Blocking, ContactPolicy, collides, probe_horizontal, resolve_vertical};
pub use geom::Rect;
pub use level::{
    BUILTIN_LEVELS, EntityDef, EntityDefKind, Level, LevelBuilder, LevelConfig, LevelError,
    MaskLibrary, PlayerSlot, builtin,
};
pub use mask::{Mask, MaskError};
pub use pilot::Pilot;
pub use sprites::{AnimState, Facing, SpriteError, SpriteSet};
pub use state::{FrameSnapshot, LossReason, Outcome, Round, RoundEvent, RoundStats};
pub use tick::{PlayerInput, TickInput, tick};
pub use world::{Consumable, Entity, EntityId, EntityKind, Registry};
