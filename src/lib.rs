//! Duo Dash - A two-player side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, mask collisions, round rules)
//! - `settings`: Player profiles, controls and tuning knobs
//!
//! Asset loading, rendering, audio and the window loop live outside this
//! crate. They hand us sprite masks and pressed keys, and read back
//! [`sim::FrameSnapshot`]s.

pub mod settings;
pub mod sim;

pub use settings::{ControlScheme, Key, Settings, Skin};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const FPS: u32 = 60;

    /// Horizontal run speed (pixels per tick)
    pub const PLAYER_VEL: f32 = 5.0;
    /// Gravity ramp factor; also scales the jump impulse
    pub const GRAVITY: f32 = 1.0;
    /// Jump impulse is `-GRAVITY * JUMP_IMPULSE`
    pub const JUMP_IMPULSE: f32 = 8.0;
    /// One ground jump plus one mid-air re-jump
    pub const MAX_JUMPS: u8 = 2;
    /// Length of the hit/stagger window in seconds
    pub const HIT_DURATION_SECS: u32 = 2;
    /// Downward speed above which the fall animation is shown
    pub const FALL_ANIM_THRESHOLD: f32 = GRAVITY * 2.0;
    /// Horizontal probe reaches this many run-steps ahead
    pub const PROBE_FACTOR: f32 = 2.0;

    /// Level geometry
    pub const BLOCK_SIZE: f32 = 96.0;
    pub const VIEW_WIDTH: f32 = 1000.0;
    pub const VIEW_HEIGHT: f32 = 650.0;
    /// Camera starts scrolling when an actor gets this close to a view edge
    pub const SCROLL_AREA_WIDTH: f32 = 500.0;

    /// Alpha above this value counts as opaque when building masks
    pub const ALPHA_THRESHOLD: u8 = 127;

    /// Round defaults
    pub const DEFAULT_ROUND_SECS: u32 = 100;
    pub const DEFAULT_FALL_OUT_Y: f32 = 630.0;
    /// View offset every stage starts with
    pub const DEFAULT_CAMERA_X: f32 = -1500.0;
    /// Largest entity side a level may declare
    pub const MAX_ENTITY_SIZE: f32 = 4096.0;
}

/// Snap a sub-pixel position to the pixel grid used for mask alignment
#[inline]
pub fn to_pixel(pos: Vec2) -> IVec2 {
    pos.floor().as_ivec2()
}

/// Convert a tick count to seconds at the given rate
#[inline]
pub fn ticks_to_secs(ticks: u64, fps: u32) -> f32 {
    ticks as f32 / fps.max(1) as f32
}
