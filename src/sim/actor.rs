//! Player-controlled actors
//!
//! Both players share one type; they differ only in the [`ActorProfile`]
//! (skin and animation speed) they are built with.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::mask::Mask;
use super::sprites::{AnimState, Facing, SpriteSet};
use crate::consts::*;
use crate::settings::Skin;

/// Per-player construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Which character's sprite sheets to use
    pub skin: Skin,
    /// Ticks each animation frame stays on screen
    pub animation_delay: u32,
}

impl ActorProfile {
    pub fn new(skin: Skin, animation_delay: u32) -> Self {
        Self {
            skin,
            animation_delay,
        }
    }
}

/// Vertical movement phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirState {
    Grounded,
    Jumping,
    DoubleJumping,
    Falling,
}

/// A player character
#[derive(Debug, Clone)]
pub struct Actor {
    /// Top-left corner
    pub pos: Vec2,
    /// Velocity in pixels per tick
    pub vel: Vec2,
    pub facing: Facing,
    /// Ticks since last grounded (drives the gravity ramp)
    fall_count: u32,
    jump_count: u8,
    /// Ticks elapsed since `make_hit`, while the hit window is open
    hit_ticks: Option<u32>,
    animation_count: u32,
    /// Animation count the visible frame was picked with during the last
    /// step
    frame_count: u32,
    profile: ActorProfile,
    sprites: Arc<SpriteSet>,
}

impl Actor {
    pub fn new(pos: Vec2, profile: ActorProfile, sprites: Arc<SpriteSet>) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: Facing::Left,
            fall_count: 0,
            jump_count: 0,
            hit_ticks: None,
            animation_count: 0,
            frame_count: 0,
            profile,
            sprites,
        }
    }

    pub fn profile(&self) -> &ActorProfile {
        &self.profile
    }

    pub fn fall_count(&self) -> u32 {
        self.fall_count
    }

    pub fn jump_count(&self) -> u8 {
        self.jump_count
    }

    pub fn animation_count(&self) -> u32 {
        self.animation_count
    }

    pub fn is_hit(&self) -> bool {
        self.hit_ticks.is_some()
    }

    /// Whether another jump is allowed. Callers must check this; `jump`
    /// itself does not refuse.
    pub fn can_jump(&self) -> bool {
        self.jump_count < MAX_JUMPS
    }

    /// Gravity ramp: velocity grows by `fall_count / fps`, at most 1 per tick
    pub fn apply_gravity(&mut self, fps: u32) {
        let ramp = self.fall_count as f32 / fps.max(1) as f32 * GRAVITY;
        self.vel.y += ramp.min(1.0);
    }

    pub fn jump(&mut self) {
        self.vel.y = -GRAVITY * JUMP_IMPULSE;
        self.animation_count = 0;
        self.jump_count = self.jump_count.saturating_add(1);
        if self.jump_count == 1 {
            self.fall_count = 0;
        }
    }

    pub fn move_left(&mut self, vel: f32) {
        self.move_horizontal(-vel.abs());
    }

    pub fn move_right(&mut self, vel: f32) {
        self.move_horizontal(vel.abs());
    }

    /// Set horizontal velocity; a change of facing restarts the animation
    pub fn move_horizontal(&mut self, vel: f32) {
        self.vel.x = vel;
        let facing = if vel < 0.0 {
            Facing::Left
        } else if vel > 0.0 {
            Facing::Right
        } else {
            return;
        };
        if self.facing != facing {
            self.facing = facing;
            self.animation_count = 0;
        }
    }

    pub fn stop_horizontal(&mut self) {
        self.vel.x = 0.0;
    }

    /// Open the hit window; it closes on its own after `HIT_DURATION_SECS`
    pub fn make_hit(&mut self) {
        self.hit_ticks = Some(0);
    }

    /// Advance one tick: gravity, motion, hit window, counters
    pub fn step(&mut self, fps: u32) {
        self.apply_gravity(fps);
        self.pos += self.vel;

        if let Some(ticks) = self.hit_ticks.as_mut() {
            *ticks += 1;
            if *ticks > fps * HIT_DURATION_SECS {
                self.hit_ticks = None;
            }
        }

        self.fall_count += 1;
        self.frame_count = self.animation_count;
        self.animation_count += 1;
    }

    /// Floor contact
    pub fn landed(&mut self) {
        self.fall_count = 0;
        self.vel.y = 0.0;
        self.jump_count = 0;
    }

    /// Ceiling contact: bounce back down
    pub fn hit_head(&mut self) {
        self.vel.y = -self.vel.y;
    }

    pub fn air_state(&self) -> AirState {
        if self.vel.y < 0.0 {
            if self.jump_count >= 2 {
                AirState::DoubleJumping
            } else {
                AirState::Jumping
            }
        } else if self.vel.y > 0.0 {
            AirState::Falling
        } else {
            AirState::Grounded
        }
    }

    /// Priority: hit, rising, falling fast, running, idle
    pub fn anim_state(&self) -> AnimState {
        if self.is_hit() {
            AnimState::Hit
        } else if self.vel.y < 0.0 {
            match self.jump_count {
                1 => AnimState::Jump,
                n if n >= 2 => AnimState::DoubleJump,
                _ => AnimState::Idle,
            }
        } else if self.vel.y > FALL_ANIM_THRESHOLD {
            AnimState::Fall
        } else if self.vel.x != 0.0 {
            AnimState::Run
        } else {
            AnimState::Idle
        }
    }

    /// Mask of the visible sprite frame
    pub fn current_frame(&self) -> &Mask {
        self.sprites.frame(
            self.anim_state(),
            self.facing,
            self.frame_count,
            self.profile.animation_delay,
        )
    }

    /// Index of the visible frame within its animation
    pub fn frame_index(&self) -> usize {
        self.sprites.frame_index(
            self.anim_state(),
            self.facing,
            self.frame_count,
            self.profile.animation_delay,
        )
    }

    /// Bounding box sized to the visible frame
    pub fn bounds(&self) -> Rect {
        let frame = self.current_frame();
        Rect::from_pos_size(
            self.pos,
            Vec2::new(frame.width() as f32, frame.height() as f32),
        )
    }

    /// Move so the bottom edge sits at `y`
    pub fn snap_bottom(&mut self, y: f32) {
        self.pos.y = y - self.bounds().size.y;
    }

    /// Move so the top edge sits at `y`
    pub fn snap_top(&mut self, y: f32) {
        self.pos.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn actor() -> Actor {
        let sprites = Arc::new(SpriteSet::uniform(Mask::filled(64, 64).unwrap()));
        Actor::new(Vec2::new(100.0, 200.0), ActorProfile::new(Skin::MaskDude, 3), sprites)
    }

    #[test]
    fn test_first_jump_resets_air_frames() {
        let mut a = actor();
        for _ in 0..10 {
            a.step(FPS);
        }
        assert_eq!(a.fall_count(), 10);
        a.jump();
        assert_eq!(a.vel.y, -8.0);
        assert_eq!(a.jump_count(), 1);
        assert_eq!(a.fall_count(), 0);
    }

    #[test]
    fn test_second_jump_keeps_air_frames() {
        let mut a = actor();
        a.jump();
        for _ in 0..5 {
            a.step(FPS);
        }
        a.jump();
        assert_eq!(a.jump_count(), 2);
        assert_eq!(a.fall_count(), 5);
        assert_eq!(a.vel.y, -8.0);
        assert!(!a.can_jump());
        assert_eq!(a.air_state(), AirState::DoubleJumping);
    }

    #[test]
    fn test_guarded_third_jump_leaves_velocity_alone() {
        let mut a = actor();
        a.jump();
        a.jump();
        a.step(FPS);
        let vy = a.vel.y;
        if a.can_jump() {
            a.jump();
        }
        assert_eq!(a.vel.y, vy);
        assert_eq!(a.jump_count(), 2);
    }

    #[test]
    fn test_direction_change_resets_animation() {
        let mut a = actor();
        a.step(FPS);
        a.step(FPS);
        a.move_left(PLAYER_VEL);
        assert_eq!(a.animation_count(), 2, "same facing keeps counting");
        a.move_right(PLAYER_VEL);
        assert_eq!(a.animation_count(), 0);
        assert_eq!(a.facing, Facing::Right);
        assert_eq!(a.vel.x, PLAYER_VEL);
    }

    #[test]
    fn test_hit_window_expires_by_frame_count() {
        let mut a = actor();
        a.make_hit();
        for _ in 0..FPS * 2 {
            a.step(FPS);
        }
        assert!(a.is_hit());
        assert_eq!(a.anim_state(), AnimState::Hit);
        a.step(FPS);
        assert!(!a.is_hit());
    }

    #[test]
    fn test_anim_priority() {
        let mut a = actor();
        assert_eq!(a.anim_state(), AnimState::Idle);
        a.move_right(PLAYER_VEL);
        assert_eq!(a.anim_state(), AnimState::Run);
        a.vel.y = 3.0;
        assert_eq!(a.anim_state(), AnimState::Fall);
        a.vel.y = 2.0;
        assert_eq!(a.anim_state(), AnimState::Run, "threshold is exclusive");
        a.jump();
        assert_eq!(a.anim_state(), AnimState::Jump);
        a.jump();
        assert_eq!(a.anim_state(), AnimState::DoubleJump);
        a.make_hit();
        assert_eq!(a.anim_state(), AnimState::Hit);
    }

    #[test]
    fn test_fast_fall_selects_fall_animation() {
        // Both players must show the fall sheet once speed passes the threshold
        let mut a = actor();
        a.vel.y = FALL_ANIM_THRESHOLD + 0.5;
        assert_eq!(a.anim_state(), AnimState::Fall);
    }

    #[test]
    fn test_landed_resets() {
        let mut a = actor();
        a.jump();
        a.jump();
        a.step(FPS);
        a.landed();
        assert_eq!(a.jump_count(), 0);
        assert_eq!(a.fall_count(), 0);
        assert_eq!(a.vel.y, 0.0);
        assert_eq!(a.air_state(), AirState::Grounded);
    }

    #[test]
    fn test_hit_head_inverts() {
        let mut a = actor();
        a.jump();
        a.hit_head();
        assert_eq!(a.vel.y, 8.0);
    }

    #[test]
    fn test_first_frame_holds_for_full_delay() {
        let frames = vec![
            Mask::filled(64, 64).unwrap(),
            Mask::filled(64, 64).unwrap(),
        ];
        let anims = std::collections::HashMap::from([
            (AnimState::Idle, frames.clone()),
            (AnimState::Jump, frames),
        ]);
        let sprites = Arc::new(SpriteSet::from_right_facing(anims).unwrap());
        let mut a = Actor::new(Vec2::ZERO, ActorProfile::new(Skin::MaskDude, 3), sprites);
        a.jump();
        let shown: Vec<usize> = (0..6)
            .map(|_| {
                a.step(FPS);
                a.frame_index()
            })
            .collect();
        assert_eq!(shown, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_bounds_follow_frame_size() {
        let a = actor();
        let b = a.bounds();
        assert_eq!(b.size, Vec2::new(64.0, 64.0));
        assert_eq!(b.pos, Vec2::new(100.0, 200.0));
    }

    proptest! {
        #[test]
        fn gravity_accumulates_capped_ramp(n in 0u32..400, fps in 1u32..240) {
            let mut a = actor();
            for _ in 0..n {
                a.step(fps);
            }
            let expected: f32 = (0..n)
                .map(|k| (k as f32 / fps as f32 * GRAVITY).min(1.0))
                .sum();
            prop_assert!((a.vel.y - expected).abs() < 1e-2 * (1.0 + expected));
        }

        #[test]
        fn gravity_increment_never_exceeds_one(n in 0u32..400) {
            let mut a = actor();
            for _ in 0..n {
                a.step(FPS);
            }
            let before = a.vel.y;
            a.apply_gravity(FPS);
            prop_assert!(a.vel.y - before <= 1.0 + f32::EPSILON);
        }
    }
}
