//! Animation frame sets
//!
//! The asset layer slices sprite sheets and hands us one mask per frame.
//! Which frame is visible decides the actor's collision shape, so the frame
//! lists live in the simulation even though the pixels do not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mask::Mask;

/// Visual state of an actor, derived every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    Run,
    Jump,
    DoubleJump,
    Fall,
    Hit,
}

impl AnimState {
    pub const ALL: [AnimState; 6] = [
        AnimState::Idle,
        AnimState::Run,
        AnimState::Jump,
        AnimState::DoubleJump,
        AnimState::Fall,
        AnimState::Hit,
    ];

    /// Sprite sheet name used by the asset layer
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimState::Idle => "idle",
            AnimState::Run => "run",
            AnimState::Jump => "jump",
            AnimState::DoubleJump => "double_jump",
            AnimState::Fall => "fall",
            AnimState::Hit => "hit",
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpriteError {
    #[error("sprite set has no idle frames")]
    MissingIdle,
    #[error("animation {0} has an empty frame list")]
    EmptyAnimation(&'static str),
}

/// Frames for every (animation, facing) pair of one character skin
#[derive(Debug, Clone)]
pub struct SpriteSet {
    frames: HashMap<(AnimState, Facing), Vec<Mask>>,
}

impl SpriteSet {
    /// Build from right-facing frames; left frames are mirrored copies
    pub fn from_right_facing(anims: HashMap<AnimState, Vec<Mask>>) -> Result<Self, SpriteError> {
        let mut frames = HashMap::new();
        for (anim, list) in anims {
            if list.is_empty() {
                return Err(SpriteError::EmptyAnimation(anim.as_str()));
            }
            let flipped = list.iter().map(Mask::flipped_horizontal).collect();
            frames.insert((anim, Facing::Right), list);
            frames.insert((anim, Facing::Left), flipped);
        }
        if !frames.contains_key(&(AnimState::Idle, Facing::Right)) {
            return Err(SpriteError::MissingIdle);
        }
        Ok(Self { frames })
    }

    /// A single frame shared by every animation and facing
    pub fn uniform(mask: Mask) -> Self {
        let mut frames = HashMap::new();
        for anim in AnimState::ALL {
            frames.insert((anim, Facing::Left), vec![mask.clone()]);
            frames.insert((anim, Facing::Right), vec![mask.clone()]);
        }
        Self { frames }
    }

    /// Frame list for a state; missing animations fall back to idle
    pub fn frames(&self, anim: AnimState, facing: Facing) -> &[Mask] {
        self.frames
            .get(&(anim, facing))
            .or_else(|| self.frames.get(&(AnimState::Idle, facing)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Frame visible after `animation_count` ticks in this state
    pub fn frame(&self, anim: AnimState, facing: Facing, animation_count: u32, delay: u32) -> &Mask {
        let frames = self.frames(anim, facing);
        // Construction guarantees idle frames for both facings
        let index = (animation_count / delay.max(1)) as usize % frames.len();
        &frames[index]
    }

    /// Index into the frame list, for the presentation layer
    pub fn frame_index(&self, anim: AnimState, facing: Facing, animation_count: u32, delay: u32) -> usize {
        let len = self.frames(anim, facing).len().max(1);
        (animation_count / delay.max(1)) as usize % len
    }
}
