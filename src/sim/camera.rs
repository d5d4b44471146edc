//! Horizontal scrolling camera
//!
//! The view follows player one. It only scrolls while that player runs
//! into the margin at either side of the view.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use crate::consts::{SCROLL_AREA_WIDTH, VIEW_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x shown at the left edge of the view
    pub offset_x: f32,
    pub view_width: f32,
    pub scroll_area_width: f32,
}

impl Camera {
    pub fn new(offset_x: f32) -> Self {
        Self {
            offset_x,
            view_width: VIEW_WIDTH,
            scroll_area_width: SCROLL_AREA_WIDTH,
        }
    }

    /// Scroll by the actor's run speed when it pushes into a margin
    pub fn follow(&mut self, actor: &Actor) {
        let b = actor.bounds();
        let vx = actor.vel.x;
        let near_right = b.right() - self.offset_x >= self.view_width - self.scroll_area_width;
        let near_left = b.left() - self.offset_x <= self.scroll_area_width;
        if (near_right && vx > 0.0) || (near_left && vx < 0.0) {
            self.offset_x += vx;
        }
    }

    /// Screen x of a world x
    pub fn to_screen(&self, x: f32) -> f32 {
        x - self.offset_x
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec2;

    use super::*;
    use crate::settings::Skin;
    use crate::sim::actor::ActorProfile;
    use crate::sim::mask::Mask;
    use crate::sim::sprites::SpriteSet;

    fn actor_at(x: f32) -> Actor {
        let sprites = Arc::new(SpriteSet::uniform(Mask::filled(64, 64).unwrap()));
        Actor::new(Vec2::new(x, 0.0), ActorProfile::new(Skin::MaskDude, 3), sprites)
    }

    #[test]
    fn test_no_scroll_running_out_of_left_margin() {
        let mut cam = Camera::new(0.0);
        let mut a = actor_at(100.0);
        a.move_right(5.0);
        cam.follow(&a);
        assert_eq!(cam.offset_x, 0.0);
    }

    #[test]
    fn test_scrolls_right_in_margin() {
        let mut cam = Camera::new(0.0);
        let mut a = actor_at(500.0);
        a.move_right(5.0);
        cam.follow(&a);
        assert_eq!(cam.offset_x, 5.0);
    }

    #[test]
    fn test_scrolls_left_in_margin() {
        let mut cam = Camera::new(-1500.0);
        let mut a = actor_at(-1000.0);
        a.move_left(5.0);
        cam.follow(&a);
        assert_eq!(cam.offset_x, -1505.0);
        assert_eq!(cam.to_screen(-1000.0), 505.0);
    }
}
