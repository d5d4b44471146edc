//! Axis-aligned rectangle geometry
//!
//! Positions are top-left corners in screen space (y grows downward), kept
//! at sub-pixel precision. Mask tests align on [`Rect::pixel_origin`].

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::to_pixel;

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Move so the bottom edge sits at `y`
    pub fn set_bottom(&mut self, y: f32) {
        self.pos.y = y - self.size.y;
    }

    /// Move so the top edge sits at `y`
    pub fn set_top(&mut self, y: f32) {
        self.pos.y = y;
    }

    /// A copy shifted by (dx, dy)
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            pos: self.pos + Vec2::new(dx, dy),
            size: self.size,
        }
    }

    /// Strict overlap test; rectangles that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Top-left corner on the pixel grid
    pub fn pixel_origin(&self) -> IVec2 {
        to_pixel(self.pos)
    }

    /// True when either dimension is zero or negative
    pub fn is_degenerate(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
    }

    #[test]
    fn test_set_bottom_keeps_size() {
        let mut r = Rect::new(0.0, 0.0, 64.0, 64.0);
        r.set_bottom(554.0);
        assert_eq!(r.bottom(), 554.0);
        assert_eq!(r.top(), 490.0);
        assert_eq!(r.size, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn test_pixel_origin_floors() {
        let r = Rect::new(-0.5, 3.99, 1.0, 1.0);
        assert_eq!(r.pixel_origin(), IVec2::new(-1, 3));
    }

    #[test]
    fn test_degenerate() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 5.0).is_degenerate());
    }
}
