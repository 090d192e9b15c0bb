//! Oriented hit rectangles and their overlap tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::movement::{safe_normalize, Aabb};

/// Rectangle rotated to the attacker's facing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitShape {
    pub center: Vec2,
    /// Unit vector along the reach direction
    pub axis: Vec2,
    pub half_length: f32,
    pub half_width: f32,
}

impl HitShape {
    /// Shape spanning `reach` units out from `origin` along `dir`, `width` wide.
    /// A zero direction falls back to +x.
    pub fn from_attack(origin: Vec2, dir: Vec2, reach: f32, width: f32) -> Self {
        let axis = safe_normalize(dir).unwrap_or(Vec2::X);
        let half_length = reach.max(0.0) * 0.5;
        Self {
            center: origin + axis * half_length,
            axis,
            half_length,
            half_width: width.max(0.0) * 0.5,
        }
    }

    pub fn perp(&self) -> Vec2 {
        self.axis.perp()
    }

    /// Axis-aligned bounds of the rotated rectangle
    pub fn bounds(&self) -> Aabb {
        let ext = Vec2::new(
            self.half_length * self.axis.x.abs() + self.half_width * self.perp().x.abs(),
            self.half_length * self.axis.y.abs() + self.half_width * self.perp().y.abs(),
        );
        Aabb::from_center(self.center, ext)
    }

    fn radius_on(&self, n: Vec2) -> f32 {
        self.half_length * self.axis.dot(n).abs() + self.half_width * self.perp().dot(n).abs()
    }

    /// Separating-axis test against an axis-aligned box. Touching edges do not count.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let half = aabb.half_extents();
        let offset = aabb.center() - self.center;
        for n in [Vec2::X, Vec2::Y, self.axis, self.perp()] {
            let box_radius = half.x * n.x.abs() + half.y * n.y.abs();
            if offset.dot(n).abs() >= self.radius_on(n) + box_radius {
                return false;
            }
        }
        true
    }
}
