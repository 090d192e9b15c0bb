//! Axis-aligned collision and sliding movement.
//!
//! A move first tries the full displacement. When blocked, each axis is tried
//! on its own; a blocked axis creeps forward in `CREEP_STEP` increments until
//! the next step would collide. The result slides along walls instead of
//! stopping dead on diagonal contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::CREEP_STEP;
use crate::world::TileGrid;

const EPSILON: f32 = 1e-4;

/// Axis-aligned bounding box in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Strict overlap; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// What a moving entity collides with this tick.
pub struct CollisionContext<'a> {
    pub grid: &'a TileGrid,
    /// Boxes of entities that block the mover
    pub blockers: &'a [Aabb],
}

impl<'a> CollisionContext<'a> {
    /// Walls only - used by knockback
    pub fn walls_only(grid: &'a TileGrid) -> Self {
        Self {
            grid,
            blockers: &[],
        }
    }

    /// Blockers already overlapping `start` are ignored so entities that
    /// end up intersecting can still separate.
    fn collides(&self, candidate: &Aabb, start: &Aabb) -> bool {
        self.grid.overlaps_wall(candidate)
            || self
                .blockers
                .iter()
                .any(|b| b.intersects(candidate) && !b.intersects(start))
    }

    /// Resolve a move of a box centered at `pos`. Returns the new center.
    pub fn resolve(&self, pos: Vec2, half: Vec2, delta: Vec2) -> Vec2 {
        if !delta.is_finite() || delta.length_squared() < EPSILON * EPSILON {
            return pos;
        }
        let start = Aabb::from_center(pos, half);
        if !self.collides(&start.translated(delta), &start) {
            return pos + delta;
        }

        let mut current = pos;
        for axis in [Vec2::X, Vec2::Y] {
            let amount = delta.dot(axis);
            if amount.abs() < EPSILON {
                continue;
            }
            let full = current + axis * amount;
            if !self.collides(&Aabb::from_center(full, half), &start) {
                current = full;
                continue;
            }
            current = self.creep(current, half, axis * amount.signum(), amount.abs(), &start);
        }
        current
    }

    fn creep(&self, mut pos: Vec2, half: Vec2, dir: Vec2, distance: f32, start: &Aabb) -> Vec2 {
        let mut travelled = 0.0;
        while travelled < distance {
            let step = CREEP_STEP.min(distance - travelled);
            let next = pos + dir * step;
            if self.collides(&Aabb::from_center(next, half), start) {
                break;
            }
            pos = next;
            travelled += step;
        }
        pos
    }

    /// Try the full move with no sliding. `None` when blocked.
    pub fn try_direct(&self, pos: Vec2, half: Vec2, delta: Vec2) -> Option<Vec2> {
        let start = Aabb::from_center(pos, half);
        (!self.collides(&start.translated(delta), &start)).then_some(pos + delta)
    }
}

/// Unit direction or `None` for a zero/degenerate vector
pub fn safe_normalize(v: Vec2) -> Option<Vec2> {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq < EPSILON * EPSILON {
        return None;
    }
    Some(v / len_sq.sqrt())
}
