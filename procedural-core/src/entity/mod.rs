//! Shared entity state for the avatar and adversaries.
//!
//! Position is continuous (world units); the collision box is centered on the
//! position with integer half-extents. Resource pools are clamped by
//! construction. Knockback overrides voluntary movement while active.

pub mod perks;
pub mod pool;

pub use perks::{PerkKind, PerkModifiers};
pub use pool::Pool;

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::WeaponStats;
use crate::constants::{KNOCKBACK_DECAY, KNOCKBACK_FORCE, KNOCKBACK_TICKS};
use crate::movement::{safe_normalize, Aabb, CollisionContext};
use crate::world::TileGrid;

/// Stable entity identifier. The avatar is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const AVATAR: EntityId = EntityId(0);
}

/// Facing quantized to eight bins, clockwise from east (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Octant {
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
}

impl Octant {
    pub const ALL: [Octant; 8] = [
        Octant::East,
        Octant::SouthEast,
        Octant::South,
        Octant::SouthWest,
        Octant::West,
        Octant::NorthWest,
        Octant::North,
        Octant::NorthEast,
    ];

    pub fn from_angle(angle: f32) -> Self {
        if !angle.is_finite() {
            return Octant::East;
        }
        let bin = (angle.rem_euclid(TAU) / FRAC_PI_4).round() as usize % 8;
        Self::ALL[bin]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn angle(&self) -> f32 {
        self.index() as f32 * FRAC_PI_4
    }
}

/// Decaying forced displacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    pub velocity: Vec2,
    pub ticks_remaining: u32,
}

impl Knockback {
    pub fn is_active(&self) -> bool {
        self.ticks_remaining > 0
    }

    pub fn clear(&mut self) {
        self.velocity = Vec2::ZERO;
        self.ticks_remaining = 0;
    }
}

/// Outcome of a damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    pub absorbed: f32,
    pub dealt: f32,
    pub killed: bool,
}

/// Starting pool sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSizes {
    pub health: f32,
    pub stamina: f32,
    pub mana: f32,
    pub shield: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub half_extent: i32,
    pub base_speed: f32,
    pub health: Pool,
    pub stamina: Pool,
    pub mana: Pool,
    pub shield: Pool,
    /// Facing angle in radians
    pub facing: f32,
    pub knockback: Knockback,
    pub perks: PerkModifiers,
    pub weapon: WeaponStats,
    pub ticks_since_damage: u32,
    pub(crate) alive: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        pos: Vec2,
        half_extent: i32,
        base_speed: f32,
        pools: PoolSizes,
        weapon: WeaponStats,
    ) -> Self {
        Self {
            id,
            pos,
            half_extent,
            base_speed,
            health: Pool::new(pools.health),
            stamina: Pool::new(pools.stamina),
            mana: Pool::new(pools.mana),
            shield: Pool::new(pools.shield),
            facing: 0.0,
            knockback: Knockback::default(),
            perks: PerkModifiers::default(),
            weapon,
            ticks_since_damage: 0,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn half(&self) -> Vec2 {
        Vec2::splat(self.half_extent as f32)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half())
    }

    pub fn speed(&self) -> f32 {
        self.base_speed * self.perks.speed
    }

    /// Weapon with perk multipliers applied
    pub fn attack_stats(&self) -> WeaponStats {
        self.weapon.scaled(&self.perks)
    }

    pub fn facing_dir(&self) -> Vec2 {
        Vec2::from_angle(self.facing)
    }

    pub fn octant(&self) -> Octant {
        Octant::from_angle(self.facing)
    }

    /// Face along `dir`; zero-length directions keep the current facing
    pub fn face(&mut self, dir: Vec2) {
        if let Some(d) = safe_normalize(dir) {
            self.facing = d.y.atan2(d.x);
        }
    }

    /// Voluntary move with wall sliding. Returns the displacement applied.
    pub fn try_move(&mut self, delta: Vec2, ctx: &CollisionContext<'_>) -> Vec2 {
        let before = self.pos;
        self.pos = ctx.resolve(self.pos, self.half(), delta);
        self.pos - before
    }

    /// Push away from `from`. A source at the entity's own position does nothing.
    pub fn apply_knockback(&mut self, from: Vec2) {
        if let Some(dir) = safe_normalize(self.pos - from) {
            self.knockback.velocity = dir * KNOCKBACK_FORCE;
            self.knockback.ticks_remaining = KNOCKBACK_TICKS;
        }
    }

    /// Advance knockback by one tick against walls only. Returns whether it
    /// was active this tick.
    pub fn step_knockback(&mut self, grid: &TileGrid) -> bool {
        if !self.knockback.is_active() {
            return false;
        }
        let ctx = CollisionContext::walls_only(grid);
        match ctx.try_direct(self.pos, self.half(), self.knockback.velocity) {
            Some(next) => {
                self.pos = next;
                self.knockback.velocity *= KNOCKBACK_DECAY;
                self.knockback.ticks_remaining -= 1;
                if self.knockback.ticks_remaining == 0 {
                    self.knockback.clear();
                }
            }
            None => self.knockback.clear(),
        }
        true
    }

    /// Shield absorbs first, then health. Dead entities ignore damage.
    pub fn take_damage(&mut self, amount: f32) -> Option<DamageReport> {
        if !self.alive || !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        let absorbed = self.shield.drain(amount);
        let dealt = self.health.drain(amount - absorbed);
        self.ticks_since_damage = 0;
        let killed = self.health.is_empty();
        if killed {
            self.kill();
        }
        Some(DamageReport {
            absorbed,
            dealt,
            killed,
        })
    }

    pub(crate) fn kill(&mut self) {
        self.alive = false;
        self.health.set(0.0);
        self.knockback.clear();
    }

    /// Apply a percent-increase perk
    pub fn apply_perk(&mut self, kind: PerkKind) {
        match kind {
            PerkKind::Health => self.health.scale_max(kind.factor()),
            PerkKind::Stamina => self.stamina.scale_max(kind.factor()),
            _ => {}
        }
        self.perks.record(kind);
    }

    pub fn refill(&mut self) {
        self.health.refill();
        self.stamina.refill();
        self.mana.refill();
        self.shield.refill();
        self.ticks_since_damage = 0;
        self.alive = true;
    }
}
