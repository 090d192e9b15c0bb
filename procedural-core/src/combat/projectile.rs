//! Ranged projectiles.
//!
//! A projectile travels linearly from its origin to a target point recorded
//! at launch over a fixed number of ticks. It connects at most once, with
//! the entity it was aimed at, when that entity is within the hit radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::apply_hit;
use crate::constants::{PROJECTILE_HIT_RADIUS, PROJECTILE_TRAVEL_TICKS};
use crate::entity::{Entity, EntityId};
use crate::events::{EventLog, SimEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: EntityId,
    pub target: EntityId,
    pub origin: Vec2,
    pub target_point: Vec2,
    pub damage: f32,
    pub elapsed: u32,
    pub travel_ticks: u32,
    pub spent: bool,
}

impl Projectile {
    pub fn launch(
        owner: EntityId,
        target: EntityId,
        origin: Vec2,
        target_point: Vec2,
        damage: f32,
    ) -> Self {
        Self {
            owner,
            target,
            origin,
            target_point,
            damage,
            elapsed: 0,
            travel_ticks: PROJECTILE_TRAVEL_TICKS,
            spent: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        let t = if self.travel_ticks == 0 {
            1.0
        } else {
            (self.elapsed as f32 / self.travel_ticks as f32).min(1.0)
        };
        self.origin.lerp(self.target_point, t)
    }

    pub fn is_active(&self) -> bool {
        !self.spent
    }

    /// Advance one tick and test against the aimed-at entity.
    /// Returns true when this tick connected.
    pub fn step(
        &mut self,
        target: &mut Entity,
        events: &mut EventLog,
        kills: &mut Vec<EntityId>,
    ) -> bool {
        if self.spent {
            return false;
        }
        self.elapsed += 1;
        let pos = self.position();

        if target.id == self.target
            && target.is_alive()
            && pos.distance(target.pos) <= PROJECTILE_HIT_RADIUS
        {
            apply_hit(target, self.owner, self.origin, self.damage, events, kills);
            events.push(SimEvent::ProjectileHit {
                owner: self.owner,
                target: target.id,
            });
            self.spent = true;
            return true;
        }

        if self.elapsed >= self.travel_ticks {
            self.spent = true;
        }
        false
    }
}
