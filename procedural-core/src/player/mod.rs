//! Avatar controller.
//!
//! Turns a [`PlayerInput`] into movement, facing, melee attacks and resource
//! upkeep for one tick. Stamina pays for sprinting and attacks; shield
//! regenerates only after a quiet spell without damage.

pub mod input;

pub use input::PlayerInput;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{resolve_melee, MeleeAttack, WeaponStats};
use crate::constants::{
    ATTACK_STAMINA_COST, AVATAR_HALF_EXTENT, AVATAR_MAX_HEALTH, AVATAR_MAX_MANA,
    AVATAR_MAX_SHIELD, AVATAR_MAX_STAMINA, AVATAR_SPEED, AVATAR_SPRINT_MULT, MANA_REGEN,
    SHIELD_REGEN, SHIELD_REGEN_DELAY, SPRINT_STAMINA_COST, STAMINA_REGEN,
};
use crate::entity::{Entity, EntityId, PoolSizes};
use crate::events::{EventLog, SimEvent};
use crate::monster::Adversary;
use crate::movement::{Aabb, CollisionContext};
use crate::world::{tile_center, TileGrid, TilePos};

/// Everything the avatar may read or mutate during its update.
pub struct AvatarContext<'a> {
    pub input: &'a PlayerInput,
    pub grid: &'a mut TileGrid,
    pub others: &'a mut [Adversary],
    pub events: &'a mut EventLog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub entity: Entity,
    /// Ticks the current swing remains visible
    pub attack_active_ticks: u32,
    pub attack_cooldown: u32,
    pub sprinting: bool,
    pub attacked_this_tick: bool,
}

impl Avatar {
    pub fn spawn(tile: TilePos) -> Self {
        Self {
            entity: Entity::new(
                EntityId::AVATAR,
                tile_center(tile),
                AVATAR_HALF_EXTENT,
                AVATAR_SPEED,
                PoolSizes {
                    health: AVATAR_MAX_HEALTH,
                    stamina: AVATAR_MAX_STAMINA,
                    mana: AVATAR_MAX_MANA,
                    shield: AVATAR_MAX_SHIELD,
                },
                WeaponStats::avatar_blade(),
            ),
            attack_active_ticks: 0,
            attack_cooldown: 0,
            sprinting: false,
            attacked_this_tick: false,
        }
    }

    /// Carry perks and pool maxima onto a new level: refill, re-place, and
    /// drop every transient combat state.
    pub fn relocate(&mut self, tile: TilePos) {
        self.entity.pos = tile_center(tile);
        self.entity.refill();
        self.entity.knockback.clear();
        self.entity.facing = 0.0;
        self.attack_active_ticks = 0;
        self.attack_cooldown = 0;
        self.sprinting = false;
        self.attacked_this_tick = false;
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_active_ticks > 0
    }

    pub fn update(&mut self, ctx: &mut AvatarContext<'_>) {
        self.sprinting = false;
        self.attacked_this_tick = false;
        if !self.entity.is_alive() {
            return;
        }
        self.attack_active_ticks = self.attack_active_ticks.saturating_sub(1);
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.entity.ticks_since_damage = self.entity.ticks_since_damage.saturating_add(1);

        let knocked_back = self.entity.step_knockback(ctx.grid);
        let movement = ctx.input.movement();
        if !knocked_back && movement != Vec2::ZERO {
            self.walk(movement, ctx);
        }

        match ctx.input.aim {
            Some(aim) => self.entity.face(aim - self.entity.pos),
            None => self.entity.face(movement),
        }

        if ctx.input.attack {
            self.try_attack(ctx);
        }
        self.regenerate();
    }

    fn walk(&mut self, movement: Vec2, ctx: &mut AvatarContext<'_>) {
        let sprint = ctx.input.sprint && self.entity.stamina.current() >= SPRINT_STAMINA_COST;
        let mut speed = self.entity.speed();
        if sprint {
            self.entity.stamina.drain(SPRINT_STAMINA_COST);
            speed *= AVATAR_SPRINT_MULT;
            self.sprinting = true;
        }
        let blockers: Vec<Aabb> = ctx
            .others
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| a.entity.aabb())
            .collect();
        let collision = CollisionContext {
            grid: &*ctx.grid,
            blockers: &blockers,
        };
        self.entity.try_move(movement * speed, &collision);
    }

    fn try_attack(&mut self, ctx: &mut AvatarContext<'_>) {
        if self.attack_cooldown > 0 || self.entity.stamina.current() < ATTACK_STAMINA_COST {
            return;
        }
        self.entity.stamina.drain(ATTACK_STAMINA_COST);
        let attack = MeleeAttack::from_entity(&self.entity);
        let outcome = resolve_melee(
            &attack,
            ctx.others.iter_mut().map(|a| &mut a.entity),
            ctx.grid,
            ctx.events,
        );
        ctx.events.push(SimEvent::AttackStarted {
            attacker: self.entity.id,
            hit: outcome.hit(),
        });
        self.attack_active_ticks = attack.stats.active_ticks;
        self.attack_cooldown = attack.stats.cooldown_ticks;
        self.attacked_this_tick = true;
    }

    fn regenerate(&mut self) {
        let e = &mut self.entity;
        if !self.sprinting && !self.attacked_this_tick {
            e.stamina.restore(STAMINA_REGEN);
        }
        e.mana.restore(MANA_REGEN);
        if e.ticks_since_damage >= SHIELD_REGEN_DELAY {
            e.shield.restore(SHIELD_REGEN);
        }
    }
}
