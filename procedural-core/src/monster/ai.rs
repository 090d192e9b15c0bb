//! Adversary behavior state machine.
//!
//! One machine for every archetype, driven by distance to the avatar, the
//! concealment predicate and tick-granular counters. Counters tick down on
//! every update whatever the current state. Movement is suppressed during
//! windup, charge-up, stomp windup and the active attack window.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Adversary, AttackKind};
use crate::combat::{apply_hit, resolve_melee, MeleeAttack, Projectile};
use crate::entity::{Entity, EntityId};
use crate::events::{EventLog, SimEvent};
use crate::movement::{safe_normalize, CollisionContext};
use crate::world::TileGrid;

/// Fraction of chase speed used while wandering
const WANDER_SPEED_SCALE: f32 = 0.5;
/// Chance a fresh wander pick is a pause instead of a heading
const WANDER_IDLE_CHANCE: f32 = 0.3;
const STRAFE_FREQUENCY: f32 = 0.08;
/// Spacing kept between adversaries, added to their combined extents
const SEPARATION_MARGIN: f32 = 4.0;
const SEPARATION_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    Wander,
    Approach,
    /// Ranged only: too close, open the distance
    BackOff,
    AttackWindup,
    /// Heavy archetypes: long windup before the big hit
    ChargeUp,
    /// Heavy archetypes: windup of the area attack
    Stomp,
    AttackActive,
    Cooldown,
}

impl BehaviorState {
    /// States in which voluntary movement is ignored
    pub fn locks_movement(&self) -> bool {
        matches!(
            self,
            BehaviorState::AttackWindup
                | BehaviorState::ChargeUp
                | BehaviorState::Stomp
                | BehaviorState::AttackActive
        )
    }
}

/// Everything an adversary may read or mutate during its update.
pub struct AdversaryContext<'a> {
    pub target: &'a mut Entity,
    /// Concealment predicate supplied by the level
    pub target_concealed: bool,
    pub grid: &'a mut TileGrid,
    /// Positions of living adversaries at the start of the phase. An entry
    /// equal to the mover's own position is skipped.
    pub allies: &'a [Vec2],
    pub projectiles: &'a mut Vec<Projectile>,
    pub events: &'a mut EventLog,
}

impl Adversary {
    /// Advance this adversary by one tick
    pub fn update(&mut self, ctx: &mut AdversaryContext<'_>) {
        if !self.entity.is_alive() {
            return;
        }
        self.age = self.age.wrapping_add(1);
        self.state_ticks = self.state_ticks.saturating_sub(1);
        self.stomp_cooldown = self.stomp_cooldown.saturating_sub(1);
        self.tick_rage(ctx.events);

        let knocked_back = self.entity.step_knockback(ctx.grid);
        let to_target = ctx.target.pos - self.entity.pos;
        let dist = to_target.length();
        let aware =
            ctx.target.is_alive() && !ctx.target_concealed && dist <= self.aggression_radius();
        let can_move = !knocked_back && !self.state.locks_movement();

        match self.state {
            BehaviorState::Wander => {
                if aware {
                    self.enter(BehaviorState::Approach, 0);
                } else if can_move {
                    self.wander(ctx);
                }
            }
            BehaviorState::Approach => {
                if !aware {
                    self.enter(BehaviorState::Wander, 0);
                } else if self.profile.min_range.is_some_and(|min| dist < min) {
                    self.enter(BehaviorState::BackOff, 0);
                } else if dist <= self.profile.attack_range {
                    self.begin_attack(to_target, dist, ctx);
                } else if can_move {
                    self.pursue(to_target, 1.0, ctx);
                }
            }
            BehaviorState::BackOff => {
                let min = self.profile.min_range.unwrap_or(0.0);
                if !aware {
                    self.enter(BehaviorState::Wander, 0);
                } else if dist >= min {
                    self.enter(BehaviorState::Approach, 0);
                } else if can_move {
                    self.pursue(to_target, -1.0, ctx);
                }
            }
            BehaviorState::AttackWindup | BehaviorState::ChargeUp => {
                if self.state_ticks == 0 {
                    self.activate(ctx);
                }
            }
            BehaviorState::Stomp => {
                if self.state_ticks == 0 {
                    self.stomp(ctx);
                }
            }
            BehaviorState::AttackActive => {
                if self.state_ticks == 0 {
                    self.enter(BehaviorState::Cooldown, self.entity.weapon.cooldown_ticks);
                }
            }
            BehaviorState::Cooldown => {
                if self.state_ticks == 0 {
                    let next = if aware {
                        BehaviorState::Approach
                    } else {
                        BehaviorState::Wander
                    };
                    self.enter(next, 0);
                } else if can_move && aware && self.profile.min_range.is_some_and(|m| dist < m) {
                    self.pursue(to_target, -1.0, ctx);
                }
            }
        }
    }

    fn enter(&mut self, state: BehaviorState, ticks: u32) {
        if self.state != state {
            trace!(id = self.entity.id.0, from = ?self.state, to = ?state, "adversary state");
        }
        self.state = state;
        self.state_ticks = ticks;
    }

    fn tick_rage(&mut self, events: &mut EventLog) {
        let Some(rage) = self.profile.rage else {
            return;
        };
        if self.rage_ticks > 0 {
            self.rage_ticks -= 1;
            if self.rage_ticks == 0 {
                events.push(SimEvent::RageEnded { id: self.entity.id });
            }
        } else if !self.rage_spent && self.entity.health.fraction() <= rage.health_threshold {
            self.rage_ticks = rage.duration_ticks;
            self.rage_spent = true;
            events.push(SimEvent::RageEntered { id: self.entity.id });
        }
    }

    fn begin_attack(&mut self, to_target: Vec2, dist: f32, ctx: &mut AdversaryContext<'_>) {
        self.entity.face(to_target);
        if let Some(stomp) = self.profile.stomp {
            if self.stomp_cooldown == 0 && dist <= stomp.radius {
                self.enter(BehaviorState::Stomp, stomp.windup_ticks);
                return;
            }
        }
        if let Some(charge) = self.profile.charge {
            self.enter(BehaviorState::ChargeUp, charge);
        } else if self.profile.windup_ticks > 0 {
            self.enter(BehaviorState::AttackWindup, self.profile.windup_ticks);
        } else {
            self.activate(ctx);
        }
    }

    /// The attack lands now. Melee resolves immediately; ranged launches.
    fn activate(&mut self, ctx: &mut AdversaryContext<'_>) {
        let id = self.entity.id;
        match self.profile.attack {
            AttackKind::Melee => {
                let attack = MeleeAttack::from_entity(&self.entity);
                let outcome = resolve_melee(
                    &attack,
                    std::iter::once(&mut *ctx.target),
                    ctx.grid,
                    ctx.events,
                );
                ctx.events.push(SimEvent::AttackStarted {
                    attacker: id,
                    hit: outcome.hit(),
                });
            }
            AttackKind::Ranged => {
                if ctx.target.is_alive() {
                    let to_target = ctx.target.pos - self.entity.pos;
                    let noise = self.jitter.next_signed() * self.profile.aim_jitter;
                    let aimed = Vec2::from_angle(noise).rotate(to_target);
                    let damage = self.entity.attack_stats().damage;
                    ctx.projectiles.push(Projectile::launch(
                        id,
                        ctx.target.id,
                        self.entity.pos,
                        self.entity.pos + aimed,
                        damage,
                    ));
                    ctx.events.push(SimEvent::ProjectileFired { owner: id });
                }
            }
        }
        self.enter(BehaviorState::AttackActive, self.entity.weapon.active_ticks);
    }

    fn stomp(&mut self, ctx: &mut AdversaryContext<'_>) {
        let Some(stomp) = self.profile.stomp else {
            self.enter(BehaviorState::Cooldown, self.entity.weapon.cooldown_ticks);
            return;
        };
        let in_reach =
            ctx.target.is_alive() && ctx.target.pos.distance(self.entity.pos) <= stomp.radius;
        if in_reach {
            let damage = stomp.damage * self.entity.perks.damage;
            let mut kills: Vec<EntityId> = Vec::new();
            apply_hit(ctx.target, self.entity.id, self.entity.pos, damage, ctx.events, &mut kills);
        }
        ctx.events.push(SimEvent::Stomp {
            attacker: self.entity.id,
            hit: in_reach,
        });
        self.stomp_cooldown = stomp.cooldown_ticks;
        self.enter(BehaviorState::Cooldown, self.entity.weapon.cooldown_ticks);
    }

    /// Move towards (`sign` = 1) or away from (`sign` = -1) the target with
    /// strafe weave and ally separation.
    fn pursue(&mut self, to_target: Vec2, sign: f32, ctx: &mut AdversaryContext<'_>) {
        let Some(forward) = safe_normalize(to_target) else {
            return;
        };
        let weave = (self.age as f32 * STRAFE_FREQUENCY + self.strafe_phase).sin();
        let strafe = forward.perp() * weave * self.profile.strafe_amplitude;
        let desired = forward * sign + strafe + self.separation(ctx.allies) * SEPARATION_WEIGHT;
        if let Some(dir) = safe_normalize(desired) {
            self.step(dir * self.move_speed(), ctx);
            if sign > 0.0 {
                self.entity.face(forward);
            } else {
                self.entity.face(-forward);
            }
        }
    }

    fn wander(&mut self, ctx: &mut AdversaryContext<'_>) {
        if self.wander_ticks == 0 {
            self.wander_dir = if self.jitter.next_f32() < WANDER_IDLE_CHANCE {
                Vec2::ZERO
            } else {
                Vec2::from_angle(self.jitter.next_f32() * TAU)
            };
            self.wander_ticks = self.jitter.next_range(30, 90);
        } else {
            self.wander_ticks -= 1;
        }

        let desired = self.wander_dir + self.separation(ctx.allies) * SEPARATION_WEIGHT;
        let Some(dir) = safe_normalize(desired) else {
            return;
        };
        let intended = dir * self.move_speed() * WANDER_SPEED_SCALE;
        let moved = self.step(intended, ctx);
        self.entity.face(dir);
        if moved.length_squared() < intended.length_squared() * 0.25 {
            // Stuck against something; repick next tick
            self.wander_ticks = 0;
        }
    }

    fn separation(&self, allies: &[Vec2]) -> Vec2 {
        let radius = self.entity.half_extent as f32 * 2.0 + SEPARATION_MARGIN;
        allies
            .iter()
            .filter(|p| **p != self.entity.pos)
            .fold(Vec2::ZERO, |acc, ally| {
                let away = self.entity.pos - *ally;
                let d = away.length();
                if d > 0.0 && d < radius {
                    acc + away / d * (1.0 - d / radius)
                } else {
                    acc
                }
            })
    }

    /// Adversaries are blocked by the avatar but not by each other
    fn step(&mut self, delta: Vec2, ctx: &mut AdversaryContext<'_>) -> Vec2 {
        let avatar_box = ctx.target.aabb();
        let blockers: &[_] = if ctx.target.is_alive() {
            std::slice::from_ref(&avatar_box)
        } else {
            &[]
        };
        let collision = CollisionContext {
            grid: &*ctx.grid,
            blockers,
        };
        self.entity.try_move(delta, &collision)
    }
}
