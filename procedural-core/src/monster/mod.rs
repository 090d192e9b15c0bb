//! Adversaries: archetype table, per-instance state and spawning.
//!
//! All archetypes share one behavior state machine ([`ai`]). What differs is
//! the data in [`ArchetypeProfile`]; heavier archetypes opt into extra states
//! by carrying a charge, stomp or rage profile.

pub mod ai;
pub mod jitter;
pub mod spawn;

pub use ai::{AdversaryContext, BehaviorState};
pub use jitter::JitterRng;
pub use spawn::{spawn_adversaries, SpawnPlan};

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::WeaponStats;
use crate::entity::{Entity, EntityId, PerkKind, PoolSizes};
use crate::world::{tile_center, TilePos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Baseline melee
    Grunt,
    /// Fast, fragile melee that weaves while closing in
    Stalker,
    /// Ranged; keeps its distance and fires projectiles
    Archer,
    /// Slow heavy hitter with charge-up, stomp and rage
    Brute,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Grunt,
        Archetype::Stalker,
        Archetype::Archer,
        Archetype::Brute,
    ];

    pub fn profile(&self) -> ArchetypeProfile {
        match self {
            Archetype::Grunt => ArchetypeProfile {
                speed: 1.0,
                max_health: 3.0,
                half_extent: 5,
                aggression_radius: 120.0,
                attack_range: 20.0,
                min_range: None,
                windup_ticks: 12,
                attack: AttackKind::Melee,
                weapon: WeaponStats {
                    damage: 1.0,
                    reach: 16.0,
                    width: 12.0,
                    active_ticks: 8,
                    cooldown_ticks: 40,
                },
                strafe_amplitude: 0.0,
                aim_jitter: 0.0,
                charge: None,
                stomp: None,
                rage: None,
            },
            Archetype::Stalker => ArchetypeProfile {
                speed: 1.3,
                max_health: 2.0,
                half_extent: 4,
                aggression_radius: 160.0,
                attack_range: 18.0,
                min_range: None,
                windup_ticks: 6,
                attack: AttackKind::Melee,
                weapon: WeaponStats {
                    damage: 1.0,
                    reach: 14.0,
                    width: 10.0,
                    active_ticks: 6,
                    cooldown_ticks: 30,
                },
                strafe_amplitude: 0.4,
                aim_jitter: 0.0,
                charge: None,
                stomp: None,
                rage: None,
            },
            Archetype::Archer => ArchetypeProfile {
                speed: 0.9,
                max_health: 2.0,
                half_extent: 5,
                aggression_radius: 200.0,
                attack_range: 140.0,
                min_range: Some(60.0),
                windup_ticks: 20,
                attack: AttackKind::Ranged,
                weapon: WeaponStats {
                    damage: 1.0,
                    reach: 0.0,
                    width: 0.0,
                    active_ticks: 6,
                    cooldown_ticks: 70,
                },
                strafe_amplitude: 0.5,
                aim_jitter: 0.12,
                charge: None,
                stomp: None,
                rage: None,
            },
            Archetype::Brute => ArchetypeProfile {
                speed: 0.7,
                max_health: 8.0,
                half_extent: 7,
                aggression_radius: 110.0,
                attack_range: 24.0,
                min_range: None,
                windup_ticks: 0,
                attack: AttackKind::Melee,
                weapon: WeaponStats {
                    damage: 3.0,
                    reach: 26.0,
                    width: 22.0,
                    active_ticks: 12,
                    cooldown_ticks: 60,
                },
                strafe_amplitude: 0.0,
                aim_jitter: 0.0,
                charge: Some(30),
                stomp: Some(StompProfile {
                    radius: 36.0,
                    damage: 2.0,
                    windup_ticks: 20,
                    cooldown_ticks: 240,
                }),
                rage: Some(RageProfile {
                    health_threshold: 0.5,
                    speed_mult: 1.5,
                    aggression_mult: 1.5,
                    duration_ticks: 300,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    Melee,
    Ranged,
}

/// Area attack around the adversary with its own cooldown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StompProfile {
    pub radius: f32,
    pub damage: f32,
    pub windup_ticks: u32,
    pub cooldown_ticks: u32,
}

/// Temporary boost entered once per life at low health
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RageProfile {
    pub health_threshold: f32,
    pub speed_mult: f32,
    pub aggression_mult: f32,
    pub duration_ticks: u32,
}

/// Per-archetype constants driving the shared state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeProfile {
    pub speed: f32,
    pub max_health: f32,
    pub half_extent: i32,
    pub aggression_radius: f32,
    pub attack_range: f32,
    /// Ranged archetypes back off inside this distance
    pub min_range: Option<f32>,
    pub windup_ticks: u32,
    pub attack: AttackKind,
    pub weapon: WeaponStats,
    /// Sideways weave while moving, as a fraction of the forward direction
    pub strafe_amplitude: f32,
    /// Max aim error in radians for ranged shots
    pub aim_jitter: f32,
    /// Charge-up ticks before the big hit, replacing the plain windup
    pub charge: Option<u32>,
    pub stomp: Option<StompProfile>,
    pub rage: Option<RageProfile>,
}

/// One live adversary instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adversary {
    pub entity: Entity,
    pub archetype: Archetype,
    pub profile: ArchetypeProfile,
    pub state: BehaviorState,
    /// Remaining ticks in a timed state
    pub state_ticks: u32,
    pub stomp_cooldown: u32,
    pub rage_ticks: u32,
    pub rage_spent: bool,
    pub jitter: JitterRng,
    pub wander_dir: Vec2,
    pub wander_ticks: u32,
    pub strafe_phase: f32,
    pub age: u32,
    pub spawn_tile: TilePos,
}

impl Adversary {
    pub fn spawn(id: EntityId, archetype: Archetype, tile: TilePos, perks: &[PerkKind]) -> Self {
        let profile = archetype.profile();
        let pos = tile_center(tile);
        let mut entity = Entity::new(
            id,
            pos,
            profile.half_extent,
            profile.speed,
            PoolSizes {
                health: profile.max_health,
                stamina: 0.0,
                mana: 0.0,
                shield: 0.0,
            },
            profile.weapon,
        );
        for perk in perks {
            entity.apply_perk(*perk);
        }
        let mut jitter = JitterRng::from_spawn(pos);
        let strafe_phase = jitter.next_f32() * TAU;

        Self {
            entity,
            archetype,
            profile,
            state: BehaviorState::Wander,
            state_ticks: 0,
            stomp_cooldown: 0,
            rage_ticks: 0,
            rage_spent: false,
            jitter,
            wander_dir: Vec2::ZERO,
            wander_ticks: 0,
            strafe_phase,
            age: 0,
            spawn_tile: tile,
        }
    }

    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    pub fn is_alive(&self) -> bool {
        self.entity.is_alive()
    }

    pub fn is_raging(&self) -> bool {
        self.rage_ticks > 0
    }

    pub fn aggression_radius(&self) -> f32 {
        match (self.profile.rage, self.is_raging()) {
            (Some(rage), true) => self.profile.aggression_radius * rage.aggression_mult,
            _ => self.profile.aggression_radius,
        }
    }

    pub fn move_speed(&self) -> f32 {
        match (self.profile.rage, self.is_raging()) {
            (Some(rage), true) => self.entity.speed() * rage.speed_mult,
            _ => self.entity.speed(),
        }
    }
}
