//! Spawn director.
//!
//! Count, archetype and perk choices come from the spawn stream; placement
//! samples come from the grid's own tile-query stream. Draws per adversary
//! happen in a fixed order: archetype, then (if placed) perk roll, then perk
//! kinds.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Adversary, Archetype};
use crate::constants::{
    BASE_SPAWN_MAX, BASE_SPAWN_MIN, MIN_SPAWN_DISTANCE_TILES, PERK_CHANCE_BASE, PERK_CHANCE_CAP,
    PERK_CHANCE_PER_LEVEL, PERK_COUNT_CAP, PERK_COUNT_LEVEL_STEP, SPAWN_GROWTH_FACTOR,
};
use crate::entity::{EntityId, PerkKind};
use crate::generation::cave::Biome;
use crate::generation::seed::StreamRng;
use crate::world::{TileGrid, TilePos};

/// Per-level spawn numbers derived from difficulty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub count: u32,
    pub perk_chance: f32,
    pub perks_per_grant: u32,
}

impl SpawnPlan {
    pub fn new(base_count: u32, levels_completed: u32, max_adversaries: u32) -> Self {
        let scaled = base_count as f32 * SPAWN_GROWTH_FACTOR.powi(levels_completed as i32);
        Self {
            count: (scaled.round() as u32).min(max_adversaries),
            perk_chance: perk_chance(levels_completed),
            perks_per_grant: perks_per_grant(levels_completed),
        }
    }
}

pub fn perk_chance(levels_completed: u32) -> f32 {
    (PERK_CHANCE_BASE + PERK_CHANCE_PER_LEVEL * levels_completed as f32).min(PERK_CHANCE_CAP)
}

pub fn perks_per_grant(levels_completed: u32) -> u32 {
    (1 + levels_completed / PERK_COUNT_LEVEL_STEP).min(PERK_COUNT_CAP)
}

/// Weighted archetype pick from the biome table
pub fn pick_archetype(biome: Biome, rng: &mut StreamRng) -> Archetype {
    let weights = biome.archetype_weights();
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total.max(1));
    for (archetype, weight) in weights {
        if roll < weight {
            return archetype;
        }
        roll -= weight;
    }
    weights[0].0
}

/// Populate a level. Ids are assigned consecutively from `first_id`.
pub fn spawn_adversaries(
    grid: &mut TileGrid,
    rng: &mut StreamRng,
    avatar_tile: TilePos,
    levels_completed: u32,
    biome: Biome,
    max_adversaries: u32,
    first_id: u32,
) -> Vec<Adversary> {
    let base = rng.gen_range(BASE_SPAWN_MIN..=BASE_SPAWN_MAX);
    let plan = SpawnPlan::new(base, levels_completed, max_adversaries);
    let mut adversaries = Vec::with_capacity(plan.count as usize);
    let mut next_id = first_id;

    for _ in 0..plan.count {
        let archetype = pick_archetype(biome, rng);
        let tile = grid
            .random_floor_tile_far_from(avatar_tile, MIN_SPAWN_DISTANCE_TILES)
            .or_else(|| grid.random_floor_tile());
        let Some(tile) = tile.filter(|t| !grid.is_wall(t.0, t.1)) else {
            debug!(?archetype, "no floor tile for adversary, skipped");
            continue;
        };

        let mut perks = Vec::new();
        if rng.gen::<f32>() < plan.perk_chance {
            for _ in 0..plan.perks_per_grant {
                perks.push(PerkKind::ALL[rng.gen_range(0..PerkKind::ALL.len())]);
            }
        }

        adversaries.push(Adversary::spawn(EntityId(next_id), archetype, tile, &perks));
        next_id += 1;
    }

    debug!(
        base,
        planned = plan.count,
        spawned = adversaries.len(),
        levels_completed,
        ?biome,
        "adversaries spawned"
    );
    adversaries
}
