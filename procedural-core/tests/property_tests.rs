//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Closed world: out-of-bounds is wall
//! - Wall durability never increases and breaks exactly once
//! - Spawned adversaries stand on floor
//! - Spawn search always lands on floor, even on a solid grid
//! - Resource pools stay within [0, max] under arbitrary input
//! - Same seed, same inputs: same checksums

use dungeon_core::constants::FALLBACK_SPAWN_TILE;
use dungeon_core::generation::seed::StreamRng;
use dungeon_core::generation::{
    generate_layout, Biome, GenerationParams, LevelLayout, LevelManager, WorldSeed,
};
use dungeon_core::world::{FloorVariant, TileGrid, TileKind};
use dungeon_core::{PlayerInput, SimConfig, Simulation};
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;

fn generated_grid(seed: u64, width: usize, height: usize, biome: Biome) -> TileGrid {
    let params = GenerationParams {
        width,
        height,
        floor_fraction: 0.45,
        step_budget_factor: 4,
        biome,
    };
    let layout = generate_layout(&params, &mut StreamRng::seed_from_u64(seed));
    TileGrid::from_layout(&layout, StreamRng::seed_from_u64(seed ^ 0x5eed))
}

fn biome_strategy() -> impl Strategy<Value = Biome> {
    prop_oneof![Just(Biome::Cavern), Just(Biome::Overgrown), Just(Biome::Ruins)]
}

fn input_strategy() -> impl Strategy<Value = PlayerInput> {
    (
        -1.5f32..1.5,
        -1.5f32..1.5,
        any::<bool>(),
        any::<bool>(),
        proptest::option::of((0f32..1280.0, 0f32..960.0)),
    )
        .prop_map(|(forward, right, sprint, attack, aim)| PlayerInput {
            forward,
            right,
            sprint,
            attack,
            aim: aim.map(|(x, y)| Vec2::new(x, y)),
        })
}

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        root_seed: seed,
        grid_width: 40,
        grid_height: 30,
        checksum_interval: 20,
        ..SimConfig::default()
    }
}

// ============================================================
// Tile grid properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_out_of_bounds_is_wall(
        seed in any::<u64>(),
        x in -1000i32..1000,
        y in -1000i32..1000,
    ) {
        let grid = generated_grid(seed, 32, 24, Biome::Cavern);
        if !grid.in_bounds(x, y) {
            prop_assert!(grid.is_wall(x, y), "({x}, {y}) outside the grid must be wall");
        }
        prop_assert!(grid.is_wall(-1, y));
        prop_assert!(grid.is_wall(x, 24));
    }

    #[test]
    fn prop_durability_never_increases(
        seed in any::<u64>(),
        hits in proptest::collection::vec(0.1f32..3.0, 1..12),
    ) {
        let mut grid = generated_grid(seed, 32, 24, Biome::Ruins);
        let wall = (1..31)
            .flat_map(|x| (1..23).map(move |y| (x, y)))
            .find(|&(x, y)| grid.tile(x, y).is_some_and(|t| t.is_destructible()));
        let Some((x, y)) = wall else {
            return Ok(());
        };
        let mut last = grid.tile(x, y).map(|t| t.durability).unwrap_or_default();
        let mut broken = false;
        for amount in hits {
            let destroyed = grid.damage_wall(x, y, amount);
            let now = grid.tile(x, y).map(|t| t.durability).unwrap_or_default();
            prop_assert!(now <= last, "durability went from {last} to {now}");
            if broken {
                prop_assert!(!destroyed, "A broken wall cannot break again");
            }
            if destroyed {
                prop_assert!(!grid.is_wall(x, y));
                broken = true;
            }
            last = now;
        }
    }

    #[test]
    fn prop_find_spawn_tile_is_floor(seed in any::<u64>(), biome in biome_strategy()) {
        let grid = generated_grid(seed, 48, 36, biome);
        let (x, y) = grid.find_spawn_tile();
        prop_assert!(!grid.is_wall(x, y));
    }

    #[test]
    fn prop_spawned_adversaries_stand_on_floor(seed in any::<u64>(), levels in 0u32..12) {
        let mut mgr = LevelManager::new(WorldSeed::new(seed));
        mgr.levels_completed = levels;
        let level = mgr.build(&small_config(seed));
        for adv in &level.adversaries {
            let (x, y) = adv.spawn_tile;
            prop_assert!(!level.grid.is_wall(x, y), "adversary {} spawned in wall", adv.id().0);
        }
        prop_assert!(level.adversaries.len() as u32 <= small_config(seed).max_adversaries);
    }
}

#[test]
fn solid_grid_falls_back_to_fixed_spawn_tile() {
    let (w, h) = (12, 10);
    let layout = LevelLayout {
        width: w,
        height: h,
        biome: Biome::Cavern,
        kinds: vec![TileKind::Wall; w * h],
        variants: vec![FloorVariant::Default; w * h],
        details: vec![0; w * h],
        carved: 0,
        steps_taken: 0,
    };
    let mut grid = TileGrid::from_layout(&layout, StreamRng::seed_from_u64(0));
    let tile = grid.claim_spawn_tile();
    assert_eq!(tile, FALLBACK_SPAWN_TILE);
    assert!(!grid.is_wall(tile.0, tile.1));
    assert!(grid.random_floor_tile_far_from(tile, 50.0).is_none());
}

// ============================================================
// Simulation properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_resources_stay_clamped(
        seed in any::<u64>(),
        inputs in proptest::collection::vec(input_strategy(), 1..200),
    ) {
        let mut sim = Simulation::new(small_config(seed)).unwrap();
        for input in &inputs {
            sim.step(input);
            let entities = std::iter::once(&sim.avatar().entity)
                .chain(sim.adversaries().iter().map(|a| &a.entity));
            for e in entities {
                for pool in [e.health, e.stamina, e.mana, e.shield] {
                    prop_assert!(pool.current() >= 0.0, "entity {} pool below zero", e.id.0);
                    prop_assert!(pool.current() <= pool.max(), "entity {} pool above max", e.id.0);
                }
                prop_assert!(e.pos.is_finite());
            }
        }
    }

    #[test]
    fn prop_same_inputs_same_checksums(
        seed in any::<u64>(),
        inputs in proptest::collection::vec(input_strategy(), 20..120),
    ) {
        let a = Simulation::new(small_config(seed)).unwrap().run(&inputs);
        let b = Simulation::new(small_config(seed)).unwrap().run(&inputs);
        prop_assert_eq!(a, b);
    }
}
