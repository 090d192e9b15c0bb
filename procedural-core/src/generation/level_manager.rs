//! Level sequencing.
//!
//! Tracks the run's progression and builds each level from scratch: derive
//! sub-seeds from the stored root, generate and decorate the layout, classify
//! the grid, place the avatar and spawn the adversary population. Restart and
//! advance both go through the same build, so a level is a pure function of
//! (root seed, levels completed, config).

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cave::{generate_layout, Biome, GenerationParams};
use super::seed::{SeedHierarchy, SubStream, WorldSeed};
use crate::engine::config::SimConfig;
use crate::logging::TimingSpan;
use crate::monster::{spawn_adversaries, Adversary};
use crate::world::{TileGrid, TilePos};

/// A freshly built level
#[derive(Debug, Clone)]
pub struct Level {
    pub seeds: SeedHierarchy,
    pub biome: Biome,
    pub levels_completed: u32,
    pub grid: TileGrid,
    pub avatar_tile: TilePos,
    pub adversaries: Vec<Adversary>,
    /// Cells carved by the walk before smoothing
    pub carved: usize,
}

/// Run progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelManager {
    pub root: WorldSeed,
    pub levels_completed: u32,
    pub highest_reached: u32,
    pub restarts: u32,
}

impl LevelManager {
    pub fn new(root: WorldSeed) -> Self {
        Self {
            root,
            levels_completed: 0,
            highest_reached: 0,
            restarts: 0,
        }
    }

    pub fn seeds(&self) -> SeedHierarchy {
        SeedHierarchy::derive(self.root, self.levels_completed)
    }

    pub fn biome(&self) -> Biome {
        Biome::for_level(self.levels_completed)
    }

    pub fn advance(&mut self) {
        self.levels_completed += 1;
        self.highest_reached = self.highest_reached.max(self.levels_completed);
        info!(levels_completed = self.levels_completed, "advancing level");
    }

    pub fn restart(&mut self) {
        self.levels_completed = 0;
        self.restarts += 1;
        info!(restarts = self.restarts, "restarting run");
    }

    /// Build the current level
    pub fn build(&self, config: &SimConfig) -> Level {
        let _span = TimingSpan::new("build_level");
        let seeds = self.seeds();
        let biome = self.biome();
        let params = GenerationParams {
            width: config.grid_width,
            height: config.grid_height,
            floor_fraction: config.floor_fraction,
            step_budget_factor: config.step_budget_factor,
            biome,
        };

        let mut layout = generate_layout(&params, &mut seeds.stream(SubStream::Generation));
        layout.assign_details(&mut seeds.stream(SubStream::Decoration));

        let mut grid = TileGrid::from_layout(&layout, seeds.stream(SubStream::TileQuery));
        let avatar_tile = grid.claim_spawn_tile();

        let adversaries = spawn_adversaries(
            &mut grid,
            &mut seeds.stream(SubStream::Spawn),
            avatar_tile,
            self.levels_completed,
            biome,
            config.max_adversaries,
            1,
        );

        info!(
            root = self.root.seed,
            levels_completed = self.levels_completed,
            ?biome,
            floor = grid.floor_count(),
            carved = layout.carved,
            adversaries = adversaries.len(),
            "level built"
        );

        Level {
            seeds,
            biome,
            levels_completed: self.levels_completed,
            grid,
            avatar_tile,
            adversaries,
            carved: layout.carved,
        }
    }
}
