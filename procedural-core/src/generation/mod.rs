//! Procedural level generation.
//!
//! One root seed per run; every level derives its own sub-streams from it
//! (see [`seed`]), carves a cave layout ([`cave`]) and is assembled into a
//! playable level by the [`level_manager`].

pub mod cave;
pub mod level_manager;
pub mod seed;

pub use cave::{generate_layout, Biome, GenerationParams, LevelLayout};
pub use level_manager::{Level, LevelManager};
pub use seed::{SeedHierarchy, StreamRng, SubStream, WorldSeed};
