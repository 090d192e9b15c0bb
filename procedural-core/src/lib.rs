//! Dungeon Procedural Core
//!
//! Deterministic, tick-based dungeon simulation:
//! - Seed hierarchy (one root seed, independent per-subsystem streams)
//! - Cave generation (drunkard's walk, cellular smoothing, biome decoration)
//! - Tile grid with destructible walls and closed-world collision
//! - Entity movement with wall sliding and decaying knockback
//! - Melee and ranged combat resolution
//! - Data-driven adversary behavior and spawn director
//! - Checksums, authoritative snapshots and input replay for lockstep verification

pub mod checksum;
pub mod combat;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod events;
pub mod generation;
pub mod logging;
pub mod monster;
pub mod movement;
pub mod player;
pub mod replay;
pub mod replication;
pub mod world;

pub use engine::{ConfigError, SimConfig, Simulation};
pub use player::PlayerInput;
