//! Centralized tuning constants for the dungeon core.
//!
//! Per-archetype behavior values live in the archetype table
//! (`monster::ArchetypeProfile`) as the single source of truth; everything
//! shared across modules is collected here.

// =====================================================
// Grid
// =====================================================

/// World units per tile edge. Entity positions are continuous world units.
pub const TILE_SIZE: f32 = 16.0;

/// Durability of an interior wall tile on level construction
pub const WALL_DURABILITY: f32 = 4.0;

/// Durability sentinel carried by border walls
pub const INDESTRUCTIBLE: f32 = -1.0;

/// Attempt cap for rejection-sampled floor tile searches
pub const FLOOR_SAMPLE_ATTEMPTS: u32 = 5000;

/// Last-resort spawn tile when the grid has no floor at all
pub const FALLBACK_SPAWN_TILE: (i32, i32) = (1, 1);

// =====================================================
// Generation
// =====================================================

/// Minimum step budget expressed as a multiple of grid area
pub const MIN_STEP_BUDGET_FACTOR: u32 = 4;

/// Cellular-automata smoothing passes
pub const SMOOTHING_ITERATIONS: u32 = 2;

/// Wall-neighbor count at which a cell becomes wall
pub const SMOOTHING_WALL_THRESHOLD: u32 = 5;

/// Number of distinct cosmetic detail indices per tile
pub const DETAIL_VARIANTS: u8 = 4;

// =====================================================
// Movement & Knockback
// =====================================================

/// Initial knockback speed in world units per tick
pub const KNOCKBACK_FORCE: f32 = 3.0;

/// Per-tick multiplicative knockback decay
pub const KNOCKBACK_DECAY: f32 = 0.8;

/// Knockback duration in ticks
pub const KNOCKBACK_TICKS: u32 = 8;

/// Step size used when creeping towards a wall along a blocked axis
pub const CREEP_STEP: f32 = 1.0;

// =====================================================
// Avatar
// =====================================================

pub const AVATAR_HALF_EXTENT: i32 = 5;
pub const AVATAR_SPEED: f32 = 1.6;
pub const AVATAR_SPRINT_MULT: f32 = 1.6;
pub const AVATAR_MAX_HEALTH: f32 = 10.0;
pub const AVATAR_MAX_STAMINA: f32 = 100.0;
pub const AVATAR_MAX_MANA: f32 = 50.0;
pub const AVATAR_MAX_SHIELD: f32 = 3.0;

/// Stamina drained per sprinting tick
pub const SPRINT_STAMINA_COST: f32 = 0.6;

/// Stamina spent per melee activation
pub const ATTACK_STAMINA_COST: f32 = 8.0;

pub const STAMINA_REGEN: f32 = 0.3;
pub const MANA_REGEN: f32 = 0.05;
pub const SHIELD_REGEN: f32 = 0.01;

/// Ticks without taking damage before the shield starts regenerating
pub const SHIELD_REGEN_DELAY: u32 = 180;

// =====================================================
// Combat
// =====================================================

/// Projectile flight time from origin to recorded target point
pub const PROJECTILE_TRAVEL_TICKS: u32 = 24;

/// Distance at which a traveling projectile connects with its target
pub const PROJECTILE_HIT_RADIUS: f32 = 8.0;

// =====================================================
// Concealment
// =====================================================

/// Adversaries closer than this always see the avatar
pub const CONCEAL_REVEAL_RADIUS: f32 = 24.0;

// =====================================================
// Spawning
// =====================================================

/// Uniform base adversary count range (inclusive)
pub const BASE_SPAWN_MIN: u32 = 3;
pub const BASE_SPAWN_MAX: u32 = 8;

/// Count growth per completed level: count = base * GROWTH^levels
pub const SPAWN_GROWTH_FACTOR: f32 = 1.15;

/// Minimum spawn distance from the avatar spawn, in tiles
pub const MIN_SPAWN_DISTANCE_TILES: f32 = 12.0;

/// Perk grant chance: base + per_level * levels, capped
pub const PERK_CHANCE_BASE: f32 = 0.1;
pub const PERK_CHANCE_PER_LEVEL: f32 = 0.1;
pub const PERK_CHANCE_CAP: f32 = 0.75;

/// Perks per granted adversary: 1 + levels / PERK_COUNT_LEVEL_STEP, capped
pub const PERK_COUNT_LEVEL_STEP: u32 = 2;
pub const PERK_COUNT_CAP: u32 = 3;

// =====================================================
// Perks (percent increases)
// =====================================================

pub const PERK_HEALTH_PCT: f32 = 20.0;
pub const PERK_SPEED_PCT: f32 = 10.0;
pub const PERK_DAMAGE_PCT: f32 = 15.0;
pub const PERK_STAMINA_PCT: f32 = 20.0;
pub const PERK_REACH_PCT: f32 = 15.0;
pub const PERK_WIDTH_PCT: f32 = 15.0;

// =====================================================
// Verification
// =====================================================

/// Default checksum cadence in ticks
pub const DEFAULT_CHECKSUM_INTERVAL: u64 = 60;
