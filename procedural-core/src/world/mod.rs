//! Tile grid: classification, destructible walls and collision queries.
//!
//! Tile coordinates are integer cells; world coordinates are continuous units
//! with `TILE_SIZE` units per cell. Anything outside the grid is wall.

pub mod tile;

pub use tile::{FloorVariant, Tile, TileKind};

use glam::Vec2;
use rand::Rng;
use tracing::trace;

use crate::constants::{FALLBACK_SPAWN_TILE, FLOOR_SAMPLE_ATTEMPTS, TILE_SIZE};
use crate::generation::cave::LevelLayout;
use crate::generation::seed::StreamRng;
use crate::movement::Aabb;

/// Tile coordinate pair
pub type TilePos = (i32, i32);

/// Center of a tile in world units
pub fn tile_center(tile: TilePos) -> Vec2 {
    Vec2::new(
        (tile.0 as f32 + 0.5) * TILE_SIZE,
        (tile.1 as f32 + 0.5) * TILE_SIZE,
    )
}

/// Tile containing a world position
pub fn world_to_tile(pos: Vec2) -> TilePos {
    (
        (pos.x / TILE_SIZE).floor() as i32,
        (pos.y / TILE_SIZE).floor() as i32,
    )
}

/// World-space rectangle covered by a tile
pub fn tile_aabb(tile: TilePos) -> Aabb {
    let min = Vec2::new(tile.0 as f32 * TILE_SIZE, tile.1 as f32 * TILE_SIZE);
    Aabb {
        min,
        max: min + Vec2::splat(TILE_SIZE),
    }
}

/// Fixed-size grid of tiles plus its tile-query stream.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    query_rng: StreamRng,
}

impl TileGrid {
    /// Classify a generated layout: border walls become indestructible edge
    /// walls, interior walls get full durability, floor keeps its variant.
    pub fn from_layout(layout: &LevelLayout, query_rng: StreamRng) -> Self {
        let (w, h) = (layout.width, layout.height);
        let mut tiles = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let i = layout.idx(x, y);
                let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                let mut tile = if border {
                    Tile::edge_wall()
                } else if layout.kinds[i].is_wall() {
                    Tile::wall()
                } else {
                    Tile::floor(layout.variants[i])
                };
                tile.detail = layout.details[i];
                tiles.push(tile);
            }
        }
        Self {
            width: w,
            height: h,
            tiles,
            query_rng,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.idx(x, y).map(|i| &self.tiles[i])
    }

    /// Row-major view of every tile
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map_or(true, Tile::is_wall)
    }

    pub fn is_wall_at(&self, pos: Vec2) -> bool {
        let (x, y) = world_to_tile(pos);
        self.is_wall(x, y)
    }

    /// Plant floor hides whoever stands on it
    pub fn conceals(&self, x: i32, y: i32) -> bool {
        self.tile(x, y)
            .is_some_and(|t| !t.is_wall() && t.variant.conceals())
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_wall()).count()
    }

    /// Damage a destructible wall. Returns true only on the call that
    /// destroys it; every other case is a no-op returning false.
    pub fn damage_wall(&mut self, x: i32, y: i32, amount: f32) -> bool {
        let Some(i) = self.idx(x, y) else {
            return false;
        };
        let tile = &mut self.tiles[i];
        if !tile.is_destructible() || amount <= 0.0 {
            return false;
        }
        tile.durability = (tile.durability - amount).max(0.0);
        if tile.durability > 0.0 {
            return false;
        }
        tile.kind = TileKind::Floor;
        tile.variant = FloorVariant::Default;
        trace!(x, y, "wall destroyed");
        true
    }

    /// True when the box overlaps any wall cell (or leaves the grid)
    pub fn overlaps_wall(&self, aabb: &Aabb) -> bool {
        self.tiles_overlapping(aabb)
            .any(|(x, y)| self.is_wall(x, y))
    }

    /// Tile coordinates whose cell rectangle overlaps the box
    pub fn tiles_overlapping(&self, aabb: &Aabb) -> impl Iterator<Item = TilePos> {
        let x0 = (aabb.min.x / TILE_SIZE).floor() as i32;
        let y0 = (aabb.min.y / TILE_SIZE).floor() as i32;
        let x1 = (aabb.max.x / TILE_SIZE).ceil() as i32 - 1;
        let y1 = (aabb.max.y / TILE_SIZE).ceil() as i32 - 1;
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }

    /// Spawn tile near the grid center. Never returns a wall unless the grid
    /// has no floor at all, in which case the fixed near-corner tile is
    /// returned still walled; use [`TileGrid::claim_spawn_tile`] to get a
    /// tile that is guaranteed open.
    pub fn find_spawn_tile(&self) -> TilePos {
        let (cx, cy) = (self.width as i32 / 2, self.height as i32 / 2);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if !self.is_wall(cx + dx, cy + dy) {
                    return (cx + dx, cy + dy);
                }
            }
        }
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if !self.is_wall(x, y) {
                    return (x, y);
                }
            }
        }
        FALLBACK_SPAWN_TILE
    }

    /// Spawn tile that is always floor: the fallback tile is carved open
    /// when the grid has no floor at all.
    pub fn claim_spawn_tile(&mut self) -> TilePos {
        let tile = self.find_spawn_tile();
        self.ensure_spawn_open(tile);
        tile
    }

    fn ensure_spawn_open(&mut self, tile: TilePos) {
        if let Some(i) = self.idx(tile.0, tile.1) {
            if self.tiles[i].is_wall() {
                self.tiles[i] = Tile::floor(FloorVariant::Default);
            }
        }
    }

    /// Rejection-sample a floor tile at least `min_dist` tiles from `from`.
    /// `None` once the attempt cap is spent.
    pub fn random_floor_tile_far_from(&mut self, from: TilePos, min_dist: f32) -> Option<TilePos> {
        let min_sq = min_dist * min_dist;
        for _ in 0..FLOOR_SAMPLE_ATTEMPTS {
            let x = self.query_rng.gen_range(0..self.width as i32);
            let y = self.query_rng.gen_range(0..self.height as i32);
            if self.is_wall(x, y) {
                continue;
            }
            let (dx, dy) = ((x - from.0) as f32, (y - from.1) as f32);
            if dx * dx + dy * dy >= min_sq {
                return Some((x, y));
            }
        }
        None
    }

    /// Any floor tile, chosen uniformly. `None` only when there is no floor.
    pub fn random_floor_tile(&mut self) -> Option<TilePos> {
        let floors = self.floor_count();
        if floors == 0 {
            return None;
        }
        let pick = self.query_rng.gen_range(0..floors);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_wall())
            .nth(pick)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
    }
}
