//! Cave layout generator.
//!
//! Builds a wall/floor grid in three phases, all drawing from one generation
//! stream in a fixed order:
//! 1. drunkard's walk carving from the grid center
//! 2. border forcing + cellular-automata smoothing
//! 3. biome decoration (default floor, path walks, plant patches)
//!
//! A separate decoration stream assigns cosmetic detail indices afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::seed::StreamRng;
use crate::constants::{
    DETAIL_VARIANTS, MIN_STEP_BUDGET_FACTOR, SMOOTHING_ITERATIONS, SMOOTHING_WALL_THRESHOLD,
};
use crate::monster::Archetype;
use crate::world::{FloorVariant, TileKind};

const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Biome tag - parameterizes decoration density and adversary weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Cavern,
    Overgrown,
    Ruins,
}

impl Biome {
    pub const ALL: [Biome; 3] = [Biome::Cavern, Biome::Overgrown, Biome::Ruins];

    /// Biomes rotate with the number of completed levels
    pub fn for_level(levels_completed: u32) -> Self {
        Self::ALL[(levels_completed as usize) % Self::ALL.len()]
    }

    pub fn decoration(&self) -> DecorationParams {
        match self {
            Biome::Cavern => DecorationParams {
                path_walks: (1, 3),
                path_length: (8, 20),
                plant_patches: (2, 4),
                plant_radius: (1, 3),
                plant_density: 0.45,
            },
            Biome::Overgrown => DecorationParams {
                path_walks: (1, 2),
                path_length: (6, 14),
                plant_patches: (5, 9),
                plant_radius: (2, 4),
                plant_density: 0.7,
            },
            Biome::Ruins => DecorationParams {
                path_walks: (3, 6),
                path_length: (12, 30),
                plant_patches: (1, 3),
                plant_radius: (1, 2),
                plant_density: 0.35,
            },
        }
    }

    /// Spawn weight per archetype in this biome
    pub fn archetype_weights(&self) -> [(Archetype, u32); 4] {
        use Archetype::*;
        match self {
            Biome::Cavern => [(Grunt, 50), (Stalker, 25), (Archer, 15), (Brute, 10)],
            Biome::Overgrown => [(Grunt, 30), (Stalker, 40), (Archer, 20), (Brute, 10)],
            Biome::Ruins => [(Grunt, 30), (Stalker, 10), (Archer, 35), (Brute, 25)],
        }
    }
}

/// Decoration knobs. Ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationParams {
    pub path_walks: (u32, u32),
    pub path_length: (u32, u32),
    pub plant_patches: (u32, u32),
    pub plant_radius: (i32, i32),
    /// Chance that an eligible cell inside a patch becomes plant
    pub plant_density: f32,
}

/// Inputs to [`generate_layout`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub width: usize,
    pub height: usize,
    pub floor_fraction: f32,
    /// Carving step budget as a multiple of grid area (clamped to at least 4)
    pub step_budget_factor: u32,
    pub biome: Biome,
}

impl GenerationParams {
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn step_budget(&self) -> u64 {
        self.area() as u64 * self.step_budget_factor.max(MIN_STEP_BUDGET_FACTOR) as u64
    }

    pub fn floor_target(&self) -> usize {
        (self.floor_fraction.clamp(0.0, 1.0) * self.area() as f32) as usize
    }
}

/// Generated level layout, consumed by `TileGrid::from_layout`.
///
/// Only `Wall` and `Floor` appear in `kinds`; edge classification happens
/// when the tile grid is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: usize,
    pub height: usize,
    pub biome: Biome,
    pub kinds: Vec<TileKind>,
    pub variants: Vec<FloorVariant>,
    pub details: Vec<u8>,
    /// Cells converted by the walk before smoothing
    pub carved: usize,
    /// Walk steps actually taken
    pub steps_taken: u64,
}

impl LevelLayout {
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return true;
        }
        self.kinds[self.idx(x as usize, y as usize)].is_wall()
    }

    pub fn floor_count(&self) -> usize {
        self.kinds.iter().filter(|k| !k.is_wall()).count()
    }

    pub fn border_is_closed(&self) -> bool {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).all(|x| self.is_wall(x, 0) && self.is_wall(x, h - 1))
            && (0..h).all(|y| self.is_wall(0, y) && self.is_wall(w - 1, y))
    }

    /// Assign cosmetic detail indices from the decoration stream
    pub fn assign_details(&mut self, rng: &mut StreamRng) {
        for detail in self.details.iter_mut() {
            *detail = rng.gen_range(0..DETAIL_VARIANTS);
        }
    }
}

/// Generate a cave layout. The result is a pure function of `params` and the
/// stream state.
pub fn generate_layout(params: &GenerationParams, rng: &mut StreamRng) -> LevelLayout {
    let (width, height) = (params.width, params.height);
    let mut layout = LevelLayout {
        width,
        height,
        biome: params.biome,
        kinds: vec![TileKind::Wall; width * height],
        variants: vec![FloorVariant::Default; width * height],
        details: vec![0; width * height],
        carved: 0,
        steps_taken: 0,
    };

    carve(&mut layout, params, rng);
    force_border(&mut layout);
    for _ in 0..SMOOTHING_ITERATIONS {
        smooth(&mut layout);
    }
    decorate(&mut layout, &params.biome.decoration(), rng);

    layout
}

fn carve(layout: &mut LevelLayout, params: &GenerationParams, rng: &mut StreamRng) {
    let (w, h) = (layout.width as i32, layout.height as i32);
    let target = params.floor_target();
    let budget = params.step_budget();
    let (mut cx, mut cy) = (w / 2, h / 2);

    while layout.carved < target && layout.steps_taken < budget {
        let i = layout.idx(cx as usize, cy as usize);
        if layout.kinds[i] == TileKind::Wall {
            layout.kinds[i] = TileKind::Floor;
            layout.carved += 1;
        }
        let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
        cx = (cx + dx).clamp(1, (w - 2).max(1));
        cy = (cy + dy).clamp(1, (h - 2).max(1));
        layout.steps_taken += 1;
    }
}

fn force_border(layout: &mut LevelLayout) {
    let (w, h) = (layout.width, layout.height);
    for x in 0..w {
        let top = layout.idx(x, 0);
        let bottom = layout.idx(x, h - 1);
        layout.kinds[top] = TileKind::Wall;
        layout.kinds[bottom] = TileKind::Wall;
    }
    for y in 0..h {
        let left = layout.idx(0, y);
        let right = layout.idx(w - 1, y);
        layout.kinds[left] = TileKind::Wall;
        layout.kinds[right] = TileKind::Wall;
    }
}

/// One smoothing generation. Out-of-bounds neighbors count as wall.
fn smooth(layout: &mut LevelLayout) {
    let mut next = layout.kinds.clone();
    for y in 0..layout.height as i32 {
        for x in 0..layout.width as i32 {
            let mut walls = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx != 0 || dy != 0) && layout.is_wall(x + dx, y + dy) {
                        walls += 1;
                    }
                }
            }
            next[layout.idx(x as usize, y as usize)] = if walls >= SMOOTHING_WALL_THRESHOLD {
                TileKind::Wall
            } else {
                TileKind::Floor
            };
        }
    }
    layout.kinds = next;
}

fn decorate(layout: &mut LevelLayout, deco: &DecorationParams, rng: &mut StreamRng) {
    for (kind, variant) in layout.kinds.iter().zip(layout.variants.iter_mut()) {
        if !kind.is_wall() {
            *variant = FloorVariant::Default;
        }
    }

    let floor_cells: Vec<usize> = (0..layout.kinds.len())
        .filter(|&i| !layout.kinds[i].is_wall())
        .collect();
    if floor_cells.is_empty() {
        return;
    }

    carve_paths(layout, deco, &floor_cells, rng);
    scatter_plants(layout, deco, &floor_cells, rng);
}

/// Short random walks tagged as path. Interior walls on the way are opened.
fn carve_paths(
    layout: &mut LevelLayout,
    deco: &DecorationParams,
    floor_cells: &[usize],
    rng: &mut StreamRng,
) {
    let (w, h) = (layout.width as i32, layout.height as i32);
    let walks = rng.gen_range(deco.path_walks.0..=deco.path_walks.1);
    for _ in 0..walks {
        let start = floor_cells[rng.gen_range(0..floor_cells.len())];
        let (mut x, mut y) = ((start % layout.width) as i32, (start / layout.width) as i32);
        let length = rng.gen_range(deco.path_length.0..=deco.path_length.1);
        for _ in 0..length {
            let i = layout.idx(x as usize, y as usize);
            layout.kinds[i] = TileKind::Floor;
            layout.variants[i] = FloorVariant::Path;
            let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
            x = (x + dx).clamp(1, (w - 2).max(1));
            y = (y + dy).clamp(1, (h - 2).max(1));
        }
    }
}

/// Circular patches of plant floor over default-variant cells
fn scatter_plants(
    layout: &mut LevelLayout,
    deco: &DecorationParams,
    floor_cells: &[usize],
    rng: &mut StreamRng,
) {
    let patches = rng.gen_range(deco.plant_patches.0..=deco.plant_patches.1);
    for _ in 0..patches {
        let center = floor_cells[rng.gen_range(0..floor_cells.len())];
        let (cx, cy) = ((center % layout.width) as i32, (center / layout.width) as i32);
        let radius = rng.gen_range(deco.plant_radius.0..=deco.plant_radius.1);
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy > radius * radius || layout.is_wall(x, y) {
                    continue;
                }
                let i = layout.idx(x as usize, y as usize);
                if layout.variants[i] != FloorVariant::Default {
                    continue;
                }
                if rng.gen::<f32>() < deco.plant_density {
                    layout.variants[i] = FloorVariant::Plant;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params(biome: Biome) -> GenerationParams {
        GenerationParams {
            width: 80,
            height: 60,
            floor_fraction: 0.45,
            step_budget_factor: 4,
            biome,
        }
    }

    fn generate(seed: u64, p: &GenerationParams) -> LevelLayout {
        let mut rng = StreamRng::seed_from_u64(seed);
        generate_layout(p, &mut rng)
    }

    #[test]
    fn test_generation_is_deterministic() {
        let p = params(Biome::Cavern);
        assert_eq!(generate(17, &p), generate(17, &p));
    }

    #[test]
    fn test_different_seeds_differ() {
        let p = params(Biome::Cavern);
        assert_ne!(generate(1, &p).kinds, generate(2, &p).kinds);
    }

    #[test]
    fn test_border_is_wall() {
        for seed in 0..10 {
            let layout = generate(seed, &params(Biome::Ruins));
            assert!(layout.border_is_closed(), "Seed {seed} has an open border");
        }
    }

    #[test]
    fn test_floor_target_respected() {
        let p = params(Biome::Overgrown);
        let layout = generate(42, &p);
        let min = (0.45 * 80.0 * 60.0 * 0.9) as usize;
        assert!(
            layout.floor_count() >= min,
            "Expected at least {min} floor tiles, got {}",
            layout.floor_count()
        );
    }

    #[test]
    fn test_budget_exhaustion_terminates() {
        let p = GenerationParams {
            width: 40,
            height: 30,
            floor_fraction: 0.99,
            step_budget_factor: 4,
            biome: Biome::Cavern,
        };
        let layout = generate(5, &p);
        assert_eq!(layout.steps_taken, p.step_budget());
        assert!(layout.carved < p.floor_target());
    }

    #[test]
    fn test_step_budget_floor() {
        let mut p = params(Biome::Cavern);
        p.step_budget_factor = 1;
        assert_eq!(p.step_budget(), 4 * 80 * 60);
    }

    #[test]
    fn test_walls_have_default_variant_only_on_floor() {
        let layout = generate(9, &params(Biome::Overgrown));
        let plants = layout
            .kinds
            .iter()
            .zip(&layout.variants)
            .filter(|(k, v)| !k.is_wall() && **v == FloorVariant::Plant)
            .count();
        assert!(plants > 0, "Overgrown biome should scatter plants");
        for (k, v) in layout.kinds.iter().zip(&layout.variants) {
            if k.is_wall() {
                assert_ne!(*v, FloorVariant::Plant, "Walls never carry plant variant");
            }
        }
    }

    #[test]
    fn test_details_in_range_and_independent_of_kinds() {
        let p = params(Biome::Cavern);
        let mut a = generate(3, &p);
        let b = a.clone();
        a.assign_details(&mut StreamRng::seed_from_u64(1000));
        assert_eq!(a.kinds, b.kinds);
        assert!(a.details.iter().all(|d| *d < DETAIL_VARIANTS));
    }

    #[test]
    fn test_biome_rotation() {
        assert_eq!(Biome::for_level(0), Biome::Cavern);
        assert_eq!(Biome::for_level(1), Biome::Overgrown);
        assert_eq!(Biome::for_level(2), Biome::Ruins);
        assert_eq!(Biome::for_level(3), Biome::Cavern);
    }
}
