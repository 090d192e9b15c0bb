use serde::{Deserialize, Serialize};

use crate::constants::{INDESTRUCTIBLE, WALL_DURABILITY};

/// Collision class of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    /// Border wall, never destructible
    EdgeWall,
}

impl TileKind {
    pub fn is_wall(&self) -> bool {
        matches!(self, TileKind::Wall | TileKind::EdgeWall)
    }
}

/// Cosmetic/behavioral tag carried by floor cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorVariant {
    Default,
    Path,
    /// Tall vegetation; hides a still avatar
    Plant,
}

impl FloorVariant {
    pub fn conceals(&self) -> bool {
        matches!(self, FloorVariant::Plant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Remaining hit points. `INDESTRUCTIBLE` for edge walls, 0 for floor.
    pub durability: f32,
    pub variant: FloorVariant,
    /// Renderer-only detail index; never read by the simulation
    pub detail: u8,
}

impl Tile {
    pub fn floor(variant: FloorVariant) -> Self {
        Self {
            kind: TileKind::Floor,
            durability: 0.0,
            variant,
            detail: 0,
        }
    }

    pub fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            durability: WALL_DURABILITY,
            variant: FloorVariant::Default,
            detail: 0,
        }
    }

    pub fn edge_wall() -> Self {
        Self {
            kind: TileKind::EdgeWall,
            durability: INDESTRUCTIBLE,
            variant: FloorVariant::Default,
            detail: 0,
        }
    }

    pub fn is_wall(&self) -> bool {
        self.kind.is_wall()
    }

    pub fn is_destructible(&self) -> bool {
        self.kind == TileKind::Wall && self.durability > 0.0
    }
}
