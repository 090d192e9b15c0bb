//! Weapon/skill descriptors.
//!
//! Base stats are immutable; perk multipliers are folded in on demand by
//! [`WeaponStats::scaled`] so the descriptor itself never changes.

use serde::{Deserialize, Serialize};

use crate::entity::PerkModifiers;

/// Melee or ranged attack descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: f32,
    /// Distance the hit shape extends along the facing direction
    pub reach: f32,
    /// Hit shape extent perpendicular to the facing direction
    pub width: f32,
    /// Ticks the hit shape stays visible after activation
    pub active_ticks: u32,
    pub cooldown_ticks: u32,
}

impl WeaponStats {
    /// Avatar's starting blade
    pub const fn avatar_blade() -> Self {
        Self {
            damage: 1.0,
            reach: 18.0,
            width: 14.0,
            active_ticks: 10,
            cooldown_ticks: 20,
        }
    }

    /// Effective stats after perk multipliers
    pub fn scaled(&self, perks: &PerkModifiers) -> Self {
        Self {
            damage: self.damage * perks.damage,
            reach: self.reach * perks.reach,
            width: self.width * perks.width,
            ..*self
        }
    }
}
