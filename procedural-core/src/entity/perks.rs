//! Percent-increase perks shared by the avatar and adversaries.
//!
//! Each kind touches one stat only, so application order never matters.

use serde::{Deserialize, Serialize};

use crate::constants::{
    PERK_DAMAGE_PCT, PERK_HEALTH_PCT, PERK_REACH_PCT, PERK_SPEED_PCT, PERK_STAMINA_PCT,
    PERK_WIDTH_PCT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerkKind {
    Health,
    Speed,
    Damage,
    Stamina,
    Reach,
    Width,
}

impl PerkKind {
    pub const ALL: [PerkKind; 6] = [
        PerkKind::Health,
        PerkKind::Speed,
        PerkKind::Damage,
        PerkKind::Stamina,
        PerkKind::Reach,
        PerkKind::Width,
    ];

    pub fn percent(&self) -> f32 {
        match self {
            PerkKind::Health => PERK_HEALTH_PCT,
            PerkKind::Speed => PERK_SPEED_PCT,
            PerkKind::Damage => PERK_DAMAGE_PCT,
            PerkKind::Stamina => PERK_STAMINA_PCT,
            PerkKind::Reach => PERK_REACH_PCT,
            PerkKind::Width => PERK_WIDTH_PCT,
        }
    }

    /// Multiplier applied to the stat this perk touches
    pub fn factor(&self) -> f32 {
        1.0 + self.percent() / 100.0
    }
}

/// Multipliers over base speed and weapon stats, plus the perks that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkModifiers {
    pub speed: f32,
    pub damage: f32,
    pub reach: f32,
    pub width: f32,
    pub applied: Vec<PerkKind>,
}

impl Default for PerkModifiers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            damage: 1.0,
            reach: 1.0,
            width: 1.0,
            applied: Vec::new(),
        }
    }
}

impl PerkModifiers {
    /// Record a perk. Pool perks (health, stamina) are scaled by the owner.
    pub(crate) fn record(&mut self, kind: PerkKind) {
        let f = kind.factor();
        match kind {
            PerkKind::Speed => self.speed *= f,
            PerkKind::Damage => self.damage *= f,
            PerkKind::Reach => self.reach *= f,
            PerkKind::Width => self.width *= f,
            PerkKind::Health | PerkKind::Stamina => {}
        }
        self.applied.push(kind);
    }

    pub fn count(&self, kind: PerkKind) -> usize {
        self.applied.iter().filter(|k| **k == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors() {
        assert!((PerkKind::Health.factor() - 1.2).abs() < 1e-6);
        assert!((PerkKind::Speed.factor() - 1.1).abs() < 1e-6);
        assert!((PerkKind::Damage.factor() - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_stats() {
        let mut m = PerkModifiers::default();
        m.record(PerkKind::Damage);
        assert_eq!(m.speed, 1.0);
        assert_eq!(m.reach, 1.0);
        assert!(m.damage > 1.0);
        m.record(PerkKind::Health);
        assert_eq!(m.count(PerkKind::Health), 1);
        assert_eq!(m.applied.len(), 2);
    }

    #[test]
    fn test_order_independent() {
        let mut a = PerkModifiers::default();
        let mut b = PerkModifiers::default();
        for k in [PerkKind::Reach, PerkKind::Speed, PerkKind::Width] {
            a.record(k);
        }
        for k in [PerkKind::Width, PerkKind::Reach, PerkKind::Speed] {
            b.record(k);
        }
        assert_eq!(a.speed, b.speed);
        assert_eq!(a.reach, b.reach);
        assert_eq!(a.width, b.width);
    }
}
