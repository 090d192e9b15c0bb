//! Combat resolution.
//!
//! A melee activation builds one [`HitShape`] and applies damage exactly once,
//! at activation. The shape's visible lifetime is tracked by the attacker and
//! never re-applies damage. Ranged attacks hand off to [`projectile`].

pub mod hitbox;
pub mod projectile;
pub mod weapons;

pub use hitbox::HitShape;
pub use projectile::Projectile;
pub use weapons::WeaponStats;

use glam::Vec2;
use tracing::trace;

use crate::entity::{Entity, EntityId};
use crate::events::{EventLog, SimEvent};
use crate::world::{tile_aabb, TileGrid, TilePos};

/// Everything a single melee activation touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeleeOutcome {
    pub entities_hit: Vec<EntityId>,
    pub kills: Vec<EntityId>,
    pub walls_hit: Vec<TilePos>,
    pub walls_destroyed: Vec<TilePos>,
}

impl MeleeOutcome {
    /// "Something was hit" - for feedback selection by collaborators
    pub fn hit(&self) -> bool {
        !self.entities_hit.is_empty() || !self.walls_hit.is_empty()
    }
}

/// Melee attack input resolved by the caller
#[derive(Debug, Clone, Copy)]
pub struct MeleeAttack {
    pub attacker: EntityId,
    pub origin: Vec2,
    pub direction: Vec2,
    /// Effective stats, perk multipliers already applied
    pub stats: WeaponStats,
}

impl MeleeAttack {
    pub fn from_entity(attacker: &Entity) -> Self {
        Self {
            attacker: attacker.id,
            origin: attacker.pos,
            direction: attacker.facing_dir(),
            stats: attacker.attack_stats(),
        }
    }

    pub fn shape(&self) -> HitShape {
        HitShape::from_attack(self.origin, self.direction, self.stats.reach, self.stats.width)
    }
}

/// Apply one melee activation to every living target and wall under the
/// hit shape.
pub fn resolve_melee<'a>(
    attack: &MeleeAttack,
    targets: impl IntoIterator<Item = &'a mut Entity>,
    grid: &mut TileGrid,
    events: &mut EventLog,
) -> MeleeOutcome {
    let shape = attack.shape();
    let damage = attack.stats.damage;
    let mut outcome = MeleeOutcome::default();

    for target in targets {
        if target.id == attack.attacker || !target.is_alive() {
            continue;
        }
        if !shape.intersects_aabb(&target.aabb()) {
            continue;
        }
        apply_hit(target, attack.attacker, attack.origin, damage, events, &mut outcome.kills);
        outcome.entities_hit.push(target.id);
    }

    let candidates: Vec<TilePos> = grid.tiles_overlapping(&shape.bounds()).collect();
    for (x, y) in candidates {
        let destructible = grid.tile(x, y).is_some_and(|t| t.is_destructible());
        if !destructible || !shape.intersects_aabb(&tile_aabb((x, y))) {
            continue;
        }
        outcome.walls_hit.push((x, y));
        if grid.damage_wall(x, y, damage) {
            outcome.walls_destroyed.push((x, y));
            events.push(SimEvent::WallDestroyed { tile: (x, y) });
        }
    }

    trace!(
        attacker = attack.attacker.0,
        hits = outcome.entities_hit.len(),
        walls = outcome.walls_hit.len(),
        "melee resolved"
    );
    outcome
}

/// Damage plus knockback from `source_pos`. Records kills.
pub(crate) fn apply_hit(
    target: &mut Entity,
    source: EntityId,
    source_pos: Vec2,
    damage: f32,
    events: &mut EventLog,
    kills: &mut Vec<EntityId>,
) {
    let Some(report) = target.take_damage(damage) else {
        return;
    };
    events.push(SimEvent::EntityDamaged {
        target: target.id,
        source,
        amount: report.absorbed + report.dealt,
    });
    if report.killed {
        kills.push(target.id);
        events.push(SimEvent::EntityDied { id: target.id });
    } else {
        target.apply_knockback(source_pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TILE_SIZE;
    use crate::entity::PoolSizes;
    use crate::generation::cave::{Biome, LevelLayout};
    use crate::generation::seed::StreamRng;
    use crate::world::{FloorVariant, TileKind};
    use rand::SeedableRng;

    fn grid_with_wall(wall: Option<TilePos>) -> TileGrid {
        let (w, h) = (20, 20);
        let mut kinds = vec![TileKind::Floor; w * h];
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    kinds[y * w + x] = TileKind::Wall;
                }
            }
        }
        if let Some((x, y)) = wall {
            kinds[y as usize * w + x as usize] = TileKind::Wall;
        }
        let layout = LevelLayout {
            width: w,
            height: h,
            biome: Biome::Cavern,
            kinds,
            variants: vec![FloorVariant::Default; w * h],
            details: vec![0; w * h],
            carved: 0,
            steps_taken: 0,
        };
        TileGrid::from_layout(&layout, StreamRng::seed_from_u64(0))
    }

    fn entity(id: u32, pos: Vec2, health: f32, weapon: WeaponStats) -> Entity {
        Entity::new(
            EntityId(id),
            pos,
            5,
            1.0,
            PoolSizes {
                health,
                stamina: 0.0,
                mana: 0.0,
                shield: 0.0,
            },
            weapon,
        )
    }

    fn weapon(damage: f32) -> WeaponStats {
        WeaponStats {
            damage,
            ..WeaponStats::avatar_blade()
        }
    }

    #[test]
    fn test_kill_clamps_health() {
        let mut grid = grid_with_wall(None);
        let mut events = EventLog::default();
        let attacker = entity(0, Vec2::new(100.0, 100.0), 10.0, weapon(2.0));
        let mut target = entity(1, Vec2::new(112.0, 100.0), 1.0, weapon(1.0));

        let attack = MeleeAttack::from_entity(&attacker);
        let outcome = resolve_melee(&attack, [&mut target], &mut grid, &mut events);

        assert!(outcome.hit());
        assert_eq!(outcome.kills, vec![EntityId(1)]);
        assert!(!target.is_alive());
        assert_eq!(target.health.current(), 0.0);
    }

    #[test]
    fn test_damage_applied_once_per_activation() {
        let mut grid = grid_with_wall(None);
        let mut events = EventLog::default();
        let attacker = entity(0, Vec2::new(100.0, 100.0), 10.0, weapon(1.0));
        let mut target = entity(1, Vec2::new(112.0, 100.0), 10.0, weapon(1.0));
        let attack = MeleeAttack::from_entity(&attacker);
        resolve_melee(&attack, [&mut target], &mut grid, &mut events);
        assert_eq!(target.health.current(), 9.0);
        assert!(target.knockback.is_active());
        assert!(target.knockback.velocity.x > 0.0, "Pushed away from attacker");
    }

    #[test]
    fn test_miss_behind() {
        let mut grid = grid_with_wall(None);
        let mut events = EventLog::default();
        let attacker = entity(0, Vec2::new(100.0, 100.0), 10.0, weapon(1.0));
        let mut target = entity(1, Vec2::new(80.0, 100.0), 10.0, weapon(1.0));
        let outcome = resolve_melee(
            &MeleeAttack::from_entity(&attacker),
            [&mut target],
            &mut grid,
            &mut events,
        );
        assert!(!outcome.hit());
        assert!(events.is_empty());
    }

    #[test]
    fn test_dead_target_ignored() {
        let mut grid = grid_with_wall(None);
        let mut events = EventLog::default();
        let attacker = entity(0, Vec2::new(100.0, 100.0), 10.0, weapon(5.0));
        let mut target = entity(1, Vec2::new(112.0, 100.0), 1.0, weapon(1.0));
        let attack = MeleeAttack::from_entity(&attacker);
        resolve_melee(&attack, [&mut target], &mut grid, &mut events);
        let again = resolve_melee(&attack, [&mut target], &mut grid, &mut events);
        assert!(again.entities_hit.is_empty());
        assert_eq!(target.health.current(), 0.0);
    }

    #[test]
    fn test_wall_chipped_and_destroyed() {
        let wall = (7, 6);
        let mut grid = grid_with_wall(Some(wall));
        let mut events = EventLog::default();
        // Stand directly left of the wall tile, facing it
        let pos = Vec2::new(6.0 * TILE_SIZE + 8.0, 6.0 * TILE_SIZE + 8.0);
        let attacker = entity(0, pos, 10.0, weapon(2.0));
        let attack = MeleeAttack::from_entity(&attacker);

        let first = resolve_melee(&attack, std::iter::empty(), &mut grid, &mut events);
        assert!(first.walls_hit.contains(&wall));
        assert!(first.walls_destroyed.is_empty());
        let second = resolve_melee(&attack, std::iter::empty(), &mut grid, &mut events);
        assert_eq!(second.walls_destroyed, vec![wall]);
        assert!(!grid.is_wall(wall.0, wall.1));
        assert!(events
            .iter()
            .any(|e| *e == SimEvent::WallDestroyed { tile: wall }));
    }

    #[test]
    fn test_adversary_melee_chips_wall() {
        use crate::constants::WALL_DURABILITY;
        use crate::monster::{Adversary, Archetype};

        let wall = (7, 6);
        let mut grid = grid_with_wall(Some(wall));
        let mut events = EventLog::default();
        let grunt = Adversary::spawn(EntityId(1), Archetype::Grunt, (6, 6), &[]);
        let outcome = resolve_melee(
            &MeleeAttack::from_entity(&grunt.entity),
            std::iter::empty(),
            &mut grid,
            &mut events,
        );
        assert_eq!(outcome.walls_hit, vec![wall]);
        assert!(outcome.hit());
        let left = grid.tile(wall.0, wall.1).map(|t| t.durability);
        assert_eq!(left, Some(WALL_DURABILITY - grunt.profile.weapon.damage));
    }
}
