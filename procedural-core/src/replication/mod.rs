//! Authoritative snapshot contract.
//!
//! A networking collaborator captures [`WorldSnapshot`]s from the host and
//! applies them on mirrors between ticks. Applying is a silent overwrite of
//! position, resources, facing and liveness: no events, no knockback, no
//! state-machine transitions. Malformed snapshots are rejected up front by
//! [`WorldSnapshot::validate_against`].

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Simulation;
use crate::entity::{Entity, EntityId, Octant};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SnapshotError {
    #[error("Non-finite {field} for entity {id}")]
    NonFiniteField { id: u32, field: &'static str },
    #[error("Negative {field} for entity {id}")]
    NegativeResource { id: u32, field: &'static str },
    #[error("Entity {0} is marked alive with no health")]
    AliveWithoutHealth(u32),
    #[error("Duplicate entity id {0}")]
    DuplicateId(u32),
    #[error("Unknown entity id {0}")]
    UnknownEntity(u32),
}

/// Wire shape of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub stamina: f32,
    pub shield: f32,
    pub facing: Octant,
    pub alive: bool,
}

impl EntitySnapshot {
    pub fn capture(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            x: entity.pos.x,
            y: entity.pos.y,
            health: entity.health.current(),
            stamina: entity.stamina.current(),
            shield: entity.shield.current(),
            facing: entity.octant(),
            alive: entity.is_alive(),
        }
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let id = self.id.0;
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("health", self.health),
            ("stamina", self.stamina),
            ("shield", self.shield),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SnapshotError::NonFiniteField { id, field });
            }
        }
        for &(field, value) in &fields[2..] {
            if value < 0.0 {
                return Err(SnapshotError::NegativeResource { id, field });
            }
        }
        if self.alive && self.health <= 0.0 {
            return Err(SnapshotError::AliveWithoutHealth(id));
        }
        Ok(())
    }
}

impl Entity {
    /// Silent authoritative overwrite. Pools clamp to their local maxima.
    pub(crate) fn overwrite_from(&mut self, snap: &EntitySnapshot) {
        self.pos = Vec2::new(snap.x, snap.y);
        self.health.set(snap.health);
        self.stamina.set(snap.stamina);
        self.shield.set(snap.shield);
        self.facing = snap.facing.angle();
        self.alive = snap.alive;
        if !snap.alive {
            self.health.set(0.0);
            self.knockback.clear();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    /// Avatar first, then adversaries in list order
    pub entities: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    pub fn capture(sim: &Simulation) -> Self {
        let entities = std::iter::once(&sim.avatar().entity)
            .chain(sim.adversaries().iter().map(|a| &a.entity))
            .map(EntitySnapshot::capture)
            .collect();
        Self {
            tick: sim.tick(),
            entities,
        }
    }

    pub fn validate_against(&self, sim: &Simulation) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for snap in &self.entities {
            snap.validate()?;
            if !seen.insert(snap.id) {
                return Err(SnapshotError::DuplicateId(snap.id.0));
            }
            if sim.entity(snap.id).is_none() {
                return Err(SnapshotError::UnknownEntity(snap.id.0));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Simulation {
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    /// Validate, then silently overwrite every listed entity. Entities the
    /// snapshot omits are left untouched.
    pub fn apply_snapshot(&mut self, snapshot: &WorldSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate_against(self)?;
        for snap in &snapshot.entities {
            if let Some(entity) = self.entity_mut(snap.id) {
                entity.overwrite_from(snap);
            }
        }
        debug!(tick = snapshot.tick, entities = snapshot.entities.len(), "snapshot applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimConfig;
    use crate::player::PlayerInput;

    fn sim(seed: u64) -> Simulation {
        Simulation::new(SimConfig {
            root_seed: seed,
            grid_width: 40,
            grid_height: 30,
            ..SimConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_capture_lists_avatar_first() {
        let s = sim(1);
        let snap = s.snapshot();
        assert_eq!(snap.entities.len(), 1 + s.adversaries().len());
        assert_eq!(snap.entities[0].id, EntityId::AVATAR);
        assert!(snap.entities.iter().all(|e| e.alive));
    }

    #[test]
    fn test_apply_is_silent_and_exact() {
        let mut host = sim(2);
        let input = PlayerInput {
            forward: 1.0,
            right: 0.5,
            ..PlayerInput::idle()
        };
        host.run(&[input; 30]);
        host.drain_events();
        let snap = host.snapshot();

        let mut mirror = sim(2);
        mirror.apply_snapshot(&snap).unwrap();
        assert_eq!(mirror.pending_events(), 0);
        assert_eq!(mirror.avatar().entity.pos, host.avatar().entity.pos);
        assert_eq!(mirror.snapshot().entities, snap.entities);
    }

    #[test]
    fn test_dead_entity_overwrite() {
        let mut s = sim(3);
        let mut snap = s.snapshot();
        snap.entities[1].alive = false;
        snap.entities[1].health = 0.0;
        s.apply_snapshot(&snap).unwrap();
        assert!(!s.adversaries()[0].is_alive());
        assert_eq!(s.adversaries()[0].entity.health.current(), 0.0);
    }

    #[test]
    fn test_rejects_alive_with_zero_health() {
        let mut s = sim(6);
        let before = s.snapshot();
        let mut snap = before.clone();
        snap.entities[1].alive = true;
        snap.entities[1].health = 0.0;
        assert_eq!(s.apply_snapshot(&snap), Err(SnapshotError::AliveWithoutHealth(1)));

        assert!(s.adversaries()[0].is_alive());
        assert_eq!(s.snapshot().entities, before.entities, "Rejected snapshot must not apply");
    }

    #[test]
    fn test_rejects_malformed() {
        let mut s = sim(4);
        let good = s.snapshot();

        let mut nan = good.clone();
        nan.entities[0].x = f32::NAN;
        assert_eq!(
            s.apply_snapshot(&nan),
            Err(SnapshotError::NonFiniteField { id: 0, field: "x" })
        );

        let mut negative = good.clone();
        negative.entities[0].stamina = -1.0;
        assert!(matches!(
            s.apply_snapshot(&negative),
            Err(SnapshotError::NegativeResource { field: "stamina", .. })
        ));

        let mut dup = good.clone();
        dup.entities.push(dup.entities[0]);
        assert_eq!(s.apply_snapshot(&dup), Err(SnapshotError::DuplicateId(0)));

        let mut unknown = good.clone();
        unknown.entities[0].id = EntityId(4242);
        assert_eq!(s.apply_snapshot(&unknown), Err(SnapshotError::UnknownEntity(4242)));

        let avatar = good.entities[0];
        assert_eq!(s.avatar().entity.pos, Vec2::new(avatar.x, avatar.y));
    }

    #[test]
    fn test_json_wire_shape() {
        let s = sim(5);
        let snap = s.snapshot();
        let json = snap.to_json();
        assert!(json.contains("\"facing\":\"East\""));
        assert_eq!(WorldSnapshot::from_json(&json).unwrap(), snap);
    }
}
