//! Feedback events for presentation collaborators.
//!
//! The core appends events while ticking; audio/animation layers drain them
//! after a batch of ticks. Events never feed back into simulation state, and
//! the authoritative-snapshot path emits none.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::world::TilePos;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A melee attack activated; `hit` is true when it connected with anything
    AttackStarted { attacker: EntityId, hit: bool },
    EntityDamaged {
        target: EntityId,
        source: EntityId,
        amount: f32,
    },
    EntityDied { id: EntityId },
    WallDestroyed { tile: TilePos },
    ProjectileFired { owner: EntityId },
    ProjectileHit { owner: EntityId, target: EntityId },
    Stomp { attacker: EntityId, hit: bool },
    RageEntered { id: EntityId },
    RageEnded { id: EntityId },
    LevelCleared { levels_completed: u32 },
    AvatarDied,
}

/// Append-only buffer of events since the last drain
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
