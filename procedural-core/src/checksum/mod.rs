//! World-state fingerprint for desync detection.
//!
//! Fold order: avatar position bits, then every adversary in list order
//! (position bits, alive flag), then every tile's wall flag row-major.
//! Cosmetic data never enters the hash.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::debug;

use crate::generation::seed::digest_to_u64;
use crate::monster::Adversary;
use crate::world::TileGrid;

/// One emitted fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumRecord {
    pub tick: u64,
    pub hash: u64,
    pub live_adversaries: u32,
}

/// Hash the current world state
pub fn world_hash(avatar_pos: Vec2, adversaries: &[Adversary], grid: &TileGrid) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(avatar_pos.x.to_bits().to_le_bytes());
    hasher.update(avatar_pos.y.to_bits().to_le_bytes());
    for adv in adversaries {
        hasher.update(adv.entity.pos.x.to_bits().to_le_bytes());
        hasher.update(adv.entity.pos.y.to_bits().to_le_bytes());
        hasher.update([adv.is_alive() as u8]);
    }
    let walls: Vec<u8> = grid.tiles().iter().map(|t| t.is_wall() as u8).collect();
    hasher.update(&walls);
    digest_to_u64(&hasher.finalize())
}

/// Emits a record every `interval` ticks. An interval of 0 disables it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChecksumVerifier {
    interval: u64,
    records: Vec<ChecksumRecord>,
}

impl ChecksumVerifier {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            records: Vec::new(),
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn is_due(&self, tick: u64) -> bool {
        self.interval > 0 && tick > 0 && tick % self.interval == 0
    }

    /// Record a fingerprint if `tick` is on the cadence
    pub fn observe(
        &mut self,
        tick: u64,
        avatar_pos: Vec2,
        adversaries: &[Adversary],
        grid: &TileGrid,
    ) -> Option<ChecksumRecord> {
        if !self.is_due(tick) {
            return None;
        }
        let record = ChecksumRecord {
            tick,
            hash: world_hash(avatar_pos, adversaries, grid),
            live_adversaries: adversaries.iter().filter(|a| a.is_alive()).count() as u32,
        };
        debug!(tick, hash = record.hash, live = record.live_adversaries, "checksum");
        self.records.push(record);
        Some(record)
    }

    pub fn records(&self) -> &[ChecksumRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// First tick at which two checksum streams disagree. A stream that stops
/// early diverges at the first record the other one has.
pub fn first_divergence(a: &[ChecksumRecord], b: &[ChecksumRecord]) -> Option<u64> {
    if let Some((x, _)) = a.iter().zip(b).find(|(x, y)| x != y) {
        return Some(x.tick);
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    long.get(short.len()).map(|r| r.tick)
}
