//! Per-adversary micro-variation stream.
//!
//! Each adversary owns one of these, seeded from its spawn coordinates. It
//! never touches the shared seed streams, so however often an adversary
//! jitters, the shared draw order stays the same.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// xorshift64 generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRng {
    state: u64,
}

impl JitterRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// Seed from a spawn position's bit patterns
    pub fn from_spawn(pos: Vec2) -> Self {
        let x = pos.x.to_bits() as u64;
        let y = pos.y.to_bits() as u64;
        let mixed = (x << 32 | y) ^ 0x9E37_79B9_7F4A_7C15;
        Self::new(mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() % 10000) as f32 / 10000.0
    }

    /// Uniform in [-1, 1)
    pub fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Uniform in [min, max)
    pub fn next_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min) as u64) as u32
    }
}
