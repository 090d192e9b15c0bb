//! Shared helpers for the harness binaries.

use dungeon_core::PlayerInput;
use glam::Vec2;

/// Scripted input stream, a pure function of `(salt, ticks)`.
///
/// The player walks a slowly rotating heading, sprints in bursts, swings on
/// a fixed rhythm and aims at a drifting point for part of each cycle.
pub fn scripted_inputs(salt: u64, ticks: usize) -> Vec<PlayerInput> {
    let offset = (salt % 997) as f32 * 0.013;
    (0..ticks)
        .map(|t| {
            let heading = offset + t as f32 * 0.021;
            PlayerInput {
                forward: heading.cos(),
                right: heading.sin(),
                sprint: (t / 40) % 4 == 1,
                attack: t % 13 == 0,
                aim: (t % 90 > 60).then(|| {
                    Vec2::new(heading.cos() * 400.0 + 640.0, heading.sin() * 300.0 + 480.0)
                }),
            }
        })
        .collect()
}

pub fn parse_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

pub fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
