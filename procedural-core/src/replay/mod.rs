//! Input recording and deterministic replay.
//!
//! A run is fully determined by its config and its per-tick inputs, so a
//! recording stores the full [`SimConfig`] and the inputs plus the checksum
//! stream the original run emitted. Verification rebuilds a fresh
//! simulation from that config, feeds the same inputs and compares
//! checksums record by record.
//!
//! Workflow:
//! 1. [`ReplayRecorder::start`] with a config
//! 2. drive it with [`ReplayRecorder::step`] instead of the simulation
//! 3. [`ReplayRecorder::finish`] yields an [`InputRecording`]
//! 4. [`verify_recording`] on any machine, or [`verify_recording_against`]
//!    to also pin the expected config

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{info, warn};

use crate::checksum::{first_divergence, ChecksumRecord};
use crate::engine::{ConfigError, SimConfig, Simulation};
use crate::generation::seed::digest_to_u64;
use crate::player::PlayerInput;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Seed mismatch: recording uses {recorded}, config uses {configured}")]
    SeedMismatch { recorded: u64, configured: u64 },
    #[error("Checksum diverged at tick {tick}: expected {expected:#018x}, got {actual:#018x}")]
    ChecksumDiverged { tick: u64, expected: u64, actual: u64 },
    #[error("Config mismatch: recording was made with a different {field}")]
    ConfigMismatch { field: &'static str },
    #[error("Recording integrity hash mismatch")]
    IntegrityMismatch,
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to reproduce a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecording {
    pub config: SimConfig,
    pub inputs: Vec<PlayerInput>,
    pub checksums: Vec<ChecksumRecord>,
    /// Fingerprint after the last input, independent of cadence
    pub final_hash: u64,
    pub integrity: u64,
}

impl InputRecording {
    pub fn new(
        config: SimConfig,
        inputs: Vec<PlayerInput>,
        checksums: Vec<ChecksumRecord>,
        final_hash: u64,
    ) -> Self {
        let mut recording = Self {
            config,
            inputs,
            checksums,
            final_hash,
            integrity: 0,
        };
        recording.integrity = recording.compute_integrity();
        recording
    }

    fn compute_integrity(&self) -> u64 {
        let mut hasher = Sha3_256::new();
        let config = &self.config;
        hasher.update(config.root_seed.to_le_bytes());
        hasher.update((config.grid_width as u64).to_le_bytes());
        hasher.update((config.grid_height as u64).to_le_bytes());
        hasher.update(config.floor_fraction.to_bits().to_le_bytes());
        hasher.update(config.step_budget_factor.to_le_bytes());
        hasher.update(config.checksum_interval.to_le_bytes());
        hasher.update([config.auto_advance as u8]);
        hasher.update(config.max_adversaries.to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.forward.to_bits().to_le_bytes());
            hasher.update(input.right.to_bits().to_le_bytes());
            hasher.update([input.sprint as u8, input.attack as u8]);
            match input.aim {
                Some(aim) => {
                    hasher.update([1]);
                    hasher.update(aim.x.to_bits().to_le_bytes());
                    hasher.update(aim.y.to_bits().to_le_bytes());
                }
                None => hasher.update([0]),
            }
        }
        for record in &self.checksums {
            hasher.update(record.tick.to_le_bytes());
            hasher.update(record.hash.to_le_bytes());
        }
        hasher.update(self.final_hash.to_le_bytes());
        digest_to_u64(&hasher.finalize())
    }

    pub fn verify_integrity(&self) -> bool {
        self.integrity == self.compute_integrity()
    }

    pub fn root_seed(&self) -> u64 {
        self.config.root_seed
    }

    pub fn ticks(&self) -> u64 {
        self.inputs.len() as u64
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Drives a fresh simulation and records every input fed to it
pub struct ReplayRecorder {
    sim: Simulation,
    inputs: Vec<PlayerInput>,
}

impl ReplayRecorder {
    pub fn start(config: SimConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            sim: Simulation::new(config)?,
            inputs: Vec::new(),
        })
    }

    pub fn step(&mut self, input: &PlayerInput) -> Option<ChecksumRecord> {
        self.inputs.push(*input);
        self.sim.step(input)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn recorded_ticks(&self) -> usize {
        self.inputs.len()
    }

    pub fn finish(self) -> (Simulation, InputRecording) {
        let recording = InputRecording::new(
            self.sim.config().clone(),
            self.inputs,
            self.sim.checksum_records().to_vec(),
            self.sim.state_hash(),
        );
        info!(
            ticks = recording.ticks(),
            checksums = recording.checksums.len(),
            "recording finished"
        );
        (self.sim, recording)
    }
}

/// Name of the first field where two configs disagree
fn config_difference(expected: &SimConfig, recorded: &SimConfig) -> Option<&'static str> {
    let fields = [
        ("grid_width", expected.grid_width == recorded.grid_width),
        ("grid_height", expected.grid_height == recorded.grid_height),
        (
            "floor_fraction",
            expected.floor_fraction.to_bits() == recorded.floor_fraction.to_bits(),
        ),
        ("step_budget_factor", expected.step_budget_factor == recorded.step_budget_factor),
        ("checksum_interval", expected.checksum_interval == recorded.checksum_interval),
        ("auto_advance", expected.auto_advance == recorded.auto_advance),
        ("max_adversaries", expected.max_adversaries == recorded.max_adversaries),
    ];
    fields.iter().find(|(_, same)| !same).map(|(name, _)| *name)
}

/// Replay `recording` after checking it was made with `expected`
pub fn verify_recording_against(
    expected: &SimConfig,
    recording: &InputRecording,
) -> Result<(), ReplayError> {
    if expected.root_seed != recording.config.root_seed {
        return Err(ReplayError::SeedMismatch {
            recorded: recording.config.root_seed,
            configured: expected.root_seed,
        });
    }
    if let Some(field) = config_difference(expected, &recording.config) {
        return Err(ReplayError::ConfigMismatch { field });
    }
    verify_recording(recording)
}

/// Replay `recording` on a fresh simulation built from its own config
pub fn verify_recording(recording: &InputRecording) -> Result<(), ReplayError> {
    if !recording.verify_integrity() {
        return Err(ReplayError::IntegrityMismatch);
    }

    let mut sim = Simulation::new(recording.config.clone())?;
    let replayed = sim.run(&recording.inputs);

    if let Some(tick) = first_divergence(&recording.checksums, &replayed) {
        let hash_at = |records: &[ChecksumRecord]| {
            records.iter().find(|r| r.tick == tick).map_or(0, |r| r.hash)
        };
        let err = ReplayError::ChecksumDiverged {
            tick,
            expected: hash_at(&recording.checksums),
            actual: hash_at(&replayed),
        };
        warn!(%err, "replay diverged");
        return Err(err);
    }

    let actual = sim.state_hash();
    if actual != recording.final_hash {
        let err = ReplayError::ChecksumDiverged {
            tick: sim.tick(),
            expected: recording.final_hash,
            actual,
        };
        warn!(%err, "replay diverged");
        return Err(err);
    }

    info!(ticks = sim.tick(), checksums = replayed.len(), "replay verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            root_seed: seed,
            grid_width: 40,
            grid_height: 30,
            checksum_interval: 15,
            ..SimConfig::default()
        }
    }

    fn scripted(ticks: usize) -> Vec<PlayerInput> {
        (0..ticks)
            .map(|t| PlayerInput {
                forward: if (t / 20) % 2 == 0 { 1.0 } else { -0.5 },
                right: ((t as f32) * 0.1).sin(),
                sprint: t % 7 == 0,
                attack: t % 11 == 0,
                aim: (t % 3 == 0).then(|| Vec2::new(t as f32, 100.0)),
            })
            .collect()
    }

    fn record(seed: u64, ticks: usize) -> InputRecording {
        let mut recorder = ReplayRecorder::start(config(seed)).unwrap();
        for input in scripted(ticks) {
            recorder.step(&input);
        }
        recorder.finish().1
    }

    #[test]
    fn test_recording_verifies() {
        let recording = record(21, 120);
        assert_eq!(recording.ticks(), 120);
        assert_eq!(recording.checksums.len(), 8);
        assert!(recording.verify_integrity());
        verify_recording(&recording).unwrap();
        verify_recording_against(&config(21), &recording).unwrap();
    }

    #[test]
    fn test_json_roundtrip_still_verifies() {
        let recording = record(22, 60);
        let json = recording.to_json().unwrap();
        let restored = InputRecording::from_json(&json).unwrap();
        assert_eq!(restored, recording);
        verify_recording(&restored).unwrap();
    }

    #[test]
    fn test_seed_mismatch() {
        let recording = record(23, 30);
        assert!(matches!(
            verify_recording_against(&config(24), &recording),
            Err(ReplayError::SeedMismatch { recorded: 23, configured: 24 })
        ));
    }

    #[test]
    fn test_tampered_recording_rejected() {
        let mut recording = record(25, 30);
        recording.inputs[3].right = 1.0;
        assert!(matches!(
            verify_recording(&recording),
            Err(ReplayError::IntegrityMismatch)
        ));
    }

    #[test]
    fn test_divergence_reports_tick() {
        let mut recording = record(26, 60);
        recording.checksums[1].hash ^= 1;
        recording.integrity = recording.compute_integrity();
        match verify_recording(&recording) {
            Err(ReplayError::ChecksumDiverged { tick, expected, actual }) => {
                assert_eq!(tick, 30);
                assert_eq!(expected ^ 1, actual);
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn test_non_default_config_travels_with_recording() {
        let custom = SimConfig {
            root_seed: 77,
            grid_width: 40,
            grid_height: 30,
            floor_fraction: 0.5,
            checksum_interval: 10,
            auto_advance: true,
            max_adversaries: 5,
            ..SimConfig::default()
        };
        let mut recorder = ReplayRecorder::start(custom.clone()).unwrap();
        for input in scripted(90) {
            recorder.step(&input);
        }
        let (_, recording) = recorder.finish();
        assert_eq!(recording.config, custom);

        let restored = InputRecording::from_json(&recording.to_json().unwrap()).unwrap();
        verify_recording(&restored).unwrap();
        assert!(matches!(
            verify_recording_against(&SimConfig::with_seed(77), &restored),
            Err(ReplayError::ConfigMismatch { field: "grid_width" })
        ));
    }

    #[test]
    fn test_config_tampering_rejected() {
        let mut recording = record(27, 30);
        recording.config.auto_advance = true;
        assert!(matches!(
            verify_recording(&recording),
            Err(ReplayError::IntegrityMismatch)
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            InputRecording::from_json("[1, 2"),
            Err(ReplayError::Json(_))
        ));
    }
}
