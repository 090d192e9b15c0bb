/// Replay verifier
///
/// Usage:
///   cargo run --bin replay_verify -- --recording run.json [--config sim.ron] [--log-level debug]
///
/// Loads an input recording, replays it on a fresh simulation built from the
/// recording's own config and reports the first diverging checksum. With
/// `--config`, the recording must also have been made with that config.
use anyhow::{Context, Result};
use dungeon_core::logging::{init_tracing, LogLevel, TracingConfig};
use dungeon_core::replay::{verify_recording, verify_recording_against, InputRecording};
use dungeon_core::SimConfig;
use sim_harness::parse_str_arg;
use tracing::info;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let path = parse_str_arg(&args, "--recording").context("missing --recording <path>")?;

    let mut tracing_config = TracingConfig::default();
    if let Some(level) = parse_str_arg(&args, "--log-level").and_then(|l| LogLevel::parse(&l)) {
        tracing_config.default_level = level;
    }
    init_tracing(&tracing_config);

    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let recording = InputRecording::from_json(&json).with_context(|| format!("parsing {path}"))?;
    let expected = match parse_str_arg(&args, "--config") {
        Some(cfg) => Some(SimConfig::load(&cfg).with_context(|| format!("loading {cfg}"))?),
        None => None,
    };

    info!(
        path = %path,
        seed = recording.root_seed(),
        grid_width = recording.config.grid_width,
        grid_height = recording.config.grid_height,
        ticks = recording.ticks(),
        checksums = recording.checksums.len(),
        "verifying recording"
    );
    match &expected {
        Some(config) => verify_recording_against(config, &recording),
        None => verify_recording(&recording),
    }
    .with_context(|| format!("verifying {path}"))?;
    println!(
        "{path}: {} ticks, {} checksums, final {:#018x} - OK",
        recording.ticks(),
        recording.checksums.len(),
        recording.final_hash
    );
    Ok(())
}
