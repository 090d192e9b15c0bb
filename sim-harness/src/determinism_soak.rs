/// Determinism soak runner
///
/// Usage: cargo run --bin determinism_soak -- --seeds 16 --replicas 4 --ticks 3600
///
/// For every seed, runs `replicas` independent simulations in parallel with
/// the same scripted input and fails on the first checksum divergence.
/// `--record <path>` also writes the first seed's run as a replay recording.
use std::time::Instant;

use anyhow::{bail, Context, Result};
use dungeon_core::checksum::{first_divergence, ChecksumRecord};
use dungeon_core::logging::{init_tracing, TracingConfig};
use dungeon_core::replay::ReplayRecorder;
use dungeon_core::{SimConfig, Simulation};
use rayon::prelude::*;
use sim_harness::{has_flag, parse_arg, parse_str_arg, scripted_inputs};
use tracing::{error, info};

struct SeedOutcome {
    seed: u64,
    records: usize,
    final_hash: u64,
    levels_completed: u32,
    divergence: Option<(usize, u64)>,
}

fn run_once(config: &SimConfig, ticks: usize) -> Result<(Vec<ChecksumRecord>, u64, u32)> {
    let mut sim = Simulation::new(config.clone())?;
    let records = sim.run(&scripted_inputs(config.root_seed, ticks));
    Ok((records, sim.state_hash(), sim.levels_completed()))
}

fn soak_seed(config: SimConfig, replicas: usize, ticks: usize) -> Result<SeedOutcome> {
    let runs: Vec<(Vec<ChecksumRecord>, u64, u32)> = (0..replicas)
        .into_par_iter()
        .map(|_| run_once(&config, ticks))
        .collect::<Result<_>>()?;

    let (baseline, final_hash, levels_completed) = &runs[0];
    let divergence = runs.iter().enumerate().skip(1).find_map(|(i, (records, hash, _))| {
        first_divergence(baseline, records)
            .or_else(|| (hash != final_hash).then_some(ticks as u64))
            .map(|tick| (i, tick))
    });

    Ok(SeedOutcome {
        seed: config.root_seed,
        records: baseline.len(),
        final_hash: *final_hash,
        levels_completed: *levels_completed,
        divergence,
    })
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let seeds = parse_arg(&args, "--seeds").unwrap_or(8);
    let replicas = parse_arg(&args, "--replicas").unwrap_or(4).max(2) as usize;
    let ticks = parse_arg(&args, "--ticks").unwrap_or(3600) as usize;
    let base_seed = parse_arg(&args, "--seed").unwrap_or(42);
    let config = match parse_str_arg(&args, "--config") {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => SimConfig::default(),
    };
    let config = SimConfig {
        auto_advance: config.auto_advance || has_flag(&args, "--auto-advance"),
        ..config
    };

    init_tracing(&TracingConfig::quiet());
    info!(seeds, replicas, ticks, base_seed, "determinism soak starting");
    let started = Instant::now();

    let outcomes: Vec<SeedOutcome> = (0..seeds)
        .into_par_iter()
        .map(|i| {
            let config = SimConfig {
                root_seed: base_seed.wrapping_add(i),
                ..config.clone()
            };
            soak_seed(config, replicas, ticks)
        })
        .collect::<Result<_>>()?;

    let mut diverged = 0;
    for outcome in &outcomes {
        match outcome.divergence {
            Some((replica, tick)) => {
                diverged += 1;
                error!(seed = outcome.seed, replica, tick, "checksum divergence");
            }
            None => println!(
                "seed {:>20}  checksums {:>5}  levels {:>3}  final {:#018x}",
                outcome.seed, outcome.records, outcome.levels_completed, outcome.final_hash
            ),
        }
    }

    if let Some(path) = parse_str_arg(&args, "--record") {
        let config = SimConfig {
            root_seed: base_seed,
            ..config.clone()
        };
        let mut recorder = ReplayRecorder::start(config)?;
        for input in scripted_inputs(base_seed, ticks) {
            recorder.step(&input);
        }
        let (_, recording) = recorder.finish();
        std::fs::write(&path, recording.to_json()?).with_context(|| format!("writing {path}"))?;
        println!("recording written to {path}");
    }

    let elapsed = started.elapsed();
    let total_ticks = seeds * replicas as u64 * ticks as u64;
    println!(
        "{} seeds x {} replicas x {} ticks in {:.2?} ({:.0} ticks/s)",
        seeds,
        replicas,
        ticks,
        elapsed,
        total_ticks as f64 / elapsed.as_secs_f64().max(1e-9)
    );

    if diverged > 0 {
        bail!("{diverged} of {seeds} seeds diverged");
    }
    Ok(())
}
