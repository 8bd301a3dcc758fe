#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Path Defence session.

mod config;
mod sinks;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use path_defence_core::{CellCoord, Progression, WavePhase};
use path_defence_simulation::Simulation;
use path_defence_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sinks::{TracingPresentation, TracingUi};

/// Command-line arguments accepted by the Path Defence runner.
#[derive(Debug, Parser)]
#[command(name = "path-defence", about = "Runs a headless Path Defence session")]
struct CliArgs {
    /// Session configuration file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Maximum number of simulation ticks to run.
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long = "tick-ms", default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Cell to block before the first wave, as `x,z`. Repeatable.
    #[arg(long = "block", value_name = "X,Z", value_parser = config::parse_cell)]
    blocks: Vec<CellCoord>,
    /// Stop after this many waves have been started.
    #[arg(long)]
    waves: Option<u32>,
    /// Start waves automatically this many milliseconds after a clear.
    #[arg(long = "auto-advance-ms", value_name = "MS")]
    auto_advance_ms: Option<u64>,
}

/// Entry point for the Path Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    run(&args)
}

fn run(args: &CliArgs) -> Result<()> {
    let mut config = config::load(args.config.as_deref())?;
    config::apply_auto_advance(&mut config, args.auto_advance_ms);

    let mut simulation = Simulation::new(
        config,
        TracingPresentation::default(),
        TracingUi::default(),
    )
    .context("failed to build the simulation")?;

    for cell in &args.blocks {
        simulation.request_toggle_cell(*cell);
    }

    let dt = Duration::from_millis(args.tick_ms);
    let wave_limit = args.waves.unwrap_or(u32::MAX);

    while simulation.ticks() < args.ticks {
        if simulation.ui().completed || simulation.ui().defeated {
            break;
        }

        let director = simulation.director();
        if director.phase() == WavePhase::Idle {
            let started = director.current_wave().map_or(0, |wave| wave.get());
            if started >= wave_limit {
                break;
            }
            // Automatic progression only needs the first wave kicked off.
            if started == 0 || director.progression() == Progression::Manual {
                simulation.request_start_wave();
            }
        }

        simulation.step(dt);
    }

    report(&simulation);
    Ok(())
}

fn report(simulation: &Simulation<TracingPresentation, TracingUi>) {
    let economy = query::economy(simulation.world());
    let presentation = simulation.presentation();
    info!(
        ticks = simulation.ticks(),
        wave = simulation
            .director()
            .current_wave()
            .map_or(0, |wave| wave.get()),
        spawned = presentation.spawned,
        arrived = presentation.arrived,
        killed = presentation.killed,
        "session finished"
    );
    println!(
        "health {} | score {} | currency {} | completed {} | defeated {}",
        economy.health(),
        economy.score(),
        economy.currency(),
        simulation.ui().completed,
        simulation.ui().defeated,
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults_apply_without_flags() {
        let args = CliArgs::try_parse_from(["path-defence"]).expect("no flags");

        assert_eq!(args.config, None);
        assert_eq!(args.ticks, 20_000);
        assert_eq!(args.tick_ms, 16);
        assert!(args.blocks.is_empty());
        assert_eq!(args.waves, None);
        assert_eq!(args.auto_advance_ms, None);
    }

    #[test]
    fn repeated_blocks_and_limits_are_collected() {
        let args = CliArgs::try_parse_from([
            "path-defence",
            "--config",
            "session.toml",
            "--block",
            "1,0",
            "--block",
            "2,3",
            "--waves",
            "2",
            "--tick-ms",
            "50",
            "--auto-advance-ms",
            "3000",
        ])
        .expect("valid flags");

        assert_eq!(args.config, Some(PathBuf::from("session.toml")));
        assert_eq!(args.blocks, vec![CellCoord::new(1, 0), CellCoord::new(2, 3)]);
        assert_eq!(args.waves, Some(2));
        assert_eq!(args.tick_ms, 50);
        assert_eq!(args.auto_advance_ms, Some(3_000));
    }

    #[test]
    fn malformed_flags_are_rejected() {
        assert!(CliArgs::try_parse_from(["path-defence", "--tick-ms", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["path-defence", "--block", "1"]).is_err());
        assert!(CliArgs::try_parse_from(["path-defence", "--block", "a,b"]).is_err());
    }
}
