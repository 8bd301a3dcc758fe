//! Loading of session configuration files and command-line overrides.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use path_defence_core::{CellCoord, Progression};
use path_defence_simulation::SimulationConfig;

/// Reads the configuration at `path`, or the built-in defaults when absent.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parses and validates TOML session configuration.
pub(crate) fn parse(contents: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig =
        toml::from_str(contents).context("failed to parse session config toml contents")?;

    if config.world.grid_size == 0 {
        bail!("grid_size must be at least 1");
    }
    let spacing = config.world.cell_spacing;
    if spacing.is_nan() || spacing <= 0.0 {
        bail!("cell_spacing must be positive, got {spacing}");
    }
    if config.waves.is_empty() {
        bail!("config defines no waves");
    }

    Ok(config)
}

/// Switches the session to automatic progression with the provided delay.
pub(crate) fn apply_auto_advance(config: &mut SimulationConfig, delay_ms: Option<u64>) {
    if let Some(delay_ms) = delay_ms {
        config.progression = Progression::Automatic { delay_ms };
    }
}

/// Parses a `x,z` cell argument.
pub(crate) fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (x, z) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{value}`"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let z = z
        .trim()
        .parse()
        .map_err(|error| format!("invalid z coordinate `{z}`: {error}"))?;
    Ok(CellCoord::new(x, z))
}
