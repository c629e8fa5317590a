//! Driver configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `sandfall.ron` file (if exists), or the file passed with `--config`
//! 3. Environment variables prefixed with `SANDFALL_`
//!
//! Example environment variable: `SANDFALL_SIM__STEPDOWN_STEPS=4`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use sandfall_core::world::SimParams;
use serde::{Deserialize, Serialize};

/// Top-level driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SandfallConfig {
    #[serde(default)]
    pub sim: SimParams,

    #[serde(default)]
    pub run: RunConfig,
}

/// How a headless run is driven
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Ticks to simulate when neither the CLI nor the scene says otherwise
    pub ticks: u64,
    /// RNG seed
    pub seed: u64,
    /// Drive ticks through the interruptible scheduler
    pub incremental: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 300,
            seed: 0,
            incremental: false,
        }
    }
}

impl SandfallConfig {
    /// Load configuration from all sources
    ///
    /// With `path = None` the file layer is an optional `sandfall.ron` in the
    /// working directory; otherwise the given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let sim = SimParams::default();
        let run = RunConfig::default();

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("sandfall")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("sim.width", i64::from(sim.width))?
            .set_default("sim.height", i64::from(sim.height))?
            .set_default("sim.gravity", f64::from(sim.gravity))?
            .set_default("sim.max_velocity", f64::from(sim.max_velocity))?
            .set_default("sim.liquid_side_velocity", i64::from(sim.liquid_side_velocity))?
            .set_default("sim.stepdown_size", i64::from(sim.stepdown_size))?
            .set_default("sim.stepdown_steps", i64::from(sim.stepdown_steps))?
            .set_default("sim.tick_rate", f64::from(sim.tick_rate))?
            .set_default("sim.max_steps_per_update", i64::from(sim.max_steps_per_update))?
            .set_default("sim.vertical_scan", "BottomUp")?
            .set_default("sim.brush_size", i64::from(sim.brush_size))?
            .set_default("run.ticks", run.ticks)?
            .set_default("run.seed", run.seed)?
            .set_default("run.incremental", run.incremental)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (SANDFALL_SIM__WIDTH, etc.)
            .add_source(
                Environment::with_prefix("SANDFALL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config
            .sim
            .validate()
            .context("Invalid simulation parameters in configuration")?;
        Ok(config)
    }
}
