//! Engine binary for the Canopy simulation.
//!
//! Loads configuration, lays out the terrain, plants the initial forest,
//! and runs the growth loop until the tick limit or extinction. The final
//! result and a snapshot of every surviving tree are printed as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, `CANOPY_CONFIG`, or
//!    `canopy-config.yaml`; defaults when the default file is absent)
//! 2. Initialize structured logging (tracing)
//! 3. Register species
//! 4. Generate terrain
//! 5. Build the simulation state and plant initial trees
//! 6. Run the simulation loop
//! 7. Log and print the result

mod error;
mod seeding;
mod summary;

use std::path::PathBuf;

use canopy_core::config::{LoggingConfig, SimulationConfig};
use canopy_core::node::NodeSnapshot;
use canopy_core::runner::{self, RunBounds, SimulationResult};
use canopy_core::species::{FeatureToggles, builtin_species};
use canopy_core::{AcceptAll, SimulationState, SpeciesRegistry};
use canopy_types::BlockKind;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::summary::SummaryLogger;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "CANOPY_CONFIG";

/// Configuration file read when no path is given.
const DEFAULT_CONFIG_PATH: &str = "canopy-config.yaml";

/// JSON report printed when the run ends.
#[derive(Debug, Serialize)]
struct EngineReport<'a> {
    world: &'a str,
    seed: u64,
    result: &'a SimulationResult,
    leaves: usize,
    branches: usize,
    trees: Vec<NodeSnapshot>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("canopy-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        max_ticks = config.world.max_ticks,
        tick_interval_ms = config.world.tick_interval_ms,
        half_extent = config.world.half_extent,
        "World configuration"
    );

    // 3. Register species.
    let registry = build_registry(&config);

    // 4. Generate terrain.
    let mut terrain_rng = SmallRng::seed_from_u64(config.world.seed);
    let world = seeding::build_terrain(&config.world, &mut terrain_rng).map_err(EngineError::from)?;

    // 5. Build state and plant the initial forest.
    let mut state = SimulationState::new(&config, world, registry).map_err(EngineError::from)?;
    let planting = seeding::plant_initial_trees(&mut state, config.growth.initial_trees)?;
    if planting.planted < config.growth.initial_trees {
        warn!(
            requested = config.growth.initial_trees,
            planted = planting.planted,
            "Fewer initial trees than requested"
        );
    }

    // 6. Run the simulation loop.
    let bounds = RunBounds::from_config(&config.world);
    let mut callback = SummaryLogger::new(config.logging.summary_interval_ticks);
    let result = runner::run_simulation(&mut state, bounds, &mut AcceptAll, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 7. Log and print the result.
    runner::log_simulation_end(&result);
    info!(
        summaries = callback.logged(),
        initial_trees = planting.planted,
        "Run complete"
    );
    let report = EngineReport {
        world: &config.world.name,
        seed: config.world.seed,
        result: &result,
        leaves: state.world.count_kind(BlockKind::Leaves),
        branches: state.world.count_kind(BlockKind::Branch),
        trees: state.snapshots(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");

    Ok(())
}

/// Load configuration.
///
/// An explicitly named file must exist. The default file is optional and
/// its absence yields [`SimulationConfig::default`]. Returns the path the
/// configuration came from, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    if let Some(path) = explicit {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = SimulationConfig::default();
        config.world.apply_env_overrides()?;
        Ok((config, None))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Species from the configuration, or the built-in set when none are
/// configured. Rejected definitions are skipped.
fn build_registry(config: &SimulationConfig) -> SpeciesRegistry {
    let definitions = if config.species.is_empty() {
        builtin_species(&FeatureToggles::from_config(&config.growth))
    } else {
        config.species.clone()
    };

    let mut registry = SpeciesRegistry::default();
    let report = registry.register_all(definitions);
    info!(
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "Species registered"
    );
    registry
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_core::species::SpeciesDefinition;
    use canopy_types::ResourceKey;

    use super::*;

    #[test]
    fn default_config_registers_builtin_species() {
        let config = SimulationConfig::default();
        let expected = builtin_species(&FeatureToggles::from_config(&config.growth)).len();
        let registry = build_registry(&config);
        assert_eq!(registry.len(), expected);
    }

    #[test]
    fn configured_species_replace_builtins_and_skip_rejects() {
        let mut config = SimulationConfig::default();
        let birch = ResourceKey::new("canopy", "birch");
        let definition = SpeciesDefinition::new(birch.clone(), birch.clone());
        config.species = vec![definition.clone(), definition];

        let registry = build_registry(&config);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&birch).is_some());
        assert!(registry.get(&ResourceKey::new("canopy", "oak")).is_none());
    }
}
