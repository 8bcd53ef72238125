//! Typed view of `canopy-config.yaml`.
//!
//! Each YAML section maps onto one struct here, every key has a default,
//! and `CANOPY_SEED` / `CANOPY_MAX_TICKS` override the file after parsing.
//!
//! Species tables may be embedded under `species:`. When the list is empty
//! the engine registers the built-in species instead.

use std::path::Path;

use canopy_types::{BlockPos, RegionId};
use serde::Deserialize;

use crate::species::SpeciesDefinition;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "CANOPY_SEED";

/// Environment variable overriding `world.max_ticks`.
pub const MAX_TICKS_ENV: &str = "CANOPY_MAX_TICKS";

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read configuration: {source}")]
    Io {
        /// Cause.
        #[from]
        source: std::io::Error,
    },

    /// The document is not valid configuration YAML.
    #[error("malformed configuration: {source}")]
    Yaml {
        /// Cause.
        source: serde_yml::Error,
    },

    /// An environment override held a value that does not parse.
    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidOverride {
        /// Variable name.
        var: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Everything the engine reads from `canopy-config.yaml`.
///
/// Mirrors the structure of `canopy-config.yaml`. Every field has a default,
/// so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing, extent).
    #[serde(default)]
    pub world: WorldConfig,

    /// Season cycle settings.
    #[serde(default)]
    pub time: TimeConfig,

    /// Growth and drop toggles.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// Log level, format, and summary cadence.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Species definitions to register instead of the built-in set.
    #[serde(default)]
    pub species: Vec<SpeciesDefinition>,
}

impl SimulationConfig {
    /// Read and parse the YAML file at `path`.
    ///
    /// Environment variables override YAML values:
    /// - `CANOPY_SEED` overrides `world.seed`
    /// - `CANOPY_MAX_TICKS` overrides `world.max_ticks`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override does not parse.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }
}

/// World identity, seed, bounds, and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Display name of the world.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for every random draw in the run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Region (dimension) the simulated world belongs to.
    #[serde(default)]
    pub region: i32,

    /// Real-time milliseconds per tick (0 = run as fast as possible).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unbounded).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Half-width of the square world in blocks, centered on the origin.
    #[serde(default = "default_half_extent")]
    pub half_extent: i32,

    /// Lowest buildable layer.
    #[serde(default)]
    pub min_y: i32,

    /// Highest buildable layer.
    #[serde(default = "default_max_y")]
    pub max_y: i32,

    /// Layer the soil surface sits on.
    #[serde(default = "default_surface_y")]
    pub surface_y: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            region: 0,
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
            half_extent: default_half_extent(),
            min_y: 0,
            max_y: default_max_y(),
            surface_y: default_surface_y(),
        }
    }
}

impl WorldConfig {
    /// Apply `CANOPY_SEED` and `CANOPY_MAX_TICKS` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if a set variable is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(seed) = read_u64_override(SEED_ENV)? {
            self.seed = seed;
        }
        if let Some(max_ticks) = read_u64_override(MAX_TICKS_ENV)? {
            self.max_ticks = max_ticks;
        }
        Ok(())
    }

    /// Region id as a typed value.
    pub const fn region_id(&self) -> RegionId {
        RegionId(self.region)
    }

    /// Lower corner of the growth lattice.
    pub const fn lattice_min(&self) -> BlockPos {
        BlockPos::new(
            self.half_extent.saturating_neg(),
            self.min_y,
            self.half_extent.saturating_neg(),
        )
    }

    /// Upper corner of the growth lattice.
    pub const fn lattice_max(&self) -> BlockPos {
        BlockPos::new(self.half_extent, self.max_y, self.half_extent)
    }
}

fn read_u64_override(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_err| ConfigError::InvalidOverride { var, value }),
        Err(_) => Ok(None),
    }
}

/// Season cycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Length of one season in ticks.
    #[serde(default = "default_ticks_per_season")]
    pub ticks_per_season: u64,

    /// Season names in cycle order.
    #[serde(default = "default_seasons")]
    pub seasons: Vec<String>,

    /// Whether regions get a clock-driven season provider. When off, every
    /// region runs without seasons and all seasonal factors are 1.0.
    #[serde(default = "default_true")]
    pub seasons_enabled: bool,

    /// Ticks between season value resamples.
    #[serde(default = "default_season_update_interval")]
    pub season_update_interval: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ticks_per_season: default_ticks_per_season(),
            seasons: default_seasons(),
            seasons_enabled: true,
            season_update_interval: default_season_update_interval(),
        }
    }
}

/// Growth, drop, and world generation toggles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GrowthConfig {
    /// Base chance multiplier for voluntary seed drops.
    #[serde(default = "default_seed_drop_rate")]
    pub seed_drop_rate: f32,

    /// Allow swamp oaks to root in shallow swamp water.
    #[serde(default = "default_true")]
    pub enable_swamp_oaks_in_water: bool,

    /// Register the apple oak. When off, plain oaks drop apples instead.
    #[serde(default = "default_true")]
    pub enable_apple_trees: bool,

    /// Whether trees are placed by world generation at startup.
    #[serde(default = "default_true")]
    pub world_gen: bool,

    /// Number of trees seeded at startup.
    #[serde(default = "default_initial_trees")]
    pub initial_trees: u32,

    /// Soil life given to freshly planted rooty soil (0..=15).
    #[serde(default = "default_initial_soil_life")]
    pub initial_soil_life: u8,

    /// Whether voluntarily dropped seeds try to plant themselves nearby.
    #[serde(default = "default_true")]
    pub plant_dropped_seeds: bool,

    /// Horizontal distance a dropped seed may land from its parent.
    #[serde(default = "default_seed_scatter_radius")]
    pub seed_scatter_radius: i32,

    /// Upper bound on living trees; seeds stop planting past it.
    #[serde(default = "default_max_trees")]
    pub max_trees: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            seed_drop_rate: default_seed_drop_rate(),
            enable_swamp_oaks_in_water: true,
            enable_apple_trees: true,
            world_gen: true,
            initial_trees: default_initial_trees(),
            initial_soil_life: default_initial_soil_life(),
            plant_dropped_seeds: true,
            seed_scatter_radius: default_seed_scatter_radius(),
            max_trees: default_max_trees(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,

    /// Log a tick summary every N ticks (0 = never).
    #[serde(default = "default_summary_interval_ticks")]
    pub summary_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            summary_interval_ticks: default_summary_interval_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Canopy".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    0
}

const fn default_max_ticks() -> u64 {
    2_000
}

const fn default_half_extent() -> i32 {
    32
}

const fn default_max_y() -> i32 {
    63
}

const fn default_surface_y() -> i32 {
    4
}

const fn default_ticks_per_season() -> u64 {
    240
}

fn default_seasons() -> Vec<String> {
    vec![
        "spring".to_owned(),
        "summer".to_owned(),
        "autumn".to_owned(),
        "winter".to_owned(),
    ]
}

const fn default_season_update_interval() -> u64 {
    20
}

const fn default_seed_drop_rate() -> f32 {
    0.01
}

const fn default_initial_trees() -> u32 {
    24
}

const fn default_initial_soil_life() -> u8 {
    15
}

const fn default_seed_scatter_radius() -> i32 {
    6
}

const fn default_max_trees() -> u32 {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_ticks() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}
