//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run itself.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: canopy_core::ConfigError,
    },

    /// Terrain construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: canopy_world::WorldError,
    },

    /// Simulation state construction failed.
    #[error("state error: {source}")]
    State {
        /// The underlying tick error.
        #[from]
        source: canopy_core::TickError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: canopy_core::RunnerError,
    },

    /// The final report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// No species is registered, so nothing can be planted.
    #[error("no species registered")]
    NoSpecies,
}
