//! Season clock, species tables, growth tick, rot, and drops for the Canopy
//! tree growth simulation.
//!
//! # Modules
//!
//! - [`clock`] -- World clock with tick counter and season derivation.
//! - [`config`] -- Configuration loading from `canopy-config.yaml` into
//!   strongly-typed structs.
//! - [`curve`] -- Periodic interpolation curves over the season value.
//! - [`season`] -- Season providers, growth calculators, and the
//!   [`SeasonManager`] holding one lazily created context per region.
//! - [`species`] -- Species definitions, validation, and the
//!   [`SpeciesRegistry`].
//! - [`features`] -- Decorative generation features (bee nests, vines,
//!   fruit).
//! - [`rot`] -- Decay of unsupported branch segments.
//! - [`drops`] -- Drop rules, the [`DropTable`], and the voluntary drop veto.
//! - [`node`] -- Growth nodes: planting, growth steps, rot, felling.
//! - [`tick`] -- The per-tick simulation cycle.
//! - [`runner`] -- The async loop driving ticks until a bound is hit.
//!
//! [`SeasonManager`]: season::SeasonManager
//! [`SpeciesRegistry`]: species::SpeciesRegistry
//! [`DropTable`]: drops::DropTable

pub mod clock;
pub mod config;
pub mod curve;
pub mod drops;
pub mod features;
pub mod node;
pub mod rot;
pub mod runner;
pub mod season;
pub mod species;
pub mod tick;

pub use clock::{ClockError, WorldClock};
pub use config::{ConfigError, SimulationConfig};
pub use drops::{AcceptAll, DropDecision, DropTable, DropVeto, VoluntaryDropEvent};
pub use node::{GrowthNode, PlantError};
pub use runner::{RunBounds, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use season::SeasonManager;
pub use species::{RegistryError, Species, SpeciesRegistry};
pub use tick::{SimulationState, TickError, TickSummary, run_tick};
