//! Growth lattice, leaves data holders, and world access for the Canopy
//! simulation.
//!
//! This crate models the physical side of a tree: the sparse lattice of
//! growth cells that propagates shade, the per-family leaves data, and the
//! block store the simulation writes into.
//!
//! # Modules
//!
//! - [`access`] -- The [`WorldAccess`] trait and the in-memory
//!   [`InMemoryWorld`] block store with sky light attenuation.
//! - [`cells`] -- The [`Cell`] trait, the shared [`NULL_CELL`] sentinel,
//!   occupancy kinds, and cell kits.
//! - [`error`] -- Error types for lattice and world construction.
//! - [`grid`] -- [`CellGrid`], the bounded sparse lattice with local light
//!   refresh and full shade propagation passes.
//! - [`leaves`] -- [`LeavesProperties`] and [`TreeFamily`] data holders with
//!   their null-object sentinels.
//!
//! [`WorldAccess`]: access::WorldAccess
//! [`InMemoryWorld`]: access::InMemoryWorld
//! [`Cell`]: cells::Cell
//! [`NULL_CELL`]: cells::NULL_CELL
//! [`CellGrid`]: grid::CellGrid
//! [`LeavesProperties`]: leaves::LeavesProperties
//! [`TreeFamily`]: leaves::TreeFamily

pub mod access;
pub mod cells;
pub mod error;
pub mod grid;
pub mod leaves;

// Re-export primary types at crate root.
pub use access::{InMemoryWorld, WorldAccess, flags};
pub use cells::{Cell, CellKit, MAX_LIGHT, NULL_CELL, NullCell, Occupancy};
pub use error::WorldError;
pub use grid::{CellGrid, GridBounds, ShadeSummary};
pub use leaves::{LeavesProperties, NULL_FAMILY, NULL_PROPERTIES, TreeFamily};
