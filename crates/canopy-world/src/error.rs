//! Error types for the `canopy-world` crate.

use canopy_types::BlockPos;

/// Errors that can occur while constructing lattices and world stores.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The minimum corner of a bounding box lies above its maximum corner.
    #[error("invalid bounds: min {min} is not below max {max}")]
    InvalidBounds {
        /// Requested minimum corner.
        min: BlockPos,
        /// Requested maximum corner.
        max: BlockPos,
    },

    /// A position lies outside the world's vertical build limits.
    #[error("position {0} is outside the build height")]
    OutOfBuildHeight(BlockPos),
}
