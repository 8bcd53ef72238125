//! Shared type definitions for the Canopy tree growth simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the lattice, the world store, and the simulation core.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for growth node identifiers
//! - [`enums`] -- Enumeration types (directions, biome tags, blocks, drops)
//! - [`structs`] -- Core value structs (positions, keys, block states, items)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BiomeTag, BlockKind, ClimateZone, Direction, DropTrigger, LightType, Season};
pub use ids::NodeId;
pub use structs::{Biome, BlockPos, BlockState, ItemStack, KeyParseError, RegionId, ResourceKey};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    //! Serialization checks for the types that appear in config files.

    use super::*;

    #[test]
    fn resource_key_serializes_as_string() {
        let key = ResourceKey::new("canopy", "oak");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"canopy:oak\"");
        let back: ResourceKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn biome_tag_uses_snake_case() {
        let json = serde_json::to_string(&BiomeTag::Coniferous).unwrap();
        assert_eq!(json, "\"coniferous\"");
    }

    #[test]
    fn node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn node_ids_serialize_as_uuid_strings() {
        let first = NodeId::new();
        let json = serde_json::to_string(&first).unwrap();
        assert_eq!(json, format!("\"{first}\""));
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, first);
    }
}
