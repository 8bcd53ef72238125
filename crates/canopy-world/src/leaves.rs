//! Per-family foliage data and tree family descriptors.
//!
//! Leaves can behave differently from one family to the next, so each family
//! owns a [`LeavesProperties`] value. Lookups that find no family get the
//! shared [`NULL_PROPERTIES`] / [`NULL_FAMILY`] sentinels, which describe
//! foliage that never grows, never burns, and needs full daylight.

use canopy_types::{BlockKind, BlockState, ResourceKey};
use serde::{Deserialize, Serialize};

use crate::cells::{CellKit, MAX_LIGHT, Occupancy};

/// Largest radius of an ordinary branch.
const MAX_RADIUS: u8 = 8;

/// Largest radius of a thick (multi-block trunk) branch.
const MAX_RADIUS_THICK: u8 = 24;

// ---------------------------------------------------------------------------
// TreeFamily
// ---------------------------------------------------------------------------

/// A tree family: the wood shared by all of its species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeFamily {
    /// Family identifier.
    pub key: ResourceKey,
    /// Whether trunks may grow past radius 8.
    #[serde(default)]
    pub thick: bool,
    /// Whether the wood and leaves resist fire.
    #[serde(default)]
    pub fire_proof: bool,
}

/// The family of nothing.
pub static NULL_FAMILY: TreeFamily = TreeFamily {
    key: ResourceKey::EMPTY,
    thick: false,
    fire_proof: false,
};

impl TreeFamily {
    /// Create an ordinary family.
    pub const fn new(key: ResourceKey) -> Self {
        Self {
            key,
            thick: false,
            fire_proof: false,
        }
    }

    /// Whether this is the null family.
    pub const fn is_null(&self) -> bool {
        self.key.is_empty()
    }

    /// Largest radius a branch of this family may reach.
    pub const fn max_radius(&self) -> u8 {
        if self.thick { MAX_RADIUS_THICK } else { MAX_RADIUS }
    }
}

// ---------------------------------------------------------------------------
// LeavesProperties
// ---------------------------------------------------------------------------

/// Foliage parameters for one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesProperties {
    primitive_leaves: BlockState,
    cell_kit: CellKit,
    family: ResourceKey,
    flammability: u8,
    fire_spread_speed: u8,
    smother_leaves_max: u8,
    light_requirement: u8,
}

/// Leaves of nothing: never grow, never burn, need full light.
pub static NULL_PROPERTIES: LeavesProperties = LeavesProperties {
    primitive_leaves: BlockState::AIR,
    cell_kit: CellKit::Null,
    family: ResourceKey::EMPTY,
    flammability: 0,
    fire_spread_speed: 0,
    smother_leaves_max: 0,
    light_requirement: MAX_LIGHT,
};

impl LeavesProperties {
    /// Ordinary leaves with the given cell kit, not yet bound to a family.
    pub const fn new(cell_kit: CellKit) -> Self {
        Self {
            primitive_leaves: BlockState::of(BlockKind::Leaves),
            cell_kit,
            family: ResourceKey::EMPTY,
            flammability: 60,
            fire_spread_speed: 30,
            smother_leaves_max: 4,
            light_requirement: 13,
        }
    }

    /// Bind these leaves to a family. Fire-proof families make their leaves
    /// non-flammable.
    #[must_use]
    pub fn with_family(mut self, family: &TreeFamily) -> Self {
        self.family = family.key.clone();
        if family.fire_proof {
            self.flammability = 0;
            self.fire_spread_speed = 0;
        }
        self
    }

    /// Override the light a leaf needs before the tree may grow into it.
    #[must_use]
    pub fn with_light_requirement(mut self, light: u8) -> Self {
        self.light_requirement = light.min(MAX_LIGHT);
        self
    }

    /// Whether these are the null properties.
    pub const fn is_null(&self) -> bool {
        matches!(self.cell_kit, CellKit::Null) && self.family.is_empty()
    }

    /// Block placed for these leaves.
    pub const fn primitive_leaves(&self) -> BlockState {
        self.primitive_leaves
    }

    /// Leaf cell behavior.
    pub const fn cell_kit(&self) -> CellKit {
        self.cell_kit
    }

    /// Owning family key.
    pub const fn family(&self) -> &ResourceKey {
        &self.family
    }

    /// Fire catch chance.
    pub const fn flammability(&self) -> u8 {
        self.flammability
    }

    /// Fire spread speed.
    pub const fn fire_spread_speed(&self) -> u8 {
        self.fire_spread_speed
    }

    /// Leaves stacked deeper than this under other leaves are smothered.
    pub const fn smother_leaves_max(&self) -> u8 {
        self.smother_leaves_max
    }

    /// Minimum cell light a new leaf position needs.
    pub const fn light_requirement(&self) -> u8 {
        self.light_requirement
    }

    /// Lattice occupancy for one of these leaves.
    pub fn leaf_occupancy(&self) -> Occupancy {
        Occupancy::Leaf {
            family: self.family.clone(),
            kit: self.cell_kit,
        }
    }
}

/// Radius a branch of `from_family` with `from_radius` sees when it looks at
/// a leaf of `leaf_family`: 1 for compatible twigs, 0 otherwise.
pub(crate) fn radius_for_connection(
    leaf_family: &ResourceKey,
    from_family: &ResourceKey,
    from_radius: u8,
) -> u8 {
    u8::from(from_radius == 1 && !leaf_family.is_empty() && from_family == leaf_family)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oak_family() -> TreeFamily {
        TreeFamily::new(ResourceKey::new("canopy", "oak"))
    }

    #[test]
    fn null_properties_are_inert() {
        assert!(NULL_PROPERTIES.is_null());
        assert_eq!(NULL_PROPERTIES.flammability(), 0);
        assert_eq!(NULL_PROPERTIES.smother_leaves_max(), 0);
        assert_eq!(NULL_PROPERTIES.light_requirement(), 15);
        assert!(NULL_PROPERTIES.primitive_leaves().is_air());
    }

    #[test]
    fn null_family_is_null() {
        assert!(NULL_FAMILY.is_null());
        assert_eq!(NULL_FAMILY.max_radius(), 8);
        assert!(!oak_family().is_null());
    }

    #[test]
    fn defaults_mimic_vanilla_leaves() {
        let leaves = LeavesProperties::new(CellKit::Deciduous).with_family(&oak_family());
        assert_eq!(leaves.flammability(), 60);
        assert_eq!(leaves.fire_spread_speed(), 30);
        assert_eq!(leaves.smother_leaves_max(), 4);
        assert_eq!(leaves.light_requirement(), 13);
    }

    #[test]
    fn fire_proof_family_zeroes_flammability() {
        let mut family = oak_family();
        family.fire_proof = true;
        let leaves = LeavesProperties::new(CellKit::Deciduous).with_family(&family);
        assert_eq!(leaves.flammability(), 0);
        assert_eq!(leaves.fire_spread_speed(), 0);
    }

    #[test]
    fn only_compatible_twigs_connect() {
        let family = oak_family();
        let leaves = LeavesProperties::new(CellKit::Deciduous).with_family(&family);
        assert_eq!(radius_for_connection(leaves.family(), &family.key, 1), 1);
        assert_eq!(radius_for_connection(leaves.family(), &family.key, 2), 0);
        let birch = ResourceKey::new("canopy", "birch");
        assert_eq!(radius_for_connection(leaves.family(), &birch, 1), 0);
        assert_eq!(radius_for_connection(NULL_PROPERTIES.family(), &ResourceKey::EMPTY, 1), 0);
    }

    #[test]
    fn thick_family_allows_wide_trunks() {
        let mut family = oak_family();
        family.thick = true;
        assert_eq!(family.max_radius(), 24);
    }
}
