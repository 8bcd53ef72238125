//! Core value structs shared across the Canopy workspace.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::{BiomeTag, BlockKind, Direction};

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// An integer lattice coordinate.
///
/// Offsets saturate at the `i32` range instead of wrapping, so a position
/// at the edge of the coordinate space maps onto itself rather than onto
/// the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Create a position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Move `distance` steps in `dir`.
    pub const fn offset_by(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
            z: self.z.saturating_add(dz.saturating_mul(distance)),
        }
    }

    /// The adjacent position in `dir`.
    pub const fn offset(self, dir: Direction) -> Self {
        self.offset_by(dir, 1)
    }

    /// The position directly above.
    pub const fn up(self) -> Self {
        self.offset(Direction::Up)
    }

    /// The position directly below.
    pub const fn down(self) -> Self {
        self.offset(Direction::Down)
    }

    /// Add an arbitrary delta.
    pub const fn add(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// Chebyshev (chessboard) distance to another position.
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        let xy = if dx > dy { dx } else { dy };
        if xy > dz { xy } else { dz }
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// RegionId
// ---------------------------------------------------------------------------

/// A world partition (dimension) with its own season context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub i32);

impl RegionId {
    /// The surface dimension.
    pub const OVERWORLD: Self = Self(0);
}

impl core::fmt::Display for RegionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ResourceKey
// ---------------------------------------------------------------------------

/// Error returned when a string is not a valid `namespace:path` key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource key {input:?}: {reason}")]
pub struct KeyParseError {
    /// The rejected input.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

/// A namespaced identifier such as `canopy:oak`.
///
/// Keys without a namespace parse into the [`ResourceKey::DEFAULT_NAMESPACE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    namespace: String,
    path: String,
}

impl ResourceKey {
    /// Namespace applied to bare keys.
    pub const DEFAULT_NAMESPACE: &'static str = "canopy";

    /// The empty key carried by null-object sentinels.
    pub const EMPTY: Self = Self {
        namespace: String::new(),
        path: String::new(),
    };

    /// Create a key from its parts.
    pub fn new(namespace: &str, path: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            path: path.to_owned(),
        }
    }

    /// Whether this is the [`ResourceKey::EMPTY`] sentinel.
    pub const fn is_empty(&self) -> bool {
        self.namespace.is_empty() && self.path.is_empty()
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The path part.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// A sibling key in the same namespace with `prefix` prepended to the
    /// path (`canopy:oak` -> `canopy:swamp_oak`).
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            path: format!("{prefix}{}", self.path),
        }
    }
}

fn valid_key_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '/'))
}

impl FromStr for ResourceKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s.split_once(':').unwrap_or((Self::DEFAULT_NAMESPACE, s));
        if !valid_key_part(namespace) {
            return Err(KeyParseError {
                input: s.to_owned(),
                reason: "namespace must be non-empty [a-z0-9_.-/]",
            });
        }
        if !valid_key_part(path) {
            return Err(KeyParseError {
                input: s.to_owned(),
                reason: "path must be non-empty [a-z0-9_.-/]",
            });
        }
        Ok(Self::new(namespace, path))
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.to_string()
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

// ---------------------------------------------------------------------------
// BlockState
// ---------------------------------------------------------------------------

/// The state of one world block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// The block kind.
    pub kind: BlockKind,
    /// Branch radius for [`BlockKind::Branch`], soil life for
    /// [`BlockKind::RootySoil`], zero otherwise.
    pub data: u8,
}

impl BlockState {
    /// Empty space.
    pub const AIR: Self = Self::of(BlockKind::Air);

    /// A plain block of the given kind.
    pub const fn of(kind: BlockKind) -> Self {
        Self { kind, data: 0 }
    }

    /// A branch block with the given radius.
    pub const fn branch(radius: u8) -> Self {
        Self {
            kind: BlockKind::Branch,
            data: radius,
        }
    }

    /// A rooty soil block holding `soil_life`.
    pub const fn rooty_soil(soil_life: u8) -> Self {
        Self {
            kind: BlockKind::RootySoil,
            data: soil_life,
        }
    }

    /// Whether this block is empty space.
    pub const fn is_air(self) -> bool {
        matches!(self.kind, BlockKind::Air)
    }

    /// Whether this block is a tree's root soil.
    pub const fn is_rooty(self) -> bool {
        matches!(self.kind, BlockKind::RootySoil)
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::AIR
    }
}

// ---------------------------------------------------------------------------
// ItemStack
// ---------------------------------------------------------------------------

/// A quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item identifier.
    pub item: ResourceKey,
    /// How many.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack.
    pub const fn new(item: ResourceKey, count: u32) -> Self {
        Self { item, count }
    }
}

// ---------------------------------------------------------------------------
// Biome
// ---------------------------------------------------------------------------

/// Climate data for a column of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    /// Biome identifier.
    pub key: ResourceKey,
    /// Default temperature; values above 0.8 are considered tropical.
    pub temperature: f32,
    /// Classification tags.
    #[serde(default)]
    pub tags: BTreeSet<BiomeTag>,
}

impl Biome {
    /// Create a biome.
    pub fn new(key: ResourceKey, temperature: f32, tags: &[BiomeTag]) -> Self {
        Self {
            key,
            temperature,
            tags: tags.iter().copied().collect(),
        }
    }

    /// A temperate overworld forest.
    pub fn forest() -> Self {
        Self::new(
            ResourceKey::new("minecraft", "forest"),
            0.7,
            &[BiomeTag::Forest, BiomeTag::Overworld],
        )
    }

    /// Open plains.
    pub fn plains() -> Self {
        Self::new(
            ResourceKey::new("minecraft", "plains"),
            0.8,
            &[BiomeTag::Plains, BiomeTag::Overworld],
        )
    }

    /// A warm swamp.
    pub fn swamp() -> Self {
        Self::new(
            ResourceKey::new("minecraft", "swamp"),
            0.8,
            &[BiomeTag::Swamp, BiomeTag::Wet, BiomeTag::Overworld],
        )
    }

    /// A snowy conifer forest.
    pub fn taiga() -> Self {
        Self::new(
            ResourceKey::new("minecraft", "taiga"),
            0.25,
            &[
                BiomeTag::Cold,
                BiomeTag::Forest,
                BiomeTag::Coniferous,
                BiomeTag::Overworld,
            ],
        )
    }

    /// A hot rainforest.
    pub fn jungle() -> Self {
        Self::new(
            ResourceKey::new("minecraft", "jungle"),
            0.95,
            &[
                BiomeTag::Hot,
                BiomeTag::Wet,
                BiomeTag::Jungle,
                BiomeTag::Forest,
                BiomeTag::Overworld,
            ],
        )
    }

    /// Whether the biome carries `tag`.
    pub fn has_tag(&self, tag: BiomeTag) -> bool {
        self.tags.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_one_step() {
        let pos = BlockPos::new(1, 2, 3);
        assert_eq!(pos.up(), BlockPos::new(1, 3, 3));
        assert_eq!(pos.down(), BlockPos::new(1, 1, 3));
        assert_eq!(pos.offset(Direction::East), BlockPos::new(2, 2, 3));
        assert_eq!(pos.offset_by(Direction::North, 3), BlockPos::new(1, 2, 0));
    }

    #[test]
    fn offset_saturates_at_edge() {
        let edge = BlockPos::new(i32::MAX, 0, 0);
        assert_eq!(edge.offset(Direction::East), edge);
    }

    #[test]
    fn chebyshev_distance_is_max_axis() {
        let a = BlockPos::new(0, 0, 0);
        assert_eq!(a.chebyshev_distance(BlockPos::new(2, -1, 1)), 2);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn key_parse_defaults_namespace() {
        let key: Result<ResourceKey, _> = "oak".parse();
        assert_eq!(key, Ok(ResourceKey::new("canopy", "oak")));
    }

    #[test]
    fn key_parse_rejects_garbage() {
        assert!("Oak Tree".parse::<ResourceKey>().is_err());
        assert!(":oak".parse::<ResourceKey>().is_err());
        assert!("canopy:".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn key_with_prefix() {
        let oak = ResourceKey::new("canopy", "oak");
        assert_eq!(oak.with_prefix("swamp_").to_string(), "canopy:swamp_oak");
    }

    #[test]
    fn block_state_helpers() {
        assert!(BlockState::AIR.is_air());
        assert!(BlockState::rooty_soil(15).is_rooty());
        assert_eq!(BlockState::branch(3).data, 3);
    }
}
