//! Enumeration types for the Canopy simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lattice directions
// ---------------------------------------------------------------------------

/// One of the six faces of a lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative Y.
    Down,
    /// Positive Y.
    Up,
    /// Negative Z.
    North,
    /// Positive Z.
    South,
    /// Negative X.
    West,
    /// Positive X.
    East,
}

impl Direction {
    /// All six directions in index order.
    pub const ALL: [Self; 6] = [
        Self::Down,
        Self::Up,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    /// The four horizontal directions.
    pub const HORIZONTAL: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Return the direction pointing the opposite way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Unit offset `(dx, dy, dz)` of this direction.
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Stable index in `0..6`, matching [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Down => 0,
            Self::Up => 1,
            Self::North => 2,
            Self::South => 3,
            Self::West => 4,
            Self::East => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Biomes and climate
// ---------------------------------------------------------------------------

/// A classification tag attached to a biome.
///
/// Species environment factors are keyed by these tags. A biome usually
/// carries several (e.g. a taiga is `Cold`, `Forest`, `Coniferous`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiomeTag {
    /// Low temperature.
    Cold,
    /// High temperature.
    Hot,
    /// High rainfall.
    Wet,
    /// Low rainfall.
    Dry,
    /// Dense tree cover.
    Forest,
    /// Waterlogged lowland.
    Swamp,
    /// Open grassland.
    Plains,
    /// Tropical rainforest.
    Jungle,
    /// Needle-leaf forest.
    Coniferous,
    /// Sand-dominated terrain.
    Sandy,
    /// Persistent snow cover.
    Snowy,
    /// Surface dimension.
    Overworld,
}

/// Climate classification used to pick a season curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    /// Four distinct seasons.
    Temperate,
    /// Weak seasonal variation.
    Tropical,
}

/// Which light channel to sample from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightType {
    /// Light from the open sky.
    Sky,
    /// Light emitted by blocks.
    Block,
}

// ---------------------------------------------------------------------------
// Drops
// ---------------------------------------------------------------------------

/// The event that causes a drop rule to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTrigger {
    /// A tree is felled and its leaves harvested.
    Harvest,
    /// A living tree sheds items on its own.
    Voluntary,
    /// A single leaves block is broken.
    LeavesBreak,
    /// Branch logs are broken; drops scale with wood volume.
    LogsBreak,
}

impl DropTrigger {
    /// All triggers.
    pub const ALL: [Self; 4] = [
        Self::Harvest,
        Self::Voluntary,
        Self::LeavesBreak,
        Self::LogsBreak,
    ];
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// The kind of block stored at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Empty space.
    Air,
    /// Plain dirt.
    Dirt,
    /// Grass-covered dirt.
    Grass,
    /// Mossy forest-floor dirt left behind by rotted trunks.
    Podzol,
    /// Sand.
    Sand,
    /// Stone.
    Stone,
    /// Still water.
    Water,
    /// Soil occupied by a tree's root system.
    RootySoil,
    /// A tree branch or trunk segment.
    Branch,
    /// Tree foliage.
    Leaves,
    /// A freshly planted tree.
    Sapling,
    /// Red mushroom.
    RedMushroom,
    /// Brown mushroom.
    BrownMushroom,
    /// Hanging vine.
    Vine,
    /// Bee nest attached to a trunk.
    BeeNest,
    /// Fruit hanging from foliage.
    Fruit,
}

impl BlockKind {
    /// Whether light passes through this block unattenuated.
    pub const fn is_transparent(self) -> bool {
        matches!(
            self,
            Self::Air | Self::Sapling | Self::RedMushroom | Self::BrownMushroom | Self::Vine
        )
    }

    /// Sky light lost when passing through this block.
    pub const fn opacity(self) -> u8 {
        match self {
            Self::Air | Self::Sapling | Self::RedMushroom | Self::BrownMushroom | Self::Vine => 0,
            Self::Leaves | Self::Fruit => 1,
            Self::Water => 2,
            _ => 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A named quarter of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// Season value `[0, 1)`.
    Spring,
    /// Season value `[1, 2)`.
    Summer,
    /// Season value `[2, 3)`.
    Autumn,
    /// Season value `[3, 4)`.
    Winter,
}

impl Season {
    /// Map a continuous season value to a named season.
    ///
    /// The value is wrapped into `[0, 4)` first, so any finite input maps.
    /// Non-finite inputs map to [`Season::Spring`].
    pub fn from_value(value: f32) -> Self {
        if !value.is_finite() {
            return Self::Spring;
        }
        let wrapped = value.rem_euclid(4.0);
        if wrapped < 1.0 {
            Self::Spring
        } else if wrapped < 2.0 {
            Self::Summer
        } else if wrapped < 3.0 {
            Self::Autumn
        } else {
            Self::Winter
        }
    }
}
