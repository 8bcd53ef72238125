//! Growth cells: the per-position light/shade units of the lattice.
//!
//! Every occupied lattice position holds a [`LatticeCell`] caching its light
//! value and the value it exposes on each face. Lookups that land on empty
//! space or outside the lattice get the shared [`NULL_CELL`] instead, so
//! callers never branch on a missing cell.

use canopy_types::{Direction, ResourceKey};
use serde::{Deserialize, Serialize};

/// Full daylight.
pub const MAX_LIGHT: u8 = 15;

/// Largest shade a single branch neighbor can cast.
const MAX_BRANCH_SHADE: u8 = 4;

/// A lattice unit answering light queries.
pub trait Cell {
    /// Light value of the cell in `0..=15`.
    fn value(&self) -> u8;

    /// Value the cell exposes to its neighbor on `side`.
    fn value_from_side(&self, side: Direction) -> u8;
}

// ---------------------------------------------------------------------------
// Null cell
// ---------------------------------------------------------------------------

/// Cell that always returns 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullCell;

/// The shared null cell returned for empty or out-of-range lookups.
pub static NULL_CELL: NullCell = NullCell;

impl Cell for NullCell {
    fn value(&self) -> u8 {
        0
    }

    fn value_from_side(&self, _side: Direction) -> u8 {
        0
    }
}

// ---------------------------------------------------------------------------
// Cell kits
// ---------------------------------------------------------------------------

/// Leaf cell behavior shared by every leaves block of a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKit {
    /// Broad leaves: moderate shade, light exposed on every face.
    #[default]
    Deciduous,
    /// Needles: dense shade, full light only along the vertical axis.
    Conifer,
    /// No foliage behavior at all.
    Null,
}

impl CellKit {
    /// Shade a leaf of this kit casts onto a neighbor. Leaves directly
    /// above the neighbor cast one extra level.
    pub const fn shade(self, from_above: bool) -> u8 {
        let base = match self {
            Self::Deciduous => 2,
            Self::Conifer => 3,
            Self::Null => return 0,
        };
        if from_above { base + 1 } else { base }
    }

    /// Value a leaf of this kit with `light` exposes on `side`.
    pub const fn leaf_value_from_side(self, light: u8, side: Direction) -> u8 {
        match self {
            Self::Deciduous => light,
            Self::Conifer => match side {
                Direction::Up | Direction::Down => light,
                _ => light / 2,
            },
            Self::Null => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// What fills a lattice position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Occupancy {
    /// Nothing; the position is not stored.
    #[default]
    Empty,
    /// Foliage of a tree family.
    Leaf {
        /// Owning family.
        family: ResourceKey,
        /// Foliage behavior.
        kit: CellKit,
    },
    /// A branch segment of a tree family.
    Branch {
        /// Owning family.
        family: ResourceKey,
        /// Branch thickness, `1..=24`.
        radius: u8,
    },
}

impl Occupancy {
    /// Whether the position is empty.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Owning family, if occupied.
    pub const fn family(&self) -> Option<&ResourceKey> {
        match self {
            Self::Empty => None,
            Self::Leaf { family, .. } | Self::Branch { family, .. } => Some(family),
        }
    }

    /// Branch radius, or 0 for anything that is not a branch.
    pub const fn radius(&self) -> u8 {
        match self {
            Self::Branch { radius, .. } => *radius,
            _ => 0,
        }
    }

    /// Shade this occupancy casts onto a neighbor. `from_above` is true when
    /// this occupancy sits directly above the neighbor.
    pub fn shade_onto_neighbor(&self, from_above: bool) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Leaf { kit, .. } => kit.shade(from_above),
            Self::Branch { radius, .. } => (*radius).min(MAX_BRANCH_SHADE),
        }
    }
}

// ---------------------------------------------------------------------------
// Lattice cell
// ---------------------------------------------------------------------------

/// An occupied lattice position with its cached light and face values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeCell {
    pub(crate) occupancy: Occupancy,
    pub(crate) light: u8,
    pub(crate) faces: [u8; 6],
}

impl LatticeCell {
    /// What occupies this cell.
    pub const fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Number of faces exposing a non-zero value (structural connections for
    /// branches, lit faces for leaves).
    pub fn connection_count(&self) -> u8 {
        let mut count: u8 = 0;
        for value in self.faces {
            if value > 0 {
                count = count.saturating_add(1);
            }
        }
        count
    }
}

impl Cell for LatticeCell {
    fn value(&self) -> u8 {
        self.light
    }

    fn value_from_side(&self, side: Direction) -> u8 {
        self.faces.get(side.index()).copied().unwrap_or(0)
    }
}
