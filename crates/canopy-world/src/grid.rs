//! The bounded sparse growth lattice.
//!
//! [`CellGrid`] stores only occupied positions. Light is derived purely from
//! the occupancy of the six immediate neighbors:
//!
//! ```text
//! light = 15 - sum(shade cast by each neighbor)      (saturating at 0)
//! ```
//!
//! Two mechanisms keep cached light consistent with occupancy:
//!
//! - [`CellGrid::set_occupancy`] recomputes the touched cell and its six
//!   neighbors immediately.
//! - [`CellGrid::propagate_shade`] recomputes every cell in a two-phase pass
//!   (compute all, then commit), reading occupancy only.
//!
//! Out-of-range and empty positions resolve to [`NULL_CELL`].

use std::collections::BTreeMap;

use canopy_types::{BlockPos, Direction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cells::{Cell, LatticeCell, MAX_LIGHT, NULL_CELL, Occupancy};
use crate::error::WorldError;
use crate::leaves::radius_for_connection;

/// Shared empty occupancy returned for unstored positions.
static EMPTY: Occupancy = Occupancy::Empty;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Inclusive axis-aligned box limiting the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    min: BlockPos,
    max: BlockPos,
}

impl GridBounds {
    /// Create bounds from two inclusive corners.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] if any component of `min`
    /// exceeds the matching component of `max`.
    pub const fn new(min: BlockPos, max: BlockPos) -> Result<Self, WorldError> {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(WorldError::InvalidBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Minimum corner.
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    /// Maximum corner.
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Whether `pos` lies inside the box.
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.min.x
            && pos.x <= self.max.x
            && pos.y >= self.min.y
            && pos.y <= self.max.y
            && pos.z >= self.min.z
            && pos.z <= self.max.z
    }
}

// ---------------------------------------------------------------------------
// Shade summary
// ---------------------------------------------------------------------------

/// Statistics from one full shade propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadeSummary {
    /// Cells recomputed.
    pub cells: usize,
    /// Leaf cells among them.
    pub leaf_cells: usize,
    /// Branch cells among them.
    pub branch_cells: usize,
    /// Cells left with zero light.
    pub dark_cells: usize,
    /// Sum of all light values.
    pub total_light: u64,
}

impl ShadeSummary {
    /// Mean light over all recomputed cells, or 0 for an empty lattice.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_light(&self) -> f32 {
        if self.cells == 0 {
            return 0.0;
        }
        self.total_light as f32 / self.cells as f32
    }
}

// ---------------------------------------------------------------------------
// CellGrid
// ---------------------------------------------------------------------------

/// A bounded sparse lattice of growth cells.
#[derive(Debug, Clone)]
pub struct CellGrid {
    bounds: GridBounds,
    cells: BTreeMap<BlockPos, LatticeCell>,
}

impl CellGrid {
    /// Create an empty lattice.
    pub const fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: BTreeMap::new(),
        }
    }

    /// The lattice bounds.
    pub const fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `pos`, or the null cell for empty and out-of-range
    /// positions.
    pub fn cell(&self, pos: BlockPos) -> &dyn Cell {
        match self.cells.get(&pos) {
            Some(cell) if self.bounds.contains(pos) => cell,
            _ => &NULL_CELL,
        }
    }

    /// Light value at `pos`.
    pub fn value(&self, pos: BlockPos) -> u8 {
        self.cell(pos).value()
    }

    /// Value exposed by the cell at `pos` on `side`.
    pub fn value_from_side(&self, pos: BlockPos, side: Direction) -> u8 {
        self.cell(pos).value_from_side(side)
    }

    /// What occupies `pos`.
    pub fn occupancy(&self, pos: BlockPos) -> &Occupancy {
        self.cells.get(&pos).map_or(&EMPTY, |cell| &cell.occupancy)
    }

    /// Number of faces of the cell at `pos` that expose a non-zero value.
    pub fn connection_count(&self, pos: BlockPos) -> u8 {
        self.cells.get(&pos).map_or(0, LatticeCell::connection_count)
    }

    /// Set what occupies `pos`, refreshing its light and that of its six
    /// neighbors.
    ///
    /// Returns `false` (and changes nothing) if `pos` is out of range.
    pub fn set_occupancy(&mut self, pos: BlockPos, occupancy: Occupancy) -> bool {
        if !self.bounds.contains(pos) {
            debug!(%pos, "ignoring occupancy write outside lattice bounds");
            return false;
        }

        if occupancy.is_empty() {
            self.cells.remove(&pos);
        } else {
            let cell = self.compute_cell(pos, occupancy);
            self.cells.insert(pos, cell);
        }

        for dir in Direction::ALL {
            self.refresh(pos.offset(dir));
        }
        true
    }

    /// Recompute light for every occupied cell from neighbor occupancy.
    ///
    /// All new values are computed before any is committed, so no cell
    /// observes another cell's light from the same pass.
    pub fn propagate_shade(&mut self) -> ShadeSummary {
        let recomputed: Vec<(BlockPos, LatticeCell)> = self
            .cells
            .iter()
            .map(|(&pos, cell)| (pos, self.compute_cell(pos, cell.occupancy.clone())))
            .collect();

        let mut summary = ShadeSummary::default();
        for (pos, cell) in recomputed {
            summary.cells = summary.cells.saturating_add(1);
            match cell.occupancy {
                Occupancy::Leaf { .. } => summary.leaf_cells = summary.leaf_cells.saturating_add(1),
                Occupancy::Branch { .. } => {
                    summary.branch_cells = summary.branch_cells.saturating_add(1);
                }
                Occupancy::Empty => {}
            }
            if cell.light == 0 {
                summary.dark_cells = summary.dark_cells.saturating_add(1);
            }
            summary.total_light = summary.total_light.saturating_add(u64::from(cell.light));
            self.cells.insert(pos, cell);
        }
        summary
    }

    /// Iterate occupied positions and their occupancy.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, &Occupancy)> {
        self.cells.iter().map(|(&pos, cell)| (pos, &cell.occupancy))
    }

    /// Remove every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Recompute a stored cell in place, if present.
    fn refresh(&mut self, pos: BlockPos) {
        let Some(occupancy) = self.cells.get(&pos).map(|cell| cell.occupancy.clone()) else {
            return;
        };
        let cell = self.compute_cell(pos, occupancy);
        self.cells.insert(pos, cell);
    }

    /// Derive a cell's light and face values from neighbor occupancy.
    fn compute_cell(&self, pos: BlockPos, occupancy: Occupancy) -> LatticeCell {
        let mut shade: u8 = 0;
        for dir in Direction::ALL {
            let neighbor = self.occupancy(pos.offset(dir));
            shade = shade.saturating_add(neighbor.shade_onto_neighbor(dir == Direction::Up));
        }
        let light = MAX_LIGHT.saturating_sub(shade);

        let mut faces = [0_u8; 6];
        for (slot, dir) in faces.iter_mut().zip(Direction::ALL) {
            *slot = self.face_value(pos, &occupancy, light, dir);
        }

        LatticeCell {
            occupancy,
            light,
            faces,
        }
    }

    /// Value a cell exposes on `side`.
    ///
    /// Branches expose their radius only to same-family branches, and to
    /// same-family leaves when they are twigs (radius 1).
    fn face_value(&self, pos: BlockPos, occupancy: &Occupancy, light: u8, side: Direction) -> u8 {
        match occupancy {
            Occupancy::Empty => 0,
            Occupancy::Leaf { kit, .. } => kit.leaf_value_from_side(light, side),
            Occupancy::Branch { family, radius } => match self.occupancy(pos.offset(side)) {
                Occupancy::Branch { family: other, .. } if other == family => *radius,
                Occupancy::Leaf { family: other, .. } => {
                    radius_for_connection(other, family, *radius)
                }
                Occupancy::Branch { .. } | Occupancy::Empty => 0,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_types::ResourceKey;

    use super::*;
    use crate::cells::CellKit;

    fn bounds() -> GridBounds {
        GridBounds::new(BlockPos::new(-8, 0, -8), BlockPos::new(8, 32, 8)).unwrap()
    }

    fn oak() -> ResourceKey {
        ResourceKey::new("canopy", "oak")
    }

    fn leaf(family: ResourceKey) -> Occupancy {
        Occupancy::Leaf {
            family,
            kit: CellKit::Deciduous,
        }
    }

    fn branch(family: ResourceKey, radius: u8) -> Occupancy {
        Occupancy::Branch { family, radius }
    }

    #[test]
    fn invalid_bounds_rejected() {
        let result = GridBounds::new(BlockPos::new(1, 0, 0), BlockPos::new(0, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_positions_are_null() {
        let mut grid = CellGrid::new(bounds());
        let outside = BlockPos::new(100, 5, 0);
        assert!(!grid.set_occupancy(outside, leaf(oak())));
        assert_eq!(grid.value(outside), 0);
        for side in Direction::ALL {
            assert_eq!(grid.value_from_side(outside, side), 0);
        }
        assert!(grid.is_empty());
    }

    #[test]
    fn empty_positions_are_null() {
        let grid = CellGrid::new(bounds());
        assert_eq!(grid.value(BlockPos::new(0, 4, 0)), 0);
        assert!(grid.occupancy(BlockPos::new(0, 4, 0)).is_empty());
    }

    #[test]
    fn lone_leaf_has_full_light() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        grid.set_occupancy(pos, leaf(oak()));
        assert_eq!(grid.value(pos), MAX_LIGHT);
    }

    #[test]
    fn leaf_above_casts_extra_shade() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        grid.set_occupancy(pos, leaf(oak()));
        grid.set_occupancy(pos.up(), leaf(oak()));
        // Above: deciduous 2 + 1.
        assert_eq!(grid.value(pos), 12);
        // The upper leaf only has a leaf below it: 2.
        assert_eq!(grid.value(pos.up()), 13);
    }

    #[test]
    fn neighbor_write_refreshes_light_immediately() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        grid.set_occupancy(pos, leaf(oak()));
        grid.set_occupancy(pos.offset(Direction::East), leaf(oak()));
        assert_eq!(grid.value(pos), 13);
        grid.set_occupancy(pos.offset(Direction::East), Occupancy::Empty);
        assert_eq!(grid.value(pos), MAX_LIGHT);
    }

    #[test]
    fn fully_enclosed_leaf_is_dark() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        grid.set_occupancy(pos, leaf(oak()));
        for dir in Direction::ALL {
            grid.set_occupancy(pos.offset(dir), branch(oak(), 8));
        }
        // 6 branches x 4 shade = 24, saturates.
        assert_eq!(grid.value(pos), 0);
    }

    #[test]
    fn branch_faces_respect_family_compatibility() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        let birch = ResourceKey::new("canopy", "birch");
        grid.set_occupancy(pos, branch(oak(), 1));
        grid.set_occupancy(pos.up(), leaf(oak()));
        grid.set_occupancy(pos.down(), branch(oak(), 2));
        grid.set_occupancy(pos.offset(Direction::East), leaf(birch.clone()));
        grid.set_occupancy(pos.offset(Direction::West), branch(birch, 1));

        assert_eq!(grid.value_from_side(pos, Direction::Up), 1);
        assert_eq!(grid.value_from_side(pos, Direction::Down), 1);
        assert_eq!(grid.value_from_side(pos, Direction::East), 0);
        assert_eq!(grid.value_from_side(pos, Direction::West), 0);
        assert_eq!(grid.value_from_side(pos, Direction::North), 0);
        assert_eq!(grid.connection_count(pos), 2);
    }

    #[test]
    fn thick_branch_does_not_connect_to_leaves() {
        let mut grid = CellGrid::new(bounds());
        let pos = BlockPos::new(0, 10, 0);
        grid.set_occupancy(pos, branch(oak(), 3));
        grid.set_occupancy(pos.up(), leaf(oak()));
        assert_eq!(grid.value_from_side(pos, Direction::Up), 0);
    }

    #[test]
    fn propagate_matches_incremental_updates() {
        let mut grid = CellGrid::new(bounds());
        for y in 1..6 {
            grid.set_occupancy(BlockPos::new(0, y, 0), branch(oak(), 2));
        }
        for dir in Direction::HORIZONTAL {
            grid.set_occupancy(BlockPos::new(0, 5, 0).offset(dir), leaf(oak()));
        }
        let before: Vec<(BlockPos, u8)> = grid
            .iter()
            .map(|(pos, _)| pos)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|pos| (pos, grid.value(pos)))
            .collect();

        let summary = grid.propagate_shade();
        assert_eq!(summary.cells, 9);
        assert_eq!(summary.leaf_cells, 4);
        assert_eq!(summary.branch_cells, 5);

        for (pos, light) in before {
            assert_eq!(grid.value(pos), light, "light diverged at {pos}");
        }
    }

    #[test]
    fn mean_light_of_empty_grid_is_zero() {
        let mut grid = CellGrid::new(bounds());
        let summary = grid.propagate_shade();
        assert_eq!(summary.cells, 0);
        assert!(summary.mean_light().abs() < f32::EPSILON);
    }
}
