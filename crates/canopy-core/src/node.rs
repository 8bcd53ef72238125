//! Growth nodes: one rooted tree each.
//!
//! A node owns a straight trunk standing on rooty soil and the leaves it
//! placed around the trunk top. Every block it owns is mirrored in both the
//! world and the growth lattice, so light queries see the tree as soon as it
//! changes.
//!
//! # Canopy shape
//!
//! Around the trunk top the canopy fills a 5x5 square (Chebyshev radius 2) on
//! the top layer and the layer below, plus a single bud leaf directly above
//! the top. Leaves
//! are only placed into positions that are empty in both the lattice and the
//! world, and never below the lowest branch height. Leaves buried under more
//! than `smother_leaves_max` leaves of their own tree are dropped.

use std::collections::BTreeSet;
use std::sync::Arc;

use canopy_types::{BlockKind, BlockPos, BlockState, LightType, NodeId};
use canopy_world::{CellGrid, Occupancy, WorldAccess, flags};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::rot::{self, RotInput, RotOutcome};
use crate::species::{FeatureToggles, Species, growth_factor_at};

/// Soil life of fully fertile rooty soil.
pub const MAX_SOIL_LIFE: u8 = 15;

/// Errors raised when planting a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlantError {
    /// The block at the root position is not soil the species accepts.
    #[error("{kind:?} at {pos} is not acceptable soil")]
    UnacceptableSoil {
        /// Root position.
        pos: BlockPos,
        /// Block found there.
        kind: BlockKind,
    },

    /// The position above the soil is occupied.
    #[error("position {0} above the soil is obstructed")]
    Obstructed(BlockPos),

    /// The trunk would lie outside the growth lattice.
    #[error("position {0} is outside the growth lattice")]
    OutOfLattice(BlockPos),

    /// The simulation already holds its maximum number of trees.
    #[error("tree limit of {0} reached")]
    AtCapacity(u32),
}

/// Planting parameters.
#[derive(Debug, Clone, Copy)]
pub struct PlantOptions {
    /// Soil life of the new rooty soil.
    pub soil_life: u8,
    /// Tick of planting.
    pub tick: u64,
    /// Apply world generation soil overrides.
    pub worldgen: bool,
    /// Active feature toggles.
    pub toggles: FeatureToggles,
}

/// Why a growth attempt did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StallReason {
    /// The node is dead.
    Dead,
    /// The soil is exhausted.
    NoSoilLife,
    /// The trunk reached the species' signal energy.
    MaxHeight,
    /// The growth roll failed.
    RollFailed,
    /// The bud above the top is too dark.
    Shaded,
    /// Something else occupies the space above the top.
    Blocked,
}

/// Result of one growth attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// The tree grew.
    Grew {
        /// Trunk height after growing.
        height: u32,
        /// Whether the trunk got longer; otherwise only the canopy filled in.
        extended: bool,
    },
    /// Nothing happened.
    Stalled(StallReason),
}

/// Result of one rot pass over a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotReport {
    /// Segments removed.
    pub segments_lost: u32,
    /// Segments that turned into mushrooms.
    pub mushrooms: u32,
    /// The whole trunk is gone.
    pub died: bool,
}

/// Wood and foliage removed by felling a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FellReport {
    /// Wood volume in blocks.
    pub volume: f32,
    /// Trunk segments removed.
    pub segments: u32,
    /// Leaves removed.
    pub leaves: u32,
}

/// Serializable view of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    /// Node id.
    pub id: NodeId,
    /// Species key.
    pub species: String,
    /// Rooty soil position.
    pub root: BlockPos,
    /// Trunk height.
    pub height: u32,
    /// Remaining soil life.
    pub soil_life: u8,
    /// Leaves owned.
    pub leaves: usize,
    /// Tick of planting.
    pub planted_at: u64,
}

/// One rooted tree.
#[derive(Debug, Clone)]
pub struct GrowthNode {
    id: NodeId,
    species: Arc<Species>,
    root: BlockPos,
    height: u32,
    soil_life: u8,
    growth_points: u32,
    alive: bool,
    planted_at: u64,
    leaves: BTreeSet<BlockPos>,
}

impl GrowthNode {
    /// Plant a sapling of `species` with its rooty soil at `root`.
    ///
    /// # Errors
    ///
    /// Returns a [`PlantError`] if the soil is unacceptable or the trunk
    /// position is blocked or outside the lattice. Nothing is written then.
    pub fn plant(
        species: Arc<Species>,
        root: BlockPos,
        world: &mut dyn WorldAccess,
        grid: &mut CellGrid,
        options: &PlantOptions,
    ) -> Result<Self, PlantError> {
        let soil = world.block_state(root);
        let acceptable = if options.worldgen {
            species.is_acceptable_soil_for_worldgen(world, root, soil, &options.toggles)
        } else {
            species.is_acceptable_soil(world, root, soil)
        };
        if !acceptable || soil.is_rooty() {
            return Err(PlantError::UnacceptableSoil {
                pos: root,
                kind: soil.kind,
            });
        }
        let trunk = root.up();
        if !grid.bounds().contains(trunk) {
            return Err(PlantError::OutOfLattice(trunk));
        }
        if !world.block_state(trunk).is_air() || !grid.occupancy(trunk).is_empty() {
            return Err(PlantError::Obstructed(trunk));
        }

        let soil_life = options.soil_life.min(MAX_SOIL_LIFE);
        world.set_block_state(root, BlockState::rooty_soil(soil_life), flags::DEFAULT);
        let mut node = Self {
            id: NodeId::new(),
            species,
            root,
            height: 1,
            soil_life,
            growth_points: 0,
            alive: true,
            planted_at: options.tick,
            leaves: BTreeSet::new(),
        };
        node.set_segment(grid, world, trunk, 1);
        node.refresh_canopy(grid, world);
        debug!(node = %node.id, species = %node.species.key(), %root, "tree planted");
        Ok(node)
    }

    /// Node id.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Species of the tree.
    pub const fn species(&self) -> &Arc<Species> {
        &self.species
    }

    /// Rooty soil position.
    pub const fn root(&self) -> BlockPos {
        self.root
    }

    /// Trunk height in segments.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Topmost trunk segment.
    pub fn top(&self) -> BlockPos {
        self.segment(self.height)
    }

    /// Remaining soil life.
    pub const fn soil_life(&self) -> u8 {
        self.soil_life
    }

    /// Whether the tree still stands.
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Leaves currently owned.
    pub const fn leaves(&self) -> &BTreeSet<BlockPos> {
        &self.leaves
    }

    /// Whether this tree owns the leaf at `pos`.
    pub fn owns_leaf(&self, pos: BlockPos) -> bool {
        self.leaves.contains(&pos)
    }

    /// Serializable view.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            species: self.species.key().to_string(),
            root: self.root,
            height: self.height,
            soil_life: self.soil_life,
            leaves: self.leaves.len(),
            planted_at: self.planted_at,
        }
    }

    fn segment(&self, index: u32) -> BlockPos {
        let dy = i32::try_from(index).unwrap_or(i32::MAX);
        self.root.add(0, dy, 0)
    }

    fn max_height(&self) -> u32 {
        let energy = self.species.growth().signal_energy.floor();
        if energy >= 1.0 {
            // Saturating float-to-int cast.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let height = energy as u32;
            height
        } else {
            1
        }
    }

    /// Radius of trunk segment `index` (1-based) for the current height.
    pub fn tapered_radius(&self, index: u32) -> u8 {
        let from_top = self.height.saturating_sub(index);
        #[allow(clippy::cast_precision_loss)]
        let extra = (from_top as f32 * self.species.growth().tapering).floor();
        let max = self.species.family().max_radius();
        if !extra.is_finite() || extra >= f32::from(max) {
            return max;
        }
        // Bounded by `max` above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let extra = extra.max(0.0) as u8;
        extra.saturating_add(1).min(max)
    }

    /// Wood volume of the trunk in blocks: `Σ radius² / 64`.
    pub fn volume(&self, grid: &CellGrid) -> f32 {
        (1..=self.height)
            .map(|i| f32::from(grid.occupancy(self.segment(i)).radius()))
            .map(|r| r * r / 64.0)
            .sum()
    }

    // ---- Growth ----

    /// Attempt one growth step.
    ///
    /// `season_factor` multiplies the species' biome growth factor. On
    /// success the trunk is extended (weighted by the species' up
    /// probability) or the canopy filled in, radii are re-tapered, and soil
    /// life is consumed every `soil_longevity` growths.
    pub fn grow<R: Rng + ?Sized>(
        &mut self,
        grid: &mut CellGrid,
        world: &mut dyn WorldAccess,
        season_factor: f32,
        rng: &mut R,
    ) -> GrowthOutcome {
        if !self.alive {
            return GrowthOutcome::Stalled(StallReason::Dead);
        }
        if self.soil_life == 0 {
            return GrowthOutcome::Stalled(StallReason::NoSoilLife);
        }
        if self.height >= self.max_height() {
            return GrowthOutcome::Stalled(StallReason::MaxHeight);
        }
        let factor = growth_factor_at(&self.species, world, self.root) * season_factor;
        if rng.random::<f32>() >= factor {
            return GrowthOutcome::Stalled(StallReason::RollFailed);
        }

        let bud = self.top().up();
        let light = match bud_light(grid, world, bud, &self.species) {
            Ok(light) => light,
            Err(reason) => return GrowthOutcome::Stalled(reason),
        };
        if light < self.species.leaves().light_requirement() {
            trace!(node = %self.id, light, "bud too dark to grow");
            return GrowthOutcome::Stalled(StallReason::Shaded);
        }

        let up = self.species.growth().up_probability;
        let extended = rng.random_range(0..=up) != 0;
        if extended {
            self.leaves.remove(&bud);
            self.height = self.height.saturating_add(1);
            self.set_segment(grid, world, bud, 1);
            self.retaper(grid, world);
        }
        self.refresh_canopy(grid, world);
        self.consume_soil(world);
        GrowthOutcome::Grew {
            height: self.height,
            extended,
        }
    }

    fn set_segment(&self, grid: &mut CellGrid, world: &mut dyn WorldAccess, pos: BlockPos, radius: u8) {
        grid.set_occupancy(
            pos,
            Occupancy::Branch {
                family: self.species.family().key.clone(),
                radius,
            },
        );
        world.set_block_state(pos, BlockState::branch(radius), flags::DEFAULT);
    }

    fn retaper(&self, grid: &mut CellGrid, world: &mut dyn WorldAccess) {
        for index in 1..=self.height {
            let pos = self.segment(index);
            let radius = self.tapered_radius(index);
            if grid.occupancy(pos).radius() != radius {
                self.set_segment(grid, world, pos, radius);
            }
        }
    }

    fn consume_soil(&mut self, world: &mut dyn WorldAccess) {
        self.growth_points = self.growth_points.saturating_add(1);
        if self.growth_points >= self.species.growth().soil_longevity {
            self.growth_points = 0;
            self.soil_life = self.soil_life.saturating_sub(1);
            world.set_block_state(self.root, BlockState::rooty_soil(self.soil_life), flags::DEFAULT);
            debug!(node = %self.id, soil_life = self.soil_life, "soil life consumed");
        }
    }

    // ---- Canopy ----

    /// Place missing canopy leaves and drop invalid or smothered ones.
    /// Returns the number of leaves placed.
    pub fn refresh_canopy(&mut self, grid: &mut CellGrid, world: &mut dyn WorldAccess) -> u32 {
        let family = self.species.family().key.clone();
        self.leaves.retain(|pos| {
            matches!(grid.occupancy(*pos), Occupancy::Leaf { family: f, .. } if *f == family)
                && world.block_state(*pos).kind == BlockKind::Leaves
        });

        let floor = self
            .root
            .y
            .saturating_add(i32::try_from(self.height.min(self.species.growth().lowest_branch_height)).unwrap_or(0));
        let low: Vec<BlockPos> = self.leaves.iter().copied().filter(|pos| pos.y < floor).collect();
        for pos in low {
            self.remove_leaf(grid, world, pos);
        }

        let mut placed: u32 = 0;
        let leaves = self.species.leaves();
        let occupancy = leaves.leaf_occupancy();
        let block = leaves.primitive_leaves();
        for pos in canopy_shape(self.top()) {
            if pos.y < floor || !grid.bounds().contains(pos) {
                continue;
            }
            if !grid.occupancy(pos).is_empty() || !world.block_state(pos).is_air() {
                continue;
            }
            if grid.set_occupancy(pos, occupancy.clone()) {
                world.set_block_state(pos, block, flags::DEFAULT);
                self.leaves.insert(pos);
                placed = placed.saturating_add(1);
            }
        }
        self.smother(grid, world);
        placed
    }

    fn smother(&mut self, grid: &mut CellGrid, world: &mut dyn WorldAccess) {
        let max = u32::from(self.species.leaves().smother_leaves_max());
        let buried: Vec<BlockPos> = self
            .leaves
            .iter()
            .copied()
            .filter(|pos| {
                let mut depth: u32 = 0;
                let mut above = pos.up();
                while self.leaves.contains(&above) {
                    depth = depth.saturating_add(1);
                    above = above.up();
                }
                depth > max
            })
            .collect();
        for pos in buried {
            self.remove_leaf(grid, world, pos);
        }
    }

    /// Remove one of this tree's leaves. Returns `false` if the tree does
    /// not own a leaf at `pos`.
    pub fn remove_leaf(&mut self, grid: &mut CellGrid, world: &mut dyn WorldAccess, pos: BlockPos) -> bool {
        if !self.leaves.remove(&pos) {
            return false;
        }
        if matches!(grid.occupancy(pos), Occupancy::Leaf { .. }) {
            grid.set_occupancy(pos, Occupancy::Empty);
        }
        if world.block_state(pos).kind == BlockKind::Leaves {
            world.set_block_state(pos, BlockState::AIR, flags::DEFAULT);
        }
        true
    }

    fn clear_leaves(&mut self, grid: &mut CellGrid, world: &mut dyn WorldAccess) -> u32 {
        let all: Vec<BlockPos> = self.leaves.iter().copied().collect();
        let mut removed: u32 = 0;
        for pos in all {
            if self.remove_leaf(grid, world, pos) {
                removed = removed.saturating_add(1);
            }
        }
        removed
    }

    // ---- Rot ----

    /// Evaluate rot for every trunk segment.
    ///
    /// The lowest decayed segment brings down everything above it. A tree
    /// whose soil is gone or which has no leaves left rots rapidly.
    pub fn rot_step<R: Rng + ?Sized>(
        &mut self,
        grid: &mut CellGrid,
        world: &mut dyn WorldAccess,
        rng: &mut R,
    ) -> RotReport {
        let mut report = RotReport::default();
        if !self.alive {
            return report;
        }
        let rooted = world.block_state(self.root).is_rooty();
        let rapid = !rooted || self.leaves.is_empty();

        let mut lowest: Option<(u32, RotOutcome)> = None;
        for index in 1..=self.height {
            let pos = self.segment(index);
            let rooty_below = world.block_state(pos.down()).is_rooty();
            let input = RotInput {
                neighbor_count: grid
                    .connection_count(pos)
                    .saturating_add(u8::from(rooty_below)),
                radius: grid.occupancy(pos).radius(),
                sky_light: world.light_level(LightType::Sky, pos),
                rapid,
                rooty_below,
            };
            let outcome = rot::evaluate(&self.species, &input, rng);
            if outcome.is_decayed() {
                lowest = Some((index, outcome));
                break;
            }
        }
        let Some((index, outcome)) = lowest else {
            return report;
        };

        for above in (index..=self.height).rev() {
            let pos = self.segment(above);
            grid.set_occupancy(pos, Occupancy::Empty);
            let applied = if above == index {
                rot::apply(world, pos, &outcome)
            } else {
                rot::apply(world, pos, &RotOutcome::Decayed)
            };
            if applied {
                report.segments_lost = report.segments_lost.saturating_add(1);
            }
        }
        if matches!(outcome, RotOutcome::Transformed { .. }) {
            report.mushrooms = 1;
        }
        self.height = index.saturating_sub(1);
        self.clear_leaves(grid, world);

        if self.height == 0 {
            self.die(world);
            report.died = true;
        } else {
            self.retaper(grid, world);
            self.refresh_canopy(grid, world);
        }
        debug!(node = %self.id, lost = report.segments_lost, died = report.died, "trunk rotted");
        report
    }

    fn die(&mut self, world: &mut dyn WorldAccess) {
        self.alive = false;
        self.height = 0;
        if world.block_state(self.root).is_rooty() {
            world.set_block_state(self.root, BlockState::of(BlockKind::Dirt), flags::DEFAULT);
        }
    }

    // ---- Harvest ----

    /// Cut the whole tree down.
    pub fn fell(&mut self, grid: &mut CellGrid, world: &mut dyn WorldAccess) -> FellReport {
        let volume = self.volume(grid);
        let segments = self.height;
        for index in 1..=self.height {
            let pos = self.segment(index);
            grid.set_occupancy(pos, Occupancy::Empty);
            world.set_block_state(pos, BlockState::AIR, flags::DEFAULT);
        }
        let leaves = self.clear_leaves(grid, world);
        self.die(world);
        debug!(node = %self.id, volume, segments, leaves, "tree felled");
        FellReport {
            volume,
            segments,
            leaves,
        }
    }
}

/// Light of the bud position above a trunk top, or why growth is blocked.
fn bud_light(
    grid: &CellGrid,
    world: &dyn WorldAccess,
    bud: BlockPos,
    species: &Species,
) -> Result<u8, StallReason> {
    if !grid.bounds().contains(bud) {
        return Err(StallReason::Blocked);
    }
    match grid.occupancy(bud) {
        Occupancy::Leaf { family, .. } if *family == species.family().key => Ok(grid.value(bud)),
        Occupancy::Empty if world.block_state(bud).is_air() => {
            Ok(world.light_level(LightType::Sky, bud))
        }
        _ => Err(StallReason::Blocked),
    }
}

/// Leaf positions around a trunk top.
fn canopy_shape(top: BlockPos) -> impl Iterator<Item = BlockPos> {
    let layers = (-1..=0).flat_map(move |dy| {
        (-2_i32..=2).flat_map(move |dx| {
            (-2_i32..=2)
                .filter(move |&dz| dx != 0 || dz != 0)
                .map(move |dz| top.add(dx, dy, dz))
        })
    });
    layers.chain(std::iter::once(top.up()))
}
