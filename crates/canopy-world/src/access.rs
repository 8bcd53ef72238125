//! Read/write access to the block world the simulation grows trees in.
//!
//! The simulation core never owns the world. It sees it through
//! [`WorldAccess`], which mirrors the handful of accessors a voxel host
//! exposes: block get/set, light sampling, and biome lookup.
//! [`InMemoryWorld`] is a self-contained implementation used by the engine
//! binary and by tests.
//!
//! # Sky light
//!
//! Sky light at a position starts at 15 and loses each block's
//! [`opacity`](canopy_types::BlockKind::opacity) for every block stored in
//! the same column above it, up to the build limit.

use std::collections::BTreeMap;

use canopy_types::{Biome, BlockKind, BlockPos, BlockState, LightType, RegionId};
use tracing::trace;

use crate::cells::MAX_LIGHT;
use crate::error::WorldError;

/// Block update flags passed to [`WorldAccess::set_block_state`].
pub mod flags {
    /// Notify neighboring blocks of the change.
    pub const NOTIFY_NEIGHBORS: u8 = 1;
    /// Propagate the change to observers.
    pub const SEND_TO_CLIENTS: u8 = 2;
    /// Both of the above.
    pub const DEFAULT: u8 = NOTIFY_NEIGHBORS | SEND_TO_CLIENTS;
}

/// Accessors over an external, mutable block world.
pub trait WorldAccess {
    /// The region (dimension) this world belongs to.
    fn region(&self) -> RegionId;

    /// Block at `pos`. Unset positions are air.
    fn block_state(&self, pos: BlockPos) -> BlockState;

    /// Replace the block at `pos`. Returns `false` if the write was refused
    /// (e.g. outside the build height) or changed nothing.
    fn set_block_state(&mut self, pos: BlockPos, state: BlockState, flags: u8) -> bool;

    /// Light of the given channel at `pos`, `0..=15`.
    fn light_level(&self, light: LightType, pos: BlockPos) -> u8;

    /// Biome of the column containing `pos`.
    fn biome(&self, pos: BlockPos) -> &Biome;
}

/// A sparse in-memory block world.
#[derive(Debug, Clone)]
pub struct InMemoryWorld {
    region: RegionId,
    min_y: i32,
    max_y: i32,
    blocks: BTreeMap<BlockPos, BlockState>,
    biomes: BTreeMap<(i32, i32), Biome>,
    default_biome: Biome,
    block_updates: u64,
}

impl InMemoryWorld {
    /// Create an empty world spanning `min_y..=max_y`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] if `min_y > max_y`.
    pub fn new(
        region: RegionId,
        min_y: i32,
        max_y: i32,
        default_biome: Biome,
    ) -> Result<Self, WorldError> {
        if min_y > max_y {
            return Err(WorldError::InvalidBounds {
                min: BlockPos::new(0, min_y, 0),
                max: BlockPos::new(0, max_y, 0),
            });
        }
        Ok(Self {
            region,
            min_y,
            max_y,
            blocks: BTreeMap::new(),
            biomes: BTreeMap::new(),
            default_biome,
            block_updates: 0,
        })
    }

    /// Lowest buildable layer.
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Highest buildable layer.
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Number of accepted block writes so far.
    pub const fn block_updates(&self) -> u64 {
        self.block_updates
    }

    /// Number of non-air blocks stored.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Assign `biome` to the column at `(x, z)`.
    pub fn set_biome(&mut self, x: i32, z: i32, biome: Biome) {
        self.biomes.insert((x, z), biome);
    }

    /// Assign `biome` to every column in the inclusive rectangle.
    pub fn set_biome_area(&mut self, (x0, z0): (i32, i32), (x1, z1): (i32, i32), biome: &Biome) {
        for x in x0..=x1 {
            for z in z0..=z1 {
                self.biomes.insert((x, z), biome.clone());
            }
        }
    }

    /// Fill the inclusive rectangle on layer `y` with `state`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBuildHeight`] if `y` is outside the build
    /// limits.
    pub fn fill_layer(
        &mut self,
        y: i32,
        (x0, z0): (i32, i32),
        (x1, z1): (i32, i32),
        state: BlockState,
    ) -> Result<(), WorldError> {
        if y < self.min_y || y > self.max_y {
            return Err(WorldError::OutOfBuildHeight(BlockPos::new(x0, y, z0)));
        }
        for x in x0..=x1 {
            for z in z0..=z1 {
                self.set_block_state(BlockPos::new(x, y, z), state, 0);
            }
        }
        Ok(())
    }

    /// Highest non-air, non-transparent block in the column, if any.
    pub fn surface_at(&self, x: i32, z: i32) -> Option<BlockPos> {
        self.blocks
            .range(BlockPos::new(x, self.min_y, i32::MIN)..=BlockPos::new(x, self.max_y, i32::MAX))
            .filter(|(pos, state)| pos.z == z && !state.kind.is_transparent())
            .map(|(pos, _)| *pos)
            .max_by_key(|pos| pos.y)
    }

    /// Count stored blocks of `kind`.
    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.blocks.values().filter(|state| state.kind == kind).count()
    }

    fn sky_light(&self, pos: BlockPos) -> u8 {
        let Some(above) = pos.y.checked_add(1) else {
            return MAX_LIGHT;
        };
        if above > self.max_y {
            return MAX_LIGHT;
        }
        let mut light = MAX_LIGHT;
        let column = self
            .blocks
            .range(BlockPos::new(pos.x, above, i32::MIN)..=BlockPos::new(pos.x, self.max_y, i32::MAX))
            .filter(|(p, _)| p.z == pos.z);
        for (_, state) in column {
            light = light.saturating_sub(state.kind.opacity());
            if light == 0 {
                break;
            }
        }
        light
    }
}

impl WorldAccess for InMemoryWorld {
    fn region(&self) -> RegionId {
        self.region
    }

    fn block_state(&self, pos: BlockPos) -> BlockState {
        self.blocks.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn set_block_state(&mut self, pos: BlockPos, state: BlockState, flags: u8) -> bool {
        if pos.y < self.min_y || pos.y > self.max_y {
            return false;
        }
        let changed = if state.is_air() {
            self.blocks.remove(&pos).is_some()
        } else {
            self.blocks.insert(pos, state) != Some(state)
        };
        if changed {
            self.block_updates = self.block_updates.saturating_add(1);
            trace!(%pos, kind = ?state.kind, flags, "block updated");
        }
        changed
    }

    fn light_level(&self, light: LightType, pos: BlockPos) -> u8 {
        match light {
            LightType::Sky => self.sky_light(pos),
            LightType::Block => 0,
        }
    }

    fn biome(&self, pos: BlockPos) -> &Biome {
        self.biomes.get(&(pos.x, pos.z)).unwrap_or(&self.default_biome)
    }
}
