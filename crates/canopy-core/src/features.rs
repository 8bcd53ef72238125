//! Decorative generation features attached to species.
//!
//! Features only ever write into air blocks and report how many blocks they
//! placed. Bee nests are placed once when a tree is planted; vines and fruit
//! are re-rolled after every successful growth step.

use std::collections::BTreeSet;

use canopy_types::{BlockKind, BlockPos, BlockState, Direction};
use canopy_world::{WorldAccess, flags};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base chance per growth step that a fruit-bearing tree sets one fruit,
/// before seasonal scaling.
const FRUIT_SET_CHANCE: f32 = 0.5;

/// When a feature runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStage {
    /// Once, when the tree is planted.
    Planting,
    /// After every successful growth step.
    PostGrowth,
}

/// A decorative feature a species adds to its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenFeature {
    /// A bee nest on the trunk.
    BeeNest {
        /// Chance the nest appears, `0.0..=1.0`.
        chance: f32,
    },
    /// Vines hanging off the outside of the canopy.
    Vines {
        /// Longest vine in blocks.
        max_length: u8,
        /// Placement attempts per growth step.
        quantity: u8,
    },
    /// Fruit hanging under leaves near the top.
    Fruit {
        /// How far from the trunk top fruit may hang.
        ray_distance: u8,
    },
}

/// Where a feature is applied.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSite<'a> {
    /// The tree's rooty soil.
    pub root: BlockPos,
    /// Topmost trunk segment.
    pub top: BlockPos,
    /// Leaves currently owned by the tree.
    pub leaves: &'a BTreeSet<BlockPos>,
    /// Seasonal fruit production multiplier.
    pub fruit_factor: f32,
}

impl GenFeature {
    /// When this feature runs.
    pub const fn stage(&self) -> FeatureStage {
        match self {
            Self::BeeNest { .. } => FeatureStage::Planting,
            Self::Vines { .. } | Self::Fruit { .. } => FeatureStage::PostGrowth,
        }
    }

    /// Check parameters. Returns a reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::BeeNest { chance } if !(0.0..=1.0).contains(&chance) => {
                Err(format!("bee nest chance {chance} is outside [0, 1]"))
            }
            Self::Vines { max_length: 0, .. } => Err("vines need a max length of at least 1".to_owned()),
            Self::Fruit { ray_distance: 0 } => Err("fruit ray distance must be at least 1".to_owned()),
            _ => Ok(()),
        }
    }

    /// Apply the feature, returning the number of blocks placed.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        world: &mut dyn WorldAccess,
        site: &FeatureSite<'_>,
        rng: &mut R,
    ) -> u32 {
        match *self {
            Self::BeeNest { chance } => place_bee_nest(world, site, chance, rng),
            Self::Vines {
                max_length,
                quantity,
            } => place_vines(world, site, max_length, quantity, rng),
            Self::Fruit { ray_distance } => place_fruit(world, site, ray_distance, rng),
        }
    }
}

fn place_bee_nest<R: Rng + ?Sized>(
    world: &mut dyn WorldAccess,
    site: &FeatureSite<'_>,
    chance: f32,
    rng: &mut R,
) -> u32 {
    if rng.random::<f32>() >= chance {
        return 0;
    }
    let height = site.top.y.saturating_sub(site.root.y);
    let nest_y = site.root.y.saturating_add(height.clamp(1, 2));
    let trunk = BlockPos::new(site.root.x, nest_y, site.root.z);
    let start = rng.random_range(0..Direction::HORIZONTAL.len());
    for step in 0..Direction::HORIZONTAL.len() {
        let index = start.saturating_add(step) % Direction::HORIZONTAL.len();
        let Some(&dir) = Direction::HORIZONTAL.get(index) else {
            continue;
        };
        let pos = trunk.offset(dir);
        if world.block_state(pos).is_air()
            && world.set_block_state(pos, BlockState::of(BlockKind::BeeNest), flags::DEFAULT)
        {
            return 1;
        }
    }
    0
}

fn pick_leaf<R: Rng + ?Sized>(leaves: &BTreeSet<BlockPos>, rng: &mut R) -> Option<BlockPos> {
    if leaves.is_empty() {
        return None;
    }
    leaves.iter().nth(rng.random_range(0..leaves.len())).copied()
}

fn place_vines<R: Rng + ?Sized>(
    world: &mut dyn WorldAccess,
    site: &FeatureSite<'_>,
    max_length: u8,
    quantity: u8,
    rng: &mut R,
) -> u32 {
    let mut placed: u32 = 0;
    for _ in 0..quantity {
        let Some(leaf) = pick_leaf(site.leaves, rng) else {
            break;
        };
        let Some(&dir) = Direction::HORIZONTAL.get(rng.random_range(0..Direction::HORIZONTAL.len()))
        else {
            continue;
        };
        let length = rng.random_range(1..=max_length.max(1));
        let mut pos = leaf.offset(dir);
        for _ in 0..length {
            if !world.block_state(pos).is_air()
                || !world.set_block_state(pos, BlockState::of(BlockKind::Vine), flags::DEFAULT)
            {
                break;
            }
            placed = placed.saturating_add(1);
            pos = pos.down();
        }
    }
    placed
}

fn place_fruit<R: Rng + ?Sized>(
    world: &mut dyn WorldAccess,
    site: &FeatureSite<'_>,
    ray_distance: u8,
    rng: &mut R,
) -> u32 {
    let chance = (FRUIT_SET_CHANCE * site.fruit_factor).clamp(0.0, 1.0);
    if rng.random::<f32>() >= chance {
        return 0;
    }
    let reach = u32::from(ray_distance);
    let candidates: BTreeSet<BlockPos> = site
        .leaves
        .iter()
        .copied()
        .filter(|leaf| leaf.chebyshev_distance(site.top) <= reach)
        .filter(|leaf| world.block_state(leaf.down()).is_air())
        .collect();
    let Some(leaf) = pick_leaf(&candidates, rng) else {
        return 0;
    };
    u32::from(world.set_block_state(leaf.down(), BlockState::of(BlockKind::Fruit), flags::DEFAULT))
}
