//! Terrain generation and initial tree planting.
//!
//! Before the first tick the engine lays out a flat world split into four
//! biome quadrants and plants a set of trees on its surface. Each tree gets
//! a species whose spawn predicate accepts the biome it lands in, preferring
//! species that thrive there. World generation soil rules apply, so swamp
//! oaks may root in the shallow water of the swamp quadrant.

use std::sync::Arc;

use canopy_core::config::WorldConfig;
use canopy_core::{PlantError, SimulationState, Species};
use canopy_types::{Biome, BlockKind, BlockPos, BlockState};
use canopy_world::{InMemoryWorld, WorldAccess, WorldError};
use rand::Rng;
use tracing::{debug, info};

use crate::error::EngineError;

/// Share of swamp columns whose surface is open water.
const SWAMP_WATER_CHANCE: f64 = 0.25;

/// Random sites tried per requested tree before giving up.
const ATTEMPTS_PER_TREE: u32 = 8;

// -----------------------------------------------------------------------
// Terrain
// -----------------------------------------------------------------------

/// Build the starting world described by `config`.
///
/// The lattice footprint is covered with stone, dirt, and a grass surface
/// at `surface_y`. Quadrants are forest (north-west), plains (north-east),
/// swamp (south-west), and taiga (south-east). Part of the swamp surface is
/// replaced with water.
///
/// # Errors
///
/// Returns [`WorldError`] if the build limits are inverted or `surface_y`
/// lies outside them.
pub fn build_terrain<R: Rng + ?Sized>(
    config: &WorldConfig,
    rng: &mut R,
) -> Result<InMemoryWorld, WorldError> {
    let mut world = InMemoryWorld::new(config.region_id(), config.min_y, config.max_y, Biome::forest())?;
    let lo = config.half_extent.saturating_neg();
    let hi = config.half_extent;

    // --- Biomes ---
    world.set_biome_area((0, lo), (hi, -1), &Biome::plains());
    world.set_biome_area((lo, 0), (-1, hi), &Biome::swamp());
    world.set_biome_area((0, 0), (hi, hi), &Biome::taiga());

    // --- Layers ---
    let surface = config.surface_y;
    for (depth, kind) in [(2, BlockKind::Stone), (1, BlockKind::Dirt)] {
        let y = surface.saturating_sub(depth);
        if y >= config.min_y {
            world.fill_layer(y, (lo, lo), (hi, hi), BlockState::of(kind))?;
        }
    }
    world.fill_layer(surface, (lo, lo), (hi, hi), BlockState::of(BlockKind::Grass))?;

    // --- Swamp water ---
    let mut water = 0_u32;
    for x in lo..0 {
        for z in 0..=hi {
            if rng.random_bool(SWAMP_WATER_CHANCE) {
                world.set_block_state(BlockPos::new(x, surface, z), BlockState::of(BlockKind::Water), 0);
                water = water.saturating_add(1);
            }
        }
    }

    info!(
        half_extent = config.half_extent,
        surface_y = surface,
        water_columns = water,
        blocks = world.block_count(),
        "Terrain generated"
    );
    Ok(world)
}

// -----------------------------------------------------------------------
// Initial trees
// -----------------------------------------------------------------------

/// Outcome of [`plant_initial_trees`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialPlanting {
    /// Trees planted.
    pub planted: u32,
    /// Sites tried.
    pub attempts: u32,
}

/// Plant up to `count` trees at random surface sites.
///
/// Sites without a species that may spawn in their biome, or whose soil
/// the chosen species rejects, are skipped. Planting stops early once the
/// tree limit is reached or the attempt budget runs out.
///
/// # Errors
///
/// Returns [`EngineError::NoSpecies`] if the registry is empty.
pub fn plant_initial_trees(
    state: &mut SimulationState,
    count: u32,
) -> Result<InitialPlanting, EngineError> {
    if state.registry.is_empty() {
        return Err(EngineError::NoSpecies);
    }

    let min = state.grid.bounds().min();
    let max = state.grid.bounds().max();
    let budget = count.saturating_mul(ATTEMPTS_PER_TREE);
    let mut planting = InitialPlanting {
        planted: 0,
        attempts: 0,
    };

    while planting.planted < count && planting.attempts < budget {
        planting.attempts = planting.attempts.saturating_add(1);

        let x = state.rng.random_range(min.x..=max.x);
        let z = state.rng.random_range(min.z..=max.z);
        let Some(site) = state.world.surface_at(x, z) else {
            continue;
        };
        let Some(species) = pick_species(state, site) else {
            debug!(%site, "no species spawns here");
            continue;
        };

        match state.plant(&species, site, true) {
            Ok(id) => {
                planting.planted = planting.planted.saturating_add(1);
                debug!(node = %id, species = %species.key(), %site, "initial tree planted");
            }
            Err(PlantError::AtCapacity(limit)) => {
                debug!(limit, "tree limit reached during seeding");
                break;
            }
            Err(err) => {
                debug!(%site, error = %err, "site rejected");
            }
        }
    }

    info!(
        requested = count,
        planted = planting.planted,
        attempts = planting.attempts,
        "Initial trees planted"
    );
    Ok(planting)
}

/// A species for `site`: one that thrives in the biome when any may spawn
/// there, otherwise any species that may spawn there.
fn pick_species(state: &mut SimulationState, site: BlockPos) -> Option<Arc<Species>> {
    let biome = state.world.biome(site);
    let spawnable: Vec<&Arc<Species>> = state
        .registry
        .iter()
        .filter(|species| species.can_spawn_in(biome))
        .collect();
    let perfect: Vec<&Arc<Species>> = spawnable
        .iter()
        .copied()
        .filter(|species| species.is_biome_perfect(biome))
        .collect();
    let candidates = if perfect.is_empty() { spawnable } else { perfect };
    if candidates.is_empty() {
        return None;
    }
    let index = state.rng.random_range(0..candidates.len());
    candidates.get(index).map(|&species| Arc::clone(species))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_core::SpeciesRegistry;
    use canopy_core::config::SimulationConfig;
    use canopy_core::species::{FeatureToggles, builtin_species};
    use canopy_types::{BiomeTag, ResourceKey};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.half_extent = 10;
        config
    }

    fn state_with(config: &SimulationConfig, registry: SpeciesRegistry) -> SimulationState {
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let world = build_terrain(&config.world, &mut rng).unwrap();
        SimulationState::new(config, world, registry).unwrap()
    }

    fn builtin_registry(config: &SimulationConfig) -> SpeciesRegistry {
        let mut registry = SpeciesRegistry::default();
        registry.register_all(builtin_species(&FeatureToggles::from_config(&config.growth)));
        registry
    }

    #[test]
    fn terrain_has_quadrant_biomes_and_layers() {
        let config = small_config();
        let mut rng = SmallRng::seed_from_u64(1);
        let world = build_terrain(&config.world, &mut rng).unwrap();
        let y = config.world.surface_y;

        assert!(world.biome(BlockPos::new(-5, y, -5)).has_tag(BiomeTag::Forest));
        assert!(world.biome(BlockPos::new(5, y, -5)).has_tag(BiomeTag::Plains));
        assert!(world.biome(BlockPos::new(-5, y, 5)).has_tag(BiomeTag::Swamp));
        assert!(world.biome(BlockPos::new(5, y, 5)).has_tag(BiomeTag::Cold));

        assert_eq!(world.block_state(BlockPos::new(3, y, -3)).kind, BlockKind::Grass);
        assert_eq!(world.block_state(BlockPos::new(3, y.saturating_sub(1), -3)).kind, BlockKind::Dirt);
        assert_eq!(world.block_state(BlockPos::new(3, y.saturating_sub(2), -3)).kind, BlockKind::Stone);
        assert_eq!(world.surface_at(3, -3), Some(BlockPos::new(3, y, -3)));
    }

    #[test]
    fn water_only_appears_in_the_swamp() {
        let config = small_config();
        let mut rng = SmallRng::seed_from_u64(3);
        let world = build_terrain(&config.world, &mut rng).unwrap();
        let y = config.world.surface_y;

        assert!(world.count_kind(BlockKind::Water) > 0);
        for x in -10..=10 {
            for z in -10..=10 {
                let pos = BlockPos::new(x, y, z);
                if world.block_state(pos).kind == BlockKind::Water {
                    assert!(world.biome(pos).has_tag(BiomeTag::Swamp));
                }
            }
        }
    }

    #[test]
    fn initial_trees_respect_spawn_biomes() {
        let config = small_config();
        let registry = builtin_registry(&config);
        let mut state = state_with(&config, registry);

        let planting = plant_initial_trees(&mut state, 12).unwrap();
        assert!(planting.planted > 0);
        assert_eq!(state.alive_count(), planting.planted);
        for node in &state.nodes {
            let biome = state.world.biome(node.root());
            assert!(node.species().can_spawn_in(biome));
            assert_ne!(node.species().key(), &ResourceKey::new("canopy", "thick_test"));
        }
    }

    #[test]
    fn species_that_thrive_in_the_biome_are_preferred() {
        let config = small_config();
        let registry = builtin_registry(&config);
        let mut state = state_with(&config, registry);
        let y = config.world.surface_y;

        for _ in 0..20 {
            let plains = pick_species(&mut state, BlockPos::new(5, y, -5)).unwrap();
            assert_eq!(plains.key(), &ResourceKey::new("canopy", "apple_oak"));
            let swamp = pick_species(&mut state, BlockPos::new(-5, y, 5)).unwrap();
            assert_eq!(swamp.key(), &ResourceKey::new("canopy", "swamp_oak"));
        }
    }

    #[test]
    fn spawnable_species_are_used_when_none_thrive() {
        let mut config = small_config();
        config.growth.enable_apple_trees = false;
        let registry = builtin_registry(&config);
        let mut state = state_with(&config, registry);
        let y = config.world.surface_y;

        let plains = pick_species(&mut state, BlockPos::new(5, y, -5)).unwrap();
        assert!(!plains.is_biome_perfect(&Biome::plains()));
        assert_eq!(plains.key(), &ResourceKey::new("canopy", "oak"));
    }

    #[test]
    fn seeding_stops_at_tree_limit() {
        let mut config = small_config();
        config.growth.max_trees = 2;
        let registry = builtin_registry(&config);
        let mut state = state_with(&config, registry);

        let planting = plant_initial_trees(&mut state, 10).unwrap();
        assert_eq!(planting.planted, 2);
        assert_eq!(state.alive_count(), 2);
    }

    #[test]
    fn empty_registry_is_an_error() {
        let config = small_config();
        let mut state = state_with(&config, SpeciesRegistry::default());
        assert!(matches!(
            plant_initial_trees(&mut state, 3),
            Err(EngineError::NoSpecies)
        ));
    }
}
