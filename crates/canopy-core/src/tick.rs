//! Tick cycle: one step of the growth simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Wake** -- advance the clock and resample the region's season.
//!
//! 2. **Shade** -- recompute light for every cell of the growth lattice.
//!
//! 3. **Growth** -- every living node attempts one growth step, driven by its
//!    biome growth factor times the seasonal growth factor and gated by the
//!    light above its trunk top. Successful steps run post-growth features.
//!
//! 4. **Rot** -- unsupported trunk segments decay; trees that lose their whole
//!    trunk die.
//!
//! 5. **Drops** -- voluntary seed drops are resolved and shown to the drop
//!    veto before they are committed.
//!
//! 6. **Seeding** -- committed seeds may take root near their parent.
//!
//! Nodes are processed in planting order, so the tick is deterministic for a
//! given state and RNG seed.

use std::collections::BTreeMap;
use std::sync::Arc;

use canopy_types::{BlockPos, DropTrigger, ItemStack, NodeId, RegionId, ResourceKey, Season};
use canopy_world::{
    CellGrid, GridBounds, InMemoryWorld, LeavesProperties, NULL_PROPERTIES, Occupancy,
    ShadeSummary, WorldAccess, WorldError,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::clock::{ClockError, WorldClock};
use crate::config::{GrowthConfig, SimulationConfig};
use crate::drops::{AcceptAll, DropContext, DropDecision, DropTable, DropVeto, VoluntaryDropEvent};
use crate::features::{FeatureSite, FeatureStage};
use crate::node::{GrowthNode, GrowthOutcome, NodeSnapshot, PlantError, PlantOptions, StallReason};
use crate::season::SeasonManager;
use crate::species::{FeatureToggles, Species, SpeciesRegistry};

/// Errors that can occur while building or ticking the simulation.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// The season during this tick.
    pub season: Season,
    /// The region's sampled season value, if it has seasons.
    pub season_value: Option<f32>,
    /// Living trees at the end of the tick.
    pub nodes_alive: u32,
    /// Successful growth steps.
    pub grown: u32,
    /// Growth steps that lengthened a trunk.
    pub extended: u32,
    /// Failed growth attempts by reason.
    pub stalled: BTreeMap<StallReason, u32>,
    /// Blocks placed by generation features.
    pub features_placed: u32,
    /// Trunk segments lost to rot.
    pub segments_rotted: u32,
    /// Segments that rotted into mushrooms.
    pub mushrooms: u32,
    /// Trees that died.
    pub nodes_died: u32,
    /// Items dropped voluntarily.
    pub voluntary_drops: u32,
    /// Voluntary drop events rejected by the veto.
    pub vetoed: u32,
    /// Seeds that took root.
    pub seedlings_planted: u32,
    /// Lattice statistics from the shade pass.
    pub shade: ShadeSummary,
}

impl TickSummary {
    const fn new(tick: u64, season: Season, season_value: Option<f32>, shade: ShadeSummary) -> Self {
        Self {
            tick,
            season,
            season_value,
            nodes_alive: 0,
            grown: 0,
            extended: 0,
            stalled: BTreeMap::new(),
            features_placed: 0,
            segments_rotted: 0,
            mushrooms: 0,
            nodes_died: 0,
            voluntary_drops: 0,
            vetoed: 0,
            seedlings_planted: 0,
            shade,
        }
    }
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// Per-region season contexts.
    pub seasons: SeasonManager,
    /// The block world.
    pub world: InMemoryWorld,
    /// The growth lattice.
    pub grid: CellGrid,
    /// Active species.
    pub registry: SpeciesRegistry,
    /// Trees in planting order.
    pub nodes: Vec<GrowthNode>,
    /// Drop resolution.
    pub drops: DropTable,
    /// Growth settings.
    pub growth: GrowthConfig,
    /// Feature toggles derived from the growth settings.
    pub toggles: FeatureToggles,
    /// Simulation RNG, seeded from the world seed.
    pub rng: SmallRng,
}

impl SimulationState {
    /// Build a state around `world` and `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the time configuration is invalid or
    /// [`TickError::World`] if the lattice bounds are inverted.
    pub fn new(
        config: &SimulationConfig,
        world: InMemoryWorld,
        registry: SpeciesRegistry,
    ) -> Result<Self, TickError> {
        let clock = WorldClock::new(&config.time)?;
        let seasons = SeasonManager::from_config(&config.time)?;
        let bounds = GridBounds::new(config.world.lattice_min(), config.world.lattice_max())?;
        Ok(Self {
            clock,
            seasons,
            world,
            grid: CellGrid::new(bounds),
            registry,
            nodes: Vec::new(),
            drops: DropTable::new(config.growth.seed_drop_rate),
            growth: config.growth.clone(),
            toggles: FeatureToggles::from_config(&config.growth),
            rng: SmallRng::seed_from_u64(config.world.seed),
        })
    }

    /// Region of the simulated world.
    pub fn region(&self) -> RegionId {
        self.world.region()
    }

    /// Number of living trees.
    pub fn alive_count(&self) -> u32 {
        let alive = self.nodes.iter().filter(|node| node.is_alive()).count();
        u32::try_from(alive).unwrap_or(u32::MAX)
    }

    /// A tree by id.
    pub fn node(&self, id: NodeId) -> Option<&GrowthNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Serializable views of every tree.
    pub fn snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(GrowthNode::snapshot).collect()
    }

    /// Plant `species` at `root` and run its planting features.
    ///
    /// With `worldgen` set, the species' world generation soil overrides
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns a [`PlantError`] if the tree limit is reached or the site is
    /// unsuitable.
    pub fn plant(
        &mut self,
        species: &Arc<Species>,
        root: BlockPos,
        worldgen: bool,
    ) -> Result<NodeId, PlantError> {
        if self.alive_count() >= self.growth.max_trees {
            return Err(PlantError::AtCapacity(self.growth.max_trees));
        }
        let options = PlantOptions {
            soil_life: self.growth.initial_soil_life,
            tick: self.clock.tick(),
            worldgen,
            toggles: self.toggles,
        };
        let node = GrowthNode::plant(Arc::clone(species), root, &mut self.world, &mut self.grid, &options)?;
        let site = FeatureSite {
            root: node.root(),
            top: node.top(),
            leaves: node.leaves(),
            fruit_factor: 1.0,
        };
        for feature in species
            .features()
            .iter()
            .filter(|feature| feature.stage() == FeatureStage::Planting)
        {
            feature.apply(&mut self.world, &site, &mut self.rng);
        }
        let id = node.id();
        self.nodes.push(node);
        Ok(id)
    }

    // ---- Harvest ----

    /// Leaves occupying the lattice at `pos`, or [`NULL_PROPERTIES`] when
    /// there are none or their family is not registered.
    pub fn leaves_at(&self, pos: BlockPos) -> &LeavesProperties {
        match self.grid.occupancy(pos) {
            Occupancy::Leaf { family, .. } => self.registry.leaves_properties(family),
            Occupancy::Branch { .. } | Occupancy::Empty => &NULL_PROPERTIES,
        }
    }

    /// Break the leaf at `pos` with a tool of the given fortune level.
    ///
    /// Returns the leaves-break drops, or nothing if no tree of the leaf's
    /// family owns a leaf there.
    pub fn break_leaves(&mut self, pos: BlockPos, fortune: u32) -> Vec<ItemStack> {
        let family = self.registry.family(self.leaves_at(pos).family());
        if family.is_null() {
            trace!(%pos, "no leaves to break");
            return Vec::new();
        }
        let family = family.key.clone();
        let Some(node) = self
            .nodes
            .iter_mut()
            .find(|node| node.species().family().key == family && node.owns_leaf(pos))
        else {
            return Vec::new();
        };
        node.remove_leaf(&mut self.grid, &mut self.world, pos);
        let species = Arc::clone(node.species());
        let ctx = DropContext {
            node: Some(node.id()),
            fortune,
            fruit_factor: fruit_factor(&mut self.seasons, &self.world, node.root(), &species),
            ..DropContext::at(pos)
        };
        self.drops
            .resolve(DropTrigger::LeavesBreak, &species, &ctx, &mut self.rng, &mut AcceptAll)
    }

    /// Cut down the tree `id`, returning the merged harvest and log drops.
    ///
    /// Returns `None` if no such tree exists.
    pub fn fell_tree(&mut self, id: NodeId, fortune: u32) -> Option<Vec<ItemStack>> {
        let index = self.nodes.iter().position(|node| node.id() == id)?;
        let mut node = self.nodes.remove(index);
        let species = Arc::clone(node.species());
        let fruit = fruit_factor(&mut self.seasons, &self.world, node.root(), &species);
        let leaves: Vec<BlockPos> = node.leaves().iter().copied().collect();
        let report = node.fell(&mut self.grid, &mut self.world);

        let mut drops = Vec::new();
        for leaf in leaves {
            let ctx = DropContext {
                node: Some(id),
                fortune,
                fruit_factor: fruit,
                ..DropContext::at(leaf)
            };
            drops.extend(self.drops.resolve(
                DropTrigger::Harvest,
                &species,
                &ctx,
                &mut self.rng,
                &mut AcceptAll,
            ));
        }
        let ctx = DropContext {
            node: Some(id),
            fortune,
            volume: report.volume,
            fruit_factor: fruit,
            ..DropContext::at(node.root().up())
        };
        drops.extend(self.drops.resolve(
            DropTrigger::LogsBreak,
            &species,
            &ctx,
            &mut self.rng,
            &mut AcceptAll,
        ));
        let drops = merge_stacks(drops);
        info!(
            node = %id,
            species = %species.key(),
            volume = report.volume,
            stacks = drops.len(),
            "Tree felled"
        );
        Some(drops)
    }
}

fn fruit_factor(
    seasons: &mut SeasonManager,
    world: &InMemoryWorld,
    pos: BlockPos,
    species: &Species,
) -> f32 {
    let world: &dyn WorldAccess = world;
    seasons.fruit_production_factor(Some(world), pos, species.growth().season_offset)
}

fn merge_stacks(stacks: Vec<ItemStack>) -> Vec<ItemStack> {
    let mut merged: BTreeMap<ResourceKey, u32> = BTreeMap::new();
    for stack in stacks {
        let count = merged.entry(stack.item).or_insert(0);
        *count = count.saturating_add(stack.count);
    }
    merged
        .into_iter()
        .map(|(item, count)| ItemStack::new(item, count))
        .collect()
}

/// Counts rejections while forwarding to the caller's veto.
struct CountingVeto<'a> {
    inner: &'a mut dyn DropVeto,
    rejected: u32,
}

impl DropVeto for CountingVeto<'_> {
    fn review(&mut self, event: &VoluntaryDropEvent<'_>) -> DropDecision {
        let decision = self.inner.review(event);
        if decision == DropDecision::Reject {
            self.rejected = self.rejected.saturating_add(1);
        }
        decision
    }
}

/// Execute a single tick.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the clock cannot advance.
pub fn run_tick(
    state: &mut SimulationState,
    veto: &mut dyn DropVeto,
) -> Result<TickSummary, TickError> {
    // --- Phase 1: Wake ---
    state.clock.advance()?;
    let tick = state.clock.tick();
    let region = state.region();
    state.seasons.update_tick(region, tick);
    let season_value = state.seasons.context(region).season_value();
    let season = state.clock.season();
    debug!(tick, ?season, season_value, "Tick started");

    // --- Phase 2: Shade ---
    let shade = state.grid.propagate_shade();
    let mut summary = TickSummary::new(tick, season, season_value, shade);

    // --- Phase 3: Growth ---
    phase_growth(state, &mut summary);

    // --- Phase 4: Rot ---
    phase_rot(state, &mut summary);

    // --- Phase 5: Drops ---
    let dropped = phase_drops(state, veto, &mut summary);

    // --- Phase 6: Seeding ---
    if state.growth.plant_dropped_seeds {
        phase_seeding(state, &dropped, &mut summary);
    }

    state.nodes.retain(GrowthNode::is_alive);
    summary.nodes_alive = state.alive_count();
    trace!(
        tick,
        alive = summary.nodes_alive,
        grown = summary.grown,
        died = summary.nodes_died,
        "Tick finished"
    );
    Ok(summary)
}

/// Phase 3: one growth attempt per living node.
fn phase_growth(state: &mut SimulationState, summary: &mut TickSummary) {
    for node in &mut state.nodes {
        let species = Arc::clone(node.species());
        let root = node.root();
        let offset = species.growth().season_offset;
        let season_factor = state.seasons.growth_factor(&state.world, root, offset);
        match node.grow(&mut state.grid, &mut state.world, season_factor, &mut state.rng) {
            GrowthOutcome::Grew { extended, .. } => {
                summary.grown = summary.grown.saturating_add(1);
                if extended {
                    summary.extended = summary.extended.saturating_add(1);
                }
                let site = FeatureSite {
                    root,
                    top: node.top(),
                    leaves: node.leaves(),
                    fruit_factor: fruit_factor(&mut state.seasons, &state.world, root, &species),
                };
                for feature in species
                    .features()
                    .iter()
                    .filter(|feature| feature.stage() == FeatureStage::PostGrowth)
                {
                    let placed = feature.apply(&mut state.world, &site, &mut state.rng);
                    summary.features_placed = summary.features_placed.saturating_add(placed);
                }
            }
            GrowthOutcome::Stalled(reason) => {
                let count = summary.stalled.entry(reason).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }
}

/// Phase 4: rot every living trunk.
fn phase_rot(state: &mut SimulationState, summary: &mut TickSummary) {
    for node in &mut state.nodes {
        let report = node.rot_step(&mut state.grid, &mut state.world, &mut state.rng);
        summary.segments_rotted = summary.segments_rotted.saturating_add(report.segments_lost);
        summary.mushrooms = summary.mushrooms.saturating_add(report.mushrooms);
        if report.died {
            summary.nodes_died = summary.nodes_died.saturating_add(1);
            info!(node = %node.id(), species = %node.species().key(), "Tree died");
        }
    }
}

/// Phase 5: voluntary drops. Returns the committed stacks with the position
/// they fell from.
fn phase_drops(
    state: &mut SimulationState,
    veto: &mut dyn DropVeto,
    summary: &mut TickSummary,
) -> Vec<(BlockPos, ItemStack)> {
    let mut counting = CountingVeto {
        inner: veto,
        rejected: 0,
    };
    let mut dropped = Vec::new();
    for node in state.nodes.iter().filter(|node| node.is_alive()) {
        let species = node.species();
        let root = node.root();
        let offset = species.growth().season_offset;
        let ctx = DropContext {
            node: Some(node.id()),
            seed_factor: state.seasons.seed_drop_factor(&state.world, root, offset),
            fruit_factor: fruit_factor(&mut state.seasons, &state.world, root, species),
            ..DropContext::at(node.top())
        };
        let drops = state.drops.resolve(
            DropTrigger::Voluntary,
            species,
            &ctx,
            &mut state.rng,
            &mut counting,
        );
        for stack in drops {
            summary.voluntary_drops = summary.voluntary_drops.saturating_add(stack.count);
            dropped.push((ctx.pos, stack));
        }
    }
    summary.vetoed = counting.rejected;
    dropped
}

/// Phase 6: dropped seeds try to root on the surface near where they fell.
fn phase_seeding(
    state: &mut SimulationState,
    dropped: &[(BlockPos, ItemStack)],
    summary: &mut TickSummary,
) {
    let radius = state.growth.seed_scatter_radius.max(0);
    for (origin, stack) in dropped {
        let Some(species) = state.registry.species_for_seed(&stack.item).cloned() else {
            continue;
        };
        for _ in 0..stack.count {
            let x = origin.x.saturating_add(state.rng.random_range(-radius..=radius));
            let z = origin.z.saturating_add(state.rng.random_range(-radius..=radius));
            let Some(root) = state.world.surface_at(x, z) else {
                continue;
            };
            match state.plant(&species, root, false) {
                Ok(id) => {
                    summary.seedlings_planted = summary.seedlings_planted.saturating_add(1);
                    debug!(node = %id, species = %species.key(), %root, "Seed took root");
                }
                Err(PlantError::AtCapacity(max)) => {
                    trace!(max, "Tree limit reached, seeds discarded");
                    return;
                }
                Err(err) => trace!(%root, error = %err, "Seed failed to take root"),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_types::{Biome, BlockKind, BlockState};
    use canopy_world::{CellKit, flags};

    use super::*;
    use crate::config::{TimeConfig, WorldConfig};
    use crate::species::builtin_species;

    struct RejectAll {
        seen: u32,
    }

    impl DropVeto for RejectAll {
        fn review(&mut self, _event: &VoluntaryDropEvent<'_>) -> DropDecision {
            self.seen = self.seen.saturating_add(1);
            DropDecision::Reject
        }
    }

    fn config(seed_drop_rate: f32) -> SimulationConfig {
        SimulationConfig {
            world: WorldConfig {
                half_extent: 8,
                ..WorldConfig::default()
            },
            time: TimeConfig {
                seasons_enabled: false,
                ..TimeConfig::default()
            },
            growth: GrowthConfig {
                seed_drop_rate,
                ..GrowthConfig::default()
            },
            ..SimulationConfig::default()
        }
    }

    fn make_state(config: &SimulationConfig) -> SimulationState {
        let mut world =
            InMemoryWorld::new(config.world.region_id(), 0, 63, Biome::forest()).unwrap();
        world
            .fill_layer(4, (-8, -8), (8, 8), BlockState::of(BlockKind::Grass))
            .unwrap();
        let mut registry = SpeciesRegistry::default();
        registry.register_all(builtin_species(&FeatureToggles::from_config(&config.growth)));
        SimulationState::new(config, world, registry).unwrap()
    }

    fn oak(state: &SimulationState) -> Arc<Species> {
        Arc::clone(state.registry.get(&ResourceKey::new("canopy", "oak")).unwrap())
    }

    #[test]
    fn tick_advances_clock() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();

        let summary = run_tick(&mut state, &mut AcceptAll).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.season, Season::Spring);
        assert_eq!(summary.nodes_alive, 1);
        assert!(summary.season_value.is_none());
        assert!(summary.shade.cells > 0);
    }

    #[test]
    fn trees_grow_over_many_ticks() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        let id = state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();

        let mut grown: u32 = 0;
        for _ in 0..200 {
            let summary = run_tick(&mut state, &mut AcceptAll).unwrap();
            grown = grown.saturating_add(summary.grown);
        }
        assert!(grown > 0);
        assert!(state.node(id).unwrap().height() > 1);
        assert_eq!(state.clock.tick(), 200);
    }

    #[test]
    fn veto_clears_every_voluntary_drop() {
        let cfg = config(1.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();

        let mut veto = RejectAll { seen: 0 };
        for _ in 0..10 {
            let summary = run_tick(&mut state, &mut veto).unwrap();
            assert_eq!(summary.voluntary_drops, 0);
            assert_eq!(summary.seedlings_planted, 0);
        }
        assert_eq!(veto.seen, 10);
        assert_eq!(state.nodes.len(), 1);
    }

    #[test]
    fn dropped_seeds_take_root_nearby() {
        let cfg = config(1.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();

        let mut planted: u32 = 0;
        for _ in 0..30 {
            let summary = run_tick(&mut state, &mut AcceptAll).unwrap();
            assert!(summary.voluntary_drops > 0);
            planted = planted.saturating_add(summary.seedlings_planted);
        }
        assert!(planted > 0);
        assert!(state.nodes.len() > 1);
        for node in &state.nodes {
            assert!(node.root().x.abs() <= 8 && node.root().z.abs() <= 8);
        }
    }

    #[test]
    fn tree_limit_caps_seeding() {
        let mut cfg = config(1.0);
        cfg.growth.max_trees = 3;
        let mut state = make_state(&cfg);
        let species = oak(&state);
        state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();
        for _ in 0..60 {
            run_tick(&mut state, &mut AcceptAll).unwrap();
        }
        assert_eq!(state.alive_count(), 3);
        assert!(matches!(
            state.plant(&species, BlockPos::new(-7, 4, -7), false),
            Err(PlantError::AtCapacity(3))
        ));
    }

    #[test]
    fn uprooted_trees_die_and_are_removed() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        let id = state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();
        let root = state.node(id).unwrap().root();
        state
            .world
            .set_block_state(root, BlockState::of(BlockKind::Dirt), flags::DEFAULT);

        let summary = run_tick(&mut state, &mut AcceptAll).unwrap();
        assert_eq!(summary.nodes_died, 1);
        assert_eq!(summary.nodes_alive, 0);
        assert!(state.nodes.is_empty());
        assert!(state.grid.is_empty());
    }

    #[test]
    fn felling_returns_merged_drops_and_clears_the_tree() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        let id = state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();
        for _ in 0..100 {
            run_tick(&mut state, &mut AcceptAll).unwrap();
        }
        let drops = state.fell_tree(id, 0).unwrap();
        let mut items: Vec<&ResourceKey> = drops.iter().map(|stack| &stack.item).collect();
        items.dedup();
        assert_eq!(items.len(), drops.len());
        assert!(drops.iter().all(|stack| stack.count > 0));
        assert!(state.node(id).is_none());
        assert!(state.grid.is_empty());
        assert!(state.fell_tree(id, 0).is_none());
    }

    #[test]
    fn breaking_a_leaf_removes_it() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        let id = state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();
        let leaf = *state.node(id).unwrap().leaves().iter().next().unwrap();

        let drops = state.break_leaves(leaf, 3);
        assert!(drops.iter().all(|stack| stack.count > 0));
        assert!(!state.node(id).unwrap().owns_leaf(leaf));
        assert!(state.world.block_state(leaf).is_air());
        assert!(state.break_leaves(leaf, 0).is_empty());
    }

    #[test]
    fn leaves_lookup_falls_back_to_null_properties() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let species = oak(&state);
        let root = BlockPos::new(0, 4, 0);
        let id = state.plant(&species, root, false).unwrap();
        let leaf = *state.node(id).unwrap().leaves().iter().next().unwrap();

        assert_eq!(state.leaves_at(leaf), species.leaves());
        assert!(state.leaves_at(root.up()).is_null());
        assert!(state.leaves_at(BlockPos::new(6, 20, 6)).is_null());

        let stray = BlockPos::new(-6, 12, -6);
        state.grid.set_occupancy(
            stray,
            Occupancy::Leaf {
                family: ResourceKey::new("canopy", "baobab"),
                kit: CellKit::Deciduous,
            },
        );
        assert!(std::ptr::eq(state.leaves_at(stray), &NULL_PROPERTIES));
        assert!(state.break_leaves(stray, 0).is_empty());
        assert!(matches!(state.grid.occupancy(stray), Occupancy::Leaf { .. }));
    }

    #[test]
    fn same_seed_same_forest() {
        let cfg = config(0.5);
        let mut first = make_state(&cfg);
        let mut second = make_state(&cfg);
        for state in [&mut first, &mut second] {
            let species = oak(state);
            state.plant(&species, BlockPos::new(0, 4, 0), false).unwrap();
            state.plant(&species, BlockPos::new(5, 4, 5), false).unwrap();
        }
        for _ in 0..80 {
            let a = run_tick(&mut first, &mut AcceptAll).unwrap();
            let b = run_tick(&mut second, &mut AcceptAll).unwrap();
            assert_eq!(a.grown, b.grown);
            assert_eq!(a.seedlings_planted, b.seedlings_planted);
        }
        let shape = |state: &SimulationState| -> Vec<(BlockPos, u32, usize)> {
            state
                .snapshots()
                .into_iter()
                .map(|snap| (snap.root, snap.height, snap.leaves))
                .collect()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn summary_reports_the_sampled_season_value() {
        let mut cfg = config(0.0);
        cfg.time = TimeConfig {
            ticks_per_season: 4,
            season_update_interval: 10,
            ..TimeConfig::default()
        };
        let mut state = make_state(&cfg);
        let region = state.region();

        let first = run_tick(&mut state, &mut AcceptAll).unwrap();
        let second = run_tick(&mut state, &mut AcceptAll).unwrap();
        let sampled = first.season_value.unwrap();
        assert!((sampled - 0.25).abs() < 1e-5);
        assert_eq!(second.season_value, Some(sampled));
        assert_eq!(state.seasons.context(region).season_value(), Some(sampled));

        let live = state.seasons.season_value(region, BlockPos::ORIGIN).unwrap();
        assert!((live - 0.5).abs() < 1e-5);
    }

    #[test]
    fn summary_serializes() {
        let cfg = config(0.0);
        let mut state = make_state(&cfg);
        let summary = run_tick(&mut state, &mut AcceptAll).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tick"], 1);
        assert_eq!(json["season"], "spring");
    }
}
