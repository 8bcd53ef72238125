//! Per-region season state and seasonal growth factors.
//!
//! Each region lazily gets a [`SeasonContext`]: a season provider that
//! reports where in the year the region is, and a growth calculator that
//! turns that season value into growth, seed-drop, and fruit multipliers.
//! Contexts are created on first access through a mapper, cached, and can be
//! flushed so the next access rebuilds them.
//!
//! Regions without seasons (the null provider) report no season value, and
//! every factor for them is 1.0.

use std::collections::BTreeMap;
use std::fmt;

use canopy_types::{Biome, BlockPos, ClimateZone, RegionId, Season};
use canopy_world::WorldAccess;
use tracing::{debug, trace};

use crate::clock::{ClockError, WorldClock};
use crate::config::TimeConfig;
use crate::curve::InterpolationCurve;

/// Biome temperature above which a position counts as tropical.
pub const TROPICAL_TEMPERATURE: f32 = 0.8;

/// Blocks of `y` per season value unit in scan queries.
const SCAN_BLOCKS_PER_SEASON: f32 = 64.0;

// ---------------------------------------------------------------------------
// Providers and calculators
// ---------------------------------------------------------------------------

/// Reports the season value of a region.
pub trait SeasonProvider: fmt::Debug + Send {
    /// Short identifier of the provider implementation.
    fn kind(&self) -> &'static str;

    /// Advance internal state to `world_ticks`.
    fn update_tick(&mut self, world_ticks: u64);

    /// Season value at `pos` in `[0, 4)`, or `None` when the region has no
    /// seasons.
    fn season_value(&self, pos: BlockPos) -> Option<f32>;

    /// Whether snow and ice at `pos` should melt.
    fn should_snow_melt(&self, biome: &Biome, pos: BlockPos) -> bool;
}

/// Turns a season value into seasonal multipliers.
pub trait SeasonGrowthCalculator: fmt::Debug + Send {
    /// Short identifier of the calculator implementation.
    fn kind(&self) -> &'static str;

    /// Growth rate multiplier.
    fn calc_growth_rate(&self, season_value: f32, zone: ClimateZone) -> f32;

    /// Seed drop multiplier.
    fn calc_seed_drop_rate(&self, season_value: f32, zone: ClimateZone) -> f32;

    /// Fruit production multiplier.
    fn calc_fruit_production(&self, season_value: f32, zone: ClimateZone) -> f32;
}

/// A provider for regions without seasons.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSeasonProvider;

impl SeasonProvider for NullSeasonProvider {
    fn kind(&self) -> &'static str {
        "null"
    }

    fn update_tick(&mut self, _world_ticks: u64) {}

    fn season_value(&self, _pos: BlockPos) -> Option<f32> {
        None
    }

    fn should_snow_melt(&self, _biome: &Biome, _pos: BlockPos) -> bool {
        false
    }
}

/// A provider that derives the season from the world tick count.
#[derive(Debug, Clone)]
pub struct ClockSeasonProvider {
    clock: WorldClock,
}

impl ClockSeasonProvider {
    /// Build a provider with the given season length and cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`ClockError`] for a degenerate configuration.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        Ok(Self {
            clock: WorldClock::new(config)?,
        })
    }

    /// Wrap an existing clock.
    pub const fn from_clock(clock: WorldClock) -> Self {
        Self { clock }
    }
}

impl SeasonProvider for ClockSeasonProvider {
    fn kind(&self) -> &'static str {
        "clock"
    }

    fn update_tick(&mut self, world_ticks: u64) {
        self.clock.set_tick(world_ticks);
    }

    fn season_value(&self, _pos: BlockPos) -> Option<f32> {
        Some(self.clock.season_value())
    }

    fn should_snow_melt(&self, biome: &Biome, _pos: BlockPos) -> bool {
        biome.temperature > TROPICAL_TEMPERATURE
            || matches!(self.clock.season(), Season::Spring | Season::Summer)
    }
}

/// A calculator that never modulates anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSeasonGrowthCalculator;

impl SeasonGrowthCalculator for NullSeasonGrowthCalculator {
    fn kind(&self) -> &'static str {
        "null"
    }

    fn calc_growth_rate(&self, _season_value: f32, _zone: ClimateZone) -> f32 {
        1.0
    }

    fn calc_seed_drop_rate(&self, _season_value: f32, _zone: ClimateZone) -> f32 {
        1.0
    }

    fn calc_fruit_production(&self, _season_value: f32, _zone: ClimateZone) -> f32 {
        1.0
    }
}

/// A calculator backed by one curve per factor and climate zone.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSeasonGrowthCalculator {
    /// Temperate growth curve.
    pub temperate_growth: InterpolationCurve,
    /// Tropical growth curve.
    pub tropical_growth: InterpolationCurve,
    /// Temperate seed drop curve.
    pub temperate_seed_drop: InterpolationCurve,
    /// Tropical seed drop curve.
    pub tropical_seed_drop: InterpolationCurve,
    /// Temperate fruit production curve.
    pub temperate_fruit: InterpolationCurve,
    /// Tropical fruit production curve.
    pub tropical_fruit: InterpolationCurve,
}

impl Default for CurveSeasonGrowthCalculator {
    fn default() -> Self {
        Self {
            temperate_growth: InterpolationCurve::temperate_growth(),
            tropical_growth: InterpolationCurve::tropical_growth(),
            temperate_seed_drop: InterpolationCurve::temperate_seed_drop(),
            tropical_seed_drop: InterpolationCurve::tropical_seed_drop(),
            temperate_fruit: InterpolationCurve::temperate_fruit(),
            tropical_fruit: InterpolationCurve::tropical_fruit(),
        }
    }
}

impl SeasonGrowthCalculator for CurveSeasonGrowthCalculator {
    fn kind(&self) -> &'static str {
        "curve"
    }

    fn calc_growth_rate(&self, season_value: f32, zone: ClimateZone) -> f32 {
        match zone {
            ClimateZone::Temperate => self.temperate_growth.sample(season_value),
            ClimateZone::Tropical => self.tropical_growth.sample(season_value),
        }
    }

    fn calc_seed_drop_rate(&self, season_value: f32, zone: ClimateZone) -> f32 {
        match zone {
            ClimateZone::Temperate => self.temperate_seed_drop.sample(season_value),
            ClimateZone::Tropical => self.tropical_seed_drop.sample(season_value),
        }
    }

    fn calc_fruit_production(&self, season_value: f32, zone: ClimateZone) -> f32 {
        match zone {
            ClimateZone::Temperate => self.temperate_fruit.sample(season_value),
            ClimateZone::Tropical => self.tropical_fruit.sample(season_value),
        }
    }
}

// ---------------------------------------------------------------------------
// SeasonContext
// ---------------------------------------------------------------------------

/// Season state cached for one region.
#[derive(Debug)]
pub struct SeasonContext {
    provider: Box<dyn SeasonProvider>,
    calculator: Box<dyn SeasonGrowthCalculator>,
    season_value: Option<f32>,
    last_sample_tick: Option<u64>,
}

impl SeasonContext {
    /// Pair a provider with a calculator. The season value is sampled once
    /// immediately.
    pub fn new(
        provider: Box<dyn SeasonProvider>,
        calculator: Box<dyn SeasonGrowthCalculator>,
    ) -> Self {
        let season_value = provider.season_value(BlockPos::ORIGIN);
        Self {
            provider,
            calculator,
            season_value,
            last_sample_tick: None,
        }
    }

    /// Advance the provider, resampling the season value when at least
    /// `interval` ticks passed since the last sample.
    pub fn update_tick(&mut self, world_ticks: u64, interval: u64) {
        self.provider.update_tick(world_ticks);
        let due = self
            .last_sample_tick
            .is_none_or(|last| world_ticks.saturating_sub(last) >= interval || world_ticks < last);
        if due {
            self.season_value = self.provider.season_value(BlockPos::ORIGIN);
            self.last_sample_tick = Some(world_ticks);
            trace!(world_ticks, season_value = ?self.season_value, "season resampled");
        }
    }

    /// Last sampled season value.
    pub const fn season_value(&self) -> Option<f32> {
        self.season_value
    }

    /// The season provider.
    pub fn provider(&self) -> &dyn SeasonProvider {
        self.provider.as_ref()
    }

    /// The growth calculator.
    pub fn calculator(&self) -> &dyn SeasonGrowthCalculator {
        self.calculator.as_ref()
    }

    /// Growth multiplier at `season_value + offset`.
    pub fn growth_factor(&self, zone: ClimateZone, offset: f32) -> f32 {
        self.season_value
            .map_or(1.0, |value| self.calculator.calc_growth_rate(value + offset, zone))
    }

    /// Seed drop multiplier at `season_value + offset`.
    pub fn seed_drop_factor(&self, zone: ClimateZone, offset: f32) -> f32 {
        self.season_value
            .map_or(1.0, |value| self.calculator.calc_seed_drop_rate(value + offset, zone))
    }

    /// Fruit production multiplier at `season_value + offset`.
    pub fn fruit_production_factor(&self, zone: ClimateZone, offset: f32) -> f32 {
        self.season_value.map_or(1.0, |value| {
            self.calculator.calc_fruit_production(value + offset, zone)
        })
    }
}

// ---------------------------------------------------------------------------
// SeasonManager
// ---------------------------------------------------------------------------

/// Builds the provider and calculator for a region on first access.
pub type SeasonMapper =
    Box<dyn Fn(RegionId) -> (Box<dyn SeasonProvider>, Box<dyn SeasonGrowthCalculator>) + Send>;

/// Decides whether a position is tropical.
pub type TropicalPredicate = Box<dyn Fn(&dyn WorldAccess, BlockPos) -> bool + Send>;

/// Owner of all per-region season contexts.
pub struct SeasonManager {
    contexts: BTreeMap<RegionId, SeasonContext>,
    mapper: SeasonMapper,
    tropical: TropicalPredicate,
    update_interval: u64,
}

impl fmt::Debug for SeasonManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeasonManager")
            .field("contexts", &self.contexts)
            .field("update_interval", &self.update_interval)
            .finish_non_exhaustive()
    }
}

impl Default for SeasonManager {
    fn default() -> Self {
        Self::new(null_mapper(), 20)
    }
}

/// Mapper that gives every region the null provider and calculator.
pub fn null_mapper() -> SeasonMapper {
    Box::new(|_region| {
        (
            Box::new(NullSeasonProvider) as Box<dyn SeasonProvider>,
            Box::new(NullSeasonGrowthCalculator) as Box<dyn SeasonGrowthCalculator>,
        )
    })
}

/// Mapper that gives every region a clock provider and the default curves.
///
/// # Errors
///
/// Returns a [`ClockError`] if `config` cannot build a clock.
pub fn clock_mapper(config: &TimeConfig) -> Result<SeasonMapper, ClockError> {
    let template = ClockSeasonProvider::new(config)?;
    Ok(Box::new(move |_region| {
        (
            Box::new(template.clone()) as Box<dyn SeasonProvider>,
            Box::new(CurveSeasonGrowthCalculator::default()) as Box<dyn SeasonGrowthCalculator>,
        )
    }))
}

/// Default tropical test: biome temperature above 0.8.
pub fn default_tropical_predicate() -> TropicalPredicate {
    Box::new(|world, pos| world.biome(pos).temperature > TROPICAL_TEMPERATURE)
}

impl SeasonManager {
    /// Create a manager that builds contexts with `mapper` and resamples
    /// season values every `update_interval` ticks.
    pub fn new(mapper: SeasonMapper, update_interval: u64) -> Self {
        Self {
            contexts: BTreeMap::new(),
            mapper,
            tropical: default_tropical_predicate(),
            update_interval: update_interval.max(1),
        }
    }

    /// Build a manager from time configuration: clock-driven seasons when
    /// enabled, the null mapper otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ClockError`] if seasons are enabled and the
    /// configuration cannot build a clock.
    pub fn from_config(config: &TimeConfig) -> Result<Self, ClockError> {
        let mapper = if config.seasons_enabled {
            clock_mapper(config)?
        } else {
            null_mapper()
        };
        Ok(Self::new(mapper, config.season_update_interval))
    }

    /// Ticks between season value resamples.
    pub const fn update_interval(&self) -> u64 {
        self.update_interval
    }

    /// Replace the tropical test.
    pub fn set_tropical_predicate(&mut self, predicate: TropicalPredicate) {
        self.tropical = predicate;
    }

    /// Whether `pos` counts as tropical.
    pub fn is_tropical(&self, world: &dyn WorldAccess, pos: BlockPos) -> bool {
        (self.tropical)(world, pos)
    }

    fn zone(&self, world: &dyn WorldAccess, pos: BlockPos) -> ClimateZone {
        if self.is_tropical(world, pos) {
            ClimateZone::Tropical
        } else {
            ClimateZone::Temperate
        }
    }

    /// Context for `region`, created through the mapper on first access.
    pub fn context(&mut self, region: RegionId) -> &mut SeasonContext {
        let mapper = &self.mapper;
        self.contexts.entry(region).or_insert_with(|| {
            let (provider, calculator) = mapper(region);
            debug!(
                %region,
                provider = provider.kind(),
                calculator = calculator.kind(),
                "season context created"
            );
            SeasonContext::new(provider, calculator)
        })
    }

    /// Whether a context exists for `region`.
    pub fn has_context(&self, region: RegionId) -> bool {
        self.contexts.contains_key(&region)
    }

    /// Provider and calculator kinds of an existing context.
    pub fn context_kinds(&self, region: RegionId) -> Option<(&'static str, &'static str)> {
        self.contexts
            .get(&region)
            .map(|ctx| (ctx.provider.kind(), ctx.calculator.kind()))
    }

    /// Install an explicit provider and calculator for `region`, replacing
    /// any cached context.
    pub fn set_provider(
        &mut self,
        region: RegionId,
        provider: Box<dyn SeasonProvider>,
        calculator: Box<dyn SeasonGrowthCalculator>,
    ) {
        debug!(%region, provider = provider.kind(), calculator = calculator.kind(), "season provider set");
        self.contexts
            .insert(region, SeasonContext::new(provider, calculator));
    }

    /// Drop every cached context. The next access rebuilds them through the
    /// mapper.
    pub fn flush_mappings(&mut self) {
        debug!(contexts = self.contexts.len(), "season mappings flushed");
        self.contexts.clear();
    }

    /// Advance the season of `region` to `world_ticks`.
    pub fn update_tick(&mut self, region: RegionId, world_ticks: u64) {
        let interval = self.update_interval;
        self.context(region).update_tick(world_ticks, interval);
    }

    /// Current season value of `region`, if it has seasons.
    pub fn season_value(&mut self, region: RegionId, pos: BlockPos) -> Option<f32> {
        self.context(region).provider.season_value(pos)
    }

    /// Whether snow at `pos` in `region` should melt.
    pub fn should_snow_melt(&mut self, region: RegionId, biome: &Biome, pos: BlockPos) -> bool {
        self.context(region).provider.should_snow_melt(biome, pos)
    }

    /// Seasonal growth multiplier at `pos`.
    pub fn growth_factor(&mut self, world: &dyn WorldAccess, pos: BlockPos, offset: f32) -> f32 {
        let zone = self.zone(world, pos);
        self.context(world.region()).growth_factor(zone, offset)
    }

    /// Seasonal seed drop multiplier at `pos`.
    pub fn seed_drop_factor(&mut self, world: &dyn WorldAccess, pos: BlockPos, offset: f32) -> f32 {
        let zone = self.zone(world, pos);
        self.context(world.region()).seed_drop_factor(zone, offset)
    }

    /// Seasonal fruit production multiplier at `pos`.
    ///
    /// Without a world this falls back to
    /// [`fruit_production_factor_scan`](Self::fruit_production_factor_scan).
    pub fn fruit_production_factor(
        &mut self,
        world: Option<&dyn WorldAccess>,
        pos: BlockPos,
        offset: f32,
    ) -> f32 {
        match world {
            Some(world) => {
                let zone = self.zone(world, pos);
                self.context(world.region())
                    .fruit_production_factor(zone, offset)
            }
            None => self.fruit_production_factor_scan(pos, offset),
        }
    }

    /// Approximate fruit production for callers with no world at hand, such
    /// as item tooltips that scan a range of seasons.
    ///
    /// The position is read as a query, not a place: `x` names the region,
    /// `y / 64` is the season value and `z >= 1` selects the tropical curve.
    /// Returns 0.0 when the region has no context yet. Never creates one.
    #[allow(clippy::cast_precision_loss)]
    pub fn fruit_production_factor_scan(&self, pos: BlockPos, offset: f32) -> f32 {
        let Some(ctx) = self.contexts.get(&RegionId(pos.x)) else {
            return 0.0;
        };
        let season_value = pos.y as f32 / SCAN_BLOCKS_PER_SEASON;
        let zone = if pos.z >= 1 {
            ClimateZone::Tropical
        } else {
            ClimateZone::Temperate
        };
        ctx.calculator
            .calc_fruit_production(season_value + offset, zone)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use canopy_world::InMemoryWorld;

    use super::*;

    fn world_with(biome: Biome) -> InMemoryWorld {
        InMemoryWorld::new(RegionId::OVERWORLD, 0, 63, biome).unwrap()
    }

    fn clock_manager() -> SeasonManager {
        let config = TimeConfig {
            ticks_per_season: 10,
            ..TimeConfig::default()
        };
        SeasonManager::from_config(&config).unwrap()
    }

    #[test]
    fn null_regions_have_neutral_factors() {
        let mut manager = SeasonManager::default();
        let world = world_with(Biome::forest());
        let pos = BlockPos::new(0, 5, 0);
        assert!((manager.growth_factor(&world, pos, 0.0) - 1.0).abs() < f32::EPSILON);
        assert!((manager.seed_drop_factor(&world, pos, 0.5) - 1.0).abs() < f32::EPSILON);
        assert!(
            (manager.fruit_production_factor(Some(&world), pos, 0.0) - 1.0).abs() < f32::EPSILON
        );
        assert_eq!(manager.season_value(RegionId::OVERWORLD, pos), None);
    }

    #[test]
    fn contexts_are_created_lazily_once() {
        let mut manager = clock_manager();
        assert!(!manager.has_context(RegionId::OVERWORLD));
        manager.update_tick(RegionId::OVERWORLD, 5);
        assert!(manager.has_context(RegionId::OVERWORLD));
        assert!(!manager.has_context(RegionId(-1)));
        assert_eq!(manager.contexts.len(), 1);
        manager.update_tick(RegionId::OVERWORLD, 6);
        assert_eq!(manager.contexts.len(), 1);
    }

    #[test]
    fn flush_rebuilds_same_kinds() {
        let mut manager = clock_manager();
        manager.update_tick(RegionId::OVERWORLD, 1);
        let before = manager.context_kinds(RegionId::OVERWORLD).unwrap();
        manager.flush_mappings();
        assert_eq!(manager.context_kinds(RegionId::OVERWORLD), None);
        manager.update_tick(RegionId::OVERWORLD, 2);
        assert_eq!(manager.context_kinds(RegionId::OVERWORLD), Some(before));
        assert_eq!(before, ("clock", "curve"));
    }

    #[test]
    fn explicit_provider_survives_until_flush() {
        let mut manager = clock_manager();
        manager.set_provider(
            RegionId(7),
            Box::new(NullSeasonProvider),
            Box::new(NullSeasonGrowthCalculator),
        );
        assert_eq!(manager.context_kinds(RegionId(7)), Some(("null", "null")));
        manager.flush_mappings();
        manager.update_tick(RegionId(7), 0);
        assert_eq!(manager.context_kinds(RegionId(7)), Some(("clock", "curve")));
    }

    #[test]
    fn season_value_is_resampled_on_interval() {
        let mut manager = clock_manager();
        let region = RegionId::OVERWORLD;
        manager.update_tick(region, 0);
        let first = manager.context(region).season_value().unwrap();
        // Within the 20-tick interval the cached value holds.
        manager.update_tick(region, 15);
        let cached = manager.context(region).season_value().unwrap();
        assert!((first - cached).abs() < f32::EPSILON);
        manager.update_tick(region, 20);
        let fresh = manager.context(region).season_value().unwrap();
        assert!((fresh - 2.0).abs() < 1e-5);
    }

    #[test]
    fn tropical_predicate_selects_curve() {
        let mut manager = clock_manager();
        let region = RegionId::OVERWORLD;
        // Winter: temperate growth curve bottoms out, tropical does not.
        manager.update_tick(region, 35);
        let pos = BlockPos::new(0, 5, 0);
        let temperate = manager.growth_factor(&world_with(Biome::forest()), pos, 0.0);
        let tropical = manager.growth_factor(&world_with(Biome::jungle()), pos, 0.0);
        assert!(tropical > temperate);

        manager.set_tropical_predicate(Box::new(|_, _| false));
        let forced = manager.growth_factor(&world_with(Biome::jungle()), pos, 0.0);
        assert!((forced - temperate).abs() < f32::EPSILON);
    }

    #[test]
    fn scan_mode_needs_existing_context_and_is_idempotent() {
        let mut manager = clock_manager();
        let query = BlockPos::new(0, 128, 0);
        assert!(manager.fruit_production_factor(None, query, 0.0).abs() < f32::EPSILON);
        assert!(!manager.has_context(RegionId::OVERWORLD));

        manager.update_tick(RegionId::OVERWORLD, 0);
        let first = manager.fruit_production_factor(None, query, 0.0);
        let second = manager.fruit_production_factor(None, query, 0.0);
        assert!((first - second).abs() < f32::EPSILON);
        // y = 128 reads as season value 2.0: peak temperate fruit.
        assert!((first - 1.0).abs() < 1e-5);

        let tropical = manager.fruit_production_factor_scan(BlockPos::new(0, 0, 1), 0.0);
        assert!((tropical - 0.5).abs() < 1e-5);
    }

    #[test]
    fn snow_melts_in_warm_seasons() {
        let mut manager = clock_manager();
        let region = RegionId::OVERWORLD;
        let taiga = Biome::taiga();
        manager.update_tick(region, 12);
        assert!(manager.should_snow_melt(region, &taiga, BlockPos::ORIGIN));
        manager.update_tick(region, 35);
        assert!(!manager.should_snow_melt(region, &taiga, BlockPos::ORIGIN));
        assert!(manager.should_snow_melt(region, &Biome::jungle(), BlockPos::ORIGIN));
        assert!(!SeasonManager::default().should_snow_melt(region, &taiga, BlockPos::ORIGIN));
    }
}
