//! Species definitions, validation, and the species registry.
//!
//! A [`SpeciesDefinition`] is plain configuration data. Registering it
//! validates every coefficient and freezes it into an immutable [`Species`],
//! shared by `Arc` with every tree of that species. Rejected definitions
//! never become active.
//!
//! # Growth factor
//!
//! [`compute_growth_factor`] multiplies the species' growth rate by the
//! environment factor of every biome tag present. Tags without a factor
//! count as 1.0, so the result is independent of tag order and of
//! unrelated tags.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use canopy_types::{Biome, BiomeTag, BlockKind, BlockPos, BlockState, ResourceKey};
use canopy_world::{
    CellKit, LeavesProperties, NULL_FAMILY, NULL_PROPERTIES, TreeFamily, WorldAccess,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GrowthConfig;
use crate::drops::{DropKind, DropRule};
use crate::features::GenFeature;
use crate::rot::{RotParameters, RotTransition};

/// Errors raised when registering a species.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// The species key is empty.
    #[error("species key must not be empty")]
    EmptyKey,

    /// A species with this key is already registered.
    #[error("species {key} is already registered")]
    Duplicate {
        /// Offending key.
        key: ResourceKey,
    },

    /// A growth coefficient is out of range.
    #[error("species {key}: {field} = {value} is out of range")]
    InvalidParameter {
        /// Species key.
        key: ResourceKey,
        /// Coefficient name.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },

    /// An environment factor is negative or not finite.
    #[error("species {key}: environment factor {value} for {tag:?} is invalid")]
    InvalidEnvFactor {
        /// Species key.
        key: ResourceKey,
        /// Biome tag.
        tag: BiomeTag,
        /// Rejected value.
        value: f32,
    },

    /// A drop rule is malformed.
    #[error("species {key}: invalid drop rule: {reason}")]
    InvalidDropRule {
        /// Species key.
        key: ResourceKey,
        /// What is wrong.
        reason: String,
    },

    /// A generation feature is malformed.
    #[error("species {key}: invalid feature: {reason}")]
    InvalidFeature {
        /// Species key.
        key: ResourceKey,
        /// What is wrong.
        reason: String,
    },

    /// The species borrows the seed of a species that is not registered.
    #[error("species {key} takes its seed from unknown species {source_species}")]
    UnknownSeedSource {
        /// Species key.
        key: ResourceKey,
        /// Missing seed donor.
        source_species: ResourceKey,
    },
}

// ---------------------------------------------------------------------------
// Definition types
// ---------------------------------------------------------------------------

/// Immutable growth coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParameters {
    /// How quickly branch radius thins toward the tip.
    #[serde(default = "default_tapering")]
    pub tapering: f32,
    /// Maximum trunk length in blocks.
    #[serde(default = "default_signal_energy")]
    pub signal_energy: f32,
    /// Weight of extending the trunk over filling out the canopy.
    #[serde(default = "default_up_probability")]
    pub up_probability: u32,
    /// Trunk segments below this height carry no leaves.
    #[serde(default = "default_lowest_branch_height")]
    pub lowest_branch_height: u32,
    /// Base growth chance multiplier.
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f32,
    /// Growth steps per unit of soil life consumed.
    #[serde(default = "default_soil_longevity")]
    pub soil_longevity: u32,
    /// Offset added to the season value when sampling seasonal factors.
    #[serde(default)]
    pub season_offset: f32,
}

impl GrowthParameters {
    /// Parameters from the five basic coefficients, other fields default.
    pub const fn basic(
        tapering: f32,
        signal_energy: f32,
        up_probability: u32,
        lowest_branch_height: u32,
        growth_rate: f32,
    ) -> Self {
        Self {
            tapering,
            signal_energy,
            up_probability,
            lowest_branch_height,
            growth_rate,
            soil_longevity: default_soil_longevity(),
            season_offset: 0.0,
        }
    }
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self::basic(
            default_tapering(),
            default_signal_energy(),
            default_up_probability(),
            default_lowest_branch_height(),
            default_growth_rate(),
        )
    }
}

const fn default_tapering() -> f32 {
    0.3
}

const fn default_signal_energy() -> f32 {
    16.0
}

const fn default_up_probability() -> u32 {
    2
}

const fn default_lowest_branch_height() -> u32 {
    3
}

const fn default_growth_rate() -> f32 {
    1.0
}

const fn default_soil_longevity() -> u32 {
    8
}

/// A test over a biome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BiomePredicate {
    /// Every biome passes.
    #[default]
    Always,
    /// No biome passes.
    Never,
    /// Biomes carrying every listed tag.
    HasAllTags {
        /// Required tags.
        tags: Vec<BiomeTag>,
    },
    /// Biomes carrying at least one listed tag.
    HasAnyTag {
        /// Accepted tags.
        tags: Vec<BiomeTag>,
    },
    /// Exactly one biome.
    IsBiome {
        /// Biome key.
        key: ResourceKey,
    },
}

impl BiomePredicate {
    /// Evaluate against `biome`.
    pub fn test(&self, biome: &Biome) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::HasAllTags { tags } => tags.iter().all(|tag| biome.has_tag(*tag)),
            Self::HasAnyTag { tags } => tags.iter().any(|tag| biome.has_tag(*tag)),
            Self::IsBiome { key } => biome.key == *key,
        }
    }
}

/// Permits water as soil inside biomes with a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSoilOverride {
    /// Tag the biome must carry.
    pub required_tag: BiomeTag,
}

/// Soil acceptability rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilRule {
    /// Blocks a tree may root in.
    #[serde(default = "default_soil_kinds")]
    pub acceptable: BTreeSet<BlockKind>,
    /// World generation override for shallow water.
    #[serde(default)]
    pub water_override: Option<WaterSoilOverride>,
}

impl Default for SoilRule {
    fn default() -> Self {
        Self {
            acceptable: default_soil_kinds(),
            water_override: None,
        }
    }
}

fn default_soil_kinds() -> BTreeSet<BlockKind> {
    [
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Podzol,
        BlockKind::RootySoil,
    ]
    .into_iter()
    .collect()
}

/// Where a species' seed comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    /// The species has its own seed item.
    #[default]
    Own,
    /// The species drops another species' seed.
    Species(ResourceKey),
    /// The species has no seed.
    None,
}

/// Leaves settings of a species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavesDefinition {
    /// Foliage cell behavior.
    #[serde(default)]
    pub cell_kit: CellKit,
    /// Override of the light a new leaf position needs.
    #[serde(default)]
    pub light_requirement: Option<u8>,
}

/// Configuration form of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    /// Species key.
    pub key: ResourceKey,
    /// Family key.
    pub family: ResourceKey,
    /// Whether the family grows thick trunks.
    #[serde(default)]
    pub thick: bool,
    /// Whether the family resists fire.
    #[serde(default)]
    pub fire_proof: bool,
    /// Whether this is the family's common species.
    #[serde(default)]
    pub common: bool,
    /// Growth coefficients.
    #[serde(default)]
    pub growth: GrowthParameters,
    /// Biome tag multipliers on growth.
    #[serde(default)]
    pub env_factors: BTreeMap<BiomeTag, f32>,
    /// Leaves settings.
    #[serde(default)]
    pub leaves: LeavesDefinition,
    /// Soil rules.
    #[serde(default)]
    pub soil: SoilRule,
    /// Biomes the species thrives in.
    #[serde(default)]
    pub perfect_biome: BiomePredicate,
    /// Biomes world generation may place the species in.
    #[serde(default)]
    pub spawn_biome: BiomePredicate,
    /// Rot behavior.
    #[serde(default)]
    pub rot: RotParameters,
    /// Drop table.
    #[serde(default)]
    pub drops: Vec<DropRule>,
    /// Decorative features.
    #[serde(default)]
    pub features: Vec<GenFeature>,
    /// Seed item source.
    #[serde(default)]
    pub seed: SeedSource,
}

impl SpeciesDefinition {
    /// A definition with every optional field at its default.
    pub fn new(key: ResourceKey, family: ResourceKey) -> Self {
        Self {
            key,
            family,
            thick: false,
            fire_proof: false,
            common: false,
            growth: GrowthParameters::default(),
            env_factors: BTreeMap::new(),
            leaves: LeavesDefinition::default(),
            soil: SoilRule::default(),
            perfect_biome: BiomePredicate::Always,
            spawn_biome: BiomePredicate::Always,
            rot: RotParameters::default(),
            drops: Vec::new(),
            features: Vec::new(),
            seed: SeedSource::Own,
        }
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.key.is_empty() || self.family.is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        let invalid = |field: &'static str, value: f32| RegistryError::InvalidParameter {
            key: self.key.clone(),
            field,
            value,
        };
        let g = &self.growth;
        if !g.growth_rate.is_finite() || g.growth_rate < 0.0 {
            return Err(invalid("growth_rate", g.growth_rate));
        }
        if !g.signal_energy.is_finite() || g.signal_energy <= 0.0 {
            return Err(invalid("signal_energy", g.signal_energy));
        }
        if !g.tapering.is_finite() || g.tapering < 0.0 {
            return Err(invalid("tapering", g.tapering));
        }
        if g.soil_longevity == 0 {
            return Err(invalid("soil_longevity", 0.0));
        }
        if !g.season_offset.is_finite() {
            return Err(invalid("season_offset", g.season_offset));
        }
        if !(0.0..=1.0).contains(&self.rot.chance) {
            return Err(invalid("rot.chance", self.rot.chance));
        }
        for (&tag, &value) in &self.env_factors {
            if !value.is_finite() || value < 0.0 {
                return Err(RegistryError::InvalidEnvFactor {
                    key: self.key.clone(),
                    tag,
                    value,
                });
            }
        }
        for rule in &self.drops {
            rule.validate().map_err(|reason| RegistryError::InvalidDropRule {
                key: self.key.clone(),
                reason,
            })?;
        }
        for feature in &self.features {
            feature.validate().map_err(|reason| RegistryError::InvalidFeature {
                key: self.key.clone(),
                reason,
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// Feature toggles that change species behavior at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureToggles {
    /// Swamp oaks may root in shallow swamp water during world generation.
    pub swamp_oaks_in_water: bool,
    /// The apple oak is registered.
    pub apple_trees: bool,
    /// World generation is active.
    pub world_gen: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            swamp_oaks_in_water: true,
            apple_trees: true,
            world_gen: true,
        }
    }
}

impl FeatureToggles {
    /// Toggles from growth configuration.
    pub const fn from_config(config: &GrowthConfig) -> Self {
        Self {
            swamp_oaks_in_water: config.enable_swamp_oaks_in_water,
            apple_trees: config.enable_apple_trees,
            world_gen: config.world_gen,
        }
    }
}

/// A registered, validated species.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    key: ResourceKey,
    family: TreeFamily,
    common: bool,
    growth: GrowthParameters,
    env_factors: BTreeMap<BiomeTag, f32>,
    leaves: LeavesProperties,
    soil: SoilRule,
    perfect_biome: BiomePredicate,
    spawn_biome: BiomePredicate,
    rot: RotParameters,
    drops: Vec<DropRule>,
    features: Vec<GenFeature>,
    seed_item: Option<ResourceKey>,
}

impl Species {
    /// Species key.
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Owning family.
    pub const fn family(&self) -> &TreeFamily {
        &self.family
    }

    /// Whether this is the family's common species.
    pub const fn is_common(&self) -> bool {
        self.common
    }

    /// Growth coefficients.
    pub const fn growth(&self) -> &GrowthParameters {
        &self.growth
    }

    /// Environment factor for `tag`, 1.0 when unset.
    pub fn env_factor(&self, tag: BiomeTag) -> f32 {
        self.env_factors.get(&tag).copied().unwrap_or(1.0)
    }

    /// Leaves properties bound to the family.
    pub const fn leaves(&self) -> &LeavesProperties {
        &self.leaves
    }

    /// Rot behavior.
    pub const fn rot(&self) -> &RotParameters {
        &self.rot
    }

    /// Drop table.
    pub fn drops(&self) -> &[DropRule] {
        &self.drops
    }

    /// Decorative features.
    pub fn features(&self) -> &[GenFeature] {
        &self.features
    }

    /// Seed item, if the species has one.
    pub const fn seed_item(&self) -> Option<&ResourceKey> {
        self.seed_item.as_ref()
    }

    /// Whether the species thrives in `biome`.
    pub fn is_biome_perfect(&self, biome: &Biome) -> bool {
        self.perfect_biome.test(biome)
    }

    /// Whether world generation may place the species in `biome`.
    pub fn can_spawn_in(&self, biome: &Biome) -> bool {
        self.spawn_biome.test(biome)
    }

    /// Whether `soil` at `pos` is a base soil for this species.
    pub fn is_acceptable_soil(&self, _world: &dyn WorldAccess, _pos: BlockPos, soil: BlockState) -> bool {
        self.soil.acceptable.contains(&soil.kind)
    }

    /// Base soil check plus world generation overrides.
    ///
    /// Water is accepted when the toggle allows it, the biome at `pos`
    /// carries the override's tag, and the block beneath is base soil.
    pub fn is_acceptable_soil_for_worldgen(
        &self,
        world: &dyn WorldAccess,
        pos: BlockPos,
        soil: BlockState,
        toggles: &FeatureToggles,
    ) -> bool {
        if self.is_acceptable_soil(world, pos, soil) {
            return true;
        }
        match self.soil.water_override {
            Some(rule) if soil.kind == BlockKind::Water && toggles.swamp_oaks_in_water => {
                let below = pos.down();
                world.biome(pos).has_tag(rule.required_tag)
                    && self.is_acceptable_soil(world, below, world.block_state(below))
            }
            _ => false,
        }
    }
}

/// Growth factor of `species` among `tags`: growth rate times every
/// matching environment factor.
pub fn compute_growth_factor(species: &Species, tags: &BTreeSet<BiomeTag>) -> f32 {
    tags.iter()
        .fold(species.growth.growth_rate, |factor, &tag| factor * species.env_factor(tag))
}

/// Growth factor of `species` at `pos`.
pub fn growth_factor_at(species: &Species, world: &dyn WorldAccess, pos: BlockPos) -> f32 {
    compute_growth_factor(species, &world.biome(pos).tags)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Outcome of a bulk registration.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Keys that entered the active set.
    pub accepted: Vec<ResourceKey>,
    /// Definitions turned away, with the reason.
    pub rejected: Vec<(ResourceKey, RegistryError)>,
}

/// The active species set.
#[derive(Debug, Default)]
pub struct SpeciesRegistry {
    species: BTreeMap<ResourceKey, Arc<Species>>,
    common: BTreeMap<ResourceKey, ResourceKey>,
}

impl SpeciesRegistry {
    /// Validate and activate a definition.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] describing the first problem found; the
    /// registry is left unchanged.
    pub fn register(&mut self, def: SpeciesDefinition) -> Result<Arc<Species>, RegistryError> {
        def.validate()?;
        if self.species.contains_key(&def.key) {
            return Err(RegistryError::Duplicate { key: def.key });
        }
        let seed_item = match &def.seed {
            SeedSource::Own => Some(def.key.with_prefix("seed/")),
            SeedSource::None => None,
            SeedSource::Species(donor) => {
                let donor_species = self.species.get(donor).ok_or_else(|| {
                    RegistryError::UnknownSeedSource {
                        key: def.key.clone(),
                        source_species: donor.clone(),
                    }
                })?;
                donor_species.seed_item.clone()
            }
        };

        let family = TreeFamily {
            key: def.family.clone(),
            thick: def.thick,
            fire_proof: def.fire_proof,
        };
        let mut leaves = LeavesProperties::new(def.leaves.cell_kit).with_family(&family);
        if let Some(light) = def.leaves.light_requirement {
            leaves = leaves.with_light_requirement(light);
        }

        let species = Arc::new(Species {
            key: def.key,
            family,
            common: def.common,
            growth: def.growth,
            env_factors: def.env_factors,
            leaves,
            soil: def.soil,
            perfect_biome: def.perfect_biome,
            spawn_biome: def.spawn_biome,
            rot: def.rot,
            drops: def.drops,
            features: def.features,
            seed_item,
        });
        if species.common || !self.common.contains_key(&species.family.key) {
            self.common
                .insert(species.family.key.clone(), species.key.clone());
        }
        self.species
            .insert(species.key.clone(), Arc::clone(&species));
        debug!(species = %species.key, family = %species.family.key, "species registered");
        Ok(species)
    }

    /// Register every definition, logging and skipping rejected ones.
    pub fn register_all(&mut self, defs: impl IntoIterator<Item = SpeciesDefinition>) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for def in defs {
            let key = def.key.clone();
            match self.register(def) {
                Ok(_) => report.accepted.push(key),
                Err(err) => {
                    warn!(species = %key, error = %err, "species definition rejected");
                    report.rejected.push((key, err));
                }
            }
        }
        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "species registration complete"
        );
        report
    }

    /// Look up a species.
    pub fn get(&self, key: &ResourceKey) -> Option<&Arc<Species>> {
        self.species.get(key)
    }

    /// The common species of `family`: the one flagged common, or else the
    /// first registered.
    pub fn common_species(&self, family: &ResourceKey) -> Option<&Arc<Species>> {
        self.common.get(family).and_then(|key| self.species.get(key))
    }

    /// Family `key`, or [`NULL_FAMILY`] when no active species belongs to it.
    pub fn family(&self, key: &ResourceKey) -> &TreeFamily {
        self.common_species(key).map_or(&NULL_FAMILY, |species| species.family())
    }

    /// Leaves of family `key`, taken from its common species, or
    /// [`NULL_PROPERTIES`] for an unknown family.
    pub fn leaves_properties(&self, key: &ResourceKey) -> &LeavesProperties {
        self.common_species(key).map_or(&NULL_PROPERTIES, |species| species.leaves())
    }

    /// The species a seed item grows into. Species owning the seed win over
    /// species that borrow it.
    pub fn species_for_seed(&self, item: &ResourceKey) -> Option<&Arc<Species>> {
        let mut holders = self
            .species
            .values()
            .filter(|species| species.seed_item.as_ref() == Some(item));
        let first = holders.next()?;
        if first.seed_item.as_ref() == Some(&first.key.with_prefix("seed/")) {
            return Some(first);
        }
        holders
            .find(|species| species.seed_item.as_ref() == Some(&species.key.with_prefix("seed/")))
            .or(Some(first))
    }

    /// Number of active species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Whether no species are active.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Iterate over active species in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Species>> {
        self.species.values()
    }
}

// ---------------------------------------------------------------------------
// Built-in species
// ---------------------------------------------------------------------------

fn canopy_key(path: &str) -> ResourceKey {
    ResourceKey::new(ResourceKey::DEFAULT_NAMESPACE, path)
}

/// The built-in oak family plus a thick-trunk test species.
///
/// The apple oak is only included when apple trees are enabled; otherwise
/// plain oaks drop apples themselves during world generation.
pub fn builtin_species(toggles: &FeatureToggles) -> Vec<SpeciesDefinition> {
    let oak_family = canopy_key("oak");
    let mut defs = Vec::new();

    let mut oak = SpeciesDefinition::new(canopy_key("oak"), oak_family.clone());
    oak.common = true;
    oak.growth = GrowthParameters::basic(0.3, 12.0, 2, 3, 0.8);
    oak.env_factors = BTreeMap::from([
        (BiomeTag::Cold, 0.75),
        (BiomeTag::Hot, 0.5),
        (BiomeTag::Dry, 0.5),
        (BiomeTag::Forest, 1.05),
    ]);
    oak.perfect_biome = BiomePredicate::HasAllTags {
        tags: vec![BiomeTag::Forest, BiomeTag::Overworld],
    };
    oak.rot.transition = RotTransition::mushroom();
    oak.drops = vec![
        DropRule::new(DropKind::Seed, 1.0),
        DropRule::new(DropKind::Stick, 1.0),
    ];
    if toggles.world_gen && !toggles.apple_trees {
        oak.drops.push(DropRule::new(DropKind::Fruit, 1.0));
    }
    oak.features = vec![GenFeature::BeeNest { chance: 0.05 }];
    defs.push(oak);

    let mut swamp = SpeciesDefinition::new(canopy_key("swamp_oak"), oak_family.clone());
    swamp.growth = GrowthParameters::basic(0.3, 12.0, 2, 3, 0.8);
    swamp.env_factors = BTreeMap::from([(BiomeTag::Cold, 0.5), (BiomeTag::Dry, 0.5)]);
    swamp.perfect_biome = BiomePredicate::HasAnyTag {
        tags: vec![BiomeTag::Swamp],
    };
    swamp.spawn_biome = BiomePredicate::HasAnyTag {
        tags: vec![BiomeTag::Swamp],
    };
    swamp.soil.water_override = Some(WaterSoilOverride {
        required_tag: BiomeTag::Swamp,
    });
    swamp.rot.transition = RotTransition::mushroom();
    swamp.drops = vec![DropRule::new(DropKind::Seed, 1.0)];
    swamp.features = vec![GenFeature::Vines {
        max_length: 7,
        quantity: 24,
    }];
    swamp.seed = SeedSource::Species(canopy_key("oak"));
    defs.push(swamp);

    if toggles.apple_trees {
        let mut apple = SpeciesDefinition::new(canopy_key("apple_oak"), oak_family);
        apple.growth = GrowthParameters::basic(0.4, 10.0, 1, 4, 0.7);
        apple.env_factors = BTreeMap::from([
            (BiomeTag::Cold, 0.75),
            (BiomeTag::Hot, 0.75),
            (BiomeTag::Dry, 0.25),
        ]);
        apple.perfect_biome = BiomePredicate::IsBiome {
            key: ResourceKey::new("minecraft", "plains"),
        };
        apple.spawn_biome = BiomePredicate::HasAnyTag {
            tags: vec![BiomeTag::Plains],
        };
        // Apple oaks spread by fruit, never by dropped seeds.
        apple.features = vec![GenFeature::Fruit { ray_distance: 4 }];
        defs.push(apple);
    }

    let mut thick = SpeciesDefinition::new(canopy_key("thick_test"), canopy_key("thick_test"));
    thick.thick = true;
    thick.common = true;
    thick.growth = GrowthParameters {
        soil_longevity: 16,
        ..GrowthParameters::basic(0.3, 24.0, 4, 4, 1.0)
    };
    thick.spawn_biome = BiomePredicate::Never;
    thick.drops = vec![DropRule::new(DropKind::Seed, 1.0)];
    defs.push(thick);

    defs
}
