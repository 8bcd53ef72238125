//! Item drop resolution for harvest, voluntary, leaves-break, and
//! logs-break events.
//!
//! Every [`DropRule`] carries a rarity multiplier. Each trigger turns the
//! rarity into a probability its own way:
//!
//! | Trigger | Rule |
//! |---------|------|
//! | harvest | `rarity / 64` |
//! | voluntary | `rarity × seed_drop_rate × seasonal seed factor` |
//! | leaves-break | one in `⌊chance / rarity⌋`, `chance = 20` less fortune |
//! | logs-break | `⌊volume × rarity⌋` items, no roll |
//!
//! Fruit rules are additionally scaled by the seasonal fruit production
//! factor. Probabilities are clamped into `[0, 1]` before sampling, and a
//! rule with zero, negative, or non-finite rarity never drops anything.

use std::collections::BTreeSet;

use canopy_types::{BlockPos, DropTrigger, ItemStack, NodeId, ResourceKey};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::species::Species;

/// Base leaves-break chance denominator.
const LEAVES_BASE_CHANCE: i32 = 20;

/// Floor of the leaves-break denominator after fortune.
const LEAVES_MIN_CHANCE: i32 = 10;

/// Harvest chance divisor.
const HARVEST_DIVISOR: f32 = 64.0;

/// Item dropped by stick rules without an explicit item.
pub fn stick_item() -> ResourceKey {
    ResourceKey::new("minecraft", "stick")
}

/// Item dropped by fruit rules without an explicit item.
pub fn apple_item() -> ResourceKey {
    ResourceKey::new("minecraft", "apple")
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// What a rule drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropKind {
    /// The species' seed.
    Seed,
    /// Fruit, scaled by seasonal fruit production.
    Fruit,
    /// Sticks.
    Stick,
    /// An arbitrary item named by the rule.
    Item,
}

impl DropKind {
    /// Triggers a rule of this kind answers when it names none.
    pub fn default_triggers(self) -> BTreeSet<DropTrigger> {
        let triggers: &[DropTrigger] = match self {
            Self::Seed => &[
                DropTrigger::Harvest,
                DropTrigger::Voluntary,
                DropTrigger::LeavesBreak,
            ],
            Self::Fruit => &[DropTrigger::Harvest, DropTrigger::LeavesBreak],
            Self::Stick => &[DropTrigger::LeavesBreak, DropTrigger::LogsBreak],
            Self::Item => &DropTrigger::ALL,
        };
        triggers.iter().copied().collect()
    }
}

/// One entry of a species' drop table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropRule {
    /// What drops.
    pub kind: DropKind,
    /// Explicit item; required for [`DropKind::Item`].
    #[serde(default)]
    pub item: Option<ResourceKey>,
    /// Chance multiplier, `[0, ∞)`.
    #[serde(default = "default_rarity")]
    pub rarity: f32,
    /// Triggers the rule answers. Empty means the kind's defaults.
    #[serde(default)]
    pub triggers: BTreeSet<DropTrigger>,
}

const fn default_rarity() -> f32 {
    1.0
}

impl DropRule {
    /// A rule with the kind's default triggers.
    pub const fn new(kind: DropKind, rarity: f32) -> Self {
        Self {
            kind,
            item: None,
            rarity,
            triggers: BTreeSet::new(),
        }
    }

    /// Restrict the rule to explicit triggers.
    #[must_use]
    pub fn with_triggers(mut self, triggers: &[DropTrigger]) -> Self {
        self.triggers = triggers.iter().copied().collect();
        self
    }

    /// Drop a specific item.
    #[must_use]
    pub fn with_item(mut self, item: ResourceKey) -> Self {
        self.item = Some(item);
        self
    }

    /// Whether the rule answers `trigger`.
    pub fn applies_to(&self, trigger: DropTrigger) -> bool {
        if self.triggers.is_empty() {
            self.kind.default_triggers().contains(&trigger)
        } else {
            self.triggers.contains(&trigger)
        }
    }

    /// Check the rule. Returns a reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !self.rarity.is_finite() || self.rarity < 0.0 {
            return Err(format!("rarity {} must be finite and non-negative", self.rarity));
        }
        if self.kind == DropKind::Item && self.item.is_none() {
            return Err("item rules must name an item".to_owned());
        }
        Ok(())
    }

    /// Item this rule drops for `species`, if any.
    pub fn item_for(&self, species: &Species) -> Option<ResourceKey> {
        if let Some(item) = &self.item {
            return Some(item.clone());
        }
        match self.kind {
            DropKind::Seed => species.seed_item().cloned(),
            DropKind::Fruit => Some(apple_item()),
            DropKind::Stick => Some(stick_item()),
            DropKind::Item => None,
        }
    }

    fn usable_rarity(&self) -> Option<f32> {
        (self.rarity.is_finite() && self.rarity > 0.0).then_some(self.rarity)
    }
}

// ---------------------------------------------------------------------------
// Veto
// ---------------------------------------------------------------------------

/// A voluntary drop about to be committed.
#[derive(Debug)]
pub struct VoluntaryDropEvent<'a> {
    /// Tree dropping the items, when known.
    pub node: Option<NodeId>,
    /// Species key.
    pub species: &'a ResourceKey,
    /// Where the items drop.
    pub pos: BlockPos,
    /// The pending drops.
    pub drops: &'a [ItemStack],
}

/// Answer of a [`DropVeto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDecision {
    /// Let the drops through.
    Accept,
    /// Cancel every pending drop.
    Reject,
}

/// Pre-commit callback for voluntary drops.
pub trait DropVeto {
    /// Inspect a pending voluntary drop.
    fn review(&mut self, event: &VoluntaryDropEvent<'_>) -> DropDecision;
}

/// Veto that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl DropVeto for AcceptAll {
    fn review(&mut self, _event: &VoluntaryDropEvent<'_>) -> DropDecision {
        DropDecision::Accept
    }
}

impl<F> DropVeto for F
where
    F: FnMut(&VoluntaryDropEvent<'_>) -> DropDecision,
{
    fn review(&mut self, event: &VoluntaryDropEvent<'_>) -> DropDecision {
        self(event)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Inputs that vary per drop event.
#[derive(Debug, Clone, Copy)]
pub struct DropContext {
    /// Tree the drops come from.
    pub node: Option<NodeId>,
    /// Where the event happens.
    pub pos: BlockPos,
    /// Fortune level of the breaking tool.
    pub fortune: u32,
    /// Wood volume of a felled tree, in blocks.
    pub volume: f32,
    /// Seasonal seed drop multiplier.
    pub seed_factor: f32,
    /// Seasonal fruit production multiplier.
    pub fruit_factor: f32,
}

impl DropContext {
    /// A context at `pos` with neutral seasonal factors.
    pub const fn at(pos: BlockPos) -> Self {
        Self {
            node: None,
            pos,
            fortune: 0,
            volume: 0.0,
            seed_factor: 1.0,
            fruit_factor: 1.0,
        }
    }
}

/// Resolves drop rules into item stacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTable {
    seed_drop_rate: f32,
}

impl DropTable {
    /// Create a table with the configured voluntary seed drop rate.
    pub const fn new(seed_drop_rate: f32) -> Self {
        Self { seed_drop_rate }
    }

    /// Configured voluntary seed drop rate.
    pub const fn seed_drop_rate(&self) -> f32 {
        self.seed_drop_rate
    }

    /// Roll every rule of `species` that answers `trigger`.
    ///
    /// Voluntary drops are shown to `veto` before they are returned; a
    /// rejection clears the whole list.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        trigger: DropTrigger,
        species: &Species,
        ctx: &DropContext,
        rng: &mut R,
        veto: &mut dyn DropVeto,
    ) -> Vec<ItemStack> {
        let mut drops = Vec::new();
        for rule in species.drops().iter().filter(|rule| rule.applies_to(trigger)) {
            let Some(rarity) = rule.usable_rarity() else {
                continue;
            };
            let rarity = if rule.kind == DropKind::Fruit {
                rarity * ctx.fruit_factor
            } else {
                rarity
            };
            if !rarity.is_finite() || rarity <= 0.0 {
                continue;
            }
            let count = match trigger {
                DropTrigger::Harvest => u32::from(roll(rarity / HARVEST_DIVISOR, rng)),
                DropTrigger::Voluntary => u32::from(roll(
                    rarity * self.seed_drop_rate * ctx.seed_factor.max(0.0),
                    rng,
                )),
                DropTrigger::LeavesBreak => u32::from(leaves_roll(rarity, ctx.fortune, rng)),
                DropTrigger::LogsBreak => logs_count(rarity, ctx.volume),
            };
            if count == 0 {
                continue;
            }
            if let Some(item) = rule.item_for(species) {
                drops.push(ItemStack::new(item, count));
            }
        }

        if trigger == DropTrigger::Voluntary && !drops.is_empty() {
            let event = VoluntaryDropEvent {
                node: ctx.node,
                species: species.key(),
                pos: ctx.pos,
                drops: &drops,
            };
            if veto.review(&event) == DropDecision::Reject {
                debug!(species = %species.key(), pos = %ctx.pos, vetoed = drops.len(), "voluntary drop vetoed");
                drops.clear();
            }
        }
        drops
    }
}

fn roll<R: Rng + ?Sized>(chance: f32, rng: &mut R) -> bool {
    if !chance.is_finite() || chance <= 0.0 {
        return false;
    }
    chance.min(1.0) > rng.random::<f32>()
}

/// Denominator of the leaves-break roll for a fortune level.
pub fn leaves_chance(fortune: u32) -> i32 {
    if fortune == 0 {
        return LEAVES_BASE_CHANCE;
    }
    let bonus = 2_i32.checked_shl(fortune.min(16)).unwrap_or(i32::MAX);
    LEAVES_BASE_CHANCE
        .saturating_sub(bonus)
        .max(LEAVES_MIN_CHANCE)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn leaves_roll<R: Rng + ?Sized>(rarity: f32, fortune: u32, rng: &mut R) -> bool {
    let bound = (leaves_chance(fortune) as f32 / rarity).floor();
    let bound = if bound.is_finite() && bound >= 1.0 {
        // Saturating float-to-int cast.
        bound.min(i32::MAX as f32) as i32
    } else {
        1
    };
    rng.random_range(0..bound) == 0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn logs_count(rarity: f32, volume: f32) -> u32 {
    let count = (volume * rarity).floor();
    if !count.is_finite() || count <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast.
    count as u32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::species::{SpeciesDefinition, SpeciesRegistry};

    fn species_with(drops: Vec<DropRule>) -> std::sync::Arc<Species> {
        let mut registry = SpeciesRegistry::default();
        let mut def = SpeciesDefinition::new(
            ResourceKey::new("canopy", "oak"),
            ResourceKey::new("canopy", "oak"),
        );
        def.drops = drops;
        registry.register(def).unwrap()
    }

    #[test]
    fn leaves_chance_follows_fortune() {
        assert_eq!(leaves_chance(0), 20);
        assert_eq!(leaves_chance(1), 16);
        assert_eq!(leaves_chance(2), 12);
        assert_eq!(leaves_chance(3), 10);
        assert_eq!(leaves_chance(40), 10);
    }

    #[test]
    fn zero_rarity_never_drops() {
        let rules = vec![
            DropRule::new(DropKind::Seed, 0.0),
            DropRule::new(DropKind::Fruit, 0.0),
            DropRule::new(DropKind::Stick, 0.0),
        ];
        let species = species_with(rules);
        let table = DropTable::new(1.0);
        let ctx = DropContext {
            volume: 100.0,
            fortune: 3,
            ..DropContext::at(BlockPos::ORIGIN)
        };
        for seed in 0..10_000 {
            let mut rng = SmallRng::seed_from_u64(seed);
            for trigger in DropTrigger::ALL {
                assert!(
                    table
                        .resolve(trigger, &species, &ctx, &mut rng, &mut AcceptAll)
                        .is_empty(),
                    "{trigger:?} dropped with seed {seed}"
                );
            }
        }
    }

    #[test]
    fn huge_rarity_harvest_always_drops() {
        let species = species_with(vec![DropRule::new(DropKind::Seed, 1_000.0)]);
        let table = DropTable::new(0.01);
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            let drops = table.resolve(
                DropTrigger::Harvest,
                &species,
                &DropContext::at(BlockPos::ORIGIN),
                &mut rng,
                &mut AcceptAll,
            );
            assert_eq!(drops.len(), 1);
            assert_eq!(drops.first().unwrap().item, *species.seed_item().unwrap());
        }
    }

    #[test]
    fn veto_clears_voluntary_drops() {
        let species = species_with(vec![DropRule::new(DropKind::Seed, 1.0)]);
        let table = DropTable::new(1.0);
        let ctx = DropContext::at(BlockPos::new(1, 2, 3));
        let mut seen = 0_usize;
        let mut reject = |event: &VoluntaryDropEvent<'_>| {
            seen = seen.saturating_add(event.drops.len());
            DropDecision::Reject
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let drops = table.resolve(DropTrigger::Voluntary, &species, &ctx, &mut rng, &mut reject);
        assert!(drops.is_empty());
        assert_eq!(seen, 1);

        let mut rng = SmallRng::seed_from_u64(11);
        let drops = table.resolve(DropTrigger::Voluntary, &species, &ctx, &mut rng, &mut AcceptAll);
        assert_eq!(drops.len(), 1);
    }

    #[test]
    fn voluntary_scales_with_season() {
        let species = species_with(vec![DropRule::new(DropKind::Seed, 1.0)]);
        let table = DropTable::new(1.0);
        let ctx = DropContext {
            seed_factor: 0.0,
            ..DropContext::at(BlockPos::ORIGIN)
        };
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..1_000 {
            assert!(
                table
                    .resolve(DropTrigger::Voluntary, &species, &ctx, &mut rng, &mut AcceptAll)
                    .is_empty()
            );
        }
    }

    #[test]
    fn logs_drop_volume_times_rarity() {
        let species = species_with(vec![DropRule::new(DropKind::Stick, 0.5)]);
        let table = DropTable::new(0.01);
        let ctx = DropContext {
            volume: 9.0,
            ..DropContext::at(BlockPos::ORIGIN)
        };
        let mut rng = SmallRng::seed_from_u64(0);
        let drops = table.resolve(DropTrigger::LogsBreak, &species, &ctx, &mut rng, &mut AcceptAll);
        assert_eq!(drops, vec![ItemStack::new(stick_item(), 4)]);
    }

    #[test]
    fn leaves_break_rate_is_about_one_in_twenty() {
        let species = species_with(vec![DropRule::new(DropKind::Seed, 1.0)]);
        let table = DropTable::new(0.01);
        let ctx = DropContext::at(BlockPos::ORIGIN);
        let mut rng = SmallRng::seed_from_u64(99);
        let hits = (0..20_000)
            .filter(|_| {
                !table
                    .resolve(DropTrigger::LeavesBreak, &species, &ctx, &mut rng, &mut AcceptAll)
                    .is_empty()
            })
            .count();
        assert!((800..1_200).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn fruit_is_silent_out_of_season() {
        let species = species_with(vec![DropRule::new(DropKind::Fruit, 50.0)]);
        let table = DropTable::new(0.01);
        let ctx = DropContext {
            fruit_factor: 0.0,
            ..DropContext::at(BlockPos::ORIGIN)
        };
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..1_000 {
            assert!(
                table
                    .resolve(DropTrigger::LeavesBreak, &species, &ctx, &mut rng, &mut AcceptAll)
                    .is_empty()
            );
        }
    }

    #[test]
    fn triggers_default_by_kind() {
        let seed = DropRule::new(DropKind::Seed, 1.0);
        assert!(seed.applies_to(DropTrigger::Voluntary));
        assert!(!seed.applies_to(DropTrigger::LogsBreak));
        let custom = DropRule::new(DropKind::Seed, 1.0).with_triggers(&[DropTrigger::LogsBreak]);
        assert!(custom.applies_to(DropTrigger::LogsBreak));
        assert!(!custom.applies_to(DropTrigger::Harvest));
        assert!(DropRule::new(DropKind::Item, 1.0).validate().is_err());
        assert!(DropRule::new(DropKind::Seed, f32::NAN).validate().is_err());
    }
}
