//! Decay of unsupported branch segments.
//!
//! A segment is a rot candidate when its soil is gone or its tree has no
//! foliage left (`rapid`), or when it has fewer structural connections than
//! its radius needs. Candidates decay with the species' rot chance; rapid
//! rot is certain. Species with a rot transition may turn a thick, dark
//! segment standing on rooty soil into a mushroom, converting the soil to
//! podzol.
//!
//! Evaluation is pure. [`apply`] performs the world mutation separately so
//! callers can collect outcomes first and commit them afterwards.

use canopy_types::{BlockKind, BlockPos, BlockState};
use canopy_world::{WorldAccess, flags};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::species::Species;

/// What a rotting segment may turn into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RotTransition {
    /// The segment simply disappears.
    #[default]
    None,
    /// Thick segments in deep shade over rooty soil become mushrooms and the
    /// soil becomes podzol.
    MushroomAndPodzol {
        /// Segments must be thicker than this.
        #[serde(default = "default_min_radius")]
        min_radius: u8,
        /// Sky light must be below this.
        #[serde(default = "default_max_sky_light")]
        max_sky_light: u8,
    },
}

impl RotTransition {
    /// The oak-style mushroom transition.
    pub const fn mushroom() -> Self {
        Self::MushroomAndPodzol {
            min_radius: default_min_radius(),
            max_sky_light: default_max_sky_light(),
        }
    }
}

const fn default_min_radius() -> u8 {
    4
}

const fn default_max_sky_light() -> u8 {
    4
}

/// Rot behavior of a species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotParameters {
    /// Chance an unsupported segment decays per evaluation.
    #[serde(default = "default_rot_chance")]
    pub chance: f32,
    /// Optional transformation on decay.
    #[serde(default)]
    pub transition: RotTransition,
}

const fn default_rot_chance() -> f32 {
    0.3
}

impl Default for RotParameters {
    fn default() -> Self {
        Self {
            chance: default_rot_chance(),
            transition: RotTransition::None,
        }
    }
}

/// Per-segment inputs of one rot evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotInput {
    /// Structural connections of the segment.
    pub neighbor_count: u8,
    /// Segment radius.
    pub radius: u8,
    /// Sky light at the segment.
    pub sky_light: u8,
    /// The tree lost its soil or all its foliage.
    pub rapid: bool,
    /// Rooty soil sits directly below the segment.
    pub rooty_below: bool,
}

/// Result of a rot evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotOutcome {
    /// Nothing happens.
    Intact,
    /// The segment is removed.
    Decayed,
    /// The segment and the soil under it are replaced.
    Transformed {
        /// Block replacing the segment.
        branch: BlockState,
        /// Block replacing the soil below.
        soil: BlockState,
    },
}

impl RotOutcome {
    /// Whether the segment is gone.
    pub const fn is_decayed(&self) -> bool {
        !matches!(self, Self::Intact)
    }
}

/// Connections a segment of `radius` needs to stay standing.
pub const fn required_support(radius: u8) -> u8 {
    if radius <= 1 { 1 } else { 2 }
}

/// Whether a segment is a rot candidate.
pub const fn conditions_met(input: &RotInput) -> bool {
    input.rapid || input.neighbor_count < required_support(input.radius)
}

/// Decide the fate of one segment.
pub fn evaluate<R: Rng + ?Sized>(species: &Species, input: &RotInput, rng: &mut R) -> RotOutcome {
    if !conditions_met(input) {
        return RotOutcome::Intact;
    }
    let params = species.rot();
    if !input.rapid && rng.random::<f32>() >= params.chance {
        return RotOutcome::Intact;
    }
    match params.transition {
        RotTransition::MushroomAndPodzol {
            min_radius,
            max_sky_light,
        } if input.radius > min_radius && input.sky_light < max_sky_light && input.rooty_below => {
            let mushroom = if rng.random_range(0..3) == 0 {
                BlockKind::RedMushroom
            } else {
                BlockKind::BrownMushroom
            };
            RotOutcome::Transformed {
                branch: BlockState::of(mushroom),
                soil: BlockState::of(BlockKind::Podzol),
            }
        }
        _ => RotOutcome::Decayed,
    }
}

/// Commit an outcome for the segment at `pos`. Returns whether the world
/// changed.
pub fn apply(world: &mut dyn WorldAccess, pos: BlockPos, outcome: &RotOutcome) -> bool {
    match *outcome {
        RotOutcome::Intact => false,
        RotOutcome::Decayed => world.set_block_state(pos, BlockState::AIR, flags::DEFAULT),
        RotOutcome::Transformed { branch, soil } => {
            let replaced = world.set_block_state(pos, branch, flags::DEFAULT);
            let below = pos.down();
            let soil_changed = world.block_state(below).is_rooty()
                && world.set_block_state(below, soil, flags::DEFAULT);
            if replaced || soil_changed {
                debug!(%pos, kind = ?branch.kind, "branch rotted into mushroom");
            }
            replaced || soil_changed
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use canopy_types::{Biome, RegionId};
    use canopy_world::InMemoryWorld;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::species::{FeatureToggles, SpeciesRegistry, builtin_species};

    fn oak() -> Arc<Species> {
        let mut registry = SpeciesRegistry::default();
        registry.register_all(builtin_species(&FeatureToggles::default()));
        registry
            .get(&canopy_types::ResourceKey::new("canopy", "oak"))
            .cloned()
            .unwrap()
    }

    fn input(neighbor_count: u8, radius: u8) -> RotInput {
        RotInput {
            neighbor_count,
            radius,
            sky_light: 15,
            rapid: false,
            rooty_below: false,
        }
    }

    #[test]
    fn support_requirement_is_non_decreasing() {
        let mut previous = 0;
        for radius in 0..=24 {
            let required = required_support(radius);
            assert!(required >= previous);
            previous = required;
        }
    }

    #[test]
    fn conditions_are_monotonic_in_radius() {
        for neighbors in 0..=6 {
            let mut seen_met = false;
            for radius in 1..=24 {
                let met = conditions_met(&input(neighbors, radius));
                assert!(!seen_met || met, "neighbors {neighbors} radius {radius}");
                seen_met |= met;
            }
        }
    }

    #[test]
    fn decay_is_monotonic_in_radius_for_fixed_seed() {
        let species = oak();
        for seed in 0..500 {
            for neighbors in 0..=3 {
                let mut seen = false;
                for radius in 1..=8 {
                    let mut rng = SmallRng::seed_from_u64(seed);
                    let decayed = evaluate(&species, &input(neighbors, radius), &mut rng).is_decayed();
                    assert!(!seen || decayed, "seed {seed} neighbors {neighbors} radius {radius}");
                    seen |= decayed;
                }
            }
        }
    }

    #[test]
    fn supported_segments_never_rot() {
        let species = oak();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert_eq!(evaluate(&species, &input(2, 5), &mut rng), RotOutcome::Intact);
            assert_eq!(evaluate(&species, &input(1, 1), &mut rng), RotOutcome::Intact);
        }
    }

    #[test]
    fn rapid_rot_is_certain() {
        let species = oak();
        let mut rng = SmallRng::seed_from_u64(8);
        let rapid = RotInput {
            rapid: true,
            ..input(6, 1)
        };
        for _ in 0..1_000 {
            assert!(evaluate(&species, &rapid, &mut rng).is_decayed());
        }
    }

    #[test]
    fn deep_decay_writes_mushroom_and_podzol_once() {
        let species = oak();
        let deep = RotInput {
            neighbor_count: 0,
            radius: 6,
            sky_light: 2,
            rapid: true,
            rooty_below: true,
        };
        let mut rng = SmallRng::seed_from_u64(21);
        let outcome = evaluate(&species, &deep, &mut rng);
        let (branch, soil) = match outcome {
            RotOutcome::Transformed { branch, soil } => (branch, soil),
            RotOutcome::Intact | RotOutcome::Decayed => (BlockState::AIR, BlockState::AIR),
        };
        assert!(matches!(
            branch.kind,
            BlockKind::RedMushroom | BlockKind::BrownMushroom
        ));
        assert_eq!(soil.kind, BlockKind::Podzol);

        let mut world = InMemoryWorld::new(RegionId::OVERWORLD, 0, 63, Biome::forest()).unwrap();
        let pos = BlockPos::new(0, 5, 0);
        world.set_block_state(pos.down(), BlockState::rooty_soil(10), flags::DEFAULT);
        world.set_block_state(pos, BlockState::branch(6), flags::DEFAULT);
        assert!(apply(&mut world, pos, &outcome));
        assert_eq!(world.block_state(pos), branch);
        assert_eq!(world.block_state(pos.down()).kind, BlockKind::Podzol);
        let updates = world.block_updates();
        assert!(!apply(&mut world, pos, &outcome));
        assert_eq!(world.block_updates(), updates);
    }

    #[test]
    fn bright_or_thin_segments_just_vanish() {
        let species = oak();
        let mut rng = SmallRng::seed_from_u64(2);
        let bright = RotInput {
            neighbor_count: 0,
            radius: 6,
            sky_light: 15,
            rapid: true,
            rooty_below: true,
        };
        assert_eq!(evaluate(&species, &bright, &mut rng), RotOutcome::Decayed);
        let thin = RotInput {
            radius: 4,
            sky_light: 0,
            ..bright
        };
        assert_eq!(evaluate(&species, &thin, &mut rng), RotOutcome::Decayed);
    }

    #[test]
    fn mushroom_colors_are_mixed() {
        let species = oak();
        let deep = RotInput {
            neighbor_count: 0,
            radius: 8,
            sky_light: 0,
            rapid: true,
            rooty_below: true,
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let mut red = 0_u32;
        for _ in 0..3_000 {
            if let RotOutcome::Transformed { branch, .. } = evaluate(&species, &deep, &mut rng)
                && branch.kind == BlockKind::RedMushroom
            {
                red = red.saturating_add(1);
            }
        }
        assert!((800..1_200).contains(&red), "red = {red}");
    }
}
