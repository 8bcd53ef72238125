//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`run_tick`] until a bound is hit:
//!
//! - **Bounded simulation**: stop after `max_ticks` (0 runs until extinction)
//! - **Extinction**: stop when no tree is left alive
//! - **Tick pacing**: sleep `tick_interval_ms` between ticks
//!
//! [`run_tick`]: crate::tick::run_tick

use serde::Serialize;
use tracing::{info, warn};

use crate::config::WorldConfig;
use crate::drops::DropVeto;
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Failures that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick could not complete.
    #[error("tick failed: {source}")]
    Tick {
        /// Cause.
        #[from]
        source: TickError,
    },
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// Every tree died.
    Extinction,
}

/// Limits and pacing of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBounds {
    /// Stop after this tick (0 = no limit).
    pub max_ticks: u64,
    /// Real-time delay between ticks in milliseconds.
    pub tick_interval_ms: u64,
}

impl RunBounds {
    /// Bounds from world configuration.
    pub const fn from_config(config: &WorldConfig) -> Self {
        Self {
            max_ticks: config.max_ticks,
            tick_interval_ms: config.tick_interval_ms,
        }
    }

    const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }
}

/// Outcome of [`run_simulation`].
#[derive(Debug, Serialize)]
pub struct SimulationResult {
    /// Why the loop stopped.
    pub end_reason: SimulationEndReason,
    /// Summary of the final tick.
    pub final_summary: Option<TickSummary>,
    /// Ticks run by this call.
    pub total_ticks: u64,
}

/// Observer notified after every tick.
pub trait TickCallback: Send {
    /// Inspect the finished tick and the state it left behind.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// Callback that ignores every tick.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Tick `state` until extinction or the tick limit.
///
/// An empty forest ends the run after its first tick with
/// [`SimulationEndReason::Extinction`].
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    bounds: RunBounds,
    veto: &mut dyn DropVeto,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut ticks_run = 0_u64;

    info!(
        max_ticks = bounds.max_ticks,
        tick_interval_ms = bounds.tick_interval_ms,
        trees = state.alive_count(),
        species = state.registry.len(),
        "Simulation starting"
    );

    loop {
        // --- Execute tick ---
        let summary = tick::run_tick(state, veto)?;
        ticks_run = ticks_run.saturating_add(1);

        // --- Observe ---
        callback.on_tick(&summary, state);

        // --- Extinction ---
        if summary.nodes_alive == 0 {
            info!(tick = summary.tick, "No trees left -- extinction");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Extinction,
                final_summary: Some(summary),
                total_ticks: ticks_run,
            });
        }

        // --- Check tick limit ---
        if bounds.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, max_ticks = bounds.max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks: ticks_run,
            });
        }

        // --- Pacing ---
        if bounds.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(bounds.tick_interval_ms)).await;
        }
    }
}

/// Log how and where the run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|summary| summary.tick),
        final_trees_alive = result.final_summary.as_ref().map(|s| s.nodes_alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            trees_alive = summary.nodes_alive,
            season = ?summary.season,
            mean_light = summary.shade.mean_light(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use canopy_types::{Biome, BlockKind, BlockPos, BlockState, ResourceKey};
    use canopy_world::InMemoryWorld;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::drops::AcceptAll;
    use crate::species::{FeatureToggles, SpeciesRegistry, builtin_species};

    fn make_simulation_state(trees: usize) -> SimulationState {
        let mut config = SimulationConfig::default();
        config.world.half_extent = 8;
        config.growth.seed_drop_rate = 0.0;
        let mut world = InMemoryWorld::new(config.world.region_id(), 0, 63, Biome::forest()).unwrap();
        world
            .fill_layer(4, (-8, -8), (8, 8), BlockState::of(BlockKind::Grass))
            .unwrap();
        let mut registry = SpeciesRegistry::default();
        registry.register_all(builtin_species(&FeatureToggles::default()));
        let mut state = SimulationState::new(&config, world, registry).unwrap();
        let oak = Arc::clone(state.registry.get(&ResourceKey::new("canopy", "oak")).unwrap());
        for i in 0..trees {
            let x = i32::try_from(i).unwrap().saturating_mul(6).saturating_sub(6);
            state.plant(&oak, BlockPos::new(x, 4, 0), false).unwrap();
        }
        state
    }

    fn bounds(max_ticks: u64) -> RunBounds {
        RunBounds {
            max_ticks,
            tick_interval_ms: 0,
        }
    }

    #[tokio::test]
    async fn simulation_stops_at_max_ticks() {
        let mut state = make_simulation_state(2);
        let result = run_simulation(&mut state, bounds(5), &mut AcceptAll, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
    }

    #[tokio::test]
    async fn empty_forest_goes_extinct() {
        let mut state = make_simulation_state(0);
        let result = run_simulation(&mut state, bounds(100), &mut AcceptAll, &mut NoOpCallback)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::Extinction);
        assert_eq!(result.total_ticks, 1);
    }

    #[tokio::test]
    async fn callback_sees_every_tick() {
        struct Counter {
            count: u64,
        }
        impl TickCallback for Counter {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut state = make_simulation_state(1);
        let mut cb = Counter { count: 0 };
        let _ = run_simulation(&mut state, bounds(3), &mut AcceptAll, &mut cb)
            .await
            .unwrap();

        assert_eq!(cb.count, 3);
    }

    #[test]
    fn bounds_follow_world_config() {
        let config = SimulationConfig::default();
        let bounds = RunBounds::from_config(&config.world);
        assert_eq!(bounds.max_ticks, config.world.max_ticks);
        assert!(!bounds.tick_limit_reached(1));
        assert!(bounds.tick_limit_reached(config.world.max_ticks));
        let unbounded = RunBounds {
            max_ticks: 0,
            tick_interval_ms: 0,
        };
        assert!(!unbounded.tick_limit_reached(u64::MAX));
    }
}
