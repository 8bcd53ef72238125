//! Tick callback that logs a periodic forest summary.

use canopy_core::{SimulationState, TickCallback, TickSummary};
use tracing::{debug, info};

/// Logs every tick at debug level and a fuller summary every
/// `interval` ticks at info level.
pub struct SummaryLogger {
    interval: u64,
    logged: u64,
}

impl SummaryLogger {
    /// Create a logger that reports every `interval` ticks (0 = never).
    pub const fn new(interval: u64) -> Self {
        Self { interval, logged: 0 }
    }

    /// Number of info-level summaries written so far.
    pub const fn logged(&self) -> u64 {
        self.logged
    }

    fn is_due(&self, tick: u64) -> bool {
        tick.checked_rem(self.interval) == Some(0)
    }
}

impl TickCallback for SummaryLogger {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        debug!(
            tick = summary.tick,
            trees = summary.nodes_alive,
            grown = summary.grown,
            drops = summary.voluntary_drops,
            "Tick complete"
        );
        if !self.is_due(summary.tick) {
            return;
        }
        self.logged = self.logged.saturating_add(1);

        let tallest = state.nodes.iter().map(canopy_core::GrowthNode::height).max().unwrap_or(0);
        info!(
            tick = summary.tick,
            season = ?summary.season,
            season_value = summary.season_value,
            trees = summary.nodes_alive,
            tallest,
            grown = summary.grown,
            extended = summary.extended,
            stalled = ?summary.stalled,
            features = summary.features_placed,
            rotted = summary.segments_rotted,
            mushrooms = summary.mushrooms,
            died = summary.nodes_died,
            drops = summary.voluntary_drops,
            vetoed = summary.vetoed,
            seedlings = summary.seedlings_planted,
            leaf_cells = summary.shade.leaf_cells,
            mean_light = summary.shade.mean_light(),
            "Forest summary"
        );
    }
}
