//! The world clock: a tick counter that knows which season it is.
//!
//! A year is the configured season cycle, each season lasting
//! `ticks_per_season` ticks. Besides the named [`Season`] the clock reports
//! a continuous season value in `[0, 4)`. Its integer part is the canonical
//! season number (spring 0, summer 1, autumn 2, winter 3) and its fraction
//! is progress through that season, so a "summer, winter" cycle alternates
//! between `[1, 2)` and `[3, 4)`.

use canopy_types::Season;

use crate::config::TimeConfig;

/// Clock construction and advancement failures.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The counter is already at `u64::MAX`.
    #[error("world clock cannot advance past tick {}", u64::MAX)]
    Overflow,

    /// A season must last at least one tick.
    #[error("ticks_per_season must be positive")]
    ZeroLengthSeason,

    /// The season cycle is empty.
    #[error("season cycle is empty")]
    NoSeasons,

    /// A configured season name is not recognized.
    #[error("unrecognized season name {0:?}")]
    UnknownSeason(String),
}

/// Tick counter plus season cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    tick: u64,
    season_length: u64,
    cycle: Vec<Season>,
}

impl WorldClock {
    /// Clock at tick 0 built from `config`.
    ///
    /// # Errors
    ///
    /// Fails on a zero season length, an empty cycle, or an unknown name.
    pub fn new(config: &TimeConfig) -> Result<Self, ClockError> {
        let cycle = config
            .seasons
            .iter()
            .map(|name| parse_season(name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_cycle(0, config.ticks_per_season, cycle)
    }

    /// Clock at `tick` over an explicit season cycle.
    ///
    /// # Errors
    ///
    /// Fails on a zero season length or an empty cycle.
    pub fn with_cycle(tick: u64, season_length: u64, cycle: Vec<Season>) -> Result<Self, ClockError> {
        if season_length == 0 {
            return Err(ClockError::ZeroLengthSeason);
        }
        if cycle.is_empty() {
            return Err(ClockError::NoSeasons);
        }
        Ok(Self {
            tick,
            season_length,
            cycle,
        })
    }

    /// Step forward one tick and return the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] at `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::Overflow)?;
        Ok(self.tick)
    }

    /// Move to an absolute tick.
    pub const fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Current tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Ticks elapsed inside the current season.
    pub const fn progress_ticks(&self) -> u64 {
        // season_length is never zero
        match self.tick.checked_rem(self.season_length) {
            Some(elapsed) => elapsed,
            None => 0,
        }
    }

    /// The current named season.
    pub fn season(&self) -> Season {
        let seasons_elapsed = self.tick.checked_div(self.season_length).unwrap_or(0);
        let len = u64::try_from(self.cycle.len()).unwrap_or(u64::MAX);
        usize::try_from(seasons_elapsed.checked_rem(len).unwrap_or(0))
            .ok()
            .and_then(|slot| self.cycle.get(slot))
            .copied()
            .unwrap_or(Season::Spring)
    }

    /// Continuous season value in `[0, 4)`.
    #[allow(clippy::cast_precision_loss)] // tick counts far below 2^24 in practice
    pub fn season_value(&self) -> f32 {
        let progress = self.progress_ticks() as f32 / self.season_length as f32;
        (season_number(self.season()) + progress.clamp(0.0, 0.999_999)).rem_euclid(4.0)
    }
}

const fn season_number(season: Season) -> f32 {
    match season {
        Season::Spring => 0.0,
        Season::Summer => 1.0,
        Season::Autumn => 2.0,
        Season::Winter => 3.0,
    }
}

fn parse_season(name: &str) -> Result<Season, ClockError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "spring" => Ok(Season::Spring),
        "summer" => Ok(Season::Summer),
        "autumn" | "fall" => Ok(Season::Autumn),
        "winter" => Ok(Season::Winter),
        _ => Err(ClockError::UnknownSeason(name.to_owned())),
    }
}
