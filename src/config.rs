use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: u16,
    pub cols: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }
}

/// Construction-time engine settings.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rows: u16,
    pub cols: u16,
    /// `true` ends the run at the grid edge, `false` wraps to the opposite edge.
    pub borders: bool,
    pub tick_rate_ms: u64,
    pub min_tick_rate_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            borders: false,
            tick_rate_ms: DEFAULT_TICK_INTERVAL_MS,
            min_tick_rate_ms: MIN_TICK_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Creates a default configuration with a custom grid size.
    #[must_use]
    pub fn with_grid(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the grid can hold the starting body and that tick rates are usable.
    ///
    /// The starting body is vertical and needs a free row ahead of its head.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows <= STARTING_LENGTH || self.cols == 0 {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
            });
        }

        if self.min_tick_rate_ms == 0 || self.tick_rate_ms == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        Ok(())
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        GridSize {
            rows: self.rows,
            cols: self.cols,
        }
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Returns the floor for the tick rate. Never above the initial rate.
    #[must_use]
    pub fn min_tick_rate(&self) -> Duration {
        Duration::from_millis(self.min_tick_rate_ms.min(self.tick_rate_ms))
    }
}

/// Default grid height in cells.
pub const DEFAULT_ROWS: u16 = 16;

/// Default grid width in cells.
pub const DEFAULT_COLS: u16 = 32;

/// Number of segments in the starting body.
pub const STARTING_LENGTH: u16 = 3;

/// Base tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 400;

/// Minimum tick interval in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 20;

/// Score granted per consumed food.
pub const POINTS_PER_FOOD: u32 = 10;

/// Each level up removes `1 / LEVEL_UP_DIVISOR` of the current tick interval.
pub const LEVEL_UP_DIVISOR: u32 = 10;

/// Random samples tried before falling back to a full scan for free cells.
pub const FOOD_PLACEMENT_ATTEMPTS: usize = 64;

/// Pending steering commands kept between ticks.
pub const STEERING_QUEUE_DEPTH: usize = 2;

/// How long the input thread waits for a key before re-checking for shutdown.
pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Glyph for the snake head.
pub const GLYPH_SNAKE_HEAD: &str = "█";

/// Glyph for body segments.
pub const GLYPH_SNAKE_BODY: &str = "▓";

/// Glyph for the last body segment.
pub const GLYPH_SNAKE_TAIL: &str = "▒";

/// Glyph for food.
pub const GLYPH_FOOD: &str = "●";
