use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::snake::Coordinate;

/// Reasons an engine configuration or starting body is refused.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("grid {rows}x{cols} cannot hold the starting snake")]
    GridTooSmall { rows: u16, cols: u16 },

    #[error("tick rates must be positive")]
    ZeroTickRate,

    #[error("snake body must contain at least one segment")]
    EmptyBody,

    #[error("segment ({}, {}) lies outside the grid", .0.row, .0.col)]
    SegmentOutOfBounds(Coordinate),

    #[error("segment ({}, {}) appears more than once", .0.row, .0.col)]
    DuplicateSegment(Coordinate),
}

/// Food placement found no free cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("no free cell left for food on a {rows}x{cols} grid")]
pub struct GridFullError {
    pub rows: u16,
    pub cols: u16,
}

/// Failures that end a run abnormally.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    GridFull(#[from] GridFullError),

    #[error("the run has already finished")]
    AlreadyFinished,
}
