use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::{GridSize, STARTING_LENGTH};
use crate::error::ConfigError;
use crate::input::{Direction, direction_change_is_valid};

/// Grid cell in `(row, col)` order, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: i32,
    pub col: i32,
}

impl Coordinate {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the neighbouring cell one step towards `direction`, unbounded.
    #[must_use]
    pub fn offset(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::new(self.row - 1, self.col),
            Direction::Down => Self::new(self.row + 1, self.col),
            Direction::Left => Self::new(self.row, self.col - 1),
            Direction::Right => Self::new(self.row, self.col + 1),
        }
    }

    /// Returns true when the coordinate lies inside the grid.
    #[must_use]
    pub fn is_within_bounds(self, grid: GridSize) -> bool {
        self.row >= 0
            && self.col >= 0
            && self.row < i32::from(grid.rows)
            && self.col < i32::from(grid.cols)
    }

    /// Returns this coordinate wrapped into the grid on both axes.
    #[must_use]
    pub fn wrapped(self, grid: GridSize) -> Self {
        Self {
            row: wrap_axis(self.row, i32::from(grid.rows)),
            col: wrap_axis(self.col, i32::from(grid.cols)),
        }
    }
}

fn wrap_axis(value: i32, upper_bound: i32) -> i32 {
    value.rem_euclid(upper_bound)
}

/// Snake body and heading. The head is the front of the body.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Coordinate>,
    heading: Direction,
}

impl Snake {
    /// Creates the three-segment starting snake in the middle of the grid, heading up.
    ///
    /// On short grids the body is pushed up so it stays contiguous and in bounds.
    #[must_use]
    pub fn starting(grid: GridSize) -> Self {
        let top = (grid.rows / 2).min(grid.rows.saturating_sub(STARTING_LENGTH));
        let col = i32::from(grid.cols / 2);
        let body = (0..STARTING_LENGTH)
            .map(|offset| Coordinate::new(i32::from(top + offset), col))
            .collect();

        Self {
            body,
            heading: Direction::Up,
        }
    }

    /// Creates a snake from explicit body segments (first is head).
    ///
    /// Segments need not be adjacent, but they must be inside the grid and
    /// must not repeat.
    pub fn from_segments(
        segments: Vec<Coordinate>,
        heading: Direction,
        grid: GridSize,
    ) -> Result<Self, ConfigError> {
        if segments.is_empty() {
            return Err(ConfigError::EmptyBody);
        }

        let mut seen = HashSet::with_capacity(segments.len());
        for segment in &segments {
            if !segment.is_within_bounds(grid) {
                return Err(ConfigError::SegmentOutOfBounds(*segment));
            }
            if !seen.insert(*segment) {
                return Err(ConfigError::DuplicateSegment(*segment));
            }
        }

        Ok(Self {
            body: VecDeque::from(segments),
            heading,
        })
    }

    /// Changes heading when `direction` is a perpendicular turn. Returns whether it changed.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if !direction_change_is_valid(self.heading, direction) {
            return false;
        }

        self.heading = direction;
        true
    }

    /// Moves the head onto `next`; the tail stays in place when `grow` is set.
    pub fn advance(&mut self, next: Coordinate, grow: bool) {
        self.body.push_front(next);
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Coordinate {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the last segment.
    #[must_use]
    pub fn tail(&self) -> Coordinate {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `coordinate`.
    #[must_use]
    pub fn occupies(&self, coordinate: Coordinate) -> bool {
        self.body.contains(&coordinate)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false: a snake keeps at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Coordinate> {
        self.body.iter()
    }
}
