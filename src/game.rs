use std::time::Duration;

use crate::config::{EngineConfig, GridSize, LEVEL_UP_DIVISOR, POINTS_PER_FOOD};
use crate::input::Direction;
use crate::snake::{Coordinate, Snake};

/// What stopped a move.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Collision {
    Wall,
    SelfHit,
}

/// Result of looking one step ahead of the head.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NextMove {
    Open(Coordinate),
    Blocked(Collision),
}

/// Rendering class of a single grid cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Cell {
    Food,
    Tail,
    Empty,
}

/// Board contents and pacing for one run.
///
/// Listeners and renderers only ever see this through a shared reference; the
/// engine is the single writer.
#[derive(Debug, Clone)]
pub struct GameState {
    snake: Snake,
    food: Option<Coordinate>,
    consumed: u32,
    tick_rate: Duration,
    min_tick_rate: Duration,
    grid: GridSize,
    borders: bool,
}

impl GameState {
    pub(crate) fn new(config: &EngineConfig, snake: Snake) -> Self {
        Self {
            snake,
            food: None,
            consumed: 0,
            tick_rate: config.tick_rate(),
            min_tick_rate: config.min_tick_rate(),
            grid: config.grid(),
            borders: config.borders,
        }
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.grid.rows
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.grid.cols
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.snake.heading()
    }

    #[must_use]
    pub fn food(&self) -> Option<Coordinate> {
        self.food
    }

    #[must_use]
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.consumed * POINTS_PER_FOOD
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    #[must_use]
    pub fn borders(&self) -> bool {
        self.borders
    }

    #[must_use]
    pub fn is_food_at(&self, row: i32, col: i32) -> bool {
        self.food == Some(Coordinate::new(row, col))
    }

    /// Returns true when any body segment, head included, covers the cell.
    #[must_use]
    pub fn is_tail_at(&self, row: i32, col: i32) -> bool {
        self.snake.occupies(Coordinate::new(row, col))
    }

    /// Classifies a cell for drawing. Food wins over body.
    #[must_use]
    pub fn cell_at(&self, row: i32, col: i32) -> Cell {
        if self.is_food_at(row, col) {
            Cell::Food
        } else if self.is_tail_at(row, col) {
            Cell::Tail
        } else {
            Cell::Empty
        }
    }

    /// Computes where the head would go on the next tick.
    ///
    /// The self check runs against the whole current body, tail included, so
    /// stepping onto the cell the tail is about to leave is still a collision.
    #[must_use]
    pub fn next_coordinate(&self) -> NextMove {
        let candidate = self.snake.head().offset(self.snake.heading());

        let candidate = if candidate.is_within_bounds(self.grid) {
            candidate
        } else if self.borders {
            return NextMove::Blocked(Collision::Wall);
        } else {
            candidate.wrapped(self.grid)
        };

        if self.snake.occupies(candidate) {
            return NextMove::Blocked(Collision::SelfHit);
        }

        NextMove::Open(candidate)
    }

    /// Swaps in a new body. Food under the new body is removed.
    pub(crate) fn replace_snake(&mut self, snake: Snake) {
        if self.food.is_some_and(|food| snake.occupies(food)) {
            self.food = None;
        }
        self.snake = snake;
    }

    pub(crate) fn turn(&mut self, direction: Direction) -> bool {
        self.snake.turn(direction)
    }

    pub(crate) fn set_borders(&mut self, borders: bool) {
        self.borders = borders;
    }

    pub(crate) fn set_food(&mut self, food: Option<Coordinate>) {
        self.food = food;
    }

    /// Moves the head onto `next`, growing when it holds food. Returns whether food was eaten.
    pub(crate) fn advance(&mut self, next: Coordinate) -> bool {
        let ate = self.food == Some(next);
        self.snake.advance(next, ate);

        if ate {
            self.consumed += 1;
            self.food = None;
        }

        ate
    }

    /// Shortens the tick interval by a tenth, never below the configured floor.
    pub(crate) fn speed_up(&mut self) -> Duration {
        let nanos = self.tick_rate.as_nanos();
        let faster = nanos - nanos / u128::from(LEVEL_UP_DIVISOR);
        let faster = Duration::from_nanos(u64::try_from(faster).unwrap_or(u64::MAX));

        self.tick_rate = faster.max(self.min_tick_rate);
        self.tick_rate
    }
}
