use rand::Rng;

use crate::config::{FOOD_PLACEMENT_ATTEMPTS, GridSize};
use crate::error::GridFullError;
use crate::snake::{Coordinate, Snake};

/// Picks a uniformly random cell that the snake does not occupy.
///
/// Random sampling is tried a bounded number of times; after that the free
/// cells are enumerated so a crowded grid still finds its last holes.
pub fn place_food<R: Rng + ?Sized>(
    rng: &mut R,
    grid: GridSize,
    snake: &Snake,
) -> Result<Coordinate, GridFullError> {
    for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
        let candidate = random_cell(rng, grid);
        if !snake.occupies(candidate) {
            return Ok(candidate);
        }
    }

    let free = free_cells(grid, snake);
    if free.is_empty() {
        return Err(GridFullError {
            rows: grid.rows,
            cols: grid.cols,
        });
    }

    Ok(free[rng.gen_range(0..free.len())])
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, grid: GridSize) -> Coordinate {
    Coordinate::new(
        rng.gen_range(0..i32::from(grid.rows)),
        rng.gen_range(0..i32::from(grid.cols)),
    )
}

fn free_cells(grid: GridSize, snake: &Snake) -> Vec<Coordinate> {
    let mut free = Vec::with_capacity(grid.total_cells().saturating_sub(snake.len()));

    for row in 0..i32::from(grid.rows) {
        for col in 0..i32::from(grid.cols) {
            let cell = Coordinate::new(row, col);
            if !snake.occupies(cell) {
                free.push(cell);
            }
        }
    }

    free
}
