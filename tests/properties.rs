use std::time::Duration;

use grid_snake::config::EngineConfig;
use grid_snake::engine::{Engine, TickOutcome};
use grid_snake::game::NextMove;
use grid_snake::input::Direction;
use grid_snake::snake::Coordinate;
use proptest::prelude::*;

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

/// A straight three-segment snake in the middle of a 16x32 board, heading `heading`.
fn engine_heading(heading: Direction, seed: u64) -> Engine {
    let mut cell = Coordinate::new(8, 16);
    let mut body = Vec::new();
    for _ in 0..3 {
        body.push(cell);
        cell = cell.offset(heading.opposite());
    }

    Engine::new_with_seed(EngineConfig::default(), seed)
        .expect("valid config")
        .with_body(body, heading)
        .expect("valid body")
}

proptest! {
    #[test]
    fn reversal_never_changes_heading(heading in direction(), seed in any::<u64>()) {
        let mut engine = engine_heading(heading, seed);

        engine.set_direction(heading.opposite());

        prop_assert_eq!(engine.heading(), heading);
    }

    #[test]
    fn perpendicular_turn_always_applies(heading in direction(), pick in 0usize..2) {
        let mut engine = engine_heading(heading, 0);
        let turn = heading.allowed_turns()[pick];

        engine.set_direction(turn);

        prop_assert_eq!(engine.heading(), turn);
    }

    #[test]
    fn food_is_never_placed_on_the_body(seed in any::<u64>(), turns in prop::collection::vec(direction(), 0..30)) {
        let mut engine = Engine::new_with_seed(EngineConfig::with_grid(6, 6), seed).expect("valid config");
        engine.setup().expect("free cells remain");

        for turn in turns {
            engine.set_direction(turn);
            match engine.tick() {
                Ok(TickOutcome::Blocked(_)) | Err(_) => break,
                Ok(_) => {}
            }
            if let Some(food) = engine.state().food() {
                prop_assert!(!engine.state().snake().occupies(food));
            }
        }
    }

    #[test]
    fn growth_only_happens_on_food(seed in any::<u64>(), turns in prop::collection::vec(direction(), 1..40)) {
        let mut engine = Engine::new_with_seed(EngineConfig::with_grid(8, 8), seed).expect("valid config");
        engine.setup().expect("free cells remain");

        for turn in turns {
            engine.set_direction(turn);
            let before = engine.state().snake().len();
            let NextMove::Open(next) = engine.next_coordinate() else {
                break;
            };
            let on_food = engine.state().food() == Some(next);

            match engine.tick() {
                Ok(TickOutcome::Ate) => prop_assert!(on_food),
                Ok(TickOutcome::Moved) => prop_assert!(!on_food),
                _ => break,
            }

            let expected = if on_food { before + 1 } else { before };
            prop_assert_eq!(engine.state().snake().len(), expected);
            prop_assert_eq!(engine.score(), engine.consumed() * 10);
        }
    }

    #[test]
    fn tick_rate_shrinks_on_each_meal_but_stays_positive(meals in 1usize..80) {
        let config = EngineConfig {
            rows: 100,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new_with_seed(config, 1).expect("valid config");
        let floor = config.min_tick_rate();

        for _ in 0..meals {
            let before = engine.tick_rate();
            let NextMove::Open(next) = engine.next_coordinate() else {
                break;
            };
            prop_assert!(engine.place_food_at(next));
            prop_assert_eq!(engine.tick(), Ok(TickOutcome::Ate));

            let after = engine.tick_rate();
            prop_assert!(after > Duration::ZERO);
            prop_assert!(after >= floor);
            if before > floor {
                prop_assert!(after < before);
            }
        }
    }

    #[test]
    fn borders_block_and_wrap_mirror_each_other(col in 0i32..32) {
        let body = vec![Coordinate::new(0, col), Coordinate::new(1, col)];
        let wrapped = Engine::new_with_seed(EngineConfig::default(), 0)
            .expect("valid config")
            .with_body(body.clone(), Direction::Up)
            .expect("valid body");
        let walled = Engine::new_with_seed(EngineConfig { borders: true, ..EngineConfig::default() }, 0)
            .expect("valid config")
            .with_body(body, Direction::Up)
            .expect("valid body");

        prop_assert_eq!(wrapped.next_coordinate(), NextMove::Open(Coordinate::new(15, col)));
        prop_assert!(matches!(walled.next_coordinate(), NextMove::Blocked(_)));
    }
}
