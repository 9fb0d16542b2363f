//! Property tests driving the engine through randomized runs.
//!
//! Each case seeds the simulation RNG and an input sequence from proptest
//! and then checks the invariants that must hold at every tick.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use flux_snake::consts::*;
use flux_snake::sim::{
    Direction, GameOptions, GameRuntime, GameStatus, Position, compute_speed_interval, spawn, step,
};

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

/// Drive a run with a fixed input sequence, checking `inspect` after
/// every tick until the run ends or inputs are exhausted.
fn drive(
    seed: u64,
    inputs: &[Direction],
    mut inspect: impl FnMut(&GameRuntime) -> Result<(), TestCaseError>,
) -> Result<(), TestCaseError> {
    let mut runtime = GameRuntime::new(
        GameOptions {
            seed,
            ..GameOptions::default()
        },
        0.0,
    );
    let mut now = 0.0;
    for &input in inputs {
        runtime.queue_direction(input);
        now += compute_speed_interval(&runtime, now);
        step(&mut runtime, now);
        inspect(&runtime)?;
        if runtime.status == GameStatus::Over {
            break;
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_snake_never_shorter_than_minimum(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..400),
    ) {
        drive(seed, &inputs, |runtime| {
            prop_assert!(runtime.snake.len() >= MIN_SNAKE_LEN);
            Ok(())
        })?;
    }

    #[test]
    fn prop_combo_multiplier_stays_in_range(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..400),
    ) {
        drive(seed, &inputs, |runtime| {
            prop_assert!(runtime.combo_multiplier >= 1);
            prop_assert!(runtime.combo_multiplier <= MAX_COMBO_MULTIPLIER);
            Ok(())
        })?;
    }

    #[test]
    fn prop_heading_never_reverses(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..400),
    ) {
        let mut runtime = GameRuntime::new(
            GameOptions {
                seed,
                ..GameOptions::default()
            },
            0.0,
        );
        let mut now = 0.0;
        for &input in &inputs {
            let pending_before = runtime.pending_direction;
            runtime.queue_direction(input);
            // A reversal request must leave the buffer untouched
            if input == runtime.direction.opposite() {
                prop_assert_eq!(runtime.pending_direction, pending_before);
            } else if runtime.status == GameStatus::Running {
                prop_assert_eq!(runtime.pending_direction, input);
            }
            prop_assert_ne!(runtime.pending_direction, runtime.direction.opposite());
            now += compute_speed_interval(&runtime, now);
            step(&mut runtime, now);
            if runtime.status == GameStatus::Over {
                break;
            }
        }
    }

    #[test]
    fn prop_fruit_stays_on_free_cells(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..400),
    ) {
        drive(seed, &inputs, |runtime| {
            prop_assert!(!runtime.fruit.position.hits_wall(runtime.grid_size));
            prop_assert!(!runtime.snake.contains(&runtime.fruit.position));
            if let Some(pickup) = &runtime.power_up_pickup {
                prop_assert!(!pickup.position.hits_wall(runtime.grid_size));
            }
            Ok(())
        })?;
    }

    #[test]
    fn prop_speed_interval_respects_floor(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..400),
    ) {
        drive(seed, &inputs, |runtime| {
            let interval = compute_speed_interval(runtime, runtime.last_tick);
            // Slowmo may stretch the interval past the base, never past 1.5x
            prop_assert!(interval >= MIN_SPEED_MS * 0.75);
            prop_assert!(interval <= INITIAL_SPEED_MS * 1.5);
            Ok(())
        })?;
    }

    #[test]
    fn prop_same_seed_and_inputs_replay_identically(
        seed in any::<u64>(),
        inputs in prop::collection::vec(direction_strategy(), 1..200),
    ) {
        let mut scores = Vec::new();
        let mut lengths = Vec::new();
        for _ in 0..2 {
            let mut score = 0;
            let mut length = 0;
            drive(seed, &inputs, |runtime| {
                score = runtime.score;
                length = runtime.snake.len();
                Ok(())
            })?;
            scores.push(score);
            lengths.push(length);
        }
        prop_assert_eq!(scores[0], scores[1]);
        prop_assert_eq!(lengths[0], lengths[1]);
    }

    #[test]
    fn prop_spawn_avoids_occupied_cells(
        seed in any::<u64>(),
        occupied in prop::collection::vec((0..GRID_SIZE, 0..GRID_SIZE), 0..40),
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let occupied: Vec<Position> = occupied
            .into_iter()
            .map(|(x, y)| Position::new(x, y))
            .collect();
        let fruit = spawn::spawn_fruit(&mut rng, GRID_SIZE, &occupied, None, 0.0);
        prop_assert!(!occupied.contains(&fruit.position));
        prop_assert!(!fruit.position.hits_wall(GRID_SIZE));
    }
}
