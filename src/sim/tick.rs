//! Discrete simulation step and speed controller
//!
//! `step` advances the runtime by exactly one tick given a monotonic
//! timestamp. The host decides *when* to call it by polling
//! `compute_speed_interval`; the engine never schedules anything itself.

use glam::Vec2;
use rand::Rng;

use super::messages;
use super::spawn;
use super::state::{
    FruitKind, GameRuntime, GameStatus, Particle, Position, PowerUpKind, StepSnapshot,
};
use crate::consts::*;

/// Advance the runtime by one tick.
///
/// Safe to call in any status: while not `Running` this is a no-op that
/// returns the unchanged projection, so hosts can invoke it every frame.
pub fn step(state: &mut GameRuntime, now: f64) -> StepSnapshot {
    if state.status != GameStatus::Running {
        return state.snapshot(None);
    }

    // Timed effects first so stale power-ups never influence this tick
    state.active_power_ups.prune(now);
    if state
        .power_up_pickup
        .is_some_and(|pickup| pickup.expires_at <= now)
    {
        state.power_up_pickup = None;
        state.message = Some(messages::PICKUP_EXPIRED.to_string());
    }

    if state.fruit.expires_at <= now {
        expire_fruit(state, now);
    }

    // Commit the buffered direction; this is the only place the current
    // direction changes.
    let next_head = state.pending_direction.advance(state.head());
    state.direction = state.pending_direction;

    if next_head.hits_wall(state.grid_size) {
        return kill(state);
    }

    let ghost_active = state.active_power_ups.is_active(PowerUpKind::Ghost, now);
    if state.snake.contains(&next_head) && !ghost_active {
        return kill(state);
    }

    state.snake.insert(0, next_head);
    if state.pending_growth > 0 {
        state.pending_growth -= 1;
    } else {
        state.snake.pop();
    }

    if state.active_power_ups.is_active(PowerUpKind::Magnet, now) {
        attract_fruit(state);
    }

    let mut event_message = None;
    if next_head == state.fruit.position {
        event_message = Some(collect_fruit(state, now));
    }

    if let Some(pickup) = state.power_up_pickup
        && next_head == pickup.position
    {
        let line = activate_power_up(state, pickup.kind, now);
        // A fruit collected the same tick keeps its message
        event_message.get_or_insert(line);
        state.power_up_pickup = None;
    }

    advance_particles(state);
    state.last_tick = now;
    state.snapshot(event_message)
}

/// Minimum milliseconds that must elapse before the next step.
///
/// Slowmo and speed stack multiplicatively (1.5 then 0.75, 1.125x net
/// when both are active; intentional).
pub fn compute_speed_interval(state: &GameRuntime, now: f64) -> f64 {
    let level = state.speed_level.min(MAX_SPEED_LEVEL) as f64;
    let mut interval = (state.base_speed - level * SPEED_STEP_MS).max(MIN_SPEED_MS);
    if state.active_power_ups.is_active(PowerUpKind::Slowmo, now) {
        interval *= 1.5;
    }
    if state.active_power_ups.is_active(PowerUpKind::Speed, now) {
        interval *= 0.75;
    }
    interval
}

/// Replace an expired fruit. Dodging toxic fruit is rewarded every
/// `TOXIC_AVOID_TARGET` avoidances; letting edible fruit rot decays the
/// combo instead.
fn expire_fruit(state: &mut GameRuntime, now: f64) {
    if state.fruit.kind == FruitKind::Toxic {
        state.avoided_toxic += 1;
        if state.avoided_toxic % TOXIC_AVOID_TARGET == 0 {
            state.combo_chain += 2;
            state.message = Some(messages::TOXIC_DODGE_BONUS.to_string());
        } else {
            state.message = Some(messages::TOXIC_DODGED.to_string());
        }
    } else {
        state.combo_chain = state.combo_chain.saturating_sub(1);
        state.message = Some(messages::FRUIT_EXPIRED.to_string());
    }
    state.fruit = spawn::spawn_fruit(
        &mut state.rng,
        state.grid_size,
        &state.snake,
        state.power_up_pickup.as_ref(),
        now,
    );
}

/// Apply everything a fruit capture triggers: growth, particles, combo,
/// score, speed level, a possible pickup spawn and the replacement fruit.
fn collect_fruit(state: &mut GameRuntime, now: f64) -> String {
    let kind = state.fruit.kind;
    state.last_fruit_kind = kind;

    let growth = kind.growth();
    if growth >= 0 {
        state.pending_growth += growth;
    } else {
        shrink_snake(state, (-growth) as usize);
    }

    if state.fx_enabled {
        spawn_particles(state, kind);
    }

    if kind == FruitKind::Toxic {
        state.combo_chain = state.combo_chain.saturating_sub(2);
    } else {
        state.combo_chain += 1;
    }
    state.combo_multiplier = compute_combo_multiplier(state, now);

    let speed_bonus = state.speed_level as i32 * 3;
    let delta = ((kind.value() + speed_bonus) as f64 * state.combo_multiplier as f64).round() as i64;
    state.score = (state.score as i64 + delta).max(0) as u32;

    if kind == FruitKind::Toxic {
        state.avoided_toxic = 0;
    }
    state.fruit_counter += 1;
    state.speed_level = (state.fruit_counter / FRUITS_PER_LEVEL).min(MAX_SPEED_LEVEL);

    maybe_spawn_power_up(state, now);
    state.fruit = spawn::spawn_fruit(
        &mut state.rng,
        state.grid_size,
        &state.snake,
        state.power_up_pickup.as_ref(),
        now,
    );

    match kind {
        FruitKind::Golden => messages::GOLDEN_EATEN.to_string(),
        _ => messages::FRUIT_EATEN.to_string(),
    }
}

fn activate_power_up(state: &mut GameRuntime, kind: PowerUpKind, now: f64) -> String {
    state
        .active_power_ups
        .activate(kind, now + kind.duration_ms());
    messages::power_up_line(kind).to_string()
}

fn compute_combo_multiplier(state: &GameRuntime, now: f64) -> u32 {
    let mut multiplier = 1 + state.combo_chain / 4;
    if state.active_power_ups.is_active(PowerUpKind::Speed, now) {
        multiplier += 1;
    }
    multiplier.min(MAX_COMBO_MULTIPLIER)
}

/// Declining spawn chance as the game speeds up; never while a pickup
/// is already on the board.
fn maybe_spawn_power_up(state: &mut GameRuntime, now: f64) {
    if state.power_up_pickup.is_some() {
        return;
    }
    let chance = 0.35 - state.speed_level as f64 * 0.02;
    if state.rng.random::<f64>() < chance {
        state.power_up_pickup = Some(spawn::spawn_power_up(
            &mut state.rng,
            state.grid_size,
            &state.snake,
            state.fruit.position,
            now,
        ));
    }
}

/// Nudge the fruit one cell toward the head along each axis when it is
/// within magnet range. Silently no-ops when the destination cell is a
/// wall or occupied by the body.
fn attract_fruit(state: &mut GameRuntime) {
    let head = state.head();
    let fruit_pos = state.fruit.position;
    let distance = head.manhattan(&fruit_pos);
    if distance > MAGNET_RANGE || distance == 0 {
        return;
    }
    let candidate = Position::new(
        fruit_pos.x + (head.x - fruit_pos.x).signum(),
        fruit_pos.y + (head.y - fruit_pos.y).signum(),
    );
    if candidate.hits_wall(state.grid_size) || state.snake.contains(&candidate) {
        return;
    }
    state.fruit.position = candidate;
}

/// Drop tail segments immediately, never below the minimum length
fn shrink_snake(state: &mut GameRuntime, amount: usize) {
    for _ in 0..amount {
        if state.snake.len() > MIN_SNAKE_LEN {
            state.snake.pop();
        }
    }
}

fn spawn_particles(state: &mut GameRuntime, kind: FruitKind) {
    let origin = Vec2::new(state.fruit.position.x as f32, state.fruit.position.y as f32);
    for _ in 0..PARTICLES_PER_FRUIT {
        let vel = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * 0.6,
            (state.rng.random::<f32>() - 0.5) * 0.6,
        );
        let life = 18 + state.rng.random_range(0..10u32);
        state.particles.push(Particle {
            pos: origin,
            vel,
            life,
            max_life: 24,
            kind,
        });
    }
}

fn advance_particles(state: &mut GameRuntime) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}

fn kill(state: &mut GameRuntime) -> StepSnapshot {
    state.status = GameStatus::Over;
    let line = messages::game_over_line(&mut state.rng).to_string();
    state.snapshot(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Direction, Fruit, GameOptions, PowerUpPickup};

    fn runtime(seed: u64) -> GameRuntime {
        GameRuntime::new(
            GameOptions {
                seed,
                ..GameOptions::default()
            },
            0.0,
        )
    }

    fn plant_fruit(state: &mut GameRuntime, position: Position, kind: FruitKind) {
        state.fruit = Fruit {
            position,
            kind,
            expires_at: f64::MAX,
        };
    }

    #[test]
    fn test_step_noop_unless_running() {
        let mut state = runtime(1);
        state.toggle_pause();
        let before = state.clone();

        let snap = step(&mut state, 500.0);
        assert_eq!(snap.status, GameStatus::Paused);
        assert_eq!(snap.score, 0);
        assert!(snap.message.is_none());
        assert_eq!(state.snake, before.snake);
        assert_eq!(state.last_tick, before.last_tick);
        assert_eq!(state.fruit, before.fruit);
    }

    #[test]
    fn test_plain_move_keeps_length() {
        let mut state = runtime(2);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        let head_before = state.head();
        step(&mut state, 100.0);
        assert_eq!(state.head(), Position::new(head_before.x + 1, head_before.y));
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.last_tick, 100.0);
    }

    #[test]
    fn test_normal_fruit_scores_ten_and_grows_to_four() {
        let mut state = runtime(3);
        // Head is at (14,12) moving right; put a normal fruit in its path
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        let snap = step(&mut state, 100.0);

        assert_eq!(snap.score, 10); // round((10 + 0*3) * 1)
        assert_eq!(snap.combo_chain, 1);
        assert_eq!(snap.combo_multiplier, 1);
        assert_eq!(snap.message.as_deref(), Some(messages::FRUIT_EATEN));
        assert_eq!(state.pending_growth, 1);

        // Growth lands on the following tick
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        step(&mut state, 250.0);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.pending_growth, 0);
    }

    #[test]
    fn test_golden_fruit_message_and_growth() {
        let mut state = runtime(4);
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Golden);
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.score, 50);
        assert_eq!(snap.message.as_deref(), Some(messages::GOLDEN_EATEN));
        assert_eq!(state.pending_growth, 3);
        assert_eq!(state.last_fruit_kind, FruitKind::Golden);
    }

    #[test]
    fn test_toxic_fruits_never_shrink_below_three() {
        let mut state = runtime(5);
        state.combo_chain = 3;
        let mut now = 0.0;
        for _ in 0..3 {
            now += 100.0;
            let head = state.head();
            plant_fruit(&mut state, Position::new(head.x + 1, head.y), FruitKind::Toxic);
            let snap = step(&mut state, now);
            assert_eq!(state.snake.len(), 3);
            assert_eq!(snap.status, GameStatus::Running);
        }
        // 3 -> 1 -> 0 -> 0, floored
        assert_eq!(state.combo_chain, 0);
        assert_eq!(state.avoided_toxic, 0);
    }

    #[test]
    fn test_score_never_negative() {
        let mut state = runtime(6);
        assert_eq!(state.score, 0);
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Toxic);
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.score, 0); // -20 clamped
    }

    #[test]
    fn test_wall_collision_is_terminal_with_fixed_phrase() {
        let mut state = runtime(7);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        state.snake = vec![
            Position::new(24, 12),
            Position::new(23, 12),
            Position::new(22, 12),
        ];
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.status, GameStatus::Over);
        assert!(messages::is_game_over_line(snap.message.as_deref().unwrap()));

        // Terminal state is frozen; further steps are no-ops
        let frozen = state.snake.clone();
        let snap = step(&mut state, 200.0);
        assert_eq!(snap.status, GameStatus::Over);
        assert_eq!(state.snake, frozen);
    }

    #[test]
    fn test_self_collision_unless_ghost() {
        let body = vec![
            Position::new(5, 5),
            Position::new(6, 5),
            Position::new(6, 6),
            Position::new(5, 6),
        ];
        // Heading right into our own neck segment at (6,5)
        let mut state = runtime(8);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        state.snake = body.clone();
        state.direction = Direction::Right;
        state.pending_direction = Direction::Right;
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.status, GameStatus::Over);

        // Same layout with ghost active passes through
        let mut state = runtime(8);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        state.snake = body;
        state.direction = Direction::Right;
        state.pending_direction = Direction::Right;
        state.active_power_ups.activate(PowerUpKind::Ghost, 1_000.0);
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.status, GameStatus::Running);
        assert_eq!(state.head(), Position::new(6, 5));
    }

    #[test]
    fn test_pickup_activation_and_refresh() {
        let mut state = runtime(9);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        state.power_up_pickup = Some(PowerUpPickup {
            position: Position::new(15, 12),
            kind: PowerUpKind::Magnet,
            expires_at: f64::MAX,
        });
        let snap = step(&mut state, 100.0);
        assert!(state.power_up_pickup.is_none());
        assert_eq!(
            state.active_power_ups.magnet,
            Some(100.0 + PowerUpKind::Magnet.duration_ms())
        );
        assert_eq!(
            snap.message.as_deref(),
            Some(messages::power_up_line(PowerUpKind::Magnet))
        );

        // Re-picking an active kind refreshes the expiry
        state.power_up_pickup = Some(PowerUpPickup {
            position: Position::new(16, 12),
            kind: PowerUpKind::Magnet,
            expires_at: f64::MAX,
        });
        step(&mut state, 200.0);
        assert_eq!(
            state.active_power_ups.magnet,
            Some(200.0 + PowerUpKind::Magnet.duration_ms())
        );
    }

    #[test]
    fn test_pickup_expiry_message_surfaces_without_collision() {
        let mut state = runtime(10);
        plant_fruit(&mut state, Position::new(0, 0), FruitKind::Normal);
        state.power_up_pickup = Some(PowerUpPickup {
            position: Position::new(1, 1),
            kind: PowerUpKind::Speed,
            expires_at: 50.0,
        });
        let snap = step(&mut state, 100.0);
        assert!(state.power_up_pickup.is_none());
        assert_eq!(snap.message.as_deref(), Some(messages::PICKUP_EXPIRED));
    }

    #[test]
    fn test_collision_message_wins_over_expiry_message() {
        let mut state = runtime(11);
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        state.power_up_pickup = Some(PowerUpPickup {
            position: Position::new(1, 1),
            kind: PowerUpKind::Speed,
            expires_at: 50.0, // expires this tick
        });
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.message.as_deref(), Some(messages::FRUIT_EATEN));
    }

    #[test]
    fn test_toxic_expiry_rewards_every_third_dodge() {
        let mut state = runtime(12);
        for i in 1..=3u32 {
            state.fruit = Fruit {
                position: Position::new(0, 24),
                kind: FruitKind::Toxic,
                expires_at: 0.0,
            };
            let chain_before = state.combo_chain;
            expire_fruit(&mut state, 100.0);
            assert_eq!(state.avoided_toxic, i);
            if i == 3 {
                assert_eq!(state.combo_chain, chain_before + 2);
                assert_eq!(state.message.as_deref(), Some(messages::TOXIC_DODGE_BONUS));
            } else {
                assert_eq!(state.combo_chain, chain_before);
                assert_eq!(state.message.as_deref(), Some(messages::TOXIC_DODGED));
            }
        }
    }

    #[test]
    fn test_stale_edible_fruit_decays_combo() {
        let mut state = runtime(13);
        state.combo_chain = 5;
        state.fruit = Fruit {
            position: Position::new(0, 24),
            kind: FruitKind::Normal,
            expires_at: 10.0,
        };
        expire_fruit(&mut state, 100.0);
        assert_eq!(state.combo_chain, 4);
        assert_eq!(state.message.as_deref(), Some(messages::FRUIT_EXPIRED));
        assert!(state.fruit.expires_at > 100.0);
        assert!(!state.snake.contains(&state.fruit.position));
    }

    #[test]
    fn test_magnet_pulls_fruit_toward_head() {
        let mut state = runtime(14);
        state.active_power_ups.activate(PowerUpKind::Magnet, 10_000.0);
        // Head lands on (15,12); fruit 3 away gets pulled diagonally
        plant_fruit(&mut state, Position::new(17, 13), FruitKind::Normal);
        step(&mut state, 100.0);
        assert_eq!(state.fruit.position, Position::new(16, 12));
    }

    #[test]
    fn test_magnet_ignores_far_or_blocked_fruit() {
        let mut state = runtime(15);
        state.active_power_ups.activate(PowerUpKind::Magnet, 10_000.0);
        plant_fruit(&mut state, Position::new(20, 20), FruitKind::Normal);
        step(&mut state, 100.0);
        assert_eq!(state.fruit.position, Position::new(20, 20));

        // Destination occupied by the body: silently no-op
        let mut state = runtime(15);
        state.active_power_ups.activate(PowerUpKind::Magnet, 10_000.0);
        // After the move the body occupies (14,12); fruit at (13,12) would
        // step onto it
        plant_fruit(&mut state, Position::new(13, 12), FruitKind::Normal);
        step(&mut state, 100.0);
        assert_eq!(state.fruit.position, Position::new(13, 12));
    }

    #[test]
    fn test_speed_level_from_fruit_counter() {
        let mut state = runtime(16);
        state.fruit_counter = 7;
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        step(&mut state, 100.0);
        assert_eq!(state.fruit_counter, 8);
        assert_eq!(state.speed_level, 2);

        state.fruit_counter = 100;
        let next = state.pending_direction.advance(state.head());
        plant_fruit(&mut state, next, FruitKind::Normal);
        step(&mut state, 200.0);
        assert_eq!(state.speed_level, MAX_SPEED_LEVEL);
    }

    #[test]
    fn test_speed_bonus_feeds_score() {
        let mut state = runtime(17);
        state.speed_level = 2;
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        let snap = step(&mut state, 100.0);
        // round((10 + 2*3) * 1) = 16
        assert_eq!(snap.score, 16);
    }

    #[test]
    fn test_combo_multiplier_capped_with_speed_boost() {
        let mut state = runtime(18);
        state.combo_chain = 40;
        state.active_power_ups.activate(PowerUpKind::Speed, 10_000.0);
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        let snap = step(&mut state, 100.0);
        assert_eq!(snap.combo_multiplier, MAX_COMBO_MULTIPLIER);
    }

    #[test]
    fn test_speed_interval_formula() {
        let mut state = runtime(19);
        assert_eq!(compute_speed_interval(&state, 0.0), 150.0);

        state.speed_level = 3;
        assert_eq!(compute_speed_interval(&state, 0.0), 150.0 - 18.0);

        // The floor holds even past the level cap
        state.base_speed = 80.0;
        state.speed_level = 20;
        assert_eq!(compute_speed_interval(&state, 0.0), MIN_SPEED_MS);
    }

    #[test]
    fn test_slowmo_and_speed_stack_to_1_125x() {
        let mut state = runtime(20);
        state.active_power_ups.activate(PowerUpKind::Slowmo, 10_000.0);
        state.active_power_ups.activate(PowerUpKind::Speed, 10_000.0);
        let interval = compute_speed_interval(&state, 0.0);
        assert!((interval - 150.0 * 1.125).abs() < 1e-9);
    }

    #[test]
    fn test_particles_spawn_and_decay() {
        let mut state = runtime(21);
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Golden);
        step(&mut state, 100.0);
        assert_eq!(state.particles.len(), PARTICLES_PER_FRUIT);
        assert!(state.particles.iter().all(|p| p.kind == FruitKind::Golden));

        // Lives are at most 27 ticks
        for _ in 0..30 {
            advance_particles(&mut state);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_fx_disabled_spawns_no_particles() {
        let mut state = GameRuntime::new(
            GameOptions {
                fx_enabled: false,
                seed: 22,
                ..GameOptions::default()
            },
            0.0,
        );
        plant_fruit(&mut state, Position::new(15, 12), FruitKind::Normal);
        step(&mut state, 100.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = runtime(777);
        let mut b = runtime(777);
        let mut now = 0.0;
        for i in 0..40 {
            now += 120.0;
            if i % 7 == 0 {
                a.queue_direction(Direction::Up);
                b.queue_direction(Direction::Up);
            } else if i % 11 == 0 {
                a.queue_direction(Direction::Right);
                b.queue_direction(Direction::Right);
            }
            let sa = step(&mut a, now);
            let sb = step(&mut b, now);
            assert_eq!(sa, sb);
            assert_eq!(a.snake, b.snake);
            if sa.status != GameStatus::Running {
                break;
            }
        }
    }
}
