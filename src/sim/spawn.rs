//! Entity spawning: weighted fruit rolls and free-cell placement
//!
//! Every roll draws from the runtime's seeded RNG so replays with the
//! same seed and inputs land fruit on the same cells.

use rand::Rng;

use super::state::{Fruit, FruitKind, Position, PowerUpKind, PowerUpPickup};
use crate::consts::*;

/// Weighted fruit kind selection (normal 70%, golden 20%, toxic 10%)
pub fn random_fruit_kind<R: Rng>(rng: &mut R) -> FruitKind {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for kind in FruitKind::ALL {
        cumulative += kind.spawn_weight();
        if roll <= cumulative {
            return kind;
        }
    }
    FruitKind::Normal
}

/// Find a cell that is neither occupied nor forbidden. Bounded retries;
/// on a nearly-full board this degrades to the origin cell, which cannot
/// happen under normal play since snake length stays far below capacity.
pub fn free_cell<R: Rng>(
    rng: &mut R,
    grid_size: i32,
    occupied: &[Position],
    forbidden: Option<Position>,
) -> Position {
    for _ in 0..FREE_CELL_ATTEMPTS {
        let candidate = Position::new(rng.random_range(0..grid_size), rng.random_range(0..grid_size));
        let taken = occupied.contains(&candidate) || forbidden == Some(candidate);
        if !taken {
            return candidate;
        }
    }
    Position::new(0, 0)
}

/// Spawn a replacement fruit on a free cell, excluding the snake body and
/// the pickup's cell when one is present.
pub fn spawn_fruit<R: Rng>(
    rng: &mut R,
    grid_size: i32,
    occupied: &[Position],
    pickup: Option<&PowerUpPickup>,
    now: f64,
) -> Fruit {
    let kind = random_fruit_kind(rng);
    let position = free_cell(rng, grid_size, occupied, pickup.map(|p| p.position));
    Fruit {
        position,
        kind,
        expires_at: now + kind.lifetime_ms(),
    }
}

/// Spawn a power-up pickup of a uniformly random kind, excluding the
/// snake body and the fruit's cell.
pub fn spawn_power_up<R: Rng>(
    rng: &mut R,
    grid_size: i32,
    occupied: &[Position],
    fruit_position: Position,
    now: f64,
) -> PowerUpPickup {
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    let position = free_cell(rng, grid_size, occupied, Some(fruit_position));
    PowerUpPickup {
        position,
        kind,
        expires_at: now + PICKUP_LIFETIME_MS,
    }
}
