//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete grid ticks only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//! - No I/O; callers supply a monotonic `now` in milliseconds

pub mod messages;
pub mod spawn;
pub mod state;
pub mod tick;

pub use state::{
    ActivePowerUps, Direction, Fruit, FruitKind, GameOptions, GameRuntime, GameStatus, Particle,
    Position, PowerUpKind, PowerUpPickup, StepSnapshot,
};
pub use tick::{compute_speed_interval, step};
