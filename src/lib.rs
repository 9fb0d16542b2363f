//! Flux Snake - a neon grid snake arcade engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid movement, spawning, combo/score)
//! - `renderer`: Software 2D raster renderer
//! - `highscores`: Best-score record and play counter (LocalStorage on wasm)
//! - `settings`: Player preferences

pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::BestScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Cells per side of the (square) play field
    pub const GRID_SIZE: i32 = 25;
    /// Canvas edge in pixels (square)
    pub const CANVAS_SIZE: u32 = 640;

    /// Tick interval at speed level 0, in milliseconds
    pub const INITIAL_SPEED_MS: f64 = 150.0;
    /// Interval reduction per speed level
    pub const SPEED_STEP_MS: f64 = 6.0;
    /// Hard floor for the tick interval
    pub const MIN_SPEED_MS: f64 = 65.0;
    /// Fruits eaten per speed level
    pub const FRUITS_PER_LEVEL: u32 = 4;
    pub const MAX_SPEED_LEVEL: u32 = 6;

    /// Combo multiplier cap
    pub const MAX_COMBO_MULTIPLIER: u32 = 6;
    /// Every Nth dodged toxic fruit grants a combo bonus
    pub const TOXIC_AVOID_TARGET: u32 = 3;

    /// Unclaimed power-up pickups evaporate after this long
    pub const PICKUP_LIFETIME_MS: f64 = 8000.0;
    /// Manhattan range of the magnet fruit attraction
    pub const MAGNET_RANGE: i32 = 4;

    /// Free-cell search gives up after this many rolls
    pub const FREE_CELL_ATTEMPTS: u32 = 60;
    /// Particles emitted per collected fruit
    pub const PARTICLES_PER_FRUIT: usize = 8;
    /// Minimum snake length; shrink effects never go below this
    pub const MIN_SNAKE_LEN: usize = 3;
}
