//! Game state and core simulation types
//!
//! The `GameRuntime` aggregate owns everything the step function mutates.
//! All timestamps are absolute milliseconds from the host's monotonic clock.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;

/// A cell on the play field. Signed so a candidate head can sit one step
/// outside the grid before the wall check rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell
    pub fn manhattan(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// True if the cell lies outside `[0, grid)` on either axis
    pub fn hits_wall(&self, grid_size: i32) -> bool {
        self.x < 0 || self.y < 0 || self.x >= grid_size || self.y >= grid_size
    }
}

/// Movement heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The exact reverse heading
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// One-cell offset (grid y grows downward, matching the canvas)
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The cell one step ahead of `from`
    pub fn advance(&self, from: Position) -> Position {
        let (dx, dy) = self.delta();
        Position::new(from.x + dx, from.y + dy)
    }
}

/// Fruit flavors with their gameplay table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitKind {
    Normal,
    Golden,
    Toxic,
}

impl FruitKind {
    /// Base score value (toxic is negative)
    pub fn value(&self) -> i32 {
        match self {
            FruitKind::Normal => 10,
            FruitKind::Golden => 50,
            FruitKind::Toxic => -20,
        }
    }

    /// Length change on collection (negative shrinks immediately)
    pub fn growth(&self) -> i32 {
        match self {
            FruitKind::Normal => 1,
            FruitKind::Golden => 3,
            FruitKind::Toxic => -2,
        }
    }

    /// How long the fruit stays on the board before expiring
    pub fn lifetime_ms(&self) -> f64 {
        match self {
            FruitKind::Normal => 9000.0,
            FruitKind::Golden => 7000.0,
            FruitKind::Toxic => 6000.0,
        }
    }

    /// Spawn probability weight (sums to 1.0 across kinds)
    pub fn spawn_weight(&self) -> f64 {
        match self {
            FruitKind::Normal => 0.7,
            FruitKind::Golden => 0.2,
            FruitKind::Toxic => 0.1,
        }
    }

    /// Roll order for cumulative weighted selection
    pub const ALL: [FruitKind; 3] = [FruitKind::Normal, FruitKind::Golden, FruitKind::Toxic];
}

/// The fruit currently on the board. Exactly one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fruit {
    pub position: Position,
    pub kind: FruitKind,
    pub expires_at: f64,
}

/// Timed power-up flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Slowmo,
    Speed,
    Magnet,
    Ghost,
}

impl PowerUpKind {
    /// Effect duration once activated
    pub fn duration_ms(&self) -> f64 {
        match self {
            PowerUpKind::Slowmo => 6000.0,
            PowerUpKind::Speed => 4500.0,
            PowerUpKind::Magnet => 7000.0,
            PowerUpKind::Ghost => 3200.0,
        }
    }

    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Slowmo,
        PowerUpKind::Speed,
        PowerUpKind::Magnet,
        PowerUpKind::Ghost,
    ];
}

/// An uncollected power-up lying on the board (0 or 1 present)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpPickup {
    pub position: Position,
    pub kind: PowerUpKind,
    pub expires_at: f64,
}

/// Expiry timestamps of the currently active effects.
/// Re-activating a kind refreshes its slot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActivePowerUps {
    pub slowmo: Option<f64>,
    pub speed: Option<f64>,
    pub magnet: Option<f64>,
    pub ghost: Option<f64>,
}

impl ActivePowerUps {
    fn slot_mut(&mut self, kind: PowerUpKind) -> &mut Option<f64> {
        match kind {
            PowerUpKind::Slowmo => &mut self.slowmo,
            PowerUpKind::Speed => &mut self.speed,
            PowerUpKind::Magnet => &mut self.magnet,
            PowerUpKind::Ghost => &mut self.ghost,
        }
    }

    fn slot(&self, kind: PowerUpKind) -> Option<f64> {
        match kind {
            PowerUpKind::Slowmo => self.slowmo,
            PowerUpKind::Speed => self.speed,
            PowerUpKind::Magnet => self.magnet,
            PowerUpKind::Ghost => self.ghost,
        }
    }

    pub fn activate(&mut self, kind: PowerUpKind, until: f64) {
        *self.slot_mut(kind) = Some(until);
    }

    pub fn is_active(&self, kind: PowerUpKind, now: f64) -> bool {
        self.slot(kind).is_some_and(|expires_at| expires_at > now)
    }

    /// Drop every effect whose expiry has passed
    pub fn prune(&mut self, now: f64) {
        for kind in PowerUpKind::ALL {
            let slot = self.slot_mut(kind);
            if slot.is_some_and(|expires_at| expires_at <= now) {
                *slot = None;
            }
        }
    }
}

/// A visual-only spark emitted on fruit collection. Positions and
/// velocities are in cell space; lives are counted in ticks.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub kind: FruitKind,
}

/// Overall game status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Pre-bootstrap state for hosts that mount before starting a run;
    /// the simulation itself always bootstraps straight to `Running`
    Idle,
    Running,
    Paused,
    Over,
}

/// Bootstrap parameters
#[derive(Debug, Clone, Copy)]
pub struct GameOptions {
    pub grid_size: i32,
    pub best_score: u32,
    pub fx_enabled: bool,
    pub seed: u64,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            best_score: 0,
            fx_enabled: true,
            seed: 0,
        }
    }
}

/// The complete mutable simulation snapshot. Exclusively owned and
/// mutated by the single caller of [`crate::sim::step`].
#[derive(Debug, Clone)]
pub struct GameRuntime {
    pub snake: Vec<Position>,
    pub direction: Direction,
    pub pending_direction: Direction,
    pub grid_size: i32,
    pub fruit: Fruit,
    pub pending_growth: i32,
    pub score: u32,
    pub status: GameStatus,
    pub combo_chain: u32,
    pub combo_multiplier: u32,
    pub avoided_toxic: u32,
    pub fruit_counter: u32,
    pub power_up_pickup: Option<PowerUpPickup>,
    pub active_power_ups: ActivePowerUps,
    pub particles: Vec<Particle>,
    pub last_tick: f64,
    pub base_speed: f64,
    pub speed_level: u32,
    pub fx_enabled: bool,
    pub best_score: u32,
    pub last_fruit_kind: FruitKind,
    /// Informational message queued for the next snapshot
    pub message: Option<String>,
    /// All randomness (fruit kinds, placement, flavor lines) draws from here
    pub rng: Pcg32,
}

impl GameRuntime {
    /// Bootstrap a fresh run: 3-segment snake centered on the grid moving
    /// right, one freshly spawned fruit, empty power-ups and particles.
    pub fn new(options: GameOptions, now: f64) -> Self {
        let grid_size = options.grid_size;
        let center = grid_size / 2;
        let snake = vec![
            Position::new(center + 2, center),
            Position::new(center + 1, center),
            Position::new(center, center),
        ];
        let mut rng = Pcg32::seed_from_u64(options.seed);
        let fruit = super::spawn::spawn_fruit(&mut rng, grid_size, &snake, None, now);
        Self {
            snake,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            grid_size,
            fruit,
            pending_growth: 0,
            score: 0,
            status: GameStatus::Running,
            combo_chain: 0,
            combo_multiplier: 1,
            avoided_toxic: 0,
            fruit_counter: 0,
            power_up_pickup: None,
            active_power_ups: ActivePowerUps::default(),
            particles: Vec::new(),
            last_tick: now,
            base_speed: INITIAL_SPEED_MS,
            speed_level: 0,
            fx_enabled: options.fx_enabled,
            best_score: options.best_score,
            last_fruit_kind: fruit.kind,
            message: None,
            rng,
        }
    }

    /// Buffer a direction change for the next tick. Ignored while not
    /// running, and an exact reverse of the current heading is rejected
    /// so the snake can never U-turn into its own neck.
    pub fn queue_direction(&mut self, direction: Direction) {
        if self.status != GameStatus::Running {
            return;
        }
        if direction == self.direction.opposite() {
            return;
        }
        self.pending_direction = direction;
    }

    /// Running <-> Paused. No-op in any other status; a finished run can
    /// only re-enter Running through a fresh bootstrap.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            other => other,
        };
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    /// Project the runtime into the read-only contract handed to the
    /// presentation layer. A collision message from this tick wins over
    /// whatever expiry message was queued; the queue is drained either way.
    pub(crate) fn snapshot(&mut self, event_message: Option<String>) -> StepSnapshot {
        let queued = self.message.take();
        StepSnapshot {
            status: self.status,
            score: self.score,
            combo_multiplier: self.combo_multiplier,
            combo_chain: self.combo_chain,
            avoided_toxic: self.avoided_toxic,
            speed_level: self.speed_level,
            fruit: self.fruit,
            power_up_pickup: self.power_up_pickup,
            active_power_ups: self.active_power_ups,
            last_fruit_kind: self.last_fruit_kind,
            message: event_message.or(queued),
        }
    }
}

/// Immutable projection of the runtime after a tick; the read-only
/// contract between simulation and rendering/UI.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSnapshot {
    pub status: GameStatus,
    pub score: u32,
    pub combo_multiplier: u32,
    pub combo_chain: u32,
    pub avoided_toxic: u32,
    pub speed_level: u32,
    pub fruit: Fruit,
    pub power_up_pickup: Option<PowerUpPickup>,
    pub active_power_ups: ActivePowerUps,
    pub last_fruit_kind: FruitKind,
    pub message: Option<String>,
}
