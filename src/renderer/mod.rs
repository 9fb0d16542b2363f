//! Software 2D renderer
//!
//! Pure function of (frame, runtime): paints one snapshot of the
//! simulation, never mutates it, and performs no I/O. The host decides
//! how the resulting pixels reach the screen.
//!
//! Z-order: background gradient, grid lines, fruit, power-up badge,
//! snake tail to head, particles (fx only).

pub mod frame;
pub mod shapes;

pub use frame::{Frame, Rgba};

use crate::sim::{Fruit, FruitKind, GameRuntime, Particle, PowerUpKind, PowerUpPickup};

const BACKGROUND_TOP: Rgba = Rgba::opaque(3, 7, 18);
const BACKGROUND_BOTTOM: Rgba = Rgba::opaque(5, 15, 31);
const GRID_LINE: Rgba = Rgba::new(94, 234, 212, 20);
const SNAKE_BODY: Rgba = Rgba::opaque(94, 234, 212);
const BADGE_INK: Rgba = Rgba::opaque(5, 11, 19);

fn fruit_color(kind: FruitKind) -> Rgba {
    match kind {
        FruitKind::Normal => Rgba::opaque(59, 242, 165),
        FruitKind::Golden => Rgba::opaque(250, 204, 21),
        FruitKind::Toxic => Rgba::opaque(192, 132, 252),
    }
}

fn power_up_color(kind: PowerUpKind) -> Rgba {
    match kind {
        PowerUpKind::Slowmo => Rgba::opaque(56, 189, 248),
        PowerUpKind::Speed => Rgba::opaque(251, 146, 60),
        PowerUpKind::Magnet => Rgba::opaque(244, 114, 182),
        PowerUpKind::Ghost => Rgba::opaque(167, 139, 250),
    }
}

fn badge_glyph(kind: PowerUpKind) -> char {
    match kind {
        PowerUpKind::Slowmo => 'S',
        PowerUpKind::Speed => 'V',
        PowerUpKind::Magnet => 'M',
        PowerUpKind::Ghost => 'G',
    }
}

/// Paint the runtime onto the frame. Cell size derives from the frame
/// edge, so any square surface works.
pub fn render(frame: &mut Frame, state: &GameRuntime) {
    let size = frame.size() as f32;
    let cell = size / state.grid_size as f32;

    draw_background(frame);
    draw_grid_lines(frame, state.grid_size, cell);
    draw_fruit(frame, &state.fruit, cell);
    if let Some(pickup) = &state.power_up_pickup {
        draw_pickup(frame, pickup, cell);
    }
    draw_snake(frame, state, cell);
    if state.fx_enabled {
        draw_particles(frame, &state.particles, cell);
    }
}

/// Diagonal two-stop gradient, top-left to bottom-right
fn draw_background(frame: &mut Frame) {
    let size = frame.size();
    let span = (2 * (size - 1)).max(1) as f32;
    for y in 0..size {
        for x in 0..size {
            let t = (x + y) as f32 / span;
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
            frame.blend(
                x as i32,
                y as i32,
                Rgba::opaque(
                    lerp(BACKGROUND_TOP.r, BACKGROUND_BOTTOM.r),
                    lerp(BACKGROUND_TOP.g, BACKGROUND_BOTTOM.g),
                    lerp(BACKGROUND_TOP.b, BACKGROUND_BOTTOM.b),
                ),
            );
        }
    }
}

fn draw_grid_lines(frame: &mut Frame, grid_size: i32, cell: f32) {
    let edge = frame.size() as i32;
    for i in 0..=grid_size {
        let offset = (i as f32 * cell).round() as i32;
        for p in 0..edge {
            frame.blend(offset.min(edge - 1), p, GRID_LINE);
            frame.blend(p, offset.min(edge - 1), GRID_LINE);
        }
    }
}

fn draw_fruit(frame: &mut Frame, fruit: &Fruit, cell: f32) {
    let color = fruit_color(fruit.kind);
    let cx = fruit.position.x as f32 * cell + cell / 2.0;
    let cy = fruit.position.y as f32 * cell + cell / 2.0;
    shapes::glow(frame, cx, cy, cell * 1.3, color.with_alpha(90));

    let padding = cell * 0.15;
    shapes::fill_rounded_rect(
        frame,
        fruit.position.x as f32 * cell + padding,
        fruit.position.y as f32 * cell + padding,
        cell - padding * 2.0,
        cell - padding * 2.0,
        6.0,
        color,
    );
}

/// Circular badge with the type glyph punched in dark ink
fn draw_pickup(frame: &mut Frame, pickup: &PowerUpPickup, cell: f32) {
    let color = power_up_color(pickup.kind);
    let cx = pickup.position.x as f32 * cell + cell / 2.0;
    let cy = pickup.position.y as f32 * cell + cell / 2.0;
    let radius = cell * 0.9 / 2.0;
    shapes::fill_circle(frame, cx, cy, radius, color.with_alpha(136));

    let scale = ((cell * 0.35 / 7.0).round() as i32).max(1);
    let (gw, gh) = shapes::glyph_extent(scale);
    shapes::draw_glyph(
        frame,
        badge_glyph(pickup.kind),
        cx as i32 - gw / 2,
        cy as i32 - gh / 2,
        scale,
        BADGE_INK,
    );
}

fn draw_snake(frame: &mut Frame, state: &GameRuntime, cell: f32) {
    let len = state.snake.len();
    // Tail first so the head's glow lands on top
    for (index, segment) in state.snake.iter().enumerate().rev() {
        let head = index == 0;
        let intensity = 1.0 - index as f32 / (len + 5) as f32;
        let cx = segment.x as f32 * cell + cell / 2.0;
        let cy = segment.y as f32 * cell + cell / 2.0;

        shapes::glow(
            frame,
            cx,
            cy,
            if head { cell * 1.1 } else { cell * 0.55 },
            SNAKE_BODY.with_alpha(70),
        );

        let padding = if head { cell * 0.1 } else { cell * 0.18 };
        shapes::fill_rounded_rect(
            frame,
            segment.x as f32 * cell + padding,
            segment.y as f32 * cell + padding,
            cell - padding * 2.0,
            cell - padding * 2.0,
            6.0,
            SNAKE_BODY.faded(0.85 * intensity),
        );
    }
}

/// Opacity and radius both scale linearly with remaining life fraction
fn draw_particles(frame: &mut Frame, particles: &[Particle], cell: f32) {
    for particle in particles {
        let life_fraction = particle.life as f32 / particle.max_life as f32;
        let color = fruit_color(particle.kind).faded(0.85 * life_fraction);
        let radius = (cell * 0.15 * life_fraction).max(1.0);
        shapes::fill_circle(
            frame,
            particle.pos.x * cell + cell / 2.0,
            particle.pos.y * cell + cell / 2.0,
            radius,
            color,
        );
    }
}
