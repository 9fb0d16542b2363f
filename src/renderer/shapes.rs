//! Shape rasterizers: rounded rects, circles, glow halos and tiny glyphs

use super::frame::{Frame, Rgba};

/// Blend a filled rectangle with rounded corners. Coordinates are in
/// pixels; the corner radius is clamped to half the short edge.
pub fn fill_rounded_rect(frame: &mut Frame, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
    let radius = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = (x + w).ceil() as i32;
    let y1 = (y + h).ceil() as i32;

    for py in y0..y1 {
        for px in x0..x1 {
            let cx = px as f32 + 0.5;
            let cy = py as f32 + 0.5;
            if cx < x || cy < y || cx >= x + w || cy >= y + h {
                continue;
            }
            // Corner test: distance from the nearest corner-arc center
            let nx = cx.clamp(x + radius, x + w - radius);
            let ny = cy.clamp(y + radius, y + h - radius);
            let dx = cx - nx;
            let dy = cy - ny;
            if dx * dx + dy * dy <= radius * radius {
                frame.blend(px, py, color);
            }
        }
    }
}

/// Blend a filled circle
pub fn fill_circle(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: Rgba) {
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    let y0 = (cy - radius).floor() as i32;
    let y1 = (cy + radius).ceil() as i32;
    let r2 = radius * radius;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                frame.blend(px, py, color);
            }
        }
    }
}

/// Soft radial halo: alpha falls off quadratically toward the rim.
/// Stands in for the canvas shadow-blur glow.
pub fn glow(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: Rgba) {
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    let y0 = (cy - radius).floor() as i32;
    let y1 = (cy + radius).ceil() as i32;
    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < radius {
                let falloff = 1.0 - dist / radius;
                frame.blend(px, py, color.faded(falloff * falloff));
            }
        }
    }
}

/// 5x7 bitmap rows for the power-up badge glyphs
fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        _ => return None,
    })
}

/// Draw a single glyph with its top-left at (x, y), each bit scaled to a
/// `scale`-sized square. Unknown glyphs draw nothing.
pub fn draw_glyph(frame: &mut Frame, ch: char, x: i32, y: i32, scale: i32, color: Rgba) {
    let Some(rows) = glyph_rows(ch) else {
        return;
    };
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..5 {
            if bits & (1 << (4 - col)) != 0 {
                frame.blend_rect(
                    x + col * scale,
                    y + row as i32 * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

/// Glyph bitmap extent in pixels for a given scale
pub fn glyph_extent(scale: i32) -> (i32, i32) {
    (5 * scale, 7 * scale)
}
