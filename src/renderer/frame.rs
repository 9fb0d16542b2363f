//! RGBA raster surface and alpha blending primitives
//!
//! The frame is a plain byte buffer the wasm host hands to
//! `putImageData`; nothing here touches the platform.

/// An RGBA color. Alpha participates in source-over blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same hue with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by a fraction in [0, 1]
    pub fn faded(self, fraction: f32) -> Self {
        let a = (self.a as f32 * fraction.clamp(0.0, 1.0)) as u8;
        self.with_alpha(a)
    }
}

/// A square RGBA pixel surface
#[derive(Debug, Clone)]
pub struct Frame {
    size: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            data: vec![0; (size * size * 4) as usize],
        }
    }

    /// Edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite every pixel (no blending)
    pub fn fill(&mut self, color: Rgba) {
        for px in self.data.chunks_exact_mut(4) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = 255;
        }
    }

    /// Read back a pixel; out-of-bounds yields transparent black
    pub fn get(&self, x: i32, y: i32) -> Rgba {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return Rgba::new(0, 0, 0, 0);
        }
        let idx = ((y as u32 * self.size + x as u32) * 4) as usize;
        Rgba::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Source-over blend a single pixel. Off-surface writes are clipped.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return;
        }
        let idx = ((y as u32 * self.size + x as u32) * 4) as usize;
        let src_a = color.a as u16;
        let inv_a = 255 - src_a;
        self.data[idx] = ((color.r as u16 * src_a + self.data[idx] as u16 * inv_a) / 255) as u8;
        self.data[idx + 1] =
            ((color.g as u16 * src_a + self.data[idx + 1] as u16 * inv_a) / 255) as u8;
        self.data[idx + 2] =
            ((color.b as u16 * src_a + self.data[idx + 2] as u16 * inv_a) / 255) as u8;
        self.data[idx + 3] = 255;
    }

    /// Blend an axis-aligned rectangle, clipped to the surface
    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        for py in y..y + h {
            for px in x..x + w {
                self.blend(px, py, color);
            }
        }
    }
}
