use std::fmt;

use crate::color::Rgb;

/// Packed RGB24 raster for one instant of the clip.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Frame {
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixel_count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 3);
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    /// Pixels that differ from `color`.
    pub fn count_not(&self, color: Rgb) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| px != &[color.r, color.g, color.b])
            .count()
    }

    /// Blend `color` through `mask` with the mask's pen origin at `(x, y)`.
    /// Parts falling outside the frame are clipped.
    pub fn stamp(&mut self, mask: &TextMask, x: i32, y: i32, color: Rgb) {
        let left = x + mask.origin_x;
        let top = y + mask.origin_y;
        let width = self.width as i32;
        let height = self.height as i32;

        for row in 0..mask.height {
            let fy = top + row as i32;
            if fy < 0 || fy >= height {
                continue;
            }
            let mask_row = &mask.coverage[row * mask.width..(row + 1) * mask.width];
            for (col, &alpha) in mask_row.iter().enumerate() {
                let fx = left + col as i32;
                if alpha == 0 || fx < 0 || fx >= width {
                    continue;
                }
                let idx = (fy as usize * self.width as usize + fx as usize) * 3;
                blend(&mut self.pixels[idx..idx + 3], color, alpha);
            }
        }
    }
}

fn blend(dst: &mut [u8], color: Rgb, alpha: u8) {
    if alpha == u8::MAX {
        dst.copy_from_slice(&[color.r, color.g, color.b]);
        return;
    }
    let a = alpha as u32;
    let inv = 255 - a;
    for (channel, src) in dst.iter_mut().zip([color.r, color.g, color.b]) {
        *channel = ((*channel as u32 * inv + src as u32 * a + 127) / 255) as u8;
    }
}

/// Coverage bitmap of a rendered glyph run.
///
/// `origin_x`/`origin_y` place the bitmap relative to the run's pen origin
/// (left edge, top of the line box); glyphs may overhang on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMask {
    pub width: usize,
    pub height: usize,
    pub origin_x: i32,
    pub origin_y: i32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    pub fn new(width: usize, height: usize, origin_x: i32, origin_y: i32) -> Self {
        Self {
            width,
            height,
            origin_x,
            origin_y,
            coverage: vec![0; width * height],
        }
    }

    /// Merge a glyph bitmap whose top-left sits at pen-relative `(x, y)`.
    pub fn merge(&mut self, x: i32, y: i32, glyph_width: usize, bitmap: &[u8]) {
        if glyph_width == 0 {
            return;
        }
        for (row, line) in bitmap.chunks_exact(glyph_width).enumerate() {
            let my = y - self.origin_y + row as i32;
            if my < 0 || my >= self.height as i32 {
                continue;
            }
            for (col, &value) in line.iter().enumerate() {
                let mx = x - self.origin_x + col as i32;
                if value == 0 || mx < 0 || mx >= self.width as i32 {
                    continue;
                }
                let idx = my as usize * self.width + mx as usize;
                self.coverage[idx] = self.coverage[idx].max(value);
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }
}
