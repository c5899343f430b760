use std::fs;
use std::path::{Path, PathBuf};

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use fontdue::{Font, FontSettings};
use tracing::{debug, info, warn};

use super::raster::TextMask;

const BITMAP_CELL: usize = 8;

/// A loaded face, shared read-only by every frame worker.
pub enum Typeface {
    Vector(Font),
    /// Built-in 8x8 face scaled to the requested size.
    Bitmap,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Vector(_) => f.write_str("Typeface::Vector"),
            Typeface::Bitmap => f.write_str("Typeface::Bitmap"),
        }
    }
}

impl Typeface {
    /// First candidate that parses; the built-in face if none does.
    pub fn load(candidates: &[PathBuf]) -> Self {
        for path in candidates {
            if let Some(face) = Self::from_file(path) {
                info!(font = %path.display(), "loaded caption font");
                return face;
            }
        }
        warn!("no usable font found; captions will use the built-in bitmap face");
        Self::Bitmap
    }

    fn from_file(path: &Path) -> Option<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(font = %path.display(), error = %err, "font candidate unavailable");
                return None;
            }
        };
        match Font::from_bytes(bytes, FontSettings::default()) {
            Ok(font) => Some(Self::Vector(font)),
            Err(err) => {
                warn!(font = %path.display(), error = err, "failed to parse font");
                None
            }
        }
    }

    pub fn builtin() -> Self {
        Self::Bitmap
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Bitmap)
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self, px: f32) -> f32 {
        match self {
            Self::Vector(font) => font
                .horizontal_line_metrics(px)
                .map(|m| m.ascent)
                .unwrap_or(px * 0.8),
            Self::Bitmap => px,
        }
    }

    pub fn line_height(&self, px: f32) -> f32 {
        match self {
            Self::Vector(font) => font
                .horizontal_line_metrics(px)
                .map(|m| m.ascent - m.descent)
                .unwrap_or(px),
            Self::Bitmap => px,
        }
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        match self {
            Self::Vector(font) => text
                .chars()
                .map(|ch| font.metrics(ch, px).advance_width)
                .sum(),
            Self::Bitmap => text.chars().count() as f32 * bitmap_cell(px) as f32,
        }
    }

    /// Rasterize a single-line run into a coverage mask.
    pub fn rasterize(&self, text: &str, px: f32) -> TextMask {
        let pad = (px * 0.25).ceil() as i32 + 1;
        let width = self.measure(text, px).ceil() as i32 + pad * 2;
        let height = self.line_height(px).ceil() as i32 + pad * 2;
        let mut mask = TextMask::new(width.max(0) as usize, height.max(0) as usize, -pad, -pad);

        match self {
            Self::Vector(font) => {
                let baseline = self.ascent(px);
                let mut pen = 0.0f32;
                for ch in text.chars() {
                    let (metrics, bitmap) = font.rasterize(ch, px);
                    let x = (pen + metrics.xmin as f32).round() as i32;
                    let y = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;
                    mask.merge(x, y, metrics.width, &bitmap);
                    pen += metrics.advance_width;
                }
            }
            Self::Bitmap => {
                let cell = bitmap_cell(px);
                for (idx, ch) in text.chars().enumerate() {
                    let bitmap = scaled_bitmap_glyph(ch, cell);
                    mask.merge((idx * cell) as i32, 0, cell, &bitmap);
                }
            }
        }

        mask
    }
}

fn bitmap_cell(px: f32) -> usize {
    (px.round() as usize).max(1)
}

fn bitmap_rows(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Nearest-neighbour upscale of an 8x8 glyph to a `cell`x`cell` bitmap.
fn scaled_bitmap_glyph(ch: char, cell: usize) -> Vec<u8> {
    let rows = bitmap_rows(ch);
    let mut bitmap = vec![0u8; cell * cell];
    for y in 0..cell {
        let bits = rows[y * BITMAP_CELL / cell];
        for x in 0..cell {
            // bit 0 is the leftmost pixel
            if bits >> (x * BITMAP_CELL / cell) & 1 == 1 {
                bitmap[y * cell + x] = u8::MAX;
            }
        }
    }
    bitmap
}
