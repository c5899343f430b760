use crate::color::{hex_to_rgb, Rgb};
use crate::error::{ReelError, Result};
use crate::types::RenderMode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaraokeStyle {
    pub font_size: f32,
    pub highlight_font_size: f32,
    pub words_per_line: usize,
    /// Words shown around the active one; half before, half after.
    pub context_window: usize,
    pub line_gap: i32,
    pub past_dim: f32,
    pub future_dim: f32,
}

impl Default for KaraokeStyle {
    fn default() -> Self {
        Self {
            font_size: 60.0,
            highlight_font_size: 72.0,
            words_per_line: 4,
            context_window: 10,
            line_gap: 20,
            past_dim: 0.7,
            future_dim: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtitleStyle {
    pub font_size: f32,
    /// Horizontal padding on each side of the wrap budget.
    pub side_padding: i32,
    pub bottom_offset: i32,
    pub outline_width: i32,
    pub line_gap: i32,
    /// Seconds a caption stays up after its last word ends.
    pub linger: f64,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_size: 96.0,
            side_padding: 40,
            bottom_offset: 120,
            outline_width: 3,
            line_gap: 10,
            linger: 0.3,
        }
    }
}

/// Immutable styling for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub background: Rgb,
    pub highlight: Rgb,
    pub mode: RenderMode,
    pub karaoke: KaraokeStyle,
    pub subtitle: SubtitleStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            background: Rgb::BLACK,
            highlight: Rgb::WHITE,
            mode: RenderMode::Karaoke,
            karaoke: KaraokeStyle::default(),
            subtitle: SubtitleStyle::default(),
        }
    }
}

impl RenderConfig {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse `#RRGGBB` background and highlight colors.
    pub fn with_colors(mut self, background: &str, highlight: &str) -> Result<Self> {
        self.background = hex_to_rgb(background)?;
        self.highlight = hex_to_rgb(highlight)?;
        Ok(self)
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::InvalidConfig(format!(
                "resolution must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(ReelError::InvalidConfig("fps must be positive".to_string()));
        }
        if self.karaoke.words_per_line == 0 {
            return Err(ReelError::InvalidConfig(
                "karaoke words per line must be positive".to_string(),
            ));
        }
        if self.karaoke.font_size <= 0.0
            || self.karaoke.highlight_font_size <= 0.0
            || self.subtitle.font_size <= 0.0
        {
            return Err(ReelError::InvalidConfig(
                "font sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Bytes in one packed RGB frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}
