//! Color resolution: hex parsing, speaker palettes and background contrast.

use crate::error::{ReelError, Result};
use crate::types::SpeakerStyle;

/// Palette used when rendering speaker colors.
pub const DEFAULT_RENDER_COLORS: [&str; 6] = [
    "#FF6B6B", // coral red
    "#4ECDC4", // turquoise
    "#FFE66D", // yellow
    "#95E1D3", // mint green
    "#DDA0DD", // plum
    "#F7DC6F", // gold
];

/// Palette offered when listing detected speakers; its length is the number
/// of identity slots the pause heuristic cycles through.
pub const DEFAULT_DETECTION_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#FFE66D", "#95E1D3", "#DDA0DD", "#F7DC6F", "#87CEEB", "#FFA07A",
];

/// Luminance above which a background counts as light.
const LIGHT_LUMINANCE: f64 = 128.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness, `0.299R + 0.587G + 0.114B`.
    pub fn luminance(self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// Multiply every channel by `factor`, truncating toward zero.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into channels.
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || ReelError::InvalidColor {
        value: hex.to_string(),
    };
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn is_light_background(rgb: Rgb) -> bool {
    rgb.luminance() > LIGHT_LUMINANCE
}

/// Fill and outline colors for outlined subtitle text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contrast {
    pub fill: Rgb,
    pub outline: Rgb,
}

/// Light backgrounds get black text with a white outline, dark ones the reverse.
pub fn subtitle_contrast(background: Rgb) -> Contrast {
    if is_light_background(background) {
        Contrast {
            fill: Rgb::BLACK,
            outline: Rgb::WHITE,
        }
    } else {
        Contrast {
            fill: Rgb::WHITE,
            outline: Rgb::BLACK,
        }
    }
}

/// Ordered, non-empty list of validated `#RRGGBB` colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.is_empty() {
            return Err(ReelError::InvalidConfig(
                "palette must contain at least one color".to_string(),
            ));
        }
        for color in &colors {
            hex_to_rgb(color)?;
        }
        Ok(Self { colors })
    }

    pub fn render_default() -> Self {
        Self {
            colors: DEFAULT_RENDER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn detection_default() -> Self {
        Self {
            colors: DEFAULT_DETECTION_COLORS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for `speaker_id`, cycling through the palette.
    pub fn color_for(&self, speaker_id: u32) -> &str {
        &self.colors[speaker_id as usize % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::render_default()
    }
}

/// Resolves speaker colors from caller overrides, falling back to an injected palette.
#[derive(Debug, Clone, Default)]
pub struct ColorResolver {
    palette: Palette,
}

impl ColorResolver {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Override color for `speaker_id` if one is supplied, else the palette entry.
    ///
    /// Override lists are bounded by the number of detected speakers, so a
    /// linear scan is used.
    pub fn resolve_speaker_color<'a>(
        &'a self,
        speaker_id: u32,
        overrides: Option<&'a [SpeakerStyle]>,
    ) -> &'a str {
        overrides
            .and_then(|styles| styles.iter().find(|style| style.speaker_id == speaker_id))
            .map(|style| style.color.as_str())
            .unwrap_or_else(|| self.palette.color_for(speaker_id))
    }

    pub fn resolve_speaker_rgb(
        &self,
        speaker_id: u32,
        overrides: Option<&[SpeakerStyle]>,
    ) -> Result<Rgb> {
        hex_to_rgb(self.resolve_speaker_color(speaker_id, overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(hex_to_rgb("#000000").unwrap(), Rgb::BLACK);
        assert_eq!(hex_to_rgb("FF6B6B").unwrap(), Rgb::new(255, 107, 107));
        assert_eq!(hex_to_rgb("#4ecdc4").unwrap(), Rgb::new(78, 205, 196));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#FFF", "#GGGGGG", "#1234567", "12345", "#12 456", "#ÿÿÿ"] {
            let err = hex_to_rgb(bad).unwrap_err();
            assert!(
                matches!(err, ReelError::InvalidColor { ref value } if value == bad),
                "expected InvalidColor for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn luminance_boundary_is_exclusive() {
        // 128 * (0.299 + 0.587 + 0.114) = 128
        assert!(!is_light_background(Rgb::new(128, 128, 128)));
        assert!(is_light_background(Rgb::new(129, 129, 129)));
        assert!(!is_light_background(Rgb::BLACK));
        assert!(is_light_background(Rgb::WHITE));
    }

    #[test]
    fn dark_background_gets_white_fill() {
        let bg = hex_to_rgb("#000000").unwrap();
        assert_eq!(bg.luminance(), 0.0);
        let contrast = subtitle_contrast(bg);
        assert_eq!(contrast.fill, Rgb::WHITE);
        assert_eq!(contrast.outline, Rgb::BLACK);
    }

    #[test]
    fn light_background_gets_black_fill() {
        let contrast = subtitle_contrast(Rgb::new(240, 240, 240));
        assert_eq!(contrast.fill, Rgb::BLACK);
        assert_eq!(contrast.outline, Rgb::WHITE);
    }

    #[test]
    fn override_wins_over_palette() {
        let resolver = ColorResolver::default();
        let overrides = vec![SpeakerStyle {
            speaker_id: 1,
            color: "#123456".to_string(),
            name: Some("Host".to_string()),
        }];
        assert_eq!(resolver.resolve_speaker_color(1, Some(&overrides)), "#123456");
        assert_eq!(resolver.resolve_speaker_color(0, Some(&overrides)), "#FF6B6B");
        assert_eq!(resolver.resolve_speaker_color(1, None), "#4ECDC4");
    }

    #[test]
    fn palette_cycles_by_modulo() {
        let resolver = ColorResolver::new(Palette::new(["#010101", "#020202"]).unwrap());
        assert_eq!(resolver.resolve_speaker_color(0, None), "#010101");
        assert_eq!(resolver.resolve_speaker_color(3, None), "#020202");
        assert_eq!(resolver.resolve_speaker_color(6, None), "#010101");
    }

    #[test]
    fn palette_rejects_empty_and_invalid() {
        assert!(Palette::new(Vec::<String>::new()).is_err());
        assert!(matches!(
            Palette::new(["#XYZXYZ"]),
            Err(ReelError::InvalidColor { .. })
        ));
    }

    #[test]
    fn scaling_truncates_channels() {
        let base = Rgb::new(255, 107, 107);
        assert_eq!(base.scaled(0.7), Rgb::new(178, 74, 74));
        assert_eq!(base.scaled(0.4), Rgb::new(102, 42, 42));
    }
}
