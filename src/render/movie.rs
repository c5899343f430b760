//! Bottom-anchored, outlined subtitle blocks.

use crate::color::subtitle_contrast;
use crate::config::RenderConfig;
use crate::types::SubtitleChunk;

use super::font::Typeface;
use super::raster::Frame;
use super::RenderSnapshot;

/// First chunk whose `[start, end + linger]` interval contains `t`.
pub fn active_chunk(chunks: &[SubtitleChunk], t: f64, linger: f64) -> Option<&SubtitleChunk> {
    chunks
        .iter()
        .find(|chunk| chunk.start <= t && t <= chunk.end + linger)
}

/// Greedy word wrap: a word joins the current line while the measured line
/// stays within `max_width`. A single over-long word gets its own line.
pub fn wrap_text(face: &Typeface, text: &str, px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        current.push(word);
        if face.measure(&current.join(" "), px) <= max_width {
            continue;
        }
        current.pop();
        if !current.is_empty() {
            lines.push(current.join(" "));
        }
        current = vec![word];
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub(super) fn draw(
    frame: &mut Frame,
    t: f64,
    snapshot: &RenderSnapshot,
    config: &RenderConfig,
    face: &Typeface,
) {
    let style = &config.subtitle;
    let Some(chunk) = active_chunk(snapshot.chunks(), t, style.linger) else {
        return;
    };

    let max_width = (config.width as i32 - style.side_padding * 2) as f32;
    let lines = wrap_text(face, &chunk.text, style.font_size, max_width);

    let line_height = style.font_size.round() as i32 + style.line_gap;
    let total_height = lines.len() as i32 * line_height;
    let start_y = config.height as i32 - total_height - style.bottom_offset;
    let contrast = subtitle_contrast(config.background);
    let reach = style.outline_width;

    for (line_idx, line) in lines.iter().enumerate() {
        let mask = face.rasterize(line, style.font_size);
        let line_width = face.measure(line, style.font_size).round() as i32;
        let x = (config.width as i32 - line_width).div_euclid(2);
        let y = start_y + line_idx as i32 * line_height;

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if dx != 0 || dy != 0 {
                    frame.stamp(&mask, x + dx, y + dy, contrast.outline);
                }
            }
        }
        frame.stamp(&mask, x, y, contrast.fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Word;

    fn chunk(start: f64, end: f64) -> SubtitleChunk {
        SubtitleChunk {
            words: vec![Word::new("hi", start, end)],
            text: "hi".to_string(),
            start,
            end,
        }
    }

    #[test]
    fn caption_lingers_after_last_word() {
        let chunks = vec![chunk(1.0, 2.0), chunk(3.0, 4.0)];
        assert!(active_chunk(&chunks, 0.5, 0.3).is_none());
        assert_eq!(active_chunk(&chunks, 2.25, 0.3).map(|c| c.start), Some(1.0));
        assert!(active_chunk(&chunks, 2.5, 0.3).is_none());
        assert_eq!(active_chunk(&chunks, 3.0, 0.3).map(|c| c.start), Some(3.0));
    }

    #[test]
    fn overlapping_linger_prefers_earlier_chunk() {
        let chunks = vec![chunk(1.0, 2.0), chunk(2.1, 3.0)];
        assert_eq!(active_chunk(&chunks, 2.2, 0.3).map(|c| c.start), Some(1.0));
    }

    #[test]
    fn wraps_by_measured_width() {
        // built-in face: 10px per character at size 10
        let face = Typeface::builtin();
        let lines = wrap_text(&face, "aa bb cc dd", 10.0, 50.0);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn long_word_gets_own_line() {
        let face = Typeface::builtin();
        let lines = wrap_text(&face, "a enormousword b", 10.0, 50.0);
        assert_eq!(lines, vec!["a", "enormousword", "b"]);
    }

    #[test]
    fn empty_text_yields_single_blank_line() {
        let face = Typeface::builtin();
        assert_eq!(wrap_text(&face, "   ", 10.0, 50.0), vec![String::new()]);
    }
}
