//! Word-by-word highlighting over a scrolling context window.

use std::ops::Range;

use crate::color::Rgb;
use crate::config::RenderConfig;
use crate::types::Word;

use super::font::Typeface;
use super::raster::Frame;
use super::RenderSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    Active,
    Spoken,
    Upcoming,
}

pub fn word_state(word: &Word, t: f64) -> WordState {
    if word.start <= t && t <= word.end {
        WordState::Active
    } else if word.end < t {
        WordState::Spoken
    } else {
        WordState::Upcoming
    }
}

/// Index of the word being spoken at `t`.
///
/// Between words this is the previous word (clamped to 0), past the end the
/// last word. `None` only for an empty list.
pub fn active_word_index(words: &[Word], t: f64) -> Option<usize> {
    for (idx, word) in words.iter().enumerate() {
        if word.start <= t && t <= word.end {
            return Some(idx);
        }
        if word.start > t {
            return Some(idx.saturating_sub(1));
        }
    }
    words.len().checked_sub(1)
}

/// Words shown around `active`: `window / 2` on each side, clamped to the list.
pub fn context_range(len: usize, active: usize, window: usize) -> Range<usize> {
    let half = window / 2;
    let start = active.saturating_sub(half);
    let end = (active + half + 1).min(len);
    start..end
}

pub(super) fn draw(
    frame: &mut Frame,
    t: f64,
    snapshot: &RenderSnapshot,
    config: &RenderConfig,
    face: &Typeface,
) {
    let words = snapshot.words();
    let Some(active) = active_word_index(words, t) else {
        return;
    };
    let style = &config.karaoke;
    let context = context_range(words.len(), active, style.context_window);
    let indices: Vec<usize> = context.collect();

    let line_height = style.highlight_font_size.round() as i32 + style.line_gap;
    let lines: Vec<&[usize]> = indices.chunks(style.words_per_line).collect();
    let total_height = lines.len() as i32 * line_height;
    let start_y = (config.height as i32 - total_height).div_euclid(2);

    for (line_idx, line) in lines.iter().enumerate() {
        let y = start_y + line_idx as i32 * line_height;
        let line_text = line
            .iter()
            .map(|&i| words[i].text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let line_width = face.measure(&line_text, style.font_size).round() as i32;
        let mut x = (config.width as i32 - line_width).div_euclid(2);

        for &idx in line.iter() {
            let word = &words[idx];
            let base = snapshot.word_color(idx);
            let (color, size) = match word_state(word, t) {
                WordState::Active => (config.highlight, style.highlight_font_size),
                WordState::Spoken => (base.scaled(style.past_dim), style.font_size),
                WordState::Upcoming => (base.scaled(style.future_dim), style.font_size),
            };
            draw_word(frame, face, &word.text, size, x, y, color);
            x += face.measure(&format!("{} ", word.text), size).round() as i32;
        }
    }
}

fn draw_word(frame: &mut Frame, face: &Typeface, text: &str, size: f32, x: i32, y: i32, color: Rgb) {
    let mask = face.rasterize(text, size);
    frame.stamp(&mask, x, y, color);
}
