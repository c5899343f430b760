//! Greedy grouping of words into caption-sized subtitle chunks.

mod accumulator;
mod planner;

#[cfg(test)]
mod tests;

pub use planner::group_into_subtitles;

pub const DEFAULT_MAX_WORDS: usize = 8;
pub const DEFAULT_MAX_DURATION: f64 = 4.0;

/// Characters that close a chunk when they end a word.
pub(crate) const BREAK_PUNCTUATION: [char; 6] = ['.', '!', '?', ',', ';', ':'];

/// Limits applied while growing a chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtitleConfig {
    pub max_words: usize,
    pub max_duration: f64, // seconds, measured first word start to last word end
}

impl SubtitleConfig {
    pub fn new(max_words: usize, max_duration: f64) -> Self {
        Self {
            max_words,
            max_duration,
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORDS, DEFAULT_MAX_DURATION)
    }
}
