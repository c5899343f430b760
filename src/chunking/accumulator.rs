use crate::types::{SubtitleChunk, Word};

use super::{SubtitleConfig, BREAK_PUNCTUATION};

pub(super) struct SubtitleAccumulator {
    chunks: Vec<SubtitleChunk>,
    current: Vec<Word>,
}

impl SubtitleAccumulator {
    pub(super) fn new() -> Self {
        Self {
            chunks: Vec::new(),
            current: Vec::new(),
        }
    }

    pub(super) fn handle_word(&mut self, word: &Word, config: SubtitleConfig) {
        self.current.push(word.clone());
        if self.should_close(word, config) {
            self.finish_chunk();
        }
    }

    pub(super) fn finish_chunk(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let words = std::mem::take(&mut self.current);
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let start = words[0].start;
        let end = words[words.len() - 1].end;
        self.chunks.push(SubtitleChunk {
            words,
            text,
            start,
            end,
        });
    }

    pub(super) fn into_chunks(self) -> Vec<SubtitleChunk> {
        self.chunks
    }

    // Any one of count, duration or trailing punctuation closes the chunk.
    fn should_close(&self, last: &Word, config: SubtitleConfig) -> bool {
        if self.current.len() >= config.max_words {
            return true;
        }
        if self.duration() >= config.max_duration {
            return true;
        }
        last.text.trim_end().ends_with(BREAK_PUNCTUATION)
    }

    fn duration(&self) -> f64 {
        match (self.current.first(), self.current.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0.0,
        }
    }
}
