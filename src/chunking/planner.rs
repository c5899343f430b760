use crate::types::{SubtitleChunk, Word};

use super::accumulator::SubtitleAccumulator;
use super::SubtitleConfig;

/// Pure function grouping words into display-sized chunks.
/// Every word lands in exactly one chunk, in input order.
pub fn group_into_subtitles(words: &[Word], config: SubtitleConfig) -> Vec<SubtitleChunk> {
    let mut accumulator = SubtitleAccumulator::new();
    for word in words {
        accumulator.handle_word(word, config);
    }
    accumulator.finish_chunk();
    accumulator.into_chunks()
}
