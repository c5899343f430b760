//! Pause-based speaker attribution.
//!
//! This is not acoustic diarization: a cursor cycles through a fixed number
//! of identity slots whenever the silence between two consecutive words
//! exceeds the pause threshold. Two real speakers trading turns faster than
//! the threshold share one id, and a single speaker who pauses longer than
//! the threshold is split across two.

use std::collections::BTreeSet;

use tracing::debug;

use crate::color::{Palette, DEFAULT_DETECTION_COLORS};
use crate::error::{ReelError, Result};
use crate::types::{SpeakerSegment, SpeakerStyle, Word};

pub const DEFAULT_PAUSE_THRESHOLD: f64 = 0.8;

/// Enriched words plus their same-speaker runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakerDetection {
    pub words: Vec<Word>,
    pub segments: Vec<SpeakerSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakerSegmenter {
    pause_threshold: f64,
    speaker_slots: u32,
}

impl Default for SpeakerSegmenter {
    fn default() -> Self {
        Self {
            pause_threshold: DEFAULT_PAUSE_THRESHOLD,
            speaker_slots: DEFAULT_DETECTION_COLORS.len() as u32,
        }
    }
}

impl SpeakerSegmenter {
    /// # Parameters
    /// * `pause_threshold` - silence (seconds) that must be exceeded to advance the speaker
    /// * `speaker_slots` - number of ids the cursor cycles through before wrapping
    pub fn new(pause_threshold: f64, speaker_slots: u32) -> Result<Self> {
        if !pause_threshold.is_finite() || pause_threshold < 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "pause threshold must be a non-negative number of seconds, got {pause_threshold}"
            )));
        }
        if speaker_slots == 0 {
            return Err(ReelError::InvalidConfig(
                "speaker slot count must be at least one".to_string(),
            ));
        }
        Ok(Self {
            pause_threshold,
            speaker_slots,
        })
    }

    /// Slot count taken from the length of a detection palette.
    pub fn for_palette(pause_threshold: f64, palette: &Palette) -> Result<Self> {
        Self::new(pause_threshold, palette.len() as u32)
    }

    /// Return a copy of `words` with `speaker_id` assigned by pause length.
    pub fn assign_speakers(&self, words: &[Word]) -> Vec<Word> {
        let mut current_speaker = 0u32;
        let mut previous_end: Option<f64> = None;
        let mut assigned = Vec::with_capacity(words.len());

        for word in words {
            if let Some(end) = previous_end {
                let pause = word.start - end;
                if pause > self.pause_threshold {
                    current_speaker = (current_speaker + 1) % self.speaker_slots;
                }
            }
            previous_end = Some(word.end);
            assigned.push(Word {
                speaker_id: Some(current_speaker),
                ..word.clone()
            });
        }

        assigned
    }

    pub fn detect(&self, words: &[Word]) -> SpeakerDetection {
        let words = self.assign_speakers(words);
        let segments = group_into_segments(&words);
        debug!(
            words = words.len(),
            segments = segments.len(),
            threshold = self.pause_threshold,
            "speaker detection complete"
        );
        SpeakerDetection { words, segments }
    }
}

/// Fold consecutive words sharing a speaker id into segments.
///
/// Words without an id are treated as speaker 0.
pub fn group_into_segments(words: &[Word]) -> Vec<SpeakerSegment> {
    let mut segments = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_speaker = 0u32;

    for word in words {
        let speaker = word.speaker_or_default();
        if !current.is_empty() && speaker != current_speaker {
            segments.push(close_segment(std::mem::take(&mut current), current_speaker));
        }
        current_speaker = speaker;
        current.push(word.clone());
    }

    if !current.is_empty() {
        segments.push(close_segment(current, current_speaker));
    }

    segments
}

fn close_segment(words: Vec<Word>, speaker_id: u32) -> SpeakerSegment {
    let start = words.first().map(|w| w.start).unwrap_or_default();
    let end = words.last().map(|w| w.end).unwrap_or_default();
    SpeakerSegment {
        words,
        speaker_id,
        start,
        end,
    }
}

/// Distinct assigned speaker ids, ascending.
pub fn unique_speakers(words: &[Word]) -> BTreeSet<u32> {
    words.iter().filter_map(|word| word.speaker_id).collect()
}

/// Default style entry for each detected speaker.
pub fn speaker_listing(speakers: &BTreeSet<u32>, palette: &Palette) -> Vec<SpeakerStyle> {
    speakers
        .iter()
        .map(|&speaker_id| SpeakerStyle {
            speaker_id,
            color: palette.color_for(speaker_id).to_string(),
            name: None,
        })
        .collect()
}
