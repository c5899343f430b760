//! Core types for the reelcaption rendering pipeline

use serde::{Deserialize, Serialize};

/// Raw audio data representation (interleaved f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Interleaved audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 44100)
    pub sample_rate: u32,
    /// Channel count of the source track
    pub channels: u16,
}

impl AudioData {
    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration of the decoded track in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// A single transcribed token with timing and optional speaker identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(alias = "word")]
    pub text: String,
    pub start: f64, // seconds
    pub end: f64,   // seconds
    #[serde(default, alias = "speakerId", skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<u32>,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            speaker_id: None,
        }
    }

    pub fn with_speaker(mut self, speaker_id: u32) -> Self {
        self.speaker_id = Some(speaker_id);
        self
    }

    /// Speaker slot used for color lookup; unassigned words fall back to slot 0
    pub fn speaker_or_default(&self) -> u32 {
        self.speaker_id.unwrap_or(0)
    }
}

/// A maximal run of consecutive words attributed to one speaker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerSegment {
    pub words: Vec<Word>,
    pub speaker_id: u32,
    pub start: f64,
    pub end: f64,
}

/// A caption-sized group of words displayed together in movie-subtitle mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleChunk {
    pub words: Vec<Word>,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Caller-supplied color override for one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerStyle {
    #[serde(alias = "speakerId")]
    pub speaker_id: u32,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// How captions are laid out on each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Scrolling word window with per-word highlight/past/future coloring
    Karaoke,
    /// One bottom-anchored, outlined caption block at a time
    MovieSubtitle,
}
