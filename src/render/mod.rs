//! Deterministic time -> frame rendering.
//!
//! A frame is a pure function of the timestamp, an immutable
//! [`RenderSnapshot`] and the [`RenderConfig`]; nothing is cached between
//! calls, so frames can be produced on any thread in any order.

pub mod font;
pub mod karaoke;
pub mod movie;
pub mod raster;

use std::sync::Arc;

use crate::chunking::{group_into_subtitles, SubtitleConfig};
use crate::color::{ColorResolver, Rgb};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::types::{RenderMode, SpeakerStyle, SubtitleChunk, Word};

pub use font::Typeface;
pub use raster::{Frame, TextMask};

/// Word data captured once before a render run starts.
#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    words: Vec<Word>,
    word_colors: Vec<Rgb>,
    chunks: Vec<SubtitleChunk>,
}

impl RenderSnapshot {
    /// Resolve every word's speaker color and pre-compute subtitle chunks.
    ///
    /// Fails with `InvalidColor` if an override or palette entry is malformed.
    pub fn new(
        words: &[Word],
        overrides: Option<&[SpeakerStyle]>,
        resolver: &ColorResolver,
        subtitles: SubtitleConfig,
    ) -> Result<Self> {
        let word_colors = words
            .iter()
            .map(|word| resolver.resolve_speaker_rgb(word.speaker_or_default(), overrides))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            words: words.to_vec(),
            word_colors,
            chunks: group_into_subtitles(words, subtitles),
        })
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn chunks(&self) -> &[SubtitleChunk] {
        &self.chunks
    }

    /// Resolved speaker color of word `idx`.
    pub fn word_color(&self, idx: usize) -> Rgb {
        self.word_colors[idx]
    }
}

#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: RenderConfig,
    face: Arc<Typeface>,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig, face: Typeface) -> Result<Self> {
        Self::with_shared_face(config, Arc::new(face))
    }

    pub fn with_shared_face(config: RenderConfig, face: Arc<Typeface>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, face })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Plain background raster with no captions.
    pub fn background(&self) -> Frame {
        Frame::filled(self.config.width, self.config.height, self.config.background)
    }

    /// Render the overlay at `t` seconds. `t` must lie within the clip.
    pub fn render(&self, t: f64, snapshot: &RenderSnapshot) -> Frame {
        let mut frame = self.background();
        match self.config.mode {
            RenderMode::Karaoke => karaoke::draw(&mut frame, t, snapshot, &self.config, &self.face),
            RenderMode::MovieSubtitle => {
                movie::draw(&mut frame, t, snapshot, &self.config, &self.face)
            }
        }
        frame
    }
}
