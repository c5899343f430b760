//! Caption job documents - the word list handed over by the transcription
//! (and optionally translation) collaborator, plus per-job style choices.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReelError, Result};
use crate::types::{SpeakerStyle, Word};

pub const DEFAULT_BACKGROUND: &str = "#000000";
pub const DEFAULT_HIGHLIGHT: &str = "#FFFFFF";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleParams {
    #[serde(default = "default_background", alias = "backgroundColor")]
    pub background_color: String,
    #[serde(default = "default_highlight", alias = "highlightColor")]
    pub highlight_color: String,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_highlight() -> String {
    DEFAULT_HIGHLIGHT.to_string()
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            background_color: default_background(),
            highlight_color: default_highlight(),
        }
    }
}

/// Runtime caption job parsed from JSON input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionJob {
    #[serde(default, alias = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default, alias = "speaker_configs", alias = "speakerConfigs")]
    pub speakers: Vec<SpeakerStyle>,
    #[serde(default)]
    pub style: StyleParams,
}

impl CaptionJob {
    pub fn from_json(raw: &str) -> Result<Self> {
        let job: CaptionJob = serde_json::from_str(raw)?;
        job.validate()?;
        Ok(job)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let job = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            words = job.words.len(),
            overrides = job.speakers.len(),
            "caption job loaded"
        );
        Ok(job)
    }

    /// Word timings must be finite, ordered by start, and never end before they start.
    pub fn validate(&self) -> Result<()> {
        validate_words(&self.words)
    }

    pub fn overrides(&self) -> Option<&[SpeakerStyle]> {
        if self.speakers.is_empty() {
            None
        } else {
            Some(&self.speakers)
        }
    }
}

pub fn validate_words(words: &[Word]) -> Result<()> {
    let mut previous_start = f64::NEG_INFINITY;
    for (idx, word) in words.iter().enumerate() {
        if !word.start.is_finite() || !word.end.is_finite() {
            return Err(ReelError::InvalidTranscript(format!(
                "word {idx} ('{}') has a non-finite timestamp",
                word.text
            )));
        }
        if word.end < word.start {
            return Err(ReelError::InvalidTranscript(format!(
                "word {idx} ('{}') ends at {:.3}s before it starts at {:.3}s",
                word.text, word.end, word.start
            )));
        }
        if word.start < previous_start {
            return Err(ReelError::InvalidTranscript(format!(
                "word {idx} ('{}') starts at {:.3}s, before the previous word ({:.3}s)",
                word.text, word.start, previous_start
            )));
        }
        previous_start = word.start;
    }
    Ok(())
}
