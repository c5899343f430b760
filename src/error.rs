use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for results returned by library modules.
pub type Result<T> = std::result::Result<T, ReelError>;

#[derive(Debug, Error)]
pub enum ReelError {
    #[error("invalid color '{value}': expected #RRGGBB")]
    InvalidColor { value: String },

    #[error("failed to decode media {path}: {reason}")]
    MediaDecode { path: PathBuf, reason: String },

    #[error("invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ffmpeg was not found on PATH; install ffmpeg and verify `ffmpeg -version` works")]
    EncoderUnavailable,

    #[error("encoding failed: {0}")]
    Encode(String),

    #[error("render cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ReelError {
    pub(crate) fn media_decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MediaDecode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
