//! Word-timed caption overlays for vertical video.
//!
//! Words (with optional speaker ids) come from an upstream transcription
//! step. The crate attributes speakers by pause length, groups words into
//! subtitles, renders each instant to an RGB frame and hands the frame
//! stream plus the source audio to an external encoder.

pub mod assemble;
pub mod audio;
pub mod chunking;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod speakers;
pub mod transcript;
pub mod types;

pub use error::{ReelError, Result};
