//! Drives the renderer across a clip and hands frames to the encoder.

pub mod ffmpeg;

pub use ffmpeg::FfmpegEncoder;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::audio::{decode_media, DecodedMedia, StagedAudio};
use crate::error::{ReelError, Result};
use crate::render::{Frame, FrameRenderer, RenderSnapshot};
use crate::types::{AudioData, RenderMode};

/// Share of the progress range spent on frames; the rest is the final mux.
const FRAME_PROGRESS_SHARE: f64 = 99.0;

/// Where the clip's duration and audio come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Video(PathBuf),
    Audio(PathBuf),
}

impl MediaSource {
    pub fn path(&self) -> &Path {
        match self {
            MediaSource::Video(path) | MediaSource::Audio(path) => path,
        }
    }

    /// Videos get karaoke highlighting, audio-only sources movie subtitles.
    pub fn implied_mode(&self) -> RenderMode {
        match self {
            MediaSource::Video(_) => RenderMode::Karaoke,
            MediaSource::Audio(_) => RenderMode::MovieSubtitle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration: f64,
    pub frame_count: usize,
}

impl EncodeSpec {
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// External codec seam: muxes a frame stream with an audio file, or with
/// silence of the clip's length when `audio` is `None`.
pub trait Encoder {
    type Session: EncodeSession;

    fn open(
        &self,
        spec: &EncodeSpec,
        audio: Option<&Path>,
        output: &Path,
    ) -> Result<Self::Session>;
}

/// One output stream; frames must arrive in timestamp order.
pub trait EncodeSession {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    fn finish(self) -> Result<()>;
}

/// Cooperative cancellation flag, polled between frame batches.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySummary {
    pub output: PathBuf,
    pub duration: f64,
    pub frame_count: usize,
}

/// Clip duration and the audio track to mux for `source`.
///
/// Audio sources must carry audio and are as long as it. Video sources take
/// the container's declared duration and may have no audio at all.
fn source_timeline(
    source: &MediaSource,
    media: DecodedMedia,
) -> Result<(f64, Option<AudioData>)> {
    let path = source.path();
    match source {
        MediaSource::Audio(_) => {
            let audio = media
                .audio
                .ok_or_else(|| ReelError::media_decode(path, "no audio track found"))?;
            Ok((audio.duration(), Some(audio)))
        }
        MediaSource::Video(_) => {
            let duration = media
                .container_duration
                .or_else(|| media.audio.as_ref().map(AudioData::duration))
                .ok_or_else(|| ReelError::media_decode(path, "could not determine duration"))?;
            Ok((duration, media.audio))
        }
    }
}

/// Frames sampled at `i / fps` for every instant in `[0, duration)`.
pub fn frame_count(duration: f64, fps: u32) -> usize {
    if !duration.is_finite() || duration <= 0.0 || fps == 0 {
        return 0;
    }
    // tolerate float noise when duration is an exact multiple of the frame period
    (duration * fps as f64 - 1e-9).ceil().max(0.0) as usize
}

pub struct VideoAssembler<E> {
    renderer: FrameRenderer,
    encoder: E,
    batch_size: usize,
    cancel: CancelToken,
}

impl<E: Encoder> VideoAssembler<E> {
    pub fn new(renderer: FrameRenderer, encoder: E) -> Self {
        Self {
            renderer,
            encoder,
            batch_size: rayon::current_num_threads().max(1) * 2,
            cancel: CancelToken::default(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// Decode the source's audio, stage it for muxing, and render the clip.
    /// A video without an audio track is rendered over silence.
    pub fn assemble<F>(
        &self,
        source: &MediaSource,
        snapshot: &RenderSnapshot,
        destination: &Path,
        progress: F,
    ) -> Result<AssemblySummary>
    where
        F: FnMut(f64),
    {
        let media = decode_media(source.path())?;
        let (duration, audio) = source_timeline(source, media)?;
        info!(
            source = %source.path().display(),
            duration,
            channels = audio.as_ref().map(|a| a.channels),
            sample_rate = audio.as_ref().map(|a| a.sample_rate),
            "decoded source media"
        );
        let staged = audio.as_ref().map(StagedAudio::write).transpose()?;
        drop(audio);
        self.assemble_with_audio(
            staged.as_ref().map(StagedAudio::path),
            duration,
            snapshot,
            destination,
            progress,
        )
    }

    /// Render `duration` seconds over an already prepared audio file, or over
    /// silence when `audio` is `None`.
    ///
    /// The output is written beside `destination` and moved into place only
    /// once the encoder finishes; on any failure nothing appears there.
    pub fn assemble_with_audio<F>(
        &self,
        audio: Option<&Path>,
        duration: f64,
        snapshot: &RenderSnapshot,
        destination: &Path,
        mut progress: F,
    ) -> Result<AssemblySummary>
    where
        F: FnMut(f64),
    {
        let config = self.renderer.config();
        let spec = EncodeSpec {
            width: config.width,
            height: config.height,
            fps: config.fps,
            duration,
            frame_count: frame_count(duration, config.fps),
        };

        let parent = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let staging = tempfile::Builder::new()
            .prefix(".reelcaption-")
            .suffix(".partial.mp4")
            .tempfile_in(&parent)?
            .into_temp_path();

        let mut session = self.encoder.open(&spec, audio, &staging)?;
        let renderer = &self.renderer;
        let fps = config.fps as f64;
        let mut written = 0usize;

        while written < spec.frame_count {
            if self.cancel.is_cancelled() {
                info!(written, total = spec.frame_count, "render cancelled");
                return Err(ReelError::Cancelled);
            }
            let end = (written + self.batch_size).min(spec.frame_count);
            let frames: Vec<Frame> = (written..end)
                .into_par_iter()
                .map(|idx| renderer.render(idx as f64 / fps, snapshot))
                .collect();
            for frame in &frames {
                session.write_frame(frame)?;
            }
            written = end;
            let fraction = written as f64 / spec.frame_count as f64;
            progress(fraction * FRAME_PROGRESS_SHARE);
            debug!(written, total = spec.frame_count, "frames encoded");
        }

        session.finish()?;
        staging
            .persist(destination)
            .map_err(|err| ReelError::Io(err.error))?;
        progress(100.0);
        info!(
            output = %destination.display(),
            frames = spec.frame_count,
            duration,
            "clip written"
        );

        Ok(AssemblySummary {
            output: destination.to_path_buf(),
            duration,
            frame_count: spec.frame_count,
        })
    }
}
